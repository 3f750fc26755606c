//! Input mapping for keyboard, swipe and tap gestures
//!
//! Reading direction only matters here: it decides whether a left-hand or
//! right-hand gesture means "advance". The state machine itself just sees
//! next/previous.

use super::{ReadingDirection, ReadingMode, ReadingSession};

/// Minimum horizontal travel for a swipe, in input units
pub const SWIPE_THRESHOLD: f32 = 50.0;

/// Fraction of the width on each side that acts as a page-turn zone
pub const TAP_ZONE: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Space,
    Home,
    End,
    F11,
    Escape,
    Char(char),
}

/// Something the reader can be asked to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderCommand {
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    ToggleFullscreen,
    ToggleInvert,
    ToggleDirection,
    SetMode(ReadingMode),
    /// Leave the reader; handled by the caller
    Exit,
}

/// Which visual side a gesture points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Translate a screen side into next/previous for the reading direction
pub fn command_for_side(side: Side, direction: ReadingDirection) -> ReaderCommand {
    match (side, direction) {
        (Side::Right, ReadingDirection::Ltr) | (Side::Left, ReadingDirection::Rtl) => {
            ReaderCommand::NextPage
        }
        (Side::Left, ReadingDirection::Ltr) | (Side::Right, ReadingDirection::Rtl) => {
            ReaderCommand::PrevPage
        }
    }
}

pub fn command_for_key(key: Key, session: &ReadingSession) -> Option<ReaderCommand> {
    let paged = session.reading_mode().is_paged();
    let direction = session.reading_direction();

    match key {
        Key::ArrowRight => Some(command_for_side(Side::Right, direction)),
        Key::ArrowLeft => Some(command_for_side(Side::Left, direction)),
        // Vertical mode leaves these to native scrolling
        Key::ArrowDown | Key::Space if paged => Some(ReaderCommand::NextPage),
        Key::ArrowUp if paged => Some(ReaderCommand::PrevPage),
        Key::ArrowDown | Key::Space | Key::ArrowUp => None,
        Key::Home => Some(ReaderCommand::FirstPage),
        Key::End => Some(ReaderCommand::LastPage),
        Key::F11 | Key::Char('f') => Some(ReaderCommand::ToggleFullscreen),
        Key::Char('i') => Some(ReaderCommand::ToggleInvert),
        Key::Char('d') => Some(ReaderCommand::ToggleDirection),
        Key::Char('v') => Some(ReaderCommand::SetMode(ReadingMode::Vertical)),
        Key::Char('1') => Some(ReaderCommand::SetMode(ReadingMode::Single)),
        Key::Char('2') => Some(ReaderCommand::SetMode(ReadingMode::TwoPage)),
        Key::Escape => Some(ReaderCommand::Exit),
        Key::Char(_) => None,
    }
}

/// Horizontal swipe from touch start to touch end
///
/// Ignored in vertical mode, when vertical travel dominates, or when the
/// swipe is shorter than [`SWIPE_THRESHOLD`].
pub fn command_for_swipe(
    delta_x: f32,
    delta_y: f32,
    session: &ReadingSession,
) -> Option<ReaderCommand> {
    if !session.reading_mode().is_paged() {
        return None;
    }
    if delta_x.abs() <= delta_y.abs() || delta_x.abs() <= SWIPE_THRESHOLD {
        return None;
    }

    // Swiping right drags the previous page in from the left
    let side = if delta_x > 0.0 { Side::Left } else { Side::Right };
    Some(command_for_side(side, session.reading_direction()))
}

/// Tap at `x` within a view `width` wide
pub fn command_for_tap(x: f32, width: f32, session: &ReadingSession) -> Option<ReaderCommand> {
    if !session.reading_mode().is_paged() || width <= 0.0 {
        return None;
    }

    let side = if x < width * TAP_ZONE {
        Side::Left
    } else if x > width * (1.0 - TAP_ZONE) {
        Side::Right
    } else {
        return None;
    };
    Some(command_for_side(side, session.reading_direction()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paged(direction: ReadingDirection) -> ReadingSession {
        let mut session = ReadingSession::new();
        session.set_reading_mode(ReadingMode::Single);
        session.set_reading_direction(direction);
        session
    }

    #[test]
    fn test_arrows_follow_direction() {
        let ltr = paged(ReadingDirection::Ltr);
        assert_eq!(command_for_key(Key::ArrowRight, &ltr), Some(ReaderCommand::NextPage));
        assert_eq!(command_for_key(Key::ArrowLeft, &ltr), Some(ReaderCommand::PrevPage));

        let rtl = paged(ReadingDirection::Rtl);
        assert_eq!(command_for_key(Key::ArrowRight, &rtl), Some(ReaderCommand::PrevPage));
        assert_eq!(command_for_key(Key::ArrowLeft, &rtl), Some(ReaderCommand::NextPage));
    }

    #[test]
    fn test_vertical_mode_leaves_scroll_keys() {
        let session = ReadingSession::new();
        assert_eq!(command_for_key(Key::Space, &session), None);
        assert_eq!(command_for_key(Key::ArrowUp, &session), None);
        assert_eq!(command_for_key(Key::ArrowRight, &session), Some(ReaderCommand::NextPage));

        let single = paged(ReadingDirection::Ltr);
        assert_eq!(command_for_key(Key::Space, &single), Some(ReaderCommand::NextPage));
        assert_eq!(command_for_key(Key::ArrowUp, &single), Some(ReaderCommand::PrevPage));
    }

    #[test]
    fn test_shortcut_keys() {
        let session = ReadingSession::new();
        assert_eq!(command_for_key(Key::Home, &session), Some(ReaderCommand::FirstPage));
        assert_eq!(command_for_key(Key::End, &session), Some(ReaderCommand::LastPage));
        assert_eq!(command_for_key(Key::F11, &session), Some(ReaderCommand::ToggleFullscreen));
        assert_eq!(
            command_for_key(Key::Char('2'), &session),
            Some(ReaderCommand::SetMode(ReadingMode::TwoPage))
        );
        assert_eq!(command_for_key(Key::Escape, &session), Some(ReaderCommand::Exit));
        assert_eq!(command_for_key(Key::Char('x'), &session), None);
    }

    #[test]
    fn test_swipe() {
        let ltr = paged(ReadingDirection::Ltr);
        assert_eq!(command_for_swipe(-80.0, 10.0, &ltr), Some(ReaderCommand::NextPage));
        assert_eq!(command_for_swipe(80.0, 10.0, &ltr), Some(ReaderCommand::PrevPage));
        assert_eq!(command_for_swipe(30.0, 0.0, &ltr), None);
        assert_eq!(command_for_swipe(60.0, 90.0, &ltr), None);

        let rtl = paged(ReadingDirection::Rtl);
        assert_eq!(command_for_swipe(-80.0, 0.0, &rtl), Some(ReaderCommand::PrevPage));

        assert_eq!(command_for_swipe(-80.0, 0.0, &ReadingSession::new()), None);
    }

    #[test]
    fn test_tap_zones() {
        let ltr = paged(ReadingDirection::Ltr);
        assert_eq!(command_for_tap(10.0, 100.0, &ltr), Some(ReaderCommand::PrevPage));
        assert_eq!(command_for_tap(90.0, 100.0, &ltr), Some(ReaderCommand::NextPage));
        assert_eq!(command_for_tap(50.0, 100.0, &ltr), None);

        let rtl = paged(ReadingDirection::Rtl);
        assert_eq!(command_for_tap(10.0, 100.0, &rtl), Some(ReaderCommand::NextPage));
    }
}
