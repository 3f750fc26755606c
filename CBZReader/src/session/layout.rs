//! Which pages a renderer shows for the current state

use super::{ReadingDirection, ReadingMode, ReadingSession};

/// Page indices to display, in left-to-right screen order
///
/// Vertical mode shows the whole strip. A spread shows the current page and
/// its partner, mirrored for right-to-left reading; a missing partner at the
/// end of the volume is left out.
pub fn visible_pages(session: &ReadingSession) -> Vec<usize> {
    let total = session.total_pages();
    if total == 0 {
        return Vec::new();
    }

    let current = session.current_page();
    match session.reading_mode() {
        ReadingMode::Vertical => (0..total).collect(),
        ReadingMode::Single => vec![current],
        ReadingMode::TwoPage => {
            let mut spread: Vec<usize> = [current, current + 1]
                .into_iter()
                .filter(|&index| index < total)
                .collect();
            if session.reading_direction() == ReadingDirection::Rtl {
                spread.reverse();
            }
            spread
        }
    }
}
