//! State-change notification channel
//!
//! Publish on mutation, subscribe with an explicit unsubscribe handle. The
//! channel is single-threaded; listeners run synchronously, in subscription
//! order, on the thread that publishes.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Listener<T> = Box<dyn FnMut(&T)>;

struct Registry<T> {
    listeners: Vec<(u64, Listener<T>)>,
    /// Ids unsubscribed while `publish` had their listener checked out
    removed: Vec<u64>,
}

type SharedRegistry<T> = RefCell<Registry<T>>;

/// Fan-out channel for values of type `T`
///
/// Listeners may unsubscribe themselves or each other while a value is being
/// published. A listener removed mid-publish is not called for that value.
pub struct EventChannel<T> {
    registry: Rc<SharedRegistry<T>>,
    next_id: u64,
}

impl<T> Default for EventChannel<T> {
    fn default() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                listeners: Vec::new(),
                removed: Vec::new(),
            })),
            next_id: 0,
        }
    }
}

impl<T> EventChannel<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; it stays active until the handle is unsubscribed
    /// or the channel is dropped
    pub fn subscribe<F>(&mut self, listener: F) -> Subscription<T>
    where
        F: FnMut(&T) + 'static,
    {
        self.next_id += 1;
        let id = self.next_id;
        self.registry
            .borrow_mut()
            .listeners
            .push((id, Box::new(listener)));

        Subscription {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    pub fn publish(&self, value: &T) {
        // Listeners are checked out so they can reach the registry themselves
        let mut active = std::mem::take(&mut self.registry.borrow_mut().listeners);

        for (id, listener) in active.iter_mut() {
            if self.registry.borrow().removed.contains(id) {
                continue;
            }
            listener(value);
        }

        let mut registry = self.registry.borrow_mut();
        let removed = std::mem::take(&mut registry.removed);
        active.retain(|(id, _)| !removed.contains(id));
        let added = std::mem::replace(&mut registry.listeners, active);
        registry.listeners.extend(added);
    }

    pub fn listener_count(&self) -> usize {
        self.registry.borrow().listeners.len()
    }
}

/// Handle returned by [`EventChannel::subscribe`]
///
/// Dropping the handle does not unsubscribe.
pub struct Subscription<T> {
    id: u64,
    registry: Weak<SharedRegistry<T>>,
}

impl<T> Subscription<T> {
    /// Remove the listener. Returns false if the channel is already gone.
    pub fn unsubscribe(self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };

        let mut registry = registry.borrow_mut();
        let before = registry.listeners.len();
        registry.listeners.retain(|(id, _)| *id != self.id);
        if registry.listeners.len() == before {
            // Checked out by an ongoing publish
            registry.removed.push(self.id);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_reaches_all_listeners() {
        let mut channel = EventChannel::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let a = Rc::clone(&seen);
        let _sub_a = channel.subscribe(move |v: &u32| a.borrow_mut().push(("a", *v)));
        let b = Rc::clone(&seen);
        let _sub_b = channel.subscribe(move |v: &u32| b.borrow_mut().push(("b", *v)));

        channel.publish(&7);
        assert_eq!(*seen.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let mut channel = EventChannel::new();
        let count = Rc::new(RefCell::new(0));

        let c = Rc::clone(&count);
        let sub = channel.subscribe(move |_: &()| *c.borrow_mut() += 1);
        channel.publish(&());
        assert!(sub.unsubscribe());
        channel.publish(&());

        assert_eq!(*count.borrow(), 1);
        assert_eq!(channel.listener_count(), 0);
    }

    #[test]
    fn test_unsubscribe_after_channel_dropped() {
        let mut channel: EventChannel<u8> = EventChannel::new();
        let sub = channel.subscribe(|_| {});
        drop(channel);
        assert!(!sub.unsubscribe());
    }

    #[test]
    fn test_listener_can_unsubscribe_itself_during_publish() {
        let mut channel = EventChannel::new();
        let calls = Rc::new(RefCell::new(0));
        let handle: Rc<RefCell<Option<Subscription<u32>>>> = Rc::new(RefCell::new(None));

        let own = Rc::clone(&handle);
        let c = Rc::clone(&calls);
        let sub = channel.subscribe(move |_: &u32| {
            *c.borrow_mut() += 1;
            if let Some(sub) = own.borrow_mut().take() {
                assert!(sub.unsubscribe());
            }
        });
        *handle.borrow_mut() = Some(sub);

        channel.publish(&1);
        channel.publish(&2);

        assert_eq!(*calls.borrow(), 1);
        assert_eq!(channel.listener_count(), 0);
    }

    #[test]
    fn test_listener_can_unsubscribe_a_later_listener() {
        let mut channel = EventChannel::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let victim: Rc<RefCell<Option<Subscription<u32>>>> = Rc::new(RefCell::new(None));

        let target = Rc::clone(&victim);
        let a = Rc::clone(&seen);
        let _first = channel.subscribe(move |v: &u32| {
            a.borrow_mut().push(("first", *v));
            if let Some(sub) = target.borrow_mut().take() {
                sub.unsubscribe();
            }
        });
        let b = Rc::clone(&seen);
        let second = channel.subscribe(move |v: &u32| b.borrow_mut().push(("second", *v)));
        *victim.borrow_mut() = Some(second);

        channel.publish(&1);
        channel.publish(&2);

        assert_eq!(*seen.borrow(), vec![("first", 1), ("first", 2)]);
        assert_eq!(channel.listener_count(), 1);
    }
}
