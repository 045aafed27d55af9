#![forbid(unsafe_code)]

//! Subscriber bookkeeping shared by the element tree and the viewport.
//!
//! Callbacks are stored as `Weak` slots; a [`Subscription`] is the only
//! strong handle to its slot, so dropping the guard unsubscribes. Dead slots
//! are cleaned up lazily during notification.
//!
//! # Invariants
//!
//! 1. Subscribers are notified in registration order.
//! 2. Dropping a [`Subscription`] removes the callback before the next
//!    notification cycle.
//! 3. A callback may subscribe or unsubscribe freely while a notification is
//!    in flight; the in-flight cycle uses the subscriber list as it was when
//!    the cycle started.

use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// RAII guard for a registered callback.
///
/// Dropping the guard unsubscribes; there is no explicit `unsubscribe()`.
#[must_use = "dropping a Subscription immediately unsubscribes"]
pub struct Subscription {
    _slot: Box<dyn Any>,
}

impl Subscription {
    pub(crate) fn new(slot: Box<dyn Any>) -> Self {
        Self { _slot: slot }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish()
    }
}

type Slot<E> = Rc<RefCell<dyn FnMut(&E)>>;

/// An ordered list of weak callback slots for events of type `E`.
pub(crate) struct SubscriberList<E> {
    slots: RefCell<Vec<Weak<RefCell<dyn FnMut(&E)>>>>,
}

impl<E: 'static> SubscriberList<E> {
    pub(crate) fn new() -> Self {
        Self {
            slots: RefCell::new(Vec::new()),
        }
    }

    /// Register a callback. The callback stays live for the lifetime of the
    /// returned [`Subscription`].
    pub(crate) fn subscribe(&self, callback: impl FnMut(&E) + 'static) -> Subscription {
        let slot: Slot<E> = Rc::new(RefCell::new(callback));
        self.slots.borrow_mut().push(Rc::downgrade(&slot));
        Subscription::new(Box::new(slot))
    }

    /// Invoke every live callback with `event`, in registration order.
    ///
    /// Strong handles are collected before any callback runs, so callbacks
    /// may mutate the list (subscribe, drop guards) without re-borrowing it.
    pub(crate) fn notify(&self, event: &E) {
        let live: Vec<Slot<E>> = {
            let mut slots = self.slots.borrow_mut();
            slots.retain(|slot| slot.strong_count() > 0);
            slots.iter().filter_map(Weak::upgrade).collect()
        };
        for slot in &live {
            (slot.borrow_mut())(event);
        }
    }

    /// Number of live subscribers.
    pub(crate) fn len(&self) -> usize {
        self.slots
            .borrow()
            .iter()
            .filter(|slot| slot.strong_count() > 0)
            .count()
    }
}

impl<E: 'static> Default for SubscriberList<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn notifies_in_registration_order() {
        let list = SubscriberList::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let log_a = Rc::clone(&log);
        let _a = list.subscribe(move |n: &u32| log_a.borrow_mut().push(("a", *n)));
        let log_b = Rc::clone(&log);
        let _b = list.subscribe(move |n: &u32| log_b.borrow_mut().push(("b", *n)));

        list.notify(&7);
        assert_eq!(*log.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn dropping_guard_unsubscribes() {
        let list = SubscriberList::new();
        let hits = Rc::new(Cell::new(0u32));

        let hits_clone = Rc::clone(&hits);
        let guard = list.subscribe(move |_: &()| hits_clone.set(hits_clone.get() + 1));

        list.notify(&());
        assert_eq!(hits.get(), 1);

        drop(guard);
        list.notify(&());
        assert_eq!(hits.get(), 1);
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn callback_may_subscribe_during_notification() {
        let list = Rc::new(SubscriberList::new());
        let late = Rc::new(RefCell::new(None));

        let list_clone = Rc::clone(&list);
        let late_clone = Rc::clone(&late);
        let _outer = list.subscribe(move |_: &()| {
            if late_clone.borrow().is_none() {
                *late_clone.borrow_mut() = Some(list_clone.subscribe(|_: &()| {}));
            }
        });

        list.notify(&());
        assert!(late.borrow().is_some());
        assert_eq!(list.len(), 2);
    }
}
