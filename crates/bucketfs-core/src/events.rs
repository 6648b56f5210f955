//! Single-threaded event channel with scoped subscriptions.
//!
//! Listeners are removed when their [`Subscription`] is dropped, so a
//! component that goes away takes its listeners with it.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

type Listener<T> = Rc<dyn Fn(&T)>;

struct Listeners<T> {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(u64, Listener<T>)>>,
}

/// Broadcasts values to every current listener.
pub struct EventChannel<T> {
    inner: Rc<Listeners<T>>,
}

impl<T: 'static> EventChannel<T> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Listeners {
                next_id: Cell::new(0),
                entries: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Register a listener. It stays registered while the returned
    /// subscription is alive.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.entries.borrow_mut().push((id, Rc::new(listener)));

        let weak: Weak<Listeners<T>> = Rc::downgrade(&self.inner);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(listeners) = weak.upgrade() {
                    listeners.entries.borrow_mut().retain(|(i, _)| *i != id);
                }
            })),
        }
    }

    /// Deliver `value` to every listener registered at call time.
    ///
    /// Listeners may subscribe or unsubscribe while being notified.
    pub fn emit(&self, value: &T) {
        let snapshot: Vec<Listener<T>> = self
            .inner
            .entries
            .borrow()
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in snapshot {
            listener(value);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.entries.borrow().len()
    }
}

impl<T: 'static> Default for EventChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for EventChannel<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

/// Keeps a listener registered. Unsubscribes on drop.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Unsubscribe now.
    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_reaches_all_listeners() {
        let channel = EventChannel::<u32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let a = {
            let seen = seen.clone();
            channel.subscribe(move |v| seen.borrow_mut().push(("a", *v)))
        };
        let b = {
            let seen = seen.clone();
            channel.subscribe(move |v| seen.borrow_mut().push(("b", *v)))
        };

        channel.emit(&7);
        assert_eq!(*seen.borrow(), vec![("a", 7), ("b", 7)]);
        drop((a, b));
    }

    #[test]
    fn test_dropping_subscription_unsubscribes() {
        let channel = EventChannel::<u32>::new();
        let count = Rc::new(Cell::new(0));

        let sub = {
            let count = count.clone();
            channel.subscribe(move |_| count.set(count.get() + 1))
        };
        channel.emit(&1);
        assert_eq!(channel.listener_count(), 1);

        drop(sub);
        channel.emit(&2);
        assert_eq!(count.get(), 1);
        assert_eq!(channel.listener_count(), 0);
    }

    #[test]
    fn test_subscription_outliving_channel_is_harmless() {
        let channel = EventChannel::<u32>::new();
        let sub = channel.subscribe(|_| {});
        drop(channel);
        sub.unsubscribe();
    }
}
