//! Synchronous change notifications for the view-model.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use crate::CommentId;

/// State transitions a listener can subscribe to. Every notification carries
/// only the affected comment's id; listeners look the comment up again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CommentViewModelEvent {
    CommentAdded,
    CommentUpdated,
    CommentUpvoted,
    /// Never emitted by the view-model itself: deleting a comment is an update
    /// that replaces its content.
    CommentDeleted,
}

impl CommentViewModelEvent {
    pub const ALL: [CommentViewModelEvent; 4] = [
        CommentViewModelEvent::CommentAdded,
        CommentViewModelEvent::CommentUpdated,
        CommentViewModelEvent::CommentUpvoted,
        CommentViewModelEvent::CommentDeleted,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CommentViewModelEvent::CommentAdded => "COMMENT_ADDED",
            CommentViewModelEvent::CommentUpdated => "COMMENT_UPDATED",
            CommentViewModelEvent::CommentUpvoted => "COMMENT_UPVOTED",
            CommentViewModelEvent::CommentDeleted => "COMMENT_DELETED",
        }
    }
}

impl std::fmt::Display for CommentViewModelEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

type Listener = Rc<dyn Fn(&CommentId)>;

#[derive(Default)]
struct ListenerRegistry {
    next_listener_id: u64,
    listeners: BTreeMap<CommentViewModelEvent, Vec<(u64, Listener)>>,
}

impl ListenerRegistry {
    fn remove(&mut self, event: CommentViewModelEvent, listener_id: u64) {
        if let Some(listeners) = self.listeners.get_mut(&event) {
            listeners.retain(|(id, _)| *id != listener_id);
        }
    }
}

/// Handle returned by `subscribe`. Dropping it keeps the listener registered.
#[derive(Debug)]
pub struct Subscription {
    event: CommentViewModelEvent,
    listener_id: u64,
    registry: Weak<RefCell<ListenerRegistry>>,
}

impl Subscription {
    pub fn event(&self) -> CommentViewModelEvent {
        self.event
    }

    pub fn unsubscribe(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().remove(self.event, self.listener_id);
        }
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.listeners.iter().map(|(event, l)| (event, l.len())))
            .finish()
    }
}

/// Listeners per event kind, called in subscription order.
#[derive(Debug, Default)]
pub(crate) struct EventListeners {
    registry: Rc<RefCell<ListenerRegistry>>,
}

impl EventListeners {
    pub(crate) fn subscribe(
        &self,
        event: CommentViewModelEvent,
        listener: impl Fn(&CommentId) + 'static,
    ) -> Subscription {
        let mut registry = self.registry.borrow_mut();
        let listener_id = registry.next_listener_id;
        registry.next_listener_id += 1;
        registry
            .listeners
            .entry(event)
            .or_default()
            .push((listener_id, Rc::new(listener)));

        Subscription {
            event,
            listener_id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    pub(crate) fn unsubscribe(&self, subscription: &Subscription) {
        self.registry
            .borrow_mut()
            .remove(subscription.event, subscription.listener_id);
    }

    pub(crate) fn unsubscribe_all(&self, event: Option<CommentViewModelEvent>) {
        let mut registry = self.registry.borrow_mut();
        match event {
            Some(event) => {
                registry.listeners.remove(&event);
            }
            None => registry.listeners.clear(),
        }
    }

    pub(crate) fn listener_count(&self, event: CommentViewModelEvent) -> usize {
        self.registry
            .borrow()
            .listeners
            .get(&event)
            .map_or(0, Vec::len)
    }

    /// Call every listener of `event` with `comment_id`.
    ///
    /// Listeners registered at the time of the call are notified even if one
    /// of them unsubscribes another during dispatch.
    pub(crate) fn emit(&self, event: CommentViewModelEvent, comment_id: &CommentId) {
        let listeners: Vec<Listener> = self
            .registry
            .borrow()
            .listeners
            .get(&event)
            .map(|listeners| listeners.iter().map(|(_, l)| Rc::clone(l)).collect())
            .unwrap_or_default();

        log::debug!(
            "emitting {} for comment {} to {} listeners",
            event,
            comment_id,
            listeners.len()
        );
        for listener in listeners {
            listener(comment_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&CommentId) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (seen, move |id: &CommentId| sink.borrow_mut().push(id.to_string()))
    }

    #[test]
    fn test_emit_reaches_only_matching_event() {
        let listeners = EventListeners::default();
        let (added, on_added) = recorder();
        let (updated, on_updated) = recorder();
        listeners.subscribe(CommentViewModelEvent::CommentAdded, on_added);
        listeners.subscribe(CommentViewModelEvent::CommentUpdated, on_updated);

        listeners.emit(CommentViewModelEvent::CommentAdded, &CommentId::new("c1"));

        assert_eq!(*added.borrow(), ["c1"]);
        assert!(updated.borrow().is_empty());
    }

    #[test]
    fn test_listeners_run_in_subscription_order() {
        let listeners = EventListeners::default();
        let order = Rc::new(RefCell::new(Vec::new()));
        for n in 0..3 {
            let order = Rc::clone(&order);
            listeners.subscribe(CommentViewModelEvent::CommentUpvoted, move |_| {
                order.borrow_mut().push(n)
            });
        }

        listeners.emit(CommentViewModelEvent::CommentUpvoted, &CommentId::new("c1"));
        assert_eq!(*order.borrow(), [0, 1, 2]);
    }

    #[test]
    fn test_unsubscribe_handle() {
        let listeners = EventListeners::default();
        let (seen, on_added) = recorder();
        let subscription = listeners.subscribe(CommentViewModelEvent::CommentAdded, on_added);

        subscription.unsubscribe();
        listeners.emit(CommentViewModelEvent::CommentAdded, &CommentId::new("c1"));

        assert!(seen.borrow().is_empty());
        assert_eq!(listeners.listener_count(CommentViewModelEvent::CommentAdded), 0);
    }

    #[test]
    fn test_unsubscribe_during_dispatch() {
        let listeners = EventListeners::default();
        let (seen, on_added) = recorder();
        let second = Rc::new(RefCell::new(None::<Subscription>));

        let to_remove = Rc::clone(&second);
        listeners.subscribe(CommentViewModelEvent::CommentAdded, move |_| {
            if let Some(subscription) = to_remove.borrow().as_ref() {
                subscription.unsubscribe();
            }
        });
        *second.borrow_mut() =
            Some(listeners.subscribe(CommentViewModelEvent::CommentAdded, on_added));

        listeners.emit(CommentViewModelEvent::CommentAdded, &CommentId::new("c1"));
        listeners.emit(CommentViewModelEvent::CommentAdded, &CommentId::new("c2"));

        // Removed during the first dispatch, so only that one is seen.
        assert_eq!(*seen.borrow(), ["c1"]);
    }

    #[test]
    fn test_unsubscribe_all() {
        let listeners = EventListeners::default();
        for event in CommentViewModelEvent::ALL {
            listeners.subscribe(event, |_| {});
        }

        listeners.unsubscribe_all(Some(CommentViewModelEvent::CommentAdded));
        assert_eq!(listeners.listener_count(CommentViewModelEvent::CommentAdded), 0);
        assert_eq!(listeners.listener_count(CommentViewModelEvent::CommentUpdated), 1);

        listeners.unsubscribe_all(None);
        for event in CommentViewModelEvent::ALL {
            assert_eq!(listeners.listener_count(event), 0);
        }
    }

    #[test]
    fn test_handle_outliving_listeners_is_harmless() {
        let subscription = {
            let listeners = EventListeners::default();
            listeners.subscribe(CommentViewModelEvent::CommentDeleted, |_| {})
        };
        subscription.unsubscribe();
        assert_eq!(subscription.event(), CommentViewModelEvent::CommentDeleted);
    }
}
