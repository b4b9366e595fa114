use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

pub(crate) type Callback = Rc<dyn Fn(Value)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Entry {
    id: SubscriptionId,
    callback: Callback,
}

/// At most one callback per message kind; inserting supersedes.
#[derive(Default)]
pub(crate) struct SubscriberRegistry {
    next_id: u64,
    entries: HashMap<String, Entry>,
}

impl SubscriberRegistry {
    /// Returns the new id and the id it replaced, if any.
    pub fn insert(
        &mut self,
        kind: &str,
        callback: Callback,
    ) -> (SubscriptionId, Option<SubscriptionId>) {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        let prev = self
            .entries
            .insert(kind.to_string(), Entry { id, callback })
            .map(|e| e.id);
        (id, prev)
    }

    pub fn remove_if(&mut self, kind: &str, id: SubscriptionId) -> bool {
        if self.entries.get(kind).is_some_and(|e| e.id == id) {
            self.entries.remove(kind);
            return true;
        }
        false
    }

    pub fn get(&self, kind: &str) -> Option<Callback> {
        self.entries.get(kind).map(|e| Rc::clone(&e.callback))
    }

    pub fn active_id(&self, kind: &str) -> Option<SubscriptionId> {
        self.entries.get(kind).map(|e| e.id)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.entries.contains_key(kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Handle for one registration.
///
/// Dropping the handle leaves the callback registered; call
/// [`Subscription::unsubscribe`] to remove it.
#[derive(Debug)]
pub struct Subscription {
    kind: String,
    id: SubscriptionId,
    registry: Weak<RefCell<SubscriberRegistry>>,
}

impl std::fmt::Debug for SubscriberRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberRegistry")
            .field("kinds", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Subscription {
    pub(crate) fn new(
        kind: &str,
        id: SubscriptionId,
        registry: &Rc<RefCell<SubscriberRegistry>>,
    ) -> Self {
        Self {
            kind: kind.to_string(),
            id,
            registry: Rc::downgrade(registry),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// True while this registration is the one receiving `kind`.
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|r| r.borrow().active_id(&self.kind) == Some(self.id))
    }

    /// Removes the registration only if it is still the active one for its
    /// kind. A handle that was superseded is a no-op. Returns whether
    /// anything was removed.
    pub fn unsubscribe(self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let removed = registry.borrow_mut().remove_if(&self.kind, self.id);
        if removed {
            tracing::debug!(kind = %self.kind, "subscription removed");
        } else {
            tracing::trace!(kind = %self.kind, "stale unsubscribe ignored");
        }
        removed
    }
}
