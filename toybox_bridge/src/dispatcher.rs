use crate::error::BridgeError;
use crate::registry::{SubscriberRegistry, Subscription};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use toybox_protocol::split_delivery;

/// Outcome of one delivery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub handled: usize,
    pub unhandled: usize,
}

/// Running totals since the dispatcher was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub handled: u64,
    pub unhandled: u64,
    pub malformed: u64,
}

/// Entry point the host calls with raw JSON. Clones share one registry.
#[derive(Clone, Default)]
pub struct InboundDispatcher {
    registry: Rc<RefCell<SubscriberRegistry>>,
    stats: Rc<Cell<DispatchStats>>,
}

impl InboundDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` for `kind`, superseding any earlier registration.
    pub fn subscribe<F>(&self, kind: &str, callback: F) -> Subscription
    where
        F: Fn(Value) + 'static,
    {
        let (id, prev) = self.registry.borrow_mut().insert(kind, Rc::new(callback));
        if prev.is_some() {
            tracing::warn!(kind, "subscription superseded an active handler");
        }
        Subscription::new(kind, id, &self.registry)
    }

    /// Like [`subscribe`](Self::subscribe) but refuses to replace an active
    /// registration.
    pub fn try_subscribe<F>(&self, kind: &str, callback: F) -> Result<Subscription, BridgeError>
    where
        F: Fn(Value) + 'static,
    {
        if self.registry.borrow().contains(kind) {
            return Err(BridgeError::AlreadySubscribed {
                kind: kind.to_string(),
            });
        }
        Ok(self.subscribe(kind, callback))
    }

    pub fn is_subscribed(&self, kind: &str) -> bool {
        self.registry.borrow().contains(kind)
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.borrow().len()
    }

    pub fn clear(&self) {
        self.registry.borrow_mut().clear();
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats.get()
    }

    /// Host-facing entry point. Never fails: malformed payloads are logged
    /// and dropped.
    pub fn deliver(&self, raw: &str) {
        if let Err(e) = self.try_deliver(raw) {
            tracing::warn!(error = %e, bytes = raw.len(), "dropping host message");
        }
    }

    /// Parses `raw` (one message or an array of them) and invokes the
    /// registered callback for each message in order. Messages without a
    /// subscriber, and elements that are not messages, count as unhandled.
    /// Only a JSON syntax error is malformed.
    pub fn try_deliver(&self, raw: &str) -> Result<DeliveryReport, BridgeError> {
        let items = match split_delivery(raw) {
            Ok(items) => items,
            Err(e) => {
                self.bump(|s| s.malformed += 1);
                return Err(BridgeError::MalformedMessage(e));
            }
        };

        let mut report = DeliveryReport::default();
        for msg in items {
            let Some(msg) = msg else {
                tracing::trace!("element without a string type ignored");
                report.unhandled += 1;
                self.bump(|s| s.unhandled += 1);
                continue;
            };

            // Lookup borrow ends before the callback runs; callbacks may
            // subscribe or unsubscribe.
            let callback = self.registry.borrow().get(&msg.kind);
            match callback {
                Some(cb) => {
                    tracing::trace!(kind = %msg.kind, "dispatching host message");
                    report.handled += 1;
                    self.bump(|s| s.handled += 1);
                    cb(msg.value);
                }
                None => {
                    tracing::trace!(kind = %msg.kind, "no subscriber, message ignored");
                    report.unhandled += 1;
                    self.bump(|s| s.unhandled += 1);
                }
            }
        }
        Ok(report)
    }

    fn bump(&self, f: impl FnOnce(&mut DispatchStats)) {
        let mut s = self.stats.get();
        f(&mut s);
        self.stats.set(s);
    }
}
