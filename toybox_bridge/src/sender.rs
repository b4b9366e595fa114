use crate::error::BridgeError;
use crate::transport::HostTransport;
use serde::Serialize;
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;

/// Clonable handle; all clones share one transport slot.
#[derive(Clone, Default)]
pub struct OutboundSender {
    transport: Rc<RefCell<Option<Rc<dyn HostTransport>>>>,
}

impl OutboundSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, transport: Rc<dyn HostTransport>) {
        *self.transport.borrow_mut() = Some(transport);
    }

    pub fn detach(&self) -> bool {
        self.transport.borrow_mut().take().is_some()
    }

    pub fn is_attached(&self) -> bool {
        self.transport.borrow().is_some()
    }

    /// Encodes `command` and performs exactly one transport write.
    ///
    /// The encoding must be a JSON object carrying a non-empty string `type`.
    /// Nothing is written when validation fails.
    pub fn send<C: Serialize + ?Sized>(&self, command: &C) -> Result<(), BridgeError> {
        let value = serde_json::to_value(command).map_err(BridgeError::Encode)?;
        let kind = command_kind(&value)?.to_string();

        // No borrow of the slot may be held across the write: transports can re-enter.
        let transport = self
            .transport
            .borrow()
            .clone()
            .ok_or(BridgeError::BridgeUnavailable)?;

        let payload = serde_json::to_string(&value).map_err(BridgeError::Encode)?;
        tracing::debug!(kind = %kind, bytes = payload.len(), "sending command to host");
        transport
            .post_message(payload)
            .map_err(BridgeError::Transport)
    }
}

fn command_kind(value: &Value) -> Result<&str, BridgeError> {
    let Some(obj) = value.as_object() else {
        return Err(BridgeError::InvalidCommand(
            "command must encode to a JSON object".to_string(),
        ));
    };
    match obj.get("type") {
        Some(Value::String(kind)) if !kind.is_empty() => Ok(kind),
        Some(Value::String(_)) => Err(BridgeError::InvalidCommand(
            "command type is empty".to_string(),
        )),
        Some(_) => Err(BridgeError::InvalidCommand(
            "command type must be a string".to_string(),
        )),
        None => Err(BridgeError::InvalidCommand(
            "command has no type".to_string(),
        )),
    }
}
