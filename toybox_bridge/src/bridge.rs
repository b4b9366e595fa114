use crate::dispatcher::InboundDispatcher;
use crate::error::BridgeError;
use crate::sender::OutboundSender;
use crate::transport::HostTransport;
use serde::Serialize;
use std::cell::Cell;
use std::rc::Rc;
use toybox_protocol::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    Uninitialized,
    Ready,
}

/// Explicitly owned bridge: construct one at the application root and pass
/// it (or clones of it) to whatever needs to send or subscribe.
#[derive(Clone)]
pub struct Bridge {
    sender: OutboundSender,
    dispatcher: InboundDispatcher,
    state: Rc<Cell<BridgeState>>,
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new()
    }
}

impl Bridge {
    pub fn new() -> Self {
        Self {
            sender: OutboundSender::new(),
            dispatcher: InboundDispatcher::new(),
            state: Rc::new(Cell::new(BridgeState::Uninitialized)),
        }
    }

    pub fn state(&self) -> BridgeState {
        self.state.get()
    }

    pub fn sender(&self) -> &OutboundSender {
        &self.sender
    }

    /// The entry point handed to the host for delivering messages.
    pub fn dispatcher(&self) -> &InboundDispatcher {
        &self.dispatcher
    }

    /// Attaches the host transport and performs the `Init` handshake.
    ///
    /// Snapshots arrive later through [`InboundDispatcher::deliver`]; there is
    /// no acknowledgement to wait for.
    pub fn mount(&self, transport: Rc<dyn HostTransport>) -> Result<(), BridgeError> {
        if self.state.get() == BridgeState::Ready {
            return Err(BridgeError::AlreadyMounted);
        }

        self.sender.attach(transport);
        if let Err(e) = self.sender.send(&Command::Init) {
            self.sender.detach();
            tracing::warn!(error = %e, "init handshake failed");
            return Err(e);
        }

        self.state.set(BridgeState::Ready);
        tracing::info!("bridge mounted, init sent");
        Ok(())
    }

    /// Detaches the transport and drops every subscription.
    pub fn unmount(&self) {
        self.sender.detach();
        self.dispatcher.clear();
        if self.state.replace(BridgeState::Uninitialized) == BridgeState::Ready {
            tracing::info!("bridge unmounted");
        }
    }

    pub fn send<C: Serialize + ?Sized>(&self, command: &C) -> Result<(), BridgeError> {
        self.sender.send(command)
    }

    pub fn deliver(&self, raw: &str) {
        self.dispatcher.deliver(raw)
    }
}
