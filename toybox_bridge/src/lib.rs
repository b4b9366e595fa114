//! UI side of the plug-in host bridge.
//!
//! A [`Bridge`] owns an [`OutboundSender`] (UI -> host commands) and an
//! [`InboundDispatcher`] (host -> UI notifications). Everything here runs on
//! the UI thread and is `!Send`.

mod bridge;
mod dispatcher;
mod error;
mod panel;
mod registry;
mod sender;
mod transport;

pub use crate::bridge::{Bridge, BridgeState};
pub use crate::dispatcher::{DeliveryReport, DispatchStats, InboundDispatcher};
pub use crate::error::BridgeError;
pub use crate::panel::{ControlPanel, PanelState, GAIN_STEP};
pub use crate::registry::{Subscription, SubscriptionId};
pub use crate::sender::OutboundSender;
pub use crate::transport::HostTransport;

pub use toybox_protocol as protocol;
