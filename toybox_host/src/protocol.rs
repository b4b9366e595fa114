use std::net::SocketAddr;

pub const INBOUND_CAP: usize = 256;
pub const OUTBOUND_CAP: usize = 256;

pub enum InboundMsg {
    UiConnected { socket_addr: SocketAddr },
    UiDisconnected,
    /// One raw command document as posted by the web view.
    Ipc { payload: String },
}

pub enum OutboundMsg {
    Send { batch: NotificationBatch },
}

pub use toybox_protocol::{kinds, Command, Notification, NotificationBatch};
