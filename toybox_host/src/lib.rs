//! Native side of the editor bridge: applies UI commands to plug-in
//! parameters and reports parameter state back to the web view.

mod editor_loop;
mod net;
mod params;
mod protocol;

pub use crate::editor_loop::EditorLoop;
pub use crate::net::{NetworkThread, WS_ADDR};
pub use crate::params::{ParamError, ParamId, ParamStore, ParamValue, PluginParams};
pub use crate::protocol::{InboundMsg, OutboundMsg, INBOUND_CAP, OUTBOUND_CAP};
