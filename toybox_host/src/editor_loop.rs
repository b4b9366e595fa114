use crate::params::{ParamId, ParamValue, PluginParams};
use crate::protocol::{Command, InboundMsg, Notification, NotificationBatch, OutboundMsg};
use crossbeam_channel::{Receiver, Sender, TryRecvError};

/// Runs on the host's GUI/timer thread. Each tick drains UI commands, applies
/// them, then reports every parameter whose change flag is raised.
pub struct EditorLoop {
    inbound_rx: Receiver<InboundMsg>,
    outbound_tx: Sender<OutboundMsg>,
}

impl EditorLoop {
    pub fn new(inbound_rx: Receiver<InboundMsg>, outbound_tx: Sender<OutboundMsg>) -> Self {
        Self {
            inbound_rx,
            outbound_tx,
        }
    }

    pub fn tick(&mut self, params: &dyn PluginParams) {
        loop {
            match self.inbound_rx.try_recv() {
                Ok(InboundMsg::UiConnected { socket_addr }) => {
                    tracing::info!(%socket_addr, "editor ui connected");
                }
                Ok(InboundMsg::UiDisconnected) => {
                    tracing::info!("editor ui disconnected");
                }
                Ok(InboundMsg::Ipc { payload }) => self.handle_ipc(params, &payload),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        self.report_changes(params);
    }

    fn handle_ipc(&mut self, params: &dyn PluginParams, payload: &str) {
        let cmd: Command = match serde_json::from_str(payload) {
            Ok(c) => c,
            Err(e) => {
                tracing::debug!(error = %e, "ignoring unrecognized command");
                return;
            }
        };

        let (id, value) = match cmd {
            Command::Init => {
                self.send_snapshot(params);
                return;
            }
            Command::SetPreset { preset } => (ParamId::Preset, ParamValue::Choice(preset)),
            Command::SetGain { value } | Command::SetOutputGain { value } => {
                (ParamId::OutputGain, ParamValue::Level(value))
            }
            Command::SetReverbDryWet { value } => (ParamId::ReverbDryWet, ParamValue::Level(value)),
            Command::SetReverbType { preset } => (ParamId::ReverbType, ParamValue::Choice(preset)),
            Command::SetFilterType { preset } => (ParamId::FilterType, ParamValue::Choice(preset)),
        };

        if let Err(e) = params.set(id, value) {
            tracing::warn!(error = %e, "command rejected");
        }
    }

    /// Snapshot carries current values, so pending change flags are consumed.
    fn send_snapshot(&mut self, params: &dyn PluginParams) {
        let items = ParamId::ALL
            .iter()
            .map(|&id| {
                let _ = params.take_changed(id);
                notification_for(params, id)
            })
            .collect::<Vec<_>>();
        tracing::debug!(count = items.len(), "sending state snapshot");
        self.send(NotificationBatch::Many(items));
    }

    fn report_changes(&mut self, params: &dyn PluginParams) {
        for id in ParamId::ALL {
            if params.take_changed(id) {
                self.send(NotificationBatch::One(notification_for(params, id)));
            }
        }
    }

    fn send(&mut self, batch: NotificationBatch) {
        // Best-effort: a full queue drops the update; the next Init resyncs.
        if self
            .outbound_tx
            .try_send(OutboundMsg::Send { batch })
            .is_err()
        {
            tracing::warn!("outbound queue full, dropping notification");
        }
    }
}

fn notification_for(params: &dyn PluginParams, id: ParamId) -> Notification {
    Notification::new(id.notification_kind(), params.get(id).to_json())
}
