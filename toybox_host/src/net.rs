use crate::protocol::{InboundMsg, NotificationBatch, OutboundMsg};
use crossbeam_channel::{Receiver, Sender, TryRecvError, TrySendError};
use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tungstenite::protocol::Message;

/// Where a development UI build expects the host.
pub const WS_ADDR: &str = "127.0.0.1:9001";

struct ActiveClient {
    ws: tungstenite::WebSocket<TcpStream>,
    socket_addr: SocketAddr,
}

/// WebSocket stand-in for the web view IPC: one text frame per command in,
/// one JSON document per frame out. Single-client policy.
pub struct NetworkThread {
    listen_addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    join_handle: Mutex<Option<JoinHandle<()>>>,
}

impl NetworkThread {
    pub fn spawn(in_tx: Sender<InboundMsg>, out_rx: Receiver<OutboundMsg>) -> std::io::Result<Self> {
        Self::spawn_with_addr(WS_ADDR, in_tx, out_rx)
    }

    pub fn spawn_with_addr(
        addr: &str,
        in_tx: Sender<InboundMsg>,
        out_rx: Receiver<OutboundMsg>,
    ) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr)?;
        listener.set_nonblocking(true)?;
        let listen_addr = listener.local_addr()?;
        tracing::info!(%listen_addr, "dev bridge listening");

        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_for_thread = Arc::clone(&shutdown);

        let join_handle = thread::spawn(move || {
            DevServer {
                listener,
                in_tx,
                out_rx,
                client: None,
            }
            .run(&shutdown_for_thread)
        });

        Ok(Self {
            listen_addr,
            shutdown,
            join_handle: Mutex::new(Some(join_handle)),
        })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        self.listen_addr
    }

    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Ok(mut h) = self.join_handle.lock() {
            if let Some(h) = h.take() {
                let _ = h.join();
            }
        }
    }
}

impl Drop for NetworkThread {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// What to do with the client after it sent a frame.
enum FrameOutcome {
    Keep,
    Drop,
}

struct DevServer {
    listener: TcpListener,
    in_tx: Sender<InboundMsg>,
    out_rx: Receiver<OutboundMsg>,
    client: Option<ActiveClient>,
}

impl DevServer {
    fn run(mut self, shutdown: &AtomicBool) {
        while !shutdown.load(Ordering::Relaxed) {
            self.accept_pending();
            if !self.flush_outbound() {
                break;
            }
            if self.client.is_some() {
                self.read_one();
            } else {
                thread::sleep(Duration::from_millis(25));
            }
        }
        if let Some(mut client) = self.client.take() {
            let _ = client.ws.close(None);
        }
    }

    /// Takes every pending connection; the newest one becomes the client.
    fn accept_pending(&mut self) {
        loop {
            let (stream, socket_addr) = match self.listener.accept() {
                Ok(pair) => pair,
                Err(e) if e.kind() == ErrorKind::WouldBlock => return,
                Err(e) => {
                    tracing::warn!(error = %e, "ws accept failed");
                    return;
                }
            };
            let _ = stream.set_nonblocking(false);
            let _ = stream.set_nodelay(true);
            let _ = stream.set_read_timeout(Some(Duration::from_millis(30)));
            let _ = stream.set_write_timeout(Some(Duration::from_millis(200)));

            match tungstenite::accept(stream) {
                Ok(ws) => {
                    if let Some(prev) = &self.client {
                        tracing::info!(
                            addr = %prev.socket_addr,
                            "new ui connection supersedes the old one"
                        );
                        self.drop_client();
                    }
                    let _ = self.in_tx.try_send(InboundMsg::UiConnected { socket_addr });
                    self.client = Some(ActiveClient { ws, socket_addr });
                }
                Err(e) => tracing::warn!(%socket_addr, error = %e, "ws handshake failed"),
            }
        }
    }

    /// Writes queued notifications. With no client they are discarded since
    /// a new UI asks for a snapshot anyway. Returns false once the editor
    /// side has hung up.
    fn flush_outbound(&mut self) -> bool {
        loop {
            let batch = match self.out_rx.try_recv() {
                Ok(OutboundMsg::Send { batch }) => batch,
                Err(TryRecvError::Empty) => return true,
                Err(TryRecvError::Disconnected) => return false,
            };
            let Some(client) = self.client.as_mut() else {
                continue;
            };
            if let Err(e) = send_batch(&mut client.ws, &batch) {
                tracing::debug!(error = %e, "write to ui failed");
                self.drop_client();
            }
        }
    }

    /// Reads at most one frame; the socket's read timeout bounds the wait.
    fn read_one(&mut self) {
        let Some(client) = self.client.as_mut() else {
            return;
        };
        let read = client.ws.read();
        let outcome = match read {
            Ok(msg) => self.on_frame(msg),
            Err(tungstenite::Error::Io(e))
                if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
            {
                FrameOutcome::Keep
            }
            Err(e) => {
                tracing::debug!(error = %e, "ui connection closed");
                FrameOutcome::Drop
            }
        };
        if let FrameOutcome::Drop = outcome {
            self.drop_client();
        }
    }

    fn on_frame(&mut self, msg: Message) -> FrameOutcome {
        let payload = match msg {
            Message::Text(s) => s.to_string(),
            Message::Ping(data) => {
                if let Some(client) = self.client.as_mut() {
                    let _ = client.ws.send(Message::Pong(data));
                }
                return FrameOutcome::Keep;
            }
            Message::Close(_) => return FrameOutcome::Drop,
            Message::Binary(_) | Message::Pong(_) | Message::Frame(_) => {
                return FrameOutcome::Keep
            }
        };

        match self.in_tx.try_send(InboundMsg::Ipc { payload }) {
            Ok(()) => FrameOutcome::Keep,
            Err(TrySendError::Full(_)) => {
                tracing::warn!("inbound queue full, dropping command");
                FrameOutcome::Keep
            }
            Err(TrySendError::Disconnected(_)) => FrameOutcome::Drop,
        }
    }

    /// Closes the current client, if any, and tells the editor loop.
    fn drop_client(&mut self) {
        if let Some(mut client) = self.client.take() {
            let _ = client.ws.close(None);
            let _ = self.in_tx.try_send(InboundMsg::UiDisconnected);
        }
    }
}

fn send_batch(
    ws: &mut tungstenite::WebSocket<TcpStream>,
    batch: &NotificationBatch,
) -> Result<(), tungstenite::Error> {
    let payload = serde_json::to_string(batch)
        .map_err(|e| tungstenite::Error::Io(std::io::Error::new(ErrorKind::InvalidData, e)))?;
    ws.send(Message::Text(payload.into()))
}
