/// The host's single write primitive (the web view's `ipc.postMessage`).
///
/// Implementations receive one UTF-8 JSON document per call.
pub trait HostTransport {
    fn post_message(&self, payload: String) -> Result<(), String>;
}
