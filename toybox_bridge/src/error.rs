use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("host bridge is not available")]
    BridgeUnavailable,
    #[error("malformed message from host: {0}")]
    MalformedMessage(#[source] serde_json::Error),
    #[error("invalid command: {0}")]
    InvalidCommand(String),
    #[error("command encoding failed: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("host transport write failed: {0}")]
    Transport(String),
    #[error("a handler for `{kind}` is already registered")]
    AlreadySubscribed { kind: String },
    #[error("bridge is already mounted")]
    AlreadyMounted,
}
