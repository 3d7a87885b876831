use thiserror::Error;

/// Failures reported by a device collaborator.
#[derive(Error, Debug)]
pub enum DeviceError {
    /// Bridge helper process failed to spawn
    #[error("failed to spawn device bridge '{command}' (is it on PATH?): {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading from or writing to the bridge pipes failed
    #[error("device bridge I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A request could not be serialized or a response could not be parsed
    #[error("device bridge JSON error ({context}): {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Response was well-formed JSON but not what the command expects
    #[error("unexpected device bridge response: {0}")]
    Protocol(String),

    /// Bridge reported that the command itself failed
    #[error("device command '{command}' failed: {message}")]
    Command { command: String, message: String },

    /// Frame payload was not valid base64
    #[error("frame payload is not valid base64: {0}")]
    FrameEncoding(#[from] base64::DecodeError),

    /// Bridge closed its stdout
    #[error("device bridge closed the connection")]
    Disconnected,
}
