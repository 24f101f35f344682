use std::path::PathBuf;

/// Errors raised while reaching a diagnostics endpoint.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to connect to the endpoint socket.
    #[error("failed to connect to diagnostics endpoint {path}: {source}")]
    Connect {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An I/O error occurred on the transport stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The socket path is too long for the platform.
    #[error("socket path too long ({len} bytes, max {max}): {path}")]
    PathTooLong {
        path: PathBuf,
        len: usize,
        max: usize,
    },

    /// This platform has no supported transport.
    #[error("no diagnostics transport available on this platform")]
    Unsupported,
}

pub type Result<T> = std::result::Result<T, TransportError>;
