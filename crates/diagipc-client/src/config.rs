use std::time::Duration;

/// Default per-operation I/O timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for [`DiagnosticClient`](crate::DiagnosticClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Read timeout while waiting for a response. `None` blocks forever.
    pub read_timeout: Option<Duration>,
    /// Write timeout while sending a request. `None` blocks forever.
    pub write_timeout: Option<Duration>,
}

impl ClientConfig {
    /// Same timeout for reads and writes.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            read_timeout: Some(timeout),
            write_timeout: Some(timeout),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }
}
