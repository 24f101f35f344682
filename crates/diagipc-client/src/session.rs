use diagipc_transport::IpcStream;
use tracing::debug;

use crate::client::DiagnosticClient;
use crate::error::Result;

/// A running EventPipe session started by `collect_tracing`.
///
/// The runtime writes trace data to [`stream`](Self::stream_mut) until the
/// session is stopped or the stream is closed. Parsing that data is up to
/// the caller.
#[derive(Debug)]
pub struct TracingSession {
    session_id: u64,
    stream: IpcStream,
}

impl TracingSession {
    pub(crate) fn new(session_id: u64, stream: IpcStream) -> Self {
        Self { session_id, stream }
    }

    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    /// The connection carrying this session's trace data.
    pub fn stream_mut(&mut self) -> &mut IpcStream {
        &mut self.stream
    }

    /// Take the trace stream, giving up the ability to call [`stop`](Self::stop).
    pub fn into_stream(self) -> IpcStream {
        self.stream
    }

    /// Stop the session through a second connection.
    ///
    /// Returns the trace stream: after acknowledging the stop the runtime
    /// still writes its buffered events (and the rundown, if requested),
    /// then closes the connection. Read it to EOF to keep that tail.
    ///
    /// If the stop request fails, the trace stream is shut down so the
    /// runtime ends the session on disconnect. Fails with `SessionIdMismatch`
    /// if the endpoint reports stopping a different session.
    pub fn stop(self, client: &DiagnosticClient) -> Result<IpcStream> {
        if let Err(err) = client.stop_tracing(self.session_id) {
            if let Err(shutdown) = self.stream.shutdown() {
                debug!(%shutdown, "trace stream already closed");
            }
            return Err(err);
        }
        Ok(self.stream)
    }
}
