use std::path::{Path, PathBuf};

use diagipc_proto::{
    exchange, CollectTracing2Payload, CollectTracingPayload, GenerateCoreDumpPayload,
    ProcessInfo2Request, ProcessInfo2Response, ProtoError, Request, StopTracingPayload,
};
use diagipc_transport::IpcStream;
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::error::Result;
use crate::session::TracingSession;

/// Client for one diagnostics endpoint, identified by its socket path.
///
/// Holds no connection; every call opens its own, so a client can be shared
/// between threads freely.
#[derive(Debug, Clone)]
pub struct DiagnosticClient {
    path: PathBuf,
    config: ClientConfig,
}

impl DiagnosticClient {
    /// Client with default timeouts.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::with_config(path, ClientConfig::default())
    }

    pub fn with_config(path: impl AsRef<Path>, config: ClientConfig) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            config,
        }
    }

    /// The endpoint socket path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Open a connection with the configured timeouts applied.
    pub fn connect(&self) -> Result<IpcStream> {
        #[cfg(not(unix))]
        {
            return Err(diagipc_transport::TransportError::Unsupported.into());
        }

        #[cfg(unix)]
        {
            let stream = diagipc_transport::UnixDomainSocket::connect(&self.path)?;
            stream.set_read_timeout(self.config.read_timeout)?;
            stream.set_write_timeout(self.config.write_timeout)?;
            debug!(path = ?self.path, peer_pid = ?stream.peer_pid(), "connected to endpoint");
            Ok(stream)
        }
    }

    /// Send any request on a fresh connection and decode its response.
    pub fn request<Q: Request + ?Sized>(&self, request: &Q) -> Result<Q::Response> {
        let mut stream = self.connect()?;
        let response = exchange(&mut stream, request)?;
        Ok(response)
    }

    /// Fetch process information from the runtime.
    pub fn process_info(&self) -> Result<ProcessInfo2Response> {
        let info = self.request(&ProcessInfo2Request)?;
        debug!(pid = info.process_id, os = %info.os, arch = %info.arch, "process info");
        Ok(info)
    }

    /// Start an EventPipe session. The returned session owns the trace stream.
    pub fn collect_tracing(&self, payload: &CollectTracingPayload) -> Result<TracingSession> {
        self.start_session(payload)
    }

    /// Start an EventPipe session with control over rundown.
    pub fn collect_tracing2(&self, payload: &CollectTracing2Payload) -> Result<TracingSession> {
        self.start_session(payload)
    }

    fn start_session<Q>(&self, payload: &Q) -> Result<TracingSession>
    where
        Q: Request<Response = diagipc_proto::CollectTracingResponse> + ?Sized,
    {
        let mut stream = self.connect()?;
        let started = exchange(&mut stream, payload)?;
        // Trace data arrives at the runtime's pace; don't time out reading it.
        stream.set_read_timeout(None)?;
        info!(session_id = started.session_id, "tracing session started");
        Ok(TracingSession::new(started.session_id, stream))
    }

    /// Stop an EventPipe session, checking the endpoint stopped the same one.
    pub fn stop_tracing(&self, session_id: u64) -> Result<()> {
        let stopped = self.request(&StopTracingPayload { session_id })?;
        stopped.expect_session(session_id)?;
        info!(session_id, "tracing session stopped");
        Ok(())
    }

    /// Ask the runtime to write a dump of itself to `payload.dump_name`.
    pub fn generate_core_dump(&self, payload: &GenerateCoreDumpPayload) -> Result<()> {
        let response = self.request(payload)?;
        if !response.is_success() {
            return Err(ProtoError::DiagnosticServerError {
                code: response.code,
            }
            .into());
        }
        info!(dump = %payload.dump_name, "core dump written");
        Ok(())
    }
}
