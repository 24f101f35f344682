use diagipc_proto::ProtoError;
use diagipc_transport::TransportError;

/// Errors that can occur in client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Could not reach the endpoint.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Encoding, decoding, or an error reported by the endpoint.
    #[error("protocol error: {0}")]
    Proto(#[from] ProtoError),
}

impl ClientError {
    /// The endpoint's HRESULT, if it answered with an error.
    pub fn server_code(&self) -> Option<u32> {
        match self {
            ClientError::Proto(ProtoError::DiagnosticServerError { code }) => Some(*code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
