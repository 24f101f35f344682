use std::fmt;
use std::io;

use diagipc_client::ClientError;
use diagipc_proto::{ErrorResponse, ProtoError};
use diagipc_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const DIAGNOSTIC_SERVER: i32 = 70;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::ConnectionRefused | io::ErrorKind::NotFound => TRANSPORT_ERROR,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Connect { source, .. } | TransportError::Io(source) => {
            io_error(context, source)
        }
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn proto_error(context: &str, err: ProtoError) -> CliError {
    match err {
        ProtoError::Io(source) => io_error(context, source),
        ProtoError::DiagnosticServerError { code } => {
            let detail = ErrorResponse { code }
                .describe()
                .map(|d| format!(" ({d})"))
                .unwrap_or_default();
            CliError::new(DIAGNOSTIC_SERVER, format!("{context}: {err}{detail}"))
        }
        ProtoError::ConnectionClosed | ProtoError::SessionIdMismatch { .. } => {
            CliError::new(FAILURE, format!("{context}: {err}"))
        }
        ProtoError::PayloadTooLarge { .. } | ProtoError::StringTooLong { .. } => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}

pub fn client_error(context: &str, err: ClientError) -> CliError {
    match err {
        ClientError::Transport(err) => transport_error(context, err),
        ClientError::Proto(err) => proto_error(context, err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_maps_to_dedicated_code_with_description() {
        let err = client_error(
            "process-info failed",
            ClientError::Proto(ProtoError::DiagnosticServerError { code: 0x8013_1385 }),
        );
        assert_eq!(err.code, DIAGNOSTIC_SERVER);
        assert!(err.message.ends_with("(unknown command)"));
    }

    #[test]
    fn timeouts_map_to_124() {
        let err = client_error(
            "read failed",
            ClientError::Proto(ProtoError::Io(io::Error::from(io::ErrorKind::WouldBlock))),
        );
        assert_eq!(err.code, TIMEOUT);
    }

    #[test]
    fn malformed_responses_are_invalid_data() {
        let err = proto_error("decode", ProtoError::InvalidLength);
        assert_eq!(err.code, DATA_INVALID);
        let err = proto_error(
            "decode",
            ProtoError::HeaderMalformed {
                reason: "magic mismatch",
            },
        );
        assert_eq!(err.code, DATA_INVALID);
    }

    #[test]
    fn session_mismatch_and_closed_connection_are_failures() {
        let err = proto_error(
            "stop failed",
            ProtoError::SessionIdMismatch {
                expected: 1,
                actual: 2,
            },
        );
        assert_eq!(err.code, FAILURE);
        assert_eq!(proto_error("send", ProtoError::ConnectionClosed).code, FAILURE);
    }

    #[test]
    fn missing_socket_is_transport_error() {
        let err = transport_error(
            "connect failed",
            TransportError::Connect {
                path: "/tmp/nope".into(),
                source: io::Error::from(io::ErrorKind::NotFound),
            },
        );
        assert_eq!(err.code, TRANSPORT_ERROR);
    }
}
