use bytes::Buf;

/// Errors that can occur while encoding or decoding diagnostics messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtoError {
    /// The header magic did not match, or the header could not be read whole.
    #[error("malformed header: {reason}")]
    HeaderMalformed { reason: &'static str },

    /// A string declared a length of zero (it must at least count its terminator).
    #[error("invalid string length (0)")]
    InvalidLength,

    /// Fewer bytes were available than a length field declared.
    #[error("truncated stream ({needed} bytes needed, {available} available)")]
    TruncatedStream { needed: usize, available: usize },

    /// The endpoint answered with the Server/Error response.
    #[error("diagnostic server: error code {code:#x}")]
    DiagnosticServerError { code: u32 },

    /// The session id in a response does not match the one the caller asked for.
    #[error("session ID mismatch (expected {expected:#x}, got {actual:#x})")]
    SessionIdMismatch { expected: u64, actual: u64 },

    /// A decoded string is not valid UTF-16.
    #[error("string is not valid UTF-16")]
    InvalidString,

    /// A string is too long for its u32 length prefix.
    #[error("string too long to encode ({len} UTF-16 code units)")]
    StringTooLong { len: usize },

    /// The payload does not fit the u16 size field of the header.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// A payload field holds a value outside its enumeration.
    #[error("invalid {field} value {value}")]
    InvalidField { field: &'static str, value: u64 },

    /// The stream accepted zero bytes while a message was being written.
    #[error("connection closed (incomplete message)")]
    ConnectionClosed,

    /// An I/O error occurred while reading or writing messages.
    #[error("message I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ProtoError>;

/// Fail with `TruncatedStream` unless `src` still holds `needed` bytes.
pub(crate) fn ensure_remaining<B: Buf + ?Sized>(src: &B, needed: usize) -> Result<()> {
    let available = src.remaining();
    if available < needed {
        return Err(ProtoError::TruncatedStream { needed, available });
    }
    Ok(())
}
