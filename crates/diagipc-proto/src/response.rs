//! Response bodies.
//!
//! Each decoder reads the body that follows a non-error header; the
//! Server/Error branch is handled before any of these run (see
//! [`read_response_header`](crate::reader::read_response_header)).

use bytes::Buf;

use crate::error::{ensure_remaining, ProtoError, Result};
use crate::request::Response;
use crate::string::decode_string;

/// Body of the Server/Error response: an HRESULT from the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: u32,
}

impl ErrorResponse {
    /// Short description of the error codes the diagnostics server is known to return.
    pub fn describe(&self) -> Option<&'static str> {
        match self.code {
            0x8013_1384 => Some("bad encoding"),
            0x8013_1385 => Some("unknown command"),
            0x8013_1386 => Some("unknown magic"),
            0x8013_1515 => Some("not supported"),
            0x8013_135B => Some("not yet available"),
            0x8013_1371 => Some("runtime uninitialized"),
            0x8000_4005 => Some("unspecified failure"),
            0x8007_0057 => Some("invalid argument"),
            0x8007_000E => Some("out of memory"),
            _ => None,
        }
    }

    pub fn into_error(self) -> ProtoError {
        ProtoError::DiagnosticServerError { code: self.code }
    }
}

impl Response for ErrorResponse {
    fn decode<B: Buf>(body: &mut B) -> Result<Self> {
        ensure_remaining(body, 4)?;
        Ok(Self {
            code: body.get_u32_le(),
        })
    }
}

/// Answer to CollectTracing / CollectTracing2. Trace data follows on the
/// same stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectTracingResponse {
    pub session_id: u64,
}

impl Response for CollectTracingResponse {
    fn decode<B: Buf>(body: &mut B) -> Result<Self> {
        ensure_remaining(body, 8)?;
        Ok(Self {
            session_id: body.get_u64_le(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopTracingResponse {
    pub session_id: u64,
}

impl StopTracingResponse {
    /// Check that the endpoint stopped the session the caller asked about.
    pub fn expect_session(&self, expected: u64) -> Result<()> {
        if self.session_id != expected {
            return Err(ProtoError::SessionIdMismatch {
                expected,
                actual: self.session_id,
            });
        }
        Ok(())
    }
}

impl Response for StopTracingResponse {
    fn decode<B: Buf>(body: &mut B) -> Result<Self> {
        ensure_remaining(body, 8)?;
        Ok(Self {
            session_id: body.get_u64_le(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo2Response {
    pub process_id: u64,
    pub command_line: String,
    pub os: String,
    pub arch: String,
    /// Opaque GUID bytes, exactly as sent.
    pub runtime_cookie: [u8; 16],
    pub managed_entrypoint_assembly_name: String,
    pub clr_product_version: String,
}

impl Response for ProcessInfo2Response {
    fn decode<B: Buf>(body: &mut B) -> Result<Self> {
        ensure_remaining(body, 8)?;
        let process_id = body.get_u64_le();
        let command_line = decode_string(body)?;
        let os = decode_string(body)?;
        let arch = decode_string(body)?;
        ensure_remaining(body, 16)?;
        let mut runtime_cookie = [0u8; 16];
        body.copy_to_slice(&mut runtime_cookie);
        let managed_entrypoint_assembly_name = decode_string(body)?;
        let clr_product_version = decode_string(body)?;
        Ok(Self {
            process_id,
            command_line,
            os,
            arch,
            runtime_cookie,
            managed_entrypoint_assembly_name,
            clr_product_version,
        })
    }
}

/// Answer to GenerateCoreDump, carried by a Server/Ok header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateCoreDumpResponse {
    pub code: u32,
}

impl GenerateCoreDumpResponse {
    pub fn is_success(&self) -> bool {
        self.code == 0
    }
}

impl Response for GenerateCoreDumpResponse {
    fn decode<B: Buf>(body: &mut B) -> Result<Self> {
        ensure_remaining(body, 4)?;
        Ok(Self {
            code: body.get_u32_le(),
        })
    }
}
