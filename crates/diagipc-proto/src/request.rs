//! Typed request/response pairing.
//!
//! A diagnostics exchange is single-shot: send one request, read one header,
//! then either decode the Server/Error code or the body that belongs to the
//! request that was sent. [`Request::Response`] fixes that pairing at compile
//! time.

use std::io::{Read, Write};

use bytes::{Buf, BytesMut};
use tracing::debug;

use crate::command::Command;
use crate::error::Result;
use crate::payload::{
    CollectTracing2Payload, CollectTracingPayload, GenerateCoreDumpPayload, ProcessInfo2Request,
    StopTracingPayload,
};
use crate::reader::{read_body, read_response_header};
use crate::response::{
    CollectTracingResponse, GenerateCoreDumpResponse, ProcessInfo2Response, StopTracingResponse,
};
use crate::writer::write_message;

/// An outbound command with a known response body.
pub trait Request {
    type Response: Response;

    fn command(&self) -> Command;

    /// Append the payload (without header) to `dst`.
    fn encode(&self, dst: &mut BytesMut) -> Result<()>;
}

/// A response body decoded after a successful header.
pub trait Response: Sized {
    fn decode<B: Buf>(body: &mut B) -> Result<Self>;
}

impl Request for CollectTracingPayload {
    type Response = CollectTracingResponse;

    fn command(&self) -> Command {
        Self::COMMAND
    }

    fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        CollectTracingPayload::encode(self, dst)
    }
}

impl Request for CollectTracing2Payload {
    type Response = CollectTracingResponse;

    fn command(&self) -> Command {
        Self::COMMAND
    }

    fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        CollectTracing2Payload::encode(self, dst)
    }
}

impl Request for StopTracingPayload {
    type Response = StopTracingResponse;

    fn command(&self) -> Command {
        Self::COMMAND
    }

    fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        dst.extend_from_slice(&self.session_id.to_le_bytes());
        Ok(())
    }
}

impl Request for GenerateCoreDumpPayload {
    type Response = GenerateCoreDumpResponse;

    fn command(&self) -> Command {
        Self::COMMAND
    }

    fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        GenerateCoreDumpPayload::encode(self, dst)
    }
}

impl Request for ProcessInfo2Request {
    type Response = ProcessInfo2Response;

    fn command(&self) -> Command {
        Self::COMMAND
    }

    fn encode(&self, _dst: &mut BytesMut) -> Result<()> {
        Ok(())
    }
}

/// Send `request` and read its response from the same stream (blocking).
///
/// The stream is left positioned just past the response body, so anything
/// the endpoint sends afterwards (trace data, for CollectTracing) is still
/// unread.
pub fn exchange<S, Q>(stream: &mut S, request: &Q) -> Result<Q::Response>
where
    S: Read + Write + ?Sized,
    Q: Request + ?Sized,
{
    let command = request.command();
    let mut payload = BytesMut::new();
    request.encode(&mut payload)?;

    write_message(
        stream,
        command.command_set() as u8,
        command.command_id(),
        &payload,
    )?;

    let header = read_response_header(stream)?;
    let mut body = read_body(stream, &header)?;
    debug!(
        request = command.name(),
        response_size = header.size,
        "received diagnostics response"
    );
    Q::Response::decode(&mut body)
}
