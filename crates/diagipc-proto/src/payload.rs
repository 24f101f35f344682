//! Request payloads.
//!
//! Integers are little-endian with no padding between fields. Providers are
//! written in the order given; the runtime treats that order as significant.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::command::{Command, DumpCommand, EventPipeCommand, ProcessCommand};
use crate::error::{ensure_remaining, ProtoError, Result};
use crate::string::{decode_payload_string, encode_string, encoded_len};

/// Trace serialization format requested from EventPipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum TraceFormat {
    NetPerf = 0,
    NetTrace = 1,
}

impl TryFrom<u32> for TraceFormat {
    type Error = ProtoError;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            0 => Ok(Self::NetPerf),
            1 => Ok(Self::NetTrace),
            other => Err(ProtoError::InvalidField {
                field: "trace format",
                value: u64::from(other),
            }),
        }
    }
}

/// Standard EventSource verbosity levels, for building `log_level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum EventLevel {
    LogAlways = 0,
    Critical = 1,
    Error = 2,
    Warning = 3,
    Informational = 4,
    Verbose = 5,
}

impl From<EventLevel> for u32 {
    fn from(level: EventLevel) -> Self {
        level as u32
    }
}

/// One tracing provider's filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub keywords: u64,
    pub log_level: u32,
    pub provider_name: String,
    pub filter_data: String,
}

impl ProviderConfig {
    /// A provider with every keyword enabled at `Verbose` and no filter.
    pub fn new(provider_name: impl Into<String>) -> Self {
        Self {
            keywords: u64::MAX,
            log_level: EventLevel::Verbose.into(),
            provider_name: provider_name.into(),
            filter_data: String::new(),
        }
    }

    fn encoded_len(&self) -> usize {
        8 + 4 + encoded_len(&self.provider_name) + encoded_len(&self.filter_data)
    }

    fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        dst.put_u64_le(self.keywords);
        dst.put_u32_le(self.log_level);
        encode_string(&self.provider_name, dst)?;
        encode_string(&self.filter_data, dst)
    }

    fn decode<B: Buf>(src: &mut B) -> Result<Self> {
        ensure_remaining(src, 12)?;
        let keywords = src.get_u64_le();
        let log_level = src.get_u32_le();
        let provider_name = decode_payload_string(src)?;
        let filter_data = decode_payload_string(src)?;
        Ok(Self {
            keywords,
            log_level,
            provider_name,
            filter_data,
        })
    }
}

fn encode_providers(providers: &[ProviderConfig], dst: &mut BytesMut) -> Result<()> {
    let count = u32::try_from(providers.len()).map_err(|_| ProtoError::PayloadTooLarge {
        size: providers.len(),
        max: u32::MAX as usize,
    })?;
    dst.put_u32_le(count);
    for provider in providers {
        provider.encode(dst)?;
    }
    Ok(())
}

fn decode_providers<B: Buf>(src: &mut B) -> Result<Vec<ProviderConfig>> {
    ensure_remaining(src, 4)?;
    let count = src.get_u32_le() as usize;
    // Each provider takes at least 16 bytes; don't trust `count` for capacity.
    let mut providers = Vec::with_capacity(count.min(src.remaining() / 16));
    for _ in 0..count {
        providers.push(ProviderConfig::decode(src)?);
    }
    Ok(providers)
}

/// Body of `EventPipe/CollectTracing`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectTracingPayload {
    pub circular_buffer_size_mb: u32,
    pub format: TraceFormat,
    pub providers: Vec<ProviderConfig>,
}

impl CollectTracingPayload {
    pub const COMMAND: Command = Command::EventPipe(EventPipeCommand::CollectTracing);

    /// Number of bytes [`encode`](Self::encode) writes.
    pub fn encoded_len(&self) -> usize {
        12 + self
            .providers
            .iter()
            .map(ProviderConfig::encoded_len)
            .sum::<usize>()
    }

    pub fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        dst.reserve(self.encoded_len());
        dst.put_u32_le(self.circular_buffer_size_mb);
        dst.put_u32_le(self.format as u32);
        encode_providers(&self.providers, dst)
    }

    pub fn to_bytes(&self) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode(&mut buf)?;
        Ok(buf.freeze())
    }

    /// Decode a payload produced by [`encode`](Self::encode).
    pub fn from_bytes(mut src: &[u8]) -> Result<Self> {
        ensure_remaining(&src, 8)?;
        let circular_buffer_size_mb = src.get_u32_le();
        let format = TraceFormat::try_from(src.get_u32_le())?;
        let providers = decode_providers(&mut src)?;
        Ok(Self {
            circular_buffer_size_mb,
            format,
            providers,
        })
    }
}

/// Body of `EventPipe/CollectTracing2`: CollectTracing plus a rundown flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectTracing2Payload {
    pub circular_buffer_size_mb: u32,
    pub format: TraceFormat,
    /// Ask the runtime to emit rundown events when the session stops.
    pub request_rundown: bool,
    pub providers: Vec<ProviderConfig>,
}

impl CollectTracing2Payload {
    pub const COMMAND: Command = Command::EventPipe(EventPipeCommand::CollectTracing2);

    pub fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        dst.put_u32_le(self.circular_buffer_size_mb);
        dst.put_u32_le(self.format as u32);
        dst.put_u8(u8::from(self.request_rundown));
        encode_providers(&self.providers, dst)
    }

    pub fn to_bytes(&self) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        self.encode(&mut buf)?;
        Ok(buf.freeze())
    }

    pub fn from_bytes(mut src: &[u8]) -> Result<Self> {
        ensure_remaining(&src, 9)?;
        let circular_buffer_size_mb = src.get_u32_le();
        let format = TraceFormat::try_from(src.get_u32_le())?;
        let request_rundown = match src.get_u8() {
            0 => false,
            1 => true,
            other => {
                return Err(ProtoError::InvalidField {
                    field: "request rundown",
                    value: u64::from(other),
                })
            }
        };
        let providers = decode_providers(&mut src)?;
        Ok(Self {
            circular_buffer_size_mb,
            format,
            request_rundown,
            providers,
        })
    }
}

impl From<CollectTracingPayload> for CollectTracing2Payload {
    fn from(payload: CollectTracingPayload) -> Self {
        Self {
            circular_buffer_size_mb: payload.circular_buffer_size_mb,
            format: payload.format,
            request_rundown: true,
            providers: payload.providers,
        }
    }
}

/// Body of `EventPipe/StopTracing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopTracingPayload {
    pub session_id: u64,
}

impl StopTracingPayload {
    pub const COMMAND: Command = Command::EventPipe(EventPipeCommand::StopTracing);

    pub fn to_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(&self.session_id.to_le_bytes())
    }
}

/// Kind of dump written by `Dump/GenerateCoreDump`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum DumpType {
    Normal = 1,
    WithHeap = 2,
    Triage = 3,
    Full = 4,
}

/// Body of `Dump/GenerateCoreDump`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateCoreDumpPayload {
    /// Path the runtime writes the dump to, on the target's file system.
    pub dump_name: String,
    pub dump_type: DumpType,
    /// Non-zero enables the runtime's own dump diagnostics logging.
    pub diagnostics: u32,
}

impl GenerateCoreDumpPayload {
    pub const COMMAND: Command = Command::Dump(DumpCommand::GenerateCoreDump);

    pub fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        encode_string(&self.dump_name, dst)?;
        dst.put_u32_le(self.dump_type as u32);
        dst.put_u32_le(self.diagnostics);
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        self.encode(&mut buf)?;
        Ok(buf.freeze())
    }
}

/// `Process/ProcessInfo2` request; its payload is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessInfo2Request;

impl ProcessInfo2Request {
    pub const COMMAND: Command = Command::Process(ProcessCommand::ProcessInfo2);
}
