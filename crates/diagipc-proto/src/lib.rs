//! DOTNET_IPC_V1 message framing and payload codec.
//!
//! Every message to or from a .NET diagnostics endpoint is framed with a
//! fixed 20-byte header:
//! - 14 bytes of magic, `"DOTNET_IPC_V1\0"`
//! - a 2-byte little-endian total size (header included)
//! - a 1-byte command set and a 1-byte command id
//! - 2 reserved bytes, always zero on write
//!
//! followed by a command-specific payload. Strings inside payloads are
//! length-prefixed, null-terminated UTF-16LE (see [`string`]).
//!
//! Everything here is stateless and generic over `std::io::Read`/`Write`, so
//! the same code runs against a socket, a pipe or an in-memory buffer.

pub mod command;
pub mod error;
pub mod header;
pub mod payload;
pub mod reader;
pub mod request;
pub mod response;
pub mod string;
pub mod writer;

pub use command::{
    command_name, Command, CommandSet, DumpCommand, EventPipeCommand, ProcessCommand,
    ProfilerCommand, ServerCommand,
};
pub use error::{ProtoError, Result};
pub use header::{read_header, write_header, Header, HEADER_SIZE, MAGIC, MAX_PAYLOAD};
pub use payload::{
    CollectTracing2Payload, CollectTracingPayload, DumpType, EventLevel, GenerateCoreDumpPayload,
    ProcessInfo2Request, ProviderConfig, StopTracingPayload, TraceFormat,
};
pub use reader::{read_body, read_response_header, MessageReader};
pub use request::{exchange, Request, Response};
pub use response::{
    CollectTracingResponse, ErrorResponse, GenerateCoreDumpResponse, ProcessInfo2Response,
    StopTracingResponse,
};
pub use string::{decode_payload_string, decode_string, encode_string, encoded_len};
pub use writer::{write_message, MessageWriter};
