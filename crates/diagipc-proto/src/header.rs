use std::io::Read;

use bytes::{BufMut, BytesMut};

use crate::command::{CommandSet, ServerCommand};
use crate::error::{ProtoError, Result};
use crate::reader::read_full;

/// Header size: magic (14) + size (2) + command set (1) + command id (1) + reserved (2).
pub const HEADER_SIZE: usize = 20;

/// `"DOTNET_IPC_V1"` followed by a NUL byte.
pub const MAGIC: [u8; 14] = *b"DOTNET_IPC_V1\0";

/// Largest payload the u16 size field can describe.
pub const MAX_PAYLOAD: usize = u16::MAX as usize - HEADER_SIZE;

/// A decoded message header. The magic is checked on read and not kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Total message size, header included.
    pub size: u16,
    pub command_set: u8,
    pub command_id: u8,
    pub reserved: u16,
}

impl Header {
    /// Payload length implied by `size`.
    pub fn payload_len(&self) -> Result<usize> {
        (self.size as usize)
            .checked_sub(HEADER_SIZE)
            .ok_or(ProtoError::HeaderMalformed {
                reason: "size smaller than header",
            })
    }

    /// Whether this is the Server/Error response.
    pub fn is_error(&self) -> bool {
        self.command_set == CommandSet::Server as u8
            && self.command_id == ServerCommand::Error as u8
    }

    /// Whether this is the Server/Ok response.
    pub fn is_ok(&self) -> bool {
        self.command_set == CommandSet::Server as u8 && self.command_id == ServerCommand::Ok as u8
    }
}

/// Encode a header into `dst`.
///
/// Wire format (little-endian):
/// ```text
/// ┌──────────────────┬──────────┬──────────┬──────────┬───────────┐
/// │ Magic (14B)      │ Size     │ Cmd set  │ Cmd id   │ Reserved  │
/// │ "DOTNET_IPC_V1\0"│ (2B LE)  │ (1B)     │ (1B)     │ (2B) = 0  │
/// └──────────────────┴──────────┴──────────┴──────────┴───────────┘
/// ```
/// `size` is `HEADER_SIZE + payload_len`.
pub fn write_header(
    dst: &mut BytesMut,
    command_set: u8,
    command_id: u8,
    payload_len: usize,
) -> Result<()> {
    if payload_len > MAX_PAYLOAD {
        return Err(ProtoError::PayloadTooLarge {
            size: payload_len,
            max: MAX_PAYLOAD,
        });
    }
    dst.reserve(HEADER_SIZE);
    dst.put_slice(&MAGIC);
    dst.put_u16_le((HEADER_SIZE + payload_len) as u16);
    dst.put_u8(command_set);
    dst.put_u8(command_id);
    dst.put_u16_le(0);
    Ok(())
}

/// Decode a header from exactly [`HEADER_SIZE`] bytes.
pub fn decode_header(src: &[u8; HEADER_SIZE]) -> Result<Header> {
    if src[..14] != MAGIC {
        return Err(ProtoError::HeaderMalformed {
            reason: "magic mismatch",
        });
    }
    Ok(Header {
        size: u16::from_le_bytes([src[14], src[15]]),
        command_set: src[16],
        command_id: src[17],
        reserved: u16::from_le_bytes([src[18], src[19]]),
    })
}

/// Read and validate a header from a stream (blocking).
///
/// `size` is not checked against what the stream still holds.
pub fn read_header<R: Read + ?Sized>(reader: &mut R) -> Result<Header> {
    let mut buf = [0u8; HEADER_SIZE];
    let read = read_full(reader, &mut buf)?;
    if read < HEADER_SIZE {
        return Err(ProtoError::HeaderMalformed {
            reason: "short read",
        });
    }
    decode_header(&buf)
}
