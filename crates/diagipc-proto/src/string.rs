//! Length-prefixed UTF-16LE strings.
//!
//! A non-empty string is a u32 LE count of UTF-16 code units (terminator
//! included), the code units, then a `u16` zero. An empty string is written
//! as the bare `u16` zero with no prefix. Runtimes reading our payloads
//! accept that form, so it is reproduced as-is; note that it is not what
//! [`decode_string`] accepts.

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{ensure_remaining, ProtoError, Result};

/// Number of bytes [`encode_string`] writes for `s`.
pub fn encoded_len(s: &str) -> usize {
    if s.is_empty() {
        2
    } else {
        4 + 2 * (s.encode_utf16().count() + 1)
    }
}

/// Encode `s` into `dst`.
pub fn encode_string(s: &str, dst: &mut BytesMut) -> Result<()> {
    if s.is_empty() {
        dst.put_u16_le(0);
        return Ok(());
    }

    let units = s.encode_utf16().count();
    let len = u32::try_from(units + 1).map_err(|_| ProtoError::StringTooLong { len: units })?;

    dst.reserve(4 + 2 * (units + 1));
    dst.put_u32_le(len);
    for unit in s.encode_utf16() {
        dst.put_u16_le(unit);
    }
    dst.put_u16_le(0);
    Ok(())
}

/// Decode a string as the runtime writes it in responses.
///
/// The declared length counts the terminator, so zero is `InvalidLength`.
pub fn decode_string<B: Buf + ?Sized>(src: &mut B) -> Result<String> {
    ensure_remaining(src, 4)?;
    let len = src.get_u32_le();
    if len == 0 {
        return Err(ProtoError::InvalidLength);
    }
    decode_units(src, len)
}

/// Decode a string written by [`encode_string`], empty-string form included.
///
/// A leading `u16` zero is the empty string. Otherwise it is the low half of
/// the u32 length; a real length with a zero low half cannot occur inside a
/// message whose total size fits in a u16.
pub fn decode_payload_string<B: Buf + ?Sized>(src: &mut B) -> Result<String> {
    ensure_remaining(src, 2)?;
    let low = src.get_u16_le();
    if low == 0 {
        return Ok(String::new());
    }
    ensure_remaining(src, 2)?;
    let high = src.get_u16_le();
    let len = (u32::from(high) << 16) | u32::from(low);
    decode_units(src, len)
}

fn decode_units<B: Buf + ?Sized>(src: &mut B, len: u32) -> Result<String> {
    let len = len as usize;
    let needed = len
        .checked_mul(2)
        .ok_or(ProtoError::StringTooLong { len })?;
    ensure_remaining(src, needed)?;

    let mut units = Vec::with_capacity(len);
    for _ in 0..len {
        units.push(src.get_u16_le());
    }
    // Last unit is the terminator.
    units.pop();
    String::from_utf16(&units).map_err(|_| ProtoError::InvalidString)
}
