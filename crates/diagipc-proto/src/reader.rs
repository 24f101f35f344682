use std::io::{ErrorKind, Read};

use bytes::Bytes;
use tracing::{debug, trace};

use crate::command::command_name;
use crate::error::{ProtoError, Result};
use crate::header::{read_header, Header};
use crate::request::Response;

/// Fill `buf` from `reader`, retrying on `Interrupted`.
///
/// Returns how many bytes were read; less than `buf.len()` only at EOF.
pub(crate) fn read_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0usize;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(ProtoError::Io(err)),
        }
    }
    Ok(filled)
}

/// Read a response header, turning the Server/Error response into an error.
///
/// On success the header is consumed and the caller reads the body that
/// matches the request it sent. On Server/Error the 4-byte code is read and
/// returned as `DiagnosticServerError`.
pub fn read_response_header<R: Read + ?Sized>(reader: &mut R) -> Result<Header> {
    let header = read_header(reader)?;
    trace!(
        command = command_name(header.command_set, header.command_id),
        size = header.size,
        "read response header"
    );

    if !header.is_error() {
        return Ok(header);
    }

    let mut code = [0u8; 4];
    let read = read_full(reader, &mut code)?;
    if read < code.len() {
        return Err(ProtoError::TruncatedStream {
            needed: code.len(),
            available: read,
        });
    }
    let code = u32::from_le_bytes(code);
    debug!(code = format_args!("{code:#x}"), "diagnostic server returned error");
    Err(ProtoError::DiagnosticServerError { code })
}

/// Read exactly the payload `header` declares.
pub fn read_body<R: Read + ?Sized>(reader: &mut R, header: &Header) -> Result<Bytes> {
    let len = header.payload_len()?;
    let mut body = vec![0u8; len];
    let read = read_full(reader, &mut body)?;
    if read < len {
        return Err(ProtoError::TruncatedStream {
            needed: len,
            available: read,
        });
    }
    Ok(Bytes::from(body))
}

/// Reads diagnostics responses from any `Read` stream.
pub struct MessageReader<T> {
    inner: T,
}

impl<T: Read> MessageReader<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Read a raw header (no error-branch handling).
    pub fn read_header(&mut self) -> Result<Header> {
        read_header(&mut self.inner)
    }

    /// Read a header, failing on the Server/Error response.
    pub fn read_response_header(&mut self) -> Result<Header> {
        read_response_header(&mut self.inner)
    }

    /// Read a full response: header, error branch, then a `R` body.
    pub fn read_response<R: Response>(&mut self) -> Result<R> {
        let header = self.read_response_header()?;
        let mut body = read_body(&mut self.inner, &header)?;
        R::decode(&mut body)
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream, e.g. to read trace data that
    /// follows a CollectTracing response.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bytes::{BufMut, BytesMut};

    use super::*;
    use crate::header::write_header;
    use crate::response::{CollectTracingResponse, StopTracingResponse};

    fn error_response(code: u32) -> Vec<u8> {
        let mut buf = BytesMut::new();
        write_header(&mut buf, 0xFF, 0xFF, 4).unwrap();
        buf.put_u32_le(code);
        buf.to_vec()
    }

    fn ok_response(body: &[u8]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        write_header(&mut buf, 0xFF, 0x00, body.len()).unwrap();
        buf.put_slice(body);
        buf.to_vec()
    }

    #[test]
    fn error_response_becomes_diagnostic_server_error() {
        let err = read_response_header(&mut Cursor::new(error_response(0x8000_4005))).unwrap_err();
        assert!(matches!(
            err,
            ProtoError::DiagnosticServerError { code: 0x8000_4005 }
        ));
        assert_eq!(err.to_string(), "diagnostic server: error code 0x80004005");
    }

    #[test]
    fn error_response_with_missing_code() {
        let mut bytes = error_response(1);
        bytes.truncate(22);
        let err = read_response_header(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(
            err,
            ProtoError::TruncatedStream {
                needed: 4,
                available: 2
            }
        ));
    }

    #[test]
    fn server_set_with_other_id_is_success() {
        let header = read_response_header(&mut Cursor::new(ok_response(&[1, 2]))).unwrap();
        assert!(header.is_ok());
        assert_eq!(header.payload_len().unwrap(), 2);
    }

    #[test]
    fn error_id_on_other_set_is_not_error() {
        let mut buf = BytesMut::new();
        write_header(&mut buf, 0x02, 0xFF, 0).unwrap();
        assert!(read_response_header(&mut Cursor::new(buf.to_vec())).is_ok());
    }

    #[test]
    fn body_is_exactly_declared_size() {
        let mut bytes = ok_response(&[9, 8, 7]);
        bytes.extend_from_slice(b"trailing");
        let mut cursor = Cursor::new(bytes);

        let header = read_response_header(&mut cursor).unwrap();
        let body = read_body(&mut cursor, &header).unwrap();
        assert_eq!(body.as_ref(), &[9, 8, 7]);
        assert_eq!(cursor.position(), 23);
    }

    #[test]
    fn short_body_is_truncated() {
        let mut bytes = ok_response(&[0; 8]);
        bytes.truncate(25);
        let mut cursor = Cursor::new(bytes);
        let header = read_response_header(&mut cursor).unwrap();
        assert!(matches!(
            read_body(&mut cursor, &header),
            Err(ProtoError::TruncatedStream {
                needed: 8,
                available: 5
            })
        ));
    }

    #[test]
    fn message_reader_reads_typed_responses() {
        let mut bytes = ok_response(&11u64.to_le_bytes());
        bytes.extend(ok_response(&11u64.to_le_bytes()));
        bytes.extend(error_response(0x8013_1384));

        let mut reader = MessageReader::new(Cursor::new(bytes));
        let started: CollectTracingResponse = reader.read_response().unwrap();
        let stopped: StopTracingResponse = reader.read_response().unwrap();
        assert_eq!(started.session_id, stopped.session_id);

        let err = reader.read_response::<StopTracingResponse>().unwrap_err();
        assert!(matches!(
            err,
            ProtoError::DiagnosticServerError { code: 0x8013_1384 }
        ));
    }

    #[test]
    fn partial_reads_are_reassembled() {
        let reader = OneByteAtATime {
            bytes: ok_response(&5u64.to_le_bytes()),
            pos: 0,
            interrupted: false,
        };
        let mut reader = MessageReader::new(reader);
        let started: CollectTracingResponse = reader.read_response().unwrap();
        assert_eq!(started.session_id, 5);
        assert!(reader.get_ref().interrupted);
    }

    #[test]
    fn io_errors_propagate() {
        let mut reader = MessageReader::new(FailingReader);
        let err = reader.read_header().unwrap_err();
        assert!(matches!(err, ProtoError::Io(e) if e.kind() == ErrorKind::TimedOut));
    }

    struct OneByteAtATime {
        bytes: Vec<u8>,
        pos: usize,
        interrupted: bool,
    }

    impl Read for OneByteAtATime {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            if self.pos >= self.bytes.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::TimedOut))
        }
    }
}
