use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use tracing::debug;

use crate::command::command_name;
use crate::error::{ProtoError, Result};
use crate::header::{write_header, HEADER_SIZE};
use crate::request::Request;

const INITIAL_BUFFER_CAPACITY: usize = 1024;

/// Write one complete message (header + payload) and flush (blocking).
///
/// The message is assembled in memory first and handed to the stream as a
/// single buffer, so the peer never sees a partial header from this call.
pub fn write_message<W: Write + ?Sized>(
    stream: &mut W,
    command_set: u8,
    command_id: u8,
    payload: &[u8],
) -> Result<()> {
    let mut buf = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    encode_message(&mut buf, command_set, command_id, payload)?;
    write_all(stream, &buf)?;
    flush(stream)
}

fn encode_message(
    dst: &mut BytesMut,
    command_set: u8,
    command_id: u8,
    payload: &[u8],
) -> Result<()> {
    write_header(dst, command_set, command_id, payload.len())?;
    dst.extend_from_slice(payload);
    debug!(
        command = command_name(command_set, command_id),
        size = dst.len(),
        "writing diagnostics message"
    );
    Ok(())
}

/// A send timeout surfaces as `WouldBlock` and is returned, not retried.
fn write_all<W: Write + ?Sized>(stream: &mut W, buf: &[u8]) -> Result<()> {
    let mut offset = 0usize;
    while offset < buf.len() {
        match stream.write(&buf[offset..]) {
            Ok(0) => return Err(ProtoError::ConnectionClosed),
            Ok(n) => offset += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(ProtoError::Io(err)),
        }
    }
    Ok(())
}

fn flush<W: Write + ?Sized>(stream: &mut W) -> Result<()> {
    loop {
        match stream.flush() {
            Ok(()) => return Ok(()),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(ProtoError::Io(err)),
        }
    }
}

/// Writes diagnostics messages to any `Write` stream, reusing one buffer.
pub struct MessageWriter<T> {
    inner: T,
    buf: BytesMut,
}

impl<T: Write> MessageWriter<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
        }
    }

    /// Encode and send a raw payload under the given command set and id.
    pub fn send(&mut self, command_set: u8, command_id: u8, payload: &[u8]) -> Result<()> {
        self.buf.clear();
        encode_message(&mut self.buf, command_set, command_id, payload)?;
        write_all(&mut self.inner, &self.buf)?;
        flush(&mut self.inner)
    }

    /// Encode and send a typed request.
    pub fn send_request<Q: Request + ?Sized>(&mut self, request: &Q) -> Result<()> {
        let command = request.command();
        let mut payload = BytesMut::new();
        request.encode(&mut payload)?;
        self.send(command.command_set() as u8, command.command_id(), &payload)
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::header::read_header;
    use crate::payload::{CollectTracingPayload, ProviderConfig, StopTracingPayload, TraceFormat};

    #[test]
    fn size_field_matches_payload() {
        let payload = b"\x01\x02\x03\x04\x05";
        let mut wire = Vec::new();
        write_message(&mut wire, 0x02, 0x01, payload).unwrap();

        let mut cursor = Cursor::new(wire);
        let header = read_header(&mut cursor).unwrap();
        assert_eq!(header.size as usize, HEADER_SIZE + payload.len());
        assert_eq!(header.reserved, 0);
        assert_eq!(&cursor.get_ref()[HEADER_SIZE..], payload);
    }

    #[test]
    fn oversized_payload_writes_nothing() {
        let payload = vec![0u8; u16::MAX as usize];
        let mut wire = Vec::new();
        let err = write_message(&mut wire, 0x02, 0x02, &payload).unwrap_err();
        assert!(matches!(err, ProtoError::PayloadTooLarge { .. }));
        assert!(wire.is_empty());
    }

    #[test]
    fn send_request_uses_command_ids() {
        let mut writer = MessageWriter::new(Vec::new());
        writer
            .send_request(&StopTracingPayload { session_id: 42 })
            .unwrap();
        writer
            .send_request(&CollectTracingPayload {
                circular_buffer_size_mb: 16,
                format: TraceFormat::NetTrace,
                providers: vec![ProviderConfig::new("Foo")],
            })
            .unwrap();

        let mut cursor = Cursor::new(writer.into_inner());
        let stop = read_header(&mut cursor).unwrap();
        assert_eq!((stop.command_set, stop.command_id, stop.size), (2, 1, 28));
        cursor.set_position(28);

        let collect = read_header(&mut cursor).unwrap();
        assert_eq!((collect.command_set, collect.command_id), (2, 2));
    }

    #[test]
    fn flush_propagates() {
        let sink = FlushTrackingWriter::default();
        let flag = Arc::clone(&sink.flushed);
        let mut writer = MessageWriter::new(sink);

        writer.send(0x04, 0x04, &[]).unwrap();

        assert!(flag.load(Ordering::SeqCst));
        assert_eq!(writer.get_ref().data.len(), HEADER_SIZE);
    }

    #[test]
    fn handles_interrupted_and_short_writes() {
        let mut sink = ChoppyWriter {
            interrupted: false,
            data: Vec::new(),
        };
        write_message(&mut sink, 0x02, 0x01, &7u64.to_le_bytes()).unwrap();

        assert_eq!(sink.data.len(), HEADER_SIZE + 8);
        assert_eq!(&sink.data[..14], b"DOTNET_IPC_V1\0");
    }

    #[test]
    fn connection_closed_when_write_returns_zero() {
        let err = write_message(&mut ZeroWriter, 0x02, 0x01, b"x").unwrap_err();
        assert!(matches!(err, ProtoError::ConnectionClosed));
    }

    #[cfg(unix)]
    #[test]
    fn write_timeout_surfaces_as_io_error() {
        use std::os::unix::net::UnixStream;
        use std::time::{Duration, Instant};

        let (mut local, _remote) = UnixStream::pair().unwrap();
        local.set_nonblocking(true).unwrap();
        let chunk = [0u8; 4096];
        loop {
            match local.write(&chunk) {
                Ok(_) => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => break,
                Err(err) => panic!("unexpected error filling socket: {err}"),
            }
        }
        local.set_nonblocking(false).unwrap();
        local
            .set_write_timeout(Some(Duration::from_millis(50)))
            .unwrap();

        let started = Instant::now();
        let err = write_message(&mut local, 0x02, 0x01, &[0u8; 1000]).unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(2));
        match err {
            ProtoError::Io(e) => assert!(matches!(
                e.kind(),
                ErrorKind::WouldBlock | ErrorKind::TimedOut
            )),
            other => panic!("expected I/O error, got {other:?}"),
        }
    }

    #[derive(Default)]
    struct FlushTrackingWriter {
        flushed: Arc<AtomicBool>,
        data: Vec<u8>,
    }

    impl Write for FlushTrackingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Interrupts once, then accepts at most three bytes per call.
    struct ChoppyWriter {
        interrupted: bool,
        data: Vec<u8>,
    }

    impl Write for ChoppyWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            let n = buf.len().min(3);
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
