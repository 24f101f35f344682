#![cfg(unix)]

use std::os::unix::net::UnixListener;
use std::path::PathBuf;
use std::thread;

use bytes::{BufMut, BytesMut};
use diagipc::client::{ClientError, DiagnosticClient};
use diagipc::proto::{
    encode_string, read_body, read_header, write_message, CollectTracingPayload, Header,
    MessageReader, MessageWriter, ProtoError, ProviderConfig, StopTracingPayload,
    StopTracingResponse, TraceFormat,
};
use diagipc::transport::UnixDomainSocket;

fn unique_socket(tag: &str) -> PathBuf {
    let dir = PathBuf::from(format!(
        "/tmp/diagipc-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir.join("dotnet-diagnostic.sock")
}

fn accept_request(listener: &UnixListener) -> (std::os::unix::net::UnixStream, Header, Vec<u8>) {
    let (mut conn, _) = listener.accept().expect("endpoint should accept");
    let header = read_header(&mut conn).expect("request header should decode");
    let body = read_body(&mut conn, &header).expect("request body should read");
    (conn, header, body.to_vec())
}

#[test]
fn writer_and_reader_over_a_real_socket() {
    let path = unique_socket("raw");
    let listener = UnixListener::bind(&path).expect("socket should bind");
    let endpoint = thread::spawn(move || {
        let (mut conn, header, body) = accept_request(&listener);
        assert_eq!((header.command_set, header.command_id), (0x02, 0x01));
        write_message(&mut conn, 0xFF, 0x00, &body).expect("response should send");
    });

    let stream = UnixDomainSocket::connect(&path).expect("client should connect");
    let mut writer = MessageWriter::new(stream.try_clone().expect("stream should clone"));
    writer
        .send_request(&StopTracingPayload { session_id: 0xDEAD })
        .expect("stop request should send");

    let mut reader = MessageReader::new(stream);
    let stopped: StopTracingResponse = reader.read_response().expect("response should decode");
    assert_eq!(stopped.session_id, 0xDEAD);
    endpoint.join().expect("endpoint thread");
}

#[test]
fn collect_payload_reaches_endpoint_intact() {
    let path = unique_socket("collect");
    let listener = UnixListener::bind(&path).expect("socket should bind");
    let endpoint = thread::spawn(move || {
        let (mut conn, header, body) = accept_request(&listener);
        write_message(&mut conn, 0xFF, 0x00, &42u64.to_le_bytes()).expect("response should send");
        (header, body)
    });

    let request = CollectTracingPayload {
        circular_buffer_size_mb: 64,
        format: TraceFormat::NetTrace,
        providers: vec![
            ProviderConfig::new("Microsoft-DotNETCore-SampleProfiler"),
            ProviderConfig {
                provider_name: "System.Runtime".to_string(),
                keywords: 0,
                log_level: 4,
                filter_data: "EventCounterIntervalSec=1".to_string(),
            },
        ],
    };
    let session = DiagnosticClient::new(&path)
        .collect_tracing(&request)
        .expect("collect should start");
    assert_eq!(session.session_id(), 42);

    let (header, body) = endpoint.join().expect("endpoint thread");
    assert_eq!(header.size as usize, 20 + body.len());
    assert_eq!(CollectTracingPayload::from_bytes(&body).expect("payload decodes"), request);
}

/// The runtime writes an empty string as a length of one: just the terminator.
fn put_empty_response_string(body: &mut BytesMut) {
    body.put_u32_le(1);
    body.put_u16_le(0);
}

#[test]
fn process_info_with_empty_strings() {
    let path = unique_socket("info");
    let listener = UnixListener::bind(&path).expect("socket should bind");
    let endpoint = thread::spawn(move || {
        let (mut conn, _, _) = accept_request(&listener);
        let mut body = BytesMut::new();
        body.put_u64_le(31337);
        put_empty_response_string(&mut body);
        encode_string("Linux", &mut body).expect("os encodes");
        encode_string("x64", &mut body).expect("arch encodes");
        body.put_slice(&[0x11; 16]);
        put_empty_response_string(&mut body);
        encode_string("9.0.0", &mut body).expect("version encodes");
        write_message(&mut conn, 0xFF, 0x00, &body).expect("response should send");
    });

    let info = DiagnosticClient::new(&path)
        .process_info()
        .expect("process info should decode");
    assert_eq!(info.process_id, 31337);
    assert!(info.command_line.is_empty());
    assert_eq!(info.os, "Linux");
    assert!(info.managed_entrypoint_assembly_name.is_empty());
    assert_eq!(info.clr_product_version, "9.0.0");
    endpoint.join().expect("endpoint thread");
}

#[test]
fn error_branch_reports_server_code() {
    let path = unique_socket("error");
    let listener = UnixListener::bind(&path).expect("socket should bind");
    let endpoint = thread::spawn(move || {
        let (mut conn, _, _) = accept_request(&listener);
        write_message(&mut conn, 0xFF, 0xFF, &0x8013_1384u32.to_le_bytes())
            .expect("error should send");
    });

    let err = DiagnosticClient::new(&path)
        .stop_tracing(1)
        .expect_err("server error should surface");
    assert!(matches!(
        err,
        ClientError::Proto(ProtoError::DiagnosticServerError { code: 0x8013_1384 })
    ));
    endpoint.join().expect("endpoint thread");
}
