use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use diagipc_client::{ClientConfig, DiagnosticClient, TracingSession};
use diagipc_proto::{CollectTracing2Payload, CollectTracingPayload};
use diagipc_transport::IpcStream;
use tracing::{debug, info, warn};

use crate::cmd::CollectArgs;
use crate::exit::{client_error, io_error, transport_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_session, OutputFormat};

/// Why the wait for the end of a collection finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wake {
    /// Ctrl-C, or `--duration` elapsed.
    StopRequested,
    /// The runtime closed the trace stream on its own.
    StreamClosed,
}

pub fn run(args: CollectArgs, timeout: Duration, format: OutputFormat) -> CliResult<i32> {
    let sink = open_sink(args.output.as_deref())?;
    let client = DiagnosticClient::with_config(&args.path, ClientConfig::with_timeout(timeout));
    let payload = CollectTracingPayload {
        circular_buffer_size_mb: args.buffer_size,
        format: args.trace_format.into(),
        providers: args.providers,
    };

    let mut session = start(&client, payload, args.rundown)
        .map_err(|err| client_error("collect failed", err))?;
    let session_id = session.session_id();
    print_session("started", session_id, format);

    let trace_stream = session
        .stream_mut()
        .try_clone()
        .map_err(|err| transport_error("failed to clone trace stream", err))?;

    let (wake_tx, wake_rx) = mpsc::channel();
    let ctrlc_tx = wake_tx.clone();
    ctrlc::set_handler(move || {
        let _ = ctrlc_tx.send(Wake::StopRequested);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("failed to install Ctrl-C handler: {err}")))?;

    let drain = spawn_drain(trace_stream, sink, wake_tx);

    match wait_for_stop(&wake_rx, args.duration) {
        Wake::StopRequested => {
            // The runtime keeps writing buffered events and rundown after
            // acknowledging the stop; the drain thread reads until it closes.
            session
                .stop(&client)
                .map_err(|err| client_error("stop failed", err))?;
            print_session("stopped", session_id, format);
        }
        Wake::StreamClosed => {
            warn!(session_id, "runtime closed the trace stream");
            print_session("ended", session_id, format);
        }
    }

    match drain.join() {
        Ok(Ok(bytes)) => info!(bytes, "trace stream closed"),
        Ok(Err(err)) => return Err(io_error("failed to save trace data", err)),
        Err(_) => return Err(CliError::new(INTERNAL, "trace drain thread panicked")),
    }
    Ok(SUCCESS)
}

fn start(
    client: &DiagnosticClient,
    payload: CollectTracingPayload,
    rundown: bool,
) -> diagipc_client::Result<TracingSession> {
    if rundown {
        client.collect_tracing2(&CollectTracing2Payload::from(payload))
    } else {
        client.collect_tracing(&payload)
    }
}

fn open_sink(output: Option<&Path>) -> CliResult<Box<dyn Write + Send>> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .map_err(|err| io_error(&format!("failed creating {}", path.display()), err))?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(io::sink())),
    }
}

/// Keep reading the session's trace data so the runtime never blocks on a
/// full socket. Ends when the runtime closes the stream, and reports that on
/// `wake` so a collection whose target exits stops waiting.
fn spawn_drain(
    mut stream: IpcStream,
    mut sink: Box<dyn Write + Send>,
    wake: Sender<Wake>,
) -> JoinHandle<io::Result<u64>> {
    thread::spawn(move || {
        let result = copy_trace(&mut stream, sink.as_mut());
        let _ = wake.send(Wake::StreamClosed);
        result
    })
}

fn copy_trace(stream: &mut IpcStream, sink: &mut dyn Write) -> io::Result<u64> {
    let mut total = 0u64;
    let mut buf = [0u8; 16 * 1024];
    loop {
        let read = match io::Read::read(stream, &mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => {
                // A runtime that exits mid-session resets the connection.
                debug!(%err, "trace stream read ended");
                break;
            }
        };
        sink.write_all(&buf[..read])?;
        total += read as u64;
    }
    sink.flush()?;
    Ok(total)
}

/// Block until Ctrl-C, the end of `duration`, or the trace stream closing.
fn wait_for_stop(wake: &Receiver<Wake>, duration: Option<Duration>) -> Wake {
    match duration {
        Some(duration) => {
            info!(?duration, "collecting");
            match wake.recv_timeout(duration) {
                Ok(reason) => reason,
                Err(RecvTimeoutError::Timeout) => {
                    info!("duration elapsed, stopping session");
                    Wake::StopRequested
                }
                Err(RecvTimeoutError::Disconnected) => {
                    warn!("stop signal sources dropped");
                    Wake::StopRequested
                }
            }
        }
        None => {
            info!("collecting, press Ctrl-C to stop");
            wake.recv().unwrap_or(Wake::StopRequested)
        }
    }
}
