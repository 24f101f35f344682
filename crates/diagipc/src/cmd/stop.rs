use std::time::Duration;

use diagipc_client::{ClientConfig, DiagnosticClient};

use crate::cmd::StopArgs;
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_session, OutputFormat};

pub fn run(args: StopArgs, timeout: Duration, format: OutputFormat) -> CliResult<i32> {
    let client = DiagnosticClient::with_config(&args.path, ClientConfig::with_timeout(timeout));
    client
        .stop_tracing(args.session_id)
        .map_err(|err| client_error("stop failed", err))?;
    print_session("stopped", args.session_id, format);
    Ok(SUCCESS)
}
