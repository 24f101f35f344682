use std::time::Duration;

use diagipc_client::{ClientConfig, DiagnosticClient};

use crate::cmd::ProcessInfoArgs;
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_process_info, OutputFormat};

pub fn run(args: ProcessInfoArgs, timeout: Duration, format: OutputFormat) -> CliResult<i32> {
    let client = DiagnosticClient::with_config(&args.path, ClientConfig::with_timeout(timeout));
    let info = client
        .process_info()
        .map_err(|err| client_error("process-info failed", err))?;
    print_process_info(&info, format);
    Ok(SUCCESS)
}
