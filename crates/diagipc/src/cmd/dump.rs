use std::time::Duration;

use diagipc_client::{ClientConfig, DiagnosticClient};
use diagipc_proto::GenerateCoreDumpPayload;

use crate::cmd::DumpArgs;
use crate::exit::{client_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_dump, OutputFormat};

pub fn run(args: DumpArgs, timeout: Duration, format: OutputFormat) -> CliResult<i32> {
    if args.name.trim().is_empty() {
        return Err(CliError::new(USAGE, "dump name must not be empty"));
    }

    let payload = GenerateCoreDumpPayload {
        dump_name: args.name,
        dump_type: args.dump_type.into(),
        diagnostics: u32::from(args.diagnostics),
    };

    // Writing a full dump can take far longer than a normal request.
    let config = ClientConfig {
        read_timeout: None,
        write_timeout: Some(timeout),
    };
    let client = DiagnosticClient::with_config(&args.path, config);
    client
        .generate_core_dump(&payload)
        .map_err(|err| client_error("dump failed", err))?;

    print_dump(&payload.dump_name, format);
    Ok(SUCCESS)
}
