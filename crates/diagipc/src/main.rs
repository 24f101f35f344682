mod cmd;
mod exit;
mod logging;
mod output;

use std::time::Duration;

use clap::Parser;

use crate::cmd::{parse_duration, Command};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "diagipc", version, about = ".NET diagnostics IPC client")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    /// I/O timeout per request (e.g. 5s, 500ms).
    #[arg(
        long,
        value_name = "DURATION",
        default_value = "5s",
        env = "DIAGIPC_TIMEOUT",
        value_parser = parse_duration,
        global = true
    )]
    timeout: Duration,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, cli.timeout, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_collect_with_providers() {
        let cli = Cli::try_parse_from([
            "diagipc",
            "collect",
            "/tmp/dotnet-diagnostic-1-1-socket",
            "--provider",
            "Microsoft-Windows-DotNETRuntime:0x1:4",
            "--provider",
            "Microsoft-DotNETCore-SampleProfiler",
            "--buffer-size",
            "512",
        ])
        .expect("collect args should parse");

        match cli.command {
            Command::Collect(args) => {
                assert_eq!(args.providers.len(), 2);
                assert_eq!(args.providers[0].keywords, 1);
                assert_eq!(args.providers[1].provider_name, "Microsoft-DotNETCore-SampleProfiler");
                assert_eq!(args.buffer_size, 512);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn collect_requires_a_provider() {
        let err = Cli::try_parse_from(["diagipc", "collect", "/tmp/sock"])
            .expect_err("missing provider should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn parses_stop_and_timeout() {
        let cli = Cli::try_parse_from([
            "diagipc",
            "--timeout",
            "250ms",
            "stop",
            "/tmp/sock",
            "--session-id",
            "0x7f00",
        ])
        .expect("stop args should parse");

        assert_eq!(cli.timeout, Duration::from_millis(250));
        match cli.command {
            Command::Stop(args) => assert_eq!(args.session_id, 0x7f00),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_timeout() {
        let err = Cli::try_parse_from(["diagipc", "--timeout", "0s", "process-info", "/tmp/sock"])
            .expect_err("zero timeout should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
