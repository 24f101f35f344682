use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use diagipc_proto::{DumpType, EventLevel, ProviderConfig, TraceFormat};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod collect;
pub mod dump;
pub mod process_info;
pub mod stop;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print process information reported by the runtime.
    ProcessInfo(ProcessInfoArgs),
    /// Start an EventPipe session and stop it on Ctrl-C (or after --duration).
    Collect(CollectArgs),
    /// Stop a running EventPipe session.
    Stop(StopArgs),
    /// Ask the runtime to write a dump of itself.
    Dump(DumpArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, timeout: Duration, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::ProcessInfo(args) => process_info::run(args, timeout, format),
        Command::Collect(args) => collect::run(args, timeout, format),
        Command::Stop(args) => stop::run(args, timeout, format),
        Command::Dump(args) => dump::run(args, timeout, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ProcessInfoArgs {
    /// Diagnostics socket of the target runtime.
    pub path: PathBuf,
}

#[derive(Args, Debug)]
pub struct CollectArgs {
    /// Diagnostics socket of the target runtime.
    pub path: PathBuf,
    /// Provider as NAME[:KEYWORDS[:LEVEL[:FILTER]]]. Repeat for several, in order.
    #[arg(long = "provider", required = true, value_parser = parse_provider)]
    pub providers: Vec<ProviderConfig>,
    /// Circular buffer size in MB.
    #[arg(long, default_value = "256")]
    pub buffer_size: u32,
    /// Trace serialization format.
    #[arg(long, value_enum, default_value = "nettrace")]
    pub trace_format: TraceFormatArg,
    /// Request rundown events at stop (uses CollectTracing2).
    #[arg(long)]
    pub rundown: bool,
    /// Save the raw trace stream to this file (discarded otherwise).
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
    /// Stop automatically after this long instead of waiting for Ctrl-C.
    #[arg(long, value_parser = parse_duration)]
    pub duration: Option<Duration>,
}

#[derive(Args, Debug)]
pub struct StopArgs {
    /// Diagnostics socket of the target runtime.
    pub path: PathBuf,
    /// Session id returned when the session started (decimal or 0x-hex).
    #[arg(long, value_parser = parse_u64)]
    pub session_id: u64,
}

#[derive(Args, Debug)]
pub struct DumpArgs {
    /// Diagnostics socket of the target runtime.
    pub path: PathBuf,
    /// Dump file path, as seen by the target process.
    pub name: String,
    #[arg(long, value_enum, default_value = "with-heap")]
    pub dump_type: DumpTypeArg,
    /// Enable the runtime's dump diagnostics logging.
    #[arg(long)]
    pub diagnostics: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum TraceFormatArg {
    Netperf,
    Nettrace,
}

impl From<TraceFormatArg> for TraceFormat {
    fn from(arg: TraceFormatArg) -> Self {
        match arg {
            TraceFormatArg::Netperf => TraceFormat::NetPerf,
            TraceFormatArg::Nettrace => TraceFormat::NetTrace,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum DumpTypeArg {
    Normal,
    WithHeap,
    Triage,
    Full,
}

impl From<DumpTypeArg> for DumpType {
    fn from(arg: DumpTypeArg) -> Self {
        match arg {
            DumpTypeArg::Normal => DumpType::Normal,
            DumpTypeArg::WithHeap => DumpType::WithHeap,
            DumpTypeArg::Triage => DumpType::Triage,
            DumpTypeArg::Full => DumpType::Full,
        }
    }
}

/// Parse `5s`, `500ms` or a bare number of seconds. Zero is rejected.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("duration must not be empty".to_string());
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| format!("invalid duration value: {input}"))?;
    if value == 0 {
        return Err("duration must be greater than zero".to_string());
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

/// Decimal or `0x`-prefixed hex.
pub fn parse_u64(input: &str) -> Result<u64, String> {
    let input = input.trim();
    let parsed = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => input.parse(),
    };
    parsed.map_err(|_| format!("invalid number: {input}"))
}

fn parse_level(input: &str) -> Result<u32, String> {
    let level = match input.to_ascii_lowercase().as_str() {
        "logalways" => EventLevel::LogAlways,
        "critical" => EventLevel::Critical,
        "error" => EventLevel::Error,
        "warning" => EventLevel::Warning,
        "informational" | "info" => EventLevel::Informational,
        "verbose" => EventLevel::Verbose,
        _ => {
            return input
                .parse()
                .map_err(|_| format!("invalid provider level: {input}"))
        }
    };
    Ok(level.into())
}

/// Parse `NAME[:KEYWORDS[:LEVEL[:FILTER]]]`. Keywords are hex (`0x` optional).
///
/// The filter is everything after the third colon, so it may contain colons.
pub fn parse_provider(input: &str) -> Result<ProviderConfig, String> {
    let mut parts = input.splitn(4, ':');
    let name = parts.next().unwrap_or_default().trim();
    if name.is_empty() {
        return Err("provider name must not be empty".to_string());
    }

    let mut provider = ProviderConfig::new(name);
    if let Some(keywords) = parts.next().filter(|k| !k.is_empty()) {
        let hex = keywords
            .strip_prefix("0x")
            .or_else(|| keywords.strip_prefix("0X"))
            .unwrap_or(keywords);
        provider.keywords = u64::from_str_radix(hex, 16)
            .map_err(|_| format!("invalid provider keywords: {keywords}"))?;
    }
    if let Some(level) = parts.next().filter(|l| !l.is_empty()) {
        provider.log_level = parse_level(level)?;
    }
    if let Some(filter) = parts.next() {
        provider.filter_data = filter.to_string();
    }
    Ok(provider)
}
