use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use diagipc_proto::ProcessInfo2Response;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct ProcessInfoOutput<'a> {
    process_id: u64,
    command_line: &'a str,
    os: &'a str,
    arch: &'a str,
    runtime_cookie: String,
    managed_entrypoint_assembly_name: &'a str,
    clr_product_version: &'a str,
}

pub fn print_process_info(info: &ProcessInfo2Response, format: OutputFormat) {
    let cookie = hex(&info.runtime_cookie);
    match format {
        OutputFormat::Json => {
            let out = ProcessInfoOutput {
                process_id: info.process_id,
                command_line: &info.command_line,
                os: &info.os,
                arch: &info.arch,
                runtime_cookie: cookie,
                managed_entrypoint_assembly_name: &info.managed_entrypoint_assembly_name,
                clr_product_version: &info.clr_product_version,
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"])
                .add_row(vec!["pid".to_string(), info.process_id.to_string()])
                .add_row(vec!["command line".to_string(), info.command_line.clone()])
                .add_row(vec!["os".to_string(), info.os.clone()])
                .add_row(vec!["arch".to_string(), info.arch.clone()])
                .add_row(vec!["runtime cookie".to_string(), cookie])
                .add_row(vec![
                    "entrypoint".to_string(),
                    info.managed_entrypoint_assembly_name.clone(),
                ])
                .add_row(vec!["clr version".to_string(), info.clr_product_version.clone()]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("Process Info:");
            println!("  PID:            {}", info.process_id);
            println!("  Command line:   {}", info.command_line);
            println!("  OS / arch:      {} / {}", info.os, info.arch);
            println!("  Runtime cookie: {cookie}");
            println!("  Entrypoint:     {}", info.managed_entrypoint_assembly_name);
            println!("  CLR version:    {}", info.clr_product_version);
        }
        OutputFormat::Raw => {
            println!("{}", info.process_id);
        }
    }
}

#[derive(Serialize)]
struct SessionOutput<'a> {
    event: &'a str,
    session_id: String,
}

/// Report a tracing session transition (`started` / `stopped`).
pub fn print_session(event: &str, session_id: u64, format: OutputFormat) {
    let session_id = format!("{session_id:#x}");
    match format {
        OutputFormat::Json => print_json(&SessionOutput {
            event,
            session_id,
        }),
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("session {session_id} {event}");
        }
        OutputFormat::Raw => println!("{session_id}"),
    }
}

#[derive(Serialize)]
struct DumpOutput<'a> {
    dump_name: &'a str,
    written: bool,
}

pub fn print_dump(dump_name: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&DumpOutput {
            dump_name,
            written: true,
        }),
        OutputFormat::Table | OutputFormat::Pretty => println!("dump written to {dump_name}"),
        OutputFormat::Raw => println!("{dump_name}"),
    }
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

/// Lowercase hex of the cookie bytes in wire order; no GUID reordering.
fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_hex_keeps_wire_order() {
        let mut cookie = [0u8; 16];
        cookie[0] = 0x01;
        cookie[15] = 0xFE;
        let text = hex(&cookie);
        assert_eq!(text.len(), 32);
        assert!(text.starts_with("01"));
        assert!(text.ends_with("fe"));
    }

    #[test]
    fn process_info_json_shape() {
        let out = ProcessInfoOutput {
            process_id: 7,
            command_line: "dotnet app.dll",
            os: "Linux",
            arch: "x64",
            runtime_cookie: hex(&[0; 16]),
            managed_entrypoint_assembly_name: "app",
            clr_product_version: "8.0.0",
        };
        let json = serde_json::to_string(&out).unwrap();
        assert!(json.contains("\"process_id\":7"));
        assert!(json.contains("\"clr_product_version\":\"8.0.0\""));
    }
}
