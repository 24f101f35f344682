//! Command sets and command ids.
//!
//! Each command set owns its own id space, so ids are modelled as one enum
//! per set and [`Command`] pairs them up. `Server` only ever appears in
//! responses and has no place in [`Command`].

use crate::error::ProtoError;

/// Coarse category of a diagnostics message (header byte 16).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CommandSet {
    Dump = 0x01,
    EventPipe = 0x02,
    Profiler = 0x03,
    Process = 0x04,
    /// Responses only: `Ok` or `Error`.
    Server = 0xFF,
}

impl TryFrom<u8> for CommandSet {
    type Error = ProtoError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(Self::Dump),
            0x02 => Ok(Self::EventPipe),
            0x03 => Ok(Self::Profiler),
            0x04 => Ok(Self::Process),
            0xFF => Ok(Self::Server),
            other => Err(ProtoError::InvalidField {
                field: "command set",
                value: u64::from(other),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DumpCommand {
    GenerateCoreDump = 0x01,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EventPipeCommand {
    StopTracing = 0x01,
    CollectTracing = 0x02,
    CollectTracing2 = 0x03,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ProfilerCommand {
    AttachProfiler = 0x01,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ProcessCommand {
    ProcessInfo2 = 0x04,
}

/// Command ids of the `Server` set, used by the endpoint to answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ServerCommand {
    Ok = 0x00,
    Error = 0xFF,
}

/// A request a client may issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Dump(DumpCommand),
    EventPipe(EventPipeCommand),
    Profiler(ProfilerCommand),
    Process(ProcessCommand),
}

impl Command {
    pub fn command_set(self) -> CommandSet {
        match self {
            Command::Dump(_) => CommandSet::Dump,
            Command::EventPipe(_) => CommandSet::EventPipe,
            Command::Profiler(_) => CommandSet::Profiler,
            Command::Process(_) => CommandSet::Process,
        }
    }

    pub fn command_id(self) -> u8 {
        match self {
            Command::Dump(id) => id as u8,
            Command::EventPipe(id) => id as u8,
            Command::Profiler(id) => id as u8,
            Command::Process(id) => id as u8,
        }
    }

    /// Human-readable name, for logs.
    pub fn name(self) -> &'static str {
        command_name(self.command_set() as u8, self.command_id())
    }
}

/// Returns a human-readable name for a raw (command set, command id) pair.
pub fn command_name(command_set: u8, command_id: u8) -> &'static str {
    match (command_set, command_id) {
        (0x01, 0x01) => "Dump/GenerateCoreDump",
        (0x02, 0x01) => "EventPipe/StopTracing",
        (0x02, 0x02) => "EventPipe/CollectTracing",
        (0x02, 0x03) => "EventPipe/CollectTracing2",
        (0x03, 0x01) => "Profiler/AttachProfiler",
        (0x04, 0x04) => "Process/ProcessInfo2",
        (0xFF, 0x00) => "Server/Ok",
        (0xFF, 0xFF) => "Server/Error",
        _ => "Unknown",
    }
}
