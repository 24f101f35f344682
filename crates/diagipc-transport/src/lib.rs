//! Local transport to a .NET diagnostics endpoint.
//!
//! The runtime listens on a Unix domain socket (Linux/macOS), usually named
//! `dotnet-diagnostic-{pid}-{key}-socket` under `$TMPDIR`. Finding that path
//! is the caller's job; this crate only connects to it and hands back an
//! [`IpcStream`] that the codec in `diagipc-proto` reads and writes.
//!
//! Every diagnostics command is a single-shot exchange on a fresh
//! connection, so there is no listener side here.

pub mod error;
pub mod traits;

#[cfg(unix)]
pub mod uds;

pub use error::{Result, TransportError};
pub use traits::IpcStream;

#[cfg(unix)]
pub use uds::UnixDomainSocket;
