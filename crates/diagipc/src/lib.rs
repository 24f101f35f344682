//! DOTNET_IPC_V1 codec and client for .NET runtime diagnostics.
//!
//! # Crate Structure
//!
//! - [`transport`]: connect to a runtime's diagnostics socket
//! - [`proto`]: the 20-byte envelope, UTF-16 strings, request payloads and
//!   response parsers
//! - [`client`]: single-shot operations (process info, start/stop tracing,
//!   core dumps)

/// Re-export transport types.
pub mod transport {
    pub use diagipc_transport::*;
}

/// Re-export protocol codec types.
pub mod proto {
    pub use diagipc_proto::*;
}

/// Re-export client types.
pub mod client {
    pub use diagipc_client::*;
}
