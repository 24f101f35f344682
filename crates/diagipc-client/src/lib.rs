//! Single-shot client for .NET diagnostics endpoints.
//!
//! Each operation opens a fresh connection to the endpoint socket, sends one
//! DOTNET_IPC_V1 request and reads one response. The exception is
//! [`DiagnosticClient::collect_tracing`], whose connection stays open as the
//! trace stream of the new session and is handed back in a
//! [`TracingSession`].

pub mod client;
pub mod config;
pub mod error;
pub mod session;

pub use client::DiagnosticClient;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use session::TracingSession;
