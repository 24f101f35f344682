use std::os::unix::fs::FileTypeExt;
use std::path::Path;

use tracing::debug;

use crate::error::{Result, TransportError};
use crate::traits::IpcStream;

/// Unix domain socket transport to a runtime's diagnostics endpoint.
///
/// Only the client side exists: the runtime owns and cleans up the socket.
pub struct UnixDomainSocket;

impl UnixDomainSocket {
    /// Maximum socket path length.
    /// Unix `sockaddr_un.sun_path` is typically 108 bytes on Linux, 104 on macOS.
    #[cfg(target_os = "linux")]
    const MAX_PATH_LEN: usize = 108;
    #[cfg(not(target_os = "linux"))]
    const MAX_PATH_LEN: usize = 104;

    /// Connect to a diagnostics socket (blocking).
    ///
    /// Paths that exist but are not sockets are rejected before connecting so
    /// the error names the actual problem instead of `ECONNREFUSED`.
    pub fn connect(path: impl AsRef<Path>) -> Result<IpcStream> {
        let path = path.as_ref();

        let path_bytes = path.as_os_str().len();
        if path_bytes >= Self::MAX_PATH_LEN {
            return Err(TransportError::PathTooLong {
                path: path.to_path_buf(),
                len: path_bytes,
                max: Self::MAX_PATH_LEN,
            });
        }

        if let Ok(metadata) = std::fs::symlink_metadata(path) {
            if !metadata.file_type().is_socket() {
                return Err(TransportError::Connect {
                    path: path.to_path_buf(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        "path is not a unix socket",
                    ),
                });
            }
        }

        let stream =
            std::os::unix::net::UnixStream::connect(path).map_err(|e| TransportError::Connect {
                path: path.to_path_buf(),
                source: e,
            })?;
        debug!(?path, "connected to diagnostics socket");
        Ok(IpcStream::from(stream))
    }

    /// Transport name for diagnostics.
    pub fn transport_name() -> &'static str {
        "unix-domain-socket"
    }
}
