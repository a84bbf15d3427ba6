//! Server configuration, populated from environment variables.

use std::net::SocketAddr;

/// Runtime configuration for a transform server.
///
/// All fields are populated from environment variables with defaults, so a
/// server can be started with zero configuration.
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | `MALTEGO_BIND` | `0.0.0.0:8081` | TCP socket address to listen on |
/// | `MALTEGO_MAX_BODY_BYTES` | `1048576` | Largest accepted request body |
/// | `MALTEGO_DUMP_MESSAGES` | `false` | Log full request and response XML at debug level |
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address the server binds to.
    pub bind_addr: SocketAddr,

    /// Request bodies larger than this are rejected with 413.
    pub max_body_bytes: usize,

    /// Whether to dump every request and response body to the log.
    pub dump_messages: bool,
}

pub const DEFAULT_BIND: &str = "0.0.0.0:8081";
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8081)),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            dump_messages: false,
        }
    }
}

impl ServerConfig {
    /// Populate config from environment variables, applying defaults where absent.
    pub fn from_env() -> Self {
        let bind_addr: SocketAddr = std::env::var("MALTEGO_BIND")
            .unwrap_or_else(|_| DEFAULT_BIND.into())
            .parse()
            .expect("MALTEGO_BIND must be a valid socket address (e.g. 0.0.0.0:8081)");

        let max_body_bytes = std::env::var("MALTEGO_MAX_BODY_BYTES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_BODY_BYTES);

        let dump_messages = std::env::var("MALTEGO_DUMP_MESSAGES")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        Self {
            bind_addr,
            max_body_bytes,
            dump_messages,
        }
    }
}

fn parse_flag(v: &str) -> bool {
    matches!(
        v.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
