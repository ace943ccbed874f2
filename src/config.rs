//! Runtime configuration for sse-relay.
//!
//! Configuration can be loaded from a JSON file or constructed
//! programmatically. Listen address, backend URL, and the stream marker
//! constants live here; nothing is process-global.

use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};

/// Command-line arguments.
#[derive(Parser, Debug, Clone)]
#[command(name = "sse-relay", about = "SSE streaming relay for a local text-generation API")]
pub struct Cli {
    /// Path to configuration file (JSON).
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// HTTP listen address (overrides the config file).
    #[arg(long)]
    pub listen: Option<String>,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,

    /// Generation backend configuration.
    pub backend: BackendConfig,

    /// Stream framing constants.
    pub stream: StreamConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address (e.g. "0.0.0.0:54321").
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:54321".to_string(),
        }
    }
}

/// Generation backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the backend exposing POST /api/generate.
    pub base_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
        }
    }
}

/// Marker constants used by the bracketed character stream.
///
/// The marker ids are arbitrary sentinels clients key on; they are not
/// computed from anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Reconnection delay hint sent in the opening frame, milliseconds.
    pub retry_ms: u64,

    /// Id carried by the opening marker frame.
    pub open_marker_id: u64,

    /// Id carried by the closing marker frame.
    pub done_marker_id: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            retry_ms: 2500,
            open_marker_id: 3_939_889,
            done_marker_id: 28_825_252,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file, falling back to defaults when
    /// the file is absent.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if path.exists() {
            let data = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&data)?;
            Ok(config)
        } else {
            tracing::warn!("Config file not found at {:?}, using defaults", path);
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.server.listen, "0.0.0.0:54321");
        assert_eq!(cfg.backend.base_url, "http://localhost:11434");
        assert_eq!(cfg.stream.retry_ms, 2500);
        assert_eq!(cfg.stream.open_marker_id, 3_939_889);
        assert_eq!(cfg.stream.done_marker_id, 28_825_252);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let cfg = Config::load(std::path::Path::new("/nonexistent/sse-relay.json")).unwrap();
        assert_eq!(cfg.server.listen, "0.0.0.0:54321");
    }

    #[test]
    fn test_load_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "server": {{ "listen": "127.0.0.1:8080" }},
                "backend": {{ "base_url": "http://localhost:9999" }},
                "stream": {{ "retry_ms": 1000, "open_marker_id": 1, "done_marker_id": 2 }}
            }}"#
        )
        .unwrap();

        let cfg = Config::load(file.path()).unwrap();
        assert_eq!(cfg.server.listen, "127.0.0.1:8080");
        assert_eq!(cfg.backend.base_url, "http://localhost:9999");
        assert_eq!(cfg.stream.retry_ms, 1000);
    }
}
