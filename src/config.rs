//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$CHATLINE_CONFIG` (environment variable)
//! 2. `~/.config/chatline/config.toml` (Linux/macOS)
//!    `%APPDATA%\chatline\config.toml` (Windows)
//! 3. Built-in defaults

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Directory scan settings.
    pub scan: ScanConfig,
    /// Report layout settings.
    pub report: ReportConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
    /// Override cache directory for logs.
    pub cache_dir: Option<PathBuf>,
}

/// Directory scan settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Container file name to look for (matched case-insensitively).
    pub container_name: String,
}

/// Report layout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// File name of the workbook written inside the scanned root.
    pub file_name: String,
    /// Column width for the message body.
    pub body_width: f64,
    /// Column width for the attachment list.
    pub attachment_width: f64,
    /// Freeze the header row.
    pub freeze_header: bool,
    /// Add an autofilter across the header row.
    pub autofilter: bool,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            cache_dir: None,
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            container_name: "messages.json".to_string(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            file_name: "chat_timeline.xlsx".to_string(),
            body_width: 80.0,
            attachment_width: 50.0,
            freeze_header: true,
            autofilter: true,
        }
    }
}

// ── Load ────────────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    if let Some(path) = config_file_path() {
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<Config>(&contents) {
                    Ok(cfg) => {
                        tracing::info!(path = %path.display(), "Loaded config");
                        return cfg;
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to parse config, using defaults"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read config file, using defaults"
                    );
                }
            }
        }
    }
    Config::default()
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    // 1. Environment variable override
    if let Ok(env_path) = std::env::var("CHATLINE_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    // 2. Standard config directory
    dirs::config_dir().map(|d| d.join("chatline").join("config.toml"))
}

/// Return the cache directory for logs.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("chatline")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.general.log_level, "warn");
        assert_eq!(cfg.scan.container_name, "messages.json");
        assert_eq!(cfg.report.file_name, "chat_timeline.xlsx");
        assert!(cfg.report.freeze_header);
        assert!(cfg.report.autofilter);
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed: Config = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.scan.container_name, cfg.scan.container_name);
        assert_eq!(parsed.report.file_name, cfg.report.file_name);
        assert_eq!(parsed.report.body_width, cfg.report.body_width);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial = r#"
[report]
file_name = "timeline.xlsx"

[general]
log_level = "debug"
"#;
        let cfg: Config = toml::from_str(partial).expect("parse partial");
        assert_eq!(cfg.report.file_name, "timeline.xlsx");
        assert_eq!(cfg.general.log_level, "debug");
        // Other fields use defaults
        assert_eq!(cfg.scan.container_name, "messages.json");
        assert_eq!(cfg.report.attachment_width, 50.0);
    }
}
