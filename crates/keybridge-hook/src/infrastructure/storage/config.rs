//! TOML-based configuration persistence for the bridge.
//!
//! Reads and writes `AppConfig` to the platform-appropriate config file:
//! - Windows:  `%APPDATA%\KeyBridge\config.toml`
//! - Linux:    `~/.config/keybridge/config.toml`
//! - macOS:    `~/Library/Application Support/KeyBridge/config.toml`
//!
//! Example:
//!
//! ```toml
//! [bridge]
//! log_level = "info"
//! stop_key = "esc"
//! clipboard_key = "f8"
//! script = "startup.toml"   # optional, relative to this directory
//! ```
//!
//! Fields annotated with `#[serde(default = "some_fn")]` use the return value
//! of `some_fn()` when the field is absent, so a first run with no file and
//! an older file missing newer fields both work.
//!
//! Key fields hold names in the same vocabulary as
//! [`keybridge_core::parse_input`]; they are resolved to events only when
//! the bindings are built, so a typo is reported as
//! [`ConfigError::InvalidKey`] rather than a TOML parse error.

use std::path::{Path, PathBuf};

use keybridge_core::{parse_input, InputEvent, KeyNameError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::consume::Bindings;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A key binding names a key that does not exist.
    #[error("invalid key name in `{field}`: {source}")]
    InvalidKey {
        field: &'static str,
        #[source]
        source: KeyNameError,
    },
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level application configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub bridge: BridgeConfig,
}

/// Bridge behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BridgeConfig {
    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Key whose press stops the bridge.  Empty disables the binding.
    #[serde(default = "default_stop_key")]
    pub stop_key: String,
    /// Key whose press logs the clipboard text.  Empty disables the binding.
    #[serde(default = "default_clipboard_key")]
    pub clipboard_key: String,
    /// Automation script to run, relative to the config directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_stop_key() -> String {
    "esc".to_string()
}
fn default_clipboard_key() -> String {
    "f8".to_string()
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            stop_key: default_stop_key(),
            clipboard_key: default_clipboard_key(),
            script: None,
        }
    }
}

impl BridgeConfig {
    /// The event that stops the bridge, or `None` if the binding is disabled.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidKey`] if `stop_key` is not a known key name.
    pub fn stop_event(&self) -> Result<Option<InputEvent>, ConfigError> {
        resolve_key("stop_key", &self.stop_key)
    }

    /// The event that logs the clipboard, or `None` if the binding is disabled.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidKey`] if `clipboard_key` is not a known key name.
    pub fn clipboard_event(&self) -> Result<Option<InputEvent>, ConfigError> {
        resolve_key("clipboard_key", &self.clipboard_key)
    }

    /// Both bindings, ready for the consumer loop.
    pub fn bindings(&self) -> Result<Bindings, ConfigError> {
        Ok(Bindings {
            stop: self.stop_event()?,
            clipboard: self.clipboard_event()?,
        })
    }
}

/// A bare key name binds its key-down event; an empty name disables the binding.
fn resolve_key(field: &'static str, name: &str) -> Result<Option<InputEvent>, ConfigError> {
    if name.trim().is_empty() {
        return Ok(None);
    }
    parse_input(name)
        .map(Some)
        .map_err(|source| ConfigError::InvalidKey { field, source })
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Resolves the full path to the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Directory holding the config file; script paths are resolved against it.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Loads `AppConfig` from the platform config file, returning
/// `AppConfig::default()` if the file does not yet exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads `AppConfig` from `path`; a missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Persists `config` to the platform config file.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    save_config_to(config, &config_file_path()?)
}

/// Persists `config` to `path`, creating parent directories as needed.
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolves the platform config directory including the `KeyBridge` subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("KeyBridge"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("keybridge"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("KeyBridge")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("keybridge-config-test-{}-{}", std::process::id(), name))
            .join("config.toml")
    }

    // ── Defaults ──────────────────────────────────────────────────────────────

    #[test]
    fn test_bridge_config_defaults() {
        let cfg = BridgeConfig::default();
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.stop_key, "esc");
        assert_eq!(cfg.clipboard_key, "f8");
        assert_eq!(cfg.script, None);
    }

    #[test]
    fn test_default_bindings_resolve_to_escape_and_f8() {
        // Arrange
        let cfg = BridgeConfig::default();

        // Act
        let bindings = cfg.bindings().expect("default keys are valid");

        // Assert
        assert_eq!(bindings.stop, Some(InputEvent::key_down(0x1B)));
        assert_eq!(bindings.clipboard, Some(InputEvent::key_down(0x77)));
    }

    // ── TOML parsing ──────────────────────────────────────────────────────────

    #[test]
    fn test_deserialize_empty_toml_uses_defaults() {
        let cfg: AppConfig = toml::from_str("").expect("deserialize empty");
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_deserialize_partial_bridge_overrides_defaults() {
        // Arrange
        let toml_str = r#"
[bridge]
stop_key = "f12 up"
"#;

        // Act
        let cfg: AppConfig = toml::from_str(toml_str).expect("deserialize partial");

        // Assert
        assert_eq!(cfg.bridge.stop_key, "f12 up");
        assert_eq!(cfg.bridge.log_level, "info");
        assert_eq!(
            cfg.bridge.stop_event().unwrap(),
            Some(InputEvent::key_up(0x7B))
        );
    }

    #[test]
    fn test_script_path_is_read_and_omitted_when_unset() {
        // Arrange
        let with_script: AppConfig =
            toml::from_str("[bridge]\nscript = \"startup.toml\"\n").expect("deserialize");

        // Act
        let without_script = toml::to_string(&AppConfig::default()).expect("serialize");

        // Assert
        assert_eq!(with_script.bridge.script.as_deref(), Some("startup.toml"));
        assert!(!without_script.contains("script"));
    }

    #[test]
    fn test_deserialize_invalid_toml_returns_parse_error() {
        let result: Result<AppConfig, toml::de::Error> = toml::from_str("[[[ not valid toml");
        assert!(result.is_err());
    }

    // ── Key resolution ────────────────────────────────────────────────────────

    #[test]
    fn test_unknown_key_name_reports_the_field() {
        // Arrange
        let cfg = BridgeConfig {
            clipboard_key: "hyper".to_string(),
            ..BridgeConfig::default()
        };

        // Act
        let err = cfg.bindings().unwrap_err();

        // Assert
        match err {
            ConfigError::InvalidKey { field, .. } => assert_eq!(field, "clipboard_key"),
            other => panic!("expected InvalidKey, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_key_name_disables_binding() {
        let cfg = BridgeConfig {
            stop_key: "   ".to_string(),
            ..BridgeConfig::default()
        };
        assert_eq!(cfg.stop_event().unwrap(), None);
    }

    // ── File persistence ──────────────────────────────────────────────────────

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let path = scratch_path("missing");
        let cfg = load_config_from(&path).expect("missing file is not an error");
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_save_then_load_preserves_custom_values() {
        // Arrange
        let path = scratch_path("save-load");
        let mut cfg = AppConfig::default();
        cfg.bridge.log_level = "debug".to_string();
        cfg.bridge.clipboard_key = "left click".to_string();

        // Act
        save_config_to(&cfg, &path).expect("save");
        let restored = load_config_from(&path).expect("load");

        // Assert
        assert_eq!(restored, cfg);
        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn test_load_malformed_file_returns_parse_error() {
        // Arrange
        let path = scratch_path("malformed");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[bridge\nstop_key = ").unwrap();

        // Act
        let result = load_config_from(&path);

        // Assert
        assert!(matches!(result, Err(ConfigError::Parse(_))));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
