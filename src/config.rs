// ABOUTME: Configuration structures and parsing for the shortcut service
// ABOUTME: Covers the binding store location, key monitors, duplicate-delivery policy, activation, and logging

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR: &str = "hotswitch";
const BINDINGS_FILE: &str = "bindings.toml";
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Config {
    pub store: StoreConfig,
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    pub activation: ActivationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StoreConfig {
    /// Defaults to `bindings.toml` next to the configuration file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bindings_path: Option<String>,
    #[serde(default = "default_true")]
    pub watch: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct MonitorConfig {
    pub global: bool,
    pub local: bool,
    #[serde(default = "default_true")]
    pub prompt_for_accessibility: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct DispatchConfig {
    /// Window in which a repeat of the same shortcut is ignored. 0 disables.
    #[serde(default)]
    pub debounce_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ActivationConfig {
    pub osascript: String,
    #[serde(default = "default_true")]
    pub raise_windows: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LoggingConfig {
    pub level: String,
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
        }
    }
}

impl DispatchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            store: StoreConfig {
                bindings_path: None,
                watch: true,
            },
            monitor: MonitorConfig {
                global: true,
                local: true,
                prompt_for_accessibility: true,
            },
            dispatch: DispatchConfig { debounce_ms: 0 },
            activation: ActivationConfig {
                osascript: "/usr/bin/osascript".to_string(),
                raise_windows: true,
            },
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    pub fn default_config_content() -> &'static str {
        r#"# Hotswitch Configuration

[store]
# File holding the configured shortcut bindings.
# Defaults to bindings.toml next to this file.
# bindings_path = "~/.config/hotswitch/bindings.toml"
# Reload bindings automatically when the file changes
watch = true

[monitor]
# System-wide key events (needs the Accessibility permission on macOS)
global = true
# Key events delivered while Hotswitch itself is focused
local = true
# Ask macOS to show the Accessibility permission prompt at startup
prompt_for_accessibility = true

[dispatch]
# Both monitors may report the same key press. A non-zero window (milliseconds)
# ignores a repeat of the same shortcut; 0 handles every report.
debounce_ms = 0

[activation]
# AppleScript runner used to bring applications to the front (macOS)
osascript = "/usr/bin/osascript"
# Also move the application's windows above all others
raise_windows = true

[logging]
# trace, debug, info, warn, or error. HOTSWITCH_LOG overrides this.
level = "info"
"#
    }

    pub fn load_from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse configuration")
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
        Self::load_from_str(&content)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Failed to determine config directory")?;
        Ok(config_dir.join(APP_DIR).join("config.toml"))
    }

    /// Resolves the bindings file, placing it next to `config_path` unless configured.
    pub fn bindings_path(&self, config_path: &Path) -> PathBuf {
        match &self.store.bindings_path {
            Some(path) => PathBuf::from(path),
            None => config_path
                .parent()
                .map(|dir| dir.join(BINDINGS_FILE))
                .unwrap_or_else(|| PathBuf::from(BINDINGS_FILE)),
        }
    }

    pub fn expand_path(&mut self) -> Result<()> {
        if let Some(path) = &self.store.bindings_path {
            self.store.bindings_path = Some(expand_tilde(path)?);
        }
        self.activation.osascript = expand_tilde(&self.activation.osascript)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.monitor.global && !self.monitor.local {
            anyhow::bail!("At least one key monitor (global or local) must be enabled");
        }

        if self.activation.osascript.trim().is_empty() {
            anyhow::bail!("Activation osascript path cannot be empty");
        }

        if let Some(path) = &self.store.bindings_path {
            if path.trim().is_empty() {
                anyhow::bail!("bindings_path cannot be empty");
            }
        }

        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            anyhow::bail!(
                "Unknown logging level '{}' (expected one of {})",
                self.logging.level,
                LOG_LEVELS.join(", ")
            );
        }

        Ok(())
    }

    pub fn save_default_config(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        fs::write(path, Self::default_config_content())
            .with_context(|| format!("Failed to write default config to: {}", path.display()))?;

        Ok(())
    }

    /// Loads `path`, creating it from the default template first if it does not exist.
    /// Invalid configuration falls back to defaults with a warning.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            match Self::save_default_config(path) {
                Ok(()) => tracing::info!("Created default configuration at: {}", path.display()),
                Err(e) => tracing::warn!("{:#}", e),
            }
        }

        let mut config = Self::load_from_file(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {:#}. Using defaults.", e);
            Config::default()
        });

        if let Err(e) = config.expand_path() {
            tracing::warn!("Failed to expand config paths: {:#}. Using defaults.", e);
            config = Config::default();
        }

        if let Err(e) = config.validate() {
            tracing::warn!("Invalid configuration: {:#}. Using defaults.", e);
            config = Config::default();
        }

        config
    }
}

pub(crate) fn expand_tilde(path: &str) -> Result<String> {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = dirs::home_dir().context("Failed to determine home directory")?;
        Ok(home.join(rest).to_string_lossy().into_owned())
    } else {
        Ok(path.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_minimal_config() {
        let config_str = r#"
[store]

[monitor]
global = true
local = false

[activation]
osascript = "/usr/bin/osascript"
"#;

        let config = Config::load_from_str(config_str).unwrap();

        assert_eq!(config.store.bindings_path, None);
        assert!(config.store.watch); // Default value
        assert!(config.monitor.global);
        assert!(!config.monitor.local);
        assert!(config.monitor.prompt_for_accessibility); // Default value
        assert_eq!(config.dispatch.debounce_ms, 0);
        assert!(config.activation.raise_windows);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_full_config() {
        let config_str = r#"
[store]
bindings_path = "/tmp/hotswitch/bindings.toml"
watch = false

[monitor]
global = false
local = true
prompt_for_accessibility = false

[dispatch]
debounce_ms = 150

[activation]
osascript = "/opt/bin/osascript"
raise_windows = false

[logging]
level = "debug"
"#;

        let config = Config::load_from_str(config_str).unwrap();

        assert_eq!(config.store.bindings_path.as_deref(), Some("/tmp/hotswitch/bindings.toml"));
        assert!(!config.store.watch);
        assert!(!config.monitor.prompt_for_accessibility);
        assert_eq!(config.dispatch.debounce(), Duration::from_millis(150));
        assert_eq!(config.activation.osascript, "/opt/bin/osascript");
        assert!(!config.activation.raise_windows);
        assert_eq!(config.logging.level, "debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_invalid_config_missing_section() {
        let config_str = r#"
[store]

[monitor]
global = true
local = true
"#;

        let result = Config::load_from_str(config_str);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Failed to parse configuration"));
    }

    #[test]
    fn test_parse_invalid_config_wrong_type() {
        let config_str = r#"
[store]

[monitor]
global = "yes"  # Should be boolean
local = true

[activation]
osascript = "/usr/bin/osascript"
"#;

        assert!(Config::load_from_str(config_str).is_err());
    }

    #[test]
    fn test_expand_tilde() {
        let home = dirs::home_dir().unwrap();
        let home_str = home.to_string_lossy();

        assert_eq!(expand_tilde("~/test").unwrap(), format!("{}/test", home_str));
        assert_eq!(expand_tilde("/absolute/path").unwrap(), "/absolute/path");
        assert_eq!(expand_tilde("relative/path").unwrap(), "relative/path");
    }

    #[test]
    fn test_config_expand_paths() {
        let mut config = Config::default();
        config.store.bindings_path = Some("~/.hotswitch/bindings.toml".to_string());
        config.expand_path().unwrap();

        let home = dirs::home_dir().unwrap();
        assert_eq!(
            config.store.bindings_path.unwrap(),
            home.join(".hotswitch/bindings.toml").to_string_lossy()
        );
        assert_eq!(config.activation.osascript, "/usr/bin/osascript");
    }

    #[test]
    fn test_bindings_path_defaults_next_to_config() {
        let config = Config::default();
        let path = config.bindings_path(Path::new("/etc/hotswitch/config.toml"));
        assert_eq!(path, PathBuf::from("/etc/hotswitch/bindings.toml"));

        let mut custom = Config::default();
        custom.store.bindings_path = Some("/data/keys.toml".to_string());
        assert_eq!(
            custom.bindings_path(Path::new("/etc/hotswitch/config.toml")),
            PathBuf::from("/data/keys.toml")
        );
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path().unwrap();
        assert!(path.to_string_lossy().contains("hotswitch"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_validate_no_monitors() {
        let mut config = Config::default();
        config.monitor.global = false;
        config.monitor.local = false;

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("At least one key monitor"));
    }

    #[test]
    fn test_validate_empty_osascript() {
        let mut config = Config::default();
        config.activation.osascript = " ".to_string();

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("osascript path cannot be empty"));
    }

    #[test]
    fn test_validate_unknown_log_level() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Unknown logging level"));

        config.logging.level = "WARN".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_default_config_content_can_be_parsed() {
        let content = Config::default_config_content();
        let config = Config::load_from_str(content).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_or_default_writes_template() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let config = Config::load_or_default(&path);
        assert!(path.exists());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_or_default_falls_back_on_invalid_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[monitor]\nglobal = false\nlocal = false\n").unwrap();

        assert_eq!(Config::load_or_default(&path), Config::default());
    }
}
