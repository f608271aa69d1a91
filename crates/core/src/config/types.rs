use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    pub version: u32,
    #[serde(default)]
    pub engine: EngineSection,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[engine]` table as written in the file.
#[derive(Debug, Deserialize, Clone)]
pub struct EngineSection {
    /// Quiet period before the registry rescans the document.
    #[serde(default = "default_rescan_debounce_ms")]
    pub rescan_debounce_ms: u64,
    /// How long a clicked variable stays highlighted in the panel.
    #[serde(default = "default_highlight_pulse_ms")]
    pub highlight_pulse_ms: u64,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            rescan_debounce_ms: default_rescan_debounce_ms(),
            highlight_pulse_ms: default_highlight_pulse_ms(),
        }
    }
}

fn default_rescan_debounce_ms() -> u64 {
    300
}

fn default_highlight_pulse_ms() -> u64 {
    1500
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file_level: Option<String>,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), file_level: None, file: None }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Engine timings, resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub rescan_debounce: Duration,
    pub highlight_pulse: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig::from(&EngineSection::default())
    }
}

impl From<&EngineSection> for EngineConfig {
    fn from(section: &EngineSection) -> Self {
        Self {
            rescan_debounce: Duration::from_millis(section.rescan_debounce_ms),
            highlight_pulse: Duration::from_millis(section.highlight_pulse_ms),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResolvedConfig {
    /// File the configuration was read from; `None` for built-in defaults.
    pub source: Option<PathBuf>,
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
}
