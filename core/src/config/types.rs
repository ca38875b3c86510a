use serde::{Deserialize, Serialize};

use crate::quality::QualityControlConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Upper bound on tasks run at once inside a wave.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Global QC policy, adopted by plans that do not enable their own.
    #[serde(default)]
    pub quality_control: QualityControlConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_max_concurrency() -> usize {
    3
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            quality_control: QualityControlConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_concurrency == 0 {
            anyhow::bail!("max_concurrency must be at least 1");
        }
        self.quality_control
            .validate()
            .map_err(|e| anyhow::anyhow!("quality_control: {e}"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default)]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "planwave_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Optional directory for log files. If empty or unset, uses OS temp dir.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: false,
            level: default_logging_level(),
            directory: None,
        }
    }
}
