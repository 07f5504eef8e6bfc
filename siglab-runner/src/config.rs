//! TOML configuration.
//!
//! Every section and field has a default, so an empty file (or no file at
//! all) is a valid configuration. The Telegram credentials can also come from
//! `SIGLAB_TELEGRAM_TOKEN` / `SIGLAB_TELEGRAM_CHAT_ID`, which win over the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use siglab_core::data::{DataSource, Period};
use siglab_core::{IndicatorParams, ParamError, SignalParams, StrategyParams};

use crate::export::SheetColumn;

pub const ENV_TELEGRAM_TOKEN: &str = "SIGLAB_TELEGRAM_TOKEN";
pub const ENV_TELEGRAM_CHAT_ID: &str = "SIGLAB_TELEGRAM_CHAT_ID";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid strategy parameters: {0}")]
    Params(#[from] ParamError),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiglabConfig {
    pub data: DataConfig,
    pub strategy: StrategyConfig,
    pub export: ExportConfig,
    pub alert: AlertConfig,
    pub classifier: ClassifierConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub symbol: String,
    pub period: Period,
    pub source: DataSource,
    /// Required when `source = "csv"`.
    pub csv_path: Option<PathBuf>,
    /// Seed for the synthetic source.
    pub seed: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            symbol: "RELIANCE.NS".into(),
            period: Period::default(),
            source: DataSource::Yahoo,
            csv_path: None,
            seed: 42,
        }
    }
}

/// Flat view of the strategy parameters, as written in `[strategy]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub short_window: usize,
    pub long_window: usize,
    pub rsi_window: usize,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self::from(StrategyParams::default())
    }
}

impl From<StrategyParams> for StrategyConfig {
    fn from(p: StrategyParams) -> Self {
        Self {
            short_window: p.indicators.short_window,
            long_window: p.indicators.long_window,
            rsi_window: p.indicators.rsi_window,
            rsi_oversold: p.signals.rsi_oversold,
            rsi_overbought: p.signals.rsi_overbought,
        }
    }
}

impl StrategyConfig {
    pub fn params(&self) -> StrategyParams {
        StrategyParams {
            indicators: IndicatorParams::new(self.short_window, self.long_window, self.rsi_window),
            signals: SignalParams {
                rsi_oversold: self.rsi_oversold,
                rsi_overbought: self.rsi_overbought,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Parent directory for `{symbol}_{timestamp}/` artifact bundles.
    pub output_dir: PathBuf,
    /// Trailing rows written to the sheet log.
    pub sheet_rows: usize,
    pub sheet_path: PathBuf,
    pub sheet_columns: Vec<SheetColumn>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("artifacts"),
            sheet_rows: 20,
            sheet_path: PathBuf::from("signals_sheet.csv"),
            sheet_columns: SheetColumn::DEFAULT.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub telegram_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    /// Sleep between successful monitor cycles.
    pub interval_secs: u64,
    /// Sleep after a failed cycle.
    pub retry_secs: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            telegram_token: None,
            telegram_chat_id: None,
            interval_secs: 3600,
            retry_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub n_trees: usize,
    /// `None` grows trees until leaves are pure.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub test_fraction: f64,
    pub seed: u64,
    /// Training is refused below this many samples.
    pub min_rows: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            test_fraction: 0.2,
            seed: 42,
            min_rows: 100,
        }
    }
}

impl SiglabConfig {
    /// Load a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load `path` if given (defaults otherwise), apply environment
    /// overrides, then validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from `lookup` (normally the process environment).
    /// Empty values are ignored.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get(ENV_TELEGRAM_TOKEN) {
            tracing::info!("env override: {ENV_TELEGRAM_TOKEN}");
            self.alert.telegram_token = Some(token);
        }
        if let Some(chat_id) = get(ENV_TELEGRAM_CHAT_ID) {
            tracing::info!("env override: {ENV_TELEGRAM_CHAT_ID}");
            self.alert.telegram_chat_id = Some(chat_id);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data.symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("data.symbol must not be empty".into()));
        }
        if self.data.source == DataSource::Csv && self.data.csv_path.is_none() {
            return Err(ConfigError::Invalid(
                "data.csv_path is required when data.source = \"csv\"".into(),
            ));
        }

        self.strategy.params().validate()?;

        if self.export.sheet_rows == 0 {
            return Err(ConfigError::Invalid("export.sheet_rows must be >= 1".into()));
        }
        if self.export.sheet_columns.is_empty() {
            return Err(ConfigError::Invalid("export.sheet_columns must not be empty".into()));
        }
        if self.alert.interval_secs == 0 || self.alert.retry_secs == 0 {
            return Err(ConfigError::Invalid(
                "alert.interval_secs and alert.retry_secs must be >= 1".into(),
            ));
        }

        let c = &self.classifier;
        if c.n_trees == 0 {
            return Err(ConfigError::Invalid("classifier.n_trees must be >= 1".into()));
        }
        if !(c.test_fraction > 0.0 && c.test_fraction < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "classifier.test_fraction must be in (0, 1), got {}",
                c.test_fraction
            )));
        }
        if c.min_rows < 2 || c.min_samples_split < 2 {
            return Err(ConfigError::Invalid(
                "classifier.min_rows and classifier.min_samples_split must be >= 2".into(),
            ));
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(format!("serialize config: {e}")))
    }
}
