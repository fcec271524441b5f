// In crates/app-config/src/types.rs

use execution::PaperSettings;
use risk::{AdmissionPolicy, PositionMonitor, RiskConfig, TradingSettings};
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Settings {
    /// The application's general settings.
    #[serde(default)]
    pub app: AppSettings,
    /// Position sizing and signal admission limits.
    #[serde(default)]
    pub trading: TradingSettings,
    /// Paper execution parameters.
    #[serde(default)]
    pub paper: PaperSettings,
}

impl Settings {
    /// The validated risk limits for this session.
    pub fn risk_config(&self) -> crate::Result<RiskConfig> {
        Ok(RiskConfig::try_from(&self.trading)?)
    }

    /// The validated signal admission policy for this session.
    pub fn admission_policy(&self) -> crate::Result<AdmissionPolicy> {
        Ok(AdmissionPolicy::try_from(&self.trading)?)
    }

    /// The validated post-cycle position alert thresholds.
    pub fn position_monitor(&self) -> crate::Result<PositionMonitor> {
        Ok(PositionMonitor::try_from(&self.trading)?)
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppSettings {
    /// The environment the application is running in (e.g., "development", "production").
    #[serde(default = "default_environment")]
    pub environment: String,
    /// The log level for the application.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            log_level: default_log_level(),
        }
    }
}

fn default_environment() -> String { "development".to_string() }
fn default_log_level() -> String { "info".to_string() }
