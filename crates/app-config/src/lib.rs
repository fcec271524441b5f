// In crates/app-config/src/lib.rs

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};

pub mod error;
pub mod types;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
pub use types::{AppSettings, Settings};

/// Loads the application settings from various sources.
///
/// This function orchestrates the layered configuration loading:
/// 1. Reads from a default `config/base` file (`.yaml`, `.yml` or `.toml`).
/// 2. Merges settings from an environment-specific file (e.g., `config/development.yaml`).
/// 3. Merges settings from environment variables (e.g., `APP_TRADING__POSITION_SIZE=0.05`).
///
/// The trading and paper sections are validated before returning.
pub fn load_settings() -> Result<Settings> {
    load_settings_from("config")
}

/// Same as [`load_settings`], reading files from `dir` instead of `config/`.
pub fn load_settings_from(dir: &str) -> Result<Settings> {
    // Get the current environment. Default to "development" if not set.
    let environment = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".into());

    let builder = Config::builder()
        .add_source(File::with_name(&format!("{dir}/base")))
        .add_source(File::with_name(&format!("{dir}/{environment}")).required(false))
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

    finish(builder)
}

/// Parses settings from an in-memory document, without files or environment.
pub fn settings_from_str(content: &str, format: FileFormat) -> Result<Settings> {
    finish(Config::builder().add_source(File::from_str(content, format)))
}

fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Settings> {
    let settings: Settings = builder.build()?.try_deserialize()?;

    // Fail at startup rather than on the first signal.
    settings.risk_config()?;
    settings.admission_policy()?;
    settings.position_monitor()?;
    settings.paper.validate()?;

    Ok(settings)
}
