mod settings;

use config::{Config, Environment, File};

use settings::PartialSettings;

use crate::utils::Result;

pub use settings::{BackendSettings, LoggingSettings, Settings, StorageSettings};

/// Prefix for environment overrides, e.g. `TOPICSYNC__BACKEND__URL`.
pub const ENV_PREFIX: &str = "TOPICSYNC";

/// Loads the configuration from `config/default` (if present) and
/// `TOPICSYNC__*` environment variables, merged over the defaults.
/// Unreadable sources fail with [`crate::Error::Config`].
pub fn load_config() -> Result<Settings> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build()?;
    let partial: PartialSettings = config.try_deserialize()?;
    let default = Settings::default();

    Ok(Settings {
        storage: StorageSettings {
            path: partial
                .storage
                .as_ref()
                .and_then(|s| s.path.clone())
                .unwrap_or(default.storage.path),
        },
        backend: BackendSettings {
            url: partial
                .backend
                .as_ref()
                .and_then(|b| b.url.clone())
                .unwrap_or(default.backend.url),
            timeout_ms: partial
                .backend
                .as_ref()
                .and_then(|b| b.timeout_ms)
                .unwrap_or(default.backend.timeout_ms),
        },
        logging: LoggingSettings {
            level: partial
                .logging
                .as_ref()
                .and_then(|l| l.level.clone())
                .unwrap_or(default.logging.level),
        },
    })
}
