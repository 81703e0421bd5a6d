use serde::Deserialize;

/// Top-level configuration settings for the application.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Settings {
    pub storage: StorageSettings,
    pub backend: BackendSettings,
    pub logging: LoggingSettings,
}

/// Where the pending-topics snapshot is persisted.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct StorageSettings {
    pub path: String,
}

/// Connection parameters for the subscription backend.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BackendSettings {
    pub url: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LoggingSettings {
    pub level: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Missing values are filled from `Settings::default()`.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub storage: Option<PartialStorageSettings>,
    pub backend: Option<PartialBackendSettings>,
    pub logging: Option<PartialLoggingSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialStorageSettings {
    pub path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PartialBackendSettings {
    pub url: Option<String>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct PartialLoggingSettings {
    pub level: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            storage: StorageSettings {
                path: "topicsync_db".to_string(),
            },
            backend: BackendSettings {
                url: "ws://127.0.0.1:8080".to_string(),
                timeout_ms: 5000,
            },
            logging: LoggingSettings {
                level: "info".to_string(),
            },
        }
    }
}
