use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use shared::error::ConfigError;

pub const DEFAULT_CONFIG_FILE: &str = "artify.toml";
const ENV_PREFIX: &str = "ARTIFY__";

/// Identity provider configuration. Built once at start-up and handed to the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub auth_domain: String,
    pub project_id: String,
    pub storage_bucket: String,
    pub messaging_sender_id: String,
    pub app_id: String,
}

impl FirebaseConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingField("firebase.api_key"));
        }
        if self.auth_domain.trim().is_empty() {
            return Err(ConfigError::MissingField("firebase.auth_domain"));
        }
        if self.project_id.trim().is_empty() {
            return Err(ConfigError::MissingField("firebase.project_id"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub service_url: String,
    pub transfer_timeout_secs: u64,
    pub identity_endpoint: String,
    pub firebase: FirebaseConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            service_url: "https://your-backend-url.com".into(),
            transfer_timeout_secs: 0,
            identity_endpoint: "https://identitytoolkit.googleapis.com".into(),
            firebase: FirebaseConfig::default(),
        }
    }
}

impl Settings {
    pub fn transfer_timeout(&self) -> Option<Duration> {
        (self.transfer_timeout_secs > 0).then(|| Duration::from_secs(self.transfer_timeout_secs))
    }

    /// Copy safe to print: the API key is masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.firebase.api_key.is_empty() {
            copy.firebase.api_key = "<redacted>".into();
        }
        copy
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    service_url: Option<String>,
    transfer_timeout_secs: Option<u64>,
    identity_endpoint: Option<String>,
    #[serde(default)]
    firebase: FileFirebase,
}

#[derive(Debug, Default, Deserialize)]
struct FileFirebase {
    api_key: Option<String>,
    auth_domain: Option<String>,
    project_id: Option<String>,
    storage_bucket: Option<String>,
    messaging_sender_id: Option<String>,
    app_id: Option<String>,
}

pub fn load_settings(config_path: Option<&Path>) -> Result<Settings, ConfigError> {
    load_settings_from(config_path, |key| std::env::var(key).ok())
}

/// Defaults, then the TOML file, then environment. `env` stands in for `std::env::var`.
pub fn load_settings_from<F>(config_path: Option<&Path>, env: F) -> Result<Settings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut settings = Settings::default();

    if let Some(file_cfg) = read_file_settings(config_path)? {
        apply_file(&mut settings, file_cfg);
    }

    if let Some(v) = prefixed(&env, "SERVICE_URL") {
        settings.service_url = v;
    }
    if let Some(v) = prefixed(&env, "IDENTITY_ENDPOINT") {
        settings.identity_endpoint = v;
    }
    if let Some(v) = prefixed(&env, "TRANSFER_TIMEOUT_SECS") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.transfer_timeout_secs = parsed;
        }
    }

    let firebase = &mut settings.firebase;
    overlay_firebase(&env, "FIREBASE_API_KEY", &mut firebase.api_key);
    overlay_firebase(&env, "FIREBASE_AUTH_DOMAIN", &mut firebase.auth_domain);
    overlay_firebase(&env, "FIREBASE_PROJECT_ID", &mut firebase.project_id);
    overlay_firebase(&env, "FIREBASE_STORAGE_BUCKET", &mut firebase.storage_bucket);
    overlay_firebase(
        &env,
        "FIREBASE_MESSAGING_SENDER_ID",
        &mut firebase.messaging_sender_id,
    );
    overlay_firebase(&env, "FIREBASE_APP_ID", &mut firebase.app_id);

    Ok(settings)
}

fn read_file_settings(config_path: Option<&Path>) -> Result<Option<FileSettings>, ConfigError> {
    let (path, required) = match config_path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };

    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(err) if !required && err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                source,
            })
        }
    };

    toml::from_str::<FileSettings>(&raw)
        .map(Some)
        .map_err(|err| ConfigError::Parse {
            path: path.display().to_string(),
            message: err.to_string(),
        })
}

fn apply_file(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.service_url {
        settings.service_url = v;
    }
    if let Some(v) = file_cfg.transfer_timeout_secs {
        settings.transfer_timeout_secs = v;
    }
    if let Some(v) = file_cfg.identity_endpoint {
        settings.identity_endpoint = v;
    }

    let fb = file_cfg.firebase;
    let target = &mut settings.firebase;
    for (value, slot) in [
        (fb.api_key, &mut target.api_key),
        (fb.auth_domain, &mut target.auth_domain),
        (fb.project_id, &mut target.project_id),
        (fb.storage_bucket, &mut target.storage_bucket),
        (fb.messaging_sender_id, &mut target.messaging_sender_id),
        (fb.app_id, &mut target.app_id),
    ] {
        if let Some(v) = value {
            *slot = v;
        }
    }
}

fn prefixed<F>(env: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    env(&format!("{ENV_PREFIX}{key}"))
}

// Bare name first, prefixed name wins.
fn overlay_firebase<F>(env: &F, key: &str, slot: &mut String)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = env(key) {
        *slot = v;
    }
    if let Some(v) = prefixed(env, key) {
        *slot = v;
    }
}
