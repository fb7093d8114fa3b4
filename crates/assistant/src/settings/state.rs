use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized},
};
use plantai_backend::{BackendConfig, DEFAULT_ENDPOINT};
use serde::{Deserialize, Deserializer, Serialize};
use snafu::{ResultExt, Snafu};

use crate::locale::LanguageCode;

pub const SETTINGS_DIRECTORY_NAME: &str = "plantai";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const ENV_PREFIX: &str = "PLANTAI_";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CHUNK_TIMEOUT_SECS: u64 = 60;
const STAGED_EXTENSION: &str = "json.partial";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantSettings {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default, deserialize_with = "deserialize_language")]
    pub language: LanguageCode,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_chunk_timeout_secs")]
    pub chunk_timeout_secs: u64,
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            language: LanguageCode::default(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            chunk_timeout_secs: DEFAULT_CHUNK_TIMEOUT_SECS,
            download_dir: default_download_dir(),
        }
    }
}

impl AssistantSettings {
    pub fn normalized(mut self) -> Self {
        self.endpoint = self.endpoint.trim().trim_end_matches('/').to_string();
        if self.endpoint.is_empty() {
            self.endpoint = default_endpoint();
        }
        if self.request_timeout_secs == 0 {
            self.request_timeout_secs = DEFAULT_REQUEST_TIMEOUT_SECS;
        }
        if self.chunk_timeout_secs == 0 {
            self.chunk_timeout_secs = DEFAULT_CHUNK_TIMEOUT_SECS;
        }
        if self.download_dir.as_os_str().is_empty() {
            self.download_dir = default_download_dir();
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn chunk_timeout(&self) -> Duration {
        Duration::from_secs(self.chunk_timeout_secs)
    }

    pub fn backend_config(&self) -> BackendConfig {
        BackendConfig::new(&self.endpoint).with_request_timeout(self.request_timeout())
    }
}

pub struct SettingsStore {
    settings: Arc<ArcSwap<AssistantSettings>>,
    config_path: PathBuf,
}

impl SettingsStore {
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|path| path.join(SETTINGS_DIRECTORY_NAME))
            .unwrap_or_else(|| PathBuf::from(".plantai"))
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join(SETTINGS_FILE_NAME)
    }

    pub fn new(config_path: PathBuf) -> Self {
        let settings = Self::load_layers(&config_path);
        Self {
            settings: Arc::new(ArcSwap::from_pointee(settings)),
            config_path,
        }
    }

    pub fn load() -> Self {
        Self::new(Self::default_config_path())
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn settings(&self) -> Arc<AssistantSettings> {
        self.settings.load_full()
    }

    /// Normalizes, writes to disk, then publishes `settings`.
    pub fn update(&self, settings: AssistantSettings) -> Result<(), SettingsError> {
        let settings = settings.normalized();
        self.write_atomically(&settings)?;
        self.settings.store(Arc::new(settings));
        Ok(())
    }

    /// Defaults, then the settings file, then `PLANTAI_*` environment variables.
    fn load_layers(path: &Path) -> AssistantSettings {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, layering environment over defaults");
        }

        Figment::from(Serialized::defaults(AssistantSettings::default()))
            .merge(Json::file(path))
            .merge(Env::prefixed(ENV_PREFIX))
            .extract::<AssistantSettings>()
            .map(AssistantSettings::normalized)
            .unwrap_or_else(|error| {
                tracing::warn!(path = %path.display(), error = %error, "settings unreadable, falling back to defaults");
                AssistantSettings::default()
            })
    }

    /// Writes a sibling `.partial` file, then renames it over the settings file.
    fn write_atomically(&self, settings: &AssistantSettings) -> Result<(), SettingsError> {
        let document = serde_json::to_string_pretty(settings).context(EncodeSettingsSnafu {
            stage: "encode-settings",
        })?;

        if let Some(directory) = self.config_path.parent() {
            std::fs::create_dir_all(directory).context(ConfigDirectorySnafu {
                stage: "ensure-config-directory",
                path: directory.to_path_buf(),
            })?;
        }

        let staged = self.config_path.with_extension(STAGED_EXTENSION);
        std::fs::write(&staged, document).context(WriteStagedSnafu {
            stage: "write-staged-settings",
            path: staged.clone(),
        })?;
        std::fs::rename(&staged, &self.config_path).context(CommitStagedSnafu {
            stage: "commit-staged-settings",
            path: self.config_path.clone(),
        })?;

        tracing::debug!(path = %self.config_path.display(), "settings written");
        Ok(())
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SettingsError {
    #[snafu(display("cannot prepare config directory {path:?} on `{stage}`: {source}"))]
    ConfigDirectory {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("cannot encode settings as JSON on `{stage}`: {source}"))]
    EncodeSettings {
        stage: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("cannot write staged settings {path:?} on `{stage}`: {source}"))]
    WriteStaged {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("cannot move staged settings into {path:?} on `{stage}`: {source}"))]
    CommitStaged {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_chunk_timeout_secs() -> u64 {
    DEFAULT_CHUNK_TIMEOUT_SECS
}

fn default_download_dir() -> PathBuf {
    PathBuf::from(".")
}

fn deserialize_language<'de, D>(deserializer: D) -> Result<LanguageCode, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(LanguageCode::parse_or_default(&value))
}
