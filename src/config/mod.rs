//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{env, num::NonZeroU32, path::PathBuf, str::FromStr, time::Duration};

use clap::{Args, ValueHint, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::application::{pagination::PaginationPolicy, posts::DeletePolicy};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "storydesk";
const ENV_PREFIX: &str = "STORYDESK";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PAGE_LIMIT: u64 = 20;
const DEFAULT_LOCAL_SEARCH_THRESHOLD: u64 = 2_000;
const DEFAULT_FULL_FETCH_LIMIT: u64 = 200;
const SESSION_FILE_NAME: &str = "session.json";

/// Options shared by every `storydesk-cli` command.
#[derive(Debug, Args, Default, Clone)]
pub struct GlobalOverrides {
    /// API base URL, e.g. <https://cms.example.com>
    #[arg(long, global = true, env = "STORYDESK_SITE_URL", value_hint = ValueHint::Url)]
    pub site: Option<String>,

    /// Optional path to a configuration file.
    #[arg(long = "config-file", global = true, value_hint = ValueHint::FilePath)]
    pub config_file: Option<PathBuf>,

    /// Where the sign-in session is kept.
    #[arg(long = "session-file", global = true, value_hint = ValueHint::FilePath)]
    pub session_file: Option<PathBuf>,

    /// Override the HTTP request timeout.
    #[arg(long = "timeout-seconds", global = true, value_name = "SECONDS")]
    pub timeout_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        global = true,
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,
}

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api: ApiSettings,
    pub session: SessionSettings,
    pub logging: LoggingSettings,
    pub pagination: PaginationPolicy,
    pub sync: SyncSettings,
}

#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// `None` until a site is configured somewhere.
    pub base_url: Option<Url>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone, Copy)]
pub struct SyncSettings {
    pub delete_policy: DeletePolicy,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(overrides: &GlobalOverrides) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = overrides.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(overrides);
    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    api: RawApiSettings,
    session: RawSessionSettings,
    logging: RawLoggingSettings,
    pagination: RawPaginationSettings,
    sync: RawSyncSettings,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &GlobalOverrides) {
        if let Some(site) = overrides.site.as_ref() {
            self.api.base_url = Some(site.clone());
        }
        if let Some(timeout) = overrides.timeout_seconds {
            self.api.timeout_seconds = Some(timeout);
        }
        if let Some(path) = overrides.session_file.as_ref() {
            self.session.path = Some(path.clone());
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        Ok(Self {
            api: build_api_settings(raw.api)?,
            session: build_session_settings(raw.session),
            logging: build_logging_settings(raw.logging)?,
            pagination: build_pagination_policy(raw.pagination)?,
            sync: build_sync_settings(raw.sync)?,
        })
    }
}

fn build_api_settings(api: RawApiSettings) -> Result<ApiSettings, LoadError> {
    let base_url = match api.base_url.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(value) => {
            let url = Url::parse(value)
                .map_err(|err| LoadError::invalid("api.base_url", err.to_string()))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(LoadError::invalid(
                    "api.base_url",
                    format!("unsupported scheme `{}`", url.scheme()),
                ));
            }
            Some(url)
        }
    };

    let timeout_secs = api.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(LoadError::invalid(
            "api.timeout_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ApiSettings {
        base_url,
        timeout: Duration::from_secs(timeout_secs),
    })
}

fn build_session_settings(session: RawSessionSettings) -> SessionSettings {
    SessionSettings {
        path: session.path.unwrap_or_else(default_session_path),
    }
}

/// `$XDG_CONFIG_HOME/storydesk/session.json`, falling back to `~/.config`.
fn default_session_path() -> PathBuf {
    let config_home = env::var_os("XDG_CONFIG_HOME")
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")));
    match config_home {
        Some(dir) => dir.join(LOCAL_CONFIG_BASENAME).join(SESSION_FILE_NAME),
        None => PathBuf::from(format!(".{LOCAL_CONFIG_BASENAME}-{SESSION_FILE_NAME}")),
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::WARN,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_pagination_policy(
    pagination: RawPaginationSettings,
) -> Result<PaginationPolicy, LoadError> {
    Ok(PaginationPolicy {
        default_limit: non_zero_u32(
            pagination.default_limit.unwrap_or(DEFAULT_PAGE_LIMIT),
            "pagination.default_limit",
        )?,
        local_search_threshold: pagination
            .local_search_threshold
            .unwrap_or(DEFAULT_LOCAL_SEARCH_THRESHOLD),
        full_fetch_limit: non_zero_u32(
            pagination.full_fetch_limit.unwrap_or(DEFAULT_FULL_FETCH_LIMIT),
            "pagination.full_fetch_limit",
        )?,
    })
}

fn build_sync_settings(sync: RawSyncSettings) -> Result<SyncSettings, LoadError> {
    let delete_policy = match sync.delete_policy {
        Some(value) => DeletePolicy::from_str(&value)
            .map_err(|err| LoadError::invalid("sync.delete_policy", err.to_string()))?,
        None => DeletePolicy::default(),
    };
    Ok(SyncSettings { delete_policy })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawApiSettings {
    base_url: Option<String>,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSessionSettings {
    path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawPaginationSettings {
    default_limit: Option<u64>,
    local_search_threshold: Option<u64>,
    full_fetch_limit: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSyncSettings {
    delete_policy: Option<String>,
}

fn non_zero_u32(value: u64, key: &'static str) -> Result<NonZeroU32, LoadError> {
    if value == 0 {
        return Err(LoadError::invalid(key, "must be greater than zero"));
    }
    let value_u32: u32 = value
        .try_into()
        .map_err(|_| LoadError::invalid(key, "value exceeds supported range for u32"))?;
    NonZeroU32::new(value_u32).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}
