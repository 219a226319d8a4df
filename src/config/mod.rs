//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{num::NonZeroUsize, path::PathBuf, str::FromStr, time::Duration};

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::application::tags::DEFAULT_TAG_BATCH_SIZE;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "galleria";
const DEFAULT_API_TIMEOUT_SECS: u64 = 30;
const DEFAULT_HISTORY_BASE_URL: &str = "http://localhost/";

/// Command-line arguments for the `galleria` binary.
#[derive(Debug, Parser)]
#[command(name = "galleria", version, about = "Gallery search client with page and tag caching")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "GALLERIA_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: Overrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Fetch a page of posts, optionally stepping forward or backward afterwards.
    Search(SearchArgs),
    /// Resolve metadata for the given tag names.
    Tags(TagsArgs),
    /// Fetch a page of posts and resolve the tags of every post on it.
    #[command(name = "post-tags")]
    PostTags(PageArgs),
}

#[derive(Debug, Args, Clone)]
pub struct PageArgs {
    /// Comma-separated query tokens, e.g. `cat,rating:safe`.
    #[arg(long, short = 'q', default_value = "")]
    pub query: String,

    /// 1-based page to fetch first.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,

    /// Restore page and query from an address-bar URL (`#page=..&q=..`).
    #[arg(long, value_name = "URL", conflicts_with_all = ["query", "page"])]
    pub url: Option<Url>,
}

#[derive(Debug, Args, Clone)]
pub struct SearchArgs {
    #[command(flatten)]
    pub target: PageArgs,

    /// Number of `next` steps after the first page.
    #[arg(long, default_value_t = 0)]
    pub next: u32,

    /// Number of `previous` steps after the forward steps.
    #[arg(long, default_value_t = 0)]
    pub prev: u32,
}

#[derive(Debug, Args, Clone)]
pub struct TagsArgs {
    /// Tag names (case-sensitive).
    #[arg(required = true, value_name = "NAME")]
    pub names: Vec<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct Overrides {
    /// Override the API base URL.
    #[arg(long = "api-base-url", value_name = "URL")]
    pub api_base_url: Option<String>,

    /// Override the API request timeout.
    #[arg(long = "api-timeout-seconds", value_name = "SECONDS")]
    pub api_timeout_seconds: Option<u64>,

    /// Override the maximum number of names per tag request.
    #[arg(long = "tags-batch-size", value_name = "COUNT")]
    pub tags_batch_size: Option<usize>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,
}

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api: ApiSettings,
    pub tags: TagSettings,
    pub history: HistorySettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: Url,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct TagSettings {
    pub batch_size: NonZeroUsize,
}

#[derive(Debug, Clone)]
pub struct HistorySettings {
    pub base_url: Url,
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
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("GALLERIA").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    api: RawApiSettings,
    tags: RawTagSettings,
    history: RawHistorySettings,
    logging: RawLoggingSettings,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(url) = overrides.api_base_url.as_ref() {
            self.api.base_url = Some(url.clone());
        }
        if let Some(seconds) = overrides.api_timeout_seconds {
            self.api.timeout_seconds = Some(seconds);
        }
        if let Some(size) = overrides.tags_batch_size {
            self.tags.batch_size = Some(size);
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
        let RawSettings {
            api,
            tags,
            history,
            logging,
        } = raw;

        Ok(Self {
            api: build_api_settings(api)?,
            tags: build_tag_settings(tags)?,
            history: build_history_settings(history)?,
            logging: build_logging_settings(logging)?,
        })
    }
}

fn build_api_settings(api: RawApiSettings) -> Result<ApiSettings, LoadError> {
    let raw_url = api
        .base_url
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| LoadError::invalid("api.base_url", "a base URL is required"))?;
    let base_url = parse_http_url(&raw_url)
        .map_err(|reason| LoadError::invalid("api.base_url", reason))?;

    let timeout_secs = api.timeout_seconds.unwrap_or(DEFAULT_API_TIMEOUT_SECS);
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

fn build_tag_settings(tags: RawTagSettings) -> Result<TagSettings, LoadError> {
    let batch_size = NonZeroUsize::new(tags.batch_size.unwrap_or(DEFAULT_TAG_BATCH_SIZE))
        .ok_or_else(|| LoadError::invalid("tags.batch_size", "must be greater than zero"))?;
    Ok(TagSettings { batch_size })
}

fn build_history_settings(history: RawHistorySettings) -> Result<HistorySettings, LoadError> {
    let raw_url = history
        .base_url
        .unwrap_or_else(|| DEFAULT_HISTORY_BASE_URL.to_string());
    let base_url = parse_http_url(raw_url.trim())
        .map_err(|reason| LoadError::invalid("history.base_url", reason))?;
    Ok(HistorySettings { base_url })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawApiSettings {
    base_url: Option<String>,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawTagSettings {
    batch_size: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawHistorySettings {
    base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

fn parse_http_url(value: &str) -> Result<Url, String> {
    let url = Url::parse(value).map_err(|err| format!("invalid URL `{value}`: {err}"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("unsupported scheme `{other}`")),
    }
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}
