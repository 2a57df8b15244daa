use std::path::PathBuf;

use anyhow::Result;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder};
use serde::Deserialize;

use crate::constants::{
    CONFIG_FILE, CONFIRMED_STATUS, DEFAULT_BLOCKER_TITLE, DEFAULT_CATEGORY, DEFAULT_SETUPFILE,
    DEFAULT_TIMEZONE, DEFAULT_TITLE, ENV_PREFIX, LEGACY_URL_VAR, USER_AGENT,
};
use crate::error::CoreError;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub feed: FeedConfig,
    pub output: OutputConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// `http(s)://` or `file://` URL, or a plain filesystem path.
    pub url: String,
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub path: PathBuf,
    pub title: String,
    pub category: String,
    pub setupfile: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    /// IANA zone every formatted timestamp is converted to.
    pub timezone: String,
    pub past_days: u32,
    pub future_days: u32,
    #[serde(default = "default_rejections")]
    pub reject: Vec<RejectionPredicate>,
    #[serde(default = "default_tzid_aliases")]
    pub tzid_aliases: Vec<TzidAlias>,
}

/// A single rule of the rejection filter. An event is dropped when any rule matches.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RejectionPredicate {
    /// Matches when STATUS is anything other than the given value (absent included).
    StatusNot(String),
    /// Matches events whose DTSTART is a plain DATE.
    IsAllDay,
    /// Matches when SUMMARY is exactly the given value.
    TitleEquals(String),
}

/// Textual TZID replacement applied to the raw feed before parsing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TzidAlias {
    pub from: String,
    pub to: String,
}

impl TzidAlias {
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

fn default_rejections() -> Vec<RejectionPredicate> {
    vec![
        RejectionPredicate::StatusNot(CONFIRMED_STATUS.to_string()),
        RejectionPredicate::IsAllDay,
        RejectionPredicate::TitleEquals(DEFAULT_BLOCKER_TITLE.to_string()),
    ]
}

fn default_tzid_aliases() -> Vec<TzidAlias> {
    vec![
        TzidAlias::new("W. Europe Standard Time", "Europe/Berlin"),
        TzidAlias::new("GMT Standard Time", "Europe/London"),
    ]
}

/// Registers the legacy feed URL as the lowest-precedence `feed.url`.
fn with_legacy_url(
    builder: ConfigBuilder<DefaultState>,
    url: Option<String>,
) -> Result<ConfigBuilder<DefaultState>> {
    Ok(match url {
        Some(url) => builder.set_default("feed.url", url)?,
        None => builder,
    })
}

impl Settings {
    /// ## Summary
    /// Returns a configuration builder pre-populated with every default value.
    ///
    /// ## Errors
    /// Returns an error if a default cannot be registered.
    pub fn builder() -> Result<ConfigBuilder<DefaultState>> {
        Ok(Config::builder()
            .set_default("feed.user_agent", USER_AGENT)?
            .set_default("output.title", DEFAULT_TITLE)?
            .set_default("output.category", DEFAULT_CATEGORY)?
            .set_default("output.setupfile", DEFAULT_SETUPFILE)?
            .set_default("export.timezone", DEFAULT_TIMEZONE)?
            .set_default("export.past_days", 7)?
            .set_default("export.future_days", 10)?
            .set_default("logging.level", "info")?)
    }

    /// ## Summary
    /// Loads configuration from `calorg.toml` and `CALORG_*` environment variables.
    /// Environment variables take precedence over the file; the legacy
    /// `OUTLOOK_TO_ORG_URL` only fills `feed.url` when nothing else does.
    ///
    /// ## Errors
    /// Returns an error if building, deserializing or validating the configuration fails.
    pub fn load() -> Result<Self> {
        let builder = with_legacy_url(Self::builder()?, std::env::var(LEGACY_URL_VAR).ok())?
            // TOML file
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            // Env
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            );

        Self::from_builder(builder)
    }

    /// ## Summary
    /// Builds and validates settings from an already assembled builder.
    ///
    /// ## Errors
    /// Returns an error if a required key is missing or a value is out of range.
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let settings = builder.build()?.try_deserialize::<Self>()?;
        settings.validate()?;
        Ok(settings)
    }

    /// ## Summary
    /// Checks the values serde cannot check on its own.
    ///
    /// ## Errors
    /// Returns `CoreError::ConfigError` for an empty feed URL or output path.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.feed.url.trim().is_empty() {
            return Err(CoreError::ConfigError("feed.url must not be empty".into()));
        }
        if self.output.path.as_os_str().is_empty() {
            return Err(CoreError::ConfigError(
                "output.path must not be empty".into(),
            ));
        }
        if let Some(alias) = self.export.tzid_aliases.iter().find(|a| a.from.is_empty()) {
            return Err(CoreError::ValidationError(format!(
                "tzid alias to {} has an empty source",
                alias.to
            )));
        }
        Ok(())
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    Settings::load()
}
