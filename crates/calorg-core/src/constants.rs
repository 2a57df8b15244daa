/// Identity strings shared across crates
pub const PKG_NAME: &str = "calorg";
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const USER_AGENT: &str = const_str::concat!(PKG_NAME, "/", PKG_VERSION);

/// Prefix for environment variables read by [`crate::config::load_config`].
pub const ENV_PREFIX: &str = "CALORG";
/// Variable the feed URL used to be read from; fills `feed.url` when nothing else sets it.
pub const LEGACY_URL_VAR: &str = "OUTLOOK_TO_ORG_URL";
/// Optional settings file, looked up in the working directory.
pub const CONFIG_FILE: &str = "calorg.toml";

pub const DEFAULT_TITLE: &str = "Outlook Calendar Export";
pub const DEFAULT_CATEGORY: &str = "Cal";
pub const DEFAULT_SETUPFILE: &str = "~/org/_config.org";
pub const DEFAULT_TIMEZONE: &str = "Europe/Berlin";
pub const DEFAULT_BLOCKER_TITLE: &str = "[GTD Blocker]";
pub const CONFIRMED_STATUS: &str = "CONFIRMED";
