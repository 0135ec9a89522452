//! Process configuration read from the environment (and `.env`, loaded by `main`).

use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading the configuration.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("DISCORD_TOKEN is not set")]
    MissingToken,

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Client-credentials pair for the Spotify Web API.
#[derive(Clone, Debug, PartialEq)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub discord_token: String,
    pub spotify: Option<SpotifyCredentials>,
    pub command_prefix: String,
    pub ytdlp_path: PathBuf,
    pub ffmpeg_path: PathBuf,
    pub use_browser_cookies: bool,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let discord_token = get("DISCORD_TOKEN").ok_or(ConfigError::MissingToken)?;

        let spotify = match (get("SPOTIFY_CLIENT_ID"), get("SPOTIFY_CLIENT_SECRET")) {
            (Some(client_id), Some(client_secret)) => Some(SpotifyCredentials {
                client_id,
                client_secret,
            }),
            _ => None,
        };

        let use_browser_cookies = match get("USE_BROWSER_COOKIES") {
            Some(value) => parse_bool(&value).ok_or(ConfigError::InvalidValue {
                key: "USE_BROWSER_COOKIES",
                value,
            })?,
            None => true,
        };

        Ok(Self {
            discord_token,
            spotify,
            command_prefix: get("COMMAND_PREFIX").unwrap_or_else(|| "!".to_string()),
            ytdlp_path: get("YTDLP_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("yt-dlp")),
            ffmpeg_path: get("FFMPEG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("ffmpeg")),
            use_browser_cookies,
        })
    }

    /// The first characters of the token, for startup logging.
    /// Loggable description of the token; never includes any of its characters.
    pub fn token_summary(&self) -> String {
        format!("set ({} chars)", self.discord_token.chars().count())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
