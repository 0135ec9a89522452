//! Resolves a query (video link or free text) to a playable stream through
//! `yt-dlp`.
//!
//! The extractor runs as an async child process so command handlers never
//! block the event loop. Authenticated extraction is attempted first with
//! cookies from a local browser profile; if that attempt fails for any reason
//! the resolver retries exactly once without cookies.

use serde::Deserialize;
use serenity::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};
use url::Url;

use super::cookies::{CookieProbe, CookieSource};
use super::track_metadata::StreamHandle;
use crate::config::Config;

/// Site-search marker prepended to free-text queries.
pub const SEARCH_PREFIX: &str = "ytsearch:";

const VIDEO_HOSTS: [&str; 5] = [
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
    "youtu.be",
];

/// Errors that can occur while extracting a stream.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Failed to run yt-dlp: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("yt-dlp failed: {0}")]
    Failed(String),

    #[error("No results found")]
    NoMatch,

    #[error("Unable to parse yt-dlp output: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("yt-dlp returned no stream URL")]
    MissingStreamUrl,
}

/// Extraction flags. Immutable: variants are derived with the `with_*`
/// methods, so one value can be shared by every guild.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverOptions {
    pub format: String,
    pub force_ipv4: bool,
    pub source_address: Option<String>,
    pub geo_bypass_country: Option<String>,
    pub check_certificates: bool,
    /// Per-extractor arguments, e.g. `youtube:player_skip=webpage,configs`.
    pub extractor_args: Vec<String>,
    pub user_agent: Option<String>,
    pub socket_timeout: Option<Duration>,
    pub cookies: Option<CookieSource>,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            format: "bestaudio/best".to_string(),
            force_ipv4: true,
            source_address: Some("0.0.0.0".to_string()),
            geo_bypass_country: Some("US".to_string()),
            check_certificates: false,
            extractor_args: vec!["youtube:player_skip=webpage,configs;skip=dash,hls".to_string()],
            user_agent: Some(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
                    .to_string(),
            ),
            socket_timeout: Some(Duration::from_secs(15)),
            cookies: None,
        }
    }
}

impl ResolverOptions {
    pub fn with_cookies(&self, cookies: CookieSource) -> Self {
        Self {
            cookies: Some(cookies),
            ..self.clone()
        }
    }

    pub fn without_cookies(&self) -> Self {
        Self {
            cookies: None,
            ..self.clone()
        }
    }

    /// Command-line arguments for `yt-dlp`, excluding the target.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "--dump-json".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--quiet".to_string(),
            "--no-cache-dir".to_string(),
            "-f".to_string(),
            self.format.clone(),
        ];

        if self.force_ipv4 {
            args.push("--force-ipv4".to_string());
        }
        if let Some(address) = &self.source_address {
            args.extend(["--source-address".to_string(), address.clone()]);
        }
        if let Some(country) = &self.geo_bypass_country {
            args.extend(["--geo-bypass-country".to_string(), country.clone()]);
        }
        if !self.check_certificates {
            args.push("--no-check-certificates".to_string());
        }
        for extractor_arg in &self.extractor_args {
            args.extend(["--extractor-args".to_string(), extractor_arg.clone()]);
        }
        if let Some(user_agent) = &self.user_agent {
            args.extend(["--user-agent".to_string(), user_agent.clone()]);
        }
        if let Some(timeout) = self.socket_timeout {
            args.extend([
                "--socket-timeout".to_string(),
                timeout.as_secs().to_string(),
            ]);
        }
        if let Some(cookies) = &self.cookies {
            args.extend(["--cookies-from-browser".to_string(), cookies.to_arg()]);
        }

        args
    }
}

/// The extraction library seam.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extracts the stream for `target`, a URL or a `ytsearch:` query.
    async fn extract(
        &self,
        target: &str,
        options: &ResolverOptions,
    ) -> Result<StreamHandle, ExtractError>;
}

/// `Extractor` backed by the `yt-dlp` command-line tool.
pub struct YtDlp {
    program: PathBuf,
}

impl YtDlp {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl Extractor for YtDlp {
    async fn extract(
        &self,
        target: &str,
        options: &ResolverOptions,
    ) -> Result<StreamHandle, ExtractError> {
        let args = options.to_args();
        debug!("Running {} {:?} {}", self.program.display(), args, target);

        let output = Command::new(&self.program)
            .args(&args)
            .arg("--")
            .arg(target)
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractError::Failed(stderr.trim().to_string()));
        }

        parse_extraction_output(&String::from_utf8_lossy(&output.stdout))
    }
}

/// The subset of `yt-dlp --dump-json` output the bot uses.
#[derive(Debug, Deserialize)]
struct YtDlpInfo {
    url: Option<String>,
    title: Option<String>,
    duration: Option<f64>,
    thumbnail: Option<String>,
    webpage_url: Option<String>,
    #[serde(default)]
    http_headers: HashMap<String, String>,
    entries: Option<Vec<YtDlpInfo>>,
}

/// Parses `yt-dlp` JSON output into a stream. Output may be one JSON object
/// per line (one per search result) or a single object with `entries`; in
/// both cases the first entry wins.
pub fn parse_extraction_output(stdout: &str) -> Result<StreamHandle, ExtractError> {
    let Some(line) = stdout.lines().map(str::trim).find(|l| !l.is_empty()) else {
        return Err(ExtractError::NoMatch);
    };

    let mut info: YtDlpInfo = serde_json::from_str(line)?;

    if let Some(entries) = info.entries.take() {
        info = entries.into_iter().next().ok_or(ExtractError::NoMatch)?;
    }

    let stream_url = info.url.ok_or(ExtractError::MissingStreamUrl)?;

    Ok(StreamHandle {
        stream_url,
        title: info.title.unwrap_or_else(|| "Unknown Title".to_string()),
        duration: info
            .duration
            .filter(|d| d.is_finite() && *d >= 0.0)
            .map(Duration::from_secs_f64),
        thumbnail: info.thumbnail,
        webpage_url: info.webpage_url,
        http_headers: info.http_headers,
    })
}

/// Parses `query` as a link to a supported video host. Links typed without a
/// scheme are read as https.
fn video_host_url(query: &str) -> Option<Url> {
    let query = query.trim();
    let url = match Url::parse(query) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase)
            if !query.is_empty() && !query.contains(char::is_whitespace) =>
        {
            Url::parse(&format!("https://{}", query)).ok()?
        }
        Err(_) => return None,
    };

    let host = url.host_str()?.to_ascii_lowercase();
    (matches!(url.scheme(), "http" | "https") && VIDEO_HOSTS.contains(&host.as_str()))
        .then_some(url)
}

/// Turns a user query into the extractor target, prefixing free text with the
/// site-search marker.
pub fn extraction_target(query: &str) -> String {
    let query = query.trim();
    match video_host_url(query) {
        Some(_) if query.contains("://") => query.to_string(),
        Some(url) => url.to_string(),
        None => format!("{}{}", SEARCH_PREFIX, query),
    }
}

/// Resolves queries to streams with the cookie-then-anonymous strategy.
#[derive(Clone)]
pub struct Resolver {
    extractor: Arc<dyn Extractor>,
    cookie_probe: CookieProbe,
    options: ResolverOptions,
}

impl Resolver {
    pub fn new(
        extractor: Arc<dyn Extractor>,
        cookie_probe: CookieProbe,
        options: ResolverOptions,
    ) -> Self {
        Self {
            extractor,
            cookie_probe,
            options,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let cookie_probe = if config.use_browser_cookies {
            CookieProbe::system()
        } else {
            CookieProbe::disabled()
        };

        Self::new(
            Arc::new(YtDlp::new(config.ytdlp_path.clone())),
            cookie_probe,
            ResolverOptions::default(),
        )
    }

    /// Resolves a query to a stream.
    pub async fn resolve(&self, query: &str) -> Result<StreamHandle, ExtractError> {
        let target = extraction_target(query);
        info!("Resolving {}", target);

        let Some(cookies) = self.cookie_probe.find() else {
            return self.extractor.extract(&target, &self.options).await;
        };

        info!("Using {} cookies from {}", cookies.browser, cookies.profile.display());
        let authenticated = self.options.with_cookies(cookies);

        match self.extractor.extract(&target, &authenticated).await {
            Ok(stream) => Ok(stream),
            Err(err) => {
                warn!("Extraction with cookies failed ({}), retrying without cookies", err);
                self.extractor
                    .extract(&target, &self.options.without_cookies())
                    .await
            }
        }
    }
}
