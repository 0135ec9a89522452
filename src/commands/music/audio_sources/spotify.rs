//! Spotify Web API client used to turn track, playlist and album links into
//! searchable metadata. Handles the client-credentials flow, URL validation
//! and page iteration. Metadata is fetched fresh on every call; only the
//! access token is reused.

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use regex::Regex;
use reqwest::{StatusCode, header};
use serde::Deserialize;
use serde_json::Value;
use std::sync::LazyLock;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};
use url::Url;

use super::track_metadata::{PlaylistMetadata, TrackMetadata};
use crate::config::SpotifyCredentials;

const API_BASE: &str = "https://api.spotify.com/v1";
const ACCOUNTS_BASE: &str = "https://accounts.spotify.com/api";
/// Page sizes are capped per endpoint: playlist items allow 100, album tracks 50.
const PLAYLIST_PAGE_LIMIT: &str = "100";
const ALBUM_PAGE_LIMIT: &str = "50";

/// Result type specific to Spotify API operations.
pub type SpotifyResult<T> = Result<T, SpotifyError>;

/// Errors that can occur while talking to the Spotify API.
#[derive(Error, Debug)]
pub enum SpotifyError {
    #[error("Invalid Spotify URL: {0}")]
    InvalidUrl(String),

    #[error("API communication failure: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Spotify API error: {status} - {body}")]
    Status { status: StatusCode, body: String },

    #[error("Not found on Spotify")]
    NotFound,

    #[error("Unable to parse response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No playable tracks")]
    Empty,
}

/// Response from Spotify's token endpoint.
#[derive(Debug, Deserialize)]
struct SpotifyToken {
    access_token: String,
    expires_in: u64,
    #[serde(skip, default = "Instant::now")]
    created_at: Instant,
}

impl SpotifyToken {
    /// Considered expired 30 seconds before the real expiry.
    fn is_expired(&self) -> bool {
        let expiry = Duration::from_secs(self.expires_in);
        self.created_at.elapsed() > expiry.saturating_sub(Duration::from_secs(30))
    }
}

static SPOTIFY_TRACK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://open\.spotify\.com/(?:intl-[a-zA-Z-]+/)?track/([a-zA-Z0-9]+)(?:[/?#].*)?$")
        .unwrap()
});

static SPOTIFY_PLAYLIST_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://open\.spotify\.com/(?:intl-[a-zA-Z-]+/)?playlist/([a-zA-Z0-9]+)(?:[/?#].*)?$",
    )
    .unwrap()
});

static SPOTIFY_ALBUM_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://open\.spotify\.com/(?:intl-[a-zA-Z-]+/)?album/([a-zA-Z0-9]+)(?:[/?#].*)?$")
        .unwrap()
});

/// A validated Spotify link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpotifyLink {
    Track(String),
    Playlist(String),
    Album(String),
}

impl SpotifyLink {
    /// Checks whether the URL points at Spotify at all, valid shape or not.
    pub fn is_spotify_url(url: &str) -> bool {
        Url::parse(url.trim())
            .ok()
            .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
            .is_some_and(|host| host == "open.spotify.com")
    }

    /// Matches the URL against the track, playlist and album patterns.
    pub fn parse(url: &str) -> Option<Self> {
        let url = url.trim();
        let capture = |regex: &Regex| {
            regex
                .captures(url)
                .and_then(|cap| cap.get(1))
                .map(|m| m.as_str().to_string())
        };

        capture(&SPOTIFY_TRACK_REGEX)
            .map(SpotifyLink::Track)
            .or_else(|| capture(&SPOTIFY_PLAYLIST_REGEX).map(SpotifyLink::Playlist))
            .or_else(|| capture(&SPOTIFY_ALBUM_REGEX).map(SpotifyLink::Album))
    }
}

/// What a Spotify link resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum SpotifyLookup {
    Track(TrackMetadata),
    Collection(PlaylistMetadata),
}

/// Spotify Web API client.
pub struct SpotifyClient {
    http: reqwest::Client,
    credentials: SpotifyCredentials,
    api_base: String,
    accounts_base: String,
    token: Mutex<Option<SpotifyToken>>,
}

impl SpotifyClient {
    pub fn new(credentials: SpotifyCredentials) -> Self {
        Self::with_endpoints(credentials, API_BASE, ACCOUNTS_BASE)
    }

    /// Client talking to custom API and accounts endpoints.
    pub fn with_endpoints(
        credentials: SpotifyCredentials,
        api_base: impl Into<String>,
        accounts_base: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            credentials,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            accounts_base: accounts_base.into().trim_end_matches('/').to_string(),
            token: Mutex::new(None),
        }
    }

    /// Dispatches on the link kind.
    pub async fn lookup(&self, url: &str) -> SpotifyResult<SpotifyLookup> {
        match Self::link(url)? {
            SpotifyLink::Track(id) => self.fetch_track(&id).await.map(SpotifyLookup::Track),
            SpotifyLink::Playlist(id) => {
                self.fetch_playlist(&id).await.map(SpotifyLookup::Collection)
            }
            SpotifyLink::Album(id) => self.fetch_album(&id).await.map(SpotifyLookup::Collection),
        }
    }

    /// Fetches a single track. Fails before any request if `url` is not a track link.
    pub async fn track(&self, url: &str) -> SpotifyResult<TrackMetadata> {
        match Self::link(url)? {
            SpotifyLink::Track(id) => self.fetch_track(&id).await,
            _ => Err(SpotifyError::InvalidUrl(url.to_string())),
        }
    }

    /// Fetches a playlist and every one of its tracks.
    pub async fn playlist(&self, url: &str) -> SpotifyResult<PlaylistMetadata> {
        match Self::link(url)? {
            SpotifyLink::Playlist(id) => self.fetch_playlist(&id).await,
            _ => Err(SpotifyError::InvalidUrl(url.to_string())),
        }
    }

    /// Fetches an album and every one of its tracks.
    pub async fn album(&self, url: &str) -> SpotifyResult<PlaylistMetadata> {
        match Self::link(url)? {
            SpotifyLink::Album(id) => self.fetch_album(&id).await,
            _ => Err(SpotifyError::InvalidUrl(url.to_string())),
        }
    }

    fn link(url: &str) -> SpotifyResult<SpotifyLink> {
        SpotifyLink::parse(url).ok_or_else(|| SpotifyError::InvalidUrl(url.to_string()))
    }

    async fn fetch_track(&self, id: &str) -> SpotifyResult<TrackMetadata> {
        info!("Fetching Spotify track {}", id);
        let url = format!("{}/tracks/{}", self.api_base, id);
        let data = self.get_json(&url, &[]).await?;

        parse_track(&data, None).ok_or(SpotifyError::NotFound)
    }

    async fn fetch_playlist(&self, id: &str) -> SpotifyResult<PlaylistMetadata> {
        info!("Fetching Spotify playlist {}", id);
        let details_url = format!("{}/playlists/{}", self.api_base, id);
        let details = self.get_json(&details_url, &[("fields", "name")]).await?;
        let name = details["name"].as_str().unwrap_or("Spotify").to_string();

        let first_page = format!("{}/playlists/{}/tracks", self.api_base, id);
        let tracks = self
            .collect_pages(first_page, PLAYLIST_PAGE_LIMIT, |item| {
                parse_track(&item["track"], None)
            })
            .await?;

        info!("Found {} tracks in playlist {}", tracks.len(), name);
        Ok(PlaylistMetadata { name, tracks })
    }

    async fn fetch_album(&self, id: &str) -> SpotifyResult<PlaylistMetadata> {
        info!("Fetching Spotify album {}", id);
        let details_url = format!("{}/albums/{}", self.api_base, id);
        let details = self.get_json(&details_url, &[]).await?;
        let name = details["name"].as_str().unwrap_or("Spotify").to_string();
        let artwork = first_image(&details["images"]);

        // Album track objects are simplified: no album or images of their own.
        let album = AlbumContext {
            name: &name,
            artwork: artwork.as_deref(),
        };
        let first_page = format!("{}/albums/{}/tracks", self.api_base, id);
        let tracks = self
            .collect_pages(first_page, ALBUM_PAGE_LIMIT, |item| {
                parse_track(item, Some(&album))
            })
            .await?;

        info!("Found {} tracks in album {}", tracks.len(), name);
        Ok(PlaylistMetadata { name, tracks })
    }

    /// Follows `next` links until the service reports no further page.
    async fn collect_pages<F>(
        &self,
        first_page: String,
        limit: &str,
        parse: F,
    ) -> SpotifyResult<Vec<TrackMetadata>>
    where
        F: Fn(&Value) -> Option<TrackMetadata>,
    {
        let mut tracks = Vec::new();
        let mut page = self.get_json(&first_page, &[("limit", limit)]).await?;

        loop {
            if let Some(items) = page["items"].as_array() {
                tracks.extend(items.iter().filter_map(&parse));
            }

            match page["next"].as_str() {
                Some(next) => {
                    debug!("Fetching next page {}", next);
                    page = self.get_json(next, &[]).await?;
                }
                None => break,
            }
        }

        if tracks.is_empty() {
            return Err(SpotifyError::Empty);
        }
        Ok(tracks)
    }

    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> SpotifyResult<Value> {
        let token = self.access_token().await?;

        let response = self
            .http
            .get(url)
            .query(query)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(SpotifyError::NotFound);
        }
        if !status.is_success() {
            return Err(SpotifyError::Status { status, body });
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Returns the cached token, requesting a new one when missing or expired.
    async fn access_token(&self) -> SpotifyResult<String> {
        let mut token_lock = self.token.lock().await;

        if let Some(token) = &*token_lock {
            if !token.is_expired() {
                return Ok(token.access_token.clone());
            }
        }

        debug!("Requesting a new Spotify access token");
        let auth = BASE64_STANDARD.encode(format!(
            "{}:{}",
            self.credentials.client_id, self.credentials.client_secret
        ));

        let response = self
            .http
            .post(format!("{}/token", self.accounts_base))
            .header(header::AUTHORIZATION, format!("Basic {}", auth))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SpotifyError::Status { status, body });
        }

        let token: SpotifyToken = serde_json::from_str(&body)?;
        let access_token = token.access_token.clone();
        *token_lock = Some(token);

        Ok(access_token)
    }
}

/// Album fields inherited by the simplified track objects of an album page.
struct AlbumContext<'a> {
    name: &'a str,
    artwork: Option<&'a str>,
}

fn first_image(images: &Value) -> Option<String> {
    images
        .as_array()
        .and_then(|imgs| imgs.first())
        .and_then(|img| img["url"].as_str())
        .map(|s| s.to_string())
}

/// Converts a Spotify track object. Returns `None` for entries without an ID
/// (local files, removed tracks) or without a name.
fn parse_track(track: &Value, album: Option<&AlbumContext<'_>>) -> Option<TrackMetadata> {
    let id = track["id"].as_str()?;
    let title = track["name"].as_str()?.to_string();

    let artists = track["artists"]
        .as_array()
        .map(|arr| {
            arr.iter()
                .filter_map(|a| a["name"].as_str().map(|s| s.to_string()))
                .collect()
        })
        .unwrap_or_default();

    let (album_name, artwork_url) = match album {
        Some(ctx) => (Some(ctx.name.to_string()), ctx.artwork.map(str::to_string)),
        None => (
            track["album"]["name"].as_str().map(|s| s.to_string()),
            first_image(&track["album"]["images"]),
        ),
    };

    let source_url = track["external_urls"]["spotify"]
        .as_str()
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("https://open.spotify.com/track/{}", id));

    Some(TrackMetadata {
        title,
        artists,
        album: album_name,
        duration: track["duration_ms"].as_u64().map(Duration::from_millis),
        artwork_url,
        source_url: Some(source_url),
    })
}
