//! Everything between a user's query and a playable stream: query
//! classification, the Spotify metadata client, the cookie probe, the
//! `yt-dlp` resolver and the `ffmpeg` transcoder.

/// Browser profile discovery for authenticated extraction.
pub mod cookies;
/// Spotify Web API client for track, playlist and album links.
pub mod spotify;
/// Metadata, playlist and stream types shared by the sources.
pub mod track_metadata;
/// `ffmpeg` child process feeding songbird.
pub mod transcoder;
/// `yt-dlp` extraction and the resolver.
pub mod youtube;

use spotify::SpotifyLink;

/// How a `play` query should be handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryKind {
    /// A well-formed Spotify track, playlist or album link.
    Spotify(SpotifyLink),
    /// A Spotify link that matches none of the known patterns.
    InvalidSpotify,
    /// A video link or free-text search, handed straight to the resolver.
    Direct,
}

impl QueryKind {
    pub fn classify(query: &str) -> Self {
        if !SpotifyLink::is_spotify_url(query) {
            return QueryKind::Direct;
        }
        match SpotifyLink::parse(query) {
            Some(link) => QueryKind::Spotify(link),
            None => QueryKind::InvalidSpotify,
        }
    }
}
