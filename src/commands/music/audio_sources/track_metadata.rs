//! Descriptive data that flows from the metadata client and resolver into the
//! playback controller and the status messages.

use std::collections::HashMap;
use std::time::Duration;

/// Unified description of a single track from the metadata client.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackMetadata {
    /// The title of the track.
    pub title: String,
    /// Artist names in credit order.
    pub artists: Vec<String>,
    /// Album name, when the service reports one.
    pub album: Option<String>,
    pub duration: Option<Duration>,
    /// URL of the cover art, if available.
    pub artwork_url: Option<String>,
    /// Link back to the track on the service it came from.
    pub source_url: Option<String>,
}

impl TrackMetadata {
    /// Artist names joined for display.
    pub fn artist_line(&self) -> String {
        self.artists.join(", ")
    }

    /// Search string handed to the resolver for this track.
    pub fn search_query(&self) -> String {
        if self.artists.is_empty() {
            format!("{} official audio", self.title)
        } else {
            format!("{} - {} official audio", self.artist_line(), self.title)
        }
    }
}

/// A playlist or album with every track collected across all pages.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlaylistMetadata {
    pub name: String,
    pub tracks: Vec<TrackMetadata>,
}

impl PlaylistMetadata {
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }
}

/// A resolved, directly playable stream.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StreamHandle {
    /// Direct media URL handed to the transcoder.
    pub stream_url: String,
    pub title: String,
    pub duration: Option<Duration>,
    pub thumbnail: Option<String>,
    /// The page the stream was extracted from.
    pub webpage_url: Option<String>,
    /// Headers the media host expects on requests for `stream_url`.
    pub http_headers: HashMap<String, String>,
}

/// What the playback controller records about the stream it is playing.
#[derive(Debug, Clone, PartialEq)]
pub struct NowPlaying {
    pub title: String,
    pub source_url: Option<String>,
    pub duration: Option<Duration>,
}

impl From<&StreamHandle> for NowPlaying {
    fn from(stream: &StreamHandle) -> Self {
        Self {
            title: stream.title.clone(),
            source_url: stream.webpage_url.clone(),
            duration: stream.duration,
        }
    }
}
