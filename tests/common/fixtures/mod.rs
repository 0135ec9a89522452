//! Sample extractor output and Spotify API payloads

use serde_json::{Value, json};

/// One line of `yt-dlp --dump-json` output for a search hit.
pub const YTDLP_SEARCH_LINE: &str = r#"{"id":"kVTY0ZFdPzI","title":"Fairuz - Li Beirut","duration":287.0,"thumbnail":"https://i.ytimg.com/vi/kVTY0ZFdPzI/hqdefault.jpg","webpage_url":"https://www.youtube.com/watch?v=kVTY0ZFdPzI","url":"https://rr3---sn.googlevideo.com/videoplayback?itag=251","http_headers":{"User-Agent":"Mozilla/5.0","Accept":"text/html"}}"#;

/// `yt-dlp` output for a search that found nothing.
pub const YTDLP_EMPTY_SEARCH: &str = r#"{"_type":"playlist","id":"nonexistent-garbage-query-xyz","entries":[]}"#;

pub fn spotify_token() -> Value {
    json!({
        "access_token": "token-123",
        "token_type": "Bearer",
        "expires_in": 3600
    })
}

/// A playlist track item as returned by the playlist tracks endpoint.
pub fn playlist_item(id: &str, name: &str, artist: &str) -> Value {
    json!({
        "track": {
            "id": id,
            "name": name,
            "duration_ms": 200000,
            "artists": [{"name": artist}],
            "album": {"name": "Album", "images": [{"url": format!("https://i.scdn.co/image/{}", id)}]},
            "external_urls": {"spotify": format!("https://open.spotify.com/track/{}", id)}
        }
    })
}

/// One page of playlist tracks.
pub fn playlist_page(items: Vec<Value>, next: Option<String>) -> Value {
    json!({
        "items": items,
        "next": next
    })
}
