//! End-to-end flows through the public API, with the extractor, the voice
//! stream and the Spotify service replaced by mocks.

pub mod playback;
pub mod resolution;
pub mod spotify_metadata;
