//! nagham: a Discord voice bot that resolves links and search terms to audio
//! streams and plays them in a guild's voice channel.

use std::sync::Arc;

pub mod commands;
pub mod config;
pub mod events;

use commands::music::audio_sources::spotify::SpotifyClient;
use commands::music::audio_sources::transcoder::Transcoder;
use commands::music::audio_sources::youtube::Resolver;
use commands::music::utils::session::SessionRegistry;
use config::Config;
use songbird::tracks::TrackHandle;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
pub type CommandResult = Result<(), Error>;

/// Shared state handed to every command invocation.
pub struct Data {
    pub config: Config,
    pub resolver: Resolver,
    pub transcoder: Transcoder,
    /// `None` when no Spotify credentials were configured.
    pub spotify: Option<SpotifyClient>,
    pub sessions: Arc<SessionRegistry<TrackHandle>>,
}

impl Data {
    pub fn new(config: Config) -> Self {
        let resolver = Resolver::from_config(&config);
        let transcoder = Transcoder::new(config.ffmpeg_path.clone());
        let spotify = config.spotify.clone().map(SpotifyClient::new);

        Self {
            config,
            resolver,
            transcoder,
            spotify,
            sessions: Arc::new(SessionRegistry::new()),
        }
    }
}
