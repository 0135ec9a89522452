use poise::serenity_prelude as serenity;
use serenity::client::Context;
use serenity::model::id::{ChannelId, GuildId, UserId};
use serenity::prelude::Mutex as SerenityMutex;
use songbird::error::ControlError;
use songbird::{Call, Event, Songbird, TrackEvent};
use std::sync::Arc;
use thiserror::Error;

use crate::Data;
use crate::commands::music::audio_sources::QueryKind;
use crate::commands::music::audio_sources::spotify::{SpotifyClient, SpotifyError, SpotifyLookup};
use crate::commands::music::audio_sources::track_metadata::{
    NowPlaying, StreamHandle, TrackMetadata,
};
use crate::commands::music::audio_sources::transcoder::TranscoderError;
use crate::commands::music::audio_sources::youtube::{ExtractError, Resolver};

use super::event_handlers::TrackEndNotifier;

use tracing::{error, info};

/// Errors that can occur during music operations
#[derive(Error, Debug)]
pub enum MusicError {
    #[error("Not in a guild")]
    NotInGuild,

    #[error("User is not in a voice channel")]
    UserNotInVoiceChannel,

    #[error("Not connected to a voice channel")]
    NotConnected,

    #[error("Failed to get voice manager")]
    NoVoiceManager,

    #[error("Failed to join voice channel: {0}")]
    JoinError(String),

    #[error("Nothing is playing")]
    NothingPlaying,

    #[error("Nothing is paused")]
    NothingPaused,

    #[error("Spotify credentials are not configured")]
    MetadataUnavailable,

    #[error("Could not resolve audio: {0}")]
    Resolve(#[from] ExtractError),

    #[error("Spotify lookup failed: {0}")]
    Metadata(#[from] SpotifyError),

    #[error("Audio pipeline error: {0}")]
    Transcoder(#[from] TranscoderError),

    #[error("Track control error: {0}")]
    Track(#[from] ControlError),
}

/// Result type for music operations
pub type MusicResult<T> = Result<T, MusicError>;

/// Where the track about to be played was described.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackOrigin {
    /// A video link or free-text search.
    Direct,
    /// A single Spotify track.
    Spotify(TrackMetadata),
    /// The first track of a Spotify playlist or album.
    SpotifyCollection {
        track: TrackMetadata,
        name: String,
        total: usize,
    },
}

/// What to resolve for a `play` query, and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayPlan {
    /// Text handed to the resolver.
    pub query: String,
    pub origin: TrackOrigin,
}

impl PlayPlan {
    pub fn metadata(&self) -> Option<&TrackMetadata> {
        match &self.origin {
            TrackOrigin::Direct => None,
            TrackOrigin::Spotify(track) => Some(track),
            TrackOrigin::SpotifyCollection { track, .. } => Some(track),
        }
    }
}

/// Whether a guild's call is missing or no longer attached to a channel.
fn needs_join(current_channel: Option<songbird::id::ChannelId>) -> bool {
    current_channel.is_none()
}

/// Voice connection helpers and the play pipeline.
pub struct MusicManager;

impl MusicManager {
    /// Get the Songbird voice client from the context
    pub async fn get_songbird(ctx: &Context) -> MusicResult<Arc<Songbird>> {
        songbird::get(ctx).await.ok_or(MusicError::NoVoiceManager)
    }

    /// Get the current voice channel call handle
    pub async fn get_call(
        ctx: &Context,
        guild_id: GuildId,
    ) -> MusicResult<Arc<SerenityMutex<Call>>> {
        let songbird = Self::get_songbird(ctx).await?;
        songbird.get(guild_id).ok_or(MusicError::NotConnected)
    }

    /// Join a voice channel
    pub async fn join_channel(
        ctx: &Context,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> MusicResult<Arc<SerenityMutex<Call>>> {
        let songbird = Self::get_songbird(ctx).await?;

        songbird.join(guild_id, channel_id).await.map_err(|e| {
            error!(
                "Failed to join voice channel {} for guild {}: {}",
                channel_id, guild_id, e
            );
            MusicError::JoinError(e.to_string())
        })
    }

    /// Leave a voice channel
    pub async fn leave_channel(ctx: &Context, guild_id: GuildId) -> MusicResult<()> {
        let songbird = Self::get_songbird(ctx).await?;
        let call = songbird.get(guild_id).ok_or(MusicError::NotConnected)?;
        let channel = call.lock().await.current_channel();

        songbird
            .remove(guild_id)
            .await
            .map_err(|e| MusicError::JoinError(e.to_string()))?;

        // A call left behind after a kick has no channel.
        if needs_join(channel) {
            return Err(MusicError::NotConnected);
        }
        Ok(())
    }

    /// Get the voice channel ID that the user is currently in
    pub fn get_user_voice_channel(
        ctx: &Context,
        guild_id: GuildId,
        user_id: UserId,
    ) -> MusicResult<ChannelId> {
        let guild = ctx.cache.guild(guild_id).ok_or(MusicError::NotInGuild)?;

        guild
            .voice_states
            .get(&user_id)
            .and_then(|voice_state| voice_state.channel_id)
            .ok_or(MusicError::UserNotInVoiceChannel)
    }

    /// Joins the caller's voice channel unless the bot is already connected,
    /// and makes sure the guild has a playback session.
    pub async fn ensure_connected(
        ctx: &Context,
        data: &Data,
        guild_id: GuildId,
        user_id: UserId,
    ) -> MusicResult<()> {
        let channel_id = Self::get_user_voice_channel(ctx, guild_id, user_id)?;
        let songbird = Self::get_songbird(ctx).await?;

        let current = match songbird.get(guild_id) {
            Some(call) => call.lock().await.current_channel(),
            None => None,
        };
        if needs_join(current) {
            Self::join_channel(ctx, guild_id, channel_id).await?;
            info!("Joined voice channel {} in guild {}", channel_id, guild_id);
        }

        data.sessions.connect(guild_id);
        Ok(())
    }

    /// Turns a `play` query into something the resolver can search for.
    ///
    /// Spotify links are looked up first; the resolver then searches for the
    /// track by artist and title. A playlist or album yields its first track.
    pub async fn plan(spotify: Option<&SpotifyClient>, query: &str) -> MusicResult<PlayPlan> {
        match QueryKind::classify(query) {
            QueryKind::Direct => Ok(PlayPlan {
                query: query.to_string(),
                origin: TrackOrigin::Direct,
            }),
            QueryKind::InvalidSpotify => {
                Err(SpotifyError::InvalidUrl(query.to_string()).into())
            }
            QueryKind::Spotify(_) => {
                let client = spotify.ok_or(MusicError::MetadataUnavailable)?;
                match client.lookup(query).await? {
                    SpotifyLookup::Track(track) => Ok(PlayPlan {
                        query: track.search_query(),
                        origin: TrackOrigin::Spotify(track),
                    }),
                    SpotifyLookup::Collection(collection) => {
                        let total = collection.track_count();
                        let track = collection
                            .tracks
                            .into_iter()
                            .next()
                            .ok_or(SpotifyError::Empty)?;
                        Ok(PlayPlan {
                            query: track.search_query(),
                            origin: TrackOrigin::SpotifyCollection {
                                track,
                                name: collection.name,
                                total,
                            },
                        })
                    }
                }
            }
        }
    }

    pub async fn resolve(resolver: &Resolver, plan: &PlayPlan) -> MusicResult<StreamHandle> {
        Ok(resolver.resolve(&plan.query).await?)
    }

    /// Starts `stream` in the guild's call, replacing whatever was playing.
    pub async fn start_stream(
        ctx: &Context,
        data: &Data,
        guild_id: GuildId,
        stream: &StreamHandle,
    ) -> MusicResult<u64> {
        let call = Self::get_call(ctx, guild_id).await?;
        let mut handler = call.lock().await;
        let sessions = Arc::clone(&data.sessions);

        data.sessions
            .play(guild_id, NowPlaying::from(stream), |generation| {
                let input = data.transcoder.spawn(stream)?;
                let handle = handler.play_only_input(input);

                let notifier = TrackEndNotifier::new(guild_id, generation, sessions);
                handle.add_event(Event::Track(TrackEvent::End), notifier.clone())?;
                handle.add_event(Event::Track(TrackEvent::Error), notifier)?;

                Ok(handle)
            })
    }
}
