//! Per-guild playback sessions.
//!
//! Each connected guild owns exactly one [`PlaybackSession`]. A session moves
//! between `Idle`, `Playing` and `Paused` only through the registry's
//! operations; starting a new stream always stops the previous one first, so
//! at most one live stream exists per guild.

use dashmap::DashMap;
use poise::serenity_prelude::GuildId;
use songbird::error::ControlError;
use songbird::tracks::TrackHandle;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

use super::music_manager::{MusicError, MusicResult};
use crate::commands::music::audio_sources::track_metadata::NowPlaying;

/// Control surface of a live stream.
#[cfg_attr(test, mockall::automock)]
pub trait TrackControl: Send + Sync + 'static {
    fn pause(&self) -> Result<(), ControlError>;
    fn resume(&self) -> Result<(), ControlError>;
    fn stop(&self) -> Result<(), ControlError>;
}

impl TrackControl for TrackHandle {
    fn pause(&self) -> Result<(), ControlError> {
        TrackHandle::pause(self)
    }

    fn resume(&self) -> Result<(), ControlError> {
        TrackHandle::play(self)
    }

    fn stop(&self) -> Result<(), ControlError> {
        TrackHandle::stop(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
    Paused,
}

/// Playback state of one voice connection.
pub struct PlaybackSession<H> {
    state: PlaybackState,
    current: Option<NowPlaying>,
    handle: Option<H>,
    generation: u64,
}

impl<H: TrackControl> PlaybackSession<H> {
    fn new() -> Self {
        Self {
            state: PlaybackState::Idle,
            current: None,
            handle: None,
            generation: 0,
        }
    }

    /// Stops the live stream, if any, and returns to `Idle`.
    fn halt(&mut self) -> Option<NowPlaying> {
        if let Some(handle) = self.handle.take() {
            // A stream that already ended reports an error here; nothing is left to stop.
            if let Err(e) = handle.stop() {
                debug!("Stopping previous stream: {}", e);
            }
        }
        self.state = PlaybackState::Idle;
        self.current.take()
    }
}

/// Read-only view of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub state: PlaybackState,
    pub current: Option<NowPlaying>,
    pub generation: u64,
}

/// All sessions, keyed by guild.
pub struct SessionRegistry<H> {
    sessions: DashMap<GuildId, PlaybackSession<H>>,
    generations: AtomicU64,
}

impl<H: TrackControl> Default for SessionRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: TrackControl> SessionRegistry<H> {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
            generations: AtomicU64::new(0),
        }
    }

    /// Creates an idle session for a freshly connected guild. Returns `false`
    /// if the guild already had one, which is left untouched.
    pub fn connect(&self, guild_id: GuildId) -> bool {
        let mut created = false;
        self.sessions.entry(guild_id).or_insert_with(|| {
            created = true;
            PlaybackSession::new()
        });
        if created {
            info!("Playback session opened for guild {}", guild_id);
        }
        created
    }

    pub fn is_connected(&self, guild_id: GuildId) -> bool {
        self.sessions.contains_key(&guild_id)
    }

    pub fn snapshot(&self, guild_id: GuildId) -> Option<SessionSnapshot> {
        self.sessions.get(&guild_id).map(|session| SessionSnapshot {
            state: session.state,
            current: session.current.clone(),
            generation: session.generation,
        })
    }

    /// Replaces whatever the guild is playing with a new stream.
    ///
    /// The current stream is stopped before `start` runs. `start` receives the
    /// generation assigned to the new stream and returns its handle; if it
    /// fails the session stays `Idle`. Returns the new generation.
    pub fn play<F>(&self, guild_id: GuildId, now_playing: NowPlaying, start: F) -> MusicResult<u64>
    where
        F: FnOnce(u64) -> MusicResult<H>,
    {
        let mut session = self
            .sessions
            .get_mut(&guild_id)
            .ok_or(MusicError::NotConnected)?;

        if let Some(previous) = session.halt() {
            info!("Stopped {} in guild {} to start a new stream", previous.title, guild_id);
        }

        let generation = self.generations.fetch_add(1, Ordering::Relaxed) + 1;
        let handle = start(generation)?;

        info!("Now playing {} in guild {}", now_playing.title, guild_id);
        session.handle = Some(handle);
        session.current = Some(now_playing);
        session.state = PlaybackState::Playing;
        session.generation = generation;

        Ok(generation)
    }

    /// `Playing` → `Paused`.
    pub fn pause(&self, guild_id: GuildId) -> MusicResult<NowPlaying> {
        let mut session = self
            .sessions
            .get_mut(&guild_id)
            .ok_or(MusicError::NotConnected)?;

        if session.state != PlaybackState::Playing {
            return Err(MusicError::NothingPlaying);
        }
        let (Some(handle), Some(current)) = (&session.handle, &session.current) else {
            return Err(MusicError::NothingPlaying);
        };

        handle.pause()?;
        let current = current.clone();
        session.state = PlaybackState::Paused;
        Ok(current)
    }

    /// `Paused` → `Playing`.
    pub fn resume(&self, guild_id: GuildId) -> MusicResult<NowPlaying> {
        let mut session = self
            .sessions
            .get_mut(&guild_id)
            .ok_or(MusicError::NotConnected)?;

        if session.state != PlaybackState::Paused {
            return Err(MusicError::NothingPaused);
        }
        let (Some(handle), Some(current)) = (&session.handle, &session.current) else {
            return Err(MusicError::NothingPaused);
        };

        handle.resume()?;
        let current = current.clone();
        session.state = PlaybackState::Playing;
        Ok(current)
    }

    /// Any state → `Idle`. Returns the track that was stopped, if any.
    pub fn stop(&self, guild_id: GuildId) -> MusicResult<Option<NowPlaying>> {
        let mut session = self
            .sessions
            .get_mut(&guild_id)
            .ok_or(MusicError::NotConnected)?;

        Ok(session.halt())
    }

    /// Marks the session idle after its stream ended on its own. Ignored when
    /// `generation` no longer names the current stream.
    pub fn finish(&self, guild_id: GuildId, generation: u64) -> bool {
        let Some(mut session) = self.sessions.get_mut(&guild_id) else {
            return false;
        };
        if session.generation != generation || session.state == PlaybackState::Idle {
            return false;
        }

        session.handle = None;
        session.current = None;
        session.state = PlaybackState::Idle;
        debug!("Stream {} finished in guild {}", generation, guild_id);
        true
    }

    /// Stops any live stream and destroys the session.
    pub fn disconnect(&self, guild_id: GuildId) -> Option<NowPlaying> {
        let (_, mut session) = self.sessions.remove(&guild_id)?;
        info!("Playback session closed for guild {}", guild_id);
        session.halt()
    }
}
