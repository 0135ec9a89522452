use std::sync::Arc;

use poise::serenity_prelude as serenity;
use serenity::async_trait;
use songbird::tracks::{PlayMode, TrackHandle};
use tracing::{error, info};

use super::session::{SessionRegistry, TrackControl};

/// Marks the guild idle when the stream it was attached to ends or fails.
pub struct TrackEndNotifier<H = TrackHandle> {
    guild_id: serenity::GuildId,
    generation: u64,
    sessions: Arc<SessionRegistry<H>>,
}

impl<H> Clone for TrackEndNotifier<H> {
    fn clone(&self) -> Self {
        Self {
            guild_id: self.guild_id,
            generation: self.generation,
            sessions: Arc::clone(&self.sessions),
        }
    }
}

impl<H: TrackControl> TrackEndNotifier<H> {
    pub fn new(
        guild_id: serenity::GuildId,
        generation: u64,
        sessions: Arc<SessionRegistry<H>>,
    ) -> Self {
        Self {
            guild_id,
            generation,
            sessions,
        }
    }

    /// Returns `true` if the session was still on this stream.
    pub fn handle_track_end(&self) -> bool {
        let finished = self.sessions.finish(self.guild_id, self.generation);
        if finished {
            info!("Track ended for guild {}", self.guild_id);
        }
        finished
    }
}

#[async_trait]
impl<H: TrackControl> songbird::EventHandler for TrackEndNotifier<H> {
    async fn act(&self, ctx: &songbird::EventContext<'_>) -> Option<songbird::Event> {
        if let songbird::EventContext::Track(tracks) = ctx {
            for (state, _) in tracks.iter() {
                if let PlayMode::Errored(e) = &state.playing {
                    error!("Playback failed in guild {}: {:?}", self.guild_id, e);
                }
            }
            self.handle_track_end();
        }
        None
    }
}
