pub mod join;
pub mod leave;
pub mod pause;
pub mod play;
pub mod resume;
pub mod stop;

pub mod audio_sources;
pub mod utils;

use crate::{CommandResult, Context};
use poise::serenity_prelude::GuildId;
use utils::music_manager::MusicError;

/// Every music command needs a guild; fails with [`MusicError::NotInGuild`] in DMs.
fn require_guild(ctx: Context<'_>) -> Result<GuildId, crate::Error> {
    ctx.guild_id()
        .ok_or_else(|| Box::new(MusicError::NotInGuild) as crate::Error)
}
