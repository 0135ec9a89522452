use super::*;
use crate::commands::music::utils::embedded_messages::{self, PAUSED};
use tracing::info;

/// إيقاف مؤقت
#[poise::command(prefix_command, slash_command, category = "Music")]
pub async fn pause(ctx: Context<'_>) -> CommandResult {
    let guild_id = require_guild(ctx)?;

    let reply = match ctx.data().sessions.pause(guild_id) {
        Ok(track) => {
            info!("Paused {} in guild {}", track.title, guild_id);
            PAUSED.to_string()
        }
        Err(MusicError::NotConnected) => embedded_messages::error_message(&MusicError::NothingPlaying),
        Err(err) => embedded_messages::error_message(&err),
    };

    ctx.send(embedded_messages::text(reply)).await?;
    Ok(())
}
