use super::*;
use crate::commands::music::utils::{
    embedded_messages::{self, LEFT},
    music_manager::MusicManager,
};
use tracing::{error, info};

/// مغادرة القناة الصوتية
#[poise::command(prefix_command, slash_command, category = "Music")]
pub async fn leave(ctx: Context<'_>) -> CommandResult {
    let guild_id = require_guild(ctx)?;

    if let Some(track) = ctx.data().sessions.disconnect(guild_id) {
        info!("Stopped {} on leave", track.title);
    }

    let reply = match MusicManager::leave_channel(ctx.serenity_context(), guild_id).await {
        Ok(()) => {
            info!("Left voice channel in guild {}", guild_id);
            LEFT.to_string()
        }
        Err(err) => {
            if !matches!(err, MusicError::NotConnected) {
                error!("Failed to leave voice channel in guild {}: {}", guild_id, err);
            }
            embedded_messages::error_message(&err)
        }
    };

    ctx.send(embedded_messages::text(reply)).await?;
    Ok(())
}
