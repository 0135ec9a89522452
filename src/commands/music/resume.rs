use super::*;
use crate::commands::music::utils::embedded_messages::{self, RESUMED};
use tracing::info;

/// استئناف التشغيل
#[poise::command(prefix_command, slash_command, category = "Music")]
pub async fn resume(ctx: Context<'_>) -> CommandResult {
    let guild_id = require_guild(ctx)?;

    let reply = match ctx.data().sessions.resume(guild_id) {
        Ok(track) => {
            info!("Resumed {} in guild {}", track.title, guild_id);
            RESUMED.to_string()
        }
        Err(MusicError::NotConnected) => embedded_messages::error_message(&MusicError::NothingPaused),
        Err(err) => embedded_messages::error_message(&err),
    };

    ctx.send(embedded_messages::text(reply)).await?;
    Ok(())
}
