use super::*;
use crate::commands::music::utils::embedded_messages::{self, STOPPED};
use tracing::info;

/// إيقاف التشغيل
#[poise::command(prefix_command, slash_command, category = "Music")]
pub async fn stop(ctx: Context<'_>) -> CommandResult {
    let guild_id = require_guild(ctx)?;

    let reply = match ctx.data().sessions.stop(guild_id) {
        Ok(stopped) => {
            if let Some(track) = stopped {
                info!("Stopped {} in guild {}", track.title, guild_id);
            }
            STOPPED.to_string()
        }
        Err(MusicError::NotConnected) => embedded_messages::error_message(&MusicError::NothingPlaying),
        Err(err) => embedded_messages::error_message(&err),
    };

    ctx.send(embedded_messages::text(reply)).await?;
    Ok(())
}
