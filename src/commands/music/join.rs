use super::*;
use crate::commands::music::utils::{
    embedded_messages::{self, JOINED},
    music_manager::MusicManager,
};

/// الانضمام إلى قناتك الصوتية
#[poise::command(prefix_command, slash_command, category = "Music")]
pub async fn join(ctx: Context<'_>) -> CommandResult {
    let guild_id = require_guild(ctx)?;

    let reply = match MusicManager::ensure_connected(
        ctx.serenity_context(),
        ctx.data(),
        guild_id,
        ctx.author().id,
    )
    .await
    {
        Ok(()) => JOINED.to_string(),
        Err(err) => embedded_messages::error_message(&err),
    };

    ctx.send(embedded_messages::text(reply)).await?;
    Ok(())
}
