use super::*;
use crate::commands::music::utils::{
    embedded_messages::{self, SEARCHING},
    music_manager::{MusicManager, MusicResult},
};
use poise::serenity_prelude::CreateEmbed;
use poise::{CreateReply, ReplyHandle};
use tracing::{debug, error, info, warn};

/// تشغيل مقطع صوتي (رابط يوتيوب/سبوتيفاي أو بحث)
#[poise::command(prefix_command, slash_command, category = "Music")]
pub async fn play(
    ctx: Context<'_>,
    #[rest]
    #[description = "رابط أو كلمات البحث"]
    query: String,
) -> CommandResult {
    info!("Received play command with query: {}", query);
    let guild_id = require_guild(ctx)?;

    if let Err(err) = MusicManager::ensure_connected(
        ctx.serenity_context(),
        ctx.data(),
        guild_id,
        ctx.author().id,
    )
    .await
    {
        ctx.send(embedded_messages::text(embedded_messages::error_message(&err)))
            .await?;
        return Ok(());
    }

    if let Some(previous) = ctx.data().sessions.stop(guild_id)? {
        info!("Stopped {} before handling new query", previous.title);
    }

    ctx.defer_or_broadcast().await?;
    let status = ctx.send(embedded_messages::text(SEARCHING)).await?;

    match play_query(ctx, guild_id, &query, &status).await {
        Ok(embed) => {
            status
                .edit(ctx, CreateReply::default().content("").embed(embed))
                .await?;
        }
        Err(err) => {
            error!("Failed to play {}: {}", query, err);
            status
                .edit(
                    ctx,
                    embedded_messages::text(embedded_messages::play_error(&query, &err)),
                )
                .await?;
        }
    }

    Ok(())
}

async fn play_query(
    ctx: Context<'_>,
    guild_id: GuildId,
    query: &str,
    status: &ReplyHandle<'_>,
) -> MusicResult<CreateEmbed> {
    let data = ctx.data();
    let plan = MusicManager::plan(data.spotify.as_ref(), query).await?;

    if let Some(found) = embedded_messages::found(&plan) {
        if let Err(e) = status.edit(ctx, embedded_messages::text(found)).await {
            warn!("Failed to update status message: {}", e);
        }
    }

    let stream = MusicManager::resolve(&data.resolver, &plan).await?;
    MusicManager::start_stream(ctx.serenity_context(), data, guild_id, &stream).await?;
    if let Some(session) = data.sessions.snapshot(guild_id) {
        debug!(
            "Guild {} is {:?} at generation {}",
            guild_id, session.state, session.generation
        );
    }

    Ok(embedded_messages::now_playing(&plan, &stream))
}
