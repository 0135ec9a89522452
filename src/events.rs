use poise::serenity_prelude as serenity;
use serenity::{ChannelId, FullEvent, GuildId, UserId};
use tracing::{debug, info, warn};

use crate::{Data, Error};

/// Gateway events the bot reacts to outside of commands.
pub async fn event_handler(
    ctx: &serenity::Context,
    event: &FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        FullEvent::Ready { data_about_bot } => {
            info!("{} is connected to:", data_about_bot.user.name);
            for guild in &data_about_bot.guilds {
                let name = ctx
                    .cache
                    .guild(guild.id)
                    .map(|g| g.name.clone())
                    .unwrap_or_else(|| guild.id.to_string());
                info!("- {}", name);
            }
        }
        FullEvent::VoiceStateUpdate { new, .. } => {
            let bot_id = ctx.cache.current_user().id;
            if let Some(guild_id) = bot_left_voice(bot_id, new.user_id, new.guild_id, new.channel_id)
            {
                if data.sessions.is_connected(guild_id) {
                    if data.sessions.disconnect(guild_id).is_some() {
                        info!("Dropped active stream after leaving voice in guild {}", guild_id);
                    }
                    debug!("Session removed for guild {}", guild_id);
                }

                if let Some(manager) = songbird::get(ctx).await {
                    if manager.get(guild_id).is_some() {
                        if let Err(e) = manager.remove(guild_id).await {
                            warn!("Failed to drop voice call for guild {}: {}", guild_id, e);
                        }
                    }
                }
            }
        }
        _ => {}
    }
    Ok(())
}

/// The guild whose session should be dropped, if this voice state update
/// means the bot itself is no longer in a channel.
fn bot_left_voice(
    bot_id: UserId,
    user_id: UserId,
    guild_id: Option<GuildId>,
    channel_id: Option<ChannelId>,
) -> Option<GuildId> {
    if user_id != bot_id || channel_id.is_some() {
        return None;
    }
    guild_id
}
