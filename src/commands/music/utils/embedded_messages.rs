use poise::{CreateReply, serenity_prelude as serenity};
use serenity::all::{CreateEmbed, CreateEmbedFooter};

use super::format_duration;
use super::music_manager::{MusicError, PlayPlan, TrackOrigin};
use crate::commands::music::audio_sources::QueryKind;
use crate::commands::music::audio_sources::spotify::{SpotifyError, SpotifyLink};
use crate::commands::music::audio_sources::track_metadata::{StreamHandle, TrackMetadata};

const GREEN: u32 = 0x00ff00;

pub const SEARCHING: &str = "🔍 جاري البحث...";
pub const JOINED: &str = "✅ تم الانضمام إلى القناة الصوتية";
pub const PAUSED: &str = "⏸️ تم الإيقاف المؤقت";
pub const RESUMED: &str = "▶️ تم استئناف التشغيل";
pub const STOPPED: &str = "⏹️ تم إيقاف التشغيل";
pub const LEFT: &str = "👋 تمت المغادرة";
pub const GENERIC_FAILURE: &str = "❌ حدث خطأ غير متوقع، حاول مرة أخرى.";

const MUST_BE_IN_VOICE: &str = "يجب أن تكون في قناة صوتية!";
const NOTHING_PLAYING: &str = "❌ لا يوجد شيء قيد التشغيل!";
const NOTHING_PAUSED: &str = "❌ لا يوجد شيء متوقف مؤقتاً!";
const NOT_IN_VOICE: &str = "❌ لست في قناة صوتية!";

/// A plain text reply.
pub fn text(content: impl Into<String>) -> CreateReply {
    CreateReply::default().content(content)
}

/// Interim status once the Spotify lookup succeeded, `None` for direct queries.
pub fn found(plan: &PlayPlan) -> Option<String> {
    match &plan.origin {
        TrackOrigin::Direct => None,
        TrackOrigin::Spotify(track) => Some(format!(
            "🎵 تم العثور على: {} - {}\n⏳ جاري التحضير...",
            track.title,
            track.artist_line()
        )),
        TrackOrigin::SpotifyCollection { name, .. } => Some(format!(
            "📝 تم العثور على قائمة التشغيل: {}\n⏳ جاري تحضير المقطع الأول...",
            name
        )),
    }
}

fn spotify_embed(title: &str, track: &TrackMetadata) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(title)
        .description(format!("**{}**\nبواسطة {}", track.title, track.artist_line()))
        .color(GREEN);

    if let Some(artwork) = &track.artwork_url {
        embed = embed.thumbnail(artwork);
    }
    if let Some(album) = &track.album {
        embed = embed.field("الألبوم", album, true);
    }
    if let Some(duration) = track.duration {
        embed = embed.field("المدة", format_duration(duration), true);
    }
    embed
}

/// Create an embed for the stream that just started
pub fn now_playing(plan: &PlayPlan, stream: &StreamHandle) -> CreateEmbed {
    match &plan.origin {
        TrackOrigin::Spotify(track) => spotify_embed("🎵 جاري التشغيل من Spotify", track),
        TrackOrigin::SpotifyCollection { track, name, total } => {
            spotify_embed("🎵 جاري التشغيل من قائمة Spotify", track).footer(
                CreateEmbedFooter::new(format!("المقطع 1 من {} | {}", total, name)),
            )
        }
        TrackOrigin::Direct => {
            let mut embed = CreateEmbed::new()
                .title("🎵 جاري التشغيل")
                .description(format!("**{}**", stream.title))
                .color(GREEN);

            if let Some(thumbnail) = &stream.thumbnail {
                embed = embed.thumbnail(thumbnail);
            }
            if let Some(duration) = stream.duration {
                embed = embed.field("المدة", format_duration(duration), true);
            }
            if let Some(url) = &stream.webpage_url {
                embed = embed.field("الرابط", format!("[YouTube]({})", url), true);
            }
            embed
        }
    }
}

fn spotify_not_found(query: &str) -> String {
    match QueryKind::classify(query) {
        QueryKind::Spotify(SpotifyLink::Playlist(_) | SpotifyLink::Album(_)) => {
            "❌ لم يتم العثور على قائمة التشغيل في Spotify. تأكد من صحة الرابط وأن القائمة متاحة."
                .to_string()
        }
        _ => [
            "❌ لم يتم العثور على المقطع في Spotify. تأكد من:",
            "1️⃣ صحة الرابط",
            "2️⃣ أن المقطع متاح في منطقتك",
            "3️⃣ أن المقطع لم يتم إزالته من Spotify",
        ]
        .join("\n"),
    }
}

/// User-facing text for a failed `play`.
pub fn play_error(query: &str, err: &MusicError) -> String {
    match err {
        MusicError::Metadata(
            SpotifyError::NotFound | SpotifyError::InvalidUrl(_) | SpotifyError::Empty,
        ) => spotify_not_found(query),
        MusicError::MetadataUnavailable => {
            "❌ روابط Spotify غير مفعلة: لم يتم ضبط بيانات الاعتماد.".to_string()
        }
        MusicError::Resolve(_) => format!(
            "❌ حدث خطأ: تعذر العثور على المقطع ({})",
            error_detail(&err.to_string())
        ),
        other => error_message(other),
    }
}

/// User-facing text for a failed control command.
pub fn error_message(err: &MusicError) -> String {
    match err {
        MusicError::UserNotInVoiceChannel => MUST_BE_IN_VOICE.to_string(),
        MusicError::NothingPlaying => NOTHING_PLAYING.to_string(),
        MusicError::NothingPaused => NOTHING_PAUSED.to_string(),
        MusicError::NotConnected => NOT_IN_VOICE.to_string(),
        other => format!("❌ حدث خطأ: {}", error_detail(&other.to_string())),
    }
}

/// Longest error detail shown to users. Discord caps a message at 2000
/// characters.
const MAX_ERROR_DETAIL: usize = 300;

fn error_detail(detail: &str) -> String {
    let detail = detail.trim();
    if detail.chars().count() <= MAX_ERROR_DETAIL {
        return detail.to_string();
    }
    let mut shortened: String = detail.chars().take(MAX_ERROR_DETAIL - 1).collect();
    shortened.push('…');
    shortened
}
