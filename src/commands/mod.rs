//! This module aggregates all the command modules for the bot.

/// Commands related to music playback (play, pause, resume, stop, join, leave).
pub mod music;
