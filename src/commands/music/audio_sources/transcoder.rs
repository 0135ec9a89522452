//! Audio pipeline boundary: an `ffmpeg` child process that reads the resolved
//! stream URL and writes an encoded feed to stdout, which songbird decodes.

use songbird::input::{ChildContainer, Input};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::debug;

use super::track_metadata::StreamHandle;

#[derive(Error, Debug)]
pub enum TranscoderError {
    #[error("Failed to start ffmpeg: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Builds and spawns the transcoder process with fixed reconnect and codec flags.
#[derive(Debug, Clone)]
pub struct Transcoder {
    program: PathBuf,
    before_options: Vec<String>,
    options: Vec<String>,
}

fn owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|a| a.to_string()).collect()
}

impl Transcoder {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            before_options: owned(&[
                "-reconnect",
                "1",
                "-reconnect_streamed",
                "1",
                "-reconnect_delay_max",
                "5",
            ]),
            options: owned(&["-vn", "-ar", "48000", "-ac", "2", "-b:a", "192k"]),
        }
    }

    /// Full argument list for `stream`.
    pub fn args(&self, stream: &StreamHandle) -> Vec<String> {
        let mut args = owned(&["-hide_banner", "-loglevel", "error", "-nostdin"]);
        args.extend(self.before_options.iter().cloned());

        if !stream.http_headers.is_empty() {
            let mut headers: Vec<_> = stream.http_headers.iter().collect();
            headers.sort();
            let joined: String = headers
                .into_iter()
                .map(|(name, value)| format!("{}: {}\r\n", name, value))
                .collect();
            args.extend(["-headers".to_string(), joined]);
        }

        args.extend(["-i".to_string(), stream.stream_url.clone()]);
        args.extend(self.options.iter().cloned());
        args.extend(owned(&["-f", "mp3", "pipe:1"]));
        args
    }

    /// Starts the transcoder and wraps its stdout as a songbird input.
    pub fn spawn(&self, stream: &StreamHandle) -> Result<Input, TranscoderError> {
        let args = self.args(stream);
        debug!("Spawning {} for {}", self.program.display(), stream.title);

        let child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        Ok(ChildContainer::from(child).into())
    }
}
