//! Speech adapters that shell out to local programs.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use services::SpeechError;
use services::speech::{AudioOutput, LocalVoice, Utterance};
use tokio::process::Command;
use tokio::sync::Notify;

/// Command line split into program and leading arguments, e.g. `mpg123 -q`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
}

impl CommandLine {
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.split_whitespace().map(str::to_owned);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    fn from_env(var: &str, default: &str) -> Self {
        std::env::var(var)
            .ok()
            .and_then(|raw| Self::parse(&raw))
            .or_else(|| Self::parse(default))
            .unwrap_or_else(|| Self {
                program: default.to_owned(),
                args: Vec::new(),
            })
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        command
    }
}

/// Runs `command` to completion unless `cancel` fires first.
async fn run_until_cancelled(mut command: Command, cancel: &Notify) -> Result<(), SpeechError> {
    let mut child = command
        .spawn()
        .map_err(|e| SpeechError::Playback(e.to_string()))?;
    tokio::select! {
        status = child.wait() => {
            let status = status.map_err(|e| SpeechError::Playback(e.to_string()))?;
            if status.success() {
                Ok(())
            } else {
                Err(SpeechError::Playback(format!("player exited with {status}")))
            }
        }
        () = cancel.notified() => {
            let _ = child.kill().await;
            Ok(())
        }
    }
}

/// Plays MPEG audio through an external player (`ACADEMY_AUDIO_PLAYER`, default `mpg123 -q`).
pub struct CommandAudioOutput {
    player: CommandLine,
    cancel: Notify,
}

impl CommandAudioOutput {
    pub fn from_env() -> Self {
        Self {
            player: CommandLine::from_env("ACADEMY_AUDIO_PLAYER", "mpg123 -q"),
            cancel: Notify::new(),
        }
    }

    fn scratch_file() -> PathBuf {
        std::env::temp_dir().join(format!("academy-{}.mp3", uuid::Uuid::new_v4()))
    }
}

#[async_trait]
impl AudioOutput for CommandAudioOutput {
    async fn play(&self, audio: &[u8]) -> Result<(), SpeechError> {
        let path = Self::scratch_file();
        tokio::fs::write(&path, audio)
            .await
            .map_err(|e| SpeechError::Playback(e.to_string()))?;

        let mut command = self.player.command();
        command.arg(&path);
        let result = run_until_cancelled(command, &self.cancel).await;

        if let Err(err) = tokio::fs::remove_file(&path).await {
            tracing::debug!(path = %path.display(), error = %err, "could not remove audio file");
        }
        result
    }

    async fn stop(&self) {
        self.cancel.notify_waiters();
    }
}

/// Local synthesis through `espeak` (or `ACADEMY_LOCAL_VOICE`).
pub struct CommandLocalVoice {
    program: CommandLine,
    cancel: Notify,
}

impl CommandLocalVoice {
    pub fn from_env() -> Self {
        Self {
            program: CommandLine::from_env("ACADEMY_LOCAL_VOICE", "espeak"),
            cancel: Notify::new(),
        }
    }
}

/// espeak flags for an utterance: words per minute, pitch 0-99, amplitude 0-200.
fn espeak_args(utterance: &Utterance) -> Vec<String> {
    let words_per_minute = (175.0 * utterance.rate).round().clamp(80.0, 450.0);
    let pitch = (50.0 * utterance.pitch).round().clamp(0.0, 99.0);
    let amplitude = (100.0 * utterance.volume).round().clamp(0.0, 200.0);
    vec![
        "-s".into(),
        format!("{words_per_minute}"),
        "-p".into(),
        format!("{pitch}"),
        "-a".into(),
        format!("{amplitude}"),
    ]
}

#[async_trait]
impl LocalVoice for CommandLocalVoice {
    async fn speak(&self, text: &str, utterance: &Utterance) -> Result<(), SpeechError> {
        let mut command = self.program.command();
        command.args(espeak_args(utterance)).arg("--").arg(text);
        run_until_cancelled(command, &self.cancel).await
    }

    async fn cancel(&self) {
        self.cancel.notify_waiters();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_spec_splits_arguments() {
        let line = CommandLine::parse("  mpv --no-video  --really-quiet ").unwrap();
        assert_eq!(line.program, "mpv");
        assert_eq!(line.args, vec!["--no-video", "--really-quiet"]);
        assert!(CommandLine::parse("   ").is_none());
    }

    #[test]
    fn default_utterance_maps_to_slow_clear_speech() {
        let args = espeak_args(&Utterance::default());
        assert_eq!(args, vec!["-s", "140", "-p", "50", "-a", "80"]);
    }
}
