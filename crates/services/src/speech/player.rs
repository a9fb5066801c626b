use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use super::{AudioOutput, LocalVoice, RemoteVoice, Utterance};
use crate::error::SpeechError;

/// Which voice ended up reading the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackRoute {
    Remote,
    Local,
}

pub struct SpeechPlayer {
    remote: Option<Arc<dyn RemoteVoice>>,
    output: Arc<dyn AudioOutput>,
    local: Option<Arc<dyn LocalVoice>>,
    utterance: Utterance,
    playing: AtomicBool,
    // Bumped by every play() and stop(); a request only proceeds while it holds the latest value.
    generation: AtomicU64,
}

impl SpeechPlayer {
    #[must_use]
    pub fn new(
        remote: Option<Arc<dyn RemoteVoice>>,
        output: Arc<dyn AudioOutput>,
        local: Option<Arc<dyn LocalVoice>>,
    ) -> Self {
        Self {
            remote,
            output,
            local,
            utterance: Utterance::default(),
            playing: AtomicBool::new(false),
            generation: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn with_utterance(mut self, utterance: Utterance) -> Self {
        self.utterance = utterance;
        self
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    /// Read `text` aloud and wait until it finishes.
    ///
    /// Uses the remote voice when configured and falls back to local synthesis if
    /// synthesis or playback fails. Anything already playing is stopped first.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::EmptyText` for blank input, or the last failure when no
    /// voice could read the text.
    pub async fn play(&self, text: &str) -> Result<PlaybackRoute, SpeechError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SpeechError::EmptyText);
        }
        if self.is_playing() {
            self.stop().await;
        }
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.playing.store(true, Ordering::SeqCst);

        let mut failure = SpeechError::Unavailable;
        if let Some(remote) = &self.remote {
            match self.play_remote(remote.as_ref(), text, ticket).await {
                Ok(()) => {
                    self.finish(ticket);
                    return Ok(PlaybackRoute::Remote);
                }
                // stop() landed mid-request; the interruption is not a failure.
                Err(_) if !self.is_current(ticket) => return Ok(PlaybackRoute::Remote),
                Err(err) => {
                    tracing::warn!(error = %err, "remote voice failed, falling back to local speech");
                    failure = err;
                }
            }
        }

        if !self.is_current(ticket) {
            return Ok(PlaybackRoute::Local);
        }
        let result = match &self.local {
            Some(local) => local
                .speak(text, &self.utterance)
                .await
                .map(|()| PlaybackRoute::Local),
            None => Err(failure),
        };
        self.finish(ticket);
        result
    }

    async fn play_remote(
        &self,
        remote: &dyn RemoteVoice,
        text: &str,
        ticket: u64,
    ) -> Result<(), SpeechError> {
        let audio = remote.synthesize(text).await?;
        if !self.is_current(ticket) {
            tracing::debug!("speech stopped before synthesized audio arrived");
            return Ok(());
        }
        self.output.play(&audio).await
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket
    }

    fn finish(&self, ticket: u64) {
        if self.is_current(ticket) {
            self.playing.store(false, Ordering::SeqCst);
        }
    }

    /// Interrupt whichever voice is speaking.
    pub async fn stop(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.playing.store(false, Ordering::SeqCst);
        self.output.stop().await;
        if let Some(local) = &self.local {
            local.cancel().await;
        }
    }
}
