//! Read-aloud support: a remote voice with a local synthesizer as fallback.

mod elevenlabs;
mod player;

use async_trait::async_trait;

use crate::error::SpeechError;

pub use elevenlabs::{ElevenLabsConfig, ElevenLabsVoice};
pub use player::{PlaybackRoute, SpeechPlayer};

/// Delivery settings for local speech synthesis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Utterance {
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl Default for Utterance {
    fn default() -> Self {
        Self {
            rate: 0.8,
            pitch: 1.0,
            volume: 0.8,
        }
    }
}

/// Turns text into encoded audio (MPEG) through a remote service.
#[async_trait]
pub trait RemoteVoice: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError>;
}

/// Plays encoded audio to completion.
#[async_trait]
pub trait AudioOutput: Send + Sync {
    async fn play(&self, audio: &[u8]) -> Result<(), SpeechError>;

    /// Interrupt playback. A no-op when nothing is playing.
    async fn stop(&self);
}

/// On-device speech synthesis.
#[async_trait]
pub trait LocalVoice: Send + Sync {
    async fn speak(&self, text: &str, utterance: &Utterance) -> Result<(), SpeechError>;

    async fn cancel(&self);
}
