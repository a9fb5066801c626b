use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::Serialize;

use super::RemoteVoice;
use crate::ai::timeout_from_env;
use crate::error::SpeechError;

pub const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";
pub const DEFAULT_VOICE_ID: &str = "EXAVITQu4vr4xnSDxMaL";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const MODEL_ID: &str = "eleven_multilingual_v2";

#[derive(Clone, Debug)]
pub struct ElevenLabsConfig {
    pub base_url: String,
    pub api_key: String,
    pub voice_id: String,
    pub timeout: Duration,
}

impl ElevenLabsConfig {
    /// Reads `ACADEMY_ELEVENLABS_*`. Returns `None` when no API key is set.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("ACADEMY_ELEVENLABS_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url =
            env::var("ACADEMY_ELEVENLABS_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let voice_id = env::var("ACADEMY_ELEVENLABS_VOICE_ID")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_VOICE_ID.into());
        let timeout =
            timeout_from_env("ACADEMY_ELEVENLABS_TIMEOUT_SECS").unwrap_or(DEFAULT_TIMEOUT);
        Some(Self {
            base_url,
            api_key,
            voice_id,
            timeout,
        })
    }
}

/// ElevenLabs text-to-speech.
#[derive(Clone)]
pub struct ElevenLabsVoice {
    client: Client,
    config: ElevenLabsConfig,
}

impl ElevenLabsVoice {
    #[must_use]
    pub fn new(config: ElevenLabsConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn from_env() -> Option<Self> {
        ElevenLabsConfig::from_env().map(Self::new)
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/text-to-speech/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.voice_id
        )
    }
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'static str,
    voice_settings: VoiceSettings,
}

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
    style: f32,
    use_speaker_boost: bool,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.5,
            similarity_boost: 0.5,
            style: 0.0,
            use_speaker_boost: true,
        }
    }
}

#[async_trait]
impl RemoteVoice for ElevenLabsVoice {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        if text.trim().is_empty() {
            return Err(SpeechError::EmptyText);
        }

        let payload = SpeechRequest {
            text,
            model_id: MODEL_ID,
            voice_settings: VoiceSettings::default(),
        };

        tracing::debug!(voice = %self.config.voice_id, chars = text.len(), "speech request");
        let response = self
            .client
            .post(self.endpoint())
            .header(ACCEPT, "audio/mpeg")
            .header("xi-api-key", &self.config.api_key)
            .timeout(self.config.timeout)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechError::HttpStatus { status, body });
        }

        let audio = response.bytes().await?;
        if audio.is_empty() {
            return Err(SpeechError::EmptyAudio);
        }
        Ok(audio.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ElevenLabsConfig {
        ElevenLabsConfig {
            base_url: "https://tts.example.test/".into(),
            api_key: "key".into(),
            voice_id: DEFAULT_VOICE_ID.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[test]
    fn endpoint_includes_voice() {
        let voice = ElevenLabsVoice::new(config());
        assert_eq!(
            voice.endpoint(),
            "https://tts.example.test/v1/text-to-speech/EXAVITQu4vr4xnSDxMaL"
        );
    }

    #[test]
    fn payload_carries_model_and_voice_settings() {
        let payload = SpeechRequest {
            text: "Hello",
            model_id: MODEL_ID,
            voice_settings: VoiceSettings::default(),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["model_id"], "eleven_multilingual_v2");
        assert_eq!(value["voice_settings"]["stability"], 0.5);
        assert_eq!(value["voice_settings"]["style"], 0.0);
        assert_eq!(value["voice_settings"]["use_speaker_boost"], true);
    }

    #[tokio::test]
    async fn blank_text_is_rejected_locally() {
        let voice = ElevenLabsVoice::new(config());
        assert!(matches!(
            voice.synthesize("   ").await,
            Err(SpeechError::EmptyText)
        ));
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let voice = ElevenLabsVoice::new(ElevenLabsConfig {
            base_url: format!("http://{addr}"),
            timeout: Duration::from_millis(300),
            ..config()
        });
        let result = tokio::time::timeout(Duration::from_secs(10), voice.synthesize("Hello"))
            .await
            .expect("synthesize() must give up on its own");

        match result {
            Err(SpeechError::Http(err)) => assert!(err.is_timeout()),
            other => panic!("expected a timeout error, got {other:?}"),
        }
        server.abort();
    }
}
