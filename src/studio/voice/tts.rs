// SYNOID Reel TTS Client (ElevenLabs)
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use std::path::Path;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::Serialize;
use tracing::{error, info};

use super::{audio_probe, AudioAsset, SpeechSynthesizer};
use crate::config::VoiceSettings;
use crate::error::SynthesisError;

const XI_API_KEY_HEADER: &str = "xi-api-key";

#[derive(Serialize)]
struct TtsRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

pub struct ElevenLabsClient {
    http: reqwest::Client,
    api_key: String,
    voice_id: String,
    model_id: String,
    base_url: String,
}

impl ElevenLabsClient {
    pub fn new(voice: &VoiceSettings) -> Result<Self, SynthesisError> {
        let http = reqwest::Client::builder()
            .timeout(voice.request_timeout)
            .build()?;
        Ok(Self {
            http,
            api_key: voice.api_key.clone(),
            voice_id: voice.voice_id.clone(),
            model_id: voice.model_id.clone(),
            base_url: voice.base_url.clone(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/v1/text-to-speech/{}", self.base_url, self.voice_id)
    }

    async fn fetch(&self, text: &str) -> Result<Vec<u8>, SynthesisError> {
        let resp = self
            .http
            .post(self.endpoint())
            .header(XI_API_KEY_HEADER, &self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "audio/mpeg")
            .json(&TtsRequest {
                text,
                model_id: &self.model_id,
            })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(classify_failure(status, body));
        }

        let bytes = resp.bytes().await?;
        if bytes.is_empty() {
            return Err(SynthesisError::EmptyAudio);
        }
        Ok(bytes.to_vec())
    }
}

/// Map a non-success response onto the synthesis error taxonomy.
pub fn classify_failure(status: StatusCode, body: String) -> SynthesisError {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        if body.contains("quota_exceeded") {
            return SynthesisError::QuotaExceeded(body);
        }
        return SynthesisError::Unauthorized(body);
    }
    if status == StatusCode::TOO_MANY_REQUESTS || body.contains("quota_exceeded") {
        return SynthesisError::QuotaExceeded(body);
    }
    SynthesisError::Http {
        status: status.as_u16(),
        body,
    }
}

impl SpeechSynthesizer for ElevenLabsClient {
    async fn synthesize(&self, text: &str, output: &Path) -> Result<AudioAsset, SynthesisError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SynthesisError::EmptyText);
        }

        info!("[TTS] Generating audio: \"{}\" -> {:?}", text, output);
        let audio = match self.fetch(text).await {
            Ok(audio) => audio,
            Err(e) => {
                error!("[TTS] Request failed for \"{}\": {}", text, e);
                return Err(e);
            }
        };
        tokio::fs::write(output, &audio).await?;

        let probe_path = output.to_path_buf();
        let duration = tokio::task::spawn_blocking(move || audio_probe::decoded_duration(&probe_path))
            .await
            .map_err(|e| SynthesisError::Decode {
                path: output.to_path_buf(),
                reason: e.to_string(),
            })??;

        info!("[TTS] {:?} ready ({:.2}s, {} bytes)", output, duration, audio.len());
        Ok(AudioAsset {
            path: output.to_path_buf(),
            duration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn voice() -> VoiceSettings {
        VoiceSettings {
            voice_id: "voice123".into(),
            api_key: "k".into(),
            model_id: "m".into(),
            base_url: "http://127.0.0.1:9".into(),
            request_timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn test_endpoint_includes_voice() {
        let client = ElevenLabsClient::new(&voice()).unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:9/v1/text-to-speech/voice123");
    }

    #[test]
    fn test_failure_classification() {
        assert!(matches!(
            classify_failure(StatusCode::UNAUTHORIZED, "invalid_api_key".into()),
            SynthesisError::Unauthorized(_)
        ));
        assert!(matches!(
            classify_failure(StatusCode::UNAUTHORIZED, r#"{"detail":{"status":"quota_exceeded"}}"#.into()),
            SynthesisError::QuotaExceeded(_)
        ));
        assert!(matches!(
            classify_failure(StatusCode::TOO_MANY_REQUESTS, String::new()),
            SynthesisError::QuotaExceeded(_)
        ));
        assert!(matches!(
            classify_failure(StatusCode::BAD_GATEWAY, "upstream".into()),
            SynthesisError::Http { status: 502, .. }
        ));
    }

    #[tokio::test]
    async fn test_empty_text_never_hits_network() {
        let client = ElevenLabsClient::new(&voice()).unwrap();
        let out = std::env::temp_dir().join("__synoid_reel_empty.mp3");
        let err = client.synthesize("   ", &out).await.unwrap_err();
        assert!(matches!(err, SynthesisError::EmptyText));
        assert!(!out.exists());
    }
}
