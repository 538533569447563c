// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The voice renderer: cleanup, synthesis, and public-URL storage.

use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;

use autolote_core::{AutoloteError, SpeechSynthesizer, Tone, VoiceAsset};

use crate::audio_store::AudioStoreClient;
use crate::cleanup;
use crate::elevenlabs::ElevenLabsClient;
use crate::tone::{self, VoiceSettingsUpdate};

/// Renders reply text to a stored audio asset.
///
/// The runtime settings override lets the voice-tuning admin endpoint
/// adjust prosody without a restart; it applies on top of whichever preset
/// the tone selects.
pub struct VoiceRenderer {
    tts: ElevenLabsClient,
    store: AudioStoreClient,
    overrides: RwLock<VoiceSettingsUpdate>,
}

impl VoiceRenderer {
    pub fn new(tts: ElevenLabsClient, store: AudioStoreClient) -> Self {
        Self {
            tts,
            store,
            overrides: RwLock::new(VoiceSettingsUpdate::default()),
        }
    }

    /// Replace the runtime voice settings override.
    pub fn update_settings(&self, update: VoiceSettingsUpdate) {
        *self.overrides.write().expect("overrides lock poisoned") = update;
    }

    /// Current runtime override.
    pub fn current_settings(&self) -> VoiceSettingsUpdate {
        *self.overrides.read().expect("overrides lock poisoned")
    }
}

#[async_trait]
impl SpeechSynthesizer for VoiceRenderer {
    async fn synthesize(&self, text: &str, tone: Tone) -> Result<VoiceAsset, AutoloteError> {
        let clean = cleanup::clean_for_speech(text);
        if clean.is_empty() {
            return Err(AutoloteError::Speech {
                message: "nothing speakable left after cleanup".into(),
                source: None,
            });
        }

        let settings = self
            .current_settings()
            .apply_to(tone::settings_for_tone(tone));
        let bytes = self.tts.text_to_speech(&clean, settings).await?;

        let file_name = format!("audio_{}.mp3", uuid::Uuid::new_v4().simple());
        let public_url = self.store.upload(&file_name, bytes).await?;
        let object_name = self.store.object_name(&file_name);

        debug!(object = %object_name, tone = %tone, "voice asset ready");
        Ok(VoiceAsset {
            public_url,
            object_name,
        })
    }

    async fn delete_asset(&self, object_name: &str) -> Result<(), AutoloteError> {
        self.store.delete(object_name).await
    }

    fn classify_tone(&self, text: &str) -> Tone {
        tone::classify_tone(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn renderer_against(server: &MockServer) -> VoiceRenderer {
        let tts = ElevenLabsClient::new("el-key", "voice-1".into(), "eleven_multilingual_v2".into())
            .unwrap()
            .with_base_url(server.uri());
        let store = AudioStoreClient::new("lot-audio".into(), "Autos-ST".into(), None)
            .unwrap()
            .with_base_url(server.uri());
        VoiceRenderer::new(tts, store)
    }

    #[tokio::test]
    async fn synthesize_renders_and_uploads() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r"^/v1/text-to-speech/voice-1$"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1, 2, 3]))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path_regex(r"^/upload/storage/v1/b/lot-audio/o$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let renderer = renderer_against(&server).await;
        let asset = renderer
            .synthesize("¡Hola parcero! Te tengo un carro divino", Tone::Greeting)
            .await
            .unwrap();

        assert!(asset.object_name.starts_with("Autos-ST/audio_"));
        assert!(asset.public_url.contains(&asset.object_name));
    }

    #[tokio::test]
    async fn emoji_only_text_fails_before_any_api_call() {
        let server = MockServer::start().await;
        // No mocks mounted: any HTTP call would fail the test via 404.
        let renderer = renderer_against(&server).await;
        let result = renderer.synthesize("😊🎉", Tone::ProductInfo).await;
        assert!(matches!(result, Err(AutoloteError::Speech { .. })));
    }

    #[tokio::test]
    async fn runtime_override_reaches_tts_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r"^/v1/text-to-speech/"))
            .and(wiremock::matchers::body_string_contains("\"style\":0.9"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1]))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path_regex(r"^/upload/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let renderer = renderer_against(&server).await;
        renderer.update_settings(VoiceSettingsUpdate {
            style: Some(0.9),
            ..Default::default()
        });
        renderer.synthesize("Hola", Tone::ProductInfo).await.unwrap();
    }
}
