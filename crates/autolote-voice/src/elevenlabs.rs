// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the ElevenLabs text-to-speech API.

use std::time::Duration;

use autolote_core::AutoloteError;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Serialize;
use tracing::debug;

use crate::tone::VoiceSettings;

/// Base URL for the ElevenLabs API.
const API_BASE_URL: &str = "https://api.elevenlabs.io";

#[derive(Debug, Serialize)]
struct TtsRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

/// Text-to-speech client returning raw MP3 bytes.
#[derive(Debug, Clone)]
pub struct ElevenLabsClient {
    client: reqwest::Client,
    base_url: String,
    voice_id: String,
    model_id: String,
}

impl ElevenLabsClient {
    pub fn new(api_key: &str, voice_id: String, model_id: String) -> Result<Self, AutoloteError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "xi-api-key",
            HeaderValue::from_str(api_key).map_err(|e| AutoloteError::Speech {
                message: format!("invalid ElevenLabs API key header value: {e}"),
                source: None,
            })?,
        );
        headers.insert("accept", HeaderValue::from_static("audio/mpeg"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(45))
            .build()
            .map_err(|e| AutoloteError::Speech {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: API_BASE_URL.to_string(),
            voice_id,
            model_id,
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    /// Render `text` to MP3 bytes with the given voice settings.
    pub async fn text_to_speech(
        &self,
        text: &str,
        settings: VoiceSettings,
    ) -> Result<Vec<u8>, AutoloteError> {
        let url = format!("{}/v1/text-to-speech/{}", self.base_url, self.voice_id);
        let body = TtsRequest {
            text,
            model_id: &self.model_id,
            voice_settings: settings,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AutoloteError::Speech {
                message: format!("TTS request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AutoloteError::Speech {
                message: format!("TTS API returned {status}: {body}"),
                source: None,
            });
        }

        let bytes = response.bytes().await.map_err(|e| AutoloteError::Speech {
            message: format!("failed to read TTS audio body: {e}"),
            source: Some(Box::new(e)),
        })?;

        debug!(bytes = bytes.len(), "audio synthesized");
        Ok(bytes.to_vec())
    }
}
