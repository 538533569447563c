// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Speech-to-text over a media URL via the Whisper API.

use std::time::Duration;

use async_trait::async_trait;
use autolote_core::{AutoloteError, Transcriber};
use serde::Deserialize;
use tracing::debug;

/// Base URL for the transcription API.
const API_BASE_URL: &str = "https://api.openai.com";

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Whisper-backed transcriber: downloads the voice note, then posts it as
/// multipart form data with a Spanish language hint.
#[derive(Debug, Clone)]
pub struct WhisperTranscriber {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl WhisperTranscriber {
    pub fn new(api_key: String) -> Result<Self, AutoloteError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AutoloteError::Speech {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: API_BASE_URL.to_string(),
            api_key,
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    async fn download_audio(&self, media_url: &str) -> Result<Vec<u8>, AutoloteError> {
        let response = self
            .client
            .get(media_url)
            .send()
            .await
            .map_err(|e| AutoloteError::Speech {
                message: format!("audio download failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AutoloteError::Speech {
                message: format!("media URL returned {status}"),
                source: None,
            });
        }

        let bytes = response.bytes().await.map_err(|e| AutoloteError::Speech {
            message: format!("failed to read audio body: {e}"),
            source: Some(Box::new(e)),
        })?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(&self, media_url: &str) -> Result<String, AutoloteError> {
        let audio = self.download_audio(media_url).await?;

        let part = reqwest::multipart::Part::bytes(audio)
            .file_name("audio.m4a")
            .mime_str("audio/m4a")
            .map_err(|e| AutoloteError::Speech {
                message: format!("invalid multipart mime: {e}"),
                source: Some(Box::new(e)),
            })?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", "whisper-1")
            .text("language", "es");

        let url = format!("{}/v1/audio/transcriptions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AutoloteError::Speech {
                message: format!("transcription request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AutoloteError::Speech {
                message: format!("transcription API returned {status}: {body}"),
                source: None,
            });
        }

        let parsed: TranscriptionResponse =
            response.json().await.map_err(|e| AutoloteError::Speech {
                message: format!("failed to parse transcription response: {e}"),
                source: Some(Box::new(e)),
            })?;

        let transcript = parsed.text.trim().to_string();
        debug!(chars = transcript.len(), "audio transcribed");
        Ok(transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn transcribes_audio_from_media_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/media/note.ogg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x4F, 0x67, 0x67]))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/audio/transcriptions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "text": "  busco una camioneta  "
            })))
            .mount(&server)
            .await;

        let transcriber = WhisperTranscriber::new("oa-key".into())
            .unwrap()
            .with_base_url(server.uri());
        let text = transcriber
            .transcribe(&format!("{}/media/note.ogg", server.uri()))
            .await
            .unwrap();
        assert_eq!(text, "busco una camioneta");
    }

    #[tokio::test]
    async fn failed_download_surfaces_as_speech_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let transcriber = WhisperTranscriber::new("oa-key".into())
            .unwrap()
            .with_base_url(server.uri());
        let result = transcriber
            .transcribe(&format!("{}/media/missing.ogg", server.uri()))
            .await;
        assert!(matches!(result, Err(AutoloteError::Speech { .. })));
    }

    #[tokio::test]
    async fn failed_transcription_surfaces_as_speech_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1]))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/audio/transcriptions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let transcriber = WhisperTranscriber::new("oa-key".into())
            .unwrap()
            .with_base_url(server.uri());
        let result = transcriber
            .transcribe(&format!("{}/media/note.ogg", server.uri()))
            .await;
        assert!(matches!(result, Err(AutoloteError::Speech { .. })));
    }
}
