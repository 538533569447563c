// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the UltraMSG WhatsApp gateway.
//!
//! Fire-and-forget sends: a 2xx from the provider means "accepted", nothing
//! more. Text sends use a short timeout, media sends a long one.

use std::time::Duration;

use async_trait::async_trait;
use autolote_core::{AutoloteError, MessagingChannel};
use serde::Serialize;
use tracing::debug;

/// Base URL for the UltraMSG API.
const API_BASE_URL: &str = "https://api.ultramsg.com";

/// Timeout for plain text sends.
const TEXT_TIMEOUT: Duration = Duration::from_secs(15);

/// Timeout for media (audio/image) sends.
const MEDIA_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
struct ChatPayload<'a> {
    token: &'a str,
    to: &'a str,
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct AudioPayload<'a> {
    token: &'a str,
    to: &'a str,
    audio: &'a str,
}

/// WhatsApp channel over the UltraMSG instance API.
#[derive(Debug, Clone)]
pub struct UltraMsgChannel {
    client: reqwest::Client,
    base_url: String,
    instance_id: String,
    token: String,
}

impl UltraMsgChannel {
    pub fn new(instance_id: String, token: String) -> Result<Self, AutoloteError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| AutoloteError::Channel {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: API_BASE_URL.to_string(),
            instance_id,
            token,
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    fn endpoint(&self, kind: &str) -> String {
        format!("{}/{}/messages/{kind}", self.base_url, self.instance_id)
    }

    async fn check(response: reqwest::Response, kind: &str) -> Result<(), AutoloteError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AutoloteError::Channel {
                message: format!("{kind} send returned {status}: {body}"),
                source: None,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl MessagingChannel for UltraMsgChannel {
    async fn send_text(&self, to: &str, body: &str) -> Result<(), AutoloteError> {
        let payload = ChatPayload {
            token: &self.token,
            to,
            body,
        };
        let response = self
            .client
            .post(self.endpoint("chat"))
            .timeout(TEXT_TIMEOUT)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AutoloteError::Channel {
                message: format!("text send failed: {e}"),
                source: Some(Box::new(e)),
            })?;
        Self::check(response, "text").await?;
        debug!(to, chars = body.len(), "text message sent");
        Ok(())
    }

    async fn send_audio_url(&self, to: &str, audio_url: &str) -> Result<(), AutoloteError> {
        let payload = AudioPayload {
            token: &self.token,
            to,
            audio: audio_url,
        };
        let response = self
            .client
            .post(self.endpoint("audio"))
            .timeout(MEDIA_TIMEOUT)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AutoloteError::Channel {
                message: format!("audio send failed: {e}"),
                source: Some(Box::new(e)),
            })?;
        Self::check(response, "audio").await?;
        debug!(to, audio_url, "audio message sent");
        Ok(())
    }

    async fn send_image_url(
        &self,
        to: &str,
        image_url: &str,
        caption: &str,
    ) -> Result<(), AutoloteError> {
        let form = [
            ("token", self.token.as_str()),
            ("to", to),
            ("image", image_url),
            ("caption", caption),
        ];
        let response = self
            .client
            .post(self.endpoint("image"))
            .timeout(MEDIA_TIMEOUT)
            .form(&form)
            .send()
            .await
            .map_err(|e| AutoloteError::Channel {
                message: format!("image send failed: {e}"),
                source: Some(Box::new(e)),
            })?;
        Self::check(response, "image").await?;
        debug!(to, image_url, "image message sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_channel(base_url: &str) -> UltraMsgChannel {
        UltraMsgChannel::new("instance42".into(), "um-token".into())
            .unwrap()
            .with_base_url(base_url.to_string())
    }

    #[tokio::test]
    async fn sends_text_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/instance42/messages/chat"))
            .and(body_string_contains("um-token"))
            .and(body_string_contains("Hola parcero"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sent": "true"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let channel = test_channel(&server.uri());
        channel.send_text("573001234567", "Hola parcero").await.unwrap();
    }

    #[tokio::test]
    async fn sends_audio_by_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/instance42/messages/audio"))
            .and(body_string_contains("https://storage/audio.mp3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sent": "true"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let channel = test_channel(&server.uri());
        channel
            .send_audio_url("573001234567", "https://storage/audio.mp3")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn sends_image_with_caption_as_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/instance42/messages/image"))
            .and(body_string_contains("image=https%3A%2F%2Fimg%2F1.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sent": "true"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let channel = test_channel(&server.uri());
        channel
            .send_image_url("573001234567", "https://img/1.jpg", "Mazda CX-5")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn provider_error_surfaces_as_channel_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(402).set_body_string("payment required"))
            .mount(&server)
            .await;

        let channel = test_channel(&server.uri());
        let result = channel.send_text("573001234567", "Hola").await;
        assert!(matches!(result, Err(AutoloteError::Channel { .. })));
    }
}
