// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The Claude-backed reply synthesizer.

use async_trait::async_trait;
use tracing::debug;

use autolote_core::{InventorySnapshot, Lead, LlmError, ReplySynthesizer, SellerReply};

use crate::client::AnthropicClient;
use crate::parser;
use crate::prompt;
use crate::types::{ApiMessage, MessageRequest};

/// Default maximum reply length in characters before truncation.
pub const DEFAULT_MAX_REPLY_CHARS: usize = 900;

/// Reply synthesizer calling the Anthropic Messages API with the persona
/// prompt and enforcing the structured output contract.
pub struct ClaudeSynthesizer {
    client: AnthropicClient,
    persona_name: String,
    model: String,
    max_tokens: u32,
    max_reply_chars: usize,
}

impl ClaudeSynthesizer {
    pub fn new(
        client: AnthropicClient,
        persona_name: String,
        model: String,
        max_tokens: u32,
    ) -> Self {
        Self {
            client,
            persona_name,
            model,
            max_tokens,
            max_reply_chars: DEFAULT_MAX_REPLY_CHARS,
        }
    }

    /// Override the reply length cap.
    pub fn with_max_reply_chars(mut self, max_reply_chars: usize) -> Self {
        self.max_reply_chars = max_reply_chars;
        self
    }
}

#[async_trait]
impl ReplySynthesizer for ClaudeSynthesizer {
    async fn generate(
        &self,
        user_text: &str,
        lead: &Lead,
        inventory: Option<&InventorySnapshot>,
    ) -> Result<SellerReply, LlmError> {
        let request = MessageRequest {
            model: self.model.clone(),
            messages: vec![ApiMessage {
                role: "user".into(),
                content: prompt::build_user_prompt(user_text),
            }],
            system: Some(prompt::build_system_prompt(
                &self.persona_name,
                lead,
                inventory,
            )),
            max_tokens: self.max_tokens,
            temperature: Some(0.8),
            stream: false,
        };

        let response = self.client.complete(&request).await?;
        let raw_text = response.text();
        debug!(
            phone = %lead.client.phone,
            output_tokens = response.usage.output_tokens,
            "reply generated"
        );

        Ok(parser::parse_reply(
            &raw_text,
            &lead.process.current_step,
            self.max_reply_chars,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autolote_core::{ClientInfo, ResponseKind, SalesProcess};
    use chrono::Utc;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_lead() -> Lead {
        let now = Utc::now();
        Lead {
            id: "LEAD_1".into(),
            client: ClientInfo {
                phone: "573001234567".into(),
                name: "Cliente Potencial".into(),
                email: None,
                first_contact_at: now,
            },
            interest: Default::default(),
            process: SalesProcess {
                current_step: "consulta_general".into(),
                status: Default::default(),
                started_at: now,
                last_activity_at: now,
                appointment_date: None,
                appointment_time: None,
                appointment_vehicle: None,
                history: Vec::new(),
            },
        }
    }

    fn api_body(envelope: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "msg_test",
            "type": "message",
            "role": "assistant",
            "content": [{"type": "text", "text": envelope}],
            "model": "claude-sonnet-4-20250514",
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 100, "output_tokens": 50}
        })
    }

    async fn synthesizer_against(server: &MockServer) -> ClaudeSynthesizer {
        let client = AnthropicClient::new("key", "2023-06-01")
            .unwrap()
            .with_base_url(server.uri());
        ClaudeSynthesizer::new(
            client,
            "Carlos".into(),
            "claude-sonnet-4-20250514".into(),
            1200,
        )
    }

    #[tokio::test]
    async fn generates_structured_reply_from_envelope() {
        let server = MockServer::start().await;
        let envelope = r#"{"message": "¡Ey! Te tengo una Mazda divina", "next_action": "mostrar_vehiculos", "waiting_for": "eleccion_vehiculo", "vehiculos_mostrados": ["VEH002"], "extracted_data": {"marca": "Mazda"}}"#;
        Mock::given(method("POST"))
            .and(path("/"))
            // The persona prompt travels as the system field.
            .and(body_string_contains("Eres Carlos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(api_body(envelope)))
            .mount(&server)
            .await;

        let synthesizer = synthesizer_against(&server).await;
        let reply = synthesizer
            .generate("¿Tienen Mazda?", &make_lead(), None)
            .await
            .unwrap();

        assert_eq!(reply.kind, ResponseKind::ShowVehicles);
        assert_eq!(reply.message, "¡Ey! Te tengo una Mazda divina");
        assert_eq!(reply.extracted.brand.as_deref(), Some("Mazda"));
    }

    #[tokio::test]
    async fn malformed_envelope_yields_safe_default_not_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(api_body("no json at all")))
            .mount(&server)
            .await;

        let synthesizer = synthesizer_against(&server).await;
        let reply = synthesizer
            .generate("hola", &make_lead(), None)
            .await
            .unwrap();

        assert_eq!(reply.kind, ResponseKind::Consultation);
        assert_eq!(reply.waiting_for.as_deref(), Some("consulta_general"));
    }

    #[tokio::test]
    async fn transport_failure_propagates_as_llm_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
            .mount(&server)
            .await;

        let synthesizer = synthesizer_against(&server).await;
        let result = synthesizer.generate("hola", &make_lead(), None).await;
        assert!(matches!(result, Err(LlmError::Transport(_))));
    }
}
