// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structured-reply extraction from raw model output.
//!
//! The model is instructed to answer in a JSON envelope, but real output
//! may carry code fences or surrounding prose. This module defensively
//! locates the envelope, parses it into a closed schema, and falls back to
//! a safe default reply when nothing parseable remains. Parse trouble never
//! surfaces as an error to the caller.

use autolote_core::{Interest, ResponseKind, SellerReply};
use serde::Deserialize;
use tracing::warn;

/// Raw JSON envelope produced by the model.
#[derive(Debug, Default, Deserialize)]
pub struct RawSellerReply {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub extracted_data: RawExtracted,
    #[serde(default)]
    pub next_action: String,
    #[serde(default)]
    pub waiting_for: Option<String>,
    #[serde(default)]
    pub vehiculos_mostrados: Vec<String>,
    #[serde(default)]
    pub appointment_date: Option<String>,
    #[serde(default)]
    pub vehiculo_referencia: Option<String>,
}

/// Slot fields the model may extract, with the prompt's Spanish keys.
#[derive(Debug, Default, Deserialize)]
pub struct RawExtracted {
    #[serde(default)]
    pub marca: Option<String>,
    #[serde(default)]
    pub modelo: Option<String>,
    #[serde(default)]
    pub tipo_vehiculo: Option<String>,
    /// The model emits this as a number or a formatted string.
    #[serde(default)]
    pub presupuesto_max: Option<serde_json::Value>,
    #[serde(default)]
    pub vehiculo_favorito: Option<String>,
    #[serde(default)]
    pub vehiculos_consultados: Vec<String>,
    #[serde(default)]
    pub observaciones: Option<String>,
}

impl RawExtracted {
    fn into_interest(self) -> Interest {
        let max_budget = self.presupuesto_max.and_then(|v| match v {
            serde_json::Value::Number(n) => n.as_u64(),
            serde_json::Value::String(s) => {
                let digits: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
                digits.parse().ok()
            }
            _ => None,
        });
        Interest {
            brand: self.marca,
            model: self.modelo,
            vehicle_type: self.tipo_vehiculo,
            max_budget,
            favorite_vehicle: self.vehiculo_favorito,
            consulted_vehicles: self.vehiculos_consultados,
            notes: self.observaciones,
        }
    }
}

/// Neutral continuation used when the envelope cannot be recovered.
const DEFAULT_MESSAGE: &str =
    "Listo, cuéntame un poco más, ¿qué tipo de carro andas buscando?";

/// Generic follow-up appended when a truncated reply loses its question.
const DEFAULT_FOLLOW_UP: &str = "¿Te cuento más detalles?";

/// Parse raw model output into a well-formed [`SellerReply`].
///
/// `current_step` seeds `waiting_for` in the safe default so a repaired
/// turn leaves the lead's step untouched.
pub fn parse_reply(raw_output: &str, current_step: &str, max_reply_chars: usize) -> SellerReply {
    let parsed = extract_json_object(raw_output)
        .and_then(|json| serde_json::from_str::<RawSellerReply>(json).ok());

    let raw = match parsed {
        Some(raw) => raw,
        None => {
            warn!("model output carried no parseable envelope, using safe default");
            return safe_default_reply(current_step);
        }
    };

    let kind = classify_action(&raw.next_action, raw.appointment_date.as_deref());
    let message = if raw.message.trim().is_empty() {
        DEFAULT_MESSAGE.to_string()
    } else {
        truncate_reply(raw.message.trim(), max_reply_chars)
    };

    SellerReply {
        kind,
        message,
        waiting_for: raw.waiting_for.filter(|s| !s.trim().is_empty()),
        extracted: raw.extracted_data.into_interest(),
        mentioned_vehicles: raw.vehiculos_mostrados,
        appointment_date: raw.appointment_date,
        vehicle_reference: raw.vehiculo_referencia,
    }
}

/// The documented default structure: neutral continuation, no extraction,
/// default action, step unchanged.
pub fn safe_default_reply(current_step: &str) -> SellerReply {
    SellerReply {
        kind: ResponseKind::Consultation,
        message: DEFAULT_MESSAGE.to_string(),
        waiting_for: Some(current_step.to_string()),
        extracted: Interest::default(),
        mentioned_vehicles: Vec::new(),
        appointment_date: None,
        vehicle_reference: None,
    }
}

/// Total mapping from the model's action tag to a response kind.
///
/// `confirmar_cita` without a date demotes to `ScheduleAppointment`; any
/// unknown tag is a plain consultation.
pub fn classify_action(action: &str, appointment_date: Option<&str>) -> ResponseKind {
    match action.trim() {
        "mostrar_vehiculos" => ResponseKind::ShowVehicles,
        "agendar_cita" => ResponseKind::ScheduleAppointment,
        "confirmar_cita" => {
            if appointment_date.is_some_and(|d| !d.trim().is_empty()) {
                ResponseKind::AppointmentConfirmed
            } else {
                ResponseKind::ScheduleAppointment
            }
        }
        "enviar_imagenes" => ResponseKind::SendImages,
        _ => ResponseKind::Consultation,
    }
}

/// Locate the outermost JSON object in raw model output.
///
/// Strips markdown code fences first, then brace-matches from the first
/// `{`, respecting string literals and escapes.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let stripped = strip_code_fences(raw);
    let start = stripped.find('{')?;
    let bytes = stripped.as_bytes();

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, &byte) in bytes[start..].iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match byte {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&stripped[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag line and the closing fence.
    let body = rest.split_once('\n').map(|(_, b)| b).unwrap_or(rest);
    body.rsplit_once("```").map(|(b, _)| b).unwrap_or(body).trim()
}

/// Enforce the maximum reply length.
///
/// Over-long replies keep their first sentence plus the shortest embedded
/// question; with no question present, a generic follow-up is appended.
pub fn truncate_reply(message: &str, max_chars: usize) -> String {
    if message.chars().count() <= max_chars {
        return message.to_string();
    }

    let sentences = split_sentences(message);
    let first = sentences.first().cloned().unwrap_or_default();

    let shortest_question = sentences
        .iter()
        .skip(1)
        .filter(|s| s.contains('?'))
        .min_by_key(|s| s.chars().count());

    match shortest_question {
        Some(question) => format!("{first} {question}"),
        None if first.contains('?') => first,
        None => format!("{first} {DEFAULT_FOLLOW_UP}"),
    }
}

/// Split into sentences, keeping terminators attached.
fn split_sentences(message: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    for c in message.chars() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') {
            let trimmed = current.trim();
            if !trimmed.is_empty() {
                sentences.push(trimmed.to_string());
            }
            current.clear();
        }
    }
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
    sentences
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(extra: &str) -> String {
        format!(
            r#"{{"message": "Te tengo una belleza de carro", "next_action": "mostrar_vehiculos", "waiting_for": "eleccion_vehiculo", "vehiculos_mostrados": ["VEH001"]{extra}}}"#
        )
    }

    #[test]
    fn parses_plain_envelope() {
        let reply = parse_reply(&envelope(""), "consulta_general", 900);
        assert_eq!(reply.kind, ResponseKind::ShowVehicles);
        assert_eq!(reply.message, "Te tengo una belleza de carro");
        assert_eq!(reply.waiting_for.as_deref(), Some("eleccion_vehiculo"));
        assert_eq!(reply.mentioned_vehicles, vec!["VEH001"]);
    }

    #[test]
    fn parses_envelope_inside_code_fences() {
        let raw = format!("```json\n{}\n```", envelope(""));
        let reply = parse_reply(&raw, "consulta_general", 900);
        assert_eq!(reply.kind, ResponseKind::ShowVehicles);
    }

    #[test]
    fn parses_envelope_with_surrounding_prose() {
        let raw = format!("Claro, aquí está mi respuesta:\n{}\nEspero sirva.", envelope(""));
        let reply = parse_reply(&raw, "consulta_general", 900);
        assert_eq!(reply.message, "Te tengo una belleza de carro");
    }

    #[test]
    fn handles_braces_inside_strings() {
        let raw = r#"{"message": "mira {esto}", "next_action": "continuar_consulta"}"#;
        let reply = parse_reply(raw, "x", 900);
        assert_eq!(reply.message, "mira {esto}");
    }

    #[test]
    fn unparseable_output_yields_safe_default() {
        let reply = parse_reply("lo siento, no puedo", "eleccion_vehiculo", 900);
        assert_eq!(reply.kind, ResponseKind::Consultation);
        assert_eq!(reply.waiting_for.as_deref(), Some("eleccion_vehiculo"));
        assert!(reply.extracted == Interest::default());
        assert!(!reply.message.is_empty());
    }

    #[test]
    fn empty_message_replaced_with_default() {
        let raw = r#"{"message": "", "next_action": "continuar_consulta"}"#;
        let reply = parse_reply(raw, "x", 900);
        assert_eq!(reply.message, DEFAULT_MESSAGE);
    }

    #[test]
    fn classification_is_total() {
        assert_eq!(
            classify_action("mostrar_vehiculos", None),
            ResponseKind::ShowVehicles
        );
        assert_eq!(
            classify_action("agendar_cita", None),
            ResponseKind::ScheduleAppointment
        );
        assert_eq!(
            classify_action("confirmar_cita", Some("2026-08-10")),
            ResponseKind::AppointmentConfirmed
        );
        // Confirmation without a date cannot confirm.
        assert_eq!(
            classify_action("confirmar_cita", None),
            ResponseKind::ScheduleAppointment
        );
        assert_eq!(
            classify_action("enviar_imagenes", None),
            ResponseKind::SendImages
        );
        assert_eq!(
            classify_action("algo_desconocido", None),
            ResponseKind::Consultation
        );
        assert_eq!(classify_action("", None), ResponseKind::Consultation);
    }

    #[test]
    fn budget_accepts_number_and_string() {
        let raw = r#"{"message": "ok", "extracted_data": {"presupuesto_max": 45000000}}"#;
        let reply = parse_reply(raw, "x", 900);
        assert_eq!(reply.extracted.max_budget, Some(45_000_000));

        let raw = r#"{"message": "ok", "extracted_data": {"presupuesto_max": "45.000.000"}}"#;
        let reply = parse_reply(raw, "x", 900);
        assert_eq!(reply.extracted.max_budget, Some(45_000_000));
    }

    #[test]
    fn long_reply_keeps_first_sentence_and_shortest_question() {
        let message = "Este carro es una belleza total con motor impecable. \
                       Tiene historia larga de un solo dueño y mantenimiento al día. \
                       ¿Quieres verlo mañana? \
                       ¿O prefieres que te mande primero todas las fotos y la ficha técnica completa?";
        let truncated = truncate_reply(message, 80);
        assert!(truncated.starts_with("Este carro es una belleza total"));
        assert!(truncated.ends_with("¿Quieres verlo mañana?"));
        assert!(!truncated.contains("ficha técnica"));
    }

    #[test]
    fn long_reply_without_question_gains_follow_up() {
        let message = "Primera frase sobre el carro y sus detalles. \
                       Segunda frase que sigue contando cosas del motor. \
                       Tercera frase más de relleno para pasar el límite.";
        let truncated = truncate_reply(message, 60);
        assert!(truncated.ends_with(DEFAULT_FOLLOW_UP));
    }

    #[test]
    fn short_reply_is_untouched() {
        assert_eq!(truncate_reply("Hola parcero.", 900), "Hola parcero.");
    }
}
