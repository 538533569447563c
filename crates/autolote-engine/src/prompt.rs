// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persona prompt assembly.
//!
//! Builds the system prompt embedding the salesperson persona, the lead's
//! accumulated slot state, a bounded inventory excerpt, and the structured
//! output contract.

use autolote_core::{InventorySnapshot, Lead};

/// Maximum number of listings embedded in the prompt.
const INVENTORY_EXCERPT_LIMIT: usize = 20;

/// Maximum number of past exchanges embedded in the prompt.
const HISTORY_EXCERPT_LIMIT: usize = 4;

/// Build the system prompt for one turn.
pub fn build_system_prompt(
    persona_name: &str,
    lead: &Lead,
    inventory: Option<&InventorySnapshot>,
) -> String {
    let interest_json = serde_json::to_string_pretty(&lead.interest)
        .unwrap_or_else(|_| "{}".to_string());

    let inventory_section = match inventory {
        Some(snapshot) => {
            let listings = snapshot
                .vehicles
                .iter()
                .take(INVENTORY_EXCERPT_LIMIT)
                .map(|v| format!("- {} - Ref: {}", v.short_description(), v.reference))
                .collect::<Vec<_>>()
                .join("\n");
            format!(
                "Total vehículos en el lote: {}\nMarcas que tenemos: {}\n\nCARROS DISPONIBLES:\n{listings}",
                snapshot.vehicles.len(),
                snapshot.brands.join(", ")
            )
        }
        None => "Inventario no disponible temporalmente".to_string(),
    };

    let history_section = if lead.process.history.is_empty() {
        "Sin conversación previa.".to_string()
    } else {
        lead.process
            .history
            .iter()
            .rev()
            .take(HISTORY_EXCERPT_LIMIT)
            .rev()
            .map(|entry| {
                format!(
                    "Cliente: {}\n{persona_name}: {}",
                    entry.user_message, entry.bot_message
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        r#"Eres {persona_name}, un vendedor colombiano de carros usados con más de 15 años de experiencia. Eres súper natural, carismático, confiable y tienes mucha labia para vender, pero de manera auténtica y honesta.

Tu personalidad:
- Hablas como un colombiano real, usando expresiones naturales
- Eres cálido, amigable pero profesional
- Te gusta hacer sentir al cliente como si fuera tu parcero
- No suenas robótico ni demasiado formal
- Conoces muy bien los carros y das consejos útiles

INFORMACIÓN DEL CLIENTE:
- Teléfono: {phone}
- Nombre: {name}

INTERÉS ACTUAL DEL CLIENTE:
{interest_json}

INVENTARIO DISPONIBLE:
{inventory_section}

STEP ACTUAL: {step}

CONVERSACIÓN RECIENTE:
{history_section}

INSTRUCCIONES PARA RESPONDER:
1. Responde como {persona_name}, el vendedor carismático
2. Sé conversacional y natural - como si fueras un amigo recomendando carros
3. No uses listas con viñetas ni formatos robóticos
4. Cuando muestres opciones, hazlo de manera fluida en párrafos naturales
5. Pregunta cosas relevantes para entender mejor qué necesita
6. Mantén la conversación fluyendo hacia agendar una cita
7. Si el cliente pide fotos de un carro, usa la acción enviar_imagenes con la referencia
8. Usa emojis con moderación y de manera natural

RESPONDE ÚNICAMENTE EN FORMATO JSON:
{{
  "message": "tu respuesta súper natural como {persona_name}",
  "extracted_data": {{"marca": null, "modelo": null, "tipo_vehiculo": null, "presupuesto_max": null, "vehiculo_favorito": null, "vehiculos_consultados": [], "observaciones": null}},
  "next_action": "mostrar_vehiculos|agendar_cita|confirmar_cita|enviar_imagenes|continuar_consulta",
  "waiting_for": "paso_siguiente",
  "vehiculos_mostrados": [],
  "appointment_date": null,
  "vehiculo_referencia": null
}}"#,
        phone = lead.client.phone,
        name = lead.client.name,
        step = lead.process.current_step,
    )
}

/// Build the user prompt for one turn.
pub fn build_user_prompt(user_text: &str) -> String {
    format!(
        "El cliente dice: \"{user_text}\"\n\nResponde como el vendedor natural y carismático. \
         Mantén la continuidad con la conversación previa: no repitas información que ya \
         conoces, construye sobre lo que ya han hablado."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use autolote_core::{ClientInfo, HistoryEntry, SalesProcess, Vehicle};
    use chrono::Utc;

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
                history: vec![HistoryEntry {
                    timestamp: now,
                    user_message: "Busco una camioneta".into(),
                    bot_message: "¡De una! Te tengo opciones".into(),
                    action: "mostrar_vehiculos".into(),
                    was_audio: false,
                }],
            },
        }
    }

    fn make_snapshot(count: usize) -> InventorySnapshot {
        InventorySnapshot {
            vehicles: (0..count)
                .map(|n| Vehicle {
                    reference: format!("VEH{n:03}"),
                    brand: "Toyota".into(),
                    model: "Corolla".into(),
                    mileage_km: Some("45000".into()),
                    ..Default::default()
                })
                .collect(),
            brands: vec!["Toyota".into()],
            models: vec!["Corolla".into()],
            types: vec![],
            last_update: Utc::now(),
        }
    }

    #[test]
    fn system_prompt_embeds_lead_state_and_inventory() {
        let prompt = build_system_prompt("Carlos", &make_lead(), Some(&make_snapshot(3)));
        assert!(prompt.contains("Eres Carlos"));
        assert!(prompt.contains("573001234567"));
        assert!(prompt.contains("STEP ACTUAL: consulta_general"));
        assert!(prompt.contains("Ref: VEH002"));
        assert!(prompt.contains("Busco una camioneta"));
    }

    #[test]
    fn inventory_excerpt_is_bounded() {
        let prompt = build_system_prompt("Carlos", &make_lead(), Some(&make_snapshot(50)));
        assert!(prompt.contains("Ref: VEH019"));
        assert!(!prompt.contains("Ref: VEH020"), "excerpt must stop at the cap");
        // The total count still reflects the full lot.
        assert!(prompt.contains("Total vehículos en el lote: 50"));
    }

    #[test]
    fn missing_inventory_degrades_gracefully() {
        let prompt = build_system_prompt("Carlos", &make_lead(), None);
        assert!(prompt.contains("Inventario no disponible temporalmente"));
    }

    #[test]
    fn user_prompt_quotes_the_message() {
        let prompt = build_user_prompt("¿Tienen camionetas?");
        assert!(prompt.contains("\"¿Tienen camionetas?\""));
    }
}
