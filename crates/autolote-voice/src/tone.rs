// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prosody presets and lexical tone classification.

use autolote_core::Tone;
use serde::{Deserialize, Serialize};

/// ElevenLabs voice settings for one synthesis call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
    pub style: f32,
    pub use_speaker_boost: bool,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.65,
            similarity_boost: 0.75,
            style: 0.35,
            use_speaker_boost: true,
        }
    }
}

/// Partial override of the voice settings, applied on top of every preset.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub struct VoiceSettingsUpdate {
    pub stability: Option<f32>,
    pub similarity_boost: Option<f32>,
    pub style: Option<f32>,
}

impl VoiceSettingsUpdate {
    pub fn apply_to(&self, mut settings: VoiceSettings) -> VoiceSettings {
        if let Some(stability) = self.stability {
            settings.stability = stability;
        }
        if let Some(similarity_boost) = self.similarity_boost {
            settings.similarity_boost = similarity_boost;
        }
        if let Some(style) = self.style {
            settings.style = style;
        }
        settings
    }
}

/// Fixed prosody preset for each tone.
pub fn settings_for_tone(tone: Tone) -> VoiceSettings {
    let base = VoiceSettings::default();
    match tone {
        // More expressive and less stable for warm openers.
        Tone::Greeting => VoiceSettings {
            style: 0.45,
            stability: 0.60,
            similarity_boost: 0.70,
            ..base
        },
        Tone::ProductInfo => VoiceSettings {
            style: 0.30,
            stability: 0.70,
            similarity_boost: 0.75,
            ..base
        },
        Tone::Appointment => VoiceSettings {
            style: 0.40,
            stability: 0.65,
            similarity_boost: 0.70,
            ..base
        },
        // Calmer delivery for apologies.
        Tone::Error => VoiceSettings {
            style: 0.25,
            stability: 0.75,
            similarity_boost: 0.80,
            ..base
        },
        Tone::Enthusiasm => VoiceSettings {
            style: 0.55,
            stability: 0.55,
            similarity_boost: 0.65,
            ..base
        },
        Tone::Consultation => VoiceSettings {
            style: 0.25,
            stability: 0.75,
            similarity_boost: 0.80,
            ..base
        },
    }
}

/// Pick a tone from lexical cues in the message text.
///
/// Checked in priority order: enthusiasm beats greeting beats scheduling
/// beats technical consultation; everything else reads as product info.
pub fn classify_tone(text: &str) -> Tone {
    let lower = text.to_lowercase();
    let has_any = |cues: &[&str]| cues.iter().any(|cue| lower.contains(cue));

    if has_any(&["¡", "genial", "perfecto", "excelente", "increíble", "¡qué"]) {
        return Tone::Enthusiasm;
    }
    if has_any(&["hola", "buenas", "qué tal", "ey!"]) {
        return Tone::Greeting;
    }
    if has_any(&["cita", "agenda", "confirmo"]) {
        return Tone::Appointment;
    }
    if has_any(&["referencia", "kilómetros", "precio", "especificaciones"]) {
        return Tone::Consultation;
    }
    Tone::ProductInfo
}
