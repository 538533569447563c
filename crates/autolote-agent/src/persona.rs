// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed persona strings: apologies, short-circuit replies, and the
//! conversation opener.
//!
//! Every failure the user ever sees comes from these tables, so the bot
//! stays in character no matter what broke internally. Selection is backed
//! by a seedable RNG so tests can pin the choice.

use autolote_core::InventorySnapshot;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Apologies for the LLM reporting itself overloaded.
pub const OVERLOAD_APOLOGIES: &[&str] = &[
    "Uy parcero, se me colgó el sistema un momentito 😅 ¿Me puedes repetir lo que me dijiste?",
    "Ay no, se me fue la conexión por un segundo. ¿Qué me estabas comentando?",
    "Perdón, el internet está medio loco hoy. ¿Me vuelves a decir qué necesitas?",
    "Disculpa la demora, se me trabó todo acá. ¿Cuál era tu pregunta?",
];

/// Apologies for any other turn failure.
pub const GENERAL_APOLOGIES: &[&str] = &[
    "Oye, se me complicó algo acá en el sistema. ¿Podrías decirme de nuevo qué necesitas?",
    "Perdón, parece que hubo un problemita técnico. ¿Me repites por favor?",
    "Ay, se me fue todo por un momento. ¿Qué me estabas preguntando?",
    "Disculpa, tuve una falla acá. ¿Me cuentas otra vez qué andas buscando?",
];

/// Fixed reply when an audio message cannot be transcribed.
pub const TRANSCRIPTION_FAILED_REPLY: &str =
    "No pude entender el audio, ¿puedes escribirme qué necesitas?";

/// Low-friction reply for an empty or unreadable message.
pub const EMPTY_MESSAGE_REPLY: &str = "No te entendí bien, ¿me repites por favor?";

/// Follow-up when an image request names no resolvable vehicle.
pub const IMAGE_REFERENCE_MISSING_REPLY: &str =
    "¿De cuál carro quieres las fotos? Pásame la referencia y te las mando de una.";

/// Rotating apology selection with a seedable RNG.
pub struct ApologyPicker {
    rng: StdRng,
}

impl ApologyPicker {
    /// Entropy-seeded picker for production.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Fixed-seed picker for deterministic tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn pick_general(&mut self) -> &'static str {
        GENERAL_APOLOGIES[self.rng.gen_range(0..GENERAL_APOLOGIES.len())]
    }

    pub fn pick_overload(&mut self) -> &'static str {
        OVERLOAD_APOLOGIES[self.rng.gen_range(0..OVERLOAD_APOLOGIES.len())]
    }
}

impl Default for ApologyPicker {
    fn default() -> Self {
        Self::new()
    }
}

/// The persona's opening message for a freshly started conversation.
pub fn opening_message(persona_name: &str, inventory: Option<&InventorySnapshot>) -> String {
    let (count, brands) = match inventory {
        Some(snapshot) => (
            snapshot.vehicles.len().to_string(),
            snapshot.brands.join(", "),
        ),
        None => (
            "50".to_string(),
            "Toyota, Chevrolet, Nissan, Ford".to_string(),
        ),
    };

    format!(
        "¡Ey! ¿Qué tal? Soy {persona_name} del concesionario 👋\n\n\
         Me da mucho gusto saludarte. Veo que andas buscando carro, ¿cierto? \
         Pues llegaste al lugar indicado porque tenemos unas opciones que te van a encantar.\n\n\
         Te cuento que tenemos más de {count} vehículos en el lote, de marcas como: {brands}.\n\n\
         ¿Qué te parece si me cuentas qué tipo de carro andas buscando? \
         ¿Es para la familia, para el trabajo, o qué tienes en mente?\n\n\
         Acá relajado conversamos y encontramos algo que te guste y que esté dentro de tu presupuesto 😊"
    )
}
