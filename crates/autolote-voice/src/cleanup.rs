// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text cleanup before speech synthesis.
//!
//! Chat replies carry emoji, markdown, and chat-style abbreviations that
//! read badly aloud. This module strips the non-speech symbols, converts
//! line breaks into pause punctuation, and expands domain abbreviations
//! into their spoken Spanish forms.

use std::sync::LazyLock;

use regex::Regex;

static EMOJI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        "[\\x{1F300}-\\x{1F5FF}\\x{1F600}-\\x{1F64F}\\x{1F680}-\\x{1F6FF}\\x{1F900}-\\x{1F9FF}\\x{2600}-\\x{26FF}\\x{2700}-\\x{27BF}\\x{1F1E0}-\\x{1F1FF}]",
    )
    .expect("emoji regex")
});

static BULLETS: LazyLock<Regex> = LazyLock::new(|| Regex::new("[•▪▫◦‣⁃]").expect("bullet regex"));

static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold regex"));

static ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*(.*?)\*").expect("italic regex"));

static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{2,}").expect("paragraph regex"));

static KM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bkm\b").expect("km regex"));

static REF_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bRef:\s*").expect("ref regex"));

static VEHICLE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bVEH(\d+)").expect("vehicle code regex"));

static AM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bAM\b").expect("am regex"));
static PM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bPM\b").expect("pm regex"));

static PRICE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$(\d+)").expect("price regex"));

static DOUBLE_DOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.\s*\.").expect("double dot regex"));
static DOUBLE_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*,").expect("double comma regex"));
static SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("spaces regex"));

/// Prepare a chat reply for speech synthesis.
pub fn clean_for_speech(text: &str) -> String {
    let mut clean = EMOJI.replace_all(text, "").into_owned();
    clean = BULLETS.replace_all(&clean, "").into_owned();

    // Unwrap markdown emphasis.
    clean = BOLD.replace_all(&clean, "$1").into_owned();
    clean = ITALIC.replace_all(&clean, "$1").into_owned();

    // Line breaks become pauses: long for paragraphs, short for lines.
    clean = PARAGRAPH_BREAK.replace_all(&clean, ". ").into_owned();
    clean = clean.replace('\n', ", ");

    // Spoken Spanish expansions.
    clean = KM.replace_all(&clean, "kilómetros").into_owned();
    clean = clean.replace("m²", "metros cuadrados");
    clean = REF_LABEL.replace_all(&clean, "referencia ").into_owned();
    clean = VEHICLE_CODE.replace_all(&clean, "vehículo $1").into_owned();
    clean = AM.replace_all(&clean, "de la mañana").into_owned();
    clean = PM.replace_all(&clean, "de la tarde").into_owned();
    clean = PRICE.replace_all(&clean, "$1 pesos").into_owned();

    // Collapse punctuation artifacts left by the rewrites.
    clean = DOUBLE_DOT.replace_all(&clean, ".").into_owned();
    clean = DOUBLE_COMMA.replace_all(&clean, ",").into_owned();
    clean = SPACES.replace_all(&clean, " ").into_owned();

    clean.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_emoji_and_bullets() {
        let clean = clean_for_speech("¡Ey! 😊 Mira:\n• opción uno 🚗");
        assert!(!clean.contains('😊'));
        assert!(!clean.contains('🚗'));
        assert!(!clean.contains('•'));
    }

    #[test]
    fn unwraps_markdown() {
        assert_eq!(clean_for_speech("es **una belleza** de *carro*"),
            "es una belleza de carro");
    }

    #[test]
    fn expands_domain_abbreviations() {
        let clean = clean_for_speech("Tiene 45000 km, Ref: VEH042, por $75000000");
        assert!(clean.contains("45000 kilómetros"));
        assert!(clean.contains("referencia vehículo 042"));
        assert!(clean.contains("75000000 pesos"));
    }

    #[test]
    fn expands_meridiem_markers() {
        let clean = clean_for_speech("Nos vemos a las 10 AM o a las 3 PM");
        assert!(clean.contains("10 de la mañana"));
        assert!(clean.contains("3 de la tarde"));
    }

    #[test]
    fn newlines_become_pauses() {
        let clean = clean_for_speech("Primera línea\nsegunda línea\n\nNuevo párrafo");
        assert!(clean.contains("Primera línea, segunda línea"));
        assert!(clean.contains(". Nuevo párrafo"));
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(clean_for_speech("hola    mundo  "), "hola mundo");
    }

    #[test]
    fn emoji_only_message_cleans_to_empty() {
        assert_eq!(clean_for_speech("😊👋🎉"), "");
    }
}
