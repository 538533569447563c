// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted speech synthesizer and transcriber.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use autolote_core::{AutoloteError, SpeechSynthesizer, Tone, Transcriber, VoiceAsset};

/// Scripted [`SpeechSynthesizer`]: counts syntheses, records deletions.
#[derive(Default)]
pub struct ScriptedVoice {
    fail_synthesis: AtomicBool,
    synthesized: AtomicUsize,
    deleted: Mutex<Vec<String>>,
}

impl ScriptedVoice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent synthesis fail.
    pub fn fail_synthesis(&self, fail: bool) {
        self.fail_synthesis.store(fail, Ordering::Relaxed);
    }

    pub fn synthesized_count(&self) -> usize {
        self.synthesized.load(Ordering::SeqCst)
    }

    /// Object names passed to `delete_asset`, in order.
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for ScriptedVoice {
    async fn synthesize(&self, _text: &str, _tone: Tone) -> Result<VoiceAsset, AutoloteError> {
        if self.fail_synthesis.load(Ordering::Relaxed) {
            return Err(AutoloteError::Speech {
                message: "scripted synthesis failure".into(),
                source: None,
            });
        }
        let n = self.synthesized.fetch_add(1, Ordering::SeqCst);
        Ok(VoiceAsset {
            public_url: format!("https://store/bucket/Autos-ST/audio_{n}.mp3"),
            object_name: format!("Autos-ST/audio_{n}.mp3"),
        })
    }

    async fn delete_asset(&self, object_name: &str) -> Result<(), AutoloteError> {
        self.deleted.lock().unwrap().push(object_name.to_string());
        Ok(())
    }

    fn classify_tone(&self, _text: &str) -> Tone {
        Tone::ProductInfo
    }
}

/// Scripted [`Transcriber`]: pops queued results, then repeats a default.
pub struct ScriptedTranscriber {
    script: Mutex<VecDeque<Result<String, AutoloteError>>>,
    default_transcript: Option<String>,
    calls: AtomicUsize,
}

impl ScriptedTranscriber {
    /// Transcriber that always succeeds with `transcript`.
    pub fn succeeding(transcript: &str) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            default_transcript: Some(transcript.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Transcriber that always fails.
    pub fn failing() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            default_transcript: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn push_result(&self, result: Result<String, AutoloteError>) {
        self.script.lock().unwrap().push_back(result);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transcriber for ScriptedTranscriber {
    async fn transcribe(&self, _media_url: &str) -> Result<String, AutoloteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(result) = self.script.lock().unwrap().pop_front() {
            return result;
        }
        match &self.default_transcript {
            Some(transcript) => Ok(transcript.clone()),
            None => Err(AutoloteError::Speech {
                message: "scripted transcription failure".into(),
                source: None,
            }),
        }
    }
}
