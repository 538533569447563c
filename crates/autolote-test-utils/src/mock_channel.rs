// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recording messaging channel for deterministic tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use autolote_core::{AutoloteError, MessagingChannel};

/// Records every send; individual operations can be scripted to fail.
#[derive(Default)]
pub struct RecordingChannel {
    texts: Mutex<Vec<(String, String)>>,
    audios: Mutex<Vec<(String, String)>>,
    images: Mutex<Vec<(String, String, String)>>,
    fail_text: AtomicBool,
    fail_audio: AtomicBool,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent text send fail.
    pub fn fail_text(&self, fail: bool) {
        self.fail_text.store(fail, Ordering::Relaxed);
    }

    /// Make every subsequent audio send fail.
    pub fn fail_audio(&self, fail: bool) {
        self.fail_audio.store(fail, Ordering::Relaxed);
    }

    /// Recorded `(to, body)` text sends, in order.
    pub fn texts(&self) -> Vec<(String, String)> {
        self.texts.lock().unwrap().clone()
    }

    /// Recorded `(to, audio_url)` audio sends, in order.
    pub fn audios(&self) -> Vec<(String, String)> {
        self.audios.lock().unwrap().clone()
    }

    /// Recorded `(to, image_url, caption)` image sends, in order.
    pub fn images(&self) -> Vec<(String, String, String)> {
        self.images.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessagingChannel for RecordingChannel {
    async fn send_text(&self, to: &str, body: &str) -> Result<(), AutoloteError> {
        if self.fail_text.load(Ordering::Relaxed) {
            return Err(AutoloteError::Channel {
                message: "scripted text failure".into(),
                source: None,
            });
        }
        self.texts
            .lock()
            .unwrap()
            .push((to.to_string(), body.to_string()));
        Ok(())
    }

    async fn send_audio_url(&self, to: &str, audio_url: &str) -> Result<(), AutoloteError> {
        if self.fail_audio.load(Ordering::Relaxed) {
            return Err(AutoloteError::Channel {
                message: "scripted audio failure".into(),
                source: None,
            });
        }
        self.audios
            .lock()
            .unwrap()
            .push((to.to_string(), audio_url.to_string()));
        Ok(())
    }

    async fn send_image_url(
        &self,
        to: &str,
        image_url: &str,
        caption: &str,
    ) -> Result<(), AutoloteError> {
        self.images.lock().unwrap().push((
            to.to_string(),
            image_url.to_string(),
            caption.to_string(),
        ));
        Ok(())
    }
}
