// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted reply synthesizer with concurrency accounting.
//!
//! Results are popped from a FIFO queue; when the queue is empty a neutral
//! consultation reply is returned. The active-call counter lets tests
//! assert that turns for one sender never overlap.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use autolote_core::{
    Interest, InventorySnapshot, Lead, LlmError, ReplySynthesizer, ResponseKind, SellerReply,
};

/// Build a plain consultation reply.
pub fn consultation_reply(message: &str) -> SellerReply {
    SellerReply {
        kind: ResponseKind::Consultation,
        message: message.to_string(),
        waiting_for: Some("consulta_general".to_string()),
        extracted: Interest::default(),
        mentioned_vehicles: Vec::new(),
        appointment_date: None,
        vehicle_reference: None,
    }
}

/// Build an appointment-confirmed reply for the given date.
pub fn appointment_reply(message: &str, date: &str) -> SellerReply {
    SellerReply {
        kind: ResponseKind::AppointmentConfirmed,
        message: message.to_string(),
        waiting_for: Some("cita_confirmada".to_string()),
        extracted: Interest::default(),
        mentioned_vehicles: Vec::new(),
        appointment_date: Some(date.to_string()),
        vehicle_reference: None,
    }
}

/// Build a send-images reply pointing at a vehicle reference.
pub fn images_reply(message: &str, reference: Option<&str>) -> SellerReply {
    SellerReply {
        kind: ResponseKind::SendImages,
        message: message.to_string(),
        waiting_for: Some("consulta_general".to_string()),
        extracted: Interest::default(),
        mentioned_vehicles: Vec::new(),
        appointment_date: None,
        vehicle_reference: reference.map(str::to_string),
    }
}

/// Scripted [`ReplySynthesizer`] for tests.
#[derive(Default)]
pub struct ScriptedSynthesizer {
    script: Mutex<VecDeque<Result<SellerReply, LlmError>>>,
    inputs: Mutex<Vec<String>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl ScriptedSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long inside every `generate` call, so tests can interleave
    /// other work while a turn is mid-processing (pair with paused time).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn push_reply(&self, reply: SellerReply) {
        self.script.lock().unwrap().push_back(Ok(reply));
    }

    pub fn push_error(&self, error: LlmError) {
        self.script.lock().unwrap().push_back(Err(error));
    }

    /// Total number of `generate` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of concurrently active `generate` calls observed.
    pub fn max_concurrency(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    /// Every `user_text` passed to `generate`, in call order.
    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReplySynthesizer for ScriptedSynthesizer {
    async fn generate(
        &self,
        user_text: &str,
        _lead: &Lead,
        _inventory: Option<&InventorySnapshot>,
    ) -> Result<SellerReply, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inputs.lock().unwrap().push(user_text.to_string());

        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let result = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(consultation_reply("respuesta de prueba")));

        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
