// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The message-debounce and sequential-conversation-turn controller.
//!
//! Coalesces bursts of inbound messages per sender into one logical turn,
//! guarantees at most one concurrent turn per conversation, and drives each
//! turn through transcription, context build, LLM call, persistence, and
//! dispatch, with an in-persona apology on any failure.
//!
//! Per-sender mutual exclusion rests on the `in_flight` flag, flipped only
//! while holding the conversation's map guard so the buffer swap and the
//! flag change are atomic. No guard is ever held across an await point.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use autolote_channel::{DeliveryOptions, Dispatcher};
use autolote_core::{
    canonical_phone, AppointmentNotifier, AutoloteError, BatchPolicy, HistoryEntry,
    InventoryProvider, LeadStatus, LeadStore, LlmError, PendingMessage, ReplySynthesizer,
    ResponseKind, SellerReply, TaskRegistry, Tone, Transcriber,
};
use chrono::Utc;
use dashmap::DashMap;
use tracing::{debug, error, info, warn};

use crate::conversation::{select_text, Conversation, ConversationSnapshot};
use crate::lead;
use crate::persona::{
    ApologyPicker, EMPTY_MESSAGE_REPLY, IMAGE_REFERENCE_MISSING_REPLY,
    TRANSCRIPTION_FAILED_REPLY,
};

/// Policy knobs for the turn controller.
#[derive(Debug, Clone)]
pub struct TurnControllerConfig {
    pub persona_name: String,
    /// Delay between the first buffered message and turn start.
    pub debounce_window: Duration,
    pub batch_policy: BatchPolicy,
    /// Delay before the appointment fan-out fires, letting persistence land.
    pub notification_delay: Duration,
    /// Inactivity span after which an idle conversation entry is evicted.
    pub idle_eviction: Duration,
}

impl Default for TurnControllerConfig {
    fn default() -> Self {
        Self {
            persona_name: "Carlos".to_string(),
            debounce_window: Duration::from_secs(2),
            batch_policy: BatchPolicy::LatestOnly,
            notification_delay: Duration::from_secs(2),
            idle_eviction: Duration::from_secs(6 * 60 * 60),
        }
    }
}

struct Inner {
    config: TurnControllerConfig,
    store: Arc<dyn LeadStore>,
    synthesizer: Arc<dyn ReplySynthesizer>,
    inventory: Arc<dyn InventoryProvider>,
    dispatcher: Dispatcher,
    transcriber: Option<Arc<dyn Transcriber>>,
    notifier: Arc<dyn AppointmentNotifier>,
    conversations: DashMap<String, Conversation>,
    apologies: Mutex<ApologyPicker>,
    tasks: TaskRegistry,
}

/// Classified turn failure, routed to the matching apology table.
struct TurnFailure {
    overloaded: bool,
    error: AutoloteError,
}

impl From<AutoloteError> for TurnFailure {
    fn from(error: AutoloteError) -> Self {
        Self {
            overloaded: false,
            error,
        }
    }
}

/// Owner of all per-sender conversation state and the turn pipeline.
#[derive(Clone)]
pub struct TurnController {
    inner: Arc<Inner>,
}

impl TurnController {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: TurnControllerConfig,
        store: Arc<dyn LeadStore>,
        synthesizer: Arc<dyn ReplySynthesizer>,
        inventory: Arc<dyn InventoryProvider>,
        dispatcher: Dispatcher,
        transcriber: Option<Arc<dyn Transcriber>>,
        notifier: Arc<dyn AppointmentNotifier>,
        tasks: TaskRegistry,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                store,
                synthesizer,
                inventory,
                dispatcher,
                transcriber,
                notifier,
                conversations: DashMap::new(),
                apologies: Mutex::new(ApologyPicker::new()),
                tasks,
            }),
        }
    }

    /// Pin the apology RNG seed for deterministic tests.
    pub fn with_apology_seed(self, seed: u64) -> Self {
        *self.inner.apologies.lock().expect("apology picker poisoned") =
            ApologyPicker::with_seed(seed);
        self
    }

    /// The shared background-task registry this controller spawns into.
    pub fn task_registry(&self) -> TaskRegistry {
        self.inner.tasks.clone()
    }

    pub fn persona_name(&self) -> &str {
        &self.inner.config.persona_name
    }

    /// Enqueue one inbound message for a sender.
    ///
    /// Starts the debounce timer when the sender is idle; messages arriving
    /// while a turn is in flight wait in a fresh buffer for the next turn.
    pub fn enqueue(&self, sender: &str, text: String, is_audio: bool, media_url: Option<String>) {
        let phone = canonical_phone(sender);
        let message = PendingMessage {
            text,
            is_audio,
            media_url,
            received_at: Utc::now(),
        };

        let arm = {
            let mut entry = self
                .inner
                .conversations
                .entry(phone.clone())
                .or_insert_with(Conversation::new);
            entry.pending.push(message);
            entry.last_activity = Some(Utc::now());
            if !entry.in_flight && !entry.timer_armed {
                entry.timer_armed = true;
                true
            } else {
                false
            }
        };

        debug!(phone = %phone, arm_timer = arm, "inbound message buffered");
        if arm {
            arm_debounce(Arc::clone(&self.inner), phone);
        }
    }

    /// Snapshot of every live conversation entry.
    pub fn conversations(&self) -> Vec<ConversationSnapshot> {
        self.inner
            .conversations
            .iter()
            .map(|entry| ConversationSnapshot {
                phone: entry.key().clone(),
                queued_messages: entry.pending.len(),
                in_flight: entry.in_flight,
                last_activity: entry.last_activity,
            })
            .collect()
    }

    /// Drop a sender's in-memory buffer entry (admin clear-data).
    pub fn remove_conversation(&self, sender: &str) -> bool {
        self.inner
            .conversations
            .remove(&canonical_phone(sender))
            .is_some()
    }

    /// Evict conversation entries idle longer than the configured span.
    ///
    /// Returns the number of entries dropped. Entries with buffered
    /// messages or a turn in flight are never evicted.
    pub fn evict_idle(&self) -> usize {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(self.inner.config.idle_eviction)
                .unwrap_or_else(|_| chrono::Duration::hours(6));

        let before = self.inner.conversations.len();
        self.inner
            .conversations
            .retain(|_, conv| !(conv.is_idle() && conv.last_activity.is_none_or(|t| t < cutoff)));
        let evicted = before - self.inner.conversations.len();
        if evicted > 0 {
            info!(evicted, "idle conversation entries evicted");
        }
        evicted
    }

    /// Periodic eviction loop; spawn this from the serve entry point.
    pub async fn run_eviction_sweep(self, every: Duration) {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.evict_idle();
        }
    }
}

/// Arm the debounce timer for a sender; the turn runs when it elapses.
fn arm_debounce(inner: Arc<Inner>, phone: String) {
    let window = inner.config.debounce_window;
    let tasks = inner.tasks.clone();
    tasks.spawn(async move {
        tokio::time::sleep(window).await;
        run_turn(inner, phone).await;
    });
}

/// One PROCESSING activation: drain, pipeline, apologize on failure, release.
async fn run_turn(inner: Arc<Inner>, phone: String) {
    // Atomically swap the buffer for an empty one and claim the turn.
    let batch = {
        let Some(mut entry) = inner.conversations.get_mut(&phone) else {
            return;
        };
        entry.timer_armed = false;
        if entry.in_flight {
            return;
        }
        let batch = std::mem::take(&mut entry.pending);
        if batch.is_empty() {
            return;
        }
        entry.in_flight = true;
        batch
    };

    debug!(phone = %phone, messages = batch.len(), "turn started");

    if let Err(failure) = execute_pipeline(&inner, &phone, batch).await {
        error!(
            phone = %phone,
            error = %failure.error,
            overloaded = failure.overloaded,
            "turn failed, dispatching apology"
        );
        let apology = {
            let mut picker = inner.apologies.lock().expect("apology picker poisoned");
            if failure.overloaded {
                picker.pick_overload()
            } else {
                picker.pick_general()
            }
        };
        if let Err(e) = inner
            .dispatcher
            .deliver(&phone, apology, DeliveryOptions::default())
            .await
        {
            error!(phone = %phone, error = %e, "apology dispatch failed");
        }
    }

    // Release PROCESSING. A buffer filled during the turn starts a fresh
    // BUFFERING phase immediately -- a failed turn never strands a sender.
    let rearm = {
        let Some(mut entry) = inner.conversations.get_mut(&phone) else {
            return;
        };
        entry.in_flight = false;
        if !entry.pending.is_empty() && !entry.timer_armed {
            entry.timer_armed = true;
            true
        } else {
            false
        }
    };
    debug!(phone = %phone, rearm, "turn finished");
    if rearm {
        arm_debounce(inner, phone);
    }
}

async fn execute_pipeline(
    inner: &Arc<Inner>,
    phone: &str,
    batch: Vec<PendingMessage>,
) -> Result<(), TurnFailure> {
    let Some(latest) = batch.last().cloned() else {
        return Ok(());
    };

    // Steps 1-2: working text, transcribing the latest item when it is audio.
    let working_text = if latest.is_audio {
        match transcribe_latest(inner, &latest).await {
            Some(transcript) => transcript,
            None => {
                // Fixed reply, forced text, no LLM call, step unchanged.
                inner
                    .dispatcher
                    .deliver(phone, TRANSCRIPTION_FAILED_REPLY, DeliveryOptions::default())
                    .await
                    .map_err(TurnFailure::from)?;
                return Ok(());
            }
        }
    } else {
        select_text(&batch, inner.config.batch_policy)
    };

    if working_text.trim().is_empty() {
        inner
            .dispatcher
            .deliver(phone, EMPTY_MESSAGE_REPLY, DeliveryOptions::default())
            .await
            .map_err(TurnFailure::from)?;
        return Ok(());
    }

    // Step 3: find-or-create the lead record.
    let mut lead = lead::find_or_create(inner.store.as_ref(), phone)
        .await
        .map_err(TurnFailure::from)?;

    // Step 4: conversational context inputs.
    let inventory = match inner.inventory.snapshot().await {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            warn!(phone = %phone, error = %e, "inventory unavailable for this turn");
            None
        }
    };

    // Step 5: synthesize the structured reply.
    let reply = inner
        .synthesizer
        .generate(&working_text, &lead, inventory.as_ref())
        .await
        .map_err(|e| TurnFailure {
            overloaded: matches!(e, LlmError::Overloaded(_)),
            error: e.into(),
        })?;

    // Steps 6-8: fold the turn into the lead record and persist.
    let now = Utc::now();
    lead.process.push_history(HistoryEntry {
        timestamp: now,
        user_message: working_text.clone(),
        bot_message: reply.message.clone(),
        action: reply.kind.to_string(),
        was_audio: latest.is_audio,
    });
    lead.interest.merge_from(&reply.extracted);
    if let Some(step) = &reply.waiting_for {
        lead.process.current_step = step.clone();
    }
    lead.process.last_activity_at = now;

    // Step 9: appointment confirmation.
    if reply.kind == ResponseKind::AppointmentConfirmed {
        lead.process.status = LeadStatus::AppointmentScheduled;
        lead.process.appointment_date = reply.appointment_date.clone();
        if lead.process.appointment_vehicle.is_none() {
            lead.process.appointment_vehicle = reply
                .vehicle_reference
                .clone()
                .or_else(|| reply.mentioned_vehicles.first().cloned());
        }
    }

    inner
        .store
        .update(phone, &lead)
        .await
        .map_err(TurnFailure::from)?;

    if reply.kind == ResponseKind::AppointmentConfirmed {
        info!(phone = %phone, lead_id = %lead.id, "appointment scheduled");
        schedule_notification(inner, phone.to_string());
    }

    // Step 10: dispatch the reply, then any image side-channel.
    let tone = match reply.kind {
        ResponseKind::AppointmentConfirmed | ResponseKind::ScheduleAppointment => {
            Some(Tone::Appointment)
        }
        _ => None,
    };
    inner
        .dispatcher
        .deliver(
            phone,
            &reply.message,
            DeliveryOptions {
                as_audio: true,
                tone,
            },
        )
        .await
        .map_err(TurnFailure::from)?;

    if reply.kind == ResponseKind::SendImages {
        send_requested_images(inner, phone, &reply).await?;
    }

    Ok(())
}

/// Transcribe the latest buffered item. `None` means "short-circuit the
/// turn with the could-not-understand reply".
async fn transcribe_latest(inner: &Arc<Inner>, latest: &PendingMessage) -> Option<String> {
    let media_url = latest.media_url.as_deref()?;
    let transcriber = inner.transcriber.as_ref()?;
    match transcriber.transcribe(media_url).await {
        Ok(transcript) if !transcript.trim().is_empty() => Some(transcript),
        Ok(_) => {
            warn!("transcription produced empty text");
            None
        }
        Err(e) => {
            warn!(error = %e, "transcription failed");
            None
        }
    }
}

/// Delayed fire-and-forget fan-out after an appointment confirmation.
///
/// Re-reads the lead so the notification carries the persisted record.
fn schedule_notification(inner: &Arc<Inner>, phone: String) {
    let store = Arc::clone(&inner.store);
    let notifier = Arc::clone(&inner.notifier);
    inner.tasks.spawn_after(inner.config.notification_delay, async move {
        match store.find_by_phone(&phone).await {
            Ok(Some(fresh)) => {
                if let Err(e) = notifier.notify_appointment(&fresh).await {
                    warn!(phone = %phone, error = %e, "appointment fan-out failed");
                }
            }
            Ok(None) => warn!(phone = %phone, "lead missing at fan-out time"),
            Err(e) => warn!(phone = %phone, error = %e, "could not re-read lead for fan-out"),
        }
    });
}

/// Image side-channel: resolve the referenced vehicle and send its photos,
/// or ask the user for a reference when none resolves.
async fn send_requested_images(
    inner: &Arc<Inner>,
    phone: &str,
    reply: &SellerReply,
) -> Result<(), TurnFailure> {
    let reference = reply
        .vehicle_reference
        .clone()
        .or_else(|| reply.mentioned_vehicles.first().cloned());

    let vehicle = match &reference {
        Some(reference) => match inner.inventory.vehicle_by_reference(reference).await {
            Ok(found) => found,
            Err(e) => {
                warn!(phone = %phone, reference = %reference, error = %e, "vehicle lookup failed");
                None
            }
        },
        None => None,
    };

    match vehicle {
        Some(vehicle) if !vehicle.images.is_empty() => {
            inner
                .dispatcher
                .send_vehicle_images(phone, &vehicle)
                .await
                .map_err(TurnFailure::from)?;
            Ok(())
        }
        _ => {
            inner
                .dispatcher
                .deliver(phone, IMAGE_REFERENCE_MISSING_REPLY, DeliveryOptions::default())
                .await
                .map_err(TurnFailure::from)?;
            Ok(())
        }
    }
}
