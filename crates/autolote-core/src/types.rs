// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Autolote workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Maximum number of conversation exchanges retained per lead.
///
/// Older entries are dropped first; see [`SalesProcess::push_history`].
pub const HISTORY_CAP: usize = 10;

/// Sales-process status of a lead.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LeadStatus {
    #[default]
    Active,
    AppointmentScheduled,
    Completed,
}

/// Identity fields for the person behind a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientInfo {
    /// Canonical phone key (see [`crate::phone::canonical_phone`]).
    pub phone: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub first_contact_at: DateTime<Utc>,
}

/// Interest slots accumulated from LLM extraction across turns.
///
/// The merge policy is additive: an already-filled slot is never
/// overwritten by a later extraction, and `None` never erases a value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Interest {
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub vehicle_type: Option<String>,
    #[serde(default)]
    pub max_budget: Option<u64>,
    #[serde(default)]
    pub favorite_vehicle: Option<String>,
    #[serde(default)]
    pub consulted_vehicles: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Interest {
    /// Merge newly extracted slots into this record.
    ///
    /// Existing values win; gaps are filled. `consulted_vehicles` is a
    /// set-union keyed on the reference string, preserving first-seen order.
    pub fn merge_from(&mut self, extracted: &Interest) {
        fn fill<T: Clone>(slot: &mut Option<T>, incoming: &Option<T>) {
            if slot.is_none()
                && let Some(v) = incoming
            {
                *slot = Some(v.clone());
            }
        }
        fill(&mut self.brand, &extracted.brand);
        fill(&mut self.model, &extracted.model);
        fill(&mut self.vehicle_type, &extracted.vehicle_type);
        fill(&mut self.max_budget, &extracted.max_budget);
        fill(&mut self.favorite_vehicle, &extracted.favorite_vehicle);
        fill(&mut self.notes, &extracted.notes);
        for reference in &extracted.consulted_vehicles {
            if !self.consulted_vehicles.contains(reference) {
                self.consulted_vehicles.push(reference.clone());
            }
        }
    }
}

/// One recorded conversation exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub user_message: String,
    pub bot_message: String,
    pub action: String,
    #[serde(default)]
    pub was_audio: bool,
}

/// Sales-process state for a lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesProcess {
    pub current_step: String,
    #[serde(default)]
    pub status: LeadStatus,
    pub started_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    #[serde(default)]
    pub appointment_date: Option<String>,
    #[serde(default)]
    pub appointment_time: Option<String>,
    #[serde(default)]
    pub appointment_vehicle: Option<String>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl SalesProcess {
    /// Append an exchange and enforce [`HISTORY_CAP`], dropping oldest first.
    pub fn push_history(&mut self, entry: HistoryEntry) {
        self.history.push(entry);
        if self.history.len() > HISTORY_CAP {
            let excess = self.history.len() - HISTORY_CAP;
            self.history.drain(..excess);
        }
    }
}

/// The persisted business record tracking a sender's interest and process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    /// Opaque unique identifier, assigned at creation, immutable.
    pub id: String,
    pub client: ClientInfo,
    #[serde(default)]
    pub interest: Interest,
    pub process: SalesProcess,
}

/// One vehicle listing from the inventory sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Unique reference code, e.g. "VEH042".
    pub reference: String,
    pub brand: String,
    pub model: String,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub mileage_km: Option<String>,
    #[serde(default)]
    pub vehicle_type: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub transmission: Option<String>,
    #[serde(default)]
    pub fuel: Option<String>,
    #[serde(default)]
    pub engine: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl Vehicle {
    /// One-line human description used in prompts and captions.
    pub fn short_description(&self) -> String {
        let mut description = format!("{} {}", self.brand, self.model);
        if let Some(year) = &self.year {
            description.push(' ');
            description.push_str(year);
        }
        if let Some(vehicle_type) = &self.vehicle_type {
            description.push_str(&format!(" ({vehicle_type})"));
        }
        let mut details = Vec::new();
        if let Some(km) = &self.mileage_km {
            details.push(format!("{km} km"));
        }
        if let Some(transmission) = &self.transmission {
            details.push(transmission.clone());
        }
        if let Some(fuel) = &self.fuel {
            details.push(fuel.clone());
        }
        if let Some(color) = &self.color {
            details.push(format!("Color {color}"));
        }
        if !details.is_empty() {
            description.push_str(" - ");
            description.push_str(&details.join(", "));
        }
        if let Some(price) = &self.price {
            description.push_str(&format!(" - Precio: ${price}"));
        }
        if let Some(location) = &self.location {
            description.push_str(&format!(" - Ubicado en {location}"));
        }
        description
    }
}

/// A point-in-time view of the inventory, with derived facet lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventorySnapshot {
    pub vehicles: Vec<Vehicle>,
    pub brands: Vec<String>,
    pub models: Vec<String>,
    pub types: Vec<String>,
    pub last_update: DateTime<Utc>,
}

/// One inbound message waiting in a sender's debounce buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingMessage {
    pub text: String,
    pub is_audio: bool,
    pub media_url: Option<String>,
    pub received_at: DateTime<Utc>,
}

/// How to merge a drained debounce buffer into one working text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchPolicy {
    /// Keep only the most recent message text.
    #[default]
    LatestOnly,
    /// Join all buffered texts with a single space, in arrival order.
    JoinAll,
}

/// Classified response type for a synthesized turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResponseKind {
    Consultation,
    ShowVehicles,
    ScheduleAppointment,
    AppointmentConfirmed,
    SendImages,
}

/// Structured reply produced by the synthesizer for one turn.
#[derive(Debug, Clone, PartialEq)]
pub struct SellerReply {
    pub kind: ResponseKind,
    pub message: String,
    /// Next conversation step; `None` keeps the lead's current step.
    pub waiting_for: Option<String>,
    /// Slots extracted from the user's text this turn.
    pub extracted: Interest,
    /// Vehicle references mentioned in the reply.
    pub mentioned_vehicles: Vec<String>,
    pub appointment_date: Option<String>,
    /// Reference of the vehicle to send images for, when `kind` is `SendImages`.
    pub vehicle_reference: Option<String>,
}

/// Prosody preset selected for a synthesized voice message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Tone {
    Greeting,
    ProductInfo,
    Appointment,
    Error,
    Enthusiasm,
    Consultation,
}

/// A synthesized audio asset stored behind a time-limited public URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceAsset {
    pub public_url: String,
    /// Object name in the audio store, used for scheduled deletion.
    pub object_name: String,
}

/// Health summary reported by the lead store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreHealth {
    pub primary_available: bool,
    pub fallback_count: usize,
    pub total_count: usize,
}
