// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Appointment notification fan-out for the Autolote sales assistant.
//!
//! When a lead confirms an appointment, the turn controller schedules a
//! delayed [`AppointmentFanout`] that emails the dealership and appends the
//! lead to the log sheet.

pub mod email;
pub mod notifier;
pub mod sheet;

pub use email::ResendClient;
pub use notifier::AppointmentFanout;
pub use sheet::LeadSheetClient;
