// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WhatsApp messaging gateway integration for the Autolote sales assistant.
//!
//! Outbound delivery through the UltraMSG API, inbound webhook filtering
//! and authorization, and the [`Dispatcher`] that drives the
//! audio-with-text-fallback delivery chain.

pub mod dispatcher;
pub mod ultramsg;
pub mod webhook;

pub use dispatcher::{DeliveredAs, DeliveryOptions, Dispatcher};
pub use ultramsg::UltraMsgChannel;
pub use webhook::{extract_inbound, is_authorized, InboundMessage, WebhookData, WebhookEvent};
