// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Autolote sales assistant.
//!
//! Exposes the inbound WhatsApp webhook, the start-conversation endpoint,
//! and thin admin/query endpoints over the assembled components.

pub mod handlers;
pub mod server;

pub use server::{build_router, start_server, GatewayState, ServerConfig};
