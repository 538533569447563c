// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply synthesizer trait wrapping the LLM call.

use async_trait::async_trait;

use crate::error::LlmError;
use crate::types::{InventorySnapshot, Lead, SellerReply};

/// Generates the salesperson's structured reply for one turn.
///
/// Implementations own the output contract: malformed model output is
/// repaired or replaced by a safe default inside the implementation, so the
/// caller always receives a well-formed [`SellerReply`] or a transport-level
/// [`LlmError`] -- never a half-parsed object.
#[async_trait]
pub trait ReplySynthesizer: Send + Sync {
    /// Generate a reply for `user_text` given the lead's accumulated state
    /// and an optional inventory snapshot.
    async fn generate(
        &self,
        user_text: &str,
        lead: &Lead,
        inventory: Option<&InventorySnapshot>,
    ) -> Result<SellerReply, LlmError>;
}
