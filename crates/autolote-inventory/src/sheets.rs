// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Google Sheets values API.
//!
//! Fetches the raw value grid for the inventory range; row-to-vehicle
//! mapping lives in [`crate::service`].

use std::time::Duration;

use autolote_core::AutoloteError;
use serde::Deserialize;
use tracing::debug;

/// Base URL for the Sheets API.
const API_BASE_URL: &str = "https://sheets.googleapis.com";

/// Response body of a `values.get` call.
#[derive(Debug, Deserialize)]
pub struct ValueGrid {
    #[serde(default)]
    pub values: Vec<Vec<String>>,
}

/// Read-only client for one spreadsheet range.
#[derive(Debug, Clone)]
pub struct SheetsClient {
    client: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    api_token: Option<String>,
}

impl SheetsClient {
    /// Create a client for the given spreadsheet.
    pub fn new(spreadsheet_id: String, api_token: Option<String>) -> Result<Self, AutoloteError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| AutoloteError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: API_BASE_URL.to_string(),
            spreadsheet_id,
            api_token,
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    /// Fetch the value grid for `range` (e.g. `Inventario!A:O`).
    pub async fn fetch_values(&self, range: &str) -> Result<ValueGrid, AutoloteError> {
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.base_url, self.spreadsheet_id, range
        );

        let mut request = self.client.get(&url);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| AutoloteError::Internal(
            format!("sheets request failed: {e}"),
        ))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AutoloteError::Internal(format!(
                "sheets API returned {status}: {body}"
            )));
        }

        let grid: ValueGrid = response.json().await.map_err(|e| AutoloteError::Internal(
            format!("failed to parse sheets response: {e}"),
        ))?;

        debug!(rows = grid.values.len(), range, "fetched inventory grid");
        Ok(grid)
    }
}
