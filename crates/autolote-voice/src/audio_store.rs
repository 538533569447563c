// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transient public-URL storage for synthesized audio.
//!
//! Uploads MP3 bytes to a cloud object store and returns the public URL the
//! messaging gateway fetches when delivering an audio message. Objects are
//! short-lived: callers schedule deletion after dispatch, and
//! [`AudioStoreClient::clean_old`] sweeps anything left behind.

use std::time::Duration;

use autolote_core::AutoloteError;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info};

/// Base URL for the object store API.
const API_BASE_URL: &str = "https://storage.googleapis.com";

#[derive(Debug, Deserialize)]
struct ObjectList {
    #[serde(default)]
    items: Vec<ObjectEntry>,
}

/// One stored object, as returned by the list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectEntry {
    pub name: String,
    #[serde(rename = "timeCreated")]
    pub time_created: Option<DateTime<Utc>>,
}

/// Object store client scoped to one bucket and folder.
#[derive(Debug, Clone)]
pub struct AudioStoreClient {
    client: reqwest::Client,
    base_url: String,
    bucket: String,
    folder: String,
    access_token: Option<String>,
}

impl AudioStoreClient {
    pub fn new(
        bucket: String,
        folder: String,
        access_token: Option<String>,
    ) -> Result<Self, AutoloteError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| AutoloteError::Speech {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: API_BASE_URL.to_string(),
            bucket,
            folder,
            access_token,
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Full object name (folder prefix included) for a file name.
    pub fn object_name(&self, file_name: &str) -> String {
        format!("{}/{}", self.folder, file_name)
    }

    /// Public download URL for an object.
    pub fn public_url(&self, object_name: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.bucket, object_name)
    }

    /// Upload MP3 bytes and return the object's public URL.
    pub async fn upload(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, AutoloteError> {
        let object = self.object_name(file_name);
        let url = format!(
            "{}/upload/storage/v1/b/{}/o?uploadType=media&name={}",
            self.base_url,
            self.bucket,
            encode_object(&object)
        );

        let response = self
            .authorized(self.client.post(&url))
            .header("content-type", "audio/mpeg")
            .header("cache-control", "public, max-age=3600")
            .body(bytes)
            .send()
            .await
            .map_err(|e| AutoloteError::Speech {
                message: format!("audio upload failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AutoloteError::Speech {
                message: format!("audio store returned {status}: {body}"),
                source: None,
            });
        }

        let public_url = self.public_url(&object);
        debug!(object = %object, "audio uploaded");
        Ok(public_url)
    }

    /// Delete one object. Missing objects are not an error.
    pub async fn delete(&self, object_name: &str) -> Result<(), AutoloteError> {
        let url = format!(
            "{}/storage/v1/b/{}/o/{}",
            self.base_url,
            self.bucket,
            encode_object(object_name)
        );

        let response = self
            .authorized(self.client.delete(&url))
            .send()
            .await
            .map_err(|e| AutoloteError::Speech {
                message: format!("audio delete failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() && status != reqwest::StatusCode::NOT_FOUND {
            return Err(AutoloteError::Speech {
                message: format!("audio store returned {status} on delete"),
                source: None,
            });
        }

        debug!(object = %object_name, "audio deleted");
        Ok(())
    }

    /// List stored audio objects under the configured folder.
    pub async fn list(&self) -> Result<Vec<ObjectEntry>, AutoloteError> {
        let url = format!(
            "{}/storage/v1/b/{}/o?prefix={}/",
            self.base_url, self.bucket, self.folder
        );

        let response = self
            .authorized(self.client.get(&url))
            .send()
            .await
            .map_err(|e| AutoloteError::Speech {
                message: format!("audio list failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AutoloteError::Speech {
                message: format!("audio store returned {status} on list"),
                source: None,
            });
        }

        let listing: ObjectList = response.json().await.map_err(|e| AutoloteError::Speech {
            message: format!("failed to parse object listing: {e}"),
            source: Some(Box::new(e)),
        })?;
        Ok(listing.items)
    }

    /// Delete every stored object older than `max_age_hours`.
    ///
    /// Returns the number of objects removed. Per-object delete failures are
    /// skipped so one stuck object cannot wedge the sweep.
    pub async fn clean_old(&self, max_age_hours: u64) -> Result<usize, AutoloteError> {
        let cutoff = Utc::now() - chrono::Duration::hours(max_age_hours as i64);
        let mut removed = 0usize;

        for entry in self.list().await? {
            let Some(created) = entry.time_created else {
                continue;
            };
            if created < cutoff && self.delete(&entry.name).await.is_ok() {
                removed += 1;
            }
        }

        if removed > 0 {
            info!(removed, max_age_hours, "stale audio objects cleaned");
        }
        Ok(removed)
    }
}

/// Percent-encode an object name for use in a URL path segment.
fn encode_object(object: &str) -> String {
    object.replace('/', "%2F")
}
