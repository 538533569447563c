// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed lead store with an in-process fallback map.
//!
//! Every write attempts the primary store first; when the primary fails the
//! record lands in an in-memory map keyed by the same canonical phone.
//! Fallback entries are never reconciled back to the primary once it
//! recovers. `list_all` merges both, preferring the primary on collision.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use rusqlite::OptionalExtension;
use tracing::{debug, warn};

use autolote_core::{canonical_phone, AutoloteError, Lead, LeadStore, StoreHealth};

use crate::database::{map_tr_err, Database};

/// Lead store over SQLite with an in-memory fallback path.
pub struct SqliteLeadStore {
    db: Database,
    fallback: Mutex<HashMap<String, Lead>>,
    /// Kill switch: when set, every primary operation short-circuits to an
    /// error and the fallback path takes over.
    primary_disabled: AtomicBool,
}

impl SqliteLeadStore {
    /// Open the store at the given database path.
    pub async fn open(database_path: &str) -> Result<Self, AutoloteError> {
        let db = Database::open(database_path).await?;
        Ok(Self {
            db,
            fallback: Mutex::new(HashMap::new()),
            primary_disabled: AtomicBool::new(false),
        })
    }

    /// Force every subsequent primary operation to fail.
    #[cfg(test)]
    pub fn disable_primary(&self) {
        self.primary_disabled.store(true, Ordering::Relaxed);
    }

    fn primary_guard(&self) -> Result<(), AutoloteError> {
        if self.primary_disabled.load(Ordering::Relaxed) {
            return Err(AutoloteError::Store {
                source: "primary store disabled".into(),
            });
        }
        Ok(())
    }

    async fn primary_find(&self, phone: &str) -> Result<Option<Lead>, AutoloteError> {
        self.primary_guard()?;
        let key = phone.to_string();
        let body: Option<String> = self
            .db
            .connection()
            .call(move |conn| -> Result<Option<String>, rusqlite::Error> {
                conn.prepare("SELECT body FROM leads WHERE phone = ?1")?
                    .query_row([key.as_str()], |row| row.get(0))
                    .optional()
            })
            .await
            .map_err(map_tr_err)?;

        match body {
            Some(json) => {
                let lead: Lead = serde_json::from_str(&json).map_err(|e| AutoloteError::Store {
                    source: Box::new(e),
                })?;
                Ok(Some(lead))
            }
            None => Ok(None),
        }
    }

    async fn primary_put(&self, phone: &str, lead: &Lead) -> Result<(), AutoloteError> {
        self.primary_guard()?;
        let key = phone.to_string();
        let body = serde_json::to_string(lead).map_err(|e| AutoloteError::Store {
            source: Box::new(e),
        })?;
        let updated_at = chrono::Utc::now().to_rfc3339();
        self.db
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "INSERT INTO leads (phone, body, updated_at) VALUES (?1, ?2, ?3)
                     ON CONFLICT(phone) DO UPDATE SET body = ?2, updated_at = ?3",
                    (key.as_str(), body.as_str(), updated_at.as_str()),
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn primary_list(&self) -> Result<Vec<Lead>, AutoloteError> {
        self.primary_guard()?;
        let bodies: Vec<String> = self
            .db
            .connection()
            .call(|conn| -> Result<Vec<String>, rusqlite::Error> {
                let mut stmt = conn.prepare("SELECT body FROM leads ORDER BY phone")?;
                let rows = stmt.query_map([], |row| row.get(0))?;
                rows.collect()
            })
            .await
            .map_err(map_tr_err)?;

        let mut leads = Vec::with_capacity(bodies.len());
        for json in bodies {
            match serde_json::from_str::<Lead>(&json) {
                Ok(lead) => leads.push(lead),
                Err(e) => warn!(error = %e, "skipping undecodable lead row"),
            }
        }
        Ok(leads)
    }

    fn fallback_put(&self, phone: &str, lead: Lead) {
        self.fallback
            .lock()
            .expect("fallback mutex poisoned")
            .insert(phone.to_string(), lead);
    }

    fn fallback_get(&self, phone: &str) -> Option<Lead> {
        self.fallback
            .lock()
            .expect("fallback mutex poisoned")
            .get(phone)
            .cloned()
    }
}

#[async_trait]
impl LeadStore for SqliteLeadStore {
    async fn find_by_phone(&self, phone: &str) -> Result<Option<Lead>, AutoloteError> {
        let key = canonical_phone(phone);
        match self.primary_find(&key).await {
            Ok(Some(lead)) => Ok(Some(lead)),
            Ok(None) => Ok(self.fallback_get(&key)),
            Err(e) => {
                warn!(phone = %key, error = %e, "primary lookup failed, using fallback");
                Ok(self.fallback_get(&key))
            }
        }
    }

    async fn create(&self, mut lead: Lead) -> Result<Lead, AutoloteError> {
        let key = canonical_phone(&lead.client.phone);
        lead.client.phone = key.clone();

        match self.primary_put(&key, &lead).await {
            Ok(()) => {
                debug!(phone = %key, lead_id = %lead.id, "lead created");
            }
            Err(e) => {
                warn!(phone = %key, error = %e, "primary write failed, storing lead in memory");
                self.fallback_put(&key, lead.clone());
            }
        }
        Ok(lead)
    }

    async fn update(&self, phone: &str, lead: &Lead) -> Result<Lead, AutoloteError> {
        let key = canonical_phone(phone);

        let exists = match self.primary_find(&key).await {
            Ok(found) => found.is_some() || self.fallback_get(&key).is_some(),
            Err(_) => self.fallback_get(&key).is_some(),
        };
        if !exists {
            return Err(AutoloteError::NotFound(format!("lead {key}")));
        }

        let mut updated = lead.clone();
        updated.client.phone = key.clone();

        match self.primary_put(&key, &updated).await {
            Ok(()) => {
                debug!(phone = %key, "lead updated");
            }
            Err(e) => {
                warn!(phone = %key, error = %e, "primary update failed, updating in memory");
                self.fallback_put(&key, updated.clone());
            }
        }
        Ok(updated)
    }

    async fn list_all(&self) -> Result<Vec<Lead>, AutoloteError> {
        let mut leads = match self.primary_list().await {
            Ok(leads) => leads,
            Err(e) => {
                warn!(error = %e, "primary list failed, returning fallback only");
                Vec::new()
            }
        };

        let primary_phones: std::collections::HashSet<String> =
            leads.iter().map(|l| l.client.phone.clone()).collect();
        let fallback = self.fallback.lock().expect("fallback mutex poisoned");
        for (phone, lead) in fallback.iter() {
            if !primary_phones.contains(phone) {
                leads.push(lead.clone());
            }
        }
        Ok(leads)
    }

    async fn delete(&self, phone: &str) -> Result<bool, AutoloteError> {
        let key = canonical_phone(phone);

        let primary_deleted = if self.primary_guard().is_ok() {
            let k = key.clone();
            self.db
                .connection()
                .call(move |conn| -> Result<usize, rusqlite::Error> {
                    conn.execute("DELETE FROM leads WHERE phone = ?1", [k.as_str()])
                })
                .await
                .map_err(map_tr_err)
                .map(|n| n > 0)
                .unwrap_or_else(|e| {
                    warn!(phone = %key, error = %e, "primary delete failed");
                    false
                })
        } else {
            false
        };

        let fallback_deleted = self
            .fallback
            .lock()
            .expect("fallback mutex poisoned")
            .remove(&key)
            .is_some();

        Ok(primary_deleted || fallback_deleted)
    }

    async fn health_check(&self) -> StoreHealth {
        let primary_available = match self.primary_guard() {
            Ok(()) => self
                .db
                .connection()
                .call(|conn| -> Result<(), rusqlite::Error> {
                    conn.execute_batch("SELECT 1;")?;
                    Ok(())
                })
                .await
                .is_ok(),
            Err(_) => false,
        };

        let fallback_count = self.fallback.lock().expect("fallback mutex poisoned").len();
        let total_count = self.list_all().await.map(|l| l.len()).unwrap_or(fallback_count);

        StoreHealth {
            primary_available,
            fallback_count,
            total_count,
        }
    }
}
