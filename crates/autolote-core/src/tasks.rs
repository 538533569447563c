// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registry for fire-and-forget background tasks.
//!
//! Scheduled side-effects (notification fan-out, audio asset deletion) run
//! detached from the turn pipeline, but are tracked here so shutdown and
//! tests can await them instead of racing opaque timers.

use std::future::Future;
use std::time::Duration;

use tokio_util::task::TaskTracker;

/// Tracked spawner for delayed, fire-and-forget work.
///
/// Clones share the same tracker.
#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    tracker: TaskTracker,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a tracked background task.
    pub fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tracker.spawn(future);
    }

    /// Spawn a tracked background task that first waits `delay`.
    pub fn spawn_after<F>(&self, delay: Duration, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tracker.spawn(async move {
            tokio::time::sleep(delay).await;
            future.await;
        });
    }

    /// Number of tasks still running.
    pub fn len(&self) -> usize {
        self.tracker.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracker.is_empty()
    }

    /// Close the registry and wait for every tracked task to finish.
    ///
    /// After this returns no further tasks can be spawned; meant for
    /// shutdown and for tests that assert on side-effects.
    pub async fn flush(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }
}
