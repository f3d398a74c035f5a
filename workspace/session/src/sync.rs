//! Debounced identity sync.
//!
//! Auth-state changes arrive in bursts (token refresh, tab focus, provider
//! callbacks); each burst must collapse into one sync call. Every trigger
//! supersedes the previous one: the scheduler keeps at most one delayed
//! task, keyed by the triggering identity, and aborts it when a new
//! trigger or a sign-out arrives.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use client::BackendApi;
use model::profile::CachedProfile;
use model::user::User;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::store::{KeyValueStore, PROFILE_KEY};

#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Window collapsing bursts of auth-state changes into one sync.
    pub debounce: Duration,
    /// First retry delay; doubles per attempt.
    pub backoff_base: Duration,
    /// Total attempts, first try included.
    pub max_attempts: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(400),
            backoff_base: Duration::from_millis(500),
            max_attempts: 5,
        }
    }
}

pub struct SyncScheduler {
    backend: Arc<dyn BackendApi>,
    kv: Arc<dyn KeyValueStore>,
    config: SyncConfig,
    task: Mutex<Option<(String, JoinHandle<()>)>>,
}

impl SyncScheduler {
    pub fn new(
        backend: Arc<dyn BackendApi>,
        kv: Arc<dyn KeyValueStore>,
        config: SyncConfig,
    ) -> Self {
        Self {
            backend,
            kv,
            config,
            task: Mutex::new(None),
        }
    }

    /// Handles an auth-state change. A new identity (or a repeat of the
    /// current one) supersedes any scheduled sync; a sign-out only
    /// cancels.
    pub fn auth_changed(&self, user: Option<User>) {
        let mut guard = match self.task.lock() {
            Ok(guard) => guard,
            Err(_) => return,
        };
        if let Some((key, handle)) = guard.take() {
            debug!(key, "superseding scheduled identity sync");
            handle.abort();
        }

        let Some(user) = user else {
            debug!("signed out, identity sync cancelled");
            return;
        };

        let key = user.id.clone();
        let backend = self.backend.clone();
        let kv = self.kv.clone();
        let config = self.config.clone();
        let handle = tokio::spawn(async move {
            sleep(config.debounce).await;
            run_sync(backend, kv, config, user).await;
        });
        *guard = Some((key, handle));
    }

    /// Whether a sync is currently scheduled or running.
    pub fn is_active(&self) -> bool {
        self.task
            .lock()
            .map(|guard| {
                guard
                    .as_ref()
                    .is_some_and(|(_, handle)| !handle.is_finished())
            })
            .unwrap_or(false)
    }
}

async fn run_sync(
    backend: Arc<dyn BackendApi>,
    kv: Arc<dyn KeyValueStore>,
    config: SyncConfig,
    user: User,
) {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match backend.fetch_profile().await {
            Ok(profile) => {
                let cached = CachedProfile::new(profile, Utc::now());
                match serde_json::to_string(&cached) {
                    Ok(raw) => {
                        kv.set(PROFILE_KEY, &raw);
                        if let Err(err) = kv.persist() {
                            warn!(%err, "failed to persist profile cache");
                        }
                    }
                    Err(err) => warn!(%err, "failed to serialize profile cache"),
                }
                info!(user_id = %user.id, attempt, "identity sync complete");
                return;
            }
            Err(err) if err.is_transient() && attempt < config.max_attempts => {
                let delay = config.backoff_base * 2u32.pow(attempt - 1);
                warn!(%err, attempt, ?delay, "identity sync failed, retrying");
                sleep(delay).await;
            }
            Err(err) => {
                // Surfaced as "sync pending"; the next auth change retries.
                error!(%err, user_id = %user.id, attempt, "identity sync failed");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use client::testing::StubBackend;
    use model::profile::UserProfile;

    use crate::store::MemoryStore;

    fn profile() -> UserProfile {
        UserProfile {
            id: "u1".to_string(),
            email: "u1@example.com".to_string(),
            display_name: None,
        }
    }

    fn user() -> User {
        User::new("u1", "u1@example.com")
    }

    #[tokio::test(start_paused = true)]
    async fn a_burst_of_auth_changes_syncs_once() {
        let backend = StubBackend::new();
        backend.set_profile(profile());
        let kv = MemoryStore::new();
        let scheduler = SyncScheduler::new(backend.clone(), kv.clone(), SyncConfig::default());

        for _ in 0..4 {
            scheduler.auth_changed(Some(user()));
        }
        sleep(Duration::from_secs(5)).await;

        assert_eq!(backend.call_count("profile"), 1);
        assert!(kv.get(PROFILE_KEY).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn sign_out_before_the_debounce_cancels_the_sync() {
        let backend = StubBackend::new();
        backend.set_profile(profile());
        let scheduler =
            SyncScheduler::new(backend.clone(), MemoryStore::new(), SyncConfig::default());

        scheduler.auth_changed(Some(user()));
        scheduler.auth_changed(None);
        sleep(Duration::from_secs(5)).await;

        assert_eq!(backend.call_count("profile"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failures_retry_with_backoff() {
        let backend = StubBackend::new();
        backend.set_profile(profile());
        backend.fail_profile_times(2);
        let kv = MemoryStore::new();
        let scheduler = SyncScheduler::new(backend.clone(), kv.clone(), SyncConfig::default());

        scheduler.auth_changed(Some(user()));
        sleep(Duration::from_secs(30)).await;

        // Two failures, then success.
        assert_eq!(backend.call_count("profile"), 3);
        assert!(kv.get(PROFILE_KEY).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn retries_are_bounded() {
        let backend = StubBackend::new();
        backend.set_profile(profile());
        backend.fail_profile_times(50);
        let config = SyncConfig {
            max_attempts: 3,
            ..SyncConfig::default()
        };
        let kv = MemoryStore::new();
        let scheduler = SyncScheduler::new(backend.clone(), kv.clone(), config);

        scheduler.auth_changed(Some(user()));
        sleep(Duration::from_secs(120)).await;

        assert_eq!(backend.call_count("profile"), 3);
        assert!(kv.get(PROFILE_KEY).is_none());
    }
}
