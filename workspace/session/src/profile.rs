//! Read-through cache for the user profile.
//!
//! The cached copy is a placeholder with a 1-hour staleness ceiling. It is
//! never the source of truth for household selection.

use std::sync::Arc;

use chrono::Utc;
use client::BackendApi;
use model::profile::{CachedProfile, UserProfile};
use tracing::{debug, warn};

use crate::error::Result;
use crate::store::{KeyValueStore, PROFILE_KEY};

pub struct ProfileCache {
    kv: Arc<dyn KeyValueStore>,
    backend: Arc<dyn BackendApi>,
}

impl ProfileCache {
    pub fn new(kv: Arc<dyn KeyValueStore>, backend: Arc<dyn BackendApi>) -> Self {
        Self { kv, backend }
    }

    pub async fn get(&self) -> Result<UserProfile> {
        let now = Utc::now();
        if let Some(raw) = self.kv.get(PROFILE_KEY) {
            match serde_json::from_str::<CachedProfile>(&raw) {
                Ok(cached) if !cached.is_stale(now) => {
                    debug!("serving profile from local cache");
                    return Ok(cached.profile);
                }
                Ok(_) => debug!("cached profile is stale, refetching"),
                Err(err) => warn!(%err, "cached profile unreadable, refetching"),
            }
        }

        let profile = self.backend.fetch_profile().await?;
        let cached = CachedProfile::new(profile.clone(), now);
        match serde_json::to_string(&cached) {
            Ok(raw) => {
                self.kv.set(PROFILE_KEY, &raw);
                if let Err(err) = self.kv.persist() {
                    warn!(%err, "failed to persist profile cache");
                }
            }
            Err(err) => warn!(%err, "failed to serialize profile cache"),
        }
        Ok(profile)
    }
}
