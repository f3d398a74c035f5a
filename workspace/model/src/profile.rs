use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Staleness ceiling for the locally cached profile. The cached copy is a
/// read-through placeholder only; it is never the source of truth for
/// household selection.
pub const PROFILE_STALE_AFTER_SECS: i64 = 3_600;

/// The authenticated user's server-side profile record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// A profile together with the instant it was fetched, as persisted in the
/// local key/value store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedProfile {
    pub profile: UserProfile,
    pub fetched_at: DateTime<Utc>,
}

impl CachedProfile {
    pub fn new(profile: UserProfile, fetched_at: DateTime<Utc>) -> Self {
        Self {
            profile,
            fetched_at,
        }
    }

    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        (now - self.fetched_at).num_seconds() >= PROFILE_STALE_AFTER_SECS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn profile_goes_stale_after_one_hour() {
        let fetched = Utc.timestamp_opt(10_000, 0).unwrap();
        let cached = CachedProfile::new(
            UserProfile {
                id: "u1".to_string(),
                email: "u1@example.com".to_string(),
                display_name: None,
            },
            fetched,
        );
        assert!(!cached.is_stale(fetched + chrono::Duration::minutes(59)));
        assert!(cached.is_stale(fetched + chrono::Duration::hours(1)));
    }
}
