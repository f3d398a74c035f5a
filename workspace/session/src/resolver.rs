//! Derives the authoritative active household from the selection store and
//! the server's (eventually consistent) household list.

use std::sync::Arc;

use chrono::Utc;
use model::household::{Household, SelectionRecord, personal_household};
use model::user::User;
use tracing::{debug, info};

use crate::store::HouseholdStore;

/// A server-derived list that may still be loading.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteList<T> {
    Loading,
    Ready(Vec<T>),
}

/// The resolved active household.
///
/// `Degraded` carries only the locally cached id/name/role: the stored id
/// was not (or not yet) found in the server list. Consumers must treat
/// `Unresolved` as "not ready", never as "use household X".
#[derive(Debug, Clone, PartialEq)]
pub enum ActiveHousehold {
    Unresolved,
    Degraded(SelectionRecord),
    Confirmed(Household),
}

impl ActiveHousehold {
    pub fn id(&self) -> Option<&str> {
        match self {
            ActiveHousehold::Unresolved => None,
            ActiveHousehold::Degraded(record) => Some(&record.id),
            ActiveHousehold::Confirmed(household) => Some(&household.id),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            ActiveHousehold::Unresolved => None,
            ActiveHousehold::Degraded(record) => Some(&record.name),
            ActiveHousehold::Confirmed(household) => Some(&household.name),
        }
    }
}

pub struct HouseholdResolver {
    store: Arc<HouseholdStore>,
}

impl HouseholdResolver {
    pub fn new(store: Arc<HouseholdStore>) -> Self {
        Self { store }
    }

    /// Resolution never fails; every outcome is a value.
    ///
    /// A stored id is never substituted for another one: not while the
    /// server list is loading, and not when the id is absent from the
    /// list (the member might be mid-transition out of a shared
    /// household; thrashing their context away would be worse than
    /// surfacing "not found"). The only write paths here are the
    /// unauthenticated clear and the one-time first-run fallback.
    pub fn resolve(
        &self,
        user: Option<&User>,
        households: &RemoteList<Household>,
    ) -> ActiveHousehold {
        if user.is_none() {
            if self.store.get().is_some() {
                self.store.clear();
            }
            return ActiveHousehold::Unresolved;
        }

        if let Some(record) = self.store.get() {
            return match households {
                RemoteList::Loading => ActiveHousehold::Degraded(record),
                RemoteList::Ready(list) => match list.iter().find(|h| h.id == record.id) {
                    Some(household) => {
                        self.reconcile_drift(&record, household);
                        ActiveHousehold::Confirmed(household.clone())
                    }
                    None => {
                        debug!(id = %record.id, "stored household absent from server list");
                        ActiveHousehold::Degraded(record)
                    }
                },
            };
        }

        // First run: fall back to the personal household once the list has
        // actually finished loading.
        match households {
            RemoteList::Ready(list) => match personal_household(list) {
                Some(personal) => {
                    info!(id = %personal.id, "first-run fallback to personal household");
                    self.store
                        .set(SelectionRecord::from_household(personal, Utc::now()));
                    ActiveHousehold::Confirmed(personal.clone())
                }
                None => ActiveHousehold::Unresolved,
            },
            RemoteList::Loading => ActiveHousehold::Unresolved,
        }
    }

    /// Updates the stored copy's name/role in place when the server record
    /// with the same id has drifted. The id and original selection
    /// timestamp are untouched.
    fn reconcile_drift(&self, record: &SelectionRecord, household: &Household) {
        if record.name != household.name || record.role != household.role {
            debug!(id = %record.id, "reconciling name/role drift into stored selection");
            self.store.set(SelectionRecord {
                id: record.id.clone(),
                name: household.name.clone(),
                role: household.role,
                timestamp: record.timestamp,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use model::household::HouseholdRole;

    use crate::store::MemoryStore;

    fn household(id: &str, name: &str, role: HouseholdRole, created_secs: i64) -> Household {
        Household {
            id: id.to_string(),
            name: name.to_string(),
            role,
            created_at: Utc.timestamp_opt(created_secs, 0).unwrap(),
            joined_at: None,
        }
    }

    fn user() -> User {
        User::new("u1", "u1@example.com")
    }

    fn resolver() -> (Arc<HouseholdStore>, HouseholdResolver) {
        let store = Arc::new(HouseholdStore::new(MemoryStore::new()));
        let resolver = HouseholdResolver::new(store.clone());
        (store, resolver)
    }

    #[test]
    fn unauthenticated_clears_and_resolves_to_nothing() {
        let (store, resolver) = resolver();
        store.set(SelectionRecord::from_household(
            &household("h1", "Personal", HouseholdRole::Owner, 1_000),
            Utc::now(),
        ));

        let resolved = resolver.resolve(None, &RemoteList::Loading);
        assert_eq!(resolved, ActiveHousehold::Unresolved);
        assert!(store.get().is_none());
    }

    #[test]
    fn first_run_falls_back_to_oldest_household() {
        let (store, resolver) = resolver();
        let list = vec![
            household("h2", "Flat", HouseholdRole::Editor, 2_000),
            household("h1", "Personal", HouseholdRole::Owner, 1_000),
        ];

        let resolved = resolver.resolve(Some(&user()), &RemoteList::Ready(list));
        assert_eq!(resolved.id(), Some("h1"));
        assert_eq!(store.current_id().as_deref(), Some("h1"));
    }

    #[test]
    fn first_run_waits_for_the_list() {
        let (store, resolver) = resolver();
        assert_eq!(
            resolver.resolve(Some(&user()), &RemoteList::Loading),
            ActiveHousehold::Unresolved
        );
        assert_eq!(
            resolver.resolve(Some(&user()), &RemoteList::Ready(Vec::new())),
            ActiveHousehold::Unresolved
        );
        assert!(store.get().is_none());
    }

    #[test]
    fn stored_id_survives_loading_and_absence() {
        let (store, resolver) = resolver();
        store.set(SelectionRecord::from_household(
            &household("h2", "Flat", HouseholdRole::Editor, 2_000),
            Utc::now(),
        ));

        // While loading: degraded, same id.
        let resolved = resolver.resolve(Some(&user()), &RemoteList::Loading);
        assert!(matches!(resolved, ActiveHousehold::Degraded(_)));
        assert_eq!(resolved.id(), Some("h2"));

        // Absent from a loaded list that has other households: still the
        // same id, surfaced as degraded rather than silently reselected.
        let list = vec![household("h1", "Personal", HouseholdRole::Owner, 1_000)];
        let resolved = resolver.resolve(Some(&user()), &RemoteList::Ready(list));
        assert!(matches!(resolved, ActiveHousehold::Degraded(_)));
        assert_eq!(resolved.id(), Some("h2"));
        assert_eq!(store.current_id().as_deref(), Some("h2"));
    }

    #[test]
    fn repeated_reloads_never_change_the_stored_id() {
        let (store, resolver) = resolver();
        let list = vec![
            household("h1", "Personal", HouseholdRole::Owner, 1_000),
            household("h2", "Flat", HouseholdRole::Editor, 2_000),
        ];
        store.set(SelectionRecord::from_household(&list[1], Utc::now()));

        for _ in 0..3 {
            resolver.resolve(Some(&user()), &RemoteList::Ready(list.clone()));
            resolver.resolve(Some(&user()), &RemoteList::Loading);
        }
        assert_eq!(store.current_id().as_deref(), Some("h2"));
    }

    #[test]
    fn matching_server_record_wins_and_reconciles_drift() {
        let (store, resolver) = resolver();
        let selected_at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        store.set(SelectionRecord {
            id: "h2".to_string(),
            name: "Old name".to_string(),
            role: HouseholdRole::Editor,
            timestamp: selected_at,
        });

        let list = vec![household("h2", "New name", HouseholdRole::Owner, 2_000)];
        let resolved = resolver.resolve(Some(&user()), &RemoteList::Ready(list));
        assert!(matches!(resolved, ActiveHousehold::Confirmed(_)));

        let record = store.get().unwrap();
        assert_eq!(record.id, "h2");
        assert_eq!(record.name, "New name");
        assert_eq!(record.role, HouseholdRole::Owner);
        // Drift reconciliation is in place; the selection instant stays.
        assert_eq!(record.timestamp, selected_at);
    }
}
