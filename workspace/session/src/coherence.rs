//! Keeps server-derived views coherent across household switches and
//! mutations.
//!
//! Ordering contract for a switch: the new selection is persisted first,
//! then the old household's collections are dropped, then the new
//! household's collections are refetched. A refetched response is admitted
//! against the selection as it is when the response *arrives*, not as
//! captured at issue time, so a rapid second switch discards the
//! superseded response instead of resurrecting dropped data.

use std::sync::{Arc, Mutex};

use client::BackendApi;
use model::account::Account;
use model::budget::{Budget, SavingsGoal};
use model::category::Category;
use model::household::{Household, SelectionRecord};
use model::recurring::RecurringTransaction;
use model::transaction::Transaction;
use moka::future::Cache;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::store::HouseholdStore;

/// Server-derived collections cached per household.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Transactions,
    Accounts,
    Budgets,
    RecurringTransactions,
    SavingsGoals,
    Categories,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 6] = [
        CollectionKind::Transactions,
        CollectionKind::Accounts,
        CollectionKind::Budgets,
        CollectionKind::RecurringTransactions,
        CollectionKind::SavingsGoals,
        CollectionKind::Categories,
    ];
}

/// Summary views computed from the collections. This core never fetches
/// them; it only guarantees they are invalidated when their inputs change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DerivedView {
    MonthSummaries,
    CategoryBreakdown,
    Heatmap,
    Dashboard,
}

impl DerivedView {
    pub const ALL: [DerivedView; 4] = [
        DerivedView::MonthSummaries,
        DerivedView::CategoryBreakdown,
        DerivedView::Heatmap,
        DerivedView::Dashboard,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Collection(CollectionKind, String),
    Derived(DerivedView, String),
    /// The membership/household list for the current user.
    Households,
}

#[derive(Debug, Clone)]
pub enum CachedCollection {
    Households(Vec<Household>),
    Transactions(Vec<Transaction>),
    Accounts(Vec<Account>),
    Budgets(Vec<Budget>),
    RecurringTransactions(Vec<RecurringTransaction>),
    SavingsGoals(Vec<SavingsGoal>),
    Categories(Vec<Category>),
    /// Opaque payload of a derived view, owned by the view layer.
    Derived(serde_json::Value),
}

/// An optimistic mutation awaiting its authoritative refetch.
#[derive(Debug, Clone)]
pub struct PendingWrite {
    pub id: Uuid,
    pub kind: CollectionKind,
    pub household_id: String,
}

pub struct CacheCoherenceController {
    store: Arc<HouseholdStore>,
    backend: Arc<dyn BackendApi>,
    cache: Cache<CacheKey, CachedCollection>,
    pending: Mutex<Vec<PendingWrite>>,
}

impl CacheCoherenceController {
    pub fn new(store: Arc<HouseholdStore>, backend: Arc<dyn BackendApi>) -> Self {
        Self {
            store,
            backend,
            cache: Cache::builder().max_capacity(1_024).build(),
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Read-through for the household list. Invalidated by the first
    /// mutation of a household-less user (see `record_mutation`).
    pub async fn households(&self) -> Result<Vec<Household>> {
        if let Some(CachedCollection::Households(list)) = self.cache.get(&CacheKey::Households).await
        {
            return Ok(list);
        }
        let list = self.backend.households().await?;
        self.cache
            .insert(CacheKey::Households, CachedCollection::Households(list.clone()))
            .await;
        Ok(list)
    }

    /// Switches the active household. A switch to the already-selected
    /// household is a true no-op: no invalidation, no refetch.
    pub async fn switch_household(&self, target: SelectionRecord) -> Result<()> {
        let old = self.store.current_id();
        if old.as_deref() == Some(target.id.as_str()) {
            debug!(id = %target.id, "redundant household switch ignored");
            return Ok(());
        }

        let new_id = target.id.clone();
        info!(old = ?old, new = %new_id, "switching household");

        // Persist happens-before invalidation happens-before refetch: a
        // concurrent reader must never see a dropped cache paired with
        // the old selection.
        self.store.set(target);
        if let Some(old_id) = old.as_deref() {
            self.drop_household(old_id).await;
        }

        let mut first_error = None;
        for kind in CollectionKind::ALL {
            if let Err(err) = self.refetch(kind, &new_id).await {
                warn!(?kind, %err, "refetch failed after household switch");
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Drops every collection and derived view keyed by `household_id`.
    pub async fn drop_household(&self, household_id: &str) {
        debug!(household_id, "dropping cached collections");
        for kind in CollectionKind::ALL {
            self.cache
                .invalidate(&CacheKey::Collection(kind, household_id.to_string()))
                .await;
        }
        for view in DerivedView::ALL {
            self.cache
                .invalidate(&CacheKey::Derived(view, household_id.to_string()))
                .await;
        }
    }

    /// Fetches one collection and installs it, unless the selection moved
    /// on while the response was in flight.
    pub async fn refetch(&self, kind: CollectionKind, household_id: &str) -> Result<()> {
        let fetched = match kind {
            CollectionKind::Transactions => {
                CachedCollection::Transactions(self.backend.transactions(household_id).await?)
            }
            CollectionKind::Accounts => {
                CachedCollection::Accounts(self.backend.accounts(household_id).await?)
            }
            CollectionKind::Budgets => {
                CachedCollection::Budgets(self.backend.budgets(household_id).await?)
            }
            CollectionKind::RecurringTransactions => CachedCollection::RecurringTransactions(
                self.backend.recurring_transactions(household_id).await?,
            ),
            CollectionKind::SavingsGoals => {
                CachedCollection::SavingsGoals(self.backend.savings_goals(household_id).await?)
            }
            CollectionKind::Categories => {
                CachedCollection::Categories(self.backend.categories(household_id).await?)
            }
        };

        // Checked on arrival, not at issue time.
        if self.store.current_id().as_deref() != Some(household_id) {
            info!(?kind, household_id, "discarding stale response for superseded household");
            return Ok(());
        }

        self.cache
            .insert(
                CacheKey::Collection(kind, household_id.to_string()),
                fetched,
            )
            .await;
        self.reconcile_pending(kind, household_id);
        Ok(())
    }

    /// Records a create/update/delete against a collection and invalidates
    /// everything derived from it. Returns the pending-write id that the
    /// authoritative refetch will reconcile away.
    pub async fn record_mutation(&self, kind: CollectionKind, household_id: &str) -> Uuid {
        let id = Uuid::new_v4();
        debug!(?kind, household_id, mutation = %id, "recording mutation");
        if let Ok(mut pending) = self.pending.lock() {
            pending.push(PendingWrite {
                id,
                kind,
                household_id: household_id.to_string(),
            });
        }

        self.cache
            .invalidate(&CacheKey::Collection(kind, household_id.to_string()))
            .await;
        for view in DerivedView::ALL {
            self.cache
                .invalidate(&CacheKey::Derived(view, household_id.to_string()))
                .await;
        }

        // First resource for a user with no prior household: the server
        // may have just lazily created their personal household, so the
        // membership list itself is suspect.
        if self.store.get().is_none() {
            info!(household_id, "first mutation without a selection, invalidating household list");
            self.cache.invalidate(&CacheKey::Households).await;
        }
        id
    }

    pub fn pending_writes(&self) -> Vec<PendingWrite> {
        self.pending
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    fn reconcile_pending(&self, kind: CollectionKind, household_id: &str) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.retain(|write| {
                !(write.kind == kind && write.household_id == household_id)
            });
        }
    }

    pub async fn cached(&self, key: &CacheKey) -> Option<CachedCollection> {
        self.cache.get(key).await
    }

    /// Installs a value computed by the view layer (derived views are not
    /// fetched by this core).
    pub async fn prime(&self, key: CacheKey, value: CachedCollection) {
        self.cache.insert(key, value).await;
    }
}
