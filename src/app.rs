//! The session facade: wires the selection store, resolver, permission
//! gate, settlement engine and cache coherence controller together behind
//! the flow the UI consumes.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use client::{BackendApi, CreateTransactionRequest, HttpBackend};
use compute::limits;
use compute::permission::AccountContext;
use model::account::Account;
use model::household::{Household, HouseholdKind, SelectionRecord, classify};
use model::member::HouseholdMember;
use model::profile::UserProfile;
use model::transaction::{Split, Transaction};
use model::user::User;
use rust_decimal::Decimal;
use session::{
    ActiveHousehold, CacheCoherenceController, CollectionKind, FileStore, HouseholdResolver,
    HouseholdStore, KeyValueStore, ProfileCache, RemoteList, Result, SessionError,
    SettlementRejection, SyncConfig, SyncScheduler,
};
use tracing::warn;

use crate::config::AppConfig;

pub struct Session {
    backend: Arc<dyn BackendApi>,
    store: Arc<HouseholdStore>,
    resolver: HouseholdResolver,
    coherence: Arc<CacheCoherenceController>,
    sync: SyncScheduler,
    profile: ProfileCache,
    user: Mutex<Option<User>>,
}

impl Session {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let kv: Arc<dyn KeyValueStore> =
            FileStore::load(&config.state_path).context("open local state file")?;
        let backend: Arc<dyn BackendApi> = Arc::new(
            HttpBackend::new(config.api_base_url.clone(), config.auth_token.clone())
                .context("build backend client")?,
        );
        let sync_config = SyncConfig {
            debounce: Duration::from_millis(config.sync_debounce_ms),
            ..SyncConfig::default()
        };
        Ok(Self::with_parts(backend, kv, sync_config))
    }

    /// Assembles a session over explicit collaborators; the seam the tests
    /// use.
    pub fn with_parts(
        backend: Arc<dyn BackendApi>,
        kv: Arc<dyn KeyValueStore>,
        sync_config: SyncConfig,
    ) -> Self {
        let store = Arc::new(HouseholdStore::new(kv.clone()));
        let resolver = HouseholdResolver::new(store.clone());
        let coherence = Arc::new(CacheCoherenceController::new(store.clone(), backend.clone()));
        let sync = SyncScheduler::new(backend.clone(), kv.clone(), sync_config);
        let profile = ProfileCache::new(kv, backend.clone());
        Self {
            backend,
            store,
            resolver,
            coherence,
            sync,
            profile,
            user: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &Arc<HouseholdStore> {
        &self.store
    }

    pub fn coherence(&self) -> &Arc<CacheCoherenceController> {
        &self.coherence
    }

    pub fn sign_in(&self, user: User) {
        if let Ok(mut guard) = self.user.lock() {
            *guard = Some(user.clone());
        }
        self.sync.auth_changed(Some(user));
    }

    pub fn sign_out(&self) {
        if let Ok(mut guard) = self.user.lock() {
            *guard = None;
        }
        self.sync.auth_changed(None);
        // Resolution with no user clears the stored selection.
        self.resolver.resolve(None, &RemoteList::Loading);
    }

    fn current_user(&self) -> Option<User> {
        self.user.lock().map(|guard| guard.clone()).unwrap_or(None)
    }

    pub async fn cached_profile(&self) -> Result<UserProfile> {
        self.profile.get().await
    }

    /// Resolves the active household. A failing household fetch degrades
    /// to the locally stored record rather than erroring: the server list
    /// is eventually consistent and "still loading" is an expected state.
    pub async fn active_household(&self) -> Result<ActiveHousehold> {
        let user = self.current_user();
        let list = match self.coherence.households().await {
            Ok(list) => RemoteList::Ready(list),
            Err(SessionError::Network(err)) => {
                warn!(%err, "household list unavailable, resolving from local state");
                RemoteList::Loading
            }
            Err(err) => return Err(err),
        };
        Ok(self.resolver.resolve(user.as_ref(), &list))
    }

    /// Explicit user action: switch to a household from the picker. The
    /// only other writer of the selection is the resolver's first-run
    /// fallback.
    pub async fn switch_household(&self, id: &str) -> Result<Household> {
        let list = self.coherence.households().await?;
        let Some(household) = list.iter().find(|h| h.id == id) else {
            return Err(SessionError::NotFound(format!(
                "household {id} is not in your household list"
            )));
        };

        let shared_count = list
            .len()
            .saturating_sub(model::household::personal_household(&list).map_or(0, |_| 1));
        if let Err(err) = limits::check_shared_household_count(shared_count) {
            // Existing server-side state may exceed the product limit;
            // surface it without refusing the switch.
            warn!(%err, "household list exceeds the shared-household limit");
        }

        self.coherence
            .switch_household(SelectionRecord::from_household(household, Utc::now()))
            .await?;
        Ok(household.clone())
    }

    async fn require_active(&self) -> Result<(String, Vec<Household>, User)> {
        let Some(user) = self.current_user() else {
            return Err(SessionError::Permission("not signed in".to_string()));
        };
        let list = self.coherence.households().await?;
        let active = self.resolver.resolve(Some(&user), &RemoteList::Ready(list.clone()));
        match active.id() {
            Some(id) => Ok((id.to_string(), list, user)),
            None => Err(SessionError::NotFound(
                "no active household; selection is not ready".to_string(),
            )),
        }
    }

    /// Accounts usable for a transaction in the active household: the
    /// client-side mirror of the server's availability rules, applied on
    /// top of the server's own answer so the two copies cannot drift
    /// apart silently.
    pub async fn available_accounts(&self, context: AccountContext) -> Result<Vec<Account>> {
        let (household_id, list, user) = self.require_active().await?;
        let kind = classify(&list, &household_id).ok_or_else(|| {
            SessionError::NotFound(format!("household {household_id} not found on the server"))
        })?;
        let members = self.backend.household_members(&household_id).await?;
        let available = self.backend.available_accounts(&household_id).await?;
        Ok(compute::available_accounts(
            &household_id,
            kind,
            &user.id,
            &members,
            &available.accounts,
            context,
        )
        .into_iter()
        .cloned()
        .collect())
    }

    /// Current membership of the active household.
    pub async fn members(&self) -> Result<Vec<HouseholdMember>> {
        let (household_id, _, _) = self.require_active().await?;
        Ok(self.backend.household_members(&household_id).await?)
    }

    /// Previews an equal split of `amount` across the active household's
    /// eligible members.
    pub async fn preview_split(&self, amount: Decimal) -> Result<Vec<Split>> {
        let (household_id, list, _) = self.require_active().await?;
        let members = self.backend.household_members(&household_id).await?;

        if classify(&list, &household_id) == Some(HouseholdKind::Shared) {
            limits::check_member_count(members.len())?;
        }
        Ok(compute::equal_split(amount, &members)?)
    }

    /// Updates the caller's personal-account-access flag in the active
    /// household. Account visibility derives from membership, so the
    /// accounts collection is treated as mutated.
    pub async fn set_personal_account_access(&self, allow: bool) -> Result<()> {
        let (household_id, _, _) = self.require_active().await?;
        self.backend
            .set_personal_account_access(&household_id, allow)
            .await?;
        self.coherence
            .record_mutation(CollectionKind::Accounts, &household_id)
            .await;
        Ok(())
    }

    /// Replaces the caller's per-account opt-in list in the active
    /// household.
    pub async fn set_shared_account_ids(&self, account_ids: Vec<String>) -> Result<()> {
        let (household_id, _, _) = self.require_active().await?;
        self.backend
            .set_shared_account_ids(&household_id, &account_ids)
            .await?;
        self.coherence
            .record_mutation(CollectionKind::Accounts, &household_id)
            .await;
        Ok(())
    }

    /// Creates a transaction. Split transactions are validated entirely
    /// client-side first; a draft with any violation is rejected here and
    /// never sent.
    pub async fn create_transaction(
        &self,
        request: CreateTransactionRequest,
    ) -> Result<Transaction> {
        if request.is_split {
            let mut rejection = SettlementRejection::default();
            if request.splits.is_empty() {
                rejection.reason = Some("split transaction has no shares".to_string());
            }
            if !compute::splits_cover_amount(request.amount, &request.splits) {
                rejection.sum_mismatch = true;
            }

            let members = self.backend.household_members(&request.household_id).await?;
            rejection
                .violations
                .extend(compute::validate_participants(&request.splits, &members));

            if request.paid {
                let available = self
                    .backend
                    .available_accounts(&request.household_id)
                    .await?;
                rejection.violations.extend(compute::validate_splits(
                    &request.splits,
                    &available.accounts,
                    request.paid,
                ));
            }

            if !rejection.is_clean() {
                return Err(SessionError::Validation(rejection));
            }
        }

        let transaction = self.backend.create_transaction(&request).await?;
        self.coherence
            .record_mutation(CollectionKind::Transactions, &request.household_id)
            .await;
        Ok(transaction)
    }
}
