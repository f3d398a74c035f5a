//! In-memory backend for tests.
//!
//! Records every call, serves canned data, and can hold individual
//! fetches behind gates so tests can script in-flight-response races
//! deterministically.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use model::account::Account;
use model::budget::{Budget, SavingsGoal};
use model::category::Category;
use model::household::Household;
use model::member::HouseholdMember;
use model::profile::UserProfile;
use model::recurring::RecurringTransaction;
use model::transaction::Transaction;
use tokio::sync::Notify;

use crate::error::{ApiError, Result};
use crate::types::{AvailableAccounts, CreateTransactionRequest};
use crate::BackendApi;

/// Releases one gated fetch.
#[derive(Clone)]
pub struct GateHandle {
    notify: Arc<Notify>,
}

impl GateHandle {
    pub fn release(&self) {
        self.notify.notify_one();
    }
}

#[derive(Default)]
pub struct StubBackend {
    calls: Mutex<Vec<String>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    households: Mutex<Vec<Household>>,
    members: Mutex<HashMap<String, Vec<HouseholdMember>>>,
    accounts: Mutex<HashMap<String, Vec<Account>>>,
    available: Mutex<HashMap<String, AvailableAccounts>>,
    transactions: Mutex<HashMap<String, Vec<Transaction>>>,
    budgets: Mutex<HashMap<String, Vec<Budget>>>,
    recurring: Mutex<HashMap<String, Vec<RecurringTransaction>>>,
    goals: Mutex<HashMap<String, Vec<SavingsGoal>>>,
    categories: Mutex<HashMap<String, Vec<Category>>>,
    profile: Mutex<Option<UserProfile>>,
    profile_failures: AtomicUsize,
    next_id: AtomicUsize,
}

impl StubBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_households(&self, households: Vec<Household>) {
        *self.households.lock().unwrap() = households;
    }

    pub fn set_members(&self, household_id: &str, members: Vec<HouseholdMember>) {
        self.members
            .lock()
            .unwrap()
            .insert(household_id.to_string(), members);
    }

    pub fn set_accounts(&self, household_id: &str, accounts: Vec<Account>) {
        self.accounts
            .lock()
            .unwrap()
            .insert(household_id.to_string(), accounts);
    }

    pub fn set_available(&self, household_id: &str, available: AvailableAccounts) {
        self.available
            .lock()
            .unwrap()
            .insert(household_id.to_string(), available);
    }

    pub fn set_transactions(&self, household_id: &str, transactions: Vec<Transaction>) {
        self.transactions
            .lock()
            .unwrap()
            .insert(household_id.to_string(), transactions);
    }

    pub fn set_profile(&self, profile: UserProfile) {
        *self.profile.lock().unwrap() = Some(profile);
    }

    /// The next `n` profile fetches fail with a transient network error.
    pub fn fail_profile_times(&self, n: usize) {
        self.profile_failures.store(n, Ordering::SeqCst);
    }

    /// Holds the fetch identified by `key` (e.g. `"transactions:h1"`)
    /// until the returned handle is released.
    pub fn gate(&self, key: &str) -> GateHandle {
        let notify = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(key.to_string(), notify.clone());
        GateHandle { notify }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, key: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.as_str() == key)
            .count()
    }

    fn record(&self, key: &str) {
        self.calls.lock().unwrap().push(key.to_string());
    }

    async fn pass_gate(&self, key: &str) {
        let notify = self.gates.lock().unwrap().get(key).cloned();
        if let Some(notify) = notify {
            notify.notified().await;
        }
    }
}

#[async_trait]
impl BackendApi for StubBackend {
    async fn households(&self) -> Result<Vec<Household>> {
        self.record("households");
        self.pass_gate("households").await;
        Ok(self.households.lock().unwrap().clone())
    }

    async fn household_members(&self, household_id: &str) -> Result<Vec<HouseholdMember>> {
        let key = format!("members:{household_id}");
        self.record(&key);
        self.pass_gate(&key).await;
        Ok(self
            .members
            .lock()
            .unwrap()
            .get(household_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn set_personal_account_access(&self, household_id: &str, allow: bool) -> Result<()> {
        self.record(&format!("patch-access:{household_id}:{allow}"));
        Ok(())
    }

    async fn set_shared_account_ids(
        &self,
        household_id: &str,
        account_ids: &[String],
    ) -> Result<()> {
        self.record(&format!(
            "patch-shared:{household_id}:{}",
            account_ids.join(",")
        ));
        Ok(())
    }

    async fn available_accounts(&self, household_id: &str) -> Result<AvailableAccounts> {
        let key = format!("available:{household_id}");
        self.record(&key);
        self.pass_gate(&key).await;
        Ok(self
            .available
            .lock()
            .unwrap()
            .get(household_id)
            .cloned()
            .unwrap_or(AvailableAccounts {
                accounts: Vec::new(),
                has_personal_accounts: false,
            }))
    }

    async fn create_transaction(&self, request: &CreateTransactionRequest) -> Result<Transaction> {
        self.record("create-transaction");
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let transaction = Transaction {
            id: format!("t{id}"),
            household_id: request.household_id.clone(),
            transaction_type: request.transaction_type,
            amount: request.amount,
            account_id: request.account_id.clone(),
            from_account_id: request.from_account_id.clone(),
            to_account_id: request.to_account_id.clone(),
            is_split: request.is_split,
            splits: request.splits.clone(),
            paid: request.paid,
            date: None,
        };
        self.transactions
            .lock()
            .unwrap()
            .entry(request.household_id.clone())
            .or_default()
            .push(transaction.clone());
        Ok(transaction)
    }

    async fn fetch_profile(&self) -> Result<UserProfile> {
        self.record("profile");
        let remaining = self.profile_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.profile_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(ApiError::Network("stubbed network failure".to_string()));
        }
        self.profile
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ApiError::Status {
                status: 404,
                message: "no profile configured".to_string(),
            })
    }

    async fn transactions(&self, household_id: &str) -> Result<Vec<Transaction>> {
        let key = format!("transactions:{household_id}");
        self.record(&key);
        self.pass_gate(&key).await;
        Ok(self
            .transactions
            .lock()
            .unwrap()
            .get(household_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn accounts(&self, household_id: &str) -> Result<Vec<Account>> {
        let key = format!("accounts:{household_id}");
        self.record(&key);
        self.pass_gate(&key).await;
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .get(household_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn budgets(&self, household_id: &str) -> Result<Vec<Budget>> {
        let key = format!("budgets:{household_id}");
        self.record(&key);
        self.pass_gate(&key).await;
        Ok(self
            .budgets
            .lock()
            .unwrap()
            .get(household_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn recurring_transactions(
        &self,
        household_id: &str,
    ) -> Result<Vec<RecurringTransaction>> {
        let key = format!("recurring:{household_id}");
        self.record(&key);
        self.pass_gate(&key).await;
        Ok(self
            .recurring
            .lock()
            .unwrap()
            .get(household_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn savings_goals(&self, household_id: &str) -> Result<Vec<SavingsGoal>> {
        let key = format!("goals:{household_id}");
        self.record(&key);
        self.pass_gate(&key).await;
        Ok(self
            .goals
            .lock()
            .unwrap()
            .get(household_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn categories(&self, household_id: &str) -> Result<Vec<Category>> {
        let key = format!("categories:{household_id}");
        self.record(&key);
        self.pass_gate(&key).await;
        Ok(self
            .categories
            .lock()
            .unwrap()
            .get(household_id)
            .cloned()
            .unwrap_or_default())
    }
}
