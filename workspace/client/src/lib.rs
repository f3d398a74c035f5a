pub mod decode;
pub mod error;
pub mod http;
pub mod testing;
pub mod types;

use async_trait::async_trait;
use model::account::Account;
use model::budget::{Budget, SavingsGoal};
use model::category::Category;
use model::household::Household;
use model::member::HouseholdMember;
use model::profile::UserProfile;
use model::recurring::RecurringTransaction;
use model::transaction::Transaction;

pub use error::{ApiError, Result};
pub use http::HttpBackend;
pub use types::{AvailableAccounts, CreateTransactionRequest};

/// The REST collaborator surface this core consumes. Shapes only; the
/// backend's business logic is out of scope and must not be re-specified
/// here.
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// `GET /households`: the households the authenticated user belongs
    /// to. Implementations must tolerate and discard malformed entries.
    async fn households(&self) -> Result<Vec<Household>>;

    /// `GET /households/:id/members`
    async fn household_members(&self, household_id: &str) -> Result<Vec<HouseholdMember>>;

    /// `PATCH /households/:id/members/me/personal-account-access`
    async fn set_personal_account_access(&self, household_id: &str, allow: bool) -> Result<()>;

    /// `PATCH /households/:id/members/me/shared-account-ids`
    async fn set_shared_account_ids(
        &self,
        household_id: &str,
        account_ids: &[String],
    ) -> Result<()>;

    /// `GET /accounts/available?householdId=`: the server-side copy of
    /// the permission rules.
    async fn available_accounts(&self, household_id: &str) -> Result<AvailableAccounts>;

    /// `POST /transactions`
    async fn create_transaction(&self, request: &CreateTransactionRequest) -> Result<Transaction>;

    /// `GET /users/me`, the identity sync target.
    async fn fetch_profile(&self) -> Result<UserProfile>;

    // Collection fetches driven by the cache coherence layer.
    async fn transactions(&self, household_id: &str) -> Result<Vec<Transaction>>;
    async fn accounts(&self, household_id: &str) -> Result<Vec<Account>>;
    async fn budgets(&self, household_id: &str) -> Result<Vec<Budget>>;
    async fn recurring_transactions(&self, household_id: &str)
    -> Result<Vec<RecurringTransaction>>;
    async fn savings_goals(&self, household_id: &str) -> Result<Vec<SavingsGoal>>;
    async fn categories(&self, household_id: &str) -> Result<Vec<Category>>;
}
