//! `reqwest` implementation of the backend surface.

use std::time::Duration;

use async_trait::async_trait;
use model::account::Account;
use model::budget::{Budget, SavingsGoal};
use model::category::Category;
use model::household::Household;
use model::member::HouseholdMember;
use model::profile::UserProfile;
use model::recurring::RecurringTransaction;
use model::transaction::Transaction;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::decode;
use crate::error::{ApiError, Result};
use crate::types::{
    AvailableAccounts, CreateTransactionRequest, PersonalAccountAccessRequest,
    SharedAccountIdsRequest,
};
use crate::BackendApi;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Shape of backend error bodies, best-effort.
#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

pub struct HttpBackend {
    base_url: String,
    auth_token: Option<String>,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, auth_token: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| ApiError::Network(format!("failed to build client: {err}")))?;
        Ok(Self {
            base_url: base_url.into(),
            auth_token,
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => request.header("Authorization", format!("Bearer {token}")),
            None => request,
        }
    }

    /// Turns a non-success response into an `ApiError::Status` with the
    /// best available backend-provided message.
    async fn status_error(response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body
                .message
                .or(body.error)
                .unwrap_or_else(|| format!("HTTP {status}")),
            Err(_) => format!("HTTP {status}"),
        };
        ApiError::Status { status, message }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!(path, "GET");
        let response = self
            .apply_auth(self.client.get(self.url(path)))
            .send()
            .await
            .map_err(|err| {
                error!(path, %err, "GET failed");
                ApiError::from(err)
            })?;
        if !response.status().is_success() {
            let err = Self::status_error(response).await;
            warn!(path, %err, "GET returned error status");
            return Err(err);
        }
        response.json::<T>().await.map_err(|err| {
            error!(path, %err, "GET response failed to decode");
            ApiError::Decode(err.to_string())
        })
    }

    async fn patch_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        debug!(path, "PATCH");
        let response = self
            .apply_auth(self.client.patch(self.url(path)))
            .json(body)
            .send()
            .await
            .map_err(|err| {
                error!(path, %err, "PATCH failed");
                ApiError::from(err)
            })?;
        if !response.status().is_success() {
            let err = Self::status_error(response).await;
            warn!(path, %err, "PATCH returned error status");
            return Err(err);
        }
        Ok(())
    }

    async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        debug!(path, "POST");
        let response = self
            .apply_auth(self.client.post(self.url(path)))
            .json(body)
            .send()
            .await
            .map_err(|err| {
                error!(path, %err, "POST failed");
                ApiError::from(err)
            })?;
        if !response.status().is_success() {
            let err = Self::status_error(response).await;
            warn!(path, %err, "POST returned error status");
            return Err(err);
        }
        response.json::<T>().await.map_err(|err| {
            error!(path, %err, "POST response failed to decode");
            ApiError::Decode(err.to_string())
        })
    }
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn households(&self) -> Result<Vec<Household>> {
        let value: Value = self.get_json("/households").await?;
        Ok(decode::households_from_value(value))
    }

    async fn household_members(&self, household_id: &str) -> Result<Vec<HouseholdMember>> {
        self.get_json(&format!("/households/{household_id}/members"))
            .await
    }

    async fn set_personal_account_access(&self, household_id: &str, allow: bool) -> Result<()> {
        self.patch_json(
            &format!("/households/{household_id}/members/me/personal-account-access"),
            &PersonalAccountAccessRequest {
                allow_personal_account_access: allow,
            },
        )
        .await
    }

    async fn set_shared_account_ids(
        &self,
        household_id: &str,
        account_ids: &[String],
    ) -> Result<()> {
        self.patch_json(
            &format!("/households/{household_id}/members/me/shared-account-ids"),
            &SharedAccountIdsRequest {
                shared_account_ids: account_ids.to_vec(),
            },
        )
        .await
    }

    async fn available_accounts(&self, household_id: &str) -> Result<AvailableAccounts> {
        self.get_json(&format!("/accounts/available?householdId={household_id}"))
            .await
    }

    async fn create_transaction(&self, request: &CreateTransactionRequest) -> Result<Transaction> {
        self.post_json("/transactions", &request.for_wire()).await
    }

    async fn fetch_profile(&self) -> Result<UserProfile> {
        self.get_json("/users/me").await
    }

    async fn transactions(&self, household_id: &str) -> Result<Vec<Transaction>> {
        self.get_json(&format!("/transactions?householdId={household_id}"))
            .await
    }

    async fn accounts(&self, household_id: &str) -> Result<Vec<Account>> {
        self.get_json(&format!("/accounts?householdId={household_id}"))
            .await
    }

    async fn budgets(&self, household_id: &str) -> Result<Vec<Budget>> {
        self.get_json(&format!("/budgets?householdId={household_id}"))
            .await
    }

    async fn recurring_transactions(
        &self,
        household_id: &str,
    ) -> Result<Vec<RecurringTransaction>> {
        self.get_json(&format!("/recurring-transactions?householdId={household_id}"))
            .await
    }

    async fn savings_goals(&self, household_id: &str) -> Result<Vec<SavingsGoal>> {
        self.get_json(&format!("/savings-goals?householdId={household_id}"))
            .await
    }

    async fn categories(&self, household_id: &str) -> Result<Vec<Category>> {
        self.get_json(&format!("/categories?householdId={household_id}"))
            .await
    }
}
