use model::account::Account;
use model::transaction::{Split, TransactionType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Response of `GET /accounts/available?householdId=`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableAccounts {
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub has_personal_accounts: bool,
}

/// Request body for `POST /transactions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    pub household_id: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_account_id: Option<String>,
    #[serde(default)]
    pub is_split: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub splits: Vec<Split>,
    #[serde(default)]
    pub paid: bool,
}

impl CreateTransactionRequest {
    /// The wire body carries `{userId, amount}` splits only; the local
    /// split target accounts are a client-side validation concern.
    pub fn for_wire(&self) -> Self {
        let mut request = self.clone();
        for split in &mut request.splits {
            split.account_id = None;
        }
        request
    }
}

/// Body of `PATCH /households/:id/members/me/personal-account-access`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalAccountAccessRequest {
    pub allow_personal_account_access: bool,
}

/// Body of `PATCH /households/:id/members/me/shared-account-ids`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedAccountIdsRequest {
    pub shared_account_ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_body_strips_split_account_ids() {
        let request = CreateTransactionRequest {
            household_id: "h1".to_string(),
            transaction_type: TransactionType::Expense,
            amount: Decimal::new(10_00, 2),
            account_id: Some("a1".to_string()),
            from_account_id: None,
            to_account_id: None,
            is_split: true,
            splits: vec![Split::new("u1", Decimal::new(10_00, 2)).with_account("a1")],
            paid: true,
        };
        let json = serde_json::to_string(&request.for_wire()).unwrap();
        assert!(json.contains("\"accountId\":\"a1\""));
        assert!(!json.contains("splits\":[{\"userId\":\"u1\",\"amount\":10.0,\"accountId\""));
    }
}
