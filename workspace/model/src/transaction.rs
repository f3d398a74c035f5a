use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The kind of transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Income,
    Expense,
    Transfer,
    Allocation,
}

/// One member's share of a split expense, settled against a chosen account.
///
/// `account_id` is absent on the wire for `POST /transactions` (the server
/// derives it), but balance validation requires it locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Split {
    pub user_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
}

impl Split {
    pub fn new(user_id: impl Into<String>, amount: Decimal) -> Self {
        Self {
            user_id: user_id.into(),
            amount,
            account_id: None,
        }
    }

    pub fn with_account(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }
}

/// A transaction as stored by the backend.
///
/// Invariant: when `is_split` is true, `splits` is non-empty, every
/// participant belongs to the transaction's household with an editing
/// role, and the split amounts sum to `amount` within the accepted
/// rounding tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub household_id: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub from_account_id: Option<String>,
    #[serde(default)]
    pub to_account_id: Option<String>,
    #[serde(default)]
    pub is_split: bool,
    #[serde(default)]
    pub splits: Vec<Split>,
    /// Unpaid or scheduled transactions do not reserve balance yet.
    #[serde(default)]
    pub paid: bool,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}
