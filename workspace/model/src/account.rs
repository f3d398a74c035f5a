use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The kind of account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    Checking,
    Savings,
    Credit,
    Cash,
    Investment,
}

/// A financial account. An account belongs to exactly one household and
/// never moves between households; if personal, it has a designated owning
/// member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub owner_household_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// Current booked balance.
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    /// Amount already allocated or reserved against this account by paid
    /// transactions that have not settled yet.
    #[serde(default, with = "rust_decimal::serde::float")]
    pub reserved: Decimal,
    #[serde(default)]
    pub is_personal: bool,
    #[serde(default)]
    pub account_owner_id: Option<String>,
}

impl Account {
    /// Balance still available for new paid transactions.
    pub fn available_balance(&self) -> Decimal {
        self.balance - self.reserved
    }

    /// Credit accounts represent a limit, not a balance; a negative balance
    /// is their normal operating mode.
    pub fn is_credit(&self) -> bool {
        self.account_type == AccountType::Credit
    }
}
