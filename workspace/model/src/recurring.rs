use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::transaction::TransactionType;

/// How often a recurring transaction repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecurrencePeriod {
    Weekly,
    Monthly,
    Yearly,
}

/// A recurring transaction template belonging to one household.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringTransaction {
    pub id: String,
    pub household_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub period: RecurrencePeriod,
    #[serde(default)]
    pub account_id: Option<String>,
}
