use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A per-category spending budget inside one household.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: String,
    pub household_id: String,
    pub name: String,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Budget month in `YYYY-MM` form; absent for rolling budgets.
    #[serde(default)]
    pub month: Option<String>,
}

/// A savings goal tracked against a household.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsGoal {
    pub id: String,
    pub household_id: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub target_amount: Decimal,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub saved_amount: Decimal,
}
