use serde::{Deserialize, Serialize};

/// A transaction category belonging to one household.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub household_id: String,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
}
