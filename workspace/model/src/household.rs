use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The role a user holds inside one household.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HouseholdRole {
    Owner,
    Editor,
    Viewer,
}

impl HouseholdRole {
    /// Whether this role may create or modify transactions, and therefore
    /// participate in expense splits.
    pub fn can_edit(&self) -> bool {
        matches!(self, HouseholdRole::Owner | HouseholdRole::Editor)
    }

    pub fn can_delete_household(&self) -> bool {
        matches!(self, HouseholdRole::Owner)
    }
}

/// One household a user belongs to, as reported by `GET /households`.
///
/// `role` is the role of the *current* user within this household, not a
/// property of the household itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Household {
    pub id: String,
    pub name: String,
    pub role: HouseholdRole,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub joined_at: Option<DateTime<Utc>>,
}

/// Whether a household is the user's implicit personal context or an
/// explicitly created shared one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HouseholdKind {
    Personal,
    Shared,
}

/// Total order over a user's households: oldest first, id as tie-break so
/// the order is stable across reloads.
fn creation_order(a: &Household, b: &Household) -> Ordering {
    a.created_at
        .cmp(&b.created_at)
        .then_with(|| a.id.cmp(&b.id))
}

/// The user's personal household: the oldest one they belong to.
pub fn personal_household(households: &[Household]) -> Option<&Household> {
    households.iter().min_by(|a, b| creation_order(a, b))
}

/// Classifies `id` against the user's full household list. Returns `None`
/// when the id is not in the list at all.
pub fn classify(households: &[Household], id: &str) -> Option<HouseholdKind> {
    let found = households.iter().any(|h| h.id == id);
    if !found {
        return None;
    }
    match personal_household(households) {
        Some(personal) if personal.id == id => Some(HouseholdKind::Personal),
        Some(_) => Some(HouseholdKind::Shared),
        None => None,
    }
}

/// The single locally persisted record of "the household the user has
/// explicitly chosen to act in". Client-local, never server-authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRecord {
    pub id: String,
    pub name: String,
    pub role: HouseholdRole,
    pub timestamp: DateTime<Utc>,
}

impl SelectionRecord {
    pub fn from_household(household: &Household, at: DateTime<Utc>) -> Self {
        Self {
            id: household.id.clone(),
            name: household.name.clone(),
            role: household.role,
            timestamp: at,
        }
    }
}
