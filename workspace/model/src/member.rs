use serde::{Deserialize, Serialize};

use crate::household::HouseholdRole;
use crate::user::User;

/// One user's participation inside one household, as reported by
/// `GET /households/:id/members`.
///
/// The sharing posture (`allow_personal_account_access` plus
/// `shared_account_ids`) is a property of the *membership*, not of the
/// accounts themselves: the same account can be exposed in one household
/// and hidden in another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdMember {
    pub id: String,
    pub user_id: String,
    pub role: HouseholdRole,
    #[serde(default)]
    pub allow_personal_account_access: bool,
    #[serde(default)]
    pub shared_account_ids: Vec<String>,
    #[serde(default)]
    pub user: Option<User>,
}

impl HouseholdMember {
    /// Whether this member has opted the given personal account into the
    /// household. Exposure additionally requires
    /// `allow_personal_account_access`; this checks the id list only.
    pub fn shares(&self, account_id: &str) -> bool {
        self.shared_account_ids.iter().any(|id| id == account_id)
    }

    /// A member is resolvable when the server could attach a user record
    /// with a usable email. Unresolvable members cannot take part in a
    /// split settlement.
    pub fn is_resolvable(&self) -> bool {
        self.user
            .as_ref()
            .is_some_and(|user| !user.email.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(user_id: &str, shared: &[&str]) -> HouseholdMember {
        HouseholdMember {
            id: format!("m-{user_id}"),
            user_id: user_id.to_string(),
            role: HouseholdRole::Editor,
            allow_personal_account_access: true,
            shared_account_ids: shared.iter().map(|s| s.to_string()).collect(),
            user: Some(User::new(user_id, format!("{user_id}@example.com"))),
        }
    }

    #[test]
    fn shares_checks_the_id_list() {
        let m = member("u1", &["a1", "a2"]);
        assert!(m.shares("a1"));
        assert!(!m.shares("a3"));
    }

    #[test]
    fn member_without_user_is_not_resolvable() {
        let mut m = member("u1", &[]);
        assert!(m.is_resolvable());
        m.user = None;
        assert!(!m.is_resolvable());
    }

    #[test]
    fn member_with_empty_email_is_not_resolvable() {
        let mut m = member("u1", &[]);
        m.user = Some(User::new("u1", ""));
        assert!(!m.is_resolvable());
    }

    #[test]
    fn deserializes_wire_shape() {
        let json = r#"{
            "id": "m1",
            "userId": "u1",
            "role": "OWNER",
            "allowPersonalAccountAccess": true,
            "sharedAccountIds": ["a1"],
            "user": {"id": "u1", "email": "u1@example.com"}
        }"#;
        let m: HouseholdMember = serde_json::from_str(json).unwrap();
        assert_eq!(m.user_id, "u1");
        assert!(m.allow_personal_account_access);
        assert_eq!(m.shared_account_ids, vec!["a1".to_string()]);
    }
}
