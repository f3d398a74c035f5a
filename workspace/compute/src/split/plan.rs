//! Re-split triggering for the split editing flow.
//!
//! A plan recomputes shares on first activation and whenever the
//! participant set changes, and at no other time. In particular an amount
//! edit never recomputes, so a user's manual per-participant shares are
//! not discarded by a later keystroke in the amount field.

use model::member::HouseholdMember;
use model::transaction::Split;
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::Result;
use crate::split::{self, eligible_participants};

/// The split state of one transaction being edited.
#[derive(Debug, Clone, Default)]
pub struct SplitPlan {
    splits: Vec<Split>,
    /// Participant fingerprint at the last automatic split, in membership
    /// order.
    participant_ids: Vec<String>,
    activated: bool,
    manual: bool,
}

impl SplitPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn splits(&self) -> &[Split] {
        &self.splits
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }

    /// Whether any share has been hand-edited since the last automatic
    /// split.
    pub fn is_manual(&self) -> bool {
        self.manual
    }

    /// Brings the plan up to date with the current form state. Recomputes
    /// an equal split on first activation or when the eligible participant
    /// set differs from the last automatic split; otherwise leaves the
    /// shares untouched, manual edits included. Returns whether a re-split
    /// happened.
    pub fn ensure(&mut self, amount: Decimal, members: &[HouseholdMember]) -> Result<bool> {
        let current_ids: Vec<String> = eligible_participants(members)
            .iter()
            .map(|member| member.user_id.clone())
            .collect();

        if self.activated && current_ids == self.participant_ids {
            return Ok(false);
        }

        self.splits = split::equal_split(amount, members)?;
        self.participant_ids = current_ids;
        self.activated = true;
        self.manual = false;
        debug!(participants = self.participant_ids.len(), "re-split plan");
        Ok(true)
    }

    /// Hand-edits one participant's share. Returns false when the user is
    /// not part of the plan.
    pub fn set_share(&mut self, user_id: &str, amount: Decimal) -> bool {
        match self.splits.iter_mut().find(|s| s.user_id == user_id) {
            Some(split) => {
                split.amount = amount;
                self.manual = true;
                true
            }
            None => false,
        }
    }

    /// Picks the account one participant settles against.
    pub fn set_account(&mut self, user_id: &str, account_id: &str) -> bool {
        match self.splits.iter_mut().find(|s| s.user_id == user_id) {
            Some(split) => {
                split.account_id = Some(account_id.to_string());
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::household::HouseholdRole;
    use model::user::User;

    fn member(user_id: &str) -> HouseholdMember {
        HouseholdMember {
            id: format!("m-{user_id}"),
            user_id: user_id.to_string(),
            role: HouseholdRole::Editor,
            allow_personal_account_access: false,
            shared_account_ids: Vec::new(),
            user: Some(User::new(user_id, format!("{user_id}@example.com"))),
        }
    }

    #[test]
    fn first_activation_splits() {
        let members = vec![member("u1"), member("u2")];
        let mut plan = SplitPlan::new();
        assert!(plan.ensure(Decimal::new(10_00, 2), &members).unwrap());
        assert_eq!(plan.splits().len(), 2);
        assert!(plan.is_activated());
    }

    #[test]
    fn amount_change_alone_does_not_resplit() {
        let members = vec![member("u1"), member("u2")];
        let mut plan = SplitPlan::new();
        plan.ensure(Decimal::new(10_00, 2), &members).unwrap();
        plan.set_share("u1", Decimal::new(7_00, 2));

        // Same participants, new amount: manual share survives.
        assert!(!plan.ensure(Decimal::new(20_00, 2), &members).unwrap());
        assert_eq!(plan.splits()[0].amount, Decimal::new(7_00, 2));
        assert!(plan.is_manual());
    }

    #[test]
    fn participant_change_resplits_and_clears_manual_edits() {
        let mut members = vec![member("u1"), member("u2")];
        let mut plan = SplitPlan::new();
        plan.ensure(Decimal::new(10_00, 2), &members).unwrap();
        plan.set_share("u1", Decimal::new(7_00, 2));

        members.push(member("u3"));
        assert!(plan.ensure(Decimal::new(9_00, 2), &members).unwrap());
        assert_eq!(plan.splits().len(), 3);
        assert!(!plan.is_manual());
        assert_eq!(plan.splits()[0].amount, Decimal::new(3_00, 2));
    }

    #[test]
    fn set_share_rejects_unknown_participant() {
        let members = vec![member("u1")];
        let mut plan = SplitPlan::new();
        plan.ensure(Decimal::new(10_00, 2), &members).unwrap();
        assert!(!plan.set_share("stranger", Decimal::new(1_00, 2)));
    }

    #[test]
    fn set_account_assigns_target() {
        let members = vec![member("u1")];
        let mut plan = SplitPlan::new();
        plan.ensure(Decimal::new(10_00, 2), &members).unwrap();
        assert!(plan.set_account("u1", "acct-1"));
        assert_eq!(plan.splits()[0].account_id.as_deref(), Some("acct-1"));
    }
}
