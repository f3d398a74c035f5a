//! Equal-split settlement arithmetic with an exact-sum guarantee.

use std::collections::HashMap;

use model::account::Account;
use model::member::HouseholdMember;
use model::transaction::Split;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

use crate::error::{ComputeError, Result};

pub mod plan;

/// Accepted rounding tolerance between a transaction total and the sum of
/// its shares.
pub fn amount_tolerance() -> Decimal {
    Decimal::new(1, 2)
}

/// Why a split fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitViolation {
    /// The share exceeds the target account's available balance.
    InsufficientBalance,
    /// The split has no resolvable target account to settle against.
    MissingAccount,
    /// The participant is not an editing member of the household.
    IneligibleParticipant,
}

/// Members who can take part in a settlement: editing role and a
/// resolvable user record, in membership order.
pub fn eligible_participants(members: &[HouseholdMember]) -> Vec<&HouseholdMember> {
    members
        .iter()
        .filter(|member| member.role.can_edit() && member.is_resolvable())
        .collect()
}

/// Divides `amount` equally across the eligible participants.
///
/// Every share is rounded to 2 decimal places; the last participant in
/// membership order takes `amount` minus the sum of the other rounded
/// shares, so the total is exact to the cent regardless of rounding drift.
pub fn equal_split(amount: Decimal, members: &[HouseholdMember]) -> Result<Vec<Split>> {
    if amount.is_sign_negative() {
        return Err(ComputeError::InvalidAmount(format!(
            "cannot split negative amount {amount}"
        )));
    }

    let participants = eligible_participants(members);
    let count = participants.len();
    if count == 0 {
        return Err(ComputeError::NoEligibleParticipants);
    }

    let share = (amount / Decimal::from(count))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    let mut splits: Vec<Split> = participants
        .iter()
        .take(count - 1)
        .map(|member| Split::new(member.user_id.clone(), share))
        .collect();

    let assigned: Decimal = share * Decimal::from(count - 1);
    let remainder = (amount - assigned)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    splits.push(Split::new(
        participants[count - 1].user_id.clone(),
        remainder,
    ));

    debug!(%amount, participants = count, %share, %remainder, "computed equal split");
    Ok(splits)
}

/// Whether the shares cover the transaction total within the accepted
/// tolerance.
pub fn splits_cover_amount(amount: Decimal, splits: &[Split]) -> bool {
    let sum: Decimal = splits.iter().map(|split| split.amount).sum();
    (sum - amount).abs() <= amount_tolerance()
}

/// Checks that every split participant is an eligible member of the
/// household, keyed by participant user id.
pub fn validate_participants(
    splits: &[Split],
    members: &[HouseholdMember],
) -> HashMap<String, SplitViolation> {
    let eligible: Vec<&str> = eligible_participants(members)
        .iter()
        .map(|member| member.user_id.as_str())
        .collect();
    splits
        .iter()
        .filter(|split| !eligible.contains(&split.user_id.as_str()))
        .map(|split| {
            (
                split.user_id.clone(),
                SplitViolation::IneligibleParticipant,
            )
        })
        .collect()
}

/// Balance validation for a settlement, keyed by participant user id.
///
/// Runs only when the parent transaction is `paid`; unpaid or scheduled
/// transactions do not reserve balance yet. Credit accounts are exempt: a
/// negative balance is their normal operating mode.
pub fn validate_splits(
    splits: &[Split],
    accounts: &[Account],
    paid: bool,
) -> HashMap<String, SplitViolation> {
    let mut violations = HashMap::new();
    if !paid {
        return violations;
    }

    for split in splits {
        let Some(account_id) = split.account_id.as_deref() else {
            violations.insert(split.user_id.clone(), SplitViolation::MissingAccount);
            continue;
        };
        let Some(account) = accounts.iter().find(|a| a.id == account_id) else {
            violations.insert(split.user_id.clone(), SplitViolation::MissingAccount);
            continue;
        };
        if account.is_credit() {
            continue;
        }
        if split.amount > account.available_balance() {
            debug!(
                user_id = %split.user_id,
                account_id,
                share = %split.amount,
                available = %account.available_balance(),
                "insufficient balance for split"
            );
            violations.insert(split.user_id.clone(), SplitViolation::InsufficientBalance);
        }
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::account::AccountType;
    use model::household::HouseholdRole;
    use model::user::User;

    fn member(user_id: &str, role: HouseholdRole) -> HouseholdMember {
        HouseholdMember {
            id: format!("m-{user_id}"),
            user_id: user_id.to_string(),
            role,
            allow_personal_account_access: false,
            shared_account_ids: Vec::new(),
            user: Some(User::new(user_id, format!("{user_id}@example.com"))),
        }
    }

    fn account(id: &str, account_type: AccountType, balance: i64, reserved: i64) -> Account {
        Account {
            id: id.to_string(),
            owner_household_id: "h1".to_string(),
            name: id.to_string(),
            account_type,
            balance: Decimal::new(balance, 2),
            reserved: Decimal::new(reserved, 2),
            is_personal: false,
            account_owner_id: None,
        }
    }

    #[test]
    fn even_amount_splits_evenly() {
        let members = vec![
            member("u1", HouseholdRole::Owner),
            member("u2", HouseholdRole::Editor),
        ];
        let splits = equal_split(Decimal::new(10_00, 2), &members).unwrap();
        assert_eq!(splits.len(), 2);
        assert_eq!(splits[0].user_id, "u1");
        assert_eq!(splits[0].amount, Decimal::new(5_00, 2));
        assert_eq!(splits[1].user_id, "u2");
        assert_eq!(splits[1].amount, Decimal::new(5_00, 2));
    }

    #[test]
    fn odd_cent_goes_to_last_participant() {
        let members = vec![
            member("u1", HouseholdRole::Owner),
            member("u2", HouseholdRole::Editor),
        ];
        let splits = equal_split(Decimal::new(10_01, 2), &members).unwrap();
        assert_eq!(splits[0].amount, Decimal::new(5_00, 2));
        assert_eq!(splits[1].amount, Decimal::new(5_01, 2));
    }

    #[test]
    fn thirds_sum_exactly() {
        let members = vec![
            member("u1", HouseholdRole::Owner),
            member("u2", HouseholdRole::Editor),
            member("u3", HouseholdRole::Editor),
        ];
        let amount = Decimal::new(100_00, 2);
        let splits = equal_split(amount, &members).unwrap();
        assert_eq!(splits[0].amount, Decimal::new(33_33, 2));
        assert_eq!(splits[1].amount, Decimal::new(33_33, 2));
        assert_eq!(splits[2].amount, Decimal::new(33_34, 2));
        let sum: Decimal = splits.iter().map(|s| s.amount).sum();
        assert_eq!(sum, amount);
    }

    #[test]
    fn awkward_amounts_always_sum_exactly() {
        let members: Vec<_> = (1..=7)
            .map(|i| member(&format!("u{i}"), HouseholdRole::Editor))
            .collect();
        for cents in [1, 10, 99, 101, 1_000, 12_345, 99_999] {
            for count in 1..=members.len() {
                let amount = Decimal::new(cents, 2);
                let splits = equal_split(amount, &members[..count]).unwrap();
                let sum: Decimal = splits.iter().map(|s| s.amount).sum();
                assert_eq!(sum, amount, "{cents} cents over {count} participants");
            }
        }
    }

    #[test]
    fn single_participant_takes_everything() {
        let members = vec![member("u1", HouseholdRole::Owner)];
        let splits = equal_split(Decimal::new(7_77, 2), &members).unwrap();
        assert_eq!(splits.len(), 1);
        assert_eq!(splits[0].amount, Decimal::new(7_77, 2));
    }

    #[test]
    fn viewers_and_unresolvable_members_are_excluded() {
        let mut ghost = member("u3", HouseholdRole::Editor);
        ghost.user = None;
        let members = vec![
            member("u1", HouseholdRole::Owner),
            member("u2", HouseholdRole::Viewer),
            ghost,
        ];
        let splits = equal_split(Decimal::new(10_00, 2), &members).unwrap();
        assert_eq!(splits.len(), 1);
        assert_eq!(splits[0].user_id, "u1");
    }

    #[test]
    fn no_eligible_participants_is_an_error() {
        let members = vec![member("u1", HouseholdRole::Viewer)];
        assert!(matches!(
            equal_split(Decimal::new(10_00, 2), &members),
            Err(ComputeError::NoEligibleParticipants)
        ));
    }

    #[test]
    fn negative_amount_is_rejected() {
        let members = vec![member("u1", HouseholdRole::Owner)];
        assert!(matches!(
            equal_split(Decimal::new(-1, 2), &members),
            Err(ComputeError::InvalidAmount(_))
        ));
    }

    #[test]
    fn sum_tolerance_accepts_one_cent_of_drift() {
        let splits = vec![
            Split::new("u1", Decimal::new(5_00, 2)),
            Split::new("u2", Decimal::new(5_01, 2)),
        ];
        assert!(splits_cover_amount(Decimal::new(10_00, 2), &splits));
        assert!(!splits_cover_amount(Decimal::new(10_03, 2), &splits));
    }

    #[test]
    fn credit_accounts_are_exempt_from_balance_validation() {
        let accounts = vec![account("cc", AccountType::Credit, -500_00, 0)];
        let splits =
            vec![Split::new("u1", Decimal::new(100_00, 2)).with_account("cc")];
        assert!(validate_splits(&splits, &accounts, true).is_empty());
    }

    #[test]
    fn insufficient_available_balance_is_flagged() {
        // 100.00 balance with 80.00 reserved leaves 20.00 available.
        let accounts = vec![account("ch", AccountType::Checking, 100_00, 80_00)];
        let splits =
            vec![Split::new("u1", Decimal::new(25_00, 2)).with_account("ch")];
        let violations = validate_splits(&splits, &accounts, true);
        assert_eq!(
            violations.get("u1"),
            Some(&SplitViolation::InsufficientBalance)
        );
    }

    #[test]
    fn unpaid_transactions_skip_validation() {
        let accounts = vec![account("ch", AccountType::Checking, 1_00, 0)];
        let splits =
            vec![Split::new("u1", Decimal::new(25_00, 2)).with_account("ch")];
        assert!(validate_splits(&splits, &accounts, false).is_empty());
    }

    #[test]
    fn non_members_and_viewers_are_flagged_as_participants() {
        let members = vec![
            member("u1", HouseholdRole::Owner),
            member("u2", HouseholdRole::Viewer),
        ];
        let splits = vec![
            Split::new("u1", Decimal::new(5_00, 2)),
            Split::new("u2", Decimal::new(2_50, 2)),
            Split::new("stranger", Decimal::new(2_50, 2)),
        ];
        let violations = validate_participants(&splits, &members);
        assert!(!violations.contains_key("u1"));
        assert_eq!(
            violations.get("u2"),
            Some(&SplitViolation::IneligibleParticipant)
        );
        assert_eq!(
            violations.get("stranger"),
            Some(&SplitViolation::IneligibleParticipant)
        );
    }

    #[test]
    fn missing_target_account_is_flagged_when_paid() {
        let accounts = vec![account("ch", AccountType::Checking, 100_00, 0)];
        let splits = vec![
            Split::new("u1", Decimal::new(5_00, 2)),
            Split::new("u2", Decimal::new(5_00, 2)).with_account("gone"),
        ];
        let violations = validate_splits(&splits, &accounts, true);
        assert_eq!(violations.get("u1"), Some(&SplitViolation::MissingAccount));
        assert_eq!(violations.get("u2"), Some(&SplitViolation::MissingAccount));
    }
}
