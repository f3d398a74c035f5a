//! Account visibility for transaction entry.
//!
//! The server enforces the same rules behind `GET /accounts/available`;
//! this is the client-side copy and must not diverge from it.

use model::account::{Account, AccountType};
use model::household::HouseholdKind;
use model::member::HouseholdMember;
use tracing::trace;

/// The flow an account list is being assembled for. Investment accounts
/// only surface in explicit investment flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountContext {
    TransactionEntry,
    InvestmentFlow,
}

/// Computes which accounts `current_user_id` may use for a transaction in
/// the given household. Pure function of its inputs; callers must refetch
/// `members` after any permission mutation before calling again.
///
/// Personal household: only accounts owned by that household. Shared
/// household: the household's own accounts, each member's personal
/// accounts opted in through their sharing posture, and always the full
/// set of the current user's own personal accounts.
pub fn available_accounts<'a>(
    household_id: &str,
    kind: HouseholdKind,
    current_user_id: &str,
    members: &[HouseholdMember],
    accounts: &'a [Account],
    context: AccountContext,
) -> Vec<&'a Account> {
    accounts
        .iter()
        .filter(|account| {
            if context == AccountContext::TransactionEntry
                && account.account_type == AccountType::Investment
            {
                return false;
            }
            match kind {
                HouseholdKind::Personal => account.owner_household_id == household_id,
                HouseholdKind::Shared => {
                    visible_in_shared(household_id, current_user_id, members, account)
                }
            }
        })
        .inspect(|account| {
            trace!(account_id = %account.id, household_id, "account visible");
        })
        .collect()
}

fn visible_in_shared(
    household_id: &str,
    current_user_id: &str,
    members: &[HouseholdMember],
    account: &Account,
) -> bool {
    // The household's own accounts are always usable by its members.
    if account.owner_household_id == household_id {
        return true;
    }
    if !account.is_personal {
        return false;
    }
    let Some(owner_id) = account.account_owner_id.as_deref() else {
        return false;
    };
    // You can always use your own money, whatever your posture says.
    if owner_id == current_user_id {
        return true;
    }
    // Anyone else's personal account requires both halves of the owner's
    // sharing posture: the access flag and the per-account opt-in.
    members
        .iter()
        .find(|member| member.user_id == owner_id)
        .is_some_and(|member| member.allow_personal_account_access && member.shares(&account.id))
}
