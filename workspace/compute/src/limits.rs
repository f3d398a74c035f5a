//! Product limits on household composition.
//!
//! These numbers are product decisions, not invariants of the domain; they
//! are expected to change and must only be referenced through this module.

use crate::error::{ComputeError, Result};

/// A shared household supports at most this many active members.
pub const MAX_ACTIVE_MEMBERS_PER_SHARED_HOUSEHOLD: usize = 2;

/// A user may belong to at most this many shared households at a time.
pub const MAX_SHARED_HOUSEHOLDS_PER_USER: usize = 1;

/// Checks a prospective member count for a shared household.
pub fn check_member_count(count: usize) -> Result<()> {
    if count > MAX_ACTIVE_MEMBERS_PER_SHARED_HOUSEHOLD {
        return Err(ComputeError::LimitExceeded(format!(
            "shared households support at most {MAX_ACTIVE_MEMBERS_PER_SHARED_HOUSEHOLD} active members, got {count}"
        )));
    }
    Ok(())
}

/// Checks how many shared households a user would belong to.
pub fn check_shared_household_count(count: usize) -> Result<()> {
    if count > MAX_SHARED_HOUSEHOLDS_PER_USER {
        return Err(ComputeError::LimitExceeded(format!(
            "users may belong to at most {MAX_SHARED_HOUSEHOLDS_PER_USER} shared household, got {count}"
        )));
    }
    Ok(())
}
