use std::collections::HashMap;
use std::fmt;

use client::ApiError;
use compute::SplitViolation;
use thiserror::Error;
use tracing::error;

/// Why a split settlement was rejected client-side.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettlementRejection {
    /// The shares do not cover the transaction total within tolerance.
    pub sum_mismatch: bool,
    /// Per-participant violations (balance, eligibility, missing target).
    pub violations: HashMap<String, SplitViolation>,
    /// A structural reason that predates per-participant checks, e.g. no
    /// eligible participants at all.
    pub reason: Option<String>,
}

impl SettlementRejection {
    pub fn is_clean(&self) -> bool {
        !self.sum_mismatch && self.violations.is_empty() && self.reason.is_none()
    }
}

impl fmt::Display for SettlementRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(reason) = &self.reason {
            parts.push(reason.clone());
        }
        if self.sum_mismatch {
            parts.push("share sum does not match the transaction amount".to_string());
        }
        if !self.violations.is_empty() {
            let mut users: Vec<_> = self.violations.keys().cloned().collect();
            users.sort();
            parts.push(format!("violations for {}", users.join(", ")));
        }
        write!(f, "{}", parts.join("; "))
    }
}

/// Error taxonomy of the session layer.
///
/// `Validation` is resolved entirely client-side and blocks the mutation
/// before it is sent. `NotFound` covers a stored household id absent from
/// the server list; it is surfaced, never silently remapped.
#[derive(Error, Debug)]
pub enum SessionError {
    /// No response or timeout; retryable.
    #[error("network error: {0}")]
    Network(String),

    /// Blocked client-side; never sent to the backend.
    #[error("settlement rejected: {0}")]
    Validation(SettlementRejection),

    #[error("household not found: {0}")]
    NotFound(String),

    /// The server rejected an action the client-side permission gate
    /// should have prevented; the two permission copies have diverged.
    #[error("permission denied: {0}")]
    Permission(String),

    /// Any other backend-reported failure, carrying the best available
    /// backend-provided message.
    #[error("backend error: {0}")]
    Backend(String),

    #[error("local storage error: {0}")]
    Storage(String),
}

impl From<ApiError> for SessionError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Network(message) => SessionError::Network(message),
            ApiError::Status {
                status: status @ (401 | 403),
                message,
            } => {
                // The client gate should have prevented this request from
                // being issued at all; divergence from the server copy is
                // a bug signal, not a normal user error.
                error!(status, %message, "server rejected an action the permission gate allowed");
                SessionError::Permission(message)
            }
            ApiError::Status {
                status: 404,
                message,
            } => SessionError::NotFound(message),
            ApiError::Status { status, message } if status >= 500 => {
                SessionError::Network(format!("HTTP {status}: {message}"))
            }
            ApiError::Status { message, .. } => SessionError::Backend(message),
            ApiError::Decode(message) => SessionError::Backend(message),
        }
    }
}

impl From<compute::ComputeError> for SessionError {
    fn from(err: compute::ComputeError) -> Self {
        SessionError::Validation(SettlementRejection {
            reason: Some(err.to_string()),
            ..Default::default()
        })
    }
}

/// Type alias for Result with SessionError
pub type Result<T> = std::result::Result<T, SessionError>;
