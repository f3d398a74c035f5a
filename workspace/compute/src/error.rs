use thiserror::Error;

/// Error types for the compute module
#[derive(Error, Debug)]
pub enum ComputeError {
    /// A split was requested for a member set with nobody eligible to
    /// participate (editing role plus a resolvable user record).
    #[error("no eligible participants for split")]
    NoEligibleParticipants,

    /// The amount cannot be divided (non-finite, negative, or otherwise
    /// unusable for settlement).
    #[error("invalid settlement amount: {0}")]
    InvalidAmount(String),

    /// A configured product limit would be exceeded.
    #[error("household limit exceeded: {0}")]
    LimitExceeded(String),
}

/// Type alias for Result with ComputeError
pub type Result<T> = std::result::Result<T, ComputeError>;
