use city_crew_store::error::StoreError;
use thiserror::Error;
use uuid::Uuid;

use crate::invite::{JOIN_CODE_MAX_LENGTH, JOIN_CODE_MIN_LENGTH};

#[derive(Debug, Error)]
pub enum AppError {
    /// Retryable: the caller must retry the whole crew creation.
    #[error("could not allocate a free join code after {attempts} attempts")]
    AllocationExhausted { attempts: u32 },
    /// Distinct from internal errors so callers can show "check the code"
    /// messaging.
    #[error("no crew found for join code {0:?}")]
    InviteNotFound(String),
    #[error(
        "join codes are {JOIN_CODE_MIN_LENGTH} to {JOIN_CODE_MAX_LENGTH} characters, got {0}"
    )]
    InvalidJoinCode(usize),
    #[error("no group {0}")]
    GroupNotFound(Uuid),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl AppError {
    /// True for the conditions a UI should present as "nothing there",
    /// as opposed to internal failures.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::InviteNotFound(_) | Self::InvalidJoinCode(_) | Self::GroupNotFound(_)
        )
    }
}
