use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("join code {0:?} is already allocated")]
    DuplicateJoinCode(String),
    #[error("no group {0}")]
    UnknownGroup(Uuid),
    #[error("no user {0}")]
    UnknownUser(Uuid),
    #[error("store backend failed: {0}")]
    Backend(String),
}
