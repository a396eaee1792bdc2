//! Client-side optimistic synchronization for mood submissions.
//!
//! Answers are applied to the locally cached group view before the server
//! confirms them. [`coordinator::OptimisticSyncCoordinator`] owns that
//! protocol: it cancels the in-flight read that could clobber the optimistic
//! write, snapshots the cached view, and commits or rolls back on the server
//! outcome. [`cache::ViewCache`] is the explicit store handle every
//! coordinator is constructed with.

pub mod cache;
pub mod coordinator;

pub use cache::{MemoryViewCache, ResourceKey, ViewCache};
pub use coordinator::{
    MoodTransport, NotSubmittedReason, OptimisticSyncCoordinator, SubmitOutcome, SyncError,
    SyncState, TransportError,
};
