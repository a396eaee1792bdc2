//! The optimistic submission state machine.
//!
//! One coordinator per `(group, session)` submission key. A submission moves
//! `Idle -> Pending -> {Committed, RolledBack} -> Idle`; the submitting flag
//! gates re-entry, and an incomplete answer set never leaves `Idle`. The
//! pre-mutation snapshot is captured as an owned value when `Pending` is
//! entered, so rollback is a pure overwrite of the cached view.

use std::sync::Arc;

use async_trait::async_trait;
use city_crew_backend::questions::MoodQuestion;
use city_crew_store::models::{AnswerValue, MoodResponses};
use thiserror::Error;
use tracing::{debug, error};
use uuid::Uuid;

use crate::cache::{ResourceKey, ViewCache};

#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(String);

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[derive(Debug, Error)]
pub enum SyncError {
    /// The mutation failed and the cached view was rolled back; the answer
    /// buffer is retained so the user may retry.
    #[error("mood submission failed: {0}")]
    Transport(#[from] TransportError),
}

/// Server side of a mood submission. A transport timeout is just another
/// failure; the coordinator treats all of them identically.
#[async_trait]
pub trait MoodTransport: Send + Sync {
    async fn save_mood_responses(
        &self,
        group_id: Uuid,
        session_id: &str,
        responses: MoodResponses,
    ) -> Result<(), TransportError>;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SyncState {
    Idle,
    Pending,
    Committed,
    RolledBack,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NotSubmittedReason {
    IncompleteAnswers,
    AlreadyPending,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubmitOutcome {
    /// Rejected synchronously, no state transition and no error object.
    NotSubmitted(NotSubmittedReason),
    Committed {
        flow_finished: bool,
    },
}

/// Owned pre-mutation snapshot; destroyed on commit or rollback.
struct SyncTransaction {
    key: ResourceKey,
    prior: Option<city_crew_backend::invite::GroupView>,
}

type CompletionCallback = Box<dyn FnMut() + Send>;

pub struct OptimisticSyncCoordinator<C: ViewCache, T: MoodTransport> {
    cache: Arc<C>,
    transport: T,
    group_id: Uuid,
    session_id: String,
    participant_id: Uuid,
    questions: Vec<MoodQuestion>,
    more_questions_expected: bool,
    answers: MoodResponses,
    submitting: bool,
    state: SyncState,
    on_flow_complete: Option<CompletionCallback>,
}

impl<C: ViewCache, T: MoodTransport> OptimisticSyncCoordinator<C, T> {
    pub fn new(
        cache: Arc<C>,
        transport: T,
        group_id: Uuid,
        session_id: impl Into<String>,
        participant_id: Uuid,
    ) -> Self {
        Self {
            cache,
            transport,
            group_id,
            session_id: session_id.into(),
            participant_id,
            questions: Vec::new(),
            more_questions_expected: false,
            answers: MoodResponses::new(),
            submitting: false,
            state: SyncState::Idle,
            on_flow_complete: None,
        }
    }

    /// Called when the completed flow commits (no further questions
    /// expected).
    pub fn on_flow_complete(&mut self, callback: impl FnMut() + Send + 'static) {
        self.on_flow_complete = Some(Box::new(callback));
    }

    /// Replaces the currently-known question set. `more_expected` says
    /// whether the server will serve further questions after these commit
    /// (the base catalog is followed by a wrap-up).
    pub fn set_questions(&mut self, questions: Vec<MoodQuestion>, more_expected: bool) {
        self.questions = questions;
        self.more_questions_expected = more_expected;
    }

    pub fn record_answer(&mut self, signal_key: impl Into<String>, value: impl Into<AnswerValue>) {
        self.answers.insert(signal_key.into(), value.into());
    }

    /// Complete means every currently-known question has a non-empty answer.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.questions.iter().all(|question| {
            self.answers
                .get(&question.signal_key)
                .is_some_and(|answer| !answer.is_empty())
        })
    }

    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        self.submitting
    }

    #[must_use]
    pub const fn state(&self) -> SyncState {
        self.state
    }

    #[must_use]
    pub const fn answers(&self) -> &MoodResponses {
        &self.answers
    }

    /// Applies the buffered answers optimistically and sends them. On server
    /// acknowledgment the buffer is cleared and the resource invalidated; on
    /// failure the cached view is restored verbatim and the buffer kept.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, SyncError> {
        if self.submitting {
            return Ok(SubmitOutcome::NotSubmitted(NotSubmittedReason::AlreadyPending));
        }
        if !self.is_complete() {
            return Ok(SubmitOutcome::NotSubmitted(
                NotSubmittedReason::IncompleteAnswers,
            ));
        }

        let key = ResourceKey(self.group_id);
        // A stale read landing after the optimistic write would silently
        // overwrite it.
        self.cache.cancel_inflight(key);
        let transaction = SyncTransaction {
            key,
            prior: self.cache.read(key),
        };
        if let Some(prior) = &transaction.prior {
            let mut optimistic = prior.clone();
            if let Some(participant) = optimistic
                .participants
                .iter_mut()
                .find(|participant| participant.id == self.participant_id)
            {
                participant.mood_responses.extend(self.answers.clone());
            }
            self.cache.write(key, optimistic);
        }
        self.state = SyncState::Pending;
        self.submitting = true;
        debug!(group = %self.group_id, session = %self.session_id, "submitting mood responses");

        match self
            .transport
            .save_mood_responses(self.group_id, &self.session_id, self.answers.clone())
            .await
        {
            Ok(()) => {
                self.answers.clear();
                self.submitting = false;
                self.cache.invalidate(transaction.key);
                // Committed/RolledBack -> Idle is immediate; Idle is the
                // only resting state.
                self.state = SyncState::Committed;
                let flow_finished = !self.more_questions_expected;
                if flow_finished {
                    if let Some(callback) = &mut self.on_flow_complete {
                        callback();
                    }
                }
                self.state = SyncState::Idle;
                Ok(SubmitOutcome::Committed { flow_finished })
            }
            Err(transport_error) => {
                error!(
                    group = %self.group_id,
                    session = %self.session_id,
                    error = %transport_error,
                    "mood submission failed, rolling back"
                );
                match transaction.prior {
                    Some(prior) => self.cache.write(transaction.key, prior),
                    None => self.cache.remove(transaction.key),
                }
                self.submitting = false;
                self.state = SyncState::RolledBack;
                self.state = SyncState::Idle;
                Err(SyncError::Transport(transport_error))
            }
        }
    }

    #[cfg(test)]
    fn force_submitting(&mut self) {
        self.submitting = true;
    }
}
