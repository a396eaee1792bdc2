//! Service core of the crew planner: join-code allocation, selection
//! normalization, the defensive snapshot codec, invite resolution and the
//! mood-question flow, carried by [`CrewService`] over any [`CrewStore`].

pub mod code;
pub mod error;
pub mod invite;
pub mod normalize;
pub mod questions;
pub mod snapshot;

use std::collections::BTreeMap;

use city_crew_config::Config;
use city_crew_store::models::{
    MoodResponses, NewGroup, NewParticipant, NewPreference, NewUser, ParticipantStatus, Role,
};
use city_crew_store::CrewStore;
use code::{CodeAllocator, CodeSource, RandomCodeSource};
use error::AppError;
use invite::GroupView;
use questions::MoodQuestion;
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Raw client-side mapping of category id to chosen option labels.
/// Transient; the canonical snapshot is what gets persisted.
pub type SelectionState = BTreeMap<String, Vec<String>>;

/// Display name used when a crew is created without one; its first word
/// seeds the group name.
const DEFAULT_EXPLORER_NAME: &str = "City Explorer";

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct CreateCrewRequest {
    pub name: Option<String>,
    pub selections: SelectionState,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CreateCrewResponse {
    pub group_id: Uuid,
    pub group_name: String,
    pub user_id: Uuid,
    pub join_code: String,
    pub join_path: String,
    pub selection_snapshot: SelectionState,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MoodQuestionsRequest {
    pub group_id: Uuid,
    pub session_id: String,
    #[serde(default)]
    pub participant_name: Option<String>,
    #[serde(default)]
    pub answered_signals: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MoodQuestionsResponse {
    pub questions: Vec<MoodQuestion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up: Option<MoodQuestion>,
}

pub struct CrewService<S, C = RandomCodeSource> {
    store: S,
    config: Config,
    allocator: CodeAllocator<C>,
}

impl<S: CrewStore> CrewService<S> {
    pub const fn new(store: S, config: Config) -> Self {
        Self {
            store,
            config,
            allocator: CodeAllocator::new(),
        }
    }
}

impl<S: CrewStore, C: CodeSource> CrewService<S, C> {
    pub const fn with_allocator(store: S, config: Config, allocator: CodeAllocator<C>) -> Self {
        Self {
            store,
            config,
            allocator,
        }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Allocates a join code, normalizes the selections and creates the
    /// user, group, preference record and organizer participant in one
    /// logical step. Allocation does not reserve the code; the store's
    /// uniqueness constraint is the backstop for the remaining race window.
    pub async fn create_crew(
        &self,
        request: CreateCrewRequest,
    ) -> Result<CreateCrewResponse, AppError> {
        let display_name = request
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_owned);
        let first_name = display_name
            .as_deref()
            .unwrap_or(DEFAULT_EXPLORER_NAME)
            .split_whitespace()
            .next()
            .unwrap_or(DEFAULT_EXPLORER_NAME);
        let group_name = format!("{first_name}'s City Crew");

        let join_code = self
            .allocator
            .allocate(&self.store, self.config.join_code_length)
            .await?;

        let user = self.store.create_user(NewUser { display_name }).await?;
        let snapshot_value = snapshot::encode(&request.selections);
        let canonical_snapshot = snapshot::decode(&snapshot_value);
        let group = self
            .store
            .create_group(NewGroup {
                name: group_name,
                join_code,
                selection_snapshot: snapshot_value,
                creator_id: user.id,
            })
            .await?;
        self.store
            .create_preference(NewPreference {
                user_id: user.id,
                record: normalize::normalize(&request.selections),
            })
            .await?;
        self.store
            .add_participant(NewParticipant {
                group_id: group.id,
                user_id: user.id,
                role: Role::Organizer,
                status: ParticipantStatus::Accepted,
            })
            .await?;
        info!(group = %group.id, code = %group.join_code, "created crew");

        Ok(CreateCrewResponse {
            group_id: group.id,
            group_name: group.name,
            user_id: user.id,
            join_path: format!("/join/{}", group.join_code.to_lowercase()),
            join_code: group.join_code,
            selection_snapshot: canonical_snapshot,
        })
    }

    pub async fn resolve_invite(&self, code: &str) -> Result<GroupView, AppError> {
        invite::resolve(&self.store, code).await
    }

    /// Unanswered questions for the `(group, session)` flow. Signals already
    /// saved for the session count as answered, in addition to whatever the
    /// caller reports locally.
    pub async fn mood_questions(
        &self,
        request: MoodQuestionsRequest,
    ) -> Result<MoodQuestionsResponse, AppError> {
        self.store
            .find_group(request.group_id)
            .await?
            .ok_or(AppError::GroupNotFound(request.group_id))?;
        let mut answered = request.answered_signals;
        let saved = self
            .store
            .mood_responses(request.group_id, &request.session_id)
            .await?;
        for signal in saved.keys() {
            if !answered.iter().any(|known| known == signal) {
                answered.push(signal.clone());
            }
        }
        let (questions, follow_up) =
            questions::for_participant(request.participant_name.as_deref(), &answered);
        Ok(MoodQuestionsResponse {
            questions,
            follow_up,
        })
    }

    pub async fn save_mood_responses(
        &self,
        group_id: Uuid,
        session_id: &str,
        responses: MoodResponses,
    ) -> Result<(), AppError> {
        self.store
            .find_group(group_id)
            .await?
            .ok_or(AppError::GroupNotFound(group_id))?;
        self.store
            .save_mood_responses(group_id, session_id, responses)
            .await?;
        info!(group = %group_id, session = session_id, "saved mood responses");
        Ok(())
    }
}

/// Installs the fmt subscriber; repeated calls are no-ops.
pub fn init_tracing(directive: Option<&str>) {
    let filter = directive.map_or_else(EnvFilter::from_default_env, EnvFilter::new);
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
