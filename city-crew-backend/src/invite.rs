//! Resolution of a join code into the group view shown on the invite page.

use city_crew_store::models::{MoodResponses, ParticipantStatus, Role};
use city_crew_store::CrewStore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::{snapshot, SelectionState};

pub const JOIN_CODE_MIN_LENGTH: usize = 3;
pub const JOIN_CODE_MAX_LENGTH: usize = 8;

const FALLBACK_HOST_NAME: &str = "Host";
const FALLBACK_GROUP_NAME: &str = "City Crew";
const FALLBACK_PARTICIPANT_NAME: &str = "Crew member";

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ParticipantView {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
    pub status: ParticipantStatus,
    /// Filled client-side by the optimistic sync layer; empty as resolved.
    #[serde(default, skip_serializing_if = "MoodResponses::is_empty")]
    pub mood_responses: MoodResponses,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GroupView {
    pub group_id: Uuid,
    pub join_code: String,
    pub group_name: String,
    pub host_name: String,
    pub member_count: usize,
    pub participants: Vec<ParticipantView>,
    pub selection_snapshot: SelectionState,
}

/// Join codes are case-insensitive for callers; lookup happens on the
/// canonical uppercase form. Host name falls back from the creator's stored
/// display name to the organizer participant's name to a fixed placeholder.
pub async fn resolve<S>(store: &S, code: &str) -> Result<GroupView, AppError>
where
    S: CrewStore + ?Sized,
{
    let length = code.chars().count();
    if !(JOIN_CODE_MIN_LENGTH..=JOIN_CODE_MAX_LENGTH).contains(&length) {
        return Err(AppError::InvalidJoinCode(length));
    }
    let canonical = code.to_uppercase();
    let group = store
        .find_group_by_join_code(&canonical)
        .await?
        .ok_or_else(|| AppError::InviteNotFound(canonical.clone()))?;

    let participants = store.participants_of(group.id).await?;
    let mut organizer_name = None;
    let mut views = Vec::with_capacity(participants.len());
    for participant in &participants {
        let display_name = store
            .find_user(participant.user_id)
            .await?
            .and_then(|user| user.display_name);
        if participant.role == Role::Organizer && organizer_name.is_none() {
            organizer_name.clone_from(&display_name);
        }
        views.push(ParticipantView {
            id: participant.user_id,
            name: display_name.unwrap_or_else(|| FALLBACK_PARTICIPANT_NAME.to_owned()),
            role: participant.role,
            status: participant.status,
            mood_responses: MoodResponses::new(),
        });
    }

    let creator_name = store
        .find_user(group.creator_id)
        .await?
        .and_then(|user| user.display_name);
    let host_name = creator_name
        .or(organizer_name)
        .unwrap_or_else(|| FALLBACK_HOST_NAME.to_owned());
    let group_name = if group.name.trim().is_empty() {
        FALLBACK_GROUP_NAME.to_owned()
    } else {
        group.name.clone()
    };

    Ok(GroupView {
        group_id: group.id,
        join_code: group.join_code,
        group_name,
        host_name,
        member_count: views.len(),
        participants: views,
        selection_snapshot: snapshot::decode(&group.selection_snapshot),
    })
}
