use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Role of a participant within a crew. The creator becomes the organizer in
/// the same step that creates the group.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Organizer,
    Member,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantStatus {
    Accepted,
    Pending,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct User {
    pub id: Uuid,
    pub display_name: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NewUser {
    pub display_name: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    /// Canonical uppercase join code, unique among groups.
    pub join_code: String,
    /// Untyped at rest; validated on read by the snapshot codec.
    pub selection_snapshot: Value,
    pub creator_id: Uuid,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NewGroup {
    pub name: String,
    pub join_code: String,
    pub selection_snapshot: Value,
    pub creator_id: Uuid,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Participant {
    pub id: Uuid,
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub role: Role,
    pub status: ParticipantStatus,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct NewParticipant {
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub role: Role,
    pub status: ParticipantStatus,
}

/// Canonical preference record, created once per user at crew creation and
/// not mutated by this core afterward.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct PreferenceRecord {
    pub dietary_restrictions: Vec<String>,
    pub allergies: Vec<String>,
    pub cuisine_preferences: Vec<String>,
    pub activity_types: Vec<String>,
    pub preferred_time: Option<String>,
    pub budget_range: Option<String>,
    pub group_size_preference: Option<String>,
    pub social_preference: Option<String>,
    pub preferred_locations: Vec<String>,
    pub max_travel_distance: Option<String>,
    pub experience_intensity: Option<String>,
    pub interests: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct StoredPreference {
    pub id: Uuid,
    pub user_id: Uuid,
    pub record: PreferenceRecord,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NewPreference {
    pub user_id: Uuid,
    pub record: PreferenceRecord,
}

/// A single mood answer. Scale questions produce numbers, everything else
/// free text or a choice label.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Number(f64),
    Text(String),
}

impl AnswerValue {
    /// An answer counts as empty when it carries no usable content; numbers
    /// always do.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Number(_) => false,
            Self::Text(text) => text.trim().is_empty(),
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for AnswerValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Mood answers keyed by signal key, collected per `(group, session)`.
pub type MoodResponses = BTreeMap<String, AnswerValue>;
