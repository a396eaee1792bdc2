//! Data model and the store boundary of the crew planner.
//!
//! The durable relational store is an external collaborator; this crate only
//! fixes its interface ([`CrewStore`]) and ships [`MemoryStore`], the
//! in-memory implementation used by tests and local runs.

pub mod error;
pub mod models;

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use error::StoreError;
use models::{
    Group, MoodResponses, NewGroup, NewParticipant, NewPreference, NewUser, Participant,
    StoredPreference, User,
};
use uuid::Uuid;

/// Create/find operations on groups, users, preferences and participants,
/// plus mood-response persistence keyed by `(group, session)`.
#[async_trait]
pub trait CrewStore: Send + Sync {
    async fn create_user(&self, new: NewUser) -> Result<User, StoreError>;

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Fails with [`StoreError::DuplicateJoinCode`] when the join code is
    /// taken. This is the backstop behind the allocator's check-then-create.
    async fn create_group(&self, new: NewGroup) -> Result<Group, StoreError>;

    async fn find_group(&self, id: Uuid) -> Result<Option<Group>, StoreError>;

    /// Lookup by canonical (uppercase) join code.
    async fn find_group_by_join_code(&self, code: &str) -> Result<Option<Group>, StoreError>;

    async fn create_preference(&self, new: NewPreference)
        -> Result<StoredPreference, StoreError>;

    async fn find_preference_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<StoredPreference>, StoreError>;

    async fn add_participant(&self, new: NewParticipant) -> Result<Participant, StoreError>;

    /// Participants of a group in insertion order.
    async fn participants_of(&self, group_id: Uuid) -> Result<Vec<Participant>, StoreError>;

    /// Merges a batch of answers into the `(group, session)` response set.
    async fn save_mood_responses(
        &self,
        group_id: Uuid,
        session_id: &str,
        responses: MoodResponses,
    ) -> Result<(), StoreError>;

    async fn mood_responses(
        &self,
        group_id: Uuid,
        session_id: &str,
    ) -> Result<MoodResponses, StoreError>;
}

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    groups: HashMap<Uuid, Group>,
    participants: Vec<Participant>,
    preferences: HashMap<Uuid, StoredPreference>,
    mood_responses: HashMap<(Uuid, String), MoodResponses>,
}

/// In-memory [`CrewStore`].
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Backend("store mutex poisoned".to_owned()))
    }
}

#[async_trait]
impl CrewStore for MemoryStore {
    async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        let user = User {
            id: Uuid::new_v4(),
            display_name: new.display_name,
        };
        self.lock()?.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    async fn create_group(&self, new: NewGroup) -> Result<Group, StoreError> {
        let mut inner = self.lock()?;
        if inner
            .groups
            .values()
            .any(|group| group.join_code == new.join_code)
        {
            return Err(StoreError::DuplicateJoinCode(new.join_code));
        }
        let group = Group {
            id: Uuid::new_v4(),
            name: new.name,
            join_code: new.join_code,
            selection_snapshot: new.selection_snapshot,
            creator_id: new.creator_id,
        };
        inner.groups.insert(group.id, group.clone());
        Ok(group)
    }

    async fn find_group(&self, id: Uuid) -> Result<Option<Group>, StoreError> {
        Ok(self.lock()?.groups.get(&id).cloned())
    }

    async fn find_group_by_join_code(&self, code: &str) -> Result<Option<Group>, StoreError> {
        Ok(self
            .lock()?
            .groups
            .values()
            .find(|group| group.join_code == code)
            .cloned())
    }

    async fn create_preference(
        &self,
        new: NewPreference,
    ) -> Result<StoredPreference, StoreError> {
        let preference = StoredPreference {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            record: new.record,
        };
        self.lock()?
            .preferences
            .insert(preference.user_id, preference.clone());
        Ok(preference)
    }

    async fn find_preference_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<StoredPreference>, StoreError> {
        Ok(self.lock()?.preferences.get(&user_id).cloned())
    }

    async fn add_participant(&self, new: NewParticipant) -> Result<Participant, StoreError> {
        let mut inner = self.lock()?;
        if !inner.groups.contains_key(&new.group_id) {
            return Err(StoreError::UnknownGroup(new.group_id));
        }
        let participant = Participant {
            id: Uuid::new_v4(),
            group_id: new.group_id,
            user_id: new.user_id,
            role: new.role,
            status: new.status,
        };
        inner.participants.push(participant);
        Ok(participant)
    }

    async fn participants_of(&self, group_id: Uuid) -> Result<Vec<Participant>, StoreError> {
        Ok(self
            .lock()?
            .participants
            .iter()
            .filter(|participant| participant.group_id == group_id)
            .copied()
            .collect())
    }

    async fn save_mood_responses(
        &self,
        group_id: Uuid,
        session_id: &str,
        responses: MoodResponses,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if !inner.groups.contains_key(&group_id) {
            return Err(StoreError::UnknownGroup(group_id));
        }
        inner
            .mood_responses
            .entry((group_id, session_id.to_owned()))
            .or_default()
            .extend(responses);
        Ok(())
    }

    async fn mood_responses(
        &self,
        group_id: Uuid,
        session_id: &str,
    ) -> Result<MoodResponses, StoreError> {
        Ok(self
            .lock()?
            .mood_responses
            .get(&(group_id, session_id.to_owned()))
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use models::{ParticipantStatus, Role};
    use serde_json::json;

    use super::*;

    async fn group_with_code(store: &MemoryStore, code: &str) -> Group {
        let creator = store
            .create_user(NewUser { display_name: None })
            .await
            .unwrap();
        store
            .create_group(NewGroup {
                name: "Test Crew".to_owned(),
                join_code: code.to_owned(),
                selection_snapshot: json!({}),
                creator_id: creator.id,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn duplicate_join_code_is_rejected() {
        let store = MemoryStore::new();
        group_with_code(&store, "AB1").await;
        let creator = store
            .create_user(NewUser { display_name: None })
            .await
            .unwrap();
        let result = store
            .create_group(NewGroup {
                name: "Other Crew".to_owned(),
                join_code: "AB1".to_owned(),
                selection_snapshot: json!({}),
                creator_id: creator.id,
            })
            .await;
        assert!(matches!(result, Err(StoreError::DuplicateJoinCode(code)) if code == "AB1"));
    }

    #[tokio::test]
    async fn mood_responses_merge_per_group_and_session() {
        let store = MemoryStore::new();
        let group = group_with_code(&store, "XY7").await;

        let mut first = MoodResponses::new();
        first.insert("energy_level".to_owned(), 3.0.into());
        store
            .save_mood_responses(group.id, "session-a", first)
            .await
            .unwrap();

        let mut second = MoodResponses::new();
        second.insert("vibe_preference".to_owned(), "Cozy".into());
        store
            .save_mood_responses(group.id, "session-a", second)
            .await
            .unwrap();

        let merged = store.mood_responses(group.id, "session-a").await.unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get("vibe_preference"), Some(&"Cozy".into()));

        let other = store.mood_responses(group.id, "session-b").await.unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn saving_responses_for_unknown_group_fails() {
        let store = MemoryStore::new();
        let result = store
            .save_mood_responses(Uuid::new_v4(), "session", MoodResponses::new())
            .await;
        assert!(matches!(result, Err(StoreError::UnknownGroup(_))));
    }

    #[tokio::test]
    async fn participants_keep_insertion_order() {
        let store = MemoryStore::new();
        let group = group_with_code(&store, "QQ2").await;
        for index in 0..3 {
            let user = store
                .create_user(NewUser {
                    display_name: Some(format!("Member {index}")),
                })
                .await
                .unwrap();
            store
                .add_participant(NewParticipant {
                    group_id: group.id,
                    user_id: user.id,
                    role: if index == 0 {
                        Role::Organizer
                    } else {
                        Role::Member
                    },
                    status: ParticipantStatus::Accepted,
                })
                .await
                .unwrap();
        }
        let participants = store.participants_of(group.id).await.unwrap();
        assert_eq!(participants.len(), 3);
        assert_eq!(participants[0].role, Role::Organizer);
    }
}
