//! The shared cache of group views.
//!
//! Every coordinator gets an explicit handle to this cache at construction;
//! there is no ambient global state. Readers register their in-flight fetch
//! under the resource key so a mutation can cancel it before writing
//! optimistically.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use city_crew_backend::invite::GroupView;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Key of a cached group view, one per group.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ResourceKey(pub Uuid);

/// Store handle exposing read/write/cancel/invalidate keyed by resource.
pub trait ViewCache: Send + Sync {
    fn read(&self, key: ResourceKey) -> Option<GroupView>;

    fn write(&self, key: ResourceKey, view: GroupView);

    fn remove(&self, key: ResourceKey);

    /// Registers an in-flight read and returns the token the reader must
    /// watch. A new registration supersedes the previous one for the key.
    fn begin_read(&self, key: ResourceKey) -> CancellationToken;

    /// Fires the token of the registered in-flight read, if any.
    fn cancel_inflight(&self, key: ResourceKey);

    /// Drops the cached entry so the next reader fetches fresh state.
    fn invalidate(&self, key: ResourceKey);
}

#[derive(Default)]
pub struct MemoryViewCache {
    entries: Mutex<HashMap<ResourceKey, GroupView>>,
    inflight: Mutex<HashMap<ResourceKey, CancellationToken>>,
}

impl MemoryViewCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<ResourceKey, GroupView>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn inflight(&self) -> MutexGuard<'_, HashMap<ResourceKey, CancellationToken>> {
        self.inflight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ViewCache for MemoryViewCache {
    fn read(&self, key: ResourceKey) -> Option<GroupView> {
        self.entries().get(&key).cloned()
    }

    fn write(&self, key: ResourceKey, view: GroupView) {
        self.entries().insert(key, view);
    }

    fn remove(&self, key: ResourceKey) {
        self.entries().remove(&key);
    }

    fn begin_read(&self, key: ResourceKey) -> CancellationToken {
        let token = CancellationToken::new();
        self.inflight().insert(key, token.clone());
        token
    }

    fn cancel_inflight(&self, key: ResourceKey) {
        if let Some(token) = self.inflight().remove(&key) {
            token.cancel();
        }
    }

    fn invalidate(&self, key: ResourceKey) {
        self.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_fires_the_registered_token() {
        let cache = MemoryViewCache::new();
        let key = ResourceKey(Uuid::new_v4());
        let token = cache.begin_read(key);
        assert!(!token.is_cancelled());
        cache.cancel_inflight(key);
        assert!(token.is_cancelled());
        // nothing registered anymore
        cache.cancel_inflight(key);
    }

    #[test]
    fn registrations_are_per_key() {
        let cache = MemoryViewCache::new();
        let one = ResourceKey(Uuid::new_v4());
        let other = ResourceKey(Uuid::new_v4());
        let token_one = cache.begin_read(one);
        let token_other = cache.begin_read(other);
        cache.cancel_inflight(one);
        assert!(token_one.is_cancelled());
        assert!(!token_other.is_cancelled());
    }
}
