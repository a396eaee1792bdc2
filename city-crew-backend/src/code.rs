//! Join-code allocation.
//!
//! Codes are short uppercase alphanumerics. The code space is large relative
//! to expected concurrent creations, so a bounded retry loop suffices;
//! exhausting it means pathological randomness or a corrupted store and is
//! reported as [`AppError::AllocationExhausted`]. Allocation only reads; the
//! caller must create the group with the candidate in the same logical step.

use city_crew_store::CrewStore;
use rand::{thread_rng, Rng as _};
use tracing::debug;

use crate::error::AppError;

const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub const MAX_ALLOCATION_ATTEMPTS: u32 = 15;

/// Source of candidate codes. Production uses [`RandomCodeSource`]; tests
/// script the sequence.
pub trait CodeSource: Send + Sync {
    fn candidate(&self, length: usize) -> String;
}

/// Uniform draws from the uppercase alphanumeric charset.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomCodeSource;

impl CodeSource for RandomCodeSource {
    fn candidate(&self, length: usize) -> String {
        let mut rng = thread_rng();
        (0..length)
            .map(|_| char::from(CODE_CHARSET[rng.gen_range(0..CODE_CHARSET.len())]))
            .collect()
    }
}

pub struct CodeAllocator<C = RandomCodeSource> {
    source: C,
}

impl CodeAllocator {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            source: RandomCodeSource,
        }
    }
}

impl Default for CodeAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: CodeSource> CodeAllocator<C> {
    pub const fn with_source(source: C) -> Self {
        Self { source }
    }

    /// Returns a code of `length` that no group currently uses, or
    /// [`AppError::AllocationExhausted`] after the bounded number of
    /// attempts.
    pub async fn allocate<S>(&self, store: &S, length: usize) -> Result<String, AppError>
    where
        S: CrewStore + ?Sized,
    {
        for _ in 0..MAX_ALLOCATION_ATTEMPTS {
            let candidate = self.source.candidate(length);
            if store.find_group_by_join_code(&candidate).await?.is_none() {
                return Ok(candidate);
            }
            debug!(code = %candidate, "join code collision, retrying");
        }
        Err(AppError::AllocationExhausted {
            attempts: MAX_ALLOCATION_ATTEMPTS,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use city_crew_store::models::{NewGroup, NewUser};
    use city_crew_store::MemoryStore;
    use serde_json::json;

    use super::*;

    struct ScriptedSource {
        codes: Mutex<VecDeque<String>>,
    }

    impl ScriptedSource {
        fn new(codes: &[&str]) -> Self {
            Self {
                codes: Mutex::new(codes.iter().map(|code| (*code).to_owned()).collect()),
            }
        }
    }

    impl CodeSource for ScriptedSource {
        fn candidate(&self, _length: usize) -> String {
            self.codes
                .lock()
                .unwrap()
                .pop_front()
                .expect("script ran out of codes")
        }
    }

    struct CountingSource {
        calls: AtomicU32,
    }

    impl CodeSource for CountingSource {
        fn candidate(&self, _length: usize) -> String {
            self.calls.fetch_add(1, Ordering::Relaxed);
            "AAA".to_owned()
        }
    }

    async fn store_with_codes(codes: &[&str]) -> MemoryStore {
        let store = MemoryStore::new();
        for code in codes {
            let creator = store
                .create_user(NewUser { display_name: None })
                .await
                .unwrap();
            store
                .create_group(NewGroup {
                    name: "Existing Crew".to_owned(),
                    join_code: (*code).to_owned(),
                    selection_snapshot: json!({}),
                    creator_id: creator.id,
                })
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn skips_taken_codes_until_a_free_one() {
        let store = store_with_codes(&["AAA", "AAB"]).await;
        let allocator = CodeAllocator::with_source(ScriptedSource::new(&["AAA", "AAB", "ZZZ"]));
        let code = allocator.allocate(&store, 3).await.unwrap();
        assert_eq!(code, "ZZZ");
    }

    #[tokio::test]
    async fn exhaustion_after_bounded_attempts() {
        let store = store_with_codes(&["AAA"]).await;
        let source = CountingSource {
            calls: AtomicU32::new(0),
        };
        let allocator = CodeAllocator::with_source(source);
        let result = allocator.allocate(&store, 3).await;
        assert!(matches!(
            result,
            Err(AppError::AllocationExhausted {
                attempts: MAX_ALLOCATION_ATTEMPTS
            })
        ));
        assert_eq!(
            allocator.source.calls.load(Ordering::Relaxed),
            MAX_ALLOCATION_ATTEMPTS
        );
    }

    #[tokio::test]
    async fn random_codes_have_requested_shape() {
        let store = MemoryStore::new();
        let allocator = CodeAllocator::new();
        for length in [3, 5, 8] {
            let code = allocator.allocate(&store, length).await.unwrap();
            assert_eq!(code.len(), length);
            assert!(code
                .bytes()
                .all(|byte| CODE_CHARSET.contains(&byte)));
        }
    }
}
