//! Round-robin credential rotation for quota-limited backends
//!
//! A rotator owns an ordered list of credential sets and a cursor shared by
//! every concurrent caller of its backend. Advancing the cursor and reading
//! or setting the exhaustion flag happen under one async mutex; callers
//! release it before doing any network I/O.

use crate::error::BackendError;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// One configured credential pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialSet {
    pub key: String,
    /// Auxiliary id paired with the key (a search engine id for Google CSE)
    pub aux_id: Option<String>,
    exhausted: bool,
}

impl CredentialSet {
    pub fn new(key: impl Into<String>, aux_id: Option<String>) -> Self {
        Self {
            key: key.into(),
            aux_id,
            exhausted: false,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

/// A usable credential handed out by [`CredentialRotator::next`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// Position in the rotator, used to report exhaustion
    pub index: usize,
    pub key: String,
    pub aux_id: String,
}

#[derive(Debug)]
struct RotationState {
    cursor: usize,
    sets: Vec<CredentialSet>,
}

/// Shared rotation state for one backend
#[derive(Debug)]
pub struct CredentialRotator {
    name: String,
    state: Mutex<RotationState>,
}

impl CredentialRotator {
    pub fn new(name: impl Into<String>, sets: Vec<CredentialSet>) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(RotationState { cursor: 0, sets }),
        }
    }

    /// Build from parallel key/aux-id lists paired by position.
    ///
    /// A shorter aux-id list is cycled; with no list at all every key gets
    /// `fallback_aux`. Keys left without an aux id stay in the rotation but
    /// are never handed out.
    pub fn from_lists(
        name: impl Into<String>,
        keys: &[String],
        aux_ids: &[String],
        fallback_aux: Option<&str>,
    ) -> Self {
        let sets = keys
            .iter()
            .enumerate()
            .map(|(i, key)| {
                let aux = if aux_ids.is_empty() {
                    fallback_aux.map(str::to_string)
                } else {
                    Some(aux_ids[i % aux_ids.len()].clone())
                };
                CredentialSet::new(key.clone(), aux)
            })
            .collect();
        Self::new(name, sets)
    }

    /// Number of configured credential sets, exhausted or not
    pub async fn len(&self) -> usize {
        self.state.lock().await.sets.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Number of sets that can still be handed out
    pub async fn available(&self) -> usize {
        self.state
            .lock()
            .await
            .sets
            .iter()
            .filter(|s| !s.exhausted && s.aux_id.is_some())
            .count()
    }

    /// Return the next usable credential in round-robin order
    pub async fn next(&self) -> Result<Credential, BackendError> {
        let mut state = self.state.lock().await;
        let total = state.sets.len();

        for _ in 0..total {
            let index = state.cursor % total;
            state.cursor = state.cursor.wrapping_add(1);

            let set = &state.sets[index];
            if set.exhausted {
                continue;
            }
            let Some(aux_id) = set.aux_id.clone() else {
                continue;
            };

            debug!(backend = %self.name, index, "rotating to credential");
            return Ok(Credential {
                index,
                key: set.key.clone(),
                aux_id,
            });
        }

        Err(BackendError::CredentialsExhausted(format!(
            "all {} credentials of {} exhausted or missing",
            total, self.name
        )))
    }

    /// Retire a credential for the rest of the process lifetime
    pub async fn mark_exhausted(&self, index: usize) {
        let mut state = self.state.lock().await;
        if let Some(set) = state.sets.get_mut(index) {
            if !set.exhausted {
                set.exhausted = true;
                warn!(backend = %self.name, index, "credential exhausted by rate limit");
            }
        }
    }
}
