//! Character persistence.
//!
//! The orchestrator talks to a [`CharacterStore`] trait; the bundled
//! [`MemoryStore`] keeps everything in a process-local map and is what
//! tests and simple embeddings use. Durable backends implement the same
//! trait and plug in unchanged.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use anima_core::types::{AffectState, EmotionDynamics, MoodState, PersonalityProfile};

/// Store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The character id is not present.
    #[error("character '{0}' not found")]
    NotFound(String),
    /// A backend-specific failure.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// One archived interaction in a character's long-term memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMemory {
    /// The message text as received.
    pub text: String,
    /// Signed valence of the moment in [-1, 1].
    pub valence: f32,
    /// Normalized importance in [0, 1] from the storage scorer.
    pub importance: f32,
    /// When the memory was archived.
    pub stored_at: DateTime<Utc>,
}

/// Everything the engine tracks for one character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterRecord {
    /// Stable character identifier.
    pub id: String,
    /// Fixed personality traits.
    pub personality: PersonalityProfile,
    /// Decay and inertia coefficients derived from the personality.
    pub dynamics: EmotionDynamics,
    /// Momentary emotional state.
    pub affect: AffectState,
    /// Resting state the emotions decay toward.
    pub baseline: AffectState,
    /// Slow-moving background mood.
    pub mood: MoodState,
    /// Recent message texts, newest last, for the repetition factor.
    pub history: Vec<String>,
    /// Archived interactions, append-only.
    pub memories: Vec<StoredMemory>,
}

impl CharacterRecord {
    /// A fresh character at the neutral baseline.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        personality: PersonalityProfile,
        dynamics: EmotionDynamics,
    ) -> Self {
        Self {
            id: id.into(),
            personality,
            dynamics,
            affect: AffectState::neutral(),
            baseline: AffectState::neutral(),
            mood: MoodState::NEUTRAL,
            history: Vec::new(),
            memories: Vec::new(),
        }
    }

    /// Push a message into the rolling history window, dropping the oldest
    /// entries past `window`.
    pub fn remember_text(&mut self, text: &str, window: usize) {
        self.history.push(text.to_string());
        if self.history.len() > window {
            let excess = self.history.len() - window;
            self.history.drain(..excess);
        }
    }
}

/// Persistence seam for character affect records.
pub trait CharacterStore: Send + Sync {
    /// Fetch a record by id.
    ///
    /// # Errors
    ///
    /// Backend failures only; a missing character is `Ok(None)`.
    fn get(&self, id: &str) -> Result<Option<CharacterRecord>, StoreError>;

    /// Return the stored record for `fresh.id`, inserting `fresh` first if
    /// the character does not exist yet.
    ///
    /// # Errors
    ///
    /// Backend failures only.
    fn load_or_create(&self, fresh: CharacterRecord) -> Result<CharacterRecord, StoreError>;

    /// Write a record back, replacing the stored version.
    ///
    /// # Errors
    ///
    /// Backend failures only.
    fn save(&self, record: &CharacterRecord) -> Result<(), StoreError>;

    /// Append one long-term memory to an existing character.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] when the character does not exist.
    fn append_memory(&self, id: &str, memory: StoredMemory) -> Result<(), StoreError>;
}

/// Process-local character store.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, CharacterRecord>>,
}

impl MemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of characters tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether the store holds no characters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl CharacterStore for MemoryStore {
    fn get(&self, id: &str) -> Result<Option<CharacterRecord>, StoreError> {
        Ok(self.records.read().get(id).cloned())
    }

    fn load_or_create(&self, fresh: CharacterRecord) -> Result<CharacterRecord, StoreError> {
        let mut records = self.records.write();
        Ok(records.entry(fresh.id.clone()).or_insert(fresh).clone())
    }

    fn save(&self, record: &CharacterRecord) -> Result<(), StoreError> {
        self.records
            .write()
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn append_memory(&self, id: &str, memory: StoredMemory) -> Result<(), StoreError> {
        match self.records.write().get_mut(id) {
            Some(record) => {
                record.memories.push(memory);
                Ok(())
            }
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> CharacterRecord {
        CharacterRecord::new(
            id,
            PersonalityProfile::balanced(),
            EmotionDynamics::default(),
        )
    }

    #[test]
    fn load_or_create_inserts_once_and_then_returns_the_stored_record() {
        let store = MemoryStore::new();
        let mut first = store.load_or_create(record("ana")).unwrap();
        assert_eq!(first.affect, first.baseline);

        // Mutate and save; a second load_or_create must not reset it.
        first.affect.joy = 0.9;
        store.save(&first).unwrap();
        let second = store.load_or_create(record("ana")).unwrap();
        assert!((second.affect.joy - 0.9).abs() < f32::EPSILON);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn get_returns_none_for_unknown_characters() {
        let store = MemoryStore::new();
        assert!(store.get("nadie").unwrap().is_none());
    }

    #[test]
    fn append_memory_requires_an_existing_character() {
        let store = MemoryStore::new();
        let memory = StoredMemory {
            text: "hola".to_string(),
            valence: 0.2,
            importance: 0.6,
            stored_at: Utc::now(),
        };
        assert!(matches!(
            store.append_memory("nadie", memory.clone()),
            Err(StoreError::NotFound(_))
        ));

        store.load_or_create(record("ana")).unwrap();
        store.append_memory("ana", memory).unwrap();
        let stored = store.get("ana").unwrap().unwrap();
        assert_eq!(stored.memories.len(), 1);
        assert_eq!(stored.memories[0].text, "hola");
    }

    #[test]
    fn history_window_drops_the_oldest_entries() {
        let mut record = record("ana");
        for i in 0..25 {
            record.remember_text(&format!("mensaje {i}"), 20);
        }
        assert_eq!(record.history.len(), 20);
        assert_eq!(record.history[0], "mensaje 5");
        assert_eq!(record.history[19], "mensaje 24");
    }
}
