//! The message pipeline: route, appraise, update, score, persist.
//!
//! One [`Orchestrator`] serves every character. Each incoming message is
//! classified by the complexity router, run through either the keyword path
//! or the model-backed appraisal path, folded into the character's affect
//! and mood, scored for long-term storage, and saved back to the store.
//! A failed appraisal never fails the message: the keyword path covers for
//! it and the outcome says so.
//!
//! Per-character async locks keep concurrent messages to the same character
//! strictly ordered while different characters proceed in parallel.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use anima_core::analyzer::{self, EmotionalSummary};
use anima_core::appraisal::{AppraisalVector, map_to_primaries};
use anima_core::config::AnimaConfig;
use anima_core::decay;
use anima_core::dyad::{self, DyadResult};
use anima_core::router::{self, ProcessingPath};
use anima_core::storage::{self, StorageDecision};
use anima_core::types::{AffectState, EmotionDynamics, MoodState, PersonalityProfile};
use chrono::Utc;
use parking_lot::Mutex;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{debug, warn};

use crate::appraiser::{AppraisalContext, Appraiser};
use crate::error::Result;
use crate::store::{CharacterRecord, CharacterStore, StoredMemory};

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

/// How the pipeline handled one message.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseMetadata {
    /// Pipeline that actually ran. A recommended deep path that fell back
    /// reports `Fast` here, with [`Self::fell_back`] set.
    pub path: ProcessingPath,
    /// Router score in [0, 1].
    pub complexity_score: f32,
    /// Spanish-language router reasons.
    pub reasons: Vec<String>,
    /// Wall-clock processing time in milliseconds.
    pub processing_ms: u64,
    /// True when the appraisal path failed and the keyword path covered.
    pub fell_back: bool,
    /// Dominant primary after the update, lowercase wire name.
    pub primary_emotion: String,
    /// Primaries above 0.5 after the update, strongest first, at most three.
    pub emotions_triggered: Vec<String>,
    /// Strongest active dyad, if any.
    pub dominant_dyad: Option<String>,
    /// One minus the conflict load across opposing primaries.
    pub emotional_stability: f32,
}

/// Everything one processed message produced.
#[derive(Debug, Clone, Serialize)]
pub struct MessageOutcome {
    /// Which character processed the message.
    pub character_id: String,
    /// Updated momentary affect.
    pub affect: AffectState,
    /// Updated background mood.
    pub mood: MoodState,
    /// Active dyads, strongest first.
    pub dyads: Vec<DyadResult>,
    /// Human-readable summary for prompt injection.
    pub summary: EmotionalSummary,
    /// The appraisal vector, when the deep path produced one. Downstream
    /// narrative generation reads it alongside the affect state.
    pub appraisal: Option<AppraisalVector>,
    /// The storage verdict for this interaction.
    pub storage: StorageDecision,
    /// Routing and timing details.
    pub metadata: ResponseMetadata,
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Coordinates the whole affect pipeline over a character store.
pub struct Orchestrator {
    config: AnimaConfig,
    store: Arc<dyn CharacterStore>,
    appraiser: Option<Arc<dyn Appraiser>>,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    rng: Mutex<StdRng>,
}

impl Orchestrator {
    /// An orchestrator without a deep path; every message takes the keyword
    /// path until an appraiser is wired in.
    #[must_use]
    pub fn new(config: AnimaConfig, store: Arc<dyn CharacterStore>) -> Self {
        Self {
            config,
            store,
            appraiser: None,
            locks: Mutex::new(HashMap::new()),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Wire in a model-backed appraiser for the deep path.
    #[must_use]
    pub fn with_appraiser(mut self, appraiser: Arc<dyn Appraiser>) -> Self {
        self.appraiser = Some(appraiser);
        self
    }

    /// Seed the internal RNG for reproducible runs.
    #[must_use]
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &AnimaConfig {
        &self.config
    }

    /// Create a character with the given personality.
    ///
    /// Registration is idempotent: if the id already exists the stored
    /// record is returned untouched, personality included.
    ///
    /// # Errors
    /// Propagates store failures.
    pub fn register_character(
        &self,
        id: &str,
        personality: PersonalityProfile,
    ) -> Result<CharacterRecord> {
        let personality = personality.clamped();
        let dynamics = self.dynamics_for(&personality);
        let record = self
            .store
            .load_or_create(CharacterRecord::new(id, personality, dynamics))?;
        Ok(record)
    }

    /// Look up a character without touching it.
    ///
    /// # Errors
    /// Propagates store failures.
    pub fn character(&self, id: &str) -> Result<Option<CharacterRecord>> {
        Ok(self.store.get(id)?)
    }

    /// Run one message through the full pipeline.
    ///
    /// Unknown characters are created on the fly with a balanced
    /// personality. Messages to the same character are processed strictly
    /// in arrival order.
    ///
    /// # Errors
    /// Propagates store failures. Provider failures on the deep path do
    /// not error; they fall back to the keyword path.
    pub async fn process_message(
        &self,
        character_id: &str,
        message: &str,
    ) -> Result<MessageOutcome> {
        let lock = self.lock_for(character_id);
        let _guard = lock.lock_owned().await;
        let started = Instant::now();

        let mut record = self.store.load_or_create(self.default_record(character_id))?;
        let classification =
            router::classify_with_threshold(message, self.config.router.deep_threshold);
        let complexity_score = classification.score;

        let mut fell_back = false;
        let appraisal = match (&self.appraiser, classification.path) {
            (Some(appraiser), ProcessingPath::Deep) => {
                let context = AppraisalContext {
                    character_id: record.id.clone(),
                    message: message.to_string(),
                    mood: analyzer::mood_label_es(record.mood).to_string(),
                    dominant: record.affect.dominant().0.as_str().to_string(),
                };
                match appraiser.appraise(&context).await {
                    Ok(appraisal) => Some(appraisal),
                    Err(err) => {
                        warn!(
                            character = %record.id,
                            error = %err,
                            "appraisal failed, falling back to keyword path"
                        );
                        fell_back = true;
                        None
                    }
                }
            }
            _ => None,
        };

        let path = if appraisal.is_some() {
            ProcessingPath::Deep
        } else {
            ProcessingPath::Fast
        };
        let appraisal_vector = appraisal.as_ref().map(|a| a.vector);

        let (affect, mood, desirability) = match appraisal {
            Some(appraisal) => {
                let target = map_to_primaries(&appraisal.emotions);
                let elapsed_ms = Utc::now()
                    .signed_duration_since(record.affect.last_updated)
                    .num_milliseconds()
                    .max(0);
                let elapsed_minutes = elapsed_ms as f32 / 60_000.0;
                let mut rng = self.rng.lock();
                let (affect, mood) = decay::apply_update(
                    &record.affect,
                    &target,
                    &record.baseline,
                    record.mood,
                    &record.dynamics,
                    elapsed_minutes,
                    &self.config.affect,
                    &mut *rng,
                );
                (affect, mood, appraisal.vector.desirability)
            }
            None => {
                let deltas = analyzer::analyze_message(message);
                let affect = decay::apply_deltas(
                    &record.affect,
                    &deltas,
                    record.dynamics.decay_rate,
                    record.dynamics.inertia,
                );
                let mut rng = self.rng.lock();
                let mood = decay::update_mood(
                    record.mood,
                    &affect,
                    record.dynamics.mood_inertia,
                    &self.config.affect,
                    &mut *rng,
                );
                // No appraisal vector on this path; the updated state's own
                // mood valence stands in for desirability.
                let desirability = MoodState::target_from(&affect).pleasantness;
                (affect, mood, desirability)
            }
        };

        record.affect = affect;
        record.mood = mood;

        let decision = storage::decide(
            message,
            &record.affect,
            desirability,
            &record.history,
            &self.config.storage,
        );
        if decision.should_store {
            record.memories.push(StoredMemory {
                text: message.to_string(),
                valence: desirability,
                importance: decision.importance,
                stored_at: Utc::now(),
            });
        }
        record.remember_text(message, self.config.storage.history_window);
        self.store.save(&record)?;

        let emotions_triggered = record
            .affect
            .ranked()
            .into_iter()
            .take(3)
            .filter(|(_, v)| *v > 0.5)
            .map(|(p, _)| p.as_str().to_string())
            .collect();
        let metadata = ResponseMetadata {
            path,
            complexity_score,
            reasons: classification.reasons,
            processing_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            fell_back,
            primary_emotion: record.affect.dominant().0.as_str().to_string(),
            emotions_triggered,
            dominant_dyad: dyad::dominant_dyad(&record.affect).map(|d| d.name.to_string()),
            emotional_stability: dyad::emotional_stability(&record.affect),
        };

        debug!(
            character = %record.id,
            path = ?metadata.path,
            score = complexity_score,
            fell_back,
            total = decision.total,
            stored = decision.should_store,
            "message processed"
        );

        Ok(MessageOutcome {
            character_id: record.id.clone(),
            affect: record.affect,
            mood: record.mood,
            dyads: dyad::compute_dyads(&record.affect),
            summary: analyzer::emotional_summary(&record.affect),
            appraisal: appraisal_vector,
            storage: decision,
            metadata,
        })
    }

    fn lock_for(&self, id: &str) -> Arc<tokio::sync::Mutex<()>> {
        Arc::clone(self.locks.lock().entry(id.to_string()).or_default())
    }

    fn dynamics_for(&self, personality: &PersonalityProfile) -> EmotionDynamics {
        EmotionDynamics::from_personality(
            personality,
            self.config.affect.base_decay_rate,
            self.config.affect.base_inertia,
            self.config.affect.mood_inertia,
        )
    }

    fn default_record(&self, id: &str) -> CharacterRecord {
        let personality = PersonalityProfile::balanced();
        let dynamics = self.dynamics_for(&personality);
        CharacterRecord::new(id, personality, dynamics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn orchestrator() -> Orchestrator {
        let mut config = AnimaConfig::default();
        config.affect.perturbation_enabled = false;
        Orchestrator::new(config, Arc::new(MemoryStore::new())).with_rng_seed(11)
    }

    #[tokio::test]
    async fn greeting_takes_the_fast_path() {
        let orch = orchestrator();
        let outcome = orch.process_message("luna", "hola").await.unwrap();
        assert_eq!(outcome.metadata.path, ProcessingPath::Fast);
        assert!(!outcome.metadata.fell_back);
        assert!(!outcome.storage.should_store);
    }

    #[tokio::test]
    async fn happy_message_lifts_joy() {
        let orch = orchestrator();
        let before = AffectState::neutral().joy;
        let outcome = orch
            .process_message("luna", "¡Estoy muy feliz, qué alegría verte!")
            .await
            .unwrap();
        assert!(outcome.affect.joy > before);
        assert_eq!(outcome.character_id, "luna");
    }

    #[tokio::test]
    async fn unknown_character_is_created_on_first_message() {
        let orch = orchestrator();
        assert!(orch.character("nadie").unwrap().is_none());
        orch.process_message("nadie", "hola").await.unwrap();
        let record = orch.character("nadie").unwrap().unwrap();
        assert_eq!(record.history.len(), 1);
    }

    #[tokio::test]
    async fn registration_survives_later_messages() {
        let orch = orchestrator();
        let mut personality = PersonalityProfile::balanced();
        personality.neuroticism = 80.0;
        orch.register_character("vera", personality).unwrap();

        orch.process_message("vera", "hoy fue un buen día").await.unwrap();

        let record = orch.character("vera").unwrap().unwrap();
        assert!((record.personality.neuroticism - 80.0).abs() < f32::EPSILON);
        assert_eq!(record.history.len(), 1);
    }
}
