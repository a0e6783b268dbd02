//! End-to-end pipeline runs over an in-memory store, with the deep path
//! served by a scripted appraiser instead of a live provider.

use std::collections::VecDeque;
use std::sync::Arc;

use anima_core::appraisal::AppraisalVector;
use anima_core::config::AnimaConfig;
use anima_core::router::ProcessingPath;
use anima_core::types::AffectState;
use anima_engine::{Appraisal, AppraisalContext, Appraiser, MemoryStore, Orchestrator};
use anima_llm::InvokeError;
use async_trait::async_trait;
use parking_lot::Mutex;

// ---------------------------------------------------------------------------
// Scripted appraiser
// ---------------------------------------------------------------------------

/// Plays back a fixed script of appraisal results and records every
/// context it was asked about.
struct ScriptedAppraiser {
    script: Mutex<VecDeque<Result<Appraisal, InvokeError>>>,
    contexts: Mutex<Vec<AppraisalContext>>,
}

impl ScriptedAppraiser {
    fn new(script: Vec<Result<Appraisal, InvokeError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into_iter().collect()),
            contexts: Mutex::new(Vec::new()),
        })
    }

    fn seen(&self) -> Vec<AppraisalContext> {
        self.contexts.lock().clone()
    }
}

#[async_trait]
impl Appraiser for ScriptedAppraiser {
    async fn appraise(&self, context: &AppraisalContext) -> Result<Appraisal, InvokeError> {
        self.contexts.lock().push(context.clone());
        self.script.lock().pop_front().expect("script exhausted")
    }
}

fn appraisal(desirability: f32, emotions: &[(&str, f32)]) -> Appraisal {
    let vector = AppraisalVector {
        desirability,
        ..AppraisalVector::default()
    };
    Appraisal {
        vector,
        emotions: emotions
            .iter()
            .map(|(label, intensity)| ((*label).to_string(), *intensity))
            .collect(),
    }
}

fn orchestrator(appraiser: Arc<ScriptedAppraiser>) -> Orchestrator {
    let mut config = AnimaConfig::default();
    config.affect.perturbation_enabled = false;
    Orchestrator::new(config, Arc::new(MemoryStore::new()))
        .with_appraiser(appraiser)
        .with_rng_seed(42)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn deep_path_applies_the_model_verdict() {
    let appraiser = ScriptedAppraiser::new(vec![Ok(appraisal(
        0.8,
        &[("joy", 0.9), ("gratitude", 0.7)],
    ))]);
    let orch = orchestrator(Arc::clone(&appraiser));

    let outcome = orch
        .process_message(
            "luna",
            "Hoy me siento muy feliz por la sorpresa, ¿qué piensas tú?",
        )
        .await
        .unwrap();

    assert_eq!(outcome.metadata.path, ProcessingPath::Deep);
    assert!(!outcome.metadata.fell_back);
    assert!(outcome.affect.joy > AffectState::neutral().joy);
    let vector = outcome.appraisal.expect("deep path exposes the vector");
    assert!((vector.desirability - 0.8).abs() < f32::EPSILON);

    let seen = appraiser.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].character_id, "luna");
    assert!(seen[0].message.contains("sorpresa"));
}

#[tokio::test]
async fn provider_failure_falls_back_to_keywords() {
    let appraiser = ScriptedAppraiser::new(vec![Err(InvokeError::PoolExhausted { tried: 3 })]);
    let orch = orchestrator(appraiser);

    let outcome = orch
        .process_message(
            "luna",
            "Estoy muy triste y deprimida, no sé qué hacer con mi vida",
        )
        .await
        .unwrap();

    assert_eq!(outcome.metadata.path, ProcessingPath::Fast);
    assert!(outcome.metadata.fell_back);
    assert!(outcome.affect.sadness > AffectState::neutral().sadness);
    assert!(outcome.appraisal.is_none());
    assert!(!outcome.metadata.reasons.is_empty());
}

#[tokio::test]
async fn stored_memory_carries_the_appraised_valence() {
    let appraiser = ScriptedAppraiser::new(vec![Ok(appraisal(
        -0.9,
        &[("distress", 0.9), ("pity", 0.4)],
    ))]);
    let orch = orchestrator(appraiser);

    let outcome = orch
        .process_message(
            "luna",
            "Mi mamá falleció ayer y me siento perdida, no sé qué hacer",
        )
        .await
        .unwrap();

    assert!(outcome.storage.should_store);
    assert!(outcome.storage.event > 0.0);
    assert!(outcome.storage.informative > 0.0);

    let record = orch.character("luna").unwrap().unwrap();
    assert_eq!(record.memories.len(), 1);
    assert!((record.memories[0].valence + 0.9).abs() < f32::EPSILON);
    assert!(record.memories[0].importance > 0.5);
}

#[tokio::test]
async fn smalltalk_never_reaches_the_appraiser() {
    let appraiser = ScriptedAppraiser::new(vec![]);
    let orch = orchestrator(Arc::clone(&appraiser));

    let outcome = orch.process_message("luna", "hola").await.unwrap();

    assert_eq!(outcome.metadata.path, ProcessingPath::Fast);
    assert!(!outcome.storage.should_store);
    assert!(appraiser.seen().is_empty());

    let record = orch.character("luna").unwrap().unwrap();
    assert!(record.memories.is_empty());
    assert_eq!(record.history.len(), 1);
}

#[tokio::test]
async fn concurrent_messages_to_one_character_both_land() {
    let appraiser = ScriptedAppraiser::new(vec![]);
    let orch = Arc::new(orchestrator(appraiser));

    let first = orch.process_message("luna", "hoy comí pasta con pesto");
    let second = orch.process_message("luna", "después salí a caminar un rato");
    let (first, second) = tokio::join!(first, second);
    first.unwrap();
    second.unwrap();

    let record = orch.character("luna").unwrap().unwrap();
    assert_eq!(record.history.len(), 2);
}

#[tokio::test]
async fn appraisal_context_reflects_the_current_state() {
    let appraiser = ScriptedAppraiser::new(vec![Ok(appraisal(0.5, &[("interest", 0.6)]))]);
    let orch = orchestrator(Arc::clone(&appraiser));

    // Lift joy on the fast path first, then trigger a deep appraisal.
    orch.process_message("luna", "¡Estoy feliz!").await.unwrap();
    orch.process_message(
        "luna",
        "Mi hermano me preguntó qué piensas tú de mudarse, no sé qué decirle",
    )
    .await
    .unwrap();

    let seen = appraiser.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].dominant, "joy");
    assert!(!seen[0].mood.is_empty());
    assert!(seen[0].message.contains("mudarse"));
}
