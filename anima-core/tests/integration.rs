//! Integration Tests — End-to-End Affect Flows
//!
//! Complete message cycles through the pure core: routing → rule-based
//! deltas → decay/inertia → dyads → mood → storage scoring, plus the
//! deep-path analogue through the appraisal mapper. Network and
//! persistence are out of scope here; the companion crates cover them.

use std::collections::HashMap;

use rand::SeedableRng;
use rand::rngs::StdRng;

use anima_core::analyzer;
use anima_core::appraisal;
use anima_core::config::{AffectConfig, StorageConfig};
use anima_core::decay;
use anima_core::dyad;
use anima_core::router::{self, Complexity, ProcessingPath};
use anima_core::storage;
use anima_core::types::{AffectState, EmotionDynamics, MoodState, PersonalityProfile, Primary};

fn rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn quiet_config() -> AffectConfig {
    AffectConfig {
        perturbation_enabled: false,
        ..AffectConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Fast path: greeting in, cheap deterministic update out
// ---------------------------------------------------------------------------

#[test]
fn greeting_takes_the_fast_path_for_free() {
    let classification = router::classify("hola");
    assert_eq!(classification.complexity, Complexity::Simple);
    assert_eq!(classification.path, ProcessingPath::Fast);
    assert_eq!(classification.score, 0.0);
}

#[test]
fn full_fast_path_cycle_moves_state_mood_and_dyads() {
    let message = "Estoy muy feliz, gracias por escucharme";
    assert_eq!(router::classify(message).path, ProcessingPath::Fast);

    let state = AffectState::neutral();
    let deltas = analyzer::analyze_message(message);
    let next = decay::apply_deltas(&state, &deltas, 0.0, 0.0);
    assert!(next.joy > state.joy);
    assert!(next.sadness < state.sadness);

    let dominant = dyad::dominant_dyad(&next).expect("a warm state forms a dyad");
    assert_eq!(dominant.name, "love");

    let mood = decay::update_mood(
        MoodState::NEUTRAL,
        &next,
        0.9,
        &quiet_config(),
        &mut rng(),
    );
    assert!(mood.pleasantness > 0.0, "mood drifts toward the warmer state");
}

// ---------------------------------------------------------------------------
// Deep path: loss narrative in, appraisal-driven update out
// ---------------------------------------------------------------------------

#[test]
fn loss_narrative_routes_deep_with_emotional_keywords() {
    let message = "Hoy me enteré de que falleció mi abuela y no puedo dejar de llorar, \
                   me siento completamente perdida y no sé qué hacer con tanto dolor, \
                   todo me recuerda a ella y la extraño muchísimo cada minuto del día";
    let classification = router::classify(message);
    assert_eq!(classification.complexity, Complexity::Complex);
    assert_eq!(classification.path, ProcessingPath::Deep);
    assert!(classification
        .reasons
        .iter()
        .any(|r| r.contains("emocional")));
}

#[test]
fn deep_path_appraisal_lands_on_despair() {
    let mut emotions = HashMap::new();
    emotions.insert("distress".to_string(), 0.9);
    emotions.insert("fears_confirmed".to_string(), 0.6);
    let target = appraisal::map_to_primaries(&emotions);

    let neutral = AffectState::neutral();
    let (next, mood) = decay::apply_update(
        &neutral,
        &target,
        &neutral,
        MoodState::NEUTRAL,
        &EmotionDynamics::default(),
        0.0,
        &quiet_config(),
        &mut rng(),
    );

    assert!(next.sadness > neutral.sadness);
    assert!(next.fear > neutral.fear);
    assert!(mood.pleasantness < 0.0);

    let insights = dyad::clinical_insights(&next);
    assert_eq!(insights.dominant_dyad.expect("dominant").name, "despair");
    assert!(insights.recommendation.contains("Desesperación"));
}

// ---------------------------------------------------------------------------
// Storage: disclosures are archived, smalltalk is not
// ---------------------------------------------------------------------------

#[test]
fn name_disclosure_with_good_news_is_archived() {
    let message = "Me llamo Ana y estoy muy feliz por mi nuevo trabajo";
    let deltas = analyzer::analyze_message(message);
    let state = decay::apply_deltas(&AffectState::neutral(), &deltas, 0.0, 0.3);
    let desirability = MoodState::target_from(&state).pleasantness;

    let decision = storage::decide(message, &state, desirability, &[], &StorageConfig::default());
    assert!(decision.informative > 0.0, "the name was detected");
    assert!(decision.event > 0.0, "the new job was detected");
    assert!(decision.should_store);
}

#[test]
fn smalltalk_is_never_archived() {
    let state = AffectState::neutral();
    for message in ["hola", "¿cómo estás?", "jaja ok"] {
        let decision = storage::decide(message, &state, 0.0, &[], &StorageConfig::default());
        assert!(!decision.should_store, "{message}");
    }
}

#[test]
fn recurring_topic_earns_temporal_points() {
    let history = vec![
        "El proyecto del trabajo no avanza".to_string(),
        "Sigo pensando en el proyecto del trabajo".to_string(),
    ];
    let decision = storage::decide(
        "Otra vez el proyecto del trabajo me quitó el sueño",
        &AffectState::neutral(),
        -0.2,
        &history,
        &StorageConfig::default(),
    );
    assert!(decision.temporal > 0.0);
}

// ---------------------------------------------------------------------------
// Accumulation and recovery over time
// ---------------------------------------------------------------------------

#[test]
fn repeated_sadness_accumulates_then_decays_back() {
    let config = quiet_config();
    let mut state = AffectState::neutral();
    for _ in 0..5 {
        let deltas = analyzer::analyze_message("Me siento muy triste y deprimido");
        state = decay::apply_deltas(&state, &deltas, config.base_decay_rate, 0.2);
    }
    assert!(state.sadness > 0.6, "five sad messages leave a mark");

    // Ten quiet hours later, the state has settled back to baseline.
    let baseline = AffectState::neutral();
    let (rested, _) = decay::apply_update(
        &state,
        &baseline,
        &baseline,
        MoodState::NEUTRAL,
        &EmotionDynamics::default(),
        600.0,
        &config,
        &mut rng(),
    );
    assert!(rested.sadness < state.sadness);
    assert!(rested.sadness < 0.3);
}

#[test]
fn sensitive_characters_resist_being_cheered_up() {
    let anxious = PersonalityProfile {
        neuroticism: 95.0,
        ..PersonalityProfile::balanced()
    };
    let sensitive = EmotionDynamics::from_personality(&anxious, 0.05, 0.3, 0.9);
    let steady = EmotionDynamics::from_personality(&PersonalityProfile::balanced(), 0.05, 0.3, 0.9);

    let mut sad = AffectState::neutral();
    sad.set(Primary::Sadness, 0.9);
    sad.set(Primary::Joy, 0.1);
    let mut cheerful_target = AffectState::neutral();
    cheerful_target.set(Primary::Joy, 0.9);
    cheerful_target.set(Primary::Sadness, 0.1);

    let low_mood = MoodState::new(-0.6, 0.3, 0.4);
    let baseline = AffectState::neutral();
    let (lifted_sensitive, _) = decay::apply_update(
        &sad,
        &cheerful_target,
        &baseline,
        low_mood,
        &sensitive,
        1.0,
        &quiet_config(),
        &mut rng(),
    );
    let (lifted_steady, _) = decay::apply_update(
        &sad,
        &cheerful_target,
        &baseline,
        low_mood,
        &steady,
        1.0,
        &quiet_config(),
        &mut rng(),
    );

    assert!(
        lifted_sensitive.joy < lifted_steady.joy,
        "good news lands softer on a sensitive character in a low mood"
    );
}

// ---------------------------------------------------------------------------
// Summary for the narrative collaborator
// ---------------------------------------------------------------------------

#[test]
fn summary_reflects_a_warm_exchange() {
    let deltas = analyzer::analyze_message("Confío en ti, me haces muy feliz");
    let state = decay::apply_deltas(&AffectState::neutral(), &deltas, 0.0, 0.0);
    let summary = analyzer::emotional_summary(&state);

    assert!(summary.secondary.contains(&"Amor".to_string()));
    assert!(["Sereno", "Positivo"].contains(&summary.mood.as_str()));
    assert!(summary.pad.pleasantness > 0.3);
}
