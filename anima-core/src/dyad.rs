//! Dyad synthesis — secondary emotions from pairs of primaries.
//!
//! Plutchik's wheel composes adjacent primaries into named blends: joy and
//! trust make love, fear and surprise make awe. This module carries the
//! full 20-entry table (8 adjacent, 8 one-apart, 4 opposite) and derives
//! dyad intensities from a [`AffectState`] snapshot.
//!
//! A dyad only registers when both contributing primaries are at least
//! [`MIN_COMPONENT`] and the weighted geometric mean reaches
//! [`MIN_COMBINED`]. Opposite-pair dyads mark internal conflict; their
//! summed intensity feeds the stability score.
//!
//! Reference: Plutchik, R. (1980). "A general psychoevolutionary theory
//! of emotion."

use serde::{Deserialize, Serialize};

use crate::types::{AffectState, Primary};

/// Both primaries must reach this level before a dyad can form.
pub const MIN_COMPONENT: f32 = 0.25;

/// The weighted combined intensity must reach this level to be emitted.
pub const MIN_COMBINED: f32 = 0.30;

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// Wheel distance class of a dyad's primary pair.
///
/// Serialized tags keep the original taxonomy: adjacent pairs are
/// "primary" dyads, one-apart pairs "secondary", opposite pairs
/// "tertiary".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DyadClass {
    /// Neighbouring primaries on the wheel.
    #[serde(rename = "primary")]
    Adjacent,
    /// Primaries separated by one position.
    #[serde(rename = "secondary")]
    OneApart,
    /// Diametrically opposed primaries; signals conflict.
    #[serde(rename = "tertiary")]
    Opposite,
}

impl DyadClass {
    /// Intensity multiplier. Adjacent blends are the most vivid, opposite
    /// blends the most muted.
    #[must_use]
    pub const fn weight(self) -> f32 {
        match self {
            DyadClass::Adjacent => 1.2,
            DyadClass::OneApart => 1.0,
            DyadClass::Opposite => 0.8,
        }
    }
}

/// One row of the static dyad table.
#[derive(Debug, Clone, Copy)]
pub struct DyadDef {
    /// Stable identifier, also used for lookups.
    pub name: &'static str,
    /// Spanish display label for prompt-facing descriptions.
    pub label_es: &'static str,
    /// First contributing primary.
    pub a: Primary,
    /// Second contributing primary.
    pub b: Primary,
    /// Wheel distance class.
    pub class: DyadClass,
}

const fn dyad(
    name: &'static str,
    label_es: &'static str,
    a: Primary,
    b: Primary,
    class: DyadClass,
) -> DyadDef {
    DyadDef {
        name,
        label_es,
        a,
        b,
        class,
    }
}

/// The complete dyad table. Total over all adjacent, one-apart, and
/// opposite pairs of the eight primaries.
pub const DYADS: [DyadDef; 20] = [
    // Adjacent pairs, clockwise around the wheel.
    dyad("love", "Amor", Primary::Joy, Primary::Trust, DyadClass::Adjacent),
    dyad("submission", "Sumisión", Primary::Trust, Primary::Fear, DyadClass::Adjacent),
    dyad("awe", "Asombro", Primary::Fear, Primary::Surprise, DyadClass::Adjacent),
    dyad("disapproval", "Desaprobación", Primary::Surprise, Primary::Sadness, DyadClass::Adjacent),
    dyad("remorse", "Remordimiento", Primary::Sadness, Primary::Disgust, DyadClass::Adjacent),
    dyad("contempt", "Desprecio", Primary::Disgust, Primary::Anger, DyadClass::Adjacent),
    dyad("aggressiveness", "Agresividad", Primary::Anger, Primary::Anticipation, DyadClass::Adjacent),
    dyad("optimism", "Optimismo", Primary::Anticipation, Primary::Joy, DyadClass::Adjacent),
    // One-apart pairs.
    dyad("guilt", "Culpa", Primary::Joy, Primary::Fear, DyadClass::OneApart),
    dyad("curiosity", "Curiosidad", Primary::Trust, Primary::Surprise, DyadClass::OneApart),
    dyad("despair", "Desesperación", Primary::Fear, Primary::Sadness, DyadClass::OneApart),
    dyad("unbelief", "Incredulidad", Primary::Surprise, Primary::Disgust, DyadClass::OneApart),
    dyad("envy", "Envidia", Primary::Sadness, Primary::Anger, DyadClass::OneApart),
    dyad("cynicism", "Cinismo", Primary::Disgust, Primary::Anticipation, DyadClass::OneApart),
    dyad("pride", "Orgullo", Primary::Anger, Primary::Joy, DyadClass::OneApart),
    dyad("anxiety", "Ansiedad", Primary::Anticipation, Primary::Trust, DyadClass::OneApart),
    // Opposite pairs. These are felt as being pulled two ways at once.
    dyad("ambivalence", "Ambivalencia", Primary::Joy, Primary::Sadness, DyadClass::Opposite),
    dyad("ambiguity", "Ambigüedad", Primary::Trust, Primary::Disgust, DyadClass::Opposite),
    dyad("frozenness", "Parálisis", Primary::Fear, Primary::Anger, DyadClass::Opposite),
    dyad("confusion", "Confusión", Primary::Surprise, Primary::Anticipation, DyadClass::Opposite),
];

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

/// An active dyad derived from a state snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct DyadResult {
    /// Table identifier, e.g. `"love"`.
    pub name: &'static str,
    /// Spanish display label.
    pub label_es: &'static str,
    /// Wheel distance class.
    #[serde(rename = "type")]
    pub class: DyadClass,
    /// First contributing primary and its intensity.
    pub a: (Primary, f32),
    /// Second contributing primary and its intensity.
    pub b: (Primary, f32),
    /// Weighted geometric mean of the pair, clamped to 1.0.
    pub intensity: f32,
}

fn evaluate(def: &DyadDef, state: &AffectState) -> Option<DyadResult> {
    let a = state.get(def.a);
    let b = state.get(def.b);
    if a < MIN_COMPONENT || b < MIN_COMPONENT {
        return None;
    }
    let intensity = ((a * b).sqrt() * def.class.weight()).min(1.0);
    if intensity < MIN_COMBINED {
        return None;
    }
    Some(DyadResult {
        name: def.name,
        label_es: def.label_es,
        class: def.class,
        a: (def.a, a),
        b: (def.b, b),
        intensity,
    })
}

/// Every active dyad for the state, strongest first.
#[must_use]
pub fn compute_dyads(state: &AffectState) -> Vec<DyadResult> {
    let mut out: Vec<DyadResult> = DYADS.iter().filter_map(|d| evaluate(d, state)).collect();
    out.sort_by(|x, y| y.intensity.total_cmp(&x.intensity));
    out
}

/// The `n` strongest active dyads.
#[must_use]
pub fn top_dyads(state: &AffectState, n: usize) -> Vec<DyadResult> {
    let mut out = compute_dyads(state);
    out.truncate(n);
    out
}

/// The single strongest active dyad, if any reaches threshold.
#[must_use]
pub fn dominant_dyad(state: &AffectState) -> Option<DyadResult> {
    compute_dyads(state).into_iter().next()
}

/// Whether the named dyad is currently active.
#[must_use]
pub fn is_active(state: &AffectState, name: &str) -> bool {
    DYADS
        .iter()
        .find(|d| d.name == name)
        .and_then(|d| evaluate(d, state))
        .is_some()
}

/// Intensity of the named dyad, or 0.0 when inactive or unknown.
#[must_use]
pub fn dyad_intensity(state: &AffectState, name: &str) -> f32 {
    DYADS
        .iter()
        .find(|d| d.name == name)
        .and_then(|d| evaluate(d, state))
        .map_or(0.0, |r| r.intensity)
}

/// Synthesize the dyad for a specific pair of primaries at the given
/// intensities, regardless of argument order. `None` when the pair has no
/// table entry or falls below threshold.
#[must_use]
pub fn secondary_emotion(a: Primary, ia: f32, b: Primary, ib: f32) -> Option<DyadResult> {
    let def = DYADS
        .iter()
        .find(|d| (d.a == a && d.b == b) || (d.a == b && d.b == a))?;
    let mut state = AffectState::zeroed();
    state.set(a, ia);
    state.set(b, ib);
    evaluate(def, &state)
}

/// Active opposite-pair dyads. A non-empty result means the character is
/// feeling contradictory emotions at once.
#[must_use]
pub fn emotional_conflicts(state: &AffectState) -> Vec<DyadResult> {
    compute_dyads(state)
        .into_iter()
        .filter(|d| d.class == DyadClass::Opposite)
        .collect()
}

/// Stability score in [0, 1]. Full stability when no opposite-pair dyads
/// are active; each conflict subtracts its intensity.
#[must_use]
pub fn emotional_stability(state: &AffectState) -> f32 {
    let conflict_load: f32 = emotional_conflicts(state).iter().map(|d| d.intensity).sum();
    (1.0 - conflict_load).max(0.0)
}

/// Spanish one-line summary of the active dyads, for prompt injection.
#[must_use]
pub fn describe_dyads(state: &AffectState) -> String {
    let dyads = top_dyads(state, 3);
    if dyads.is_empty() {
        return "Sin emociones secundarias significativas".to_string();
    }
    let parts: Vec<String> = dyads
        .iter()
        .map(|d| format!("{} ({:.0}%)", d.label_es, d.intensity * 100.0))
        .collect();
    parts.join(", ")
}

// ---------------------------------------------------------------------------
// Clinical read
// ---------------------------------------------------------------------------

/// Dominant-dyad intensity at which despair or anxiety gets called out.
const CONCERN_THRESHOLD: f32 = 0.6;

/// Stability below which the conflict warning fires.
const UNSTABLE_THRESHOLD: f32 = 0.5;

/// Aggregate read of the dyad layer, with a Spanish-language
/// recommendation for the narrative layer.
#[derive(Debug, Clone, Serialize)]
pub struct ClinicalInsights {
    /// Strongest active dyad, if any.
    pub dominant_dyad: Option<DyadResult>,
    /// Active opposite-pair dyads.
    pub conflicts: Vec<DyadResult>,
    /// Stability score in [0, 1].
    pub stability: f32,
    /// Short guidance string for downstream prompts.
    pub recommendation: String,
}

/// Summarize the dyad layer into a stability assessment.
#[must_use]
pub fn clinical_insights(state: &AffectState) -> ClinicalInsights {
    let dominant = dominant_dyad(state);
    let conflicts = emotional_conflicts(state);
    let stability = emotional_stability(state);

    let recommendation = match dominant.as_ref() {
        Some(d) if d.name == "despair" && d.intensity >= CONCERN_THRESHOLD => {
            "Desesperación elevada: responder con contención y esperanza realista".to_string()
        }
        Some(d) if d.name == "anxiety" && d.intensity >= CONCERN_THRESHOLD => {
            "Ansiedad elevada: ritmo pausado, evitar presión adicional".to_string()
        }
        _ if stability < UNSTABLE_THRESHOLD => {
            "Conflicto emocional interno: reconocer la ambivalencia sin forzar resolución"
                .to_string()
        }
        _ => "Estado emocional estable".to_string(),
    };

    ClinicalInsights {
        dominant_dyad: dominant,
        conflicts,
        stability,
        recommendation,
    }
}
