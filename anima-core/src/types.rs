//! Core type definitions for the anima affect model.
//!
//! All types are serializable; the persistence collaborator stores them as
//! JSON values keyed by character id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Primary Emotions — Plutchik wheel
// ---------------------------------------------------------------------------

/// One of the eight primary emotions, in wheel order.
///
/// Adjacent entries sit next to each other on the wheel; entries four apart
/// are opposites (joy↔sadness, trust↔disgust, fear↔anger,
/// surprise↔anticipation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Primary {
    /// Serenity → joy → ecstasy axis.
    Joy,
    /// Acceptance → trust → admiration axis.
    Trust,
    /// Apprehension → fear → terror axis.
    Fear,
    /// Distraction → surprise → amazement axis.
    Surprise,
    /// Pensiveness → sadness → grief axis.
    Sadness,
    /// Boredom → disgust → loathing axis.
    Disgust,
    /// Annoyance → anger → rage axis.
    Anger,
    /// Interest → anticipation → vigilance axis.
    Anticipation,
}

impl Primary {
    /// All eight primaries in wheel order.
    pub const ALL: [Primary; 8] = [
        Primary::Joy,
        Primary::Trust,
        Primary::Fear,
        Primary::Surprise,
        Primary::Sadness,
        Primary::Disgust,
        Primary::Anger,
        Primary::Anticipation,
    ];

    /// Position on the wheel (0–7).
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Primary::Joy => 0,
            Primary::Trust => 1,
            Primary::Fear => 2,
            Primary::Surprise => 3,
            Primary::Sadness => 4,
            Primary::Disgust => 5,
            Primary::Anger => 6,
            Primary::Anticipation => 7,
        }
    }

    /// The emotion directly across the wheel.
    #[must_use]
    pub fn opposite(self) -> Primary {
        Primary::ALL[(self.index() + 4) % 8]
    }

    /// Shortest distance between two wheel positions (0–4).
    #[must_use]
    pub fn wheel_distance(self, other: Primary) -> usize {
        let d = self.index().abs_diff(other.index());
        d.min(8 - d)
    }

    /// Lowercase name, matching the wire format.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Primary::Joy => "joy",
            Primary::Trust => "trust",
            Primary::Fear => "fear",
            Primary::Surprise => "surprise",
            Primary::Sadness => "sadness",
            Primary::Disgust => "disgust",
            Primary::Anger => "anger",
            Primary::Anticipation => "anticipation",
        }
    }

    /// Spanish display name graded by intensity along Plutchik's axis:
    /// below 0.4 the mild form, above 0.7 the extreme form, the plain
    /// emotion in between.
    #[must_use]
    pub fn intensity_label_es(self, intensity: f32) -> &'static str {
        let (low, mid, high) = match self {
            Primary::Joy => ("Serenidad", "Alegría", "Éxtasis"),
            Primary::Trust => ("Aceptación", "Confianza", "Admiración"),
            Primary::Fear => ("Aprensión", "Miedo", "Terror"),
            Primary::Surprise => ("Distracción", "Sorpresa", "Asombro"),
            Primary::Sadness => ("Melancolía", "Tristeza", "Pena"),
            Primary::Disgust => ("Aburrimiento", "Disgusto", "Repugnancia"),
            Primary::Anger => ("Molestia", "Enojo", "Furia"),
            Primary::Anticipation => ("Interés", "Anticipación", "Vigilancia"),
        };
        if intensity > 0.7 {
            high
        } else if intensity >= 0.4 {
            mid
        } else {
            low
        }
    }
}

impl fmt::Display for Primary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Primary Affect State
// ---------------------------------------------------------------------------

/// The character's momentary emotional state: one intensity per primary,
/// each clamped to [0, 1], plus the wall-clock time of the last update.
///
/// A fixed struct rather than a string-keyed map, so every primary always
/// has a value and "missing key" cannot mean anything.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffectState {
    /// Joy intensity.
    pub joy: f32,
    /// Trust intensity.
    pub trust: f32,
    /// Fear intensity.
    pub fear: f32,
    /// Surprise intensity.
    pub surprise: f32,
    /// Sadness intensity.
    pub sadness: f32,
    /// Disgust intensity.
    pub disgust: f32,
    /// Anger intensity.
    pub anger: f32,
    /// Anticipation intensity.
    pub anticipation: f32,
    /// When this state was last written.
    pub last_updated: DateTime<Utc>,
}

impl AffectState {
    /// Resting baseline for a freshly created character: mildly positive,
    /// open, slightly expectant.
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            joy: 0.5,
            trust: 0.5,
            fear: 0.2,
            surprise: 0.1,
            sadness: 0.2,
            disgust: 0.1,
            anger: 0.1,
            anticipation: 0.4,
            last_updated: Utc::now(),
        }
    }

    /// All primaries at zero.
    #[must_use]
    pub fn zeroed() -> Self {
        Self {
            joy: 0.0,
            trust: 0.0,
            fear: 0.0,
            surprise: 0.0,
            sadness: 0.0,
            disgust: 0.0,
            anger: 0.0,
            anticipation: 0.0,
            last_updated: Utc::now(),
        }
    }

    /// Intensity of a single primary.
    #[must_use]
    pub fn get(&self, primary: Primary) -> f32 {
        match primary {
            Primary::Joy => self.joy,
            Primary::Trust => self.trust,
            Primary::Fear => self.fear,
            Primary::Surprise => self.surprise,
            Primary::Sadness => self.sadness,
            Primary::Disgust => self.disgust,
            Primary::Anger => self.anger,
            Primary::Anticipation => self.anticipation,
        }
    }

    /// Set a single primary, clamped to [0, 1].
    pub fn set(&mut self, primary: Primary, value: f32) {
        let v = value.clamp(0.0, 1.0);
        match primary {
            Primary::Joy => self.joy = v,
            Primary::Trust => self.trust = v,
            Primary::Fear => self.fear = v,
            Primary::Surprise => self.surprise = v,
            Primary::Sadness => self.sadness = v,
            Primary::Disgust => self.disgust = v,
            Primary::Anger => self.anger = v,
            Primary::Anticipation => self.anticipation = v,
        }
    }

    /// Iterate `(primary, intensity)` pairs in wheel order.
    pub fn iter(&self) -> impl Iterator<Item = (Primary, f32)> + '_ {
        Primary::ALL.iter().map(move |&p| (p, self.get(p)))
    }

    /// Copy with every primary clamped to [0, 1].
    #[must_use]
    pub fn clamped(mut self) -> Self {
        for p in Primary::ALL {
            self.set(p, self.get(p));
        }
        self
    }

    /// The strongest primary and its intensity.
    #[must_use]
    pub fn dominant(&self) -> (Primary, f32) {
        let mut best = (Primary::Joy, self.joy);
        for (p, v) in self.iter() {
            if v > best.1 {
                best = (p, v);
            }
        }
        best
    }

    /// All eight primaries sorted strongest first.
    #[must_use]
    pub fn ranked(&self) -> Vec<(Primary, f32)> {
        let mut pairs: Vec<(Primary, f32)> = self.iter().collect();
        pairs.sort_by(|a, b| b.1.total_cmp(&a.1));
        pairs
    }

    /// Mean intensity across all eight primaries.
    #[must_use]
    pub fn mean_intensity(&self) -> f32 {
        self.iter().map(|(_, v)| v).sum::<f32>() / 8.0
    }

    /// Stamp the state with the current wall-clock time.
    pub fn touch(&mut self) {
        self.last_updated = Utc::now();
    }
}

impl Default for AffectState {
    fn default() -> Self {
        Self::neutral()
    }
}

// ---------------------------------------------------------------------------
// Affect Deltas — signed per-primary adjustments
// ---------------------------------------------------------------------------

/// A signed adjustment per primary, produced by the rule-based analyzer.
///
/// Unlike [`AffectState`], deltas may be negative (a message can push an
/// emotion down as well as up).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AffectDeltas {
    /// Joy adjustment.
    pub joy: f32,
    /// Trust adjustment.
    pub trust: f32,
    /// Fear adjustment.
    pub fear: f32,
    /// Surprise adjustment.
    pub surprise: f32,
    /// Sadness adjustment.
    pub sadness: f32,
    /// Disgust adjustment.
    pub disgust: f32,
    /// Anger adjustment.
    pub anger: f32,
    /// Anticipation adjustment.
    pub anticipation: f32,
}

impl AffectDeltas {
    /// Adjustment for a single primary.
    #[must_use]
    pub fn get(&self, primary: Primary) -> f32 {
        match primary {
            Primary::Joy => self.joy,
            Primary::Trust => self.trust,
            Primary::Fear => self.fear,
            Primary::Surprise => self.surprise,
            Primary::Sadness => self.sadness,
            Primary::Disgust => self.disgust,
            Primary::Anger => self.anger,
            Primary::Anticipation => self.anticipation,
        }
    }

    /// Add to a single primary's adjustment.
    pub fn nudge(&mut self, primary: Primary, amount: f32) {
        match primary {
            Primary::Joy => self.joy += amount,
            Primary::Trust => self.trust += amount,
            Primary::Fear => self.fear += amount,
            Primary::Surprise => self.surprise += amount,
            Primary::Sadness => self.sadness += amount,
            Primary::Disgust => self.disgust += amount,
            Primary::Anger => self.anger += amount,
            Primary::Anticipation => self.anticipation += amount,
        }
    }

    /// Copy with every adjustment clamped to ±`limit`.
    #[must_use]
    pub fn bounded(mut self, limit: f32) -> Self {
        let limit = limit.abs();
        for p in Primary::ALL {
            let v = self.get(p).clamp(-limit, limit);
            match p {
                Primary::Joy => self.joy = v,
                Primary::Trust => self.trust = v,
                Primary::Fear => self.fear = v,
                Primary::Surprise => self.surprise = v,
                Primary::Sadness => self.sadness = v,
                Primary::Disgust => self.disgust = v,
                Primary::Anger => self.anger = v,
                Primary::Anticipation => self.anticipation = v,
            }
        }
        self
    }

    /// Iterate `(primary, adjustment)` pairs in wheel order.
    pub fn iter(&self) -> impl Iterator<Item = (Primary, f32)> + '_ {
        Primary::ALL.iter().map(move |&p| (p, self.get(p)))
    }
}

// ---------------------------------------------------------------------------
// Mood — slow three-axis background state
// ---------------------------------------------------------------------------

/// Background mood, distinct from momentary emotion: it moves slowly and
/// colours everything the character does.
///
/// - **Pleasantness**: miserable (-1.0) → delighted (+1.0)
/// - **Activation**: drained (0.0) → energized (1.0)
/// - **Control**: helpless (0.0) → in command (1.0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoodState {
    /// Miserable (-1.0) to delighted (+1.0).
    pub pleasantness: f32,
    /// Drained (0.0) to energized (1.0).
    pub activation: f32,
    /// Helpless (0.0) to in command (1.0).
    pub control: f32,
}

impl MoodState {
    /// Neutral mood.
    pub const NEUTRAL: MoodState = MoodState {
        pleasantness: 0.0,
        activation: 0.5,
        control: 0.5,
    };

    /// Create a mood state, clamping each axis to its declared range.
    #[must_use]
    pub fn new(pleasantness: f32, activation: f32, control: f32) -> Self {
        Self {
            pleasantness: pleasantness.clamp(-1.0, 1.0),
            activation: activation.clamp(0.0, 1.0),
            control: control.clamp(0.0, 1.0),
        }
    }

    /// Copy with every axis clamped to its declared range.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self::new(self.pleasantness, self.activation, self.control)
    }

    /// The mood each primary state pulls toward.
    ///
    /// Pleasantness follows the positive/negative primary balance;
    /// activation follows the energizing primaries (anger, fear, surprise,
    /// anticipation) against the sedating ones (sadness, trust); control
    /// rises with anger/disgust/anticipation and falls with fear/sadness.
    #[must_use]
    pub fn target_from(state: &AffectState) -> Self {
        let pleasantness = state.joy * 0.5 + state.trust * 0.35 + state.anticipation * 0.15
            - state.sadness * 0.5
            - state.fear * 0.3
            - state.anger * 0.3
            - state.disgust * 0.25;

        let activation = 0.2
            + state.anger * 0.25
            + state.fear * 0.25
            + state.surprise * 0.2
            + state.anticipation * 0.15
            + state.joy * 0.1
            - state.sadness * 0.2
            - state.trust * 0.1;

        let control = 0.5
            + state.anger * 0.25
            + state.disgust * 0.15
            + state.anticipation * 0.15
            + state.joy * 0.1
            - state.fear * 0.3
            - state.sadness * 0.2
            - state.surprise * 0.1;

        Self::new(pleasantness, activation, control)
    }

    /// Short human-readable summary for the narrative collaborator.
    #[must_use]
    pub fn describe(&self) -> String {
        let tone = match self.pleasantness {
            p if p > 0.4 => "bright",
            p if p > 0.1 => "warm",
            p if p > -0.1 => "even",
            p if p > -0.4 => "low",
            _ => "dark",
        };
        let energy = match self.activation {
            a if a > 0.7 => "restless",
            a if a > 0.4 => "steady",
            _ => "subdued",
        };
        let grip = match self.control {
            c if c > 0.65 => "assured",
            c if c > 0.35 => "balanced",
            _ => "adrift",
        };
        format!("{tone}, {energy}, {grip}")
    }
}

impl Default for MoodState {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

// ---------------------------------------------------------------------------
// Personality & Dynamics
// ---------------------------------------------------------------------------

/// Five stable personality scalars on a 0–100 scale.
///
/// These never change at runtime; they shape how fast emotions decay and
/// how much new input moves the character.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PersonalityProfile {
    /// Curiosity and openness to new experience.
    pub openness: f32,
    /// Self-discipline and steadiness.
    pub conscientiousness: f32,
    /// Outward energy and expressiveness.
    pub extraversion: f32,
    /// Warmth and cooperativeness.
    pub agreeableness: f32,
    /// Emotional reactivity; high values feel setbacks harder and longer.
    pub neuroticism: f32,
}

impl PersonalityProfile {
    /// A flat, middle-of-the-road profile.
    #[must_use]
    pub fn balanced() -> Self {
        Self {
            openness: 50.0,
            conscientiousness: 50.0,
            extraversion: 50.0,
            agreeableness: 50.0,
            neuroticism: 50.0,
        }
    }

    /// Copy with every trait clamped to 0–100.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            openness: self.openness.clamp(0.0, 100.0),
            conscientiousness: self.conscientiousness.clamp(0.0, 100.0),
            extraversion: self.extraversion.clamp(0.0, 100.0),
            agreeableness: self.agreeableness.clamp(0.0, 100.0),
            neuroticism: self.neuroticism.clamp(0.0, 100.0),
        }
    }
}

impl Default for PersonalityProfile {
    fn default() -> Self {
        Self::balanced()
    }
}

/// Per-character decay and inertia coefficients, derived from personality.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionDynamics {
    /// Exponential decay rate toward baseline, per minute of elapsed time.
    pub decay_rate: f32,
    /// How much the current state resists new input (0 = none, 1 = frozen).
    pub inertia: f32,
    /// Mood moves with its own larger, slower inertia.
    pub mood_inertia: f32,
    /// Emotional sensitivity (0–1), from neuroticism; drives dynamic
    /// inertia adjustments.
    pub sensitivity: f32,
}

impl EmotionDynamics {
    /// Derive dynamics from a personality profile and base coefficients.
    ///
    /// High neuroticism slows recovery (lower decay rate, higher
    /// sensitivity); high conscientiousness steadies the state (more
    /// inertia); high extraversion makes the character quicker to move.
    #[must_use]
    pub fn from_personality(
        profile: &PersonalityProfile,
        base_decay_rate: f32,
        base_inertia: f32,
        mood_inertia: f32,
    ) -> Self {
        let p = profile.clamped();
        let neuroticism = p.neuroticism / 100.0;
        let conscientiousness = p.conscientiousness / 100.0;
        let extraversion = p.extraversion / 100.0;

        // Neurotic characters hold on to states longer; extraverted ones
        // shift faster.
        let decay_rate =
            (base_decay_rate * (1.2 - 0.6 * neuroticism + 0.2 * extraversion)).clamp(0.001, 1.0);
        let inertia =
            (base_inertia + 0.2 * conscientiousness - 0.15 * extraversion).clamp(0.0, 0.95);

        Self {
            decay_rate,
            inertia,
            mood_inertia: mood_inertia.clamp(0.0, 0.99),
            sensitivity: neuroticism,
        }
    }
}

impl Default for EmotionDynamics {
    fn default() -> Self {
        Self::from_personality(&PersonalityProfile::balanced(), 0.05, 0.3, 0.9)
    }
}
