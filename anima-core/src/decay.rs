//! Affect Decay & Inertia — how emotions age and resist change.
//!
//! Two update modes share this module:
//!
//! - **Stateless blend** ([`apply_deltas`]): the fast path's cheap update.
//!   The rule-based delta lands damped by inertia, then each primary takes
//!   one proportional decay step toward the neutral midline.
//! - **Timed update** ([`apply_update`]): the full model. Intensities decay
//!   exponentially toward the character's baseline over elapsed wall-clock
//!   time, the provider-derived target is blended in against a dynamically
//!   adjusted inertia, and the slow three-axis mood follows with its own
//!   much larger inertia.
//!
//! Decay follows `v' = v·e^(−rate·Δt) + b·(1 − e^(−rate·Δt))` with Δt in
//! minutes, so a state left alone converges on its baseline rather than on
//! zero. Residual intensities under the noise floor are dropped entirely,
//! unless the baseline itself sits above the floor.
//!
//! Reference: Picard, R. (1997). "Affective Computing" — decay and mood
//! ground tone; Mehrabian, A. (1996) for the three-axis mood space.

use rand::Rng;

use crate::config::AffectConfig;
use crate::types::{AffectDeltas, AffectState, EmotionDynamics, MoodState, Primary};

/// Midline used by the stateless fast-path decay step.
const NEUTRAL_MIDLINE: f32 = 0.5;

/// Mood pleasantness below which a sensitive character resists recovery.
const SUSTAINED_NEGATIVE: f32 = -0.3;

/// Sensitivity above which the sustained-negative rule engages.
const SENSITIVITY_GATE: f32 = 0.6;

/// Exponential decay of one intensity toward a baseline.
///
/// `rate` is per minute; `minutes` may be fractional. At `minutes = 0` the
/// value is returned untouched.
#[must_use]
pub fn decay_toward(current: f32, baseline: f32, rate: f32, minutes: f32) -> f32 {
    if minutes <= 0.0 || rate <= 0.0 {
        return current;
    }
    let retention = (-rate * minutes).exp();
    current * retention + baseline * (1.0 - retention)
}

/// Inertia blend of a decayed value with its target.
#[must_use]
pub fn blend(decayed: f32, target: f32, inertia: f32) -> f32 {
    let inertia = inertia.clamp(0.0, 1.0);
    decayed * inertia + target * (1.0 - inertia)
}

/// Adjust inertia for the current emotional situation.
///
/// Two asymmetries, both pulling the model away from a fixed coefficient:
/// a sensitive character stuck in a negative mood resists being cheered up
/// (inertia rises toward 0.9), and a character knocked from a strongly
/// positive mood toward a strongly negative target drops fast (inertia is
/// halved). Falling is easier than climbing.
#[must_use]
pub fn effective_inertia(dynamics: &EmotionDynamics, mood: MoodState, target_valence: f32) -> f32 {
    let mut inertia = dynamics.inertia;

    if mood.pleasantness < SUSTAINED_NEGATIVE && dynamics.sensitivity > SENSITIVITY_GATE {
        let pull = (dynamics.sensitivity - SENSITIVITY_GATE) / (1.0 - SENSITIVITY_GATE);
        inertia += (0.9 - inertia) * pull;
    }

    if mood.pleasantness > 0.4 && target_valence < -0.4 {
        inertia *= 0.5;
    }

    inertia.clamp(0.0, 0.95)
}

/// Fast-path update: the deltas land first, damped by inertia, then each
/// primary takes one proportional decay step toward the neutral midline.
/// Clamped to [0, 1].
///
/// With `decay_rate = 0` and `inertia = 0` this is an exact delta add,
/// which keeps the rule-based path easy to reason about in tests. At
/// `decay_rate = 1` everything snaps back to the midline regardless of
/// input.
#[must_use]
pub fn apply_deltas(
    state: &AffectState,
    deltas: &AffectDeltas,
    decay_rate: f32,
    inertia: f32,
) -> AffectState {
    let mut next = *state;
    let damping = 1.0 - inertia.clamp(0.0, 1.0);
    let rate = decay_rate.clamp(0.0, 1.0);
    for p in Primary::ALL {
        let moved = state.get(p) + deltas.get(p) * damping;
        next.set(p, moved + (NEUTRAL_MIDLINE - moved) * rate);
    }
    next.touch();
    next
}

/// Full timed update: decay toward baseline, blend toward the target under
/// dynamic inertia, drop sub-floor residue, and move the mood.
///
/// `elapsed_minutes` is wall-clock time since the state was last written.
/// The RNG is only consulted for the spontaneous mood perturbation, and
/// only when `config.perturbation_enabled` is set; pass a seeded
/// `StdRng` for reproducible runs.
#[must_use]
pub fn apply_update<R: Rng>(
    current: &AffectState,
    target: &AffectState,
    baseline: &AffectState,
    mood: MoodState,
    dynamics: &EmotionDynamics,
    elapsed_minutes: f32,
    config: &AffectConfig,
    rng: &mut R,
) -> (AffectState, MoodState) {
    let target_valence = MoodState::target_from(target).pleasantness;
    let inertia = effective_inertia(dynamics, mood, target_valence);

    let mut next = *current;
    for p in Primary::ALL {
        let decayed = decay_toward(
            current.get(p),
            baseline.get(p),
            dynamics.decay_rate,
            elapsed_minutes,
        );
        let decayed = settle(decayed, baseline.get(p), config.noise_floor);
        let blended = blend(decayed, target.get(p), inertia);
        next.set(p, settle(blended, baseline.get(p), config.noise_floor));
    }
    next.touch();

    let next_mood = update_mood(mood, &next, dynamics.mood_inertia, config, rng);
    (next, next_mood)
}

/// Move the mood toward the target implied by the new primary state.
///
/// Mood is deliberately sluggish: its inertia is larger than the emotion
/// inertia, so a single message shifts it only slightly. The spontaneous
/// perturbation nudges pleasantness and activation only; control never
/// drifts on its own.
#[must_use]
pub fn update_mood<R: Rng>(
    mood: MoodState,
    state: &AffectState,
    mood_inertia: f32,
    config: &AffectConfig,
    rng: &mut R,
) -> MoodState {
    let target = MoodState::target_from(state);
    let inertia = mood_inertia.clamp(0.0, 0.99);

    let mut next = MoodState::new(
        blend(mood.pleasantness, target.pleasantness, inertia),
        blend(mood.activation, target.activation, inertia),
        blend(mood.control, target.control, inertia),
    );

    if config.perturbation_enabled && rng.gen_bool(config.perturbation_probability.clamp(0.0, 1.0))
    {
        let drift_p: f32 = rng.gen_range(-0.05..=0.05);
        let drift_a: f32 = rng.gen_range(-0.05..=0.05);
        next = MoodState::new(
            next.pleasantness + drift_p,
            next.activation + drift_a,
            next.control,
        );
        tracing::debug!(drift_p, drift_a, "spontaneous mood perturbation");
    }

    next
}

/// Drop intensities below the noise floor, unless the baseline keeps that
/// primary alive.
fn settle(value: f32, baseline: f32, floor: f32) -> f32 {
    if value < floor && baseline <= floor {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn quiet_config() -> AffectConfig {
        AffectConfig {
            perturbation_enabled: false,
            ..AffectConfig::default()
        }
    }

    #[test]
    fn decay_immediate_is_identity() {
        assert!((decay_toward(0.8, 0.2, 0.05, 0.0) - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn decay_approaches_baseline_monotonically() {
        let at_10 = decay_toward(0.9, 0.3, 0.05, 10.0);
        let at_60 = decay_toward(0.9, 0.3, 0.05, 60.0);
        let at_600 = decay_toward(0.9, 0.3, 0.05, 600.0);

        assert!(at_10 < 0.9);
        assert!(at_60 < at_10);
        assert!(at_600 < at_60);
        assert!(at_600 > 0.3, "never crosses the baseline");
    }

    #[test]
    fn decay_from_below_rises_toward_baseline() {
        let v = decay_toward(0.1, 0.5, 0.05, 60.0);
        assert!(v > 0.1);
        assert!(v < 0.5);
    }

    #[test]
    fn decay_exact_retention_at_unit_exponent() {
        // rate 0.05/min over 20 min → e^(-1) of the distance retained.
        let v = decay_toward(1.0, 0.0, 0.05, 20.0);
        assert!((f64::from(v) - (-1.0_f64).exp()).abs() < 1e-4);
    }

    #[test]
    fn blend_extremes() {
        assert!((blend(0.8, 0.2, 1.0) - 0.8).abs() < f32::EPSILON);
        assert!((blend(0.8, 0.2, 0.0) - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn apply_deltas_exact_add_with_zero_coefficients() {
        let state = AffectState::neutral();
        let deltas = AffectDeltas {
            joy: 0.2,
            ..AffectDeltas::default()
        };
        let next = apply_deltas(&state, &deltas, 0.0, 0.0);
        assert!((next.joy - 0.7).abs() < 1e-6);
    }

    #[test]
    fn apply_deltas_decays_toward_midline() {
        let mut state = AffectState::neutral();
        state.set(Primary::Joy, 0.8);
        state.set(Primary::Sadness, 0.3);
        let next = apply_deltas(&state, &AffectDeltas::default(), 0.1, 0.0);
        assert!(next.joy < 0.8);
        assert!(next.joy > 0.5);
        assert!(next.sadness > 0.3);
        assert!(next.sadness < 0.5);
    }

    #[test]
    fn apply_deltas_high_inertia_damps_more() {
        let state = AffectState::neutral();
        let deltas = AffectDeltas {
            joy: 0.4,
            ..AffectDeltas::default()
        };
        let stiff = apply_deltas(&state, &deltas, 0.05, 0.8);
        let loose = apply_deltas(&state, &deltas, 0.05, 0.1);
        assert!(loose.joy > stiff.joy);
    }

    #[test]
    fn apply_deltas_full_decay_snaps_to_midline() {
        let state = AffectState::neutral();
        let deltas = AffectDeltas {
            joy: 0.1,
            ..AffectDeltas::default()
        };
        let next = apply_deltas(&state, &deltas, 1.0, 0.0);
        assert!((next.joy - 0.5).abs() < 0.1);
    }

    #[test]
    fn apply_deltas_clamps_extreme_input() {
        let state = AffectState::neutral();
        let deltas = AffectDeltas {
            joy: 5.0,
            sadness: -5.0,
            ..AffectDeltas::default()
        };
        let next = apply_deltas(&state, &deltas, 0.05, 0.0);
        assert!(next.joy <= 1.0);
        assert!(next.sadness >= 0.0);
    }

    #[test]
    fn sub_floor_residue_drops_to_zero() {
        let mut state = AffectState::zeroed();
        state.set(Primary::Disgust, 0.06);
        let baseline = AffectState::zeroed();
        let target = state;
        let (next, _) = apply_update(
            &state,
            &target,
            &baseline,
            MoodState::NEUTRAL,
            &EmotionDynamics::default(),
            600.0,
            &quiet_config(),
            &mut rng(),
        );
        assert_eq!(next.disgust, 0.0, "residue under the floor is dropped");
    }

    #[test]
    fn baseline_above_floor_is_preserved() {
        // Neutral anger baseline is 0.1, above the 0.05 floor.
        let baseline = AffectState::neutral();
        let mut state = AffectState::zeroed();
        state.set(Primary::Anger, 0.04);
        let (next, _) = apply_update(
            &state,
            &state,
            &baseline,
            MoodState::NEUTRAL,
            &EmotionDynamics::default(),
            600.0,
            &quiet_config(),
            &mut rng(),
        );
        assert!(next.anger > 0.0, "baseline keeps the primary alive");
    }

    #[test]
    fn sustained_negative_mood_raises_inertia_for_sensitive_characters() {
        let dynamics = EmotionDynamics {
            inertia: 0.3,
            sensitivity: 0.9,
            ..EmotionDynamics::default()
        };
        let low_mood = MoodState::new(-0.6, 0.3, 0.4);
        let raised = effective_inertia(&dynamics, low_mood, 0.0);
        assert!(raised > 0.3);

        let insensitive = EmotionDynamics {
            inertia: 0.3,
            sensitivity: 0.2,
            ..EmotionDynamics::default()
        };
        let unchanged = effective_inertia(&insensitive, low_mood, 0.0);
        assert!((unchanged - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn positive_to_negative_transition_lowers_inertia() {
        let dynamics = EmotionDynamics {
            inertia: 0.6,
            sensitivity: 0.5,
            ..EmotionDynamics::default()
        };
        let high_mood = MoodState::new(0.7, 0.6, 0.5);
        let dropped = effective_inertia(&dynamics, high_mood, -0.8);
        assert!((dropped - 0.3).abs() < 1e-6, "halved on the way down");
    }

    #[test]
    fn mood_moves_slower_than_emotion() {
        let mut state = AffectState::neutral();
        state.set(Primary::Sadness, 0.9);
        state.set(Primary::Joy, 0.1);
        let mood = MoodState::new(0.5, 0.5, 0.5);
        let next = update_mood(mood, &state, 0.9, &quiet_config(), &mut rng());
        // Target pleasantness is well below zero, but one step covers only
        // a tenth of the distance.
        assert!(next.pleasantness < 0.5);
        assert!(next.pleasantness > 0.2);
    }

    #[test]
    fn perturbation_disabled_is_deterministic() {
        let state = AffectState::neutral();
        let mood = MoodState::NEUTRAL;
        let a = update_mood(mood, &state, 0.9, &quiet_config(), &mut rng());
        let b = update_mood(mood, &state, 0.9, &quiet_config(), &mut rng());
        assert_eq!(a, b);
    }

    #[test]
    fn perturbation_never_touches_control() {
        let mut config = AffectConfig::default();
        config.perturbation_enabled = true;
        config.perturbation_probability = 1.0;
        let state = AffectState::neutral();
        let mood = MoodState::new(0.0, 0.5, 0.37);
        let mut r = rng();
        for _ in 0..50 {
            let next = update_mood(mood, &state, 1.0, &config, &mut r);
            assert!((next.control - 0.37).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn timed_update_stays_in_range() {
        let mut current = AffectState::neutral();
        current.set(Primary::Joy, 1.0);
        let mut target = AffectState::zeroed();
        target.set(Primary::Sadness, 1.0);
        let baseline = AffectState::neutral();
        let (next, mood) = apply_update(
            &current,
            &target,
            &baseline,
            MoodState::new(0.9, 0.9, 0.9),
            &EmotionDynamics::default(),
            5000.0,
            &quiet_config(),
            &mut rng(),
        );
        for (_, v) in next.iter() {
            assert!((0.0..=1.0).contains(&v));
        }
        assert!(mood.pleasantness >= -1.0 && mood.pleasantness <= 1.0);
        assert!(mood.activation >= 0.0 && mood.activation <= 1.0);
        assert!(mood.control >= 0.0 && mood.control <= 1.0);
    }
}
