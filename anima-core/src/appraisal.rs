//! Cognitive appraisal — the OCC vocabulary and its projection onto the
//! eight primaries.
//!
//! The deep path asks a language model to appraise the user's message and
//! answer with (a) a ten-variable appraisal vector and (b) a sparse set of
//! OCC emotion labels with intensities. Labels are translated here through
//! a fixed table where each label feeds one to three primaries with a
//! signed weight. Negative weights subtract: relief releases anticipation,
//! boredom drains it.
//!
//! Translation starts from the neutral baseline and accumulates every
//! contribution before a single final clamp, so the result does not depend
//! on label order. Unknown labels are logged and skipped, never fatal.
//!
//! Reference: Ortony, A., Clore, G., Collins, A. (1988). "The Cognitive
//! Structure of Emotions."

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{AffectState, Primary};

// ---------------------------------------------------------------------------
// Appraisal vector
// ---------------------------------------------------------------------------

/// The ten appraisal variables the deep path extracts per message.
///
/// Signed fields live in [-1, 1], the rest in [0, 1]. Defaults sit at the
/// midpoint of each range so a partially filled model answer degrades to
/// "no opinion" rather than to zero everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppraisalVector {
    /// Is the event desirable for the character's own goals? [-1, 1]
    pub desirability: f32,
    /// Is it desirable for the user? [-1, 1]
    pub desirability_for_user: f32,
    /// Is the action praiseworthy? [-1, 1]
    pub praiseworthiness: f32,
    /// Does the object attract or repel? [-1, 1]
    pub appealingness: f32,
    /// How likely is the event? [0, 1]
    pub likelihood: f32,
    /// Relevance to the character's active goals. [0, 1]
    pub relevance_to_goals: f32,
    /// Alignment with core values. [-1, 1]
    pub value_alignment: f32,
    /// How novel or surprising. [0, 1]
    pub novelty: f32,
    /// How urgent. [0, 1]
    pub urgency: f32,
    /// Social appropriateness. [0, 1]
    pub social_appropriateness: f32,
}

impl Default for AppraisalVector {
    fn default() -> Self {
        Self {
            desirability: 0.0,
            desirability_for_user: 0.0,
            praiseworthiness: 0.0,
            appealingness: 0.0,
            likelihood: 0.5,
            relevance_to_goals: 0.5,
            value_alignment: 0.0,
            novelty: 0.5,
            urgency: 0.5,
            social_appropriateness: 0.5,
        }
    }
}

impl AppraisalVector {
    /// Copy with every field clamped to its declared range.
    #[must_use]
    pub fn clamped(&self) -> Self {
        Self {
            desirability: self.desirability.clamp(-1.0, 1.0),
            desirability_for_user: self.desirability_for_user.clamp(-1.0, 1.0),
            praiseworthiness: self.praiseworthiness.clamp(-1.0, 1.0),
            appealingness: self.appealingness.clamp(-1.0, 1.0),
            likelihood: self.likelihood.clamp(0.0, 1.0),
            relevance_to_goals: self.relevance_to_goals.clamp(0.0, 1.0),
            value_alignment: self.value_alignment.clamp(-1.0, 1.0),
            novelty: self.novelty.clamp(0.0, 1.0),
            urgency: self.urgency.clamp(0.0, 1.0),
            social_appropriateness: self.social_appropriateness.clamp(0.0, 1.0),
        }
    }
}

// ---------------------------------------------------------------------------
// OCC label vocabulary
// ---------------------------------------------------------------------------

/// The appraisal emotion vocabulary the deep path may emit.
///
/// The first 20 are the OCC model proper, grouped by appraisal focus
/// (event consequences, agent actions, object aspects); the rest round the
/// vocabulary out for conversational realism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccLabel {
    /// Desirable event for self.
    Joy,
    /// Undesirable event for self.
    Distress,
    /// Prospect of a desirable event.
    Hope,
    /// Prospect of an undesirable event.
    Fear,
    /// Confirmed hoped-for event.
    Satisfaction,
    /// Disconfirmed hoped-for event.
    Disappointment,
    /// Disconfirmed feared event.
    Relief,
    /// Confirmed feared event.
    FearsConfirmed,
    /// Desirable event for another.
    HappyFor,
    /// Displeasure at another's desirable event.
    Resentment,
    /// Undesirable event for a liked other.
    Pity,
    /// Undesirable event for a disliked other.
    Gloating,
    /// Praiseworthy own action.
    Pride,
    /// Blameworthy own action.
    Shame,
    /// Praiseworthy other's action.
    Admiration,
    /// Blameworthy other's action.
    Reproach,
    /// Praiseworthy other's action with desirable consequence.
    Gratitude,
    /// Blameworthy other's action with undesirable consequence.
    Anger,
    /// Appealing object.
    Liking,
    /// Unappealing object.
    Disliking,
    /// Cognitive pull toward a topic.
    Interest,
    /// Cognitive pull toward the unknown.
    Curiosity,
    /// Warm social bond.
    Affection,
    /// Strong social bond.
    Love,
    /// Anticipatory worry.
    Anxiety,
    /// Empathic worry.
    Concern,
    /// Under-stimulation.
    Boredom,
    /// Over-stimulation, positively valenced.
    Excitement,
}

impl OccLabel {
    /// Every label, for table-driven iteration.
    pub const ALL: [OccLabel; 28] = [
        OccLabel::Joy,
        OccLabel::Distress,
        OccLabel::Hope,
        OccLabel::Fear,
        OccLabel::Satisfaction,
        OccLabel::Disappointment,
        OccLabel::Relief,
        OccLabel::FearsConfirmed,
        OccLabel::HappyFor,
        OccLabel::Resentment,
        OccLabel::Pity,
        OccLabel::Gloating,
        OccLabel::Pride,
        OccLabel::Shame,
        OccLabel::Admiration,
        OccLabel::Reproach,
        OccLabel::Gratitude,
        OccLabel::Anger,
        OccLabel::Liking,
        OccLabel::Disliking,
        OccLabel::Interest,
        OccLabel::Curiosity,
        OccLabel::Affection,
        OccLabel::Love,
        OccLabel::Anxiety,
        OccLabel::Concern,
        OccLabel::Boredom,
        OccLabel::Excitement,
    ];

    /// Parse the snake_case wire form. Returns `None` for anything the
    /// table does not cover; callers decide whether that is worth a log
    /// line.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let label = match s {
            "joy" => OccLabel::Joy,
            "distress" => OccLabel::Distress,
            "hope" => OccLabel::Hope,
            "fear" => OccLabel::Fear,
            "satisfaction" => OccLabel::Satisfaction,
            "disappointment" => OccLabel::Disappointment,
            "relief" => OccLabel::Relief,
            "fears_confirmed" => OccLabel::FearsConfirmed,
            "happy_for" => OccLabel::HappyFor,
            "resentment" => OccLabel::Resentment,
            "pity" => OccLabel::Pity,
            "gloating" => OccLabel::Gloating,
            "pride" => OccLabel::Pride,
            "shame" => OccLabel::Shame,
            "admiration" => OccLabel::Admiration,
            "reproach" => OccLabel::Reproach,
            "gratitude" => OccLabel::Gratitude,
            "anger" => OccLabel::Anger,
            "liking" => OccLabel::Liking,
            "disliking" => OccLabel::Disliking,
            "interest" => OccLabel::Interest,
            "curiosity" => OccLabel::Curiosity,
            "affection" => OccLabel::Affection,
            "love" => OccLabel::Love,
            "anxiety" => OccLabel::Anxiety,
            "concern" => OccLabel::Concern,
            "boredom" => OccLabel::Boredom,
            "excitement" => OccLabel::Excitement,
            _ => return None,
        };
        Some(label)
    }

    /// Wire form of the label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OccLabel::Joy => "joy",
            OccLabel::Distress => "distress",
            OccLabel::Hope => "hope",
            OccLabel::Fear => "fear",
            OccLabel::Satisfaction => "satisfaction",
            OccLabel::Disappointment => "disappointment",
            OccLabel::Relief => "relief",
            OccLabel::FearsConfirmed => "fears_confirmed",
            OccLabel::HappyFor => "happy_for",
            OccLabel::Resentment => "resentment",
            OccLabel::Pity => "pity",
            OccLabel::Gloating => "gloating",
            OccLabel::Pride => "pride",
            OccLabel::Shame => "shame",
            OccLabel::Admiration => "admiration",
            OccLabel::Reproach => "reproach",
            OccLabel::Gratitude => "gratitude",
            OccLabel::Anger => "anger",
            OccLabel::Liking => "liking",
            OccLabel::Disliking => "disliking",
            OccLabel::Interest => "interest",
            OccLabel::Curiosity => "curiosity",
            OccLabel::Affection => "affection",
            OccLabel::Love => "love",
            OccLabel::Anxiety => "anxiety",
            OccLabel::Concern => "concern",
            OccLabel::Boredom => "boredom",
            OccLabel::Excitement => "excitement",
        }
    }

    /// Primary contributions of this label. Each entry is a primary and a
    /// signed weight multiplied by the label's intensity.
    #[must_use]
    pub fn components(self) -> &'static [(Primary, f32)] {
        use Primary::{Anger, Anticipation, Disgust, Fear, Joy, Sadness, Surprise, Trust};
        match self {
            OccLabel::Joy => &[(Joy, 1.0)],
            OccLabel::Distress => &[(Sadness, 0.8), (Fear, 0.3)],
            OccLabel::Hope => &[(Anticipation, 0.8), (Joy, 0.4)],
            OccLabel::Fear => &[(Fear, 1.0)],
            OccLabel::Satisfaction => &[(Joy, 0.7), (Trust, 0.4)],
            OccLabel::Disappointment => &[(Sadness, 0.7), (Surprise, 0.5)],
            OccLabel::Relief => &[(Joy, 0.6), (Trust, 0.3), (Anticipation, -0.4)],
            OccLabel::FearsConfirmed => &[(Fear, 0.8), (Sadness, 0.6), (Surprise, 0.3)],
            OccLabel::HappyFor => &[(Joy, 0.6), (Trust, 0.5)],
            OccLabel::Resentment => &[(Anger, 0.7), (Sadness, 0.4), (Disgust, 0.3)],
            OccLabel::Pity => &[(Sadness, 0.6), (Trust, 0.4), (Fear, 0.3)],
            OccLabel::Gloating => &[(Joy, 0.5), (Disgust, 0.6), (Anticipation, 0.3)],
            OccLabel::Pride => &[(Joy, 0.7), (Trust, 0.5), (Anticipation, 0.4)],
            OccLabel::Shame => &[(Sadness, 0.7), (Disgust, 0.6), (Fear, 0.5)],
            OccLabel::Admiration => &[(Trust, 0.8), (Joy, 0.4), (Surprise, 0.3)],
            OccLabel::Reproach => &[(Disgust, 0.7), (Anger, 0.5)],
            OccLabel::Gratitude => &[(Joy, 0.7), (Trust, 0.8)],
            OccLabel::Anger => &[(Anger, 1.0)],
            OccLabel::Liking => &[(Joy, 0.5), (Trust, 0.4)],
            OccLabel::Disliking => &[(Disgust, 0.7)],
            OccLabel::Interest => &[(Anticipation, 0.6), (Surprise, 0.3)],
            OccLabel::Curiosity => &[(Surprise, 0.6), (Trust, 0.5)],
            OccLabel::Affection => &[(Joy, 0.6), (Trust, 0.7)],
            OccLabel::Love => &[(Joy, 0.8), (Trust, 0.9)],
            OccLabel::Anxiety => &[(Fear, 0.7), (Anticipation, 0.6)],
            OccLabel::Concern => &[(Fear, 0.5), (Trust, 0.4), (Sadness, 0.3)],
            OccLabel::Boredom => &[(Disgust, 0.4), (Sadness, 0.3), (Anticipation, -0.3)],
            OccLabel::Excitement => &[(Joy, 0.8), (Anticipation, 0.7), (Surprise, 0.4)],
        }
    }

    /// Whether this label passes through one-to-one.
    #[must_use]
    pub fn is_direct(self) -> bool {
        matches!(self.components(), [(_, w)] if (*w - 1.0).abs() < f32::EPSILON)
    }
}

// ---------------------------------------------------------------------------
// Translation
// ---------------------------------------------------------------------------

/// Project a sparse label→intensity map onto the eight primaries.
///
/// Starts from the neutral baseline; each active label adds
/// `intensity × weight` to its component primaries. Contributions
/// accumulate unclamped and are clamped once at the end, keeping the
/// result independent of map iteration order. Labels with non-positive
/// intensity and labels outside the vocabulary are skipped.
#[must_use]
pub fn map_to_primaries(emotions: &HashMap<String, f32>) -> AffectState {
    let neutral = AffectState::neutral();
    let mut acc = [0.0f32; 8];
    for p in Primary::ALL {
        acc[p.index()] = neutral.get(p);
    }

    for (name, &intensity) in emotions {
        if intensity <= 0.0 {
            continue;
        }
        let Some(label) = OccLabel::parse(name) else {
            tracing::warn!(label = %name, "no mapping rule for appraisal emotion, skipping");
            continue;
        };
        for &(primary, weight) in label.components() {
            acc[primary.index()] += intensity * weight;
        }
    }

    let mut state = AffectState::zeroed();
    for p in Primary::ALL {
        state.set(p, acc[p.index()]);
    }
    state.touch();
    state
}

/// Coverage summary of the translation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MappingStats {
    /// Total labels in the vocabulary.
    pub total: usize,
    /// Labels that pass through one-to-one.
    pub direct: usize,
    /// Labels that fan out into several primaries.
    pub composite: usize,
}

/// Count direct and composite rules in the table.
#[must_use]
pub fn mapping_stats() -> MappingStats {
    let direct = OccLabel::ALL.iter().filter(|l| l.is_direct()).count();
    MappingStats {
        total: OccLabel::ALL.len(),
        direct,
        composite: OccLabel::ALL.len() - direct,
    }
}
