//! Rule-based message analysis — the fast path's replacement for a model
//! call.
//!
//! Scans the message for Spanish emotion keywords and emoji, plus a few
//! structural signals (questions, exclamations, sheer length), and turns
//! the hits into signed per-primary deltas. Each hit also pushes the
//! opposite primary down at half strength, so "estoy feliz" both raises
//! joy and eases sadness. Every message, even an empty one, carries a
//! small engagement baseline on joy and trust: being talked to at all is
//! mildly pleasant.
//!
//! Output is bounded; a keyword-stuffed message cannot swing any primary
//! by more than [`MAX_DELTA`] in one step.

use serde::Serialize;

use crate::dyad;
use crate::types::{AffectDeltas, AffectState, MoodState, Primary};

/// Per-keyword contribution to its primary.
const KEYWORD_DELTA: f32 = 0.15;

/// Fraction of each contribution applied, negated, to the opposite.
const OPPOSITE_FACTOR: f32 = 0.5;

/// Contribution per matched emoji.
const EMOJI_DELTA: f32 = 0.15;

/// Always applied to joy and trust.
const ENGAGEMENT_BASELINE: f32 = 0.02;

/// Messages longer than this (chars) signal investment in the
/// conversation.
const LONG_MESSAGE_CHARS: usize = 200;

/// Hard bound on any single delta.
pub const MAX_DELTA: f32 = 0.5;

/// Spanish keyword stems per primary. Substring match over lowercased
/// text; stems cover gendered and conjugated forms.
const EMOTION_KEYWORDS: &[(Primary, &[&str])] = &[
    (
        Primary::Joy,
        &[
            "feliz", "alegr", "content", "genial", "encant", "maravill", "divert", "gracias",
        ],
    ),
    (
        Primary::Trust,
        &[
            "confí", "confio", "confianza", "honest", "sincer", "apoyo", "leal",
        ],
    ),
    (
        Primary::Fear,
        &[
            "miedo", "nervios", "asustad", "aterr", "pánico", "panico", "temor", "preocupad",
        ],
    ),
    (
        Primary::Surprise,
        &[
            "sorpre", "inesperad", "wow", "increíble", "increible", "de repente",
        ],
    ),
    (
        Primary::Sadness,
        &[
            "triste", "deprimid", "llor", "pena", "melancol", "desanimad",
        ],
    ),
    (
        Primary::Disgust,
        &["asco", "asquer", "repugn", "desagrad"],
    ),
    (
        Primary::Anger,
        &[
            "enojad", "enfadad", "furios", "molest", "rabia", "odio", "hart", "frustrad",
        ],
    ),
    (
        Primary::Anticipation,
        &["ansias", "futuro", "pronto", "ya quiero", "mañana"],
    ),
];

/// Emoji per primary, matched per occurrence.
const EMOTION_EMOJI: &[(Primary, &[char])] = &[
    (Primary::Joy, &['😀', '😁', '😃', '😄', '😊', '🙂', '😍', '🥰', '❤', '💕']),
    (Primary::Trust, &['🙏', '🤝']),
    (Primary::Fear, &['😱', '😨', '😰']),
    (Primary::Surprise, &['😮', '😲', '🤯']),
    (Primary::Sadness, &['😢', '😭', '💔', '😞', '😔']),
    (Primary::Disgust, &['🤢', '🤮']),
    (Primary::Anger, &['😡', '🤬', '😠']),
];

/// Derive signed deltas from one user message.
#[must_use]
pub fn analyze_message(text: &str) -> AffectDeltas {
    let lowered = text.to_lowercase();
    let mut deltas = AffectDeltas::default();

    for &(primary, keywords) in EMOTION_KEYWORDS {
        let hits = keywords.iter().filter(|k| lowered.contains(*k)).count();
        if hits > 0 {
            let amount = hits as f32 * KEYWORD_DELTA;
            deltas.nudge(primary, amount);
            deltas.nudge(primary.opposite(), -amount * OPPOSITE_FACTOR);
        }
    }

    for &(primary, emoji) in EMOTION_EMOJI {
        let hits = text.chars().filter(|c| emoji.contains(c)).count();
        if hits > 0 {
            let amount = hits as f32 * EMOJI_DELTA;
            deltas.nudge(primary, amount);
            deltas.nudge(primary.opposite(), -amount * OPPOSITE_FACTOR);
        }
    }

    // Being asked something invites mild alertness and openness.
    if lowered.contains('?') || lowered.contains('¿') {
        deltas.nudge(Primary::Surprise, 0.1);
        deltas.nudge(Primary::Trust, 0.05);
    }

    if lowered.contains('!') || lowered.contains('¡') {
        deltas.nudge(Primary::Joy, 0.1);
    }

    // A long message means the user is invested; meet it with attention.
    if text.chars().count() > LONG_MESSAGE_CHARS {
        deltas.nudge(Primary::Anticipation, 0.1);
        deltas.nudge(Primary::Trust, 0.05);
    }

    deltas.nudge(Primary::Joy, ENGAGEMENT_BASELINE);
    deltas.nudge(Primary::Trust, ENGAGEMENT_BASELINE);

    deltas.bounded(MAX_DELTA)
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Prompt-ready Spanish summary of an affect state.
#[derive(Debug, Clone, Serialize)]
pub struct EmotionalSummary {
    /// Top three primaries as intensity-graded Spanish names.
    pub dominant: Vec<String>,
    /// Active dyads as Spanish names, strongest first.
    pub secondary: Vec<String>,
    /// One-word Spanish mood.
    pub mood: String,
    /// The three-axis mood target implied by the state.
    pub pad: MoodState,
}

/// Summarize a state for prompt injection or logging.
#[must_use]
pub fn emotional_summary(state: &AffectState) -> EmotionalSummary {
    let dominant = state
        .ranked()
        .into_iter()
        .take(3)
        .map(|(p, v)| p.intensity_label_es(v).to_string())
        .collect();
    let secondary = dyad::top_dyads(state, 3)
        .into_iter()
        .map(|d| d.label_es.to_string())
        .collect();
    let pad = MoodState::target_from(state);
    EmotionalSummary {
        dominant,
        secondary,
        mood: mood_label_es(pad).to_string(),
        pad,
    }
}

/// One-word Spanish mood from the pleasantness/activation quadrant.
#[must_use]
pub fn mood_label_es(mood: MoodState) -> &'static str {
    let v = mood.pleasantness;
    let a = mood.activation;
    if v >= 0.3 {
        if a >= 0.6 {
            "Eufórico"
        } else if a < 0.35 {
            "Sereno"
        } else {
            "Positivo"
        }
    } else if v <= -0.3 {
        if a >= 0.6 {
            "Alterado"
        } else if a < 0.35 {
            "Melancólico"
        } else {
            "Negativo"
        }
    } else if a >= 0.7 {
        "Agitado"
    } else {
        "Neutral"
    }
}
