//! Complexity routing — decide per message whether the cheap rule-based
//! path suffices or the model-backed deep path is warranted.
//!
//! Pure and deterministic: the score is an additive mix of message length,
//! Spanish emotional keywords, reflection/decision phrasing, question
//! marks, sentence count, and third-party mentions, clamped to [0, 1].
//! Plain greetings, one-word reactions, farewells, and emoji-only
//! messages short-circuit to the fast path with score 0 before any
//! scoring runs.
//!
//! Keyword matching is substring-based over the lowercased text, with
//! stems ("deprimi", "angusti") standing in for inflected forms.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Score at or above which a message takes the deep path.
pub const DEEP_THRESHOLD: f32 = 0.5;

const KEYWORD_HIT: f32 = 0.3;
const KEYWORD_CAP: f32 = 0.8;
const PATTERN_HIT: f32 = 0.35;
const PATTERN_CAP: f32 = 0.7;
const QUESTION_BONUS: f32 = 0.2;
const MULTI_SENTENCE_BONUS: f32 = 0.3;
const THIRD_PARTY_BONUS: f32 = 0.2;

// ---------------------------------------------------------------------------
// Vocabularies
// ---------------------------------------------------------------------------

/// Messages matching these exactly (after trimming punctuation) are plain
/// social noise.
const GREETINGS: &[&str] = &[
    "hola",
    "hey",
    "buenas",
    "buenos días",
    "buenos dias",
    "buenas tardes",
    "buenas noches",
    "qué tal",
    "que tal",
];

const REACTIONS: &[&str] = &[
    "jaja", "jeje", "lol", "xd", "ok", "okay", "vale", "sí", "si", "no", "dale", "claro",
    "genial", "bien",
];

const FAREWELLS: &[&str] = &[
    "adiós",
    "adios",
    "chau",
    "chao",
    "bye",
    "nos vemos",
    "hasta luego",
    "hasta mañana",
    "cuídate",
    "cuidate",
];

/// Emotional keyword stems. Substring match, so "deprimi" covers
/// deprimido, deprimida, deprimirme.
const EMOTIONAL_KEYWORDS: &[&str] = &[
    "triste",
    "deprimi",
    "depresi",
    "ansie",
    "ansios",
    "angusti",
    "desesper",
    "miedo",
    "terror",
    "pánico",
    "panico",
    "enoj",
    "furi",
    "rabia",
    "frustra",
    "confund",
    "confus",
    "abrumad",
    "soledad",
    "culpa",
    "vergüenza",
    "verguenza",
    "feliz",
    "emocionad",
    "ilusion",
    "preocup",
    "estrés",
    "estres",
    "llor",
    "sufr",
    "dolor",
    "duele",
    "horrible",
    "terrible",
    "pelea",
    "discusi",
    "crisis",
    "problema",
    "molest",
    "odio",
    "te quiero",
    "te amo",
    "extraño",
    "mi vida",
    "morir",
    "muerte",
    "difícil",
    "dificil",
    "perdid",
    "ayuda",
];

/// Reflection, decision-making, and memory-reference phrasing.
const COMPLEXITY_PATTERNS: &[&str] = &[
    "debería",
    "deberia",
    "no sé",
    "no se",
    "qué hacer",
    "que hacer",
    "por un lado",
    "por otro lado",
    "sin embargo",
    "es correcto",
    "está bien si",
    "esta bien si",
    "está mal",
    "esta mal",
    "recuerdo",
    "me dijiste",
    "me dijo",
    "te dije",
    "hace tiempo",
    "me siento",
    "no puedo",
    "qué harías",
    "que harias",
    "qué piensas",
    "que piensas",
    "necesito",
];

/// People in the user's life; their presence implies a social situation
/// worth appraising properly.
const THIRD_PARTY_MENTIONS: &[&str] = &[
    "mi amigo",
    "mi amiga",
    "mi pareja",
    "mi novio",
    "mi novia",
    "mi mamá",
    "mi mama",
    "mi papá",
    "mi papa",
    "mi madre",
    "mi padre",
    "mi hermano",
    "mi hermana",
    "mi jefe",
    "mi jefa",
    "mi familia",
    "mi esposo",
    "mi esposa",
    "mi hijo",
    "mi hija",
    "mi compañer",
    "mis padres",
    "mis amigos",
];

static LAUGH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:ja|je|ji|ha|he){2,}$").expect("valid laugh regex"));

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Routing verdict for one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    /// Rule-based handling suffices.
    Simple,
    /// Worth a model-backed appraisal.
    Complex,
}

/// Which pipeline the message should take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingPath {
    /// Keyword deltas, no network.
    Fast,
    /// Full appraisal through the model.
    Deep,
}

/// Full classification result, with human-readable reasons for tracing.
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    /// Simple or complex.
    pub complexity: Complexity,
    /// Accumulated score in [0, 1].
    pub score: f32,
    /// Recommended pipeline.
    pub path: ProcessingPath,
    /// Spanish-language scoring reasons.
    pub reasons: Vec<String>,
}

fn simple(score: f32, reason: &str) -> Classification {
    Classification {
        complexity: Complexity::Simple,
        score,
        path: ProcessingPath::Fast,
        reasons: vec![reason.to_string()],
    }
}

/// Strip surrounding punctuation so "Hola!!" and "¿Qué tal?" match their
/// plain forms.
fn trim_punctuation(s: &str) -> &str {
    s.trim_matches(|c: char| !c.is_alphanumeric())
}

/// Classify a message against the default deep threshold.
#[must_use]
pub fn classify(text: &str) -> Classification {
    classify_with_threshold(text, DEEP_THRESHOLD)
}

/// Classify a message, selecting the deep path at `deep_threshold`.
#[must_use]
pub fn classify_with_threshold(text: &str, deep_threshold: f32) -> Classification {
    let lowered = text.trim().to_lowercase();

    if lowered.is_empty() {
        return simple(0.0, "Mensaje vacío");
    }

    let bare = trim_punctuation(&lowered);
    if bare.is_empty() {
        return simple(0.0, "Solo emojis o puntuación");
    }
    if GREETINGS.contains(&bare) || REACTIONS.contains(&bare) || FAREWELLS.contains(&bare) {
        return simple(0.0, "Saludo o reacción simple");
    }
    if LAUGH_RE.is_match(bare) {
        return simple(0.0, "Risa u onomatopeya");
    }

    let mut score = 0.0f32;
    let mut reasons = Vec::new();

    let words = lowered.split_whitespace().count();
    let length = length_score(words);
    if length > 0.0 {
        score += length;
        reasons.push(format!("Mensaje largo ({words} palabras)"));
    }

    let keyword_hits = EMOTIONAL_KEYWORDS
        .iter()
        .filter(|k| lowered.contains(*k))
        .count();
    if keyword_hits > 0 {
        score += (keyword_hits as f32 * KEYWORD_HIT).min(KEYWORD_CAP);
        reasons.push(format!(
            "Contiene {keyword_hits} palabras clave emocionales"
        ));
    }

    let pattern_hits = COMPLEXITY_PATTERNS
        .iter()
        .filter(|p| lowered.contains(*p))
        .count();
    if pattern_hits > 0 {
        score += (pattern_hits as f32 * PATTERN_HIT).min(PATTERN_CAP);
        reasons.push(format!("Patrones de reflexión o decisión ({pattern_hits})"));
    }

    if lowered.contains('?') || lowered.contains('¿') {
        score += QUESTION_BONUS;
        reasons.push("Contiene pregunta".to_string());
    }

    let sentences = lowered
        .split(['.', '!', '?'])
        .filter(|s| s.chars().any(char::is_alphanumeric))
        .count();
    if sentences >= 3 {
        score += MULTI_SENTENCE_BONUS;
        reasons.push(format!("Varias oraciones ({sentences})"));
    }

    if THIRD_PARTY_MENTIONS.iter().any(|t| lowered.contains(t)) {
        score += THIRD_PARTY_BONUS;
        reasons.push("Menciona a terceros".to_string());
    }

    let score = score.clamp(0.0, 1.0);
    let (complexity, path) = if score >= deep_threshold {
        (Complexity::Complex, ProcessingPath::Deep)
    } else {
        (Complexity::Simple, ProcessingPath::Fast)
    };

    Classification {
        complexity,
        score,
        path,
        reasons,
    }
}

/// Just the path, for callers that do not need reasons.
#[must_use]
pub fn recommended_path(text: &str) -> ProcessingPath {
    classify(text).path
}

fn length_score(words: usize) -> f32 {
    match words {
        0..=7 => 0.0,
        8..=14 => 0.15,
        15..=24 => 0.3,
        25..=39 => 0.45,
        _ => 0.6,
    }
}

// ---------------------------------------------------------------------------
// Aggregate stats
// ---------------------------------------------------------------------------

/// Routing distribution over a batch of messages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoutingStats {
    /// Messages classified.
    pub total: usize,
    /// Fast-path count.
    pub simple: usize,
    /// Deep-path count.
    pub complex: usize,
    /// Fast-path share, 0–100.
    pub simple_percentage: f32,
    /// Deep-path share, 0–100.
    pub complex_percentage: f32,
    /// Mean score across the batch.
    pub average_score: f32,
}

/// Classify a batch and summarize the split. Useful for tuning the
/// threshold against real conversation logs.
#[must_use]
pub fn routing_stats(messages: &[&str]) -> RoutingStats {
    if messages.is_empty() {
        return RoutingStats {
            total: 0,
            simple: 0,
            complex: 0,
            simple_percentage: 0.0,
            complex_percentage: 0.0,
            average_score: 0.0,
        };
    }

    let mut simple = 0usize;
    let mut score_sum = 0.0f32;
    for message in messages {
        let c = classify(message);
        if c.complexity == Complexity::Simple {
            simple += 1;
        }
        score_sum += c.score;
    }

    let total = messages.len();
    let complex = total - simple;
    RoutingStats {
        total,
        simple,
        complex,
        simple_percentage: simple as f32 / total as f32 * 100.0,
        complex_percentage: complex as f32 / total as f32 * 100.0,
        average_score: score_sum / total as f32,
    }
}
