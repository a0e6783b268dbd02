//! Long-term memory storage scoring.
//!
//! Decides, per interaction, whether the moment is worth archiving in the
//! character's long-term memory. Four factors are computed independently,
//! each capped, then summed against a threshold:
//!
//! * emotional — how aroused the character is right now,
//! * informative — personal facts disclosed by the user (name, age,
//!   location, occupation, preference, relationship, health, goal),
//! * event — significant life events (birthday, medical, exam, job or
//!   relationship change, achievement, loss, anniversary),
//! * temporal — the user keeps circling back to the same topic.
//!
//! Detected entities are exposed on the decision for the caller to
//! persist; this module never writes anything itself. All caps and the
//! threshold come from [`StorageConfig`].

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::config::StorageConfig;
use crate::types::AffectState;

/// Arousal below this contributes nothing to the emotional factor.
const AROUSAL_GATE: f32 = 0.6;

/// Desirability above this lets an achievement pattern count.
const ACHIEVEMENT_GATE: f32 = 0.5;

/// Desirability below this lets a loss pattern count.
const LOSS_GATE: f32 = -0.5;

/// Shortest word (in chars) the repetition factor considers a keyword.
const MIN_KEYWORD_CHARS: usize = 4;

/// Overlapping keywords required between the message and one history
/// entry.
const MIN_KEYWORD_OVERLAP: usize = 2;

/// History entries that must overlap before repetition scores.
const MIN_REPEATED_ENTRIES: usize = 2;

/// Common Spanish words excluded from keyword overlap.
const STOPWORDS: &[&str] = &[
    "para", "pero", "como", "esta", "está", "este", "esto", "porque", "cuando", "donde", "tengo",
    "estoy", "siento", "mucho", "todo", "nada", "bien", "también", "tambien", "ahora", "hace",
    "desde", "sobre", "entre", "hasta", "puedo", "tiene", "siempre", "nunca", "creo", "cómo",
];

// ---------------------------------------------------------------------------
// Detected entities
// ---------------------------------------------------------------------------

/// Category of a disclosed personal fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonalFactKind {
    /// The user stated their name.
    Name,
    /// The user stated their age.
    Age,
    /// Where the user lives or comes from.
    Location,
    /// What the user does for a living.
    Occupation,
    /// A stated like or dislike.
    Preference,
    /// A close person in the user's life.
    Relationship,
    /// A health condition or diagnosis.
    Health,
    /// A stated goal or dream.
    Goal,
}

/// Category of a significant life event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A birthday, theirs or someone else's.
    Birthday,
    /// Hospital visits, surgery, diagnoses.
    Medical,
    /// Exams, final tests, thesis defenses.
    Exam,
    /// Hired, fired, promoted, resigned.
    JobChange,
    /// Engagement, marriage, breakup, divorce.
    RelationshipChange,
    /// Something achieved; only counts when the moment reads as positive.
    Achievement,
    /// A death or loss; only counts when the moment reads as negative.
    Loss,
    /// An anniversary of any kind.
    Anniversary,
}

/// One personal fact found in the message.
#[derive(Debug, Clone, Serialize)]
pub struct PersonalFact {
    /// What kind of fact this is.
    pub kind: PersonalFactKind,
    /// The captured value, when the pattern extracts one ("Ana", "25").
    pub value: Option<String>,
    /// Pattern confidence in (0, 1].
    pub confidence: f32,
}

/// One significant event found in the message.
#[derive(Debug, Clone, Serialize)]
pub struct SignificantEvent {
    /// What kind of event this is.
    pub kind: EventKind,
    /// Pattern confidence in (0, 1].
    pub confidence: f32,
}

/// Everything the scorer extracted from the message.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DetectedEntities {
    /// Disclosed personal facts.
    pub personal_facts: Vec<PersonalFact>,
    /// Significant events, already gated by desirability where required.
    pub events: Vec<SignificantEvent>,
    /// Close persons mentioned ("mamá", "novia").
    pub persons: Vec<String>,
}

/// The storage verdict for one interaction.
#[derive(Debug, Clone, Serialize)]
pub struct StorageDecision {
    /// Points from the arousal factor.
    pub emotional: f32,
    /// Points from disclosed personal facts.
    pub informative: f32,
    /// Points from significant events.
    pub event: f32,
    /// Points from topic repetition.
    pub temporal: f32,
    /// Sum of the four factors.
    pub total: f32,
    /// Whether the interaction should be archived.
    pub should_store: bool,
    /// Normalized importance in [0, 1] for ranking stored memories.
    pub importance: f32,
    /// What was found, for the caller to persist alongside the memory.
    pub entities: DetectedEntities,
}

// ---------------------------------------------------------------------------
// Pattern tables
// ---------------------------------------------------------------------------

static PERSONAL_FACTS: LazyLock<Vec<(PersonalFactKind, Regex, f32)>> = LazyLock::new(|| {
    [
        (
            PersonalFactKind::Name,
            r"(?i)(?:me llamo|mi nombre es|pueden llamarme|puedes llamarme)\s+(\p{L}+)",
            0.9,
        ),
        (
            PersonalFactKind::Age,
            r"(?i)\btengo\s+(\d{1,3})\s+años\b",
            0.85,
        ),
        (
            PersonalFactKind::Location,
            r"(?i)(?:vivo en|soy de|me mud[eé] a)\s+(\p{L}+(?:\s+\p{L}+)?)",
            0.8,
        ),
        (
            PersonalFactKind::Occupation,
            r"(?i)(?:trabajo\s+(?:de|como|en)|me dedico a)\s+(\p{L}+)",
            0.85,
        ),
        (
            PersonalFactKind::Preference,
            r"(?i)\bme encanta\b|\bmi favorit[oa]\b|\bprefiero\b|\bno me gusta\b",
            0.7,
        ),
        (
            PersonalFactKind::Relationship,
            r"(?i)\bmi\s+(novi[oa]|espos[oa]|mam[aá]|pap[aá]|herman[oa]|hij[oa]|abuel[oa]|mejor amig[oa])\b",
            0.85,
        ),
        (
            PersonalFactKind::Health,
            r"(?i)me diagnosticaron|tengo (?:diabetes|asma|ansiedad|depresi[oó]n|migraña|migrana)|mi enfermedad",
            0.9,
        ),
        (
            PersonalFactKind::Goal,
            r"(?i)mi (?:meta|sueño|sueno|objetivo) es|quiero lograr",
            0.75,
        ),
    ]
    .into_iter()
    .map(|(kind, pattern, confidence)| {
        (kind, Regex::new(pattern).expect("static pattern"), confidence)
    })
    .collect()
});

static EVENTS: LazyLock<Vec<(EventKind, Regex, f32)>> = LazyLock::new(|| {
    [
        (EventKind::Birthday, r"(?i)cumpleaños|cumplo años", 0.9),
        (
            EventKind::Medical,
            r"(?i)hospital|cirug[ií]a|operaci[oó]n|me diagnosticaron",
            0.85,
        ),
        (EventKind::Exam, r"(?i)\bexamen\b|prueba final|\btesis\b", 0.8),
        (
            EventKind::JobChange,
            r"(?i)nuevo trabajo|me despidieron|renunci[eé]|me contrataron|ascenso|ascendieron",
            0.9,
        ),
        (
            EventKind::RelationshipChange,
            r"(?i)nos casamos|me compromet[ií]|terminamos|nos separamos|rompimos|me divorci[eé]",
            0.9,
        ),
        (
            EventKind::Achievement,
            r"(?i)logr[eé]|gan[eé]|aprob[eé]|me gradu[eé]",
            0.75,
        ),
        (
            EventKind::Loss,
            r"(?i)falleci[oó]|muri[oó]|perd[ií] a|\bluto\b",
            0.85,
        ),
        (EventKind::Anniversary, r"(?i)aniversario", 0.8),
    ]
    .into_iter()
    .map(|(kind, pattern, confidence)| {
        (kind, Regex::new(pattern).expect("static pattern"), confidence)
    })
    .collect()
});

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// Score one interaction and decide whether to archive it.
///
/// `desirability` is the signed valence of the moment in [-1, 1]; deep-path
/// callers take it from the appraisal vector, fast-path callers from the
/// mood target.
#[must_use]
pub fn decide(
    message: &str,
    state: &AffectState,
    desirability: f32,
    history: &[String],
    config: &StorageConfig,
) -> StorageDecision {
    let (facts, persons) = scan_personal_facts(message);
    let events = scan_events(message, desirability);

    let emotional = emotional_score(state, desirability, config.emotional_cap);
    let informative = informative_score(&facts, &persons, config);
    let event = event_score(&events, config.event_cap);
    let temporal = temporal_score(message, history, config);

    let total = emotional + informative + event + temporal;
    let should_store = total >= config.store_threshold;
    let importance = (total / 100.0).min(1.0);
    if should_store {
        tracing::debug!(total, importance, "interaction crosses the storage threshold");
    }

    StorageDecision {
        emotional,
        informative,
        event,
        temporal,
        total,
        should_store,
        importance,
        entities: DetectedEntities {
            personal_facts: facts,
            events,
            persons,
        },
    }
}

/// Arousal-driven points: peak primary intensity averaged with the
/// magnitude of the moment's valence, scored above [`AROUSAL_GATE`] only.
fn emotional_score(state: &AffectState, desirability: f32, cap: f32) -> f32 {
    let (_, peak) = state.dominant();
    let arousal = (peak + desirability.abs()) / 2.0;
    if arousal > AROUSAL_GATE {
        cap * ((arousal - AROUSAL_GATE) / (1.0 - AROUSAL_GATE))
    } else {
        0.0
    }
}

fn informative_score(facts: &[PersonalFact], persons: &[String], config: &StorageConfig) -> f32 {
    if facts.is_empty() {
        return 0.0;
    }
    let best = facts.iter().map(|f| f.confidence).fold(0.0f32, f32::max);
    let mut score = config.informative_cap * best;
    if !persons.is_empty() {
        let relation_confidence = facts
            .iter()
            .filter(|f| f.kind == PersonalFactKind::Relationship)
            .map(|f| f.confidence)
            .fold(0.0f32, f32::max);
        score += config.important_person_bonus * relation_confidence;
    }
    score.min(config.informative_cap)
}

fn event_score(events: &[SignificantEvent], cap: f32) -> f32 {
    let best = events.iter().map(|e| e.confidence).fold(0.0f32, f32::max);
    cap * best
}

/// Flat points when the message shares keywords with enough recent
/// history entries; zero otherwise.
fn temporal_score(message: &str, history: &[String], config: &StorageConfig) -> f32 {
    let keywords = keyword_set(message);
    if keywords.len() < MIN_KEYWORD_OVERLAP {
        return 0.0;
    }
    let repeated = history
        .iter()
        .rev()
        .take(config.history_window)
        .filter(|entry| {
            keyword_set(entry)
                .intersection(&keywords)
                .count()
                >= MIN_KEYWORD_OVERLAP
        })
        .count();
    if repeated >= MIN_REPEATED_ENTRIES {
        config.temporal_points
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

fn scan_personal_facts(message: &str) -> (Vec<PersonalFact>, Vec<String>) {
    let mut facts = Vec::new();
    let mut persons = Vec::new();
    for (kind, pattern, confidence) in PERSONAL_FACTS.iter() {
        let Some(captures) = pattern.captures(message) else {
            continue;
        };
        let value = captures.get(1).map(|m| m.as_str().to_string());
        if *kind == PersonalFactKind::Age {
            // A captured age outside human range is noise, not a fact.
            let plausible = value
                .as_deref()
                .and_then(|v| v.parse::<u32>().ok())
                .is_some_and(|age| (10..=120).contains(&age));
            if !plausible {
                continue;
            }
        }
        if *kind == PersonalFactKind::Relationship {
            if let Some(person) = &value {
                persons.push(person.to_lowercase());
            }
        }
        facts.push(PersonalFact {
            kind: *kind,
            value,
            confidence: *confidence,
        });
    }
    (facts, persons)
}

fn scan_events(message: &str, desirability: f32) -> Vec<SignificantEvent> {
    EVENTS
        .iter()
        .filter(|(kind, pattern, _)| {
            if !pattern.is_match(message) {
                return false;
            }
            match kind {
                EventKind::Achievement => desirability > ACHIEVEMENT_GATE,
                EventKind::Loss => desirability < LOSS_GATE,
                _ => true,
            }
        })
        .map(|(kind, _, confidence)| SignificantEvent {
            kind: *kind,
            confidence: *confidence,
        })
        .collect()
}

fn keyword_set(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= MIN_KEYWORD_CHARS && !STOPWORDS.contains(w))
        .map(str::to_string)
        .collect()
}
