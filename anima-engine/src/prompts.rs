//! Appraisal prompt templates.
//!
//! The deep path sends the user's message to the provider with these
//! templates and expects strict JSON back: a ten-variable appraisal plus a
//! sparse map of emotion labels. Templates are plain strings with `{key}`
//! placeholders; [`render_template`] fills them in.

/// System prompt framing the appraisal task.
pub const APPRAISAL_SYSTEM: &str = r#"You are the appraisal faculty of {character}, a synthetic companion.
Given one user message, produce a cognitive appraisal in strict JSON.
Current background mood: {mood}. Dominant emotion right now: {dominant}.

RULES:
- Judge the message from the character's perspective, not the user's.
- Messages may be written in Spanish or English.
- Use only the listed emotion labels; omit labels that do not apply.
- Report at most five emotions, each with an intensity in [0, 1].
- Answer with JSON only. No prose, no code fences."#;

/// User prompt carrying the message and the output contract.
pub const APPRAISAL_USER: &str = r#"User message:
"{message}"

Appraise it and return JSON with exactly these two keys:

{"appraisal": {"desirability": <float -1..1>, "desirability_for_user": <float -1..1>, "praiseworthiness": <float -1..1>, "appealingness": <float -1..1>, "likelihood": <float 0..1>, "relevance_to_goals": <float 0..1>, "value_alignment": <float -1..1>, "novelty": <float 0..1>, "urgency": <float 0..1>, "social_appropriateness": <float 0..1>},
 "emotions": {"<label>": <float 0..1>}}

Valid emotion labels:
joy, distress, hope, fear, satisfaction, disappointment, relief,
fears_confirmed, happy_for, resentment, pity, gloating, pride, shame,
admiration, reproach, gratitude, anger, liking, disliking, interest,
curiosity, affection, love, anxiety, concern, boredom, excitement"#;

/// Replace every `{key}` placeholder with its value.
///
/// Unmatched placeholders are left in place, which keeps a missing variable
/// visible in the rendered prompt instead of silently vanishing.
#[must_use]
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{key}}}"), value);
    }
    result
}

/// Render both appraisal prompts for one message.
///
/// Returns `(system, user)`.
#[must_use]
pub fn render_appraisal(
    character: &str,
    mood: &str,
    dominant: &str,
    message: &str,
) -> (String, String) {
    let system = render_template(
        APPRAISAL_SYSTEM,
        &[("character", character), ("mood", mood), ("dominant", dominant)],
    );
    let user = render_template(APPRAISAL_USER, &[("message", message)]);
    (system, user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anima_core::appraisal::OccLabel;

    #[test]
    fn rendering_replaces_every_placeholder() {
        let (system, user) = render_appraisal("Luna", "Sereno", "joy", "Hola, ¿cómo estás?");
        assert!(system.contains("Luna"));
        assert!(system.contains("Sereno"));
        assert!(system.contains("joy"));
        assert!(!system.contains("{character}"));
        assert!(!system.contains("{mood}"));
        assert!(user.contains("Hola, ¿cómo estás?"));
        assert!(!user.contains("{message}"));
    }

    #[test]
    fn unknown_placeholders_survive_rendering() {
        let rendered = render_template("Hola {nombre}, {otro}.", &[("nombre", "Ana")]);
        assert_eq!(rendered, "Hola Ana, {otro}.");
    }

    #[test]
    fn prompt_lists_the_whole_label_vocabulary() {
        for label in OccLabel::ALL {
            assert!(
                APPRAISAL_USER.contains(label.as_str()),
                "label '{}' missing from the prompt",
                label.as_str()
            );
        }
    }

    #[test]
    fn prompt_names_every_appraisal_field() {
        for field in [
            "desirability",
            "desirability_for_user",
            "praiseworthiness",
            "appealingness",
            "likelihood",
            "relevance_to_goals",
            "value_alignment",
            "novelty",
            "urgency",
            "social_appropriateness",
        ] {
            assert!(APPRAISAL_USER.contains(field), "field '{field}' missing");
        }
    }
}
