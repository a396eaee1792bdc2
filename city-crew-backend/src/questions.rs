//! The mood-question catalog and its personalization.
//!
//! Questions carry a signal key, the canonical field their answer maps onto.
//! A flow serves the base catalog first; once every base signal is answered
//! a single free-text follow-up wraps the flow up.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum QuestionKind {
    Scale { min: u8, max: u8 },
    Choice { options: Vec<String> },
    Text,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct MoodQuestion {
    pub id: String,
    pub signal_key: String,
    pub prompt: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

pub const FOLLOW_UP_SIGNAL: &str = "wildcard_wish";

struct CatalogEntry {
    id: &'static str,
    signal_key: &'static str,
    prompt: &'static str,
    options: Option<&'static [&'static str]>,
}

const BASE_CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        id: "q-energy",
        signal_key: "energy_level",
        prompt: "how much energy are you bringing tonight?",
        options: None,
    },
    CatalogEntry {
        id: "q-vibe",
        signal_key: "vibe_preference",
        prompt: "what vibe are you after?",
        options: Some(&["Cozy", "Lively", "Adventurous", "Chill"]),
    },
    CatalogEntry {
        id: "q-budget",
        signal_key: "budget_flex",
        prompt: "how loose is the budget?",
        options: Some(&["Keep it cheap", "Flexible", "Treat night"]),
    },
    CatalogEntry {
        id: "q-timing",
        signal_key: "preferred_timing",
        prompt: "when works best?",
        options: Some(&["Daytime", "Evening", "Late night"]),
    },
];

fn personalize(prompt: &str, participant_name: Option<&str>) -> String {
    match participant_name.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => format!("{name}, {prompt}"),
        None => prompt.to_owned(),
    }
}

/// Base questions not yet covered by `answered_signals`, personalized with
/// the participant's name, plus the follow-up once every base signal is
/// answered.
#[must_use]
pub fn for_participant(
    participant_name: Option<&str>,
    answered_signals: &[String],
) -> (Vec<MoodQuestion>, Option<MoodQuestion>) {
    let questions: Vec<MoodQuestion> = BASE_CATALOG
        .iter()
        .filter(|entry| !answered_signals.iter().any(|signal| signal == entry.signal_key))
        .map(|entry| MoodQuestion {
            id: entry.id.to_owned(),
            signal_key: entry.signal_key.to_owned(),
            prompt: personalize(entry.prompt, participant_name),
            kind: entry.options.map_or(
                QuestionKind::Scale { min: 1, max: 5 },
                |options| QuestionKind::Choice {
                    options: options.iter().map(|option| (*option).to_owned()).collect(),
                },
            ),
        })
        .collect();

    let follow_up = if questions.is_empty()
        && !answered_signals.iter().any(|signal| signal == FOLLOW_UP_SIGNAL)
    {
        Some(MoodQuestion {
            id: "q-wildcard".to_owned(),
            signal_key: FOLLOW_UP_SIGNAL.to_owned(),
            prompt: personalize(
                "anything the crew absolutely has to do (or avoid)?",
                participant_name,
            ),
            kind: QuestionKind::Text,
        })
    } else {
        None
    };

    (questions, follow_up)
}
