//! Maps raw category selections into the canonical [`PreferenceRecord`].

use city_crew_store::models::PreferenceRecord;

use crate::SelectionState;

/// Pure and total: absent categories default to empty list or `None`,
/// unknown categories are ignored. Single-select categories conceptually
/// hold at most one value; extras are tolerated by taking only the first.
#[must_use]
pub fn normalize(selections: &SelectionState) -> PreferenceRecord {
    let full = |category: &str| selections.get(category).cloned().unwrap_or_default();
    let first = |category: &str| {
        selections
            .get(category)
            .and_then(|choices| choices.first())
            .cloned()
    };
    PreferenceRecord {
        dietary_restrictions: full("diet"),
        activity_types: full("focus"),
        budget_range: first("budget"),
        experience_intensity: first("vibe"),
        interests: full("vibe"),
        ..PreferenceRecord::default()
    }
}
