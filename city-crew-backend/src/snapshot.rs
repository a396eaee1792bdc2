//! Defensive codec for the persisted selection snapshot.
//!
//! The snapshot is untyped at rest. [`decode`] is the validated-on-read
//! boundary: it never fails, and a malformed shape degrades to absent data
//! instead of an error. Keys are validated individually, so one bad value
//! does not throw away the rest of the map.

use serde_json::Value;

use crate::SelectionState;

/// A key survives only if its value is an array whose every element is a
/// non-empty string. Non-object input yields an empty map.
#[must_use]
pub fn decode(raw: &Value) -> SelectionState {
    let Value::Object(map) = raw else {
        return SelectionState::new();
    };
    map.iter()
        .filter_map(|(key, value)| {
            let Value::Array(items) = value else {
                return None;
            };
            let choices = items
                .iter()
                .map(|item| match item {
                    Value::String(text) if !text.is_empty() => Some(text.clone()),
                    _ => None,
                })
                .collect::<Option<Vec<String>>>()?;
            Some((key.clone(), choices))
        })
        .collect()
}

/// Structural inverse of [`decode`], used when persisting a selection state.
#[must_use]
pub fn encode(selections: &SelectionState) -> Value {
    Value::Object(
        selections
            .iter()
            .map(|(key, choices)| {
                (
                    key.clone(),
                    Value::Array(choices.iter().cloned().map(Value::String).collect()),
                )
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn round_trips_valid_maps() {
        let mut selections = SelectionState::new();
        selections.insert("diet".to_owned(), vec!["Vegan".to_owned()]);
        selections.insert(
            "vibe".to_owned(),
            vec!["Cozy".to_owned(), "Lively".to_owned()],
        );
        assert_eq!(decode(&encode(&selections)), selections);
    }

    #[test]
    fn non_object_input_decodes_to_empty() {
        for raw in [
            json!(null),
            json!(42),
            json!("diet"),
            json!(["Vegan"]),
            json!(true),
        ] {
            assert!(decode(&raw).is_empty());
        }
    }

    #[test]
    fn invalid_keys_are_dropped_individually() {
        let raw = json!({
            "diet": ["Vegan", "Gluten-free"],
            "focus": "not-a-list",
            "budget": ["$$", 2],
            "vibe": ["Cozy", ""],
            "empty": [],
        });
        let decoded = decode(&raw);
        assert_eq!(
            decoded.get("diet").map(Vec::as_slice),
            Some(["Vegan".to_owned(), "Gluten-free".to_owned()].as_slice())
        );
        assert!(!decoded.contains_key("focus"));
        assert!(!decoded.contains_key("budget"));
        assert!(!decoded.contains_key("vibe"));
        // an empty list of choices is still a list of non-empty strings
        assert_eq!(decoded.get("empty").map(Vec::len), Some(0));
    }
}
