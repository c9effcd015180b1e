use chat_core::{Critique, CritiqueSection, CritiqueSnapshot, RegeneratedCritique};
use serde_json::{Map, Value};

const CRITIQUE_KEY: &str = "critique";
const REGENERATED_CONTENT_KEY: &str = "regenerated_content";
const REGENERATED_CRITIQUE_KEY: &str = "regenerated_critique";

/// Keys of a critique object that are not scored sections.
const NON_SECTION_KEYS: [&str; 5] = ["total_score", "score", "summary", "error", "raw_response"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CritiqueParseError {
    #[error("critique data is not JSON")]
    NotJson,
    #[error("critique is not a JSON object")]
    NotAnObject,
    #[error("critic reported an error: {0}")]
    Rejected(String),
}

/// Decodes the critique container stored in a message's `search_output`.
///
/// The container may arrive as an object or as JSON text. Text that is not
/// JSON as a whole is scanned for embedded objects. Returns `Ok(None)` when
/// no critique data is present yet.
pub fn decode_critique(raw: &Value) -> Result<Option<CritiqueSnapshot>, CritiqueParseError> {
    let container = match raw {
        Value::Null => return Ok(None),
        Value::Object(map) => map.clone(),
        Value::String(text) if text.trim().is_empty() => return Ok(None),
        Value::String(text) => parse_container_text(text)?,
        _ => return Err(CritiqueParseError::NotAnObject),
    };

    // A bare critique without the container around it.
    if !container.contains_key(CRITIQUE_KEY) && container.contains_key("total_score") {
        let critique = decode_critique_object(&container)?;
        return Ok(Some(CritiqueSnapshot {
            critique: Some(critique),
            ..CritiqueSnapshot::default()
        }));
    }

    let critique = match container.get(CRITIQUE_KEY) {
        None | Some(Value::Null) => None,
        Some(value) => Some(decode_critique_object(&as_object(value)?)?),
    };
    let regenerated_content = container
        .get(REGENERATED_CONTENT_KEY)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|content| !content.is_empty())
        .map(str::to_string);
    let regenerated_critique = match container.get(REGENERATED_CRITIQUE_KEY) {
        None | Some(Value::Null) => None,
        Some(value) => {
            let map = as_object(value)?;
            Some(RegeneratedCritique {
                total_score: map.get("total_score").and_then(number_of),
            })
        }
    };

    if critique.is_none() && regenerated_content.is_none() && regenerated_critique.is_none() {
        return Ok(None);
    }
    Ok(Some(CritiqueSnapshot {
        critique,
        regenerated_content,
        regenerated_critique,
    }))
}

fn parse_container_text(text: &str) -> Result<Map<String, Value>, CritiqueParseError> {
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return match value {
            Value::Object(map) => Ok(map),
            _ => Err(CritiqueParseError::NotAnObject),
        };
    }
    let candidates: Vec<Map<String, Value>> = embedded_objects(text)
        .into_iter()
        .filter_map(|slice| match serde_json::from_str::<Value>(slice) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        })
        .collect();
    let preferred = candidates
        .iter()
        .position(|map| map.contains_key(CRITIQUE_KEY) || map.contains_key("total_score"));
    match preferred {
        Some(index) => Ok(candidates[index].clone()),
        None => candidates
            .into_iter()
            .max_by_key(Map::len)
            .ok_or(CritiqueParseError::NotJson),
    }
}

/// Top-level balanced `{...}` slices of `text`, ignoring braces in strings.
fn embedded_objects(text: &str) -> Vec<&str> {
    let mut objects = Vec::new();
    let mut depth = 0usize;
    let mut start = None;
    let mut in_string = false;
    let mut escaped = false;

    for (index, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' if depth > 0 => in_string = true,
            '{' => {
                if depth == 0 {
                    start = Some(index);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    if let Some(begin) = start.take() {
                        objects.push(&text[begin..=index]);
                    }
                }
            }
            _ => {}
        }
    }
    objects
}

fn as_object(value: &Value) -> Result<Map<String, Value>, CritiqueParseError> {
    match value {
        Value::Object(map) => Ok(map.clone()),
        // Nested critiques are sometimes stored as JSON text.
        Value::String(text) => parse_container_text(text),
        _ => Err(CritiqueParseError::NotAnObject),
    }
}

fn decode_critique_object(map: &Map<String, Value>) -> Result<Critique, CritiqueParseError> {
    if let Some(error) = map.get("error").and_then(Value::as_str) {
        return Err(CritiqueParseError::Rejected(error.to_string()));
    }
    let total_score = map
        .get("total_score")
        .or_else(|| map.get("score"))
        .and_then(number_of);
    let summary = map
        .get("summary")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|summary| !summary.is_empty())
        .map(str::to_string);
    let sections = map
        .iter()
        .filter(|(key, _)| !NON_SECTION_KEYS.contains(&key.as_str()))
        .filter_map(|(name, value)| {
            let section = value.as_object()?;
            let reason = section.get("reason").and_then(Value::as_str)?;
            Some(CritiqueSection {
                name: name.clone(),
                score: section.get("score").and_then(number_of),
                reason: reason.to_string(),
            })
        })
        .collect();

    Ok(Critique {
        total_score,
        sections,
        summary,
    })
}

fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
