//! Extraction of the first top-level JSON object embedded in free text.
//!
//! Model output often wraps the JSON answer in prose or markdown fences.
//! The scan here is plain brace counting: braces inside string literals
//! are counted like any other brace, so a value such as `"echo }"` can
//! end the object early. Callers get `InvalidJson` in that case.

use crate::error::{Error, Result};
use serde_json::{Map, Value};

/// Returns the first balanced `{...}` region of `input`, validated as a
/// JSON object. The returned slice borrows from `input` unchanged.
pub fn extract_first_json(input: &str) -> Result<&str> {
    if input.is_empty() {
        return Err(Error::EmptyInput);
    }

    let mut depth = 0usize;
    let mut start = 0usize;
    let mut end = None;

    for (idx, ch) in input.char_indices() {
        match ch {
            '{' => {
                if depth == 0 {
                    start = idx;
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    end = Some(idx + 1);
                    break;
                }
            }
            _ => {}
        }
    }

    let end = match end {
        Some(end) if end > start => end,
        _ => return Err(Error::NoJsonFound),
    };

    let candidate = &input[start..end];
    serde_json::from_str::<Map<String, Value>>(candidate).map_err(Error::InvalidJson)?;

    Ok(candidate)
}
