//! JSON parsing for model replies.

use serde_json::{Map, Value};

use crate::error::{DocfieldsError, DocfieldsResult};
use crate::types::{ExtractedFields, CEP_KEY, CNPJ_KEY, ISSUE_DATE_KEY, TOTAL_VALUE_KEY};

const OPENING_FENCE: &str = "```json";
const CLOSING_FENCE: &str = "```";

/// Strip a leading ```` ```json ```` and a trailing ```` ``` ```` marker.
///
/// Text without fences is returned trimmed and otherwise unchanged.
pub fn strip_code_fences(text: &str) -> &str {
    let mut cleaned = text.trim();

    if let Some(rest) = cleaned.strip_prefix(OPENING_FENCE) {
        cleaned = rest.trim();
    }
    if let Some(rest) = cleaned.strip_suffix(CLOSING_FENCE) {
        cleaned = rest.trim();
    }

    cleaned
}

/// Parse the four extraction fields from a model reply.
///
/// Missing keys and `null` values become empty strings. Numbers and
/// booleans keep their JSON text. Any other key is ignored.
pub fn parse_fields(reply: &str) -> DocfieldsResult<ExtractedFields> {
    let cleaned = strip_code_fences(reply);

    let value: Value = serde_json::from_str(cleaned).map_err(|e| {
        DocfieldsError::response_format(format!("Model reply is not valid JSON: {}", e), cleaned)
    })?;

    let object = value.as_object().ok_or_else(|| {
        DocfieldsError::response_shape("Model reply is not a JSON object", cleaned)
    })?;

    Ok(ExtractedFields {
        cnpj: read_field(object, CNPJ_KEY, cleaned)?,
        cep: read_field(object, CEP_KEY, cleaned)?,
        issue_date: read_field(object, ISSUE_DATE_KEY, cleaned)?,
        total_value: read_field(object, TOTAL_VALUE_KEY, cleaned)?,
    })
}

fn read_field(object: &Map<String, Value>, key: &str, raw: &str) -> DocfieldsResult<String> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(v @ (Value::Number(_) | Value::Bool(_))) => Ok(v.to_string()),
        Some(_) => Err(DocfieldsError::response_shape(
            format!("Field \"{}\" must be a string", key),
            raw,
        )),
    }
}
