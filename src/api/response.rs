use serde_json::Value;

/// Join a prediction's output into the reply text.
///
/// Language models on Replicate return their output as an array of string
/// chunks. A bare string is taken as is, `null` means no output, and anything
/// else is pretty-printed so the user still sees it.
pub fn extract_output(output: Option<&Value>) -> String {
    match output {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Array(chunks)) => chunks
            .iter()
            .map(|chunk| match chunk {
                Value::String(text) => text.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            })
            .collect(),
        Some(other) => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

/// Text of a failed prediction's `error` field.
pub fn extract_error(error: Option<&Value>) -> String {
    match error {
        Some(Value::String(text)) if !text.trim().is_empty() => text.clone(),
        Some(Value::String(_)) | Some(Value::Null) | None => {
            "prediction failed without an error message".to_string()
        }
        Some(other) => other.to_string(),
    }
}
