use crate::error::RecipeError;
use crate::normalizer::ModelResponse;
use log::debug;
use serde_json::Value;

impl ModelResponse {
    /// Unwrap a parsed JSON body from the generation proxy.
    ///
    /// Text carried by a `text` field, by Gemini `candidates`, or by an
    /// `output[0].content[0].text` block becomes [`ModelResponse::Text`].
    /// Any other value is kept as [`ModelResponse::Json`].
    pub fn from_envelope(body: Value) -> Result<Self, RecipeError> {
        if let Some(text) = body["text"].as_str() {
            return Ok(ModelResponse::Text(text.to_string()));
        }

        if let Some(parts) = body["candidates"][0]["content"]["parts"].as_array() {
            let texts: Vec<&str> = parts
                .iter()
                .filter_map(|part| part["text"].as_str())
                .filter(|text| !text.is_empty())
                .collect();
            debug!("Joined {} candidate part(s)", texts.len());
            return Ok(ModelResponse::Text(texts.join("\n\n")));
        }

        if let Some(text) = body["output"][0]["content"][0]["text"].as_str() {
            return Ok(ModelResponse::Text(text.to_string()));
        }

        if let Some(message) = upstream_error(&body) {
            return Err(RecipeError::Upstream(message));
        }

        Ok(ModelResponse::Json(body))
    }

    /// Interpret a raw HTTP body according to its content type.
    pub fn from_http_body(content_type: Option<&str>, body: &str) -> Result<Self, RecipeError> {
        let is_json = content_type
            .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
            .unwrap_or(false);

        if !is_json {
            return Ok(ModelResponse::Text(body.to_string()));
        }

        let value: Value = serde_json::from_str(body)?;
        Self::from_envelope(value)
    }
}

// `{"error": ...}` or `{"message": ...}` with nothing else worth reading.
fn upstream_error(body: &Value) -> Option<String> {
    let object = body.as_object()?;
    let message = object.get("error").or_else(|| object.get("message"))?;
    if object.keys().any(|key| key != "error" && key != "message" && key != "status") {
        return None;
    }

    Some(match message {
        Value::String(s) => s.clone(),
        Value::Object(inner) => inner
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| message.to_string()),
        other => other.to_string(),
    })
}
