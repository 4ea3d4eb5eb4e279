mod json;
mod text;

use crate::config::NormalizerConfig;
use crate::extract::{json_candidates, parse_candidate};
use crate::model::StructuredRecipe;
use crate::quantity::first_number;
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use serde_json::Value;

lazy_static! {
    static ref ISO_DURATION: Regex = Regex::new(
        r"(?i)^P(?:(\d+(?:\.\d+)?)D)?(?:T(?:(\d+(?:\.\d+)?)H)?(?:(\d+(?:\.\d+)?)M)?(?:(\d+(?:\.\d+)?)S)?)?$"
    )
    .expect("Invalid ISO duration pattern");
    // A range such as "10-15 minutes" resolves to its lower bound.
    static ref HOURS: Regex = Regex::new(
        r"(?i)(\d+(?:\.\d+)?)(?:\s*(?:-|–|to)\s*\d+(?:\.\d+)?)?\s*(?:hours?|hrs?|h)\b"
    )
    .expect("Invalid hours pattern");
    static ref MINUTES: Regex = Regex::new(
        r"(?i)(\d+(?:\.\d+)?)(?:\s*(?:-|–|to)\s*\d+(?:\.\d+)?)?\s*(?:minutes?|mins?|m)\b"
    )
    .expect("Invalid minutes pattern");
}

/// What the generative service gave back.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelResponse {
    /// An already-parsed JSON body.
    Json(Value),
    /// Raw text that may contain JSON, markdown, or plain prose.
    Text(String),
}

impl From<Value> for ModelResponse {
    fn from(value: Value) -> Self {
        ModelResponse::Json(value)
    }
}

impl From<String> for ModelResponse {
    fn from(text: String) -> Self {
        ModelResponse::Text(text)
    }
}

impl From<&str> for ModelResponse {
    fn from(text: &str) -> Self {
        ModelResponse::Text(text.to_string())
    }
}

/// Tries recipe-shaped JSON, then JSON recovered from text, then line
/// heuristics. Always yields a complete recipe.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizerConfig,
}

impl Normalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    pub fn normalize(&self, response: &ModelResponse) -> StructuredRecipe {
        match response {
            ModelResponse::Json(Value::String(text)) | ModelResponse::Text(text) => {
                self.normalize_text(text)
            }
            ModelResponse::Json(value) => self.normalize_value(value).unwrap_or_else(|| {
                debug!("JSON response has no recipe fields, using defaults");
                text::parse_plain_text("", &self.config)
            }),
        }
    }

    /// Recipe-shaped JSON only; `None` when no recipe keys are present.
    pub fn normalize_value(&self, value: &Value) -> Option<StructuredRecipe> {
        json::normalize_value(value, &self.config)
    }

    fn normalize_text(&self, text: &str) -> StructuredRecipe {
        let embedded = json_candidates(text).find_map(|(strategy, candidate)| {
            parse_candidate(&candidate)
                .and_then(|value| json::normalize_value(&value, &self.config))
                .map(|recipe| (strategy, recipe))
        });
        if let Some((strategy, recipe)) = embedded {
            debug!("Normalized recipe from JSON found by {} strategy", strategy);
            return recipe;
        }

        debug!("No recipe JSON in response, parsing plain text");
        text::parse_plain_text(text, &self.config)
    }
}

/// Normalize with the default configuration.
///
/// # Examples
/// ```
/// use recipe_normalizer::{normalize, ModelResponse};
///
/// let text = "Title:\nPasta\nIngredients:\n2 cups flour\nSteps:\nMix";
/// let structured = normalize(&ModelResponse::from(text));
/// assert_eq!(structured.recipe.title, "Pasta");
/// assert_eq!(structured.steps.len(), 1);
/// ```
pub fn normalize(response: &ModelResponse) -> StructuredRecipe {
    Normalizer::default().normalize(response)
}

/// Map recipe-shaped JSON with the default configuration.
pub fn normalize_value(value: &Value) -> Option<StructuredRecipe> {
    Normalizer::default().normalize_value(value)
}

/// A non-negative whole number from a JSON number or from the first number
/// in a string. Fractions round to nearest.
pub(crate) fn whole_number(value: Option<&Value>) -> Option<u32> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => first_number(s)?,
        _ => return None,
    };
    to_u32(n)
}

/// Minutes from a number, an ISO-8601 duration (`PT1H30M`), or text like
/// `"1 hour 15 minutes"` / `"15 minutes"`.
pub(crate) fn minutes(value: Option<&Value>) -> Option<u32> {
    match value? {
        Value::String(s) => minutes_from_text(s),
        other => whole_number(Some(other)),
    }
}

pub(crate) fn minutes_from_text(text: &str) -> Option<u32> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(caps) = ISO_DURATION.captures(text) {
        let part = |i: usize| {
            caps.get(i)
                .and_then(|m| m.as_str().parse::<f64>().ok())
                .unwrap_or(0.0)
        };
        return to_u32(part(1) * 1440.0 + part(2) * 60.0 + part(3) + part(4) / 60.0);
    }

    let hours = HOURS
        .captures(text)
        .and_then(|caps| caps[1].parse::<f64>().ok());
    let mins = MINUTES
        .captures(text)
        .and_then(|caps| caps[1].parse::<f64>().ok());
    match (hours, mins) {
        (None, None) => first_number(text).and_then(to_u32),
        (h, m) => to_u32(h.unwrap_or(0.0) * 60.0 + m.unwrap_or(0.0)),
    }
}

fn to_u32(n: f64) -> Option<u32> {
    if !n.is_finite() || n < 0.0 || n > u32::MAX as f64 {
        return None;
    }
    Some(n.round() as u32)
}
