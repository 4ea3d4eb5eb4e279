use serde::{Deserialize, Serialize};

/// Instructions sent ahead of the user's ingredient list.
///
/// Loaded from `prompt.txt` at compile time. The `{{INGREDIENTS}}`
/// placeholder marks where the list goes.
pub const RECIPE_PROMPT: &str = include_str!("prompt.txt");

const INGREDIENTS_PLACEHOLDER: &str = "{{INGREDIENTS}}";

/// Fill the prompt with the ingredients the user typed.
pub fn build_recipe_prompt(ingredients: &str) -> String {
    RECIPE_PROMPT.replace(INGREDIENTS_PLACEHOLDER, ingredients.trim())
}

/// Body of a `generateContent` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

pub fn generation_request(prompt: impl Into<String>) -> GenerateRequest {
    GenerateRequest {
        contents: vec![Content {
            parts: vec![Part {
                text: prompt.into(),
            }],
        }],
    }
}
