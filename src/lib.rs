pub mod config;
pub mod error;
pub mod extract;
pub mod model;
pub mod normalizer;
pub mod payload;
pub mod prompt;
pub mod quantity;
pub mod response;
pub mod submissions;

pub use crate::config::{load_settings, NormalizerConfig, Settings};
pub use crate::error::RecipeError;
pub use crate::model::{
    Ingredient, Quantity, RecipeFields, RecipeIngredientLink, SavePayload, Step,
    StructuredRecipe, Tag,
};
pub use crate::normalizer::{normalize, normalize_value, ModelResponse, Normalizer};
pub use crate::payload::build_save_payload;
pub use crate::quantity::parse_quantity;

use log::debug;

/// Unwrap an HTTP body and normalize it in one go.
///
/// The JSON content type is unwrapped through
/// [`ModelResponse::from_http_body`]; the result is normalized with the
/// given configuration.
pub fn normalize_http_body(
    normalizer: &Normalizer,
    content_type: Option<&str>,
    body: &str,
) -> Result<StructuredRecipe, RecipeError> {
    let response = ModelResponse::from_http_body(content_type, body)?;
    debug!(
        "Normalizing {} response",
        match response {
            ModelResponse::Json(_) => "JSON",
            ModelResponse::Text(_) => "text",
        }
    );
    Ok(normalizer.normalize(&response))
}
