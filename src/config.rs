use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Top-level settings
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    /// Defaults used while normalizing model output
    #[serde(default)]
    pub normalizer: NormalizerConfig,
    /// Recipe generation request settings
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Where generation submissions are kept
    #[serde(default)]
    pub submissions: SubmissionsConfig,
}

/// Defaults applied when a response leaves a field unresolved
#[derive(Debug, Deserialize, Clone)]
pub struct NormalizerConfig {
    /// Title used when plain text has neither a `Title:` section nor a body line
    #[serde(default = "default_title")]
    pub default_title: String,
    /// Servings used when the response has no usable number
    #[serde(default = "default_servings")]
    pub default_servings: u32,
    /// Body lines folded into the description when there is no `Description:` section
    #[serde(default = "default_description_lines")]
    pub description_lines: usize,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            default_title: default_title(),
            default_servings: default_servings(),
            description_lines: default_description_lines(),
        }
    }
}

/// Settings for building generation requests
#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    /// Model identifier sent with each request
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
        }
    }
}

/// Submission storage settings
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SubmissionsConfig {
    /// JSON file holding submissions; in-memory when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

// Default value functions
fn default_title() -> String {
    "Generated Recipe".to_string()
}

fn default_servings() -> u32 {
    1
}

fn default_description_lines() -> usize {
    5
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

impl Settings {
    /// Load settings from file and environment variables
    ///
    /// Settings are loaded with the following priority (highest to lowest):
    /// 1. Environment variables with RECIPE__ prefix
    /// 2. recipe_normalizer.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: RECIPE__NORMALIZER__DEFAULT_TITLE
    pub fn load() -> Result<Self, ConfigError> {
        load_settings()
    }
}

/// Load settings from file and environment variables
///
/// See [`Settings::load`] for the precedence rules.
pub fn load_settings() -> Result<Settings, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("recipe_normalizer").required(false))
        // Use double underscore for nested: RECIPE__GENERATION__MODEL
        .add_source(
            Environment::with_prefix("RECIPE")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
