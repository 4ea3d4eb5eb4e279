use serde::{Deserialize, Serialize};

/// Canonical recipe shape produced from one generation response.
///
/// Each part maps onto its own table (`recipes`, `ingredients`,
/// `recipe_ingredients`, `recipe_steps`, `tags`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StructuredRecipe {
    pub recipe: RecipeFields,
    pub ingredients: Vec<Ingredient>,
    pub recipe_ingredients: Vec<RecipeIngredientLink>,
    pub steps: Vec<Step>,
    pub tags: Vec<Tag>,
}

/// Scalar columns of the `recipes` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeFields {
    pub title: String,
    pub description: String,
    pub servings: u32,
    /// Minutes.
    pub prep_time: u32,
    /// Minutes.
    pub cook_time: u32,
    pub image_url: Option<String>,
}

impl Default for RecipeFields {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            servings: 1,
            prep_time: 0,
            cook_time: 0,
            image_url: None,
        }
    }
}

/// An ingredient identified by name. `id` stays `None` until the
/// persistence layer has upserted it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: Option<i64>,
    pub name: String,
}

impl Ingredient {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }
}

/// Quantity as the model emitted it, before it is forced to a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Number(f64),
    Text(String),
}

/// One row of `recipe_ingredients`, still keyed by ingredient name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredientLink {
    pub ingredient_id: Option<i64>,
    pub ingredient_name: Option<String>,
    pub quantity: Option<Quantity>,
    pub unit: Option<String>,
    pub preparation: Option<String>,
    pub order: u32,
}

impl RecipeIngredientLink {
    /// Link with no quantity information, as synthesized from a bare
    /// ingredient list.
    pub fn bare(name: impl Into<String>, order: u32) -> Self {
        Self {
            ingredient_id: None,
            ingredient_name: Some(name.into()),
            quantity: None,
            unit: None,
            preparation: None,
            order,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub step_number: u32,
    pub instruction: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
}

/// Exactly what the persistence layer inserts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavePayload {
    pub recipe: RecipeFields,
    /// Names to upsert with `ON CONFLICT DO NOTHING`.
    pub ingredients: Vec<IngredientUpsert>,
    pub recipe_ingredients: Vec<SaveIngredientLink>,
    pub steps: Vec<Step>,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientUpsert {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveIngredientLink {
    pub ingredient_id: Option<i64>,
    pub ingredient_name: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub preparation: Option<String>,
    pub order: u32,
}
