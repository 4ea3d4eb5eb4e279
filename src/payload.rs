use crate::model::{IngredientUpsert, SaveIngredientLink, SavePayload, StructuredRecipe};
use log::warn;

/// Build the insert payload. `None` in, `None` out.
///
/// # Examples
/// ```
/// use recipe_normalizer::build_save_payload;
///
/// assert!(build_save_payload(None).is_none());
/// ```
pub fn build_save_payload(structured: Option<&StructuredRecipe>) -> Option<SavePayload> {
    structured.map(SavePayload::from)
}

impl From<&StructuredRecipe> for SavePayload {
    fn from(structured: &StructuredRecipe) -> Self {
        let mut ingredients: Vec<IngredientUpsert> = Vec::with_capacity(structured.ingredients.len());
        for ingredient in &structured.ingredients {
            let name = ingredient.name.trim();
            if !name.is_empty() && !ingredients.iter().any(|existing| existing.name == name) {
                ingredients.push(IngredientUpsert {
                    name: name.to_string(),
                });
            }
        }

        let recipe_ingredients = structured
            .recipe_ingredients
            .iter()
            .map(|link| {
                let quantity = link.quantity.as_ref().and_then(|raw| {
                    let parsed = raw.parse();
                    if parsed.is_none() {
                        warn!(
                            "Dropping unparseable quantity {:?} for {}",
                            raw,
                            link.ingredient_name.as_deref().unwrap_or("unnamed ingredient")
                        );
                    }
                    parsed
                });

                SaveIngredientLink {
                    ingredient_id: link.ingredient_id,
                    ingredient_name: link.ingredient_name.clone(),
                    quantity,
                    unit: link.unit.clone(),
                    preparation: link.preparation.clone(),
                    order: link.order,
                }
            })
            .collect();

        SavePayload {
            recipe: structured.recipe.clone(),
            ingredients,
            recipe_ingredients,
            steps: structured.steps.clone(),
            tags: structured.tags.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Ingredient, Quantity, RecipeIngredientLink, Step, Tag};

    fn link(name: &str, quantity: Option<Quantity>, order: u32) -> RecipeIngredientLink {
        RecipeIngredientLink {
            quantity,
            ..RecipeIngredientLink::bare(name, order)
        }
    }

    #[test]
    fn test_none_is_none() {
        assert!(build_save_payload(None).is_none());
    }

    #[test]
    fn test_ingredient_names_are_deduplicated() {
        let structured = StructuredRecipe {
            ingredients: vec![
                Ingredient::named("salt"),
                Ingredient::named(" salt "),
                Ingredient::named("pepper"),
            ],
            ..Default::default()
        };

        let payload = build_save_payload(Some(&structured)).unwrap();
        assert_eq!(
            payload.ingredients,
            vec![
                IngredientUpsert { name: "salt".to_string() },
                IngredientUpsert { name: "pepper".to_string() },
            ]
        );
    }

    #[test]
    fn test_quantities_are_reparsed() {
        let structured = StructuredRecipe {
            recipe_ingredients: vec![
                link("flour", Some(Quantity::Text("1 1/2".to_string())), 1),
                link("sugar", Some(Quantity::Number(2.0)), 2),
                link("salt", Some(Quantity::Text("a pinch".to_string())), 3),
                link("water", None, 4),
            ],
            ..Default::default()
        };

        let payload = build_save_payload(Some(&structured)).unwrap();
        let quantities: Vec<Option<f64>> = payload
            .recipe_ingredients
            .iter()
            .map(|link| link.quantity)
            .collect();
        assert_eq!(quantities, vec![Some(1.5), Some(2.0), None, None]);
        assert_eq!(payload.recipe_ingredients[3].order, 4);
    }

    #[test]
    fn test_reparse_is_idempotent() {
        let structured = StructuredRecipe {
            recipe_ingredients: vec![link("milk", Some(Quantity::Text("¾".to_string())), 1)],
            ..Default::default()
        };

        let payload = build_save_payload(Some(&structured)).unwrap();
        let first = payload.recipe_ingredients[0].quantity.unwrap();
        assert_eq!(Quantity::Number(first).parse(), Some(first));
    }

    #[test]
    fn test_steps_and_tags_pass_through() {
        let structured = StructuredRecipe {
            steps: vec![Step {
                step_number: 1,
                instruction: "Stir".to_string(),
            }],
            tags: vec![Tag {
                name: "quick".to_string(),
            }],
            ..Default::default()
        };

        let payload = build_save_payload(Some(&structured)).unwrap();
        assert_eq!(payload.steps, structured.steps);
        assert_eq!(payload.tags, structured.tags);
        assert_eq!(payload.recipe, structured.recipe);
    }
}
