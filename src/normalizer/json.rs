use super::text::parse_ingredient_line;
use super::{minutes, whole_number};
use crate::config::NormalizerConfig;
use crate::model::{
    Ingredient, Quantity, RecipeFields, RecipeIngredientLink, Step, StructuredRecipe, Tag,
};
use serde::de::IgnoredAny;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Any of these at the top level marks a value as a recipe document.
const RECIPE_KEYS: &[&str] = &[
    "recipe",
    "recipes",
    "ingredients",
    "recipe_ingredients",
    "steps",
    "instructions",
    "tags",
];

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IngredientEntry {
    Name(String),
    Object(IngredientObject),
    Other(IgnoredAny),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IngredientObject {
    id: Option<Value>,
    name: Option<Value>,
    ingredient: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LinkEntry {
    Line(String),
    Object(LinkObject),
    Other(IgnoredAny),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LinkObject {
    ingredient_id: Option<Value>,
    ingredient_name: Option<Value>,
    name: Option<Value>,
    ingredient: Option<Value>,
    quantity: Option<Value>,
    unit: Option<Value>,
    preparation: Option<Value>,
    order: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StepEntry {
    Text(String),
    Object(StepObject),
    Other(IgnoredAny),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StepObject {
    step_number: Option<Value>,
    instruction: Option<Value>,
    text: Option<Value>,
    description: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TagEntry {
    Name(String),
    Object(TagObject),
    Other(IgnoredAny),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TagObject {
    name: Option<Value>,
}

pub(super) fn normalize_value(value: &Value, config: &NormalizerConfig) -> Option<StructuredRecipe> {
    let document = match value {
        Value::Array(items) => items.iter().find(|item| item.is_object())?,
        other => other,
    };
    let top = document.as_object()?;
    if !RECIPE_KEYS.iter().any(|key| top.contains_key(*key)) {
        return None;
    }
    let root = root_object(top);

    let mut ingredients = ingredients(&entries(top, root, &["ingredients"]));
    let mut recipe_ingredients = links(&entries(top, root, &["recipe_ingredients"]));

    if recipe_ingredients.is_empty() {
        recipe_ingredients = ingredients
            .iter()
            .zip(1..)
            .map(|(ingredient, order)| RecipeIngredientLink::bare(ingredient.name.clone(), order))
            .collect();
    } else if ingredients.is_empty() {
        // Upserts are keyed by name, so links alone must still yield names.
        for name in recipe_ingredients
            .iter()
            .filter_map(|link| link.ingredient_name.as_deref())
        {
            if !ingredients.iter().any(|ingredient| ingredient.name == name) {
                ingredients.push(Ingredient::named(name));
            }
        }
    }

    Some(StructuredRecipe {
        recipe: recipe_fields(root, config),
        ingredients,
        recipe_ingredients,
        steps: steps(&entries(top, root, &["steps", "instructions"])),
        tags: tags(&entries(top, root, &["tags"])),
    })
}

/// `recipe` → `recipes[0]` → the document itself.
fn root_object(top: &Map<String, Value>) -> &Map<String, Value> {
    top.get("recipe")
        .and_then(Value::as_object)
        .or_else(|| {
            top.get("recipes")
                .and_then(|recipes| recipes.get(0))
                .and_then(Value::as_object)
        })
        .unwrap_or(top)
}

fn recipe_fields(root: &Map<String, Value>, config: &NormalizerConfig) -> RecipeFields {
    RecipeFields {
        title: first_text(root, &["title", "name"]).unwrap_or_default(),
        description: first_text(root, &["description"]).unwrap_or_default(),
        servings: whole_number(first_present(root, &["servings"]))
            .unwrap_or(config.default_servings),
        prep_time: minutes(first_present(root, &["prep_time", "prepTime"])).unwrap_or(0),
        cook_time: minutes(first_present(root, &["cook_time", "cookTime"])).unwrap_or(0),
        image_url: first_text(root, &["image_url", "image"]),
    }
}

/// First list found under `keys`, top level before the root recipe. A
/// newline-separated string counts as a list of lines.
fn entries(top: &Map<String, Value>, root: &Map<String, Value>, keys: &[&str]) -> Vec<Value> {
    for key in keys {
        for source in [top, root] {
            match source.get(*key) {
                Some(Value::Array(items)) => return items.clone(),
                Some(Value::String(s)) => {
                    return s
                        .lines()
                        .map(str::trim)
                        .filter(|line| !line.is_empty())
                        .map(|line| Value::String(line.to_string()))
                        .collect()
                }
                _ => {}
            }
        }
    }
    Vec::new()
}

fn ingredients(entries: &[Value]) -> Vec<Ingredient> {
    entries
        .iter()
        .filter_map(|entry| match IngredientEntry::deserialize(entry).ok()? {
            IngredientEntry::Name(name) => non_empty(&name).map(Ingredient::named),
            IngredientEntry::Object(object) => {
                let name = text(object.name.as_ref()).or_else(|| text(object.ingredient.as_ref()))?;
                Some(Ingredient {
                    id: integer_id(object.id.as_ref()),
                    name,
                })
            }
            IngredientEntry::Other(_) => None,
        })
        .collect()
}

fn links(entries: &[Value]) -> Vec<RecipeIngredientLink> {
    entries
        .iter()
        .zip(1..)
        .filter_map(|(entry, position)| match LinkEntry::deserialize(entry).ok()? {
            LinkEntry::Line(line) => {
                let parsed = parse_ingredient_line(&line)?;
                Some(RecipeIngredientLink {
                    ingredient_id: None,
                    ingredient_name: Some(parsed.name),
                    quantity: parsed.quantity.map(Quantity::Number),
                    unit: parsed.unit,
                    preparation: parsed.preparation,
                    order: position,
                })
            }
            LinkEntry::Object(object) => Some(RecipeIngredientLink {
                ingredient_id: integer_id(object.ingredient_id.as_ref()),
                ingredient_name: text(object.ingredient_name.as_ref())
                    .or_else(|| text(object.name.as_ref()))
                    .or_else(|| text(object.ingredient.as_ref())),
                quantity: raw_quantity(object.quantity.as_ref()),
                unit: text(object.unit.as_ref()),
                preparation: text(object.preparation.as_ref()),
                order: whole_number(object.order.as_ref()).unwrap_or(position),
            }),
            LinkEntry::Other(_) => None,
        })
        .collect()
}

/// Steps without an explicit number take their position in the source list.
fn steps(entries: &[Value]) -> Vec<Step> {
    let mut steps = Vec::with_capacity(entries.len());
    for (entry, position) in entries.iter().zip(1u32..) {
        let step = match StepEntry::deserialize(entry) {
            Ok(StepEntry::Text(instruction)) => non_empty(&instruction).map(|instruction| Step {
                step_number: position,
                instruction,
            }),
            Ok(StepEntry::Object(object)) => text(object.instruction.as_ref())
                .or_else(|| text(object.text.as_ref()))
                .or_else(|| text(object.description.as_ref()))
                .map(|instruction| Step {
                    step_number: whole_number(object.step_number.as_ref()).unwrap_or(position),
                    instruction,
                }),
            Ok(StepEntry::Other(_)) | Err(_) => None,
        };
        steps.extend(step);
    }
    steps
}

fn tags(entries: &[Value]) -> Vec<Tag> {
    entries
        .iter()
        .filter_map(|entry| match TagEntry::deserialize(entry).ok()? {
            TagEntry::Name(name) => non_empty(&name),
            TagEntry::Object(object) => text(object.name.as_ref()),
            TagEntry::Other(_) => None,
        })
        .map(|name| Tag { name })
        .collect()
}

fn raw_quantity(value: Option<&Value>) -> Option<Quantity> {
    match value? {
        Value::Number(n) => n.as_f64().map(Quantity::Number),
        Value::String(s) => non_empty(s).map(Quantity::Text),
        _ => None,
    }
}

fn integer_id(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// First key holding a non-null value.
fn first_present<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|value| !value.is_null())
}

/// First key holding a non-empty string.
fn first_text(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| text(object.get(*key)))
}

fn text(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).and_then(non_empty)
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
