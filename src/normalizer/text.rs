use super::{minutes_from_text, whole_number};
use crate::config::NormalizerConfig;
use crate::model::{
    Ingredient, Quantity, RecipeFields, RecipeIngredientLink, Step, StructuredRecipe, Tag,
};
use crate::quantity::parse_quantity_str;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

/// Measurement words recognised between a quantity and an ingredient name.
const UNITS: &[&str] = &[
    "cups", "cup", "c", "tablespoons", "tablespoon", "tbsps", "tbsp", "tbs", "teaspoons",
    "teaspoon", "tsps", "tsp", "kilograms", "kilogram", "kg", "grams", "gram", "g",
    "milligrams", "milligram", "mg", "milliliters", "milliliter", "millilitres", "millilitre",
    "ml", "liters", "liter", "litres", "litre", "l", "fl oz", "ounces", "ounce", "oz",
    "pounds", "pound", "lbs", "lb", "pints", "pint", "quarts", "quart", "qt", "gallons",
    "gallon", "pinches", "pinch", "dashes", "dash", "cloves", "clove", "cans", "can",
    "slices", "slice", "pieces", "piece", "sticks", "stick", "packages", "package", "bunches",
    "bunch", "handfuls", "handful", "sprigs", "sprig", "stalks", "stalk", "heads", "head",
    "jars", "jar",
];

lazy_static! {
    static ref HEADING: Regex = Regex::new(
        r"(?i)^(#{1,6}\s*)?(?:\*\*)?(title|description|ingredients|steps|instructions|tags)(?:\*\*)?\s*(:)?\s*(?:\*\*)?\s*(.*)$"
    )
    .expect("Invalid heading pattern");
    static ref METADATA: Regex = Regex::new(
        r"(?i)^(?:[-*•]\s*)?(servings|serves|yield|prep(?:aration)?\s*time|cook(?:ing)?\s*time)\s*:\s*(.+)$"
    )
    .expect("Invalid metadata pattern");
    static ref BULLET: Regex = Regex::new(r"(?i)^(?:[-*•]\s+|\d{1,3}[.)]\s+|step\s+\d+\s*[:.)-]\s*)")
        .expect("Invalid bullet pattern");
    static ref INGREDIENT_LINE: Regex = Regex::new(&build_ingredient_pattern())
        .expect("Invalid ingredient line pattern");
}

fn build_ingredient_pattern() -> String {
    let quantity = r"\d+\s+\d+\s*/\s*\d+|\d+(?:\.\d+)?\s*/\s*\d+(?:\.\d+)?|\d+\s+[½⅓⅔¼¾⅕⅙⅚⅛⅜⅝⅞]|\d*[½⅓⅔¼¾⅕⅙⅚⅛⅜⅝⅞]|\d+(?:\.\d+)?\s*[-–]\s*\d+(?:\.\d+)?|\d+(?:\.\d+)?";
    let units = UNITS
        .iter()
        .map(|unit| regex::escape(unit).replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|");
    format!(
        r"(?i)^(?P<quantity>{quantity})\s*(?:(?P<unit>{units})\.?(?:\s+|$))?(?:of\s+)?(?P<name>.+?)(?:\s+[-–—]\s+(?P<preparation>.+)|\s*,\s*(?P<note>.+))?$"
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Body,
    Title,
    Description,
    Ingredients,
    Steps,
    Instructions,
    Tags,
}

impl Section {
    fn from_heading(word: &str) -> Self {
        match word.to_lowercase().as_str() {
            "title" => Section::Title,
            "description" => Section::Description,
            "ingredients" => Section::Ingredients,
            "steps" => Section::Steps,
            "instructions" => Section::Instructions,
            "tags" => Section::Tags,
            _ => Section::Body,
        }
    }
}

/// Non-empty lines grouped by the heading they appeared under.
#[derive(Debug, Default)]
struct Sections {
    body: Vec<String>,
    title: Vec<String>,
    description: Vec<String>,
    ingredients: Vec<String>,
    steps: Vec<String>,
    instructions: Vec<String>,
    tags: Vec<String>,
    servings: Option<u32>,
    prep_time: Option<u32>,
    cook_time: Option<u32>,
}

impl Sections {
    fn lines_mut(&mut self, section: Section) -> &mut Vec<String> {
        match section {
            Section::Body => &mut self.body,
            Section::Title => &mut self.title,
            Section::Description => &mut self.description,
            Section::Ingredients => &mut self.ingredients,
            Section::Steps => &mut self.steps,
            Section::Instructions => &mut self.instructions,
            Section::Tags => &mut self.tags,
        }
    }

    fn split(text: &str) -> Self {
        let mut sections = Sections::default();
        let mut current = Section::Body;

        for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
            if let Some((section, inline)) = heading(line) {
                current = section;
                if let Some(inline) = inline {
                    sections.lines_mut(current).push(inline);
                }
                continue;
            }

            if let Some(caps) = METADATA.captures(line) {
                let key = caps[1].to_lowercase();
                let value = caps[2].trim();
                if key.starts_with("prep") {
                    sections.prep_time = minutes_from_text(value);
                } else if key.starts_with("cook") {
                    sections.cook_time = minutes_from_text(value);
                } else {
                    sections.servings = whole_number(Some(&Value::String(value.to_string())));
                }
                continue;
            }

            sections.lines_mut(current).push(line.to_string());
        }

        sections
    }
}

/// Section opened by `line`, with any content after the colon. Without a
/// colon only a markdown heading (`## Steps`) counts.
fn heading(line: &str) -> Option<(Section, Option<String>)> {
    let caps = HEADING.captures(line)?;
    let rest = caps.get(4).map_or("", |m| m.as_str()).trim();
    let has_colon = caps.get(3).is_some();
    let is_markdown = caps.get(1).is_some();

    if !has_colon && !(is_markdown && rest.is_empty()) {
        return None;
    }

    let inline = (!rest.is_empty()).then(|| rest.trim_end_matches("**").trim().to_string());
    Some((Section::from_heading(&caps[2]), inline.filter(|s| !s.is_empty())))
}

fn strip_bullet(line: &str) -> &str {
    match BULLET.find(line) {
        Some(m) => line[m.end()..].trim(),
        None => line,
    }
}

/// An ingredient line broken into its parts.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct IngredientLine {
    pub name: String,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub preparation: Option<String>,
}

/// Parse `<quantity> <unit>? <name> (- <preparation> | , <preparation>)?`.
/// Lines that do not start with a quantity become the name as-is.
pub(crate) fn parse_ingredient_line(line: &str) -> Option<IngredientLine> {
    let line = strip_bullet(line.trim());
    if line.is_empty() {
        return None;
    }

    let parsed = INGREDIENT_LINE.captures(line).and_then(|caps| {
        let name = caps.name("name")?.as_str().trim().to_string();
        if name.is_empty() {
            return None;
        }
        let preparation = caps
            .name("preparation")
            .or_else(|| caps.name("note"))
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty());
        Some(IngredientLine {
            name,
            quantity: caps
                .name("quantity")
                .and_then(|m| parse_quantity_str(m.as_str())),
            unit: caps.name("unit").map(|m| m.as_str().to_string()),
            preparation,
        })
    });

    Some(parsed.unwrap_or_else(|| IngredientLine {
        name: line.to_string(),
        quantity: None,
        unit: None,
        preparation: None,
    }))
}

pub(super) fn parse_plain_text(text: &str, config: &NormalizerConfig) -> StructuredRecipe {
    let sections = Sections::split(text);

    let parsed_lines: Vec<IngredientLine> = sections
        .ingredients
        .iter()
        .filter_map(|line| parse_ingredient_line(line))
        .collect();

    let ingredients = parsed_lines
        .iter()
        .map(|line| Ingredient::named(line.name.clone()))
        .collect();

    let recipe_ingredients = parsed_lines
        .into_iter()
        .zip(1..)
        .map(|(line, order)| RecipeIngredientLink {
            ingredient_id: None,
            ingredient_name: Some(line.name),
            quantity: line.quantity.map(Quantity::Number),
            unit: line.unit,
            preparation: line.preparation,
            order,
        })
        .collect();

    let step_lines = if sections.steps.is_empty() {
        &sections.instructions
    } else {
        &sections.steps
    };
    let steps = step_lines
        .iter()
        .map(|line| strip_bullet(line))
        .filter(|line| !line.is_empty())
        .zip(1..)
        .map(|(instruction, step_number)| Step {
            step_number,
            instruction: instruction.to_string(),
        })
        .collect();

    let tags = sections
        .tags
        .iter()
        .map(|line| strip_bullet(line))
        .filter(|line| !line.is_empty())
        .map(|name| Tag {
            name: name.to_string(),
        })
        .collect();

    let (title, description) = title_and_description(&sections, config);

    StructuredRecipe {
        recipe: RecipeFields {
            title,
            description,
            servings: sections.servings.unwrap_or(config.default_servings),
            prep_time: sections.prep_time.unwrap_or(0),
            cook_time: sections.cook_time.unwrap_or(0),
            image_url: None,
        },
        ingredients,
        recipe_ingredients,
        steps,
        tags,
    }
}

fn title_and_description(sections: &Sections, config: &NormalizerConfig) -> (String, String) {
    let explicit_title = sections.title.join(" ").trim().to_string();
    let (title, body_start) = if !explicit_title.is_empty() {
        (explicit_title, 0)
    } else {
        match sections.body.first() {
            Some(first) => (strip_heading_marks(first), 1),
            None => (config.default_title.clone(), 0),
        }
    };

    let description = if sections.description.is_empty() {
        sections
            .body
            .iter()
            .skip(body_start)
            .take(config.description_lines)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        sections.description.join("\n")
    };

    (title, description.trim().to_string())
}

/// `# Pasta` and `**Pasta**` both title as `Pasta`.
fn strip_heading_marks(line: &str) -> String {
    line.trim_start_matches('#')
        .trim()
        .trim_matches('*')
        .trim()
        .to_string()
}
