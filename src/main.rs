use clap::Parser;
use log::{debug, info};
use recipe_normalizer::prompt::{build_recipe_prompt, generation_request};
use recipe_normalizer::submissions::{JsonFileSubmissionStore, Submission, SubmissionStore};
use recipe_normalizer::{
    build_save_payload, normalize_http_body, Normalizer, RecipeError, Settings,
};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Response body to normalize; stdin when omitted
    file: Option<PathBuf>,

    /// Content type the body was served with
    #[arg(short, long, default_value = "text/plain")]
    content_type: String,

    /// Print the insert payload instead of the structured recipe
    #[arg(long)]
    payload: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Ingredients or question that produced the response, kept with the submission
    #[arg(short, long)]
    question: Option<String>,

    /// Print the generation request for these ingredients and exit
    #[arg(long, value_name = "INGREDIENTS")]
    prompt: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();
    let settings = Settings::load()?;
    debug!("{:?}", settings);

    if let Some(ingredients) = cli.prompt.as_deref() {
        if ingredients.trim().is_empty() {
            return Err(RecipeError::InvalidInput("no ingredients given".to_string()).into());
        }
        let request = generation_request(build_recipe_prompt(ingredients));
        println!("{}", to_json(&request, cli.pretty)?);
        return Ok(());
    }

    let body = match &cli.file {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let normalizer = Normalizer::new(settings.normalizer.clone());
    let structured = normalize_http_body(&normalizer, Some(cli.content_type.as_str()), &body)?;

    if let Some(path) = &settings.submissions.path {
        let store = JsonFileSubmissionStore::new(path);
        let submission = Submission::new(
            cli.question.clone().unwrap_or_default(),
            settings.generation.model.clone(),
            body.clone(),
        )
        .with_title(&structured.recipe.title);
        store.save(submission)?;
        info!("Recorded submission in {}", path.display());
    }

    let output = if cli.payload {
        to_json(&build_save_payload(Some(&structured)), cli.pretty)?
    } else {
        to_json(&structured, cli.pretty)?
    };
    println!("{}", output);

    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}
