use crate::error::RecipeError;
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const TITLE_CHARS: usize = 80;
const DEFAULT_TITLE: &str = "Submission";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,
    pub title: String,
    pub question: String,
    pub model: String,
    pub response_text: String,
    pub created_at: DateTime<Utc>,
}

impl Submission {
    pub fn new(
        question: impl Into<String>,
        model: impl Into<String>,
        response_text: impl Into<String>,
    ) -> Self {
        let question = question.into();
        let created_at = Utc::now();
        Self {
            id: submission_id(&created_at),
            title: title_from(&question),
            question,
            model: model.into(),
            response_text: response_text.into(),
            created_at,
        }
    }

    /// Replace the question-derived title, keeping it when `title` is blank.
    pub fn with_title(mut self, title: &str) -> Self {
        let title = title.trim();
        if !title.is_empty() {
            self.title = title.to_string();
        }
        self
    }
}

fn title_from(question: &str) -> String {
    let title: String = question.trim().chars().take(TITLE_CHARS).collect();
    let title = title.trim_end();
    if title.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        title.to_string()
    }
}

// Millisecond timestamp in base 36 followed by six random base-36 digits.
fn submission_id(created_at: &DateTime<Utc>) -> String {
    let millis = u64::try_from(created_at.timestamp_millis()).unwrap_or_default();
    let mut suffix = to_base36(rand::random::<u64>());
    suffix.truncate(6);
    format!("{}{:0>6}", to_base36(millis), suffix)
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

pub trait SubmissionStore: Send + Sync {
    fn save(&self, submission: Submission) -> Result<(), RecipeError>;

    /// Newest first.
    fn list(&self) -> Result<Vec<Submission>, RecipeError>;
}

#[derive(Debug, Default)]
pub struct InMemorySubmissionStore {
    submissions: Mutex<Vec<Submission>>,
}

impl InMemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SubmissionStore for InMemorySubmissionStore {
    fn save(&self, submission: Submission) -> Result<(), RecipeError> {
        let mut submissions = self
            .submissions
            .lock()
            .map_err(|e| RecipeError::Storage(format!("Submission list poisoned: {e}")))?;
        submissions.insert(0, submission);
        Ok(())
    }

    fn list(&self) -> Result<Vec<Submission>, RecipeError> {
        let submissions = self
            .submissions
            .lock()
            .map_err(|e| RecipeError::Storage(format!("Submission list poisoned: {e}")))?;
        Ok(submissions.clone())
    }
}

/// Keeps the whole list in one JSON file.
#[derive(Debug)]
pub struct JsonFileSubmissionStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileSubmissionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Vec<Submission>, RecipeError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }
}

impl SubmissionStore for JsonFileSubmissionStore {
    fn save(&self, submission: Submission) -> Result<(), RecipeError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|e| RecipeError::Storage(format!("Submission file lock poisoned: {e}")))?;

        let mut submissions = self.read()?;
        submissions.insert(0, submission);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&submissions)?)?;
        debug!(
            "Saved submission to {} ({} total)",
            self.path.display(),
            submissions.len()
        );
        Ok(())
    }

    fn list(&self) -> Result<Vec<Submission>, RecipeError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|e| RecipeError::Storage(format!("Submission file lock poisoned: {e}")))?;
        self.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_title_from_question() {
        assert_eq!(title_from("  eggs and rice "), "eggs and rice");
        assert_eq!(title_from("   "), "Submission");
        assert_eq!(title_from(&"a".repeat(200)).chars().count(), 80);
    }

    #[test]
    fn test_with_title_keeps_question() {
        let submission = Submission::new("eggs, spinach", "m", "r").with_title(" Frittata ");
        assert_eq!(submission.title, "Frittata");
        assert_eq!(submission.question, "eggs, spinach");

        let untouched = Submission::new("eggs", "m", "r").with_title("  ");
        assert_eq!(untouched.title, "eggs");
    }

    #[test]
    fn test_submission_ids_differ() {
        let a = Submission::new("q", "m", "r");
        let b = Submission::new("q", "m", "r");
        assert_ne!(a.id, b.id);
        assert!(a.id.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_to_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }

    #[test]
    fn test_in_memory_store_newest_first() {
        let store = InMemorySubmissionStore::new();
        store.save(Submission::new("first", "m", "r")).unwrap();
        store.save(Submission::new("second", "m", "r")).unwrap();

        let titles: Vec<String> = store.list().unwrap().into_iter().map(|s| s.title).collect();
        assert_eq!(titles, vec!["second", "first"]);
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileSubmissionStore::new(dir.path().join("nested/submissions.json"));
        assert!(store.list().unwrap().is_empty());

        store.save(Submission::new("first", "m", "r1")).unwrap();
        store.save(Submission::new("second", "m", "r2")).unwrap();

        let reopened = JsonFileSubmissionStore::new(store.path());
        let listed = reopened.list().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].response_text, "r2");
        assert_eq!(listed[1].question, "first");
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("submissions.json");
        fs::write(&path, "not json").unwrap();

        let store = JsonFileSubmissionStore::new(&path);
        assert!(matches!(store.list(), Err(RecipeError::Json(_))));
    }
}
