use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use serde_json::Value;

lazy_static! {
    static ref WHOLE_FENCE: Regex = Regex::new(r"(?s)^```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*?)\s*```$")
        .expect("Invalid whole fence pattern");
    static ref FENCED_BLOCK: Regex = Regex::new(r"(?s)```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*?)```")
        .expect("Invalid fenced block pattern");
    static ref SHORT_MATCH: Regex =
        Regex::new(r"(?s)\{.*?\}|\[.*?\]").expect("Invalid short match pattern");
    static ref TRAILING_COMMA: Regex =
        Regex::new(r",(\s*[}\]])").expect("Invalid trailing comma pattern");
}

/// A source of substrings that may parse as JSON.
pub trait CandidateStrategy {
    fn name(&self) -> &'static str;
    fn candidates(&self, text: &str) -> Vec<String>;
}

/// The whole text, minus one fence wrapped around all of it.
pub struct WholeFence;

/// Every fenced code block in the text.
pub struct FencedBlocks;

/// First non-greedy `{...}` or `[...]` span.
pub struct ShortMatch;

/// First balanced bracket span.
pub struct BalancedScan;

impl CandidateStrategy for WholeFence {
    fn name(&self) -> &'static str {
        "whole_fence"
    }

    fn candidates(&self, text: &str) -> Vec<String> {
        let trimmed = text.trim();
        let inner = WHOLE_FENCE
            .captures(trimmed)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .unwrap_or(trimmed);
        non_empty(inner).into_iter().collect()
    }
}

impl CandidateStrategy for FencedBlocks {
    fn name(&self) -> &'static str {
        "fenced_blocks"
    }

    fn candidates(&self, text: &str) -> Vec<String> {
        FENCED_BLOCK
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .filter_map(|m| non_empty(m.as_str()))
            .collect()
    }
}

impl CandidateStrategy for ShortMatch {
    fn name(&self) -> &'static str {
        "short_match"
    }

    fn candidates(&self, text: &str) -> Vec<String> {
        SHORT_MATCH
            .find(text)
            .and_then(|m| non_empty(m.as_str()))
            .into_iter()
            .collect()
    }
}

impl CandidateStrategy for BalancedScan {
    fn name(&self) -> &'static str {
        "balanced_scan"
    }

    fn candidates(&self, text: &str) -> Vec<String> {
        balanced_span(text).map(str::to_string).into_iter().collect()
    }
}

/// Strategies in the order their candidates are tried.
pub fn strategies() -> [&'static dyn CandidateStrategy; 4] {
    [&WholeFence, &FencedBlocks, &ShortMatch, &BalancedScan]
}

/// All candidates, most likely first, without duplicates.
pub fn extract_json_candidates(text: &str) -> Vec<String> {
    json_candidates(text).map(|(_, candidate)| candidate).collect()
}

/// Candidates produced on demand, tagged with the strategy that found them.
///
/// A strategy only runs once every candidate of the strategies before it
/// has been consumed, so callers that stop at the first useful candidate
/// never pay for the balanced scan.
pub fn json_candidates(text: &str) -> impl Iterator<Item = (&'static str, String)> + '_ {
    let mut seen: Vec<String> = Vec::new();
    strategies()
        .into_iter()
        .flat_map(move |strategy| {
            strategy
                .candidates(text)
                .into_iter()
                .map(move |candidate| (strategy.name(), candidate))
        })
        .filter(move |(_, candidate)| {
            if seen.contains(candidate) {
                false
            } else {
                seen.push(candidate.clone());
                true
            }
        })
}

/// The first candidate that parses to a JSON object or array.
pub fn extract_json(text: &str) -> Option<Value> {
    let found = json_candidates(text).find_map(|(strategy, candidate)| {
        parse_candidate(&candidate).map(|value| (strategy, value))
    });
    match found {
        Some((strategy, value)) => {
            debug!("Recovered JSON using {} strategy", strategy);
            Some(value)
        }
        None => {
            debug!("No JSON candidate parsed");
            None
        }
    }
}

/// Strict parse, then a lenient pass without trailing commas. Only objects
/// and arrays are accepted.
pub fn parse_candidate(candidate: &str) -> Option<Value> {
    let structured = |value: Value| (value.is_object() || value.is_array()).then_some(value);

    if let Ok(value) = serde_json::from_str::<Value>(candidate) {
        return structured(value);
    }

    let relaxed = TRAILING_COMMA.replace_all(candidate, "$1");
    serde_json::from_str::<Value>(&relaxed)
        .ok()
        .and_then(structured)
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

enum Scan {
    Closed(usize),
    Mismatch,
    Unterminated,
}

fn balanced_span(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut from = 0;
    while let Some(offset) = text[from..].find(|c: char| c == '{' || c == '[') {
        let open = from + offset;
        match scan_from(bytes, open) {
            Scan::Closed(close) => return Some(&text[open..=close]),
            Scan::Mismatch | Scan::Unterminated => from = open + 1,
        }
    }
    None
}

/// Walks forward from an opening bracket at `open`, ignoring brackets
/// inside string literals.
fn scan_from(bytes: &[u8], open: usize) -> Scan {
    let mut stack: Vec<u8> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' | b'[' => stack.push(b),
            b'}' | b']' => {
                let expected = if b == b'}' { b'{' } else { b'[' };
                if stack.pop() != Some(expected) {
                    return Scan::Mismatch;
                }
                if stack.is_empty() {
                    return Scan::Closed(i);
                }
            }
            _ => {}
        }
    }

    Scan::Unterminated
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_whole_fence_is_stripped() {
        let text = "```json\n{\"a\": 1}\n```";
        assert_eq!(WholeFence.candidates(text), vec!["{\"a\": 1}".to_string()]);
    }

    #[test]
    fn test_unfenced_text_is_its_own_candidate() {
        let text = "  {\"a\": 1}  ";
        assert_eq!(WholeFence.candidates(text), vec!["{\"a\": 1}".to_string()]);
    }

    #[test]
    fn test_fenced_blocks_anywhere() {
        let text = "First:\n```json\n{\"a\":1}\n```\nthen\n```\n[2]\n```\n";
        assert_eq!(
            FencedBlocks.candidates(text),
            vec!["{\"a\":1}".to_string(), "[2]".to_string()]
        );
    }

    #[test]
    fn test_short_match_is_non_greedy() {
        let text = "x {\"a\": {\"b\": 1}} y";
        assert_eq!(ShortMatch.candidates(text), vec!["{\"a\": {\"b\": 1}".to_string()]);
    }

    #[test]
    fn test_balanced_scan_handles_nesting() {
        let text = "Sure! {\"a\": {\"b\": [1, 2]}} Enjoy.";
        assert_eq!(
            BalancedScan.candidates(text),
            vec!["{\"a\": {\"b\": [1, 2]}}".to_string()]
        );
    }

    #[test]
    fn test_balanced_scan_resumes_after_mismatch() {
        let text = "oops {] then [1, {\"x\": 2}]";
        assert_eq!(
            BalancedScan.candidates(text),
            vec!["[1, {\"x\": 2}]".to_string()]
        );
    }

    #[test]
    fn test_balanced_scan_ignores_brackets_in_strings() {
        let text = "{\"note\": \"use } carefully\", \"n\": [1]}";
        assert_eq!(BalancedScan.candidates(text), vec![text.to_string()]);
    }

    #[test]
    fn test_balanced_scan_unterminated() {
        assert!(BalancedScan.candidates("{\"a\": [1, 2").is_empty());
    }

    #[test]
    fn test_candidates_are_ordered_and_deduplicated() {
        let text = "```json\n{\"a\":1}\n```";
        let candidates = extract_json_candidates(text);
        assert_eq!(candidates, vec!["{\"a\":1}".to_string()]);
    }

    #[test]
    fn test_candidates_stream_in_strategy_order() {
        let text = "```json\n{\"a\":1}\n```";
        let mut candidates = json_candidates(text);
        assert_eq!(
            candidates.next(),
            Some(("whole_fence", "{\"a\":1}".to_string()))
        );
        assert_eq!(candidates.next(), None);
    }

    #[test]
    fn test_fenced_json_after_unbalanced_prefix() {
        let text = format!(
            "{}\n```json\n{{\"recipe\": {{\"title\": \"X\"}}}}\n```",
            "{".repeat(40_000)
        );
        let started = std::time::Instant::now();
        let value = extract_json(&text).unwrap();
        assert_eq!(value["recipe"]["title"], "X");
        assert!(started.elapsed() < std::time::Duration::from_secs(1));
    }

    #[test]
    fn test_lenient_trailing_commas() {
        assert_eq!(
            parse_candidate("{\"a\": [1, 2,], }"),
            Some(json!({"a": [1, 2]}))
        );
    }

    #[test]
    fn test_scalars_are_rejected() {
        assert_eq!(parse_candidate("42"), None);
        assert_eq!(parse_candidate("\"text\""), None);
    }

    #[test]
    fn test_extract_from_prose() {
        let text = "Here is your recipe:\n```json\n{\"recipe\":{\"title\":\"X\"}}\n```";
        assert_eq!(extract_json(text), Some(json!({"recipe": {"title": "X"}})));
    }

    #[test]
    fn test_extract_nested_without_fence() {
        let text = "Recipe follows {\"recipe\": {\"title\": \"Y\"}, \"tags\": [\"a\"]} thanks";
        assert_eq!(
            extract_json(text),
            Some(json!({"recipe": {"title": "Y"}, "tags": ["a"]}))
        );
    }

    #[test]
    fn test_extract_nothing() {
        assert_eq!(extract_json("no json here"), None);
        assert_eq!(extract_json(""), None);
    }
}
