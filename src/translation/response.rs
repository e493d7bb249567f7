/*!
 * Response parsing for the delimiter protocol.
 *
 * The primary parser scans for the literal
 * `<<<TRANSLATION_START_{id}>>>` / `<<<TRANSLATION_END_{id}>>>` frame of
 * each expected passage. Payloads are taken verbatim; only the single
 * newline each delimiter contributes on its own side is dropped, never
 * any other whitespace. When the primary parse recovers nothing, a
 * fallback splits the raw response on blank lines. Count mismatches are
 * reconciled by padding with a placeholder or trimming extras, logged,
 * and never fail the batch.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Placeholder inserted for a passage the response never produced
pub const MISSING_PLACEHOLDER: &str = "[Translation missing]";

/// Properly closed delimiter fragments the model may have echoed into a
/// payload, plus malformed `<<<…` runs that never close
static DELIMITER_FRAGMENTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<<<[^>]*?>>>|<<<\S*").expect("delimiter fragment regex"));

/// `<think>…</think>` reasoning artifacts, case-insensitive, spanning newlines
static THINK_BLOCKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<think>.*?</think>|</?think>").expect("think block regex"));

/// Accidental sentinel tags; only the applier may write these
static SENTINEL_TAGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</?untranslated>").expect("sentinel tag regex"));

/// Opening frame for passage `id`
pub fn delimiter_open(id: usize) -> String {
    format!("<<<TRANSLATION_START_{id}>>>")
}

/// Closing frame for passage `id`
pub fn delimiter_close(id: usize) -> String {
    format!("<<<TRANSLATION_END_{id}>>>")
}

/// Extract `expected` translations from a batch response.
///
/// Returns exactly `expected` strings; positions the response did not
/// cover hold `MISSING_PLACEHOLDER`. Diagnostics go into `logs`.
pub fn parse_batch_response(response: &str, expected: usize, logs: &mut Vec<String>) -> Vec<String> {
    if expected == 0 {
        return Vec::new();
    }

    let mut found: Vec<Option<String>> = Vec::with_capacity(expected);
    for id in 1..=expected {
        match extract_frame(response, id) {
            Some(payload) => {
                logs.push(format!(
                    "[DELIMITER] Extracted translation {id} ({} chars)",
                    payload.len()
                ));
                found.push(Some(payload));
            }
            None => {
                logs.push(format!("[WARNING] Could not find delimiter for translation {id}"));
                found.push(None);
            }
        }
    }

    let found_count = found.iter().flatten().count();
    if found_count == 0 {
        // Frames are gone entirely; blank-line blocks are the best guess
        logs.push("[FALLBACK] No delimiters found, splitting response on blank lines".to_string());
        let mut blocks = split_on_blank_lines(response);
        if blocks.len() > expected {
            logs.push(format!(
                "[WARNING] Fallback produced {} blocks for {} passages, trimming extras",
                blocks.len(),
                expected
            ));
            blocks.truncate(expected);
        }
        while blocks.len() < expected {
            blocks.push(MISSING_PLACEHOLDER.to_string());
        }
        return blocks;
    }

    if found_count < expected {
        logs.push(format!(
            "[WARNING] Expected {expected} translations, got {found_count}; padding the rest"
        ));
    }

    found
        .into_iter()
        .map(|t| t.unwrap_or_else(|| MISSING_PLACEHOLDER.to_string()))
        .collect()
}

/// Payload between the frame pair of one passage, or `None`
fn extract_frame(response: &str, id: usize) -> Option<String> {
    let open = delimiter_open(id);
    let close = delimiter_close(id);

    let start = response.find(&open)? + open.len();
    let end_rel = response[start..].find(&close)?;
    let mut payload = &response[start..start + end_rel];

    // Each delimiter sits on its own line; drop only the newline it adds
    if let Some(stripped) = payload.strip_prefix('\n') {
        payload = stripped;
    }
    if let Some(stripped) = payload.strip_suffix('\n') {
        payload = stripped;
    }
    Some(payload.to_string())
}

/// Fallback: blank-line separated blocks that do not look like protocol noise
fn split_on_blank_lines(response: &str) -> Vec<String> {
    response
        .split("\n\n")
        .filter(|block| !block.trim().is_empty())
        .filter(|block| !block.trim_start().starts_with("<<<"))
        .filter(|block| !block.trim_start().starts_with('{'))
        .map(str::to_string)
        .collect()
}

/// Remove model artifacts from a translation while preserving all
/// other whitespace. Never trims.
pub fn sanitize_translation(text: &str) -> String {
    let without_think = THINK_BLOCKS.replace_all(text, "");
    let without_sentinels = SENTINEL_TAGS.replace_all(&without_think, "");
    DELIMITER_FRAGMENTS
        .replace_all(&without_sentinels, "")
        .into_owned()
}
