/*!
 * Run marker protocol for the robust (format-preserving) path.
 *
 * Each run of a paragraph is rendered as
 * `««RUN{r}:{FLAGS}»»text««/RUN{r}»»` where `r` is the run index within
 * the paragraph and FLAGS is a compact comma-separated encoding of the
 * active attributes (`B`, `I`, `U`, `S`, `SUB`, `SUP`, `AC`, `SC`,
 * `F:Font_Name`, `SZ:14`, `C:FF0000`, `H:yellow`) or `PLAIN` when the
 * run has none. The model is instructed to keep the markers verbatim
 * and translate only the text between them.
 *
 * Decoding uses plain substring scanning: the markers are fixed
 * literals and survive naive search even inside noisy responses.
 */

use crate::document::{Paragraph, Run, RunProperties};

/// Opening guillemet pair of a marker
pub const MARKER_OPEN: &str = "««";
/// Closing guillemet pair of a marker
pub const MARKER_CLOSE: &str = "»»";

/// Snapshot of a run's formatting plus its original text, captured on
/// the robust path before the batch leaves for the provider
#[derive(Clone, Debug)]
pub struct RunFormatting {
    pub props: RunProperties,
    pub original_text: String,
}

impl RunFormatting {
    /// Capture a run's current state
    pub fn capture(run: &Run) -> Self {
        Self {
            props: run.props.clone(),
            original_text: run.text.clone(),
        }
    }

    /// Compact flag string for the marker, `PLAIN` when nothing is set
    pub fn flags(&self) -> String {
        let p = &self.props;
        let mut flags: Vec<String> = Vec::new();
        if p.bold == Some(true) {
            flags.push("B".to_string());
        }
        if p.italic == Some(true) {
            flags.push("I".to_string());
        }
        if p.is_underlined() {
            flags.push("U".to_string());
        }
        if p.strike == Some(true) {
            flags.push("S".to_string());
        }
        if p.subscript == Some(true) {
            flags.push("SUB".to_string());
        }
        if p.superscript == Some(true) {
            flags.push("SUP".to_string());
        }
        if p.all_caps == Some(true) {
            flags.push("AC".to_string());
        }
        if p.small_caps == Some(true) {
            flags.push("SC".to_string());
        }
        if let Some(font) = &p.font {
            flags.push(format!("F:{}", font.replace(' ', "_")));
        }
        if let Some(pt) = p.size_points() {
            if pt.fract() == 0.0 {
                flags.push(format!("SZ:{}", pt as u32));
            } else {
                flags.push(format!("SZ:{}", pt));
            }
        }
        if let Some(color) = &p.color {
            if color != "auto" {
                flags.push(format!("C:{}", color));
            }
        }
        if let Some(highlight) = &p.highlight {
            flags.push(format!("H:{}", highlight));
        }
        if flags.is_empty() {
            "PLAIN".to_string()
        } else {
            flags.join(",")
        }
    }
}

/// Render a paragraph's runs as marker-wrapped text for the prompt
pub fn marked_paragraph_text(para: &Paragraph) -> String {
    let mut out = String::new();
    for (r, run) in para.runs.iter().enumerate() {
        let snapshot = RunFormatting::capture(run);
        out.push_str(&format!(
            "{MARKER_OPEN}RUN{r}:{}{MARKER_CLOSE}{}{MARKER_OPEN}/RUN{r}{MARKER_CLOSE}",
            snapshot.flags(),
            run.text
        ));
    }
    out
}

/// Decode a marker-wrapped translation payload into a
/// `{run index → translated text}` table, in appearance order.
///
/// Tolerates noise around and between markers; a marker whose closing
/// pair never appears is skipped. Stray markers inside a recovered text
/// segment are removed.
pub fn parse_marked_translation(payload: &str) -> Vec<(usize, String)> {
    let open_prefix = format!("{MARKER_OPEN}RUN");
    let mut table: Vec<(usize, String)> = Vec::new();
    let mut cursor = 0usize;

    while let Some(rel) = payload[cursor..].find(&open_prefix) {
        let digits_start = cursor + rel + open_prefix.len();
        let after = &payload[digits_start..];
        let digit_len = after.bytes().take_while(u8::is_ascii_digit).count();
        if digit_len == 0 {
            cursor = digits_start;
            continue;
        }
        let Ok(index) = after[..digit_len].parse::<usize>() else {
            cursor = digits_start;
            continue;
        };
        let after_digits = &after[digit_len..];
        if !after_digits.starts_with(':') {
            cursor = digits_start;
            continue;
        }
        let Some(flags_end) = after_digits.find(MARKER_CLOSE) else {
            break;
        };
        let text_start = digits_start + digit_len + flags_end + MARKER_CLOSE.len();
        let close_marker = format!("{MARKER_OPEN}/RUN{index}{MARKER_CLOSE}");
        let Some(close_rel) = payload[text_start..].find(&close_marker) else {
            cursor = text_start;
            continue;
        };
        let text = &payload[text_start..text_start + close_rel];
        table.push((index, strip_markers(text)));
        cursor = text_start + close_rel + close_marker.len();
    }

    table
}

/// Remove every `««…»»` marker sequence from the text
pub fn strip_markers(text: &str) -> String {
    let mut out = String::new();
    let mut cursor = 0usize;
    while let Some(rel) = text[cursor..].find(MARKER_OPEN) {
        let open = cursor + rel;
        out.push_str(&text[cursor..open]);
        match text[open + MARKER_OPEN.len()..].find(MARKER_CLOSE) {
            Some(close_rel) => {
                cursor = open + MARKER_OPEN.len() + close_rel + MARKER_CLOSE.len();
            }
            None => {
                // Unterminated marker: drop the guillemets, keep the rest
                cursor = open + MARKER_OPEN.len();
            }
        }
    }
    out.push_str(&text[cursor..]);
    out
}
