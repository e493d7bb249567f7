/*!
 * Paragraph filter: decides what is worth sending to the model.
 *
 * Three rules, applied in order:
 *
 * 1. A paragraph whose text is exactly one uppercase letter and whose
 *    immediate successor starts with an uppercase letter is a decorative
 *    initial; it is physically removed from the document.
 * 2. Paragraphs with no alphanumeric content (empty, whitespace-only or
 *    pure punctuation/symbols) are skipped.
 * 3. Paragraphs of at most one word are skipped unless the text is all
 *    uppercase or the style name begins with "heading".
 *
 * Skipped paragraphs stay in the document untranslated. Raw text is
 * carried through with every whitespace character intact.
 */

use log::debug;

use crate::document::Document;

/// A paragraph that survived filtering, by position index
#[derive(Clone, Debug)]
pub struct FilteredParagraph {
    /// Index into `Document::paragraphs`
    pub index: usize,
    /// Raw text, leading/trailing whitespace preserved
    pub text: String,
}

/// Filter the document's paragraphs, removing orphan letters in place
pub fn filter_document(doc: &mut Document) -> Vec<FilteredParagraph> {
    let texts: Vec<String> = doc.paragraphs.iter().map(|p| p.text()).collect();

    // Rule 1: orphan single-letter markers are removed, not just skipped
    let mut removed_count = 0usize;
    for i in 0..doc.paragraphs.len() {
        if doc.paragraphs[i].removed {
            continue;
        }
        if is_orphan_letter(&texts[i]) && next_starts_uppercase(&texts, i) {
            doc.paragraphs[i].removed = true;
            removed_count += 1;
            debug!("removed orphan letter paragraph at index {}", i);
        }
    }

    let mut kept = Vec::new();
    let mut skipped = 0usize;
    for (i, para) in doc.paragraphs.iter().enumerate() {
        if para.removed {
            continue;
        }
        let text = &texts[i];

        // Rule 2: nothing translatable in here
        if !has_meaningful_text(text) {
            skipped += 1;
            continue;
        }

        // Rule 3: lone words are usually labels, not prose
        let word_count = text.split_whitespace().count();
        if word_count <= 1 && !is_all_uppercase(text.trim()) && !para.is_heading() {
            skipped += 1;
            continue;
        }

        kept.push(FilteredParagraph {
            index: i,
            text: text.clone(),
        });
    }

    debug!(
        "filter: kept {} of {} paragraphs ({} removed, {} skipped)",
        kept.len(),
        doc.paragraphs.len(),
        removed_count,
        skipped
    );
    kept
}

/// Exactly one uppercase ASCII letter, no surrounding whitespace
fn is_orphan_letter(text: &str) -> bool {
    let mut chars = text.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_uppercase())
}

/// Whether the immediate following paragraph begins with an uppercase letter
fn next_starts_uppercase(texts: &[String], i: usize) -> bool {
    texts
        .get(i + 1)
        .and_then(|t| t.trim_start().chars().next())
        .map(|c| c.is_uppercase())
        .unwrap_or(false)
}

/// At least one alphanumeric character survives
fn has_meaningful_text(text: &str) -> bool {
    text.chars().any(|c| c.is_alphanumeric())
}

/// All cased characters are uppercase and at least one exists
fn is_all_uppercase(text: &str) -> bool {
    !text.chars().any(|c| c.is_lowercase()) && text.chars().any(|c| c.is_uppercase())
}
