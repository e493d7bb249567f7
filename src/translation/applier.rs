/*!
 * Applier: writes batch results back into the document.
 *
 * Consumes `BatchResult`s strictly in batch-index order and mutates the
 * paragraph tree in place. The standard path clears every run and puts
 * the whole translation into the first one; the robust path rewrites
 * each run from the recovered marker table, keeping all formatting.
 * Members of a failed batch keep their source text, wrapped in
 * `<untranslated>` sentinels so the user can search for them. Nothing
 * in here ever trims payload text: leading and trailing whitespace is
 * meaningful (poetry indentation).
 */

use log::warn;

use crate::document::Document;
use crate::filter::FilteredParagraph;
use crate::planner::Batch;

use super::executor::BatchResult;
use super::markers::strip_markers;
use super::response::{sanitize_translation, MISSING_PLACEHOLDER};

/// Sentinel written before the first run's text of a failed paragraph
pub const UNTRANSLATED_OPEN: &str = "<untranslated>";
/// Sentinel written after the last run's text of a failed paragraph
pub const UNTRANSLATED_CLOSE: &str = "</untranslated>";

/// Apply all batch results to the document, in order.
///
/// Returns the per-paragraph output texts for the plaintext preview.
pub fn apply_results(
    doc: &mut Document,
    batches: &[Batch],
    results: &[BatchResult],
    logs: &mut Vec<String>,
) -> Vec<String> {
    let mut preview = Vec::new();

    for (batch, result) in batches.iter().zip(results.iter()) {
        if result.failed {
            logs.push(format!(
                "[FAILED BATCH] Batch {} failed - wrapping {} paragraphs with untranslated sentinels",
                batch.id + 1,
                batch.members.len()
            ));
            for member in &batch.members {
                preview.push(wrap_untranslated(doc, member, logs));
            }
            continue;
        }

        logs.push(format!(
            "[BATCH {}] Applying {} translations ({})",
            batch.id + 1,
            result.translations.len(),
            if batch.use_robust { "robust" } else { "standard" }
        ));

        for (i, member) in batch.members.iter().enumerate() {
            let payload = &result.translations[i];

            if payload == MISSING_PLACEHOLDER {
                logs.push(format!(
                    "[WARNING] Paragraph {}: translation missing, wrapping with untranslated sentinels",
                    member.index
                ));
                preview.push(wrap_untranslated(doc, member, logs));
                continue;
            }

            if batch.use_robust {
                let original_runs = doc.paragraphs[member.index].runs.len();
                match result.run_tables.get(i).and_then(|t| t.as_ref()) {
                    Some(table) if table.len() == original_runs => {
                        apply_robust(doc, member.index, table);
                        preview.push(strip_markers(&sanitize_translation(payload)));
                        continue;
                    }
                    _ => {
                        logs.push(format!(
                            "[WARNING] Paragraph {}: marker recovery failed, falling back to standard replacement",
                            member.index
                        ));
                    }
                }
            }

            let text = strip_markers(&sanitize_translation(payload));
            apply_standard(doc, member.index, &text, logs);
            preview.push(text);
        }
    }

    preview
}

/// Standard path: whole translation into the first run, the rest cleared
fn apply_standard(doc: &mut Document, index: usize, text: &str, logs: &mut Vec<String>) {
    let para = &mut doc.paragraphs[index];
    if para.runs.is_empty() {
        warn!("paragraph {} has no runs, cannot apply translation", index);
        logs.push(format!(
            "[WARNING] Paragraph {index} has no runs, translation dropped"
        ));
        return;
    }
    for run in para.runs.iter_mut() {
        run.set_text("");
    }
    para.runs[0].set_text(text);
}

/// Robust path: rewrite each run from the recovered marker table
fn apply_robust(doc: &mut Document, index: usize, table: &[(usize, String)]) {
    let para = &mut doc.paragraphs[index];
    for run in para.runs.iter_mut() {
        run.set_text("");
    }
    for (r, text) in table {
        if let Some(run) = para.runs.get_mut(*r) {
            run.set_text(text.clone());
        }
    }
}

/// Failed path: sentinel-wrap the paragraph's existing text in place
fn wrap_untranslated(doc: &mut Document, member: &FilteredParagraph, logs: &mut Vec<String>) -> String {
    let para = &mut doc.paragraphs[member.index];
    if para.runs.is_empty() {
        logs.push(format!(
            "[WARNING] Paragraph {} has no runs, cannot wrap with sentinels",
            member.index
        ));
        return format!("{UNTRANSLATED_OPEN}{}{UNTRANSLATED_CLOSE}", member.text);
    }

    if para.runs.len() == 1 {
        logs.push(format!(
            "[INFO] Paragraph {}: single run carries both untranslated sentinels",
            member.index
        ));
    }

    let first_text = format!("{UNTRANSLATED_OPEN}{}", para.runs[0].text);
    para.runs[0].set_text(first_text);
    let last = para.runs.len() - 1;
    let last_text = format!("{}{UNTRANSLATED_CLOSE}", para.runs[last].text);
    para.runs[last].set_text(last_text);

    format!("{UNTRANSLATED_OPEN}{}{UNTRANSLATED_CLOSE}", member.text)
}
