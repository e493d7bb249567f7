/*!
 * Adaptive token-budget batch planner.
 *
 * Walks the filtered paragraph stream and groups contiguous paragraphs
 * into batches sized by a token budget that adapts to upcoming content.
 * At each batch boundary the next `window_size` paragraphs are scored
 * for complexity; the resulting section class picks the token target
 * and whether the batch takes the robust (format-marker) path. A
 * just-formed batch can still upgrade itself to robust when its own run
 * density is high, so a locally dense batch inside a simple section is
 * not mis-handled.
 *
 * Paragraphs are never split; a paragraph bigger than the whole budget
 * becomes a singleton batch. The trailing in-flight batch is always
 * emitted.
 */

use log::{debug, info};

use crate::app_config::EngineConfig;
use crate::document::{Document, Paragraph};
use crate::filter::FilteredParagraph;

/// A contiguous group of filtered paragraphs translated in one LLM call
#[derive(Clone, Debug)]
pub struct Batch {
    /// Zero-based batch index in filtered order
    pub id: usize,
    pub members: Vec<FilteredParagraph>,
    /// Whether the format-marker path is used for this batch
    pub use_robust: bool,
    pub estimated_tokens: usize,
}

/// Complexity facts about a single paragraph
#[derive(Clone, Copy, Debug)]
pub struct ParagraphComplexity {
    pub score: u32,
    pub is_complex: bool,
    pub has_inline_formatting: bool,
    pub run_count: usize,
}

/// Section classification for a look-ahead window
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SectionKind {
    Simple,
    Moderate,
    Complex,
}

/// Outcome of analyzing a look-ahead window
#[derive(Clone, Copy, Debug)]
pub struct SectionAnalysis {
    pub kind: SectionKind,
    pub token_target: usize,
    pub use_robust: bool,
    pub complex_ratio: f64,
    pub inline_ratio: f64,
}

/// Rough, conservative token estimate: one token per four bytes
pub fn estimate_tokens(text: &str) -> usize {
    text.len().div_ceil(4)
}

/// Score one paragraph's formatting complexity
pub fn analyze_paragraph(para: &Paragraph, text: &str) -> ParagraphComplexity {
    let run_count = para.runs.len();
    let mut score = 0u32;

    if run_count > 2 {
        score += 3;
    }

    let newline_count = text.matches('\n').count();
    let leading_whitespace = text.chars().take_while(|c| c.is_whitespace()).count();
    if newline_count > 2 || leading_whitespace > 2 {
        score += 2;
    }

    let emphasized_runs = para.runs.iter().filter(|r| r.props.has_emphasis()).count();
    if emphasized_runs > 1 {
        score += 2;
    }

    ParagraphComplexity {
        score,
        is_complex: score >= 3,
        has_inline_formatting: run_count > 1,
        run_count,
    }
}

/// Classify the upcoming window of filtered paragraphs
pub fn analyze_section(
    doc: &Document,
    filtered: &[FilteredParagraph],
    start: usize,
    config: &EngineConfig,
) -> SectionAnalysis {
    let end = (start + config.window_size).min(filtered.len());
    let window = &filtered[start..end];

    if window.is_empty() {
        return SectionAnalysis {
            kind: SectionKind::Simple,
            token_target: config.token_target_simple,
            use_robust: false,
            complex_ratio: 0.0,
            inline_ratio: 0.0,
        };
    }

    let mut complex_count = 0usize;
    let mut inline_count = 0usize;
    for fp in window {
        let complexity = analyze_paragraph(&doc.paragraphs[fp.index], &fp.text);
        if complexity.is_complex {
            complex_count += 1;
        }
        if complexity.has_inline_formatting {
            inline_count += 1;
        }
    }

    let total = window.len() as f64;
    let complex_ratio = complex_count as f64 / total;
    let inline_ratio = inline_count as f64 / total;

    let (kind, token_target, use_robust) = if complex_ratio > 0.4 || inline_ratio > 0.5 {
        (SectionKind::Complex, config.token_target_complex, true)
    } else if complex_ratio < 0.2 && inline_ratio < 0.3 {
        (SectionKind::Simple, config.token_target_simple, false)
    } else {
        (SectionKind::Moderate, config.token_target_moderate, true)
    };

    SectionAnalysis {
        kind,
        token_target,
        use_robust,
        complex_ratio,
        inline_ratio,
    }
}

/// Produce the ordered batch sequence for the filtered paragraphs
pub fn plan_batches(
    doc: &Document,
    filtered: &[FilteredParagraph],
    config: &EngineConfig,
) -> Vec<Batch> {
    let mut batches: Vec<Batch> = Vec::new();
    let mut current: Vec<FilteredParagraph> = Vec::new();
    let mut current_tokens = 0usize;
    let mut target = config.token_target_simple;
    let mut robust = false;

    for (pos, fp) in filtered.iter().enumerate() {
        if current.is_empty() {
            let section = analyze_section(doc, filtered, pos, config);
            target = section.token_target;
            robust = section.use_robust;
            debug!(
                "section at filtered #{}: {:?} (complex {:.0}%, inline {:.0}%), target {} tokens, robust {}",
                pos,
                section.kind,
                section.complex_ratio * 100.0,
                section.inline_ratio * 100.0,
                target,
                robust
            );
        }

        let para_tokens = estimate_tokens(&fp.text);
        if !current.is_empty() && current_tokens + para_tokens > target {
            finish_batch(doc, &mut batches, std::mem::take(&mut current), robust, current_tokens);
            current_tokens = 0;
            let section = analyze_section(doc, filtered, pos, config);
            target = section.token_target;
            robust = section.use_robust;
        }

        current.push(fp.clone());
        current_tokens += para_tokens;
    }

    // The trailing in-flight batch must always be emitted
    if !current.is_empty() {
        finish_batch(doc, &mut batches, current, robust, current_tokens);
    }

    let robust_count = batches.iter().filter(|b| b.use_robust).count();
    info!(
        "planner: {} batches over {} paragraphs ({} robust)",
        batches.len(),
        filtered.len(),
        robust_count
    );

    batches
}

/// Seal one batch, applying per-batch robust upgrade
fn finish_batch(
    doc: &Document,
    batches: &mut Vec<Batch>,
    members: Vec<FilteredParagraph>,
    section_robust: bool,
    estimated_tokens: usize,
) {
    let mut use_robust = section_robust;
    if !use_robust {
        let total_runs: usize = members
            .iter()
            .map(|m| doc.paragraphs[m.index].runs.len())
            .sum();
        let dense = members
            .iter()
            .filter(|m| doc.paragraphs[m.index].runs.len() > 2)
            .count();
        let avg_runs = total_runs as f64 / members.len() as f64;
        let dense_ratio = dense as f64 / members.len() as f64;
        if avg_runs > 2.5 || dense_ratio > 0.3 {
            use_robust = true;
            debug!(
                "batch {} upgraded to robust (avg runs {:.1}, dense ratio {:.2})",
                batches.len(),
                avg_runs,
                dense_ratio
            );
        }
    }

    batches.push(Batch {
        id: batches.len(),
        members,
        use_robust,
        estimated_tokens,
    });
}
