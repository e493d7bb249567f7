/*!
 * Tests for the adaptive batch planner
 */

use doctran::app_config::EngineConfig;
use doctran::document::load_document;
use doctran::filter::filter_document;
use doctran::planner::{analyze_paragraph, plan_batches};

use crate::common::{bold, build_docx, italic, para, para_with_runs, run, TestParagraph};

fn small_target_config(target: usize) -> EngineConfig {
    EngineConfig {
        token_target_simple: target,
        token_target_moderate: target,
        token_target_complex: target,
        ..Default::default()
    }
}

fn prose(n: usize) -> Vec<TestParagraph> {
    (0..n)
        .map(|i| para(&format!("Plain prose paragraph number {i} with a bit of filler text.")))
        .collect()
}

#[test]
fn test_plan_batches_shouldCoverEveryFilteredParagraphExactlyOnce() {
    let docx = build_docx(&prose(37));
    let mut doc = load_document(&docx).unwrap();
    let filtered = filter_document(&mut doc);

    let batches = plan_batches(&doc, &filtered, &small_target_config(50));

    let covered: Vec<usize> = batches
        .iter()
        .flat_map(|b| b.members.iter().map(|m| m.index))
        .collect();
    let expected: Vec<usize> = filtered.iter().map(|f| f.index).collect();
    assert_eq!(covered, expected);
}

#[test]
fn test_plan_batches_withTrailingPartialBatch_shouldEmitIt() {
    // Paragraph tokens never divide the target evenly, so the last
    // paragraph always lands in a trailing partial batch
    let docx = build_docx(&prose(11));
    let mut doc = load_document(&docx).unwrap();
    let filtered = filter_document(&mut doc);
    let last_index = filtered.last().unwrap().index;

    let batches = plan_batches(&doc, &filtered, &small_target_config(40));

    assert!(!batches.is_empty());
    let final_batch = batches.last().unwrap();
    assert!(final_batch.members.iter().any(|m| m.index == last_index));
}

#[test]
fn test_plan_batches_withOversizedParagraph_shouldFormSingletonBatch() {
    let huge = "word ".repeat(400);
    let docx = build_docx(&[
        para("A small opener paragraph."),
        para(&huge),
        para("A small closer paragraph."),
    ]);
    let mut doc = load_document(&docx).unwrap();
    let filtered = filter_document(&mut doc);

    let batches = plan_batches(&doc, &filtered, &small_target_config(50));

    let singleton = batches
        .iter()
        .find(|b| b.members.iter().any(|m| m.text == huge))
        .unwrap();
    assert_eq!(singleton.members.len(), 1);
}

#[test]
fn test_plan_batches_withSimpleProse_shouldUseStandardPath() {
    let docx = build_docx(&prose(20));
    let mut doc = load_document(&docx).unwrap();
    let filtered = filter_document(&mut doc);

    let batches = plan_batches(&doc, &filtered, &EngineConfig::default());

    assert_eq!(batches.len(), 1);
    assert!(!batches[0].use_robust);
}

#[test]
fn test_plan_batches_withDenseRuns_shouldUpgradeToRobust() {
    // Single-run texts keep the section SIMPLE in aggregate is not
    // possible here: every paragraph carries three runs, so the batch
    // itself is dense enough for the per-batch upgrade
    let paragraphs: Vec<TestParagraph> = (0..10)
        .map(|i| {
            para_with_runs(vec![
                bold(&format!("Heading piece {i} ")),
                run("with plain middle text and "),
                italic("an italic tail."),
            ])
        })
        .collect();
    let docx = build_docx(&paragraphs);
    let mut doc = load_document(&docx).unwrap();
    let filtered = filter_document(&mut doc);

    let batches = plan_batches(&doc, &filtered, &EngineConfig::default());

    assert!(batches.iter().all(|b| b.use_robust));
}

#[test]
fn test_plan_batches_shouldBeDeterministic() {
    let docx = build_docx(&prose(25));
    let mut doc = load_document(&docx).unwrap();
    let filtered = filter_document(&mut doc);
    let config = small_target_config(60);

    let first = plan_batches(&doc, &filtered, &config);
    let second = plan_batches(&doc, &filtered, &config);

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.use_robust, b.use_robust);
        assert_eq!(a.estimated_tokens, b.estimated_tokens);
        let a_members: Vec<usize> = a.members.iter().map(|m| m.index).collect();
        let b_members: Vec<usize> = b.members.iter().map(|m| m.index).collect();
        assert_eq!(a_members, b_members);
    }
}

#[test]
fn test_plan_batches_withEmptyInput_shouldProduceNoBatches() {
    let docx = build_docx(&[]);
    let mut doc = load_document(&docx).unwrap();
    let filtered = filter_document(&mut doc);

    let batches = plan_batches(&doc, &filtered, &EngineConfig::default());

    assert!(batches.is_empty());
}

#[test]
fn test_analyze_paragraph_withManyRunsAndEmphasis_shouldScoreComplex() {
    let docx = build_docx(&[para_with_runs(vec![
        bold("Bold start "),
        italic("italic middle "),
        run("plain end"),
    ])]);
    let doc = load_document(&docx).unwrap();

    let complexity = analyze_paragraph(&doc.paragraphs[0], &doc.paragraphs[0].text());

    // +3 for more than two runs, +2 for two emphasized runs
    assert_eq!(complexity.score, 5);
    assert!(complexity.is_complex);
    assert!(complexity.has_inline_formatting);
    assert_eq!(complexity.run_count, 3);
}

#[test]
fn test_analyze_paragraph_withIndentation_shouldAddWhitespaceScore() {
    let docx = build_docx(&[para("    deeply indented verse")]);
    let doc = load_document(&docx).unwrap();

    let complexity = analyze_paragraph(&doc.paragraphs[0], &doc.paragraphs[0].text());

    assert_eq!(complexity.score, 2);
    assert!(!complexity.is_complex);
}
