/*!
 * Tests for the paragraph filter rules
 */

use doctran::document::load_document;
use doctran::filter::filter_document;

use crate::common::{build_docx, para, para_with_style};

#[test]
fn test_filter_withOrphanLetter_shouldRemoveParagraphPhysically() {
    let docx = build_docx(&[para("A"), para("Brief history of something.")]);
    let mut doc = load_document(&docx).unwrap();

    let filtered = filter_document(&mut doc);

    assert!(doc.paragraphs[0].is_removed());
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].index, 1);
    assert_eq!(filtered[0].text, "Brief history of something.");
}

#[test]
fn test_filter_withOrphanLetterBeforeLowercase_shouldKeepParagraph() {
    let docx = build_docx(&[para("A"), para("quiet afternoon passed.")]);
    let mut doc = load_document(&docx).unwrap();

    let filtered = filter_document(&mut doc);

    assert!(!doc.paragraphs[0].is_removed());
    // "A" survives rule 1 and rule 2, and rule 3 keeps it as all-uppercase
    assert_eq!(filtered.len(), 2);
}

#[test]
fn test_filter_withEmptyAndDecorative_shouldSkipButNotRemove() {
    let docx = build_docx(&[
        para(""),
        para("   "),
        para("***---***"),
        para("A real sentence to keep."),
    ]);
    let mut doc = load_document(&docx).unwrap();

    let filtered = filter_document(&mut doc);

    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].index, 3);
    assert!(doc.paragraphs.iter().all(|p| !p.is_removed()));
}

#[test]
fn test_filter_withSingleWord_shouldSkipUnlessUppercaseOrHeading() {
    let docx = build_docx(&[
        para("lonely"),
        para("PROLOGUE"),
        para_with_style("Introduction", "Heading1"),
        para("Two words here."),
    ]);
    let mut doc = load_document(&docx).unwrap();

    let filtered = filter_document(&mut doc);

    let kept: Vec<usize> = filtered.iter().map(|f| f.index).collect();
    assert_eq!(kept, vec![1, 2, 3]);
}

#[test]
fn test_filter_shouldPreserveLeadingWhitespaceInText() {
    let docx = build_docx(&[para("    indented poetry line")]);
    let mut doc = load_document(&docx).unwrap();

    let filtered = filter_document(&mut doc);

    assert_eq!(filtered[0].text, "    indented poetry line");
}

#[test]
fn test_filter_shouldBeIdempotent() {
    let docx = build_docx(&[
        para("A"),
        para("Brave new paragraph."),
        para("***"),
        para("Another fine paragraph."),
    ]);
    let mut doc = load_document(&docx).unwrap();

    let first: Vec<(usize, String)> = filter_document(&mut doc)
        .into_iter()
        .map(|f| (f.index, f.text))
        .collect();
    let second: Vec<(usize, String)> = filter_document(&mut doc)
        .into_iter()
        .map(|f| (f.index, f.text))
        .collect();

    assert_eq!(first, second);
}
