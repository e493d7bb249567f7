/*!
 * Tests for DOCX loading and serialization
 */

use doctran::document::{load_document, serialize_document};

use crate::common::{bold, build_docx, italic, para, para_with_runs, para_with_style, run};

#[test]
fn test_load_document_withEmptyDocument_shouldSucceed() {
    let docx = build_docx(&[]);
    let doc = load_document(&docx).unwrap();
    assert_eq!(doc.paragraph_count(), 0);
}

#[test]
fn test_load_document_withCorruptBytes_shouldError() {
    assert!(load_document(b"definitely not a zip archive").is_err());
}

#[test]
fn test_load_document_shouldExposeRawTextWithWhitespace() {
    let docx = build_docx(&[para("    line one\n        line two")]);
    let doc = load_document(&docx).unwrap();

    assert_eq!(doc.paragraphs[0].text(), "    line one\n        line two");
}

#[test]
fn test_load_document_shouldMapTabsAndBreaks() {
    let docx = build_docx(&[para("col1\tcol2\nnext line")]);
    let doc = load_document(&docx).unwrap();

    assert_eq!(doc.paragraphs[0].text(), "col1\tcol2\nnext line");
}

#[test]
fn test_load_document_shouldReadRunFormatting() {
    let docx = build_docx(&[para_with_runs(vec![
        bold("Welcome!"),
        run(" Here we have "),
        italic("italic text"),
    ])]);
    let doc = load_document(&docx).unwrap();

    let runs = &doc.paragraphs[0].runs;
    assert_eq!(runs.len(), 3);
    assert_eq!(runs[0].props.bold, Some(true));
    assert_eq!(runs[1].props.bold, None);
    assert_eq!(runs[2].props.italic, Some(true));
    assert_eq!(runs[0].text, "Welcome!");
    assert_eq!(runs[1].text, " Here we have ");
}

#[test]
fn test_load_document_shouldResolveStyleNames() {
    let docx = build_docx(&[para_with_style("Chapter One", "Heading1")]);
    let doc = load_document(&docx).unwrap();

    assert_eq!(doc.paragraphs[0].style.as_deref(), Some("heading 1"));
    assert!(doc.paragraphs[0].is_heading());
}

#[test]
fn test_roundtrip_withoutMutation_shouldPreserveEverything() {
    let docx = build_docx(&[
        para_with_style("Chapter One", "Heading1"),
        para("Body text with some content."),
        para_with_runs(vec![bold("Bold"), run(" and plain")]),
    ]);
    let doc = load_document(&docx).unwrap();
    let output = serialize_document(&doc).unwrap();
    let reloaded = load_document(&output).unwrap();

    assert_eq!(reloaded.paragraph_count(), 3);
    assert_eq!(reloaded.paragraphs[0].text(), "Chapter One");
    assert_eq!(reloaded.paragraphs[0].style.as_deref(), Some("heading 1"));
    assert_eq!(reloaded.paragraphs[1].text(), "Body text with some content.");
    assert_eq!(reloaded.paragraphs[2].runs[0].props.bold, Some(true));
}

#[test]
fn test_roundtrip_withRewrittenRun_shouldCarryNewText() {
    let docx = build_docx(&[para("Hello world.")]);
    let mut doc = load_document(&docx).unwrap();

    doc.paragraphs[0].runs[0].set_text("Hola mundo.");

    let output = serialize_document(&doc).unwrap();
    let reloaded = load_document(&output).unwrap();
    assert_eq!(reloaded.paragraphs[0].text(), "Hola mundo.");
}

#[test]
fn test_roundtrip_withWhitespaceHeavyRewrite_shouldPreserveExactly() {
    let docx = build_docx(&[para("placeholder")]);
    let mut doc = load_document(&docx).unwrap();

    doc.paragraphs[0].runs[0].set_text("    línea uno\n        línea dos\tfin  ");

    let output = serialize_document(&doc).unwrap();
    let reloaded = load_document(&output).unwrap();
    assert_eq!(
        reloaded.paragraphs[0].text(),
        "    línea uno\n        línea dos\tfin  "
    );
}

#[test]
fn test_roundtrip_withRewrittenRun_shouldKeepFormatting() {
    let docx = build_docx(&[para_with_runs(vec![bold("Bold text"), run(" plain tail")])]);
    let mut doc = load_document(&docx).unwrap();

    doc.paragraphs[0].runs[0].set_text("Texto en negrita");

    let output = serialize_document(&doc).unwrap();
    let reloaded = load_document(&output).unwrap();
    assert_eq!(reloaded.paragraphs[0].runs[0].props.bold, Some(true));
    assert_eq!(reloaded.paragraphs[0].runs[0].text, "Texto en negrita");
    assert_eq!(reloaded.paragraphs[0].runs[1].text, " plain tail");
}

#[test]
fn test_roundtrip_withRemovedParagraph_shouldDropIt() {
    let docx = build_docx(&[para("A"), para("Brave new world.")]);
    let mut doc = load_document(&docx).unwrap();

    doctran::filter::filter_document(&mut doc);

    let output = serialize_document(&doc).unwrap();
    let reloaded = load_document(&output).unwrap();
    assert_eq!(reloaded.paragraph_count(), 1);
    assert_eq!(reloaded.paragraphs[0].text(), "Brave new world.");
}

#[test]
fn test_roundtrip_shouldPreserveParagraphProperties() {
    let mut styled = para("Centered text paragraph.");
    styled.alignment = Some("center".to_string());
    let docx = build_docx(&[styled]);
    let mut doc = load_document(&docx).unwrap();

    doc.paragraphs[0].runs[0].set_text("Párrafo centrado.");

    let output = serialize_document(&doc).unwrap();
    let reloaded = load_document(&output).unwrap();
    assert_eq!(reloaded.paragraphs[0].alignment.as_deref(), Some("center"));
}
