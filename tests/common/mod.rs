/*!
 * Common test utilities for the doctran test suite
 */

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

// Re-export the mock clients module
pub mod mock_clients;

/// One run of a test paragraph
#[derive(Clone, Debug, Default)]
pub struct TestRun {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

/// One paragraph of a test document
#[derive(Clone, Debug, Default)]
pub struct TestParagraph {
    pub runs: Vec<TestRun>,
    /// Style id referencing the built-in test style table
    pub style: Option<String>,
    pub alignment: Option<String>,
}

/// A plain run
pub fn run(text: &str) -> TestRun {
    TestRun {
        text: text.to_string(),
        ..Default::default()
    }
}

/// A bold run
pub fn bold(text: &str) -> TestRun {
    TestRun {
        text: text.to_string(),
        bold: true,
        ..Default::default()
    }
}

/// An italic run
pub fn italic(text: &str) -> TestRun {
    TestRun {
        text: text.to_string(),
        italic: true,
        ..Default::default()
    }
}

/// A single-run paragraph
pub fn para(text: &str) -> TestParagraph {
    TestParagraph {
        runs: vec![run(text)],
        ..Default::default()
    }
}

/// A paragraph with explicit runs
pub fn para_with_runs(runs: Vec<TestRun>) -> TestParagraph {
    TestParagraph {
        runs,
        ..Default::default()
    }
}

/// A single-run paragraph with a style id (e.g. "Heading1")
pub fn para_with_style(text: &str, style: &str) -> TestParagraph {
    TestParagraph {
        runs: vec![run(text)],
        style: Some(style.to_string()),
        ..Default::default()
    }
}

/// Build a minimal but valid DOCX from test paragraphs
pub fn build_docx(paragraphs: &[TestParagraph]) -> Vec<u8> {
    let document_xml = build_document_xml(paragraphs);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let opts = SimpleFileOptions::default();

    writer.start_file("[Content_Types].xml", opts).unwrap();
    writer
        .write_all(
            br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/></Types>"#,
        )
        .unwrap();

    writer.start_file("_rels/.rels", opts).unwrap();
    writer
        .write_all(
            br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#,
        )
        .unwrap();

    writer.start_file("word/styles.xml", opts).unwrap();
    writer
        .write_all(
            br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:style w:type="paragraph" w:styleId="Normal"><w:name w:val="Normal"/></w:style><w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/></w:style><w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/></w:style></w:styles>"#,
        )
        .unwrap();

    writer.start_file("word/document.xml", opts).unwrap();
    writer.write_all(document_xml.as_bytes()).unwrap();

    writer.finish().unwrap().into_inner()
}

fn build_document_xml(paragraphs: &[TestParagraph]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#,
    );
    for para in paragraphs {
        xml.push_str("<w:p>");
        if para.style.is_some() || para.alignment.is_some() {
            xml.push_str("<w:pPr>");
            if let Some(style) = &para.style {
                xml.push_str(&format!(r#"<w:pStyle w:val="{style}"/>"#));
            }
            if let Some(alignment) = &para.alignment {
                xml.push_str(&format!(r#"<w:jc w:val="{alignment}"/>"#));
            }
            xml.push_str("</w:pPr>");
        }
        for run in &para.runs {
            xml.push_str("<w:r>");
            if run.bold || run.italic || run.underline {
                xml.push_str("<w:rPr>");
                if run.bold {
                    xml.push_str("<w:b/>");
                }
                if run.italic {
                    xml.push_str("<w:i/>");
                }
                if run.underline {
                    xml.push_str(r#"<w:u w:val="single"/>"#);
                }
                xml.push_str("</w:rPr>");
            }
            xml.push_str(&run_content_xml(&run.text));
            xml.push_str("</w:r>");
        }
        xml.push_str("</w:p>");
    }
    xml.push_str("</w:body></w:document>");
    xml
}

/// Translate run text into w:t/w:tab/w:br content, mirroring how Word
/// authors it
fn run_content_xml(text: &str) -> String {
    let mut xml = String::new();
    let mut chunk = String::new();
    let flush = |chunk: &mut String, xml: &mut String| {
        if chunk.is_empty() {
            return;
        }
        xml.push_str(r#"<w:t xml:space="preserve">"#);
        xml.push_str(&escape_xml(chunk));
        xml.push_str("</w:t>");
        chunk.clear();
    };
    for ch in text.chars() {
        match ch {
            '\t' => {
                flush(&mut chunk, &mut xml);
                xml.push_str("<w:tab/>");
            }
            '\n' => {
                flush(&mut chunk, &mut xml);
                xml.push_str("<w:br/>");
            }
            _ => chunk.push(ch),
        }
    }
    flush(&mut chunk, &mut xml);
    xml
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
