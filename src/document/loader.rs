/*!
 * DOCX loader: byte stream in, paragraph/run model out.
 *
 * Walks the event stream of `word/document.xml` and materializes the
 * top-level paragraphs with their runs and formatting. Text is exposed
 * exactly as authored: `w:t` content untrimmed, `w:tab` as `\t`,
 * `w:br`/`w:cr` as `\n`. Style ids are resolved to style names through
 * `word/styles.xml` so heading detection can match on the display name.
 */

use std::collections::HashMap;

use log::debug;

use crate::errors::DocumentError;

use super::model::{Document, IndentProperties, Paragraph, Run, RunProperties, SpacingProperties};
use super::package::DocxPackage;
use super::xml::{parse_part, XmlEvent};

/// Package part holding the document body
pub const DOCUMENT_PART: &str = "word/document.xml";

/// Package part holding the style table
const STYLES_PART: &str = "word/styles.xml";

/// Parse a DOCX byte stream into a `Document`
pub fn load_document(bytes: &[u8]) -> Result<Document, DocumentError> {
    let package = DocxPackage::read(bytes)?;
    let doc_xml = package
        .part(DOCUMENT_PART)
        .ok_or(DocumentError::MissingDocumentPart)?;
    let events = parse_part(doc_xml).map_err(|e| DocumentError::MalformedXml {
        part: DOCUMENT_PART.to_string(),
        message: e.to_string(),
    })?;

    let style_names = load_style_names(&package);
    let paragraphs = collect_paragraphs(&events, &style_names);
    debug!(
        "loaded document: {} paragraphs, {} styles",
        paragraphs.len(),
        style_names.len()
    );

    Ok(Document {
        package,
        events,
        paragraphs,
    })
}

/// Map style ids to display names from styles.xml; missing part is fine
fn load_style_names(package: &DocxPackage) -> HashMap<String, String> {
    let mut names = HashMap::new();
    let Some(bytes) = package.part(STYLES_PART) else {
        return names;
    };
    let Ok(events) = parse_part(bytes) else {
        return names;
    };
    let mut current_id: Option<String> = None;
    for ev in &events {
        match ev {
            XmlEvent::Start { name, .. } | XmlEvent::Empty { name, .. } if name == "w:style" => {
                current_id = ev.attr("w:styleId").map(str::to_string);
            }
            XmlEvent::Empty { name, .. } | XmlEvent::Start { name, .. } if name == "w:name" => {
                if let (Some(id), Some(val)) = (current_id.as_ref(), ev.attr("w:val")) {
                    names.insert(id.clone(), val.to_string());
                }
            }
            XmlEvent::End { name } if name == "w:style" => {
                current_id = None;
            }
            _ => {}
        }
    }
    names
}

/// Collect top-level body paragraphs (table content is left untouched)
fn collect_paragraphs(
    events: &[XmlEvent],
    style_names: &HashMap<String, String>,
) -> Vec<Paragraph> {
    let mut paragraphs = Vec::new();
    let mut i = 0;
    while i < events.len() {
        match &events[i] {
            XmlEvent::Start { name, .. } if name == "w:tbl" => {
                i = skip_subtree(events, i, "w:tbl");
            }
            XmlEvent::Start { name, .. } if name == "w:p" => {
                let (para, end) = parse_paragraph(events, i, style_names);
                paragraphs.push(para);
                i = end;
            }
            _ => {}
        }
        i += 1;
    }
    paragraphs
}

/// Parse one `w:p` starting at `start`; returns the paragraph and the
/// index of its End event
fn parse_paragraph(
    events: &[XmlEvent],
    start: usize,
    style_names: &HashMap<String, String>,
) -> (Paragraph, usize) {
    let mut style = None;
    let mut alignment = None;
    let mut indent = IndentProperties::default();
    let mut spacing = SpacingProperties::default();
    let mut runs = Vec::new();

    let mut i = start + 1;
    while i < events.len() {
        match &events[i] {
            XmlEvent::End { name } if name == "w:p" => break,
            XmlEvent::Start { name, .. } if name == "w:pPr" => {
                let end = skip_subtree(events, i, "w:pPr");
                parse_paragraph_properties(
                    &events[i..=end],
                    style_names,
                    &mut style,
                    &mut alignment,
                    &mut indent,
                    &mut spacing,
                );
                i = end;
            }
            XmlEvent::Start { name, .. } if name == "w:r" => {
                let (run, end) = parse_run(events, i);
                runs.push(run);
                i = end;
            }
            // Containers whose runs still belong to this paragraph
            XmlEvent::Start { name, .. }
                if name == "w:hyperlink" || name == "w:smartTag" || name == "w:ins" => {}
            // Anything else with children (drawings, text boxes) is opaque
            XmlEvent::Start { name, .. } => {
                let owned = name.clone();
                i = skip_subtree(events, i, &owned);
            }
            _ => {}
        }
        i += 1;
    }

    (
        Paragraph {
            span: (start, i),
            style,
            alignment,
            indent,
            spacing,
            runs,
            removed: false,
        },
        i,
    )
}

fn parse_paragraph_properties(
    ppr_events: &[XmlEvent],
    style_names: &HashMap<String, String>,
    style: &mut Option<String>,
    alignment: &mut Option<String>,
    indent: &mut IndentProperties,
    spacing: &mut SpacingProperties,
) {
    // The paragraph-mark run properties (`w:rPr` inside `w:pPr`) carry
    // character attributes with clashing element names; skip them
    let mut in_rpr = false;
    for ev in ppr_events {
        let name = match ev {
            XmlEvent::Start { name, .. } | XmlEvent::Empty { name, .. } => name.as_str(),
            XmlEvent::End { name } => {
                if name == "w:rPr" {
                    in_rpr = false;
                }
                continue;
            }
            _ => continue,
        };
        if name == "w:rPr" {
            if matches!(ev, XmlEvent::Start { .. }) {
                in_rpr = true;
            }
            continue;
        }
        if in_rpr {
            continue;
        }
        match name {
            "w:pStyle" => {
                if let Some(id) = ev.attr("w:val") {
                    *style = Some(
                        style_names
                            .get(id)
                            .cloned()
                            .unwrap_or_else(|| id.to_string()),
                    );
                }
            }
            "w:jc" => {
                *alignment = ev.attr("w:val").map(str::to_string);
            }
            "w:ind" => {
                indent.left = ev.attr("w:left").map(str::to_string);
                indent.right = ev.attr("w:right").map(str::to_string);
                indent.first_line = ev.attr("w:firstLine").map(str::to_string);
                indent.hanging = ev.attr("w:hanging").map(str::to_string);
            }
            "w:spacing" => {
                spacing.before = ev.attr("w:before").map(str::to_string);
                spacing.after = ev.attr("w:after").map(str::to_string);
                spacing.line = ev.attr("w:line").map(str::to_string);
            }
            _ => {}
        }
    }
}

/// Parse one `w:r` starting at `start`; returns the run and the index
/// of its End event
fn parse_run(events: &[XmlEvent], start: usize) -> (Run, usize) {
    let mut props = RunProperties::default();
    let mut rpr_span = None;
    let mut text = String::new();

    let mut i = start + 1;
    while i < events.len() {
        match &events[i] {
            XmlEvent::End { name } if name == "w:r" => break,
            XmlEvent::Start { name, .. } if name == "w:rPr" => {
                let end = skip_subtree(events, i, "w:rPr");
                parse_run_properties(&events[i..=end], &mut props);
                rpr_span = Some((i, end));
                i = end;
            }
            XmlEvent::Empty { name, .. } if name == "w:rPr" => {
                parse_run_properties(&events[i..=i], &mut props);
                rpr_span = Some((i, i));
            }
            XmlEvent::Start { name, .. } if name == "w:t" => {
                let end = skip_subtree(events, i, "w:t");
                for ev in &events[i..=end] {
                    if let XmlEvent::Text { text: t } = ev {
                        text.push_str(t);
                    }
                }
                i = end;
            }
            XmlEvent::Empty { name, .. } if name == "w:t" => {}
            XmlEvent::Start { name, .. } | XmlEvent::Empty { name, .. } if name == "w:tab" => {
                text.push('\t');
                if matches!(&events[i], XmlEvent::Start { .. }) {
                    i = skip_subtree(events, i, "w:tab");
                }
            }
            XmlEvent::Start { name, .. } | XmlEvent::Empty { name, .. }
                if name == "w:br" || name == "w:cr" =>
            {
                text.push('\n');
                if matches!(&events[i], XmlEvent::Start { .. }) {
                    let owned = name.clone();
                    i = skip_subtree(events, i, &owned);
                }
            }
            // Drawings, footnote refs and other non-text content are opaque
            XmlEvent::Start { name, .. } => {
                let owned = name.clone();
                i = skip_subtree(events, i, &owned);
            }
            _ => {}
        }
        i += 1;
    }

    (
        Run {
            span: (start, i),
            rpr_span,
            props,
            text,
            dirty: false,
        },
        i,
    )
}

fn parse_run_properties(rpr_events: &[XmlEvent], props: &mut RunProperties) {
    for ev in rpr_events {
        let name = match ev {
            XmlEvent::Start { name, .. } | XmlEvent::Empty { name, .. } => name.as_str(),
            _ => continue,
        };
        match name {
            "w:b" => props.bold = Some(on_off(ev.attr("w:val"))),
            "w:i" => props.italic = Some(on_off(ev.attr("w:val"))),
            "w:u" => {
                props.underline = Some(ev.attr("w:val").unwrap_or("single").to_string());
            }
            "w:strike" => props.strike = Some(on_off(ev.attr("w:val"))),
            "w:vertAlign" => match ev.attr("w:val") {
                Some("superscript") => props.superscript = Some(true),
                Some("subscript") => props.subscript = Some(true),
                _ => {
                    props.superscript = Some(false);
                    props.subscript = Some(false);
                }
            },
            "w:caps" => props.all_caps = Some(on_off(ev.attr("w:val"))),
            "w:smallCaps" => props.small_caps = Some(on_off(ev.attr("w:val"))),
            "w:rFonts" => {
                if let Some(f) = ev.attr("w:ascii") {
                    props.font = Some(f.to_string());
                }
            }
            "w:sz" => {
                props.size_half_points = ev.attr("w:val").and_then(|v| v.parse().ok());
            }
            "w:color" => props.color = ev.attr("w:val").map(str::to_string),
            "w:highlight" => props.highlight = ev.attr("w:val").map(str::to_string),
            _ => {}
        }
    }
}

/// Toggle-property value: absence of `w:val` means "on"
fn on_off(val: Option<&str>) -> bool {
    !matches!(val, Some("0") | Some("false") | Some("off"))
}

/// Index of the End event matching the Start at `start`, counting
/// same-name nesting. Returns `start` itself for Empty events.
fn skip_subtree(events: &[XmlEvent], start: usize, name: &str) -> usize {
    if matches!(&events[start], XmlEvent::Empty { .. }) {
        return start;
    }
    let mut depth = 1usize;
    let mut i = start + 1;
    while i < events.len() {
        match &events[i] {
            XmlEvent::Start { name: n, .. } if n == name => depth += 1,
            XmlEvent::End { name: n } if n == name => {
                depth -= 1;
                if depth == 0 {
                    return i;
                }
            }
            _ => {}
        }
        i += 1;
    }
    events.len() - 1
}
