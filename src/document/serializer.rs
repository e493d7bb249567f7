/*!
 * DOCX serializer: replays the document event stream with mutations.
 *
 * Untouched markup is emitted byte-for-byte from the original events.
 * Two mutations exist: paragraphs removed by the filter have their whole
 * event span dropped, and runs rewritten by the applier get their content
 * regenerated from `Run::text` (keeping the original `w:rPr` events
 * verbatim). Tabs become `w:tab`, newlines become `w:br`, and any text
 * segment with leading or trailing whitespace is written with
 * `xml:space="preserve"`.
 */

use std::collections::HashMap;

use log::debug;

use crate::errors::DocumentError;

use super::loader::DOCUMENT_PART;
use super::model::{Document, Run};
use super::xml::{write_part, XmlEvent};

/// Serialize the (possibly mutated) document back to DOCX bytes
pub fn serialize_document(doc: &Document) -> Result<Vec<u8>, DocumentError> {
    let mut removed_spans: Vec<(usize, usize)> = Vec::new();
    let mut rewritten: HashMap<usize, &Run> = HashMap::new();

    for para in &doc.paragraphs {
        if para.removed {
            removed_spans.push(para.span);
            continue;
        }
        for run in &para.runs {
            if run.dirty {
                rewritten.insert(run.span.0, run);
            }
        }
    }
    removed_spans.sort_unstable();

    let mut out_events: Vec<XmlEvent> = Vec::with_capacity(doc.events.len());
    let mut removed_iter = removed_spans.iter().peekable();
    let mut i = 0;
    while i < doc.events.len() {
        if let Some(&&(start, end)) = removed_iter.peek() {
            if i == start {
                removed_iter.next();
                i = end + 1;
                continue;
            }
        }
        if let Some(run) = rewritten.get(&i) {
            out_events.push(doc.events[run.span.0].clone());
            if let Some((rs, re)) = run.rpr_span {
                out_events.extend(doc.events[rs..=re].iter().cloned());
            }
            content_events(&run.text, &mut out_events);
            out_events.push(doc.events[run.span.1].clone());
            i = run.span.1 + 1;
            continue;
        }
        out_events.push(doc.events[i].clone());
        i += 1;
    }

    let xml = write_part(&out_events).map_err(|e| DocumentError::MalformedXml {
        part: DOCUMENT_PART.to_string(),
        message: e.to_string(),
    })?;

    debug!(
        "serialized document: {} rewritten runs, {} removed paragraphs",
        rewritten.len(),
        removed_spans.len()
    );

    let mut replacements = HashMap::new();
    replacements.insert(DOCUMENT_PART.to_string(), xml);
    doc.package.write_with_replacements(&replacements)
}

/// Regenerate a run's content events from its text
fn content_events(text: &str, out: &mut Vec<XmlEvent>) {
    let mut chunk = String::new();
    for ch in text.chars() {
        match ch {
            '\t' => {
                flush_text(&mut chunk, out);
                out.push(XmlEvent::Empty {
                    name: "w:tab".to_string(),
                    attrs: Vec::new(),
                });
            }
            '\n' => {
                flush_text(&mut chunk, out);
                out.push(XmlEvent::Empty {
                    name: "w:br".to_string(),
                    attrs: Vec::new(),
                });
            }
            _ => chunk.push(ch),
        }
    }
    flush_text(&mut chunk, out);
}

fn flush_text(chunk: &mut String, out: &mut Vec<XmlEvent>) {
    if chunk.is_empty() {
        return;
    }
    let needs_preserve = chunk.trim() != chunk.as_str();
    let attrs = if needs_preserve {
        vec![("xml:space".to_string(), "preserve".to_string())]
    } else {
        Vec::new()
    };
    out.push(XmlEvent::Start {
        name: "w:t".to_string(),
        attrs,
    });
    out.push(XmlEvent::Text {
        text: std::mem::take(chunk),
    });
    out.push(XmlEvent::End {
        name: "w:t".to_string(),
    });
}
