/*!
 * In-memory model of a DOCX document.
 *
 * A `Document` owns the raw package plus a lossless event stream of the
 * main document part; paragraphs and runs are typed views into that
 * stream. Formatting attributes are tri-state (`Option`): `None` means
 * "inherit from style", mirroring how `w:rPr` omission works in OOXML.
 *
 * Mutation happens only through run text: the applier rewrites
 * `Run::text` and flags the run dirty; the serializer regenerates just
 * those runs' content events and replays everything else unchanged.
 */

use super::package::DocxPackage;
use super::xml::XmlEvent;

/// Indentation attributes of a paragraph, raw twip values as authored
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndentProperties {
    pub left: Option<String>,
    pub right: Option<String>,
    pub first_line: Option<String>,
    pub hanging: Option<String>,
}

/// Spacing attributes of a paragraph, raw values as authored
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpacingProperties {
    pub before: Option<String>,
    pub after: Option<String>,
    pub line: Option<String>,
}

/// Character-level formatting of a run (tri-state per attribute)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunProperties {
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    /// `w:u` value ("single", "none", ...); `None` = inherit
    pub underline: Option<String>,
    pub strike: Option<bool>,
    pub subscript: Option<bool>,
    pub superscript: Option<bool>,
    pub all_caps: Option<bool>,
    pub small_caps: Option<bool>,
    /// ASCII font name from `w:rFonts`
    pub font: Option<String>,
    /// `w:sz` value in half-points
    pub size_half_points: Option<u32>,
    /// `w:color` value (hex RGB or "auto")
    pub color: Option<String>,
    /// `w:highlight` value
    pub highlight: Option<String>,
}

impl RunProperties {
    /// Whether the run has a visible underline
    pub fn is_underlined(&self) -> bool {
        matches!(self.underline.as_deref(), Some(v) if v != "none")
    }

    /// Whether the run carries any of bold/italic/underline
    pub fn has_emphasis(&self) -> bool {
        self.bold == Some(true) || self.italic == Some(true) || self.is_underlined()
    }

    /// Font size in points, when set
    pub fn size_points(&self) -> Option<f32> {
        self.size_half_points.map(|hp| hp as f32 / 2.0)
    }
}

/// A contiguous text span with uniform formatting (`w:r`)
#[derive(Clone, Debug)]
pub struct Run {
    /// Start/end event indices of the `w:r` element (inclusive)
    pub(crate) span: (usize, usize),
    /// Event indices of the `w:rPr` subtree, when present (inclusive)
    pub(crate) rpr_span: Option<(usize, usize)>,
    pub props: RunProperties,
    /// Text with `w:tab` mapped to `\t` and `w:br`/`w:cr` to `\n`
    pub text: String,
    /// Set when the applier rewrote `text`
    pub(crate) dirty: bool,
}

impl Run {
    /// Replace the run's text; the serializer will regenerate content
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.dirty = true;
    }
}

/// A block-level text container (`w:p`)
#[derive(Clone, Debug)]
pub struct Paragraph {
    /// Start/end event indices of the `w:p` element (inclusive)
    pub(crate) span: (usize, usize),
    /// Resolved style name (via styles.xml), falling back to the style id
    pub style: Option<String>,
    /// `w:jc` value
    pub alignment: Option<String>,
    pub indent: IndentProperties,
    pub spacing: SpacingProperties,
    pub runs: Vec<Run>,
    /// Set by the filter's orphan-letter rule; serializer drops the span
    pub(crate) removed: bool,
}

impl Paragraph {
    /// Raw concatenated text of all runs, whitespace intact
    pub fn text(&self) -> String {
        let mut out = String::new();
        for run in &self.runs {
            out.push_str(&run.text);
        }
        out
    }

    /// Whether the paragraph style name starts with "heading" (any case)
    pub fn is_heading(&self) -> bool {
        self.style
            .as_deref()
            .map(|s| s.to_lowercase().starts_with("heading"))
            .unwrap_or(false)
    }

    /// Whether the orphan-letter rule removed this paragraph
    pub fn is_removed(&self) -> bool {
        self.removed
    }
}

/// A loaded DOCX document
pub struct Document {
    pub(crate) package: DocxPackage,
    /// Event stream of `word/document.xml`
    pub(crate) events: Vec<XmlEvent>,
    pub paragraphs: Vec<Paragraph>,
}

impl Document {
    /// Number of paragraphs, removed ones included
    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }
}
