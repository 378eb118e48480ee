//! Report rendering: lay a [`Report`] out as a paginated PDF.
//!
//! ## Why hand-built content streams?
//!
//! The output is a single column of styled text, so the full machinery of a
//! layout engine buys nothing. `lopdf` primitives are enough: one content
//! stream per page, `BT`/`Tj`/`ET` per line, and the standard Type1 base
//! fonts (Helvetica, Helvetica-Bold) that every viewer ships, so no font
//! embedding is needed. The price is that those fonts only cover Latin-1;
//! [`latin1_bytes`] replaces anything outside that repertoire.
//!
//! ## Layout model
//!
//! A cursor walks down the page from the top margin, emitting one text
//! object per wrapped line and starting a fresh page when the next line
//! would cross the bottom margin. Line capacity is estimated from an
//! average glyph width rather than font metrics; the estimate is
//! conservative, so lines stay inside the content box.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, StringFormat};
use tracing::debug;

use crate::error::{Result, SummarizeError};
use crate::report::{Report, ReportBlock};

// US Letter, in PDF points.
const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 72.0;

const HEADING_SIZE: f32 = 13.0;
const BODY_SIZE: f32 = 10.0;
const LINE_HEIGHT: f32 = 14.0;
/// Vertical space above a heading, skipped at the top of a page.
const HEADING_LEAD: f32 = 20.0;
/// Extra left indent for term/definition lines.
const TERM_INDENT: f32 = 20.0;

/// Average glyph width as a fraction of the font size. Helvetica prose
/// averages just under half an em, so capacities derived from this never
/// overrun the right margin.
const GLYPH_WIDTH_RATIO: f32 = 0.5;

const SUMMARY_HEADING: &str = "Summary";
const TERMS_HEADING: &str = "Technical Terms and Definitions";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Heading,
    Body,
    Term,
}

impl Style {
    fn font(self) -> &'static str {
        match self {
            Style::Heading => "F2",
            Style::Body | Style::Term => "F1",
        }
    }

    fn size(self) -> f32 {
        match self {
            Style::Heading => HEADING_SIZE,
            Style::Body | Style::Term => BODY_SIZE,
        }
    }

    fn color(self) -> (f32, f32, f32) {
        match self {
            Style::Term => (0.0, 0.0, 1.0),
            Style::Heading | Style::Body => (0.0, 0.0, 0.0),
        }
    }

    fn indent(self) -> f32 {
        match self {
            Style::Term => TERM_INDENT,
            Style::Heading | Style::Body => 0.0,
        }
    }
}

/// Cursor state while laying lines onto pages.
struct PageLayout {
    done: Vec<Vec<Operation>>,
    current: Vec<Operation>,
    y: f32,
}

impl PageLayout {
    fn new() -> Self {
        Self {
            done: Vec::new(),
            current: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn at_page_top(&self) -> bool {
        self.current.is_empty()
    }

    /// Drop vertical space, except at the top of a page where it would only
    /// push content down for no reason.
    fn gap(&mut self, points: f32) {
        if !self.at_page_top() {
            self.y -= points;
        }
    }

    fn break_page(&mut self) {
        self.done.push(std::mem::take(&mut self.current));
        self.y = PAGE_HEIGHT - MARGIN;
    }

    /// Emit one line of text at the cursor, breaking the page first if the
    /// line would cross the bottom margin.
    fn line(&mut self, text: &str, style: Style) {
        if self.y - LINE_HEIGHT < MARGIN && !self.at_page_top() {
            self.break_page();
        }
        self.y -= LINE_HEIGHT;

        let (r, g, b) = style.color();
        self.current.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![style.font().into(), Object::Real(style.size())]),
            Operation::new("rg", vec![Object::Real(r), Object::Real(g), Object::Real(b)]),
            Operation::new(
                "Td",
                vec![
                    Object::Real(MARGIN + style.indent()),
                    Object::Real(self.y),
                ],
            ),
            Operation::new(
                "Tj",
                vec![Object::String(latin1_bytes(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        self.done.push(self.current);
        self.done
    }
}

/// Render a report to PDF bytes.
///
/// Summaries get a bold `Summary` heading; each run of term blocks gets a
/// single bold `Technical Terms and Definitions` heading with the terms
/// below it in blue, indented. An empty report still yields a valid
/// one-page document.
pub fn render_pdf(report: &Report) -> Result<Vec<u8>> {
    let mut layout = PageLayout::new();
    let mut in_terms = false;

    for block in &report.blocks {
        if in_terms && !matches!(block, ReportBlock::Term { .. }) {
            in_terms = false;
        }
        match block {
            ReportBlock::Summary { text } => {
                layout.gap(HEADING_LEAD);
                layout.line(SUMMARY_HEADING, Style::Heading);
                paragraph(&mut layout, text, Style::Body);
            }
            ReportBlock::Term { term, definition } => {
                if !in_terms {
                    layout.gap(HEADING_LEAD);
                    layout.line(TERMS_HEADING, Style::Heading);
                    in_terms = true;
                }
                let text = if definition.is_empty() {
                    term.clone()
                } else {
                    format!("{}: {}", term, definition)
                };
                paragraph(&mut layout, &text, Style::Term);
            }
            ReportBlock::Paragraph { text } => {
                layout.gap(LINE_HEIGHT);
                paragraph(&mut layout, text, Style::Body);
            }
        }
    }

    let pages = layout.finish();
    debug!(
        "Rendered {} blocks onto {} pages",
        report.blocks.len(),
        pages.len()
    );
    assemble_document(pages)
}

/// Word-wrap a block of text and emit every resulting line. Explicit
/// newlines in the source are honored as line breaks.
fn paragraph(layout: &mut PageLayout, text: &str, style: Style) {
    if text.is_empty() {
        layout.line("", style);
        return;
    }
    let capacity = line_capacity(style);
    for source_line in text.lines() {
        for wrapped in wrap_text(source_line, capacity) {
            layout.line(&wrapped, style);
        }
    }
}

/// How many characters fit on one line in the given style.
fn line_capacity(style: Style) -> usize {
    let width = PAGE_WIDTH - 2.0 * MARGIN - style.indent();
    (width / (style.size() * GLYPH_WIDTH_RATIO)) as usize
}

/// Greedy word wrap. Words wider than a whole line are hard-broken so no
/// line ever exceeds `max_chars`; empty input yields one empty line.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        let needed = if current.is_empty() {
            word_len
        } else {
            current.chars().count() + 1 + word_len
        };

        if needed <= max_chars {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        let mut rest = word;
        while rest.chars().count() > max_chars {
            let split_at = rest
                .char_indices()
                .nth(max_chars)
                .map(|(i, _)| i)
                .unwrap_or(rest.len());
            lines.push(rest[..split_at].to_string());
            rest = &rest[split_at..];
        }
        current.push_str(rest);
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Encode text for the standard Type1 fonts: Latin-1 passes through,
/// anything else becomes `?`.
fn latin1_bytes(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            let code = c as u32;
            if code <= 0xFF {
                code as u8
            } else {
                b'?'
            }
        })
        .collect()
}

/// Wrap the laid-out pages in the PDF object skeleton and serialize.
fn assemble_document(pages: Vec<Vec<Operation>>) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let body_font_id = doc.add_object(lopdf::Dictionary::from_iter([
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
    ]));
    let heading_font_id = doc.add_object(lopdf::Dictionary::from_iter([
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica-Bold".to_vec())),
    ]));
    let resources_id = doc.add_object(lopdf::Dictionary::from_iter([(
        "Font",
        Object::Dictionary(lopdf::Dictionary::from_iter([
            ("F1", Object::Reference(body_font_id)),
            ("F2", Object::Reference(heading_font_id)),
        ])),
    )]));

    let mut kids = Vec::new();
    for operations in pages {
        let content = Content { operations };
        let encoded = content.encode().map_err(|e| SummarizeError::RenderFailed {
            detail: format!("content encoding failed: {}", e),
        })?;
        let content_id = doc.add_object(Stream::new(lopdf::Dictionary::new(), encoded));
        let page_id = doc.add_object(lopdf::Dictionary::from_iter([
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            ("Contents", Object::Reference(content_id)),
            ("Resources", Object::Reference(resources_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    0.into(),
                    0.into(),
                    Object::Real(PAGE_WIDTH),
                    Object::Real(PAGE_HEIGHT),
                ]),
            ),
        ]));
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(lopdf::Dictionary::from_iter([
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(kids)),
            ("Count", Object::Integer(count)),
        ])),
    );
    let catalog_id = doc.add_object(lopdf::Dictionary::from_iter([
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| SummarizeError::RenderFailed {
            detail: format!("document save failed: {}", e),
        })?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_topic_report() -> Report {
        Report {
            blocks: vec![
                ReportBlock::Summary {
                    text: "GPUs accelerate model training.".to_string(),
                },
                ReportBlock::Term {
                    term: "GPU".to_string(),
                    definition: "a graphics processing unit".to_string(),
                },
            ],
        }
    }

    fn extract_all_text(bytes: &[u8]) -> String {
        let doc = Document::load_mem(bytes).unwrap();
        let mut text = String::new();
        for (page_num, _) in doc.get_pages() {
            text.push_str(&doc.extract_text(&[page_num]).unwrap());
        }
        text
    }

    #[test]
    fn rendered_pdf_contains_headings_and_content() {
        let bytes = render_pdf(&one_topic_report()).unwrap();
        let text = extract_all_text(&bytes);

        assert!(text.contains("Summary"), "got: {text}");
        assert!(text.contains("GPUs accelerate model training."), "got: {text}");
        assert!(text.contains("Technical Terms and Definitions"), "got: {text}");
        assert!(text.contains("GPU: a graphics processing unit"), "got: {text}");
    }

    #[test]
    fn long_reports_break_onto_multiple_pages() {
        let blocks = (0..120)
            .map(|i| ReportBlock::Summary {
                text: format!("Repeated filler summary number {}.", i),
            })
            .collect();
        let bytes = render_pdf(&Report { blocks }).unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        assert!(doc.get_pages().len() > 1, "pages: {}", doc.get_pages().len());
    }

    #[test]
    fn empty_report_renders_one_blank_page() {
        let bytes = render_pdf(&Report::default()).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    /// Round-tripped operands come back as `Integer` when the value happens
    /// to be whole, so compare numerically.
    fn numbers(op: &Operation) -> Vec<f32> {
        op.operands
            .iter()
            .filter_map(|obj| match obj {
                Object::Integer(i) => Some(*i as f32),
                Object::Real(r) => Some(*r),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn term_lines_are_blue_and_indented() {
        let bytes = render_pdf(&one_topic_report()).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let page_id = doc.get_pages().into_values().next().unwrap();
        let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();

        let has_blue_fill = content
            .operations
            .iter()
            .any(|op| op.operator == "rg" && numbers(op) == [0.0, 0.0, 1.0]);
        let has_indented_line = content
            .operations
            .iter()
            .any(|op| op.operator == "Td" && numbers(op).first() == Some(&(MARGIN + TERM_INDENT)));
        assert!(has_blue_fill, "no blue fill color in content stream");
        assert!(has_indented_line, "no indented term line in content stream");
    }

    #[test]
    fn term_without_definition_renders_bare() {
        let report = Report {
            blocks: vec![ReportBlock::Term {
                term: "HTTP".to_string(),
                definition: String::new(),
            }],
        };
        let text = extract_all_text(&render_pdf(&report).unwrap());
        assert!(text.contains("HTTP"), "got: {text}");
        assert!(!text.contains("HTTP:"), "got: {text}");
    }

    #[test]
    fn wrap_fills_lines_greedily() {
        let lines = wrap_text("one two three four five", 9);
        assert_eq!(lines, vec!["one two", "three", "four five"]);
    }

    #[test]
    fn wrap_hard_breaks_overlong_words() {
        let lines = wrap_text("abcdefghij", 4);
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn wrap_of_empty_text_is_one_empty_line() {
        assert_eq!(wrap_text("", 80), vec![""]);
    }

    #[test]
    fn latin1_replaces_unmappable_characters() {
        assert_eq!(latin1_bytes("caf\u{e9}"), b"caf\xe9".to_vec());
        assert_eq!(latin1_bytes("\u{6f22}"), b"?".to_vec());
    }
}
