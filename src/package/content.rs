//! Main content part: lossless segmentation and paragraph extraction.
//!
//! The content XML is split into alternating raw chunks and paragraph
//! (`w:p`) chunks. Paragraph elements never nest in wordprocessing markup,
//! so a linear scan is enough. The mutator rewrites individual paragraph
//! chunks and re-serialization is plain concatenation, which keeps every
//! untouched byte of the part intact.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::classify::normalize::normalize_font_name;
use crate::error::{Error, Result};
use crate::model::{Alignment, ParagraphRecord, RunRecord};

use super::styles::{attr, StyleSheet};

/// One chunk of the content part.
#[derive(Debug, Clone)]
pub enum Segment {
    /// Markup outside any paragraph, preserved verbatim
    Raw(String),
    /// A complete `w:p` element
    Paragraph(String),
}

/// The segmented content part.
#[derive(Debug, Clone)]
pub struct ContentPart {
    segments: Vec<Segment>,
}

impl ContentPart {
    /// Segment the content XML. Fails only when a paragraph element is left
    /// unterminated.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut cursor = 0;
        let mut pos = 0;

        while let Some(start) = find_paragraph_start(xml, pos) {
            let tag_end = xml[start..]
                .find('>')
                .map(|i| start + i)
                .ok_or_else(|| Error::XmlParse("unterminated paragraph tag".to_string()))?;
            let end = if xml.as_bytes()[tag_end - 1] == b'/' {
                tag_end + 1
            } else {
                xml[tag_end..]
                    .find("</w:p>")
                    .map(|i| tag_end + i + "</w:p>".len())
                    .ok_or_else(|| Error::XmlParse("unterminated paragraph".to_string()))?
            };
            if start > cursor {
                segments.push(Segment::Raw(xml[cursor..start].to_string()));
            }
            segments.push(Segment::Paragraph(xml[start..end].to_string()));
            cursor = end;
            pos = end;
        }
        if cursor < xml.len() {
            segments.push(Segment::Raw(xml[cursor..].to_string()));
        }
        Ok(Self { segments })
    }

    /// Number of paragraph elements, including empty ones.
    pub fn paragraph_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Paragraph(_)))
            .count()
    }

    /// Raw XML of the paragraph at `index`.
    pub fn paragraph_xml(&self, index: usize) -> Option<&str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Paragraph(xml) => Some(xml.as_str()),
                Segment::Raw(_) => None,
            })
            .nth(index)
    }

    /// Replace the paragraph at `index`. Returns false when out of range.
    pub fn set_paragraph_xml(&mut self, index: usize, xml: String) -> bool {
        let mut seen = 0;
        for segment in &mut self.segments {
            if let Segment::Paragraph(existing) = segment {
                if seen == index {
                    *existing = xml;
                    return true;
                }
                seen += 1;
            }
        }
        false
    }

    /// Insert paragraphs immediately before the paragraph at `index`.
    /// Returns false when out of range.
    pub fn insert_before(&mut self, index: usize, paragraphs: Vec<String>) -> bool {
        match self.segment_position(index) {
            Some(at) => {
                self.segments
                    .splice(at..at, paragraphs.into_iter().map(Segment::Paragraph));
                true
            }
            None => false,
        }
    }

    /// Insert paragraphs immediately after the paragraph at `index`.
    /// Returns false when out of range.
    pub fn insert_after(&mut self, index: usize, paragraphs: Vec<String>) -> bool {
        match self.segment_position(index) {
            Some(at) => {
                self.segments
                    .splice(at + 1..at + 1, paragraphs.into_iter().map(Segment::Paragraph));
                true
            }
            None => false,
        }
    }

    fn segment_position(&self, paragraph_index: usize) -> Option<usize> {
        let mut seen = 0;
        for (i, segment) in self.segments.iter().enumerate() {
            if matches!(segment, Segment::Paragraph(_)) {
                if seen == paragraph_index {
                    return Some(i);
                }
                seen += 1;
            }
        }
        None
    }

    /// Re-serialize the part by concatenating all chunks.
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Raw(xml) | Segment::Paragraph(xml) => out.push_str(xml),
            }
        }
        out
    }

    /// Extract one record per paragraph that yields text. Paragraphs without
    /// extractable text consume an index but produce no record; a paragraph
    /// that fails to parse is skipped the same way.
    pub fn extract_records(&self, styles: &StyleSheet) -> Vec<ParagraphRecord> {
        let mut records = Vec::new();
        let mut index = 0;
        for segment in &self.segments {
            if let Segment::Paragraph(xml) = segment {
                match extract_paragraph(xml, index, styles) {
                    Ok(Some(record)) => records.push(record),
                    Ok(None) => {}
                    Err(err) => {
                        log::warn!("skipping unparsable paragraph {index}: {err}");
                    }
                }
                index += 1;
            }
        }
        records
    }

    /// Human-readable preview of the first `max_paragraphs` paragraphs:
    /// text, style, and the formatting of the first few runs.
    pub fn preview(&self, styles: &StyleSheet, max_paragraphs: usize) -> String {
        let mut lines = Vec::new();
        let records = self.extract_records(styles);
        for record in records.iter().filter(|r| r.index < max_paragraphs) {
            lines.push(format!("=== Paragraph {} ===", record.index));
            let text: String = record.text.chars().take(100).collect();
            let ellipsis = if record.text.chars().count() > 100 { "..." } else { "" };
            lines.push(format!("Text: {text}{ellipsis}"));
            if let Some(style) = &record.style_id {
                lines.push(format!("Style: {style}"));
            }
            for (i, run) in record.runs.iter().take(3).enumerate() {
                let mut parts = Vec::new();
                if let Some(pt) = run.font_size_pt {
                    parts.push(format!("size:{pt}pt"));
                }
                if let Some(family) = &run.font_family {
                    parts.push(format!("font:{family}"));
                }
                if run.bold {
                    parts.push("bold".to_string());
                }
                if run.italic {
                    parts.push("italic".to_string());
                }
                if !parts.is_empty() {
                    lines.push(format!("  Run {i}: {}", parts.join(", ")));
                }
            }
        }
        lines.join("\n")
    }
}

/// Find the next `<w:p` opening that is really a paragraph and not a longer
/// element name such as `w:pPr` or `w:proofErr`.
fn find_paragraph_start(xml: &str, from: usize) -> Option<usize> {
    let mut pos = from;
    while let Some(i) = xml[pos..].find("<w:p") {
        let abs = pos + i;
        match xml.as_bytes().get(abs + 4) {
            Some(b'>') | Some(b'/') | Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n') => {
                return Some(abs)
            }
            _ => pos = abs + 4,
        }
    }
    None
}

/// Paragraph styles that act as explicit role tags.
fn role_tag_from_style(style_id: &str) -> Option<String> {
    let lower = style_id.to_lowercase();
    let known = matches!(
        lower.as_str(),
        "title" | "subtitle" | "caption" | "abstract" | "keyword" | "keywords" | "authors"
            | "affiliation"
    );
    let heading_shaped = {
        let rest = lower
            .strip_prefix("heading")
            .or_else(|| lower.strip_prefix('h'));
        matches!(rest, Some(digits) if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
    };
    if known || heading_shaped {
        Some(lower)
    } else {
        None
    }
}

/// Parse one `w:p` element into a record. Returns `Ok(None)` for paragraphs
/// with no usable text.
fn extract_paragraph(
    xml: &str,
    index: usize,
    styles: &StyleSheet,
) -> Result<Option<ParagraphRecord>> {
    let mut reader = Reader::from_str(xml);

    let mut style_id: Option<String> = None;
    let mut alignment = Alignment::Left;
    let mut para_default_font: Option<String> = None;

    let mut runs: Vec<RunRecord> = Vec::new();

    // Cursor state while walking the event stream
    let mut in_ppr = false;
    let mut in_run = false;
    let mut in_rpr = false;
    let mut in_text = false;
    let mut current: Option<RawRun> = None;

    #[derive(Default)]
    struct RawRun {
        text: String,
        size: Option<String>,
        size_cs: Option<String>,
        font: Option<String>,
        bold: bool,
        italic: bool,
    }

    loop {
        let event = reader.read_event()?;
        match &event {
            Event::Start(e) | Event::Empty(e) => {
                let empty = matches!(event, Event::Empty(_));
                match e.local_name().as_ref() {
                    b"pPr" => in_ppr = !empty,
                    b"r" => {
                        if !empty {
                            in_run = true;
                            current = Some(RawRun::default());
                        }
                    }
                    b"rPr" => {
                        if !empty {
                            in_rpr = true;
                        }
                    }
                    b"pStyle" if in_ppr => style_id = attr(e, "val"),
                    b"jc" if in_ppr => {
                        if let Some(val) = attr(e, "val") {
                            alignment = Alignment::from_jc(&val);
                        }
                    }
                    b"rFonts" => {
                        let font = attr(e, "ascii").or_else(|| attr(e, "hAnsi"));
                        if let Some(font) = font {
                            if in_run && in_rpr {
                                if let Some(run) = current.as_mut() {
                                    run.font = Some(font);
                                }
                            } else if in_ppr {
                                para_default_font = Some(font);
                            }
                        }
                    }
                    b"sz" if in_run && in_rpr => {
                        if let (Some(run), Some(val)) = (current.as_mut(), attr(e, "val")) {
                            run.size = Some(val);
                        }
                    }
                    b"szCs" if in_run && in_rpr => {
                        if let (Some(run), Some(val)) = (current.as_mut(), attr(e, "val")) {
                            run.size_cs = Some(val);
                        }
                    }
                    b"b" if in_run && in_rpr => {
                        if let Some(run) = current.as_mut() {
                            run.bold = toggle_on(attr(e, "val"));
                        }
                    }
                    b"i" if in_run && in_rpr => {
                        if let Some(run) = current.as_mut() {
                            run.italic = toggle_on(attr(e, "val"));
                        }
                    }
                    b"t" if in_run && !empty => in_text = true,
                    _ => {}
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"pPr" => in_ppr = false,
                b"rPr" => in_rpr = false,
                b"t" => in_text = false,
                b"r" => {
                    in_run = false;
                    if let Some(raw) = current.take() {
                        if !raw.text.is_empty() {
                            runs.push(finish_run(raw, &para_default_font, &style_id, styles));
                        }
                    }
                }
                _ => {}
            },
            Event::Text(t) if in_text => {
                if let Some(run) = current.as_mut() {
                    run.text.push_str(&t.unescape()?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    fn finish_run(
        raw: RawRun,
        para_default_font: &Option<String>,
        style_id: &Option<String>,
        styles: &StyleSheet,
    ) -> RunRecord {
        let mut run = RunRecord::new(raw.text);
        if let Some(size) = raw.size.or(raw.size_cs) {
            run.set_size_from_half_points(&size);
        }
        let font = raw
            .font
            .or_else(|| para_default_font.clone())
            .or_else(|| style_id.as_deref().and_then(|id| styles.font_for_style(id)))
            .or_else(|| styles.default_font.clone());
        run.font_family = font.map(|f| normalize_font_name(&f)).filter(|f| !f.is_empty());
        run.bold = raw.bold;
        run.italic = raw.italic;
        run
    }

    if runs.is_empty() {
        return Ok(None);
    }
    let role_tag = style_id.as_deref().and_then(role_tag_from_style);
    let record = ParagraphRecord::from_runs(index, runs, style_id, alignment, role_tag);
    if record.is_empty() {
        return Ok(None);
    }
    Ok(Some(record))
}

/// A toggle property is on unless its value says otherwise.
fn toggle_on(val: Option<String>) -> bool {
    !matches!(val.as_deref(), Some("0") | Some("false") | Some("none"))
}
