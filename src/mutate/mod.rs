//! Content-part mutation: highlight, correct, and insert-missing-sections.
//!
//! All three operations rewrite individual paragraph chunks of the content
//! part and re-serialize the package around them; no other part is touched.
//! Edits happen at the run level so untouched markup inside a paragraph
//! survives verbatim.

use std::collections::HashMap;

use crate::classify::{classify, AnalysisContext};
use crate::config::RuleConfig;
use crate::error::Result;
use crate::model::{ExpectedValue, Finding, SectionLabel};
use crate::package::DocxPackage;

/// Highlight attribute applied to flagged and inserted runs.
const HIGHLIGHT_XML: &str = r#"<w:highlight w:val="yellow"/>"#;

/// One skipped edit, reported instead of failing the whole operation.
#[derive(Debug, Clone)]
pub struct MutationSkip {
    /// Paragraph the edit targeted, when it targeted one
    pub paragraph_index: Option<usize>,
    pub reason: String,
}

/// Result of a mutation run: the rewritten package plus any skipped edits.
#[derive(Debug)]
pub struct MutationOutcome {
    pub bytes: Vec<u8>,
    pub skipped: Vec<MutationSkip>,
}

/// Mark every run of every paragraph referenced by a finding with a yellow
/// highlight. Idempotent: a run already highlighted comes out unchanged.
pub fn highlight(package: &DocxPackage, findings: &[Finding]) -> Result<Vec<u8>> {
    let mut content = package.content.clone();
    let mut indices: Vec<usize> = findings
        .iter()
        .flat_map(|f| f.paragraph_indices.iter().copied())
        .collect();
    indices.sort_unstable();
    indices.dedup();

    for index in indices {
        let Some(xml) = content.paragraph_xml(index) else {
            log::warn!("highlight: paragraph {index} out of range");
            continue;
        };
        let rewritten = rewrite_runs(xml, &|run| upsert_rpr_child(run, &["w:highlight"], HIGHLIGHT_XML));
        content.set_paragraph_xml(index, rewritten);
    }
    package.write_with_content(&content)
}

/// Apply each finding's machine-readable expected value to every run of the
/// referenced paragraphs. Findings without a concrete instruction, and
/// paragraphs without runs, are skipped and reported.
pub fn correct(package: &DocxPackage, findings: &[Finding]) -> Result<MutationOutcome> {
    let mut content = package.content.clone();
    let mut skipped = Vec::new();

    for finding in findings {
        if !finding.expected_value.is_actionable() {
            continue;
        }
        if finding.paragraph_indices.is_empty() {
            skipped.push(MutationSkip {
                paragraph_index: None,
                reason: format!("{:?} finding has no paragraph anchor", finding.kind),
            });
            continue;
        }
        for &index in &finding.paragraph_indices {
            let Some(xml) = content.paragraph_xml(index) else {
                log::warn!("correct: paragraph {index} out of range");
                skipped.push(MutationSkip {
                    paragraph_index: Some(index),
                    reason: "paragraph index out of range".to_string(),
                });
                continue;
            };
            let (rewritten, touched) =
                rewrite_runs_counted(xml, &|run| apply_correction(run, &finding.expected_value));
            if touched == 0 {
                log::warn!("correct: paragraph {index} has no runs, skipping");
                skipped.push(MutationSkip {
                    paragraph_index: Some(index),
                    reason: "paragraph has no runs".to_string(),
                });
                continue;
            }
            content.set_paragraph_xml(index, rewritten);
        }
    }

    Ok(MutationOutcome {
        bytes: package.write_with_content(&content)?,
        skipped,
    })
}

/// Insert canned, highlighted paragraphs for each missing section.
///
/// The insertion point for a label is just before the first occurrence of
/// the next template-order label present in the manuscript, or just after
/// the span of the previous one. Acknowledgement and funding statement,
/// when both missing, go in as one four-paragraph unit immediately before
/// the references section.
pub fn insert_missing_sections(
    package: &DocxPackage,
    template_order: &[SectionLabel],
    missing: &[SectionLabel],
    config: &RuleConfig,
) -> Result<MutationOutcome> {
    let mut content = package.content.clone();
    let mut skipped = Vec::new();

    let spans = label_spans(package, config);
    let mut remaining: Vec<SectionLabel> = missing.to_vec();
    remaining.sort_by_key(|label| order_position(template_order, *label));
    remaining.dedup();

    // Planned as (paragraph index, insert-before?, paragraphs); applied
    // back-to-front so earlier insertions do not shift later targets.
    let mut plan: Vec<(usize, bool, Vec<String>)> = Vec::new();

    let ack_pair = remaining.contains(&SectionLabel::Acknowledgement)
        && remaining.contains(&SectionLabel::FundingStatement);
    if ack_pair {
        if let Some(refs) = spans.get(&SectionLabel::References) {
            let mut unit = canned_section(SectionLabel::Acknowledgement);
            unit.extend(canned_section(SectionLabel::FundingStatement));
            plan.push((refs.first, true, unit));
            remaining.retain(|l| {
                !matches!(
                    l,
                    SectionLabel::Acknowledgement | SectionLabel::FundingStatement
                )
            });
        }
    }

    for label in remaining {
        if label.canned_heading().is_none() {
            log::warn!("no canned content for missing section {label}, skipping");
            skipped.push(MutationSkip {
                paragraph_index: None,
                reason: format!("no canned content for {label}"),
            });
            continue;
        }
        let paragraphs = canned_section(label);
        match insertion_point(template_order, &spans, label, content.paragraph_count()) {
            Some((index, before)) => plan.push((index, before, paragraphs)),
            None => {
                skipped.push(MutationSkip {
                    paragraph_index: None,
                    reason: format!("no insertion point for {label}"),
                });
            }
        }
    }

    plan.sort_by_key(|(index, _, _)| *index);
    for (index, before, paragraphs) in plan.into_iter().rev() {
        let inserted = if before {
            content.insert_before(index, paragraphs)
        } else {
            content.insert_after(index, paragraphs)
        };
        if !inserted {
            log::warn!("insertion target {index} out of range");
            skipped.push(MutationSkip {
                paragraph_index: Some(index),
                reason: "insertion target out of range".to_string(),
            });
        }
    }

    Ok(MutationOutcome {
        bytes: package.write_with_content(&content)?,
        skipped,
    })
}

/// First and last paragraph index occupied by each label, body text counted
/// toward its heading's span.
struct Span {
    first: usize,
    last: usize,
}

fn label_spans(package: &DocxPackage, config: &RuleConfig) -> HashMap<SectionLabel, Span> {
    let mut spans: HashMap<SectionLabel, Span> = HashMap::new();
    let mut ctx = AnalysisContext::new(config);
    let mut heading: Option<SectionLabel> = None;

    for record in package.records() {
        let label = classify(&record, config, &mut ctx);
        let owner = if label == SectionLabel::BodyText {
            match heading {
                Some(h) => h,
                None => continue,
            }
        } else {
            if label.is_context() {
                heading = Some(label);
            }
            label
        };
        spans
            .entry(owner)
            .and_modify(|s| s.last = record.index)
            .or_insert(Span {
                first: record.index,
                last: record.index,
            });
    }
    spans
}

fn order_position(order: &[SectionLabel], label: SectionLabel) -> usize {
    order.iter().position(|l| *l == label).unwrap_or(order.len())
}

/// Before the next present label in template order, else after the previous
/// one's span, else at the very end of the document.
fn insertion_point(
    order: &[SectionLabel],
    spans: &HashMap<SectionLabel, Span>,
    label: SectionLabel,
    paragraph_count: usize,
) -> Option<(usize, bool)> {
    let pos = order_position(order, label);
    for next in order.iter().skip(pos + 1) {
        if let Some(span) = spans.get(next) {
            return Some((span.first, true));
        }
    }
    for prev in order.iter().take(pos.min(order.len())).rev() {
        if let Some(span) = spans.get(prev) {
            return Some((span.last, false));
        }
    }
    paragraph_count.checked_sub(1).map(|last| (last, false))
}

/// Canned heading + body paragraph pair for an inserted section, highlighted.
fn canned_section(label: SectionLabel) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(heading) = label.canned_heading() {
        out.push(canned_paragraph(heading));
    }
    if let Some(body) = label.canned_body() {
        out.push(canned_paragraph(body));
    }
    out
}

fn canned_paragraph(text: &str) -> String {
    format!(
        r#"<w:p><w:r><w:rPr>{HIGHLIGHT_XML}</w:rPr><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        escape_text(text)
    )
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Rewrite a run according to one correction instruction.
fn apply_correction(run: &str, value: &ExpectedValue) -> String {
    match value {
        ExpectedValue::Size { half_points, .. } => {
            let sz = format!(
                r#"<w:sz w:val="{half_points}"/><w:szCs w:val="{half_points}"/>"#
            );
            upsert_rpr_child(run, &["w:sz", "w:szCs"], &sz)
        }
        ExpectedValue::Family(family) => {
            let fonts = format!(
                r#"<w:rFonts w:ascii="{0}" w:hAnsi="{0}"/>"#,
                escape_text(family)
            );
            upsert_rpr_child(run, &["w:rFonts"], &fonts)
        }
        ExpectedValue::Bold(true) => upsert_rpr_child(run, &["w:b", "w:bCs"], "<w:b/>"),
        ExpectedValue::Bold(false) => {
            upsert_rpr_child(run, &["w:b", "w:bCs"], r#"<w:b w:val="0"/>"#)
        }
        ExpectedValue::Italic(true) => upsert_rpr_child(run, &["w:i", "w:iCs"], "<w:i/>"),
        ExpectedValue::Italic(false) => {
            upsert_rpr_child(run, &["w:i", "w:iCs"], r#"<w:i w:val="0"/>"#)
        }
        ExpectedValue::None => run.to_string(),
    }
}

/// Apply `edit` to every text run (`w:r`) and math run (`m:r`) of a
/// paragraph.
fn rewrite_runs(paragraph_xml: &str, edit: &dyn Fn(&str) -> String) -> String {
    rewrite_runs_counted(paragraph_xml, edit).0
}

fn rewrite_runs_counted(paragraph_xml: &str, edit: &dyn Fn(&str) -> String) -> (String, usize) {
    let mut out = String::with_capacity(paragraph_xml.len());
    let mut cursor = 0;
    let mut touched = 0;

    while let Some((start, end)) = next_run(paragraph_xml, cursor) {
        out.push_str(&paragraph_xml[cursor..start]);
        out.push_str(&edit(&paragraph_xml[start..end]));
        touched += 1;
        cursor = end;
    }
    out.push_str(&paragraph_xml[cursor..]);
    (out, touched)
}

/// Locate the next complete run element at or after `from`.
fn next_run(xml: &str, from: usize) -> Option<(usize, usize)> {
    let mut pos = from;
    loop {
        let w = find_element_start(xml, pos, "<w:r");
        let m = find_element_start(xml, pos, "<m:r");
        let (start, close) = match (w, m) {
            (Some(w), Some(m)) if w < m => (w, "</w:r>"),
            (Some(w), None) => (w, "</w:r>"),
            (_, Some(m)) => (m, "</m:r>"),
            (None, None) => return None,
        };
        let tag_end = xml[start..].find('>').map(|i| start + i)?;
        if xml.as_bytes()[tag_end - 1] == b'/' {
            // Self-closing run carries nothing to edit
            pos = tag_end + 1;
            continue;
        }
        let end = xml[tag_end..].find(close).map(|i| tag_end + i + close.len())?;
        return Some((start, end));
    }
}

/// Find `prefix` as a complete element name (next byte ends the name).
fn find_element_start(xml: &str, from: usize, prefix: &str) -> Option<usize> {
    let mut pos = from;
    while let Some(i) = xml[pos..].find(prefix) {
        let abs = pos + i;
        match xml.as_bytes().get(abs + prefix.len()) {
            Some(b'>') | Some(b'/') | Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n') => {
                return Some(abs)
            }
            _ => pos = abs + prefix.len(),
        }
    }
    None
}

/// Replace any of `remove` inside the run's `w:rPr` with `new_xml`,
/// creating the `w:rPr` as the run's first child when absent.
fn upsert_rpr_child(run: &str, remove: &[&str], new_xml: &str) -> String {
    let Some(rpr_start) = find_element_start(run, 0, "<w:rPr") else {
        // No rPr yet: create one right after the opening tag
        let Some(tag_end) = run.find('>') else {
            return run.to_string();
        };
        let mut out = String::with_capacity(run.len() + new_xml.len() + 16);
        out.push_str(&run[..=tag_end]);
        out.push_str("<w:rPr>");
        out.push_str(new_xml);
        out.push_str("</w:rPr>");
        out.push_str(&run[tag_end + 1..]);
        return out;
    };

    let tag_end = match run[rpr_start..].find('>') {
        Some(i) => rpr_start + i,
        None => return run.to_string(),
    };
    if run.as_bytes()[tag_end - 1] == b'/' {
        // <w:rPr/> expands to a populated element
        let mut out = String::with_capacity(run.len() + new_xml.len() + 16);
        out.push_str(&run[..rpr_start]);
        out.push_str("<w:rPr>");
        out.push_str(new_xml);
        out.push_str("</w:rPr>");
        out.push_str(&run[tag_end + 1..]);
        return out;
    }

    let close = match run[tag_end..].find("</w:rPr>") {
        Some(i) => tag_end + i,
        None => return run.to_string(),
    };
    let mut inner = run[tag_end + 1..close].to_string();
    for tag in remove {
        inner = remove_element(&inner, tag);
    }

    let mut out = String::with_capacity(run.len() + new_xml.len());
    out.push_str(&run[..=tag_end]);
    out.push_str(&inner);
    out.push_str(new_xml);
    out.push_str(&run[close..]);
    out
}

/// Drop every `<tag .../>` or `<tag ...>...</tag>` element from `xml`.
fn remove_element(xml: &str, tag: &str) -> String {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");
    let mut out = String::with_capacity(xml.len());
    let mut cursor = 0;

    while let Some(start) = find_element_start(xml, cursor, &open) {
        let Some(tag_end) = xml[start..].find('>').map(|i| start + i) else {
            break;
        };
        let end = if xml.as_bytes()[tag_end - 1] == b'/' {
            tag_end + 1
        } else {
            match xml[tag_end..].find(&close) {
                Some(i) => tag_end + i + close.len(),
                None => tag_end + 1,
            }
        };
        out.push_str(&xml[cursor..start]);
        cursor = end;
    }
    out.push_str(&xml[cursor..]);
    out
}
