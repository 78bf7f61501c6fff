//! Typed findings emitted by the comparator.
//!
//! The serialized shape of [`Finding`] is the contract consumed by the
//! external report and export collaborators; field names must stay stable.

use serde::{Deserialize, Serialize};

use super::label::SectionLabel;

/// Kind of formatting or structural deviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    SizeMismatch,
    FamilyMismatch,
    BoldMissing,
    BoldIncorrect,
    ItalicMissing,
    ItalicIncorrect,
    MissingSection,
    DuplicateSection,
    OrderMismatch,
    RequiredTextMissing,
}

/// Machine-readable expected value carried alongside the display string.
///
/// The corrector dispatches on this directly instead of re-parsing the
/// human-readable `expected` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExpectedValue {
    /// Font size, kept as the correlated point / half-point pair.
    Size {
        pt: f32,
        half_points: u32,
    },
    /// Font family name.
    Family(String),
    /// Bold on or off.
    Bold(bool),
    /// Italic on or off.
    Italic(bool),
    /// No concrete formatting instruction (structural findings).
    #[default]
    None,
}

impl ExpectedValue {
    /// Expected size built from points, normalizing the half-point pair.
    pub fn size_pt(pt: f32) -> Self {
        ExpectedValue::Size {
            pt,
            half_points: (pt * 2.0).round() as u32,
        }
    }

    /// Whether this value carries a concrete instruction for the corrector.
    pub fn is_actionable(&self) -> bool {
        !matches!(self, ExpectedValue::None)
    }
}

/// One detected deviation from the expected format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// Deviation kind
    #[serde(rename = "type")]
    pub kind: FindingKind,

    /// Section label, context-qualified for body text (`body_text::references`)
    pub section: String,

    /// Affected paragraph indices
    pub paragraph_indices: Vec<usize>,

    /// Rough page estimates for the affected paragraphs, 1-based
    pub pages: Vec<usize>,

    /// Human-readable description of what was found
    pub found: String,

    /// Human-readable description of what was expected
    pub expected: String,

    /// Machine-readable expected value
    pub expected_value: ExpectedValue,

    /// Truncated text of the affected paragraph
    pub snippet: String,

    /// Human-readable suggested fix
    pub suggested_fix: String,
}

impl Finding {
    /// Build a finding for a single paragraph.
    #[allow(clippy::too_many_arguments)]
    pub fn for_paragraph(
        kind: FindingKind,
        section: impl Into<String>,
        index: usize,
        found: impl Into<String>,
        expected: impl Into<String>,
        expected_value: ExpectedValue,
        snippet_source: &str,
        suggested_fix: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            section: section.into(),
            paragraph_indices: vec![index],
            pages: vec![1 + index / 5],
            found: found.into(),
            expected: expected.into(),
            expected_value,
            snippet: text_snippet(snippet_source),
            suggested_fix: suggested_fix.into(),
        }
    }

    /// Build a structural finding not anchored to any paragraph.
    pub fn structural(
        kind: FindingKind,
        section: SectionLabel,
        found: impl Into<String>,
        expected: impl Into<String>,
        suggested_fix: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            section: section.to_string(),
            paragraph_indices: Vec::new(),
            pages: Vec::new(),
            found: found.into(),
            expected: expected.into(),
            expected_value: ExpectedValue::None,
            snippet: String::new(),
            suggested_fix: suggested_fix.into(),
        }
    }
}

/// Section string for a label, qualified with the body-text context.
pub fn qualified_section(label: SectionLabel, context: Option<SectionLabel>) -> String {
    match (label, context) {
        (SectionLabel::BodyText, Some(ctx)) => format!("{}::{}", label, ctx),
        _ => label.to_string(),
    }
}

/// Single-line snippet of at most 140 characters, with an ellipsis when cut.
pub fn text_snippet(text: &str) -> String {
    const MAX: usize = 140;
    let flat = text.replace('\n', " ");
    let flat = flat.trim();
    let mut out: String = flat.chars().take(MAX).collect();
    if flat.chars().count() > MAX {
        out.push_str("...");
    }
    out
}
