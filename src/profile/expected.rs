//! Expected formatting for a section and the built-in fallback table.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::classify::normalize::normalize_font_name;
use crate::model::SectionLabel;

/// "10 — font size", "font size 10", "font size: 10.5 pt" and similar
/// instructional phrases found in template exemplar text.
static SIZE_HINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:(\d+(?:\.\d+)?)\s*(?:pt)?\s*[-–—:]?\s*font\s*size|font\s*size\s*[-–—:]?\s*(\d+(?:\.\d+)?))",
    )
    .unwrap()
});

static BOLD_HINT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(not\s+bold|bold)\b").unwrap());
static ITALIC_HINT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(not\s+italic|italici[sz]ed|italic)\b").unwrap());

/// Font families recognized inside instructional exemplar text.
const FAMILY_HINTS: &[&str] = &["times new roman", "arial", "calibri", "cambria"];

/// Expected formatting attributes for one section role.
///
/// Every field is optional; unset fields mean "no expectation". Once both
/// size fields are populated, `font_size_half_points == round(pt * 2)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpectedFormat {
    /// Expected font size in points
    pub font_size_pt: Option<f32>,

    /// Expected font size in half points
    pub font_size_half_points: Option<u32>,

    /// Expected normalized font family
    pub font_family: Option<String>,

    /// Expected bold flag
    pub bold: Option<bool>,

    /// Expected italic flag
    pub italic: Option<bool>,
}

impl ExpectedFormat {
    /// An empty expectation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: expected size in points.
    pub fn size_pt(mut self, pt: f32) -> Self {
        self.font_size_pt = Some(pt);
        self.normalize_size();
        self
    }

    /// Builder: expected font family (normalized).
    pub fn family(mut self, family: impl AsRef<str>) -> Self {
        self.font_family = Some(normalize_font_name(family.as_ref()));
        self
    }

    /// Builder: expected bold flag.
    pub fn bold(mut self, bold: bool) -> Self {
        self.bold = Some(bold);
        self
    }

    /// Builder: expected italic flag.
    pub fn italic(mut self, italic: bool) -> Self {
        self.italic = Some(italic);
        self
    }

    /// Whether no expectation is set at all.
    pub fn is_empty(&self) -> bool {
        self.font_size_pt.is_none()
            && self.font_size_half_points.is_none()
            && self.font_family.is_none()
            && self.bold.is_none()
            && self.italic.is_none()
    }

    /// Keep the point / half-point pair mutually consistent. The point value
    /// is authoritative when both are present.
    pub fn normalize_size(&mut self) {
        match (self.font_size_pt, self.font_size_half_points) {
            (Some(pt), _) => self.font_size_half_points = Some((pt * 2.0).round() as u32),
            (None, Some(hp)) => self.font_size_pt = Some(hp as f32 / 2.0),
            (None, None) => {}
        }
    }

    /// Fill unset fields of `self` from `other`.
    pub fn fill_from(&mut self, other: &ExpectedFormat) {
        if self.font_size_pt.is_none() && self.font_size_half_points.is_none() {
            self.font_size_pt = other.font_size_pt;
            self.font_size_half_points = other.font_size_half_points;
        }
        if self.font_family.is_none() {
            self.font_family = other.font_family.clone();
        }
        if self.bold.is_none() {
            self.bold = other.bold;
        }
        if self.italic.is_none() {
            self.italic = other.italic;
        }
        self.normalize_size();
    }

    /// Overwrite fields of `self` with every field `other` defines.
    pub fn override_with(&mut self, other: &ExpectedFormat) {
        if other.font_size_pt.is_some() || other.font_size_half_points.is_some() {
            self.font_size_pt = other.font_size_pt;
            self.font_size_half_points = other.font_size_half_points;
        }
        if other.font_family.is_some() {
            self.font_family = other.font_family.clone();
        }
        if other.bold.is_some() {
            self.bold = other.bold;
        }
        if other.italic.is_some() {
            self.italic = other.italic;
        }
        self.normalize_size();
    }

    /// Mine instructional phrases out of exemplar text. Explicit hints beat
    /// the statistical vote, so any hit overwrites the matching field.
    pub fn apply_text_hints(&mut self, text: &str) {
        if let Some(caps) = SIZE_HINT.captures(text) {
            let num = caps.get(1).or_else(|| caps.get(2));
            if let Some(pt) = num.and_then(|m| m.as_str().parse::<f32>().ok()) {
                self.font_size_pt = Some(pt);
                self.normalize_size();
            }
        }
        if let Some(m) = BOLD_HINT.find(text) {
            self.bold = Some(!m.as_str().to_lowercase().starts_with("not"));
        }
        if let Some(m) = ITALIC_HINT.find(text) {
            self.italic = Some(!m.as_str().to_lowercase().starts_with("not"));
        }
        let lower = text.to_lowercase();
        for family in FAMILY_HINTS {
            if lower.contains(family) {
                self.font_family = Some(normalize_font_name(family));
                break;
            }
        }
    }

    /// Built-in fallback expectations per label, used when neither the
    /// template statistics nor an overlay rule cover a section.
    pub fn default_for(label: SectionLabel) -> ExpectedFormat {
        use SectionLabel::*;
        let base = ExpectedFormat::new().family("Times New Roman");
        match label {
            Title => base.size_pt(24.0).bold(true),
            Subtitle => base.size_pt(14.0).bold(false),
            JournalName => base.size_pt(20.0).bold(true),
            JournalMetadata | SubmissionHistory => base.size_pt(9.0).bold(false),
            Authors => base.size_pt(11.0).bold(true),
            Affiliation => base.size_pt(9.0).bold(false),
            CorrespondingAuthor => base.size_pt(9.0).bold(false).italic(true),
            Abstract => base.size_pt(9.0).bold(false),
            Keywords => base.size_pt(9.0).bold(false).italic(true),
            Introduction | LiteratureReview | Methodology | ResultsAndDiscussion
            | Conclusion | Acknowledgement | FundingStatement | AuthorContributions
            | ConflictOfInterests | EthicsStatement | MainHeading => {
                base.size_pt(10.0).bold(true)
            }
            References => base.size_pt(9.0).bold(false),
            FigureCaption | TableCaption | BodyText => base.size_pt(10.0).bold(false),
        }
    }
}
