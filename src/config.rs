//! Per-journal rule configuration.
//!
//! The template-specific override layer: exact text matches, the required
//! metadata line, and the seed token-sets used to recognize front-matter
//! journal metadata. The defaults reproduce the behavior of the fixed
//! journal template this engine was originally tuned for; callers checking a
//! different journal replace them through the builder methods.

use crate::classify::normalize::normalize_exact;
use crate::model::SectionLabel;

/// Configurable rule table for one journal template.
#[derive(Debug, Clone)]
pub struct RuleConfig {
    /// Exact-text overrides keyed by normalized text, highest-precision rule
    /// for fixed templates.
    pub special_texts: Vec<(String, SectionLabel)>,

    /// Fixed text line expected somewhere inside the journal-metadata block.
    pub required_metadata_text: String,

    /// Seed token-sets recognized as journal metadata by overlap.
    pub metadata_token_seeds: Vec<String>,

    /// Paragraph index below which front-matter heuristics apply.
    pub front_matter_limit: usize,

    /// Font size (points) at or above which a paragraph is title-sized.
    pub title_size_threshold: f32,
}

impl RuleConfig {
    /// Create a config with the built-in journal defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an exact-text override. The text is matched after
    /// normalization (lowercased, whitespace collapsed).
    pub fn with_special_text(mut self, text: impl AsRef<str>, label: SectionLabel) -> Self {
        self.special_texts
            .push((normalize_exact(text.as_ref()), label));
        self
    }

    /// Replace the required journal-metadata line.
    pub fn with_required_metadata_text(mut self, text: impl Into<String>) -> Self {
        self.required_metadata_text = text.into();
        self
    }

    /// Add a seed line whose token-set identifies journal metadata.
    pub fn with_metadata_seed(mut self, text: impl Into<String>) -> Self {
        self.metadata_token_seeds.push(text.into());
        self
    }

    /// Set the front-matter paragraph-index threshold.
    pub fn with_front_matter_limit(mut self, limit: usize) -> Self {
        self.front_matter_limit = limit;
        self
    }

    /// Look up an exact-text override for already-normalized text.
    pub fn special_label(&self, normalized: &str) -> Option<SectionLabel> {
        self.special_texts
            .iter()
            .find(|(text, _)| text == normalized)
            .map(|(_, label)| *label)
    }
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            special_texts: vec![
                (
                    normalize_exact("Journal of Informatics and Web Engineering"),
                    SectionLabel::JournalName,
                ),
                (
                    normalize_exact("Persiaran Multimedia, 63100 Cyberjaya, Selangor, Malaysia"),
                    SectionLabel::JournalMetadata,
                ),
            ],
            required_metadata_text: "Persiaran Multimedia, 63100 Cyberjaya, Selangor, Malaysia"
                .to_string(),
            metadata_token_seeds: vec![
                "Journal of Informatics and Web Engineering".to_string(),
                "Manuscript received revised accepted published".to_string(),
            ],
            front_matter_limit: 8,
            title_size_threshold: 20.0,
        }
    }
}
