//! # manucheck
//!
//! Formatting-compliance engine for manuscript documents in zipped
//! word-processing packages.
//!
//! The engine compares a manuscript against a journal template: it extracts
//! the paragraphs of both documents, classifies every paragraph into a
//! section role, builds a formatting profile from the template, and reports
//! typed findings for every deviation. Three mutation operations rewrite the
//! manuscript package in place: highlighting flagged paragraphs, applying
//! corrections, and inserting canned paragraphs for missing sections.
//!
//! ## Quick start
//!
//! ```no_run
//! use manucheck::analyze;
//!
//! let template = std::fs::read("template.docx")?;
//! let manuscript = std::fs::read("manuscript.docx")?;
//! let report = analyze(&template, &manuscript);
//! for finding in &report.findings {
//!     println!("{}: {} (expected {})", finding.section, finding.found, finding.expected);
//! }
//! # Ok::<(), std::io::Error>(())
//! ```

pub mod classify;
pub mod compare;
pub mod config;
pub mod error;
pub mod model;
pub mod mutate;
pub mod package;
pub mod profile;

pub use config::RuleConfig;
pub use error::{Error, Result};
pub use model::{ExpectedValue, Finding, FindingKind, ParagraphRecord, RunRecord, SectionLabel};
pub use mutate::{MutationOutcome, MutationSkip};
pub use package::DocxPackage;
pub use profile::{ExpectedFormat, TemplateProfile};

use serde::{Deserialize, Serialize};

/// Sentinel placed in [`AnalysisReport::missing_sections`] when either
/// package cannot be parsed at all.
pub const PARSE_ERROR_SENTINEL: &str = "Error: Could not parse documents";

/// Result of one template/manuscript comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// All detected deviations, per-paragraph findings first
    pub findings: Vec<Finding>,

    /// Required section labels absent from the manuscript, or the parse
    /// failure sentinel
    pub missing_sections: Vec<String>,
}

impl AnalysisReport {
    /// Whether the analysis failed before any comparison ran.
    pub fn is_parse_failure(&self) -> bool {
        self.missing_sections
            .first()
            .is_some_and(|s| s == PARSE_ERROR_SENTINEL)
    }

    /// Missing sections as typed labels, skipping the sentinel.
    pub fn missing_labels(&self) -> Vec<SectionLabel> {
        self.missing_sections
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect()
    }
}

/// Analyze a manuscript against a template with the default rule
/// configuration.
///
/// Fails closed: when either package cannot be opened the report carries no
/// findings and the sentinel missing-sections entry.
pub fn analyze(template: &[u8], manuscript: &[u8]) -> AnalysisReport {
    analyze_with_config(template, manuscript, &RuleConfig::default())
}

/// [`analyze`] with a caller-supplied rule configuration.
pub fn analyze_with_config(
    template: &[u8],
    manuscript: &[u8],
    config: &RuleConfig,
) -> AnalysisReport {
    let (template, manuscript) = match open_pair(template, manuscript) {
        Ok(pair) => pair,
        Err(err) => {
            log::error!("analysis aborted: {err}");
            return AnalysisReport {
                findings: Vec::new(),
                missing_sections: vec![PARSE_ERROR_SENTINEL.to_string()],
            };
        }
    };

    let profile = TemplateProfile::build(
        &template.records(),
        template.structured_rules.as_ref(),
        config,
    );
    let (findings, missing) = compare::compare(&manuscript.records(), &profile, config);
    AnalysisReport {
        findings,
        missing_sections: missing.iter().map(|l| l.to_string()).collect(),
    }
}

/// Highlight every paragraph referenced by `findings` in the manuscript.
/// Returns the rewritten package bytes.
pub fn highlight(template: &[u8], manuscript: &[u8], findings: &[Finding]) -> Result<Vec<u8>> {
    let (_, manuscript) = open_pair(template, manuscript)?;
    mutate::highlight(&manuscript, findings)
}

/// Apply the corrections carried by `findings` to the manuscript. Returns
/// the rewritten package bytes; findings without a concrete instruction are
/// skipped.
pub fn correct(template: &[u8], manuscript: &[u8], findings: &[Finding]) -> Result<Vec<u8>> {
    let (_, manuscript) = open_pair(template, manuscript)?;
    let outcome = mutate::correct(&manuscript, findings)?;
    for skip in &outcome.skipped {
        log::warn!("correction skipped: {}", skip.reason);
    }
    Ok(outcome.bytes)
}

/// Insert canned, highlighted paragraphs for each missing section, placed
/// according to the template's section order.
pub fn insert_missing_sections(
    template: &[u8],
    manuscript: &[u8],
    missing: &[SectionLabel],
) -> Result<Vec<u8>> {
    insert_missing_sections_with_config(template, manuscript, missing, &RuleConfig::default())
}

/// [`insert_missing_sections`] with a caller-supplied rule configuration.
pub fn insert_missing_sections_with_config(
    template: &[u8],
    manuscript: &[u8],
    missing: &[SectionLabel],
    config: &RuleConfig,
) -> Result<Vec<u8>> {
    let (template, manuscript) = open_pair(template, manuscript)?;
    let profile = TemplateProfile::build(
        &template.records(),
        template.structured_rules.as_ref(),
        config,
    );
    let outcome = mutate::insert_missing_sections(&manuscript, &profile.order, missing, config)?;
    for skip in &outcome.skipped {
        log::warn!("insertion skipped: {}", skip.reason);
    }
    Ok(outcome.bytes)
}

/// Preview of the first paragraphs of a package's content part.
pub fn preview(package: &[u8], max_paragraphs: usize) -> Result<String> {
    let package = DocxPackage::from_bytes(package)?;
    Ok(package.preview(max_paragraphs))
}

fn open_pair(template: &[u8], manuscript: &[u8]) -> Result<(DocxPackage, DocxPackage)> {
    Ok((
        DocxPackage::from_bytes(template)?,
        DocxPackage::from_bytes(manuscript)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_fails_closed_on_garbage() {
        let report = analyze(b"not a package", b"also not a package");
        assert!(report.findings.is_empty());
        assert_eq!(report.missing_sections, vec![PARSE_ERROR_SENTINEL]);
        assert!(report.is_parse_failure());
        assert!(report.missing_labels().is_empty());
    }

    #[test]
    fn test_report_serializes() {
        let report = AnalysisReport {
            findings: Vec::new(),
            missing_sections: vec!["keywords".to_string()],
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"missing_sections\":[\"keywords\"]"));
        let back: AnalysisReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.missing_labels(), vec![SectionLabel::Keywords]);
    }
}
