//! Manuscript-against-profile comparison.
//!
//! Produces per-paragraph formatting findings plus structural findings for
//! missing, duplicated, and out-of-order sections. Comparison is pure: it
//! never touches the manuscript bytes.

use std::collections::HashMap;

use crate::classify::normalize::{fonts_similar, normalize_exact};
use crate::classify::{classify, AnalysisContext};
use crate::config::RuleConfig;
use crate::model::{
    qualified_section, ExpectedValue, Finding, FindingKind, ParagraphRecord, SectionLabel,
};
use crate::profile::{fixed_overrides, resolve, ExpectedFormat, TemplateProfile};

/// Sections a manuscript must always contain, independent of the template.
const ALWAYS_REQUIRED: &[SectionLabel] = &[
    SectionLabel::Title,
    SectionLabel::Abstract,
    SectionLabel::Keywords,
    SectionLabel::References,
    SectionLabel::Acknowledgement,
    SectionLabel::FundingStatement,
];

/// Compare extracted manuscript paragraphs against a template profile.
///
/// Returns the findings plus the list of required sections the manuscript
/// lacks entirely, in template order.
pub fn compare(
    records: &[ParagraphRecord],
    profile: &TemplateProfile,
    config: &RuleConfig,
) -> (Vec<Finding>, Vec<SectionLabel>) {
    let mut findings = Vec::new();
    let mut ctx = AnalysisContext::new(config);
    let mut heading_context: Option<SectionLabel> = None;

    let mut occurrences: HashMap<SectionLabel, Vec<usize>> = HashMap::new();
    let mut labeled: Vec<(SectionLabel, &ParagraphRecord, Option<SectionLabel>)> = Vec::new();
    let mut metadata_text = String::new();

    for record in records {
        if record.is_empty() {
            continue;
        }
        let label = classify(record, config, &mut ctx);
        occurrences.entry(label).or_default().push(record.index);
        let context = if label == SectionLabel::BodyText {
            heading_context
        } else {
            None
        };
        if label.is_context() {
            heading_context = Some(label);
        }
        if matches!(
            label,
            SectionLabel::JournalName | SectionLabel::JournalMetadata
        ) {
            metadata_text.push(' ');
            metadata_text.push_str(&record.text);
        }
        labeled.push((label, record, context));
    }

    for (label, record, context) in labeled {
        let expected = resolve(profile, label, &record.text, context);
        if label == SectionLabel::BodyText {
            check_body_paragraph(&mut findings, record, context, &expected);
        } else {
            check_paragraph(&mut findings, label, record, &expected);
        }
    }

    let missing = missing_sections(&mut findings, profile, &occurrences);
    check_duplicates(&mut findings, records, &occurrences);
    check_order(&mut findings, profile, records, &occurrences);
    check_required_text(&mut findings, config, &metadata_text);

    (findings, missing)
}

/// Format a point size for display ("10 pt", "9.5 pt").
pub fn display_pt(pt: f32) -> String {
    if (pt - pt.round()).abs() < f32::EPSILON {
        format!("{} pt", pt.round() as i64)
    } else {
        format!("{pt} pt")
    }
}

/// Body text: size and family only; stray bold is always wrong.
fn check_body_paragraph(
    findings: &mut Vec<Finding>,
    record: &ParagraphRecord,
    context: Option<SectionLabel>,
    expected: &ExpectedFormat,
) {
    let section = qualified_section(SectionLabel::BodyText, context);
    push_size_and_family(findings, &section, record, expected);
    if record.bold {
        findings.push(Finding::for_paragraph(
            FindingKind::BoldIncorrect,
            section,
            record.index,
            "bold",
            "not bold",
            ExpectedValue::Bold(false),
            &record.text,
            "Remove bold formatting",
        ));
    }
}

fn check_paragraph(
    findings: &mut Vec<Finding>,
    label: SectionLabel,
    record: &ParagraphRecord,
    expected: &ExpectedFormat,
) {
    let section = qualified_section(label, None);
    push_size_and_family(findings, &section, record, expected);

    if let Some(want_bold) = expected.bold {
        if want_bold && !record.bold {
            findings.push(Finding::for_paragraph(
                FindingKind::BoldMissing,
                section.clone(),
                record.index,
                "not bold",
                "bold",
                ExpectedValue::Bold(true),
                &record.text,
                "Apply bold formatting",
            ));
        } else if !want_bold && record.bold {
            findings.push(Finding::for_paragraph(
                FindingKind::BoldIncorrect,
                section.clone(),
                record.index,
                "bold",
                "not bold",
                ExpectedValue::Bold(false),
                &record.text,
                "Remove bold formatting",
            ));
        }
    }

    // Italic is only mandated for a fixed set of labels (keywords and
    // corresponding author must be italic, headers and the title must not).
    // Template statistics still resolve an italic expectation for other
    // labels, but that is styling guidance, not a deviation.
    if fixed_overrides(label).italic.is_none() {
        return;
    }
    if let Some(want_italic) = expected.italic {
        if want_italic && !record.italic {
            findings.push(Finding::for_paragraph(
                FindingKind::ItalicMissing,
                section,
                record.index,
                "not italic",
                "italic",
                ExpectedValue::Italic(true),
                &record.text,
                "Apply italic formatting",
            ));
        } else if !want_italic && record.italic {
            findings.push(Finding::for_paragraph(
                FindingKind::ItalicIncorrect,
                section,
                record.index,
                "italic",
                "not italic",
                ExpectedValue::Italic(false),
                &record.text,
                "Remove italic formatting",
            ));
        }
    }
}

fn push_size_and_family(
    findings: &mut Vec<Finding>,
    section: &str,
    record: &ParagraphRecord,
    expected: &ExpectedFormat,
) {
    if let Some((found, want, value)) = size_mismatch(expected, record) {
        findings.push(Finding::for_paragraph(
            FindingKind::SizeMismatch,
            section,
            record.index,
            found,
            want.clone(),
            value,
            &record.text,
            format!("Set font size to {want}"),
        ));
    }
    if let (Some(want), Some(got)) = (&expected.font_family, &record.font_family) {
        if !fonts_similar(want, got) {
            findings.push(Finding::for_paragraph(
                FindingKind::FamilyMismatch,
                section,
                record.index,
                got.clone(),
                want.clone(),
                ExpectedValue::Family(want.clone()),
                &record.text,
                format!("Change font to {want}"),
            ));
        }
    }
}

/// Size comparison with a one-half-point tolerance. Falls back to a
/// half-point-of-a-point tolerance when only point values are known.
fn size_mismatch(
    expected: &ExpectedFormat,
    record: &ParagraphRecord,
) -> Option<(String, String, ExpectedValue)> {
    let mismatch = match (
        expected.font_size_half_points,
        record.font_size_half_points,
        expected.font_size_pt,
        record.font_size_pt,
    ) {
        (Some(want_hp), Some(got_hp), _, _) => want_hp.abs_diff(got_hp) > 1,
        (_, _, Some(want_pt), Some(got_pt)) => (want_pt - got_pt).abs() >= 0.5,
        _ => false,
    };
    if !mismatch {
        return None;
    }
    let want_pt = expected.font_size_pt?;
    let got_pt = record.font_size_pt?;
    Some((
        display_pt(got_pt),
        display_pt(want_pt),
        ExpectedValue::size_pt(want_pt),
    ))
}

/// Labels the manuscript is required to contain: the always-required set plus
/// every significant section the template itself carries.
fn required_labels(profile: &TemplateProfile) -> Vec<SectionLabel> {
    let mut required: Vec<SectionLabel> = profile
        .order
        .iter()
        .copied()
        .filter(|l| l.is_significant())
        .collect();
    for label in ALWAYS_REQUIRED {
        if !required.contains(label) {
            required.push(*label);
        }
    }
    required
}

fn missing_sections(
    findings: &mut Vec<Finding>,
    profile: &TemplateProfile,
    occurrences: &HashMap<SectionLabel, Vec<usize>>,
) -> Vec<SectionLabel> {
    let mut missing = Vec::new();
    for label in required_labels(profile) {
        if occurrences.contains_key(&label) {
            continue;
        }
        findings.push(Finding::structural(
            FindingKind::MissingSection,
            label,
            "absent",
            "present",
            format!("Add a {label} section"),
        ));
        missing.push(label);
    }
    missing
}

fn check_duplicates(
    findings: &mut Vec<Finding>,
    records: &[ParagraphRecord],
    occurrences: &HashMap<SectionLabel, Vec<usize>>,
) {
    let mut duplicated: Vec<(&SectionLabel, &Vec<usize>)> = occurrences
        .iter()
        .filter(|(label, indices)| label.is_significant() && indices.len() > 1)
        .collect();
    duplicated.sort_by_key(|(_, indices)| indices[0]);

    for (label, indices) in duplicated {
        let snippet = records
            .iter()
            .find(|r| r.index == indices[0])
            .map(|r| r.text.as_str())
            .unwrap_or("");
        let mut finding = Finding::for_paragraph(
            FindingKind::DuplicateSection,
            label.to_string(),
            indices[0],
            format!("{} occurrences", indices.len()),
            "1 occurrence",
            ExpectedValue::None,
            snippet,
            format!("Merge the duplicated {label} sections"),
        );
        finding.paragraph_indices = indices.clone();
        finding.pages = indices.iter().map(|i| 1 + i / 5).collect();
        findings.push(finding);
    }
}

/// Order check against the template's section sequence. A finding is anchored
/// at the first occurrence of each section that appears after a section the
/// template places later.
fn check_order(
    findings: &mut Vec<Finding>,
    profile: &TemplateProfile,
    records: &[ParagraphRecord],
    occurrences: &HashMap<SectionLabel, Vec<usize>>,
) {
    let present: Vec<(SectionLabel, usize)> = profile
        .order
        .iter()
        .filter(|l| l.is_significant())
        .filter_map(|l| occurrences.get(l).map(|idx| (*l, idx[0])))
        .collect();

    for (pos, (label, first)) in present.iter().enumerate() {
        let offender = present[pos + 1..]
            .iter()
            .filter(|(_, later_first)| later_first < first)
            .min_by_key(|(_, later_first)| *later_first);
        let Some((later_label, _)) = offender else {
            continue;
        };
        let snippet = records
            .iter()
            .find(|r| r.index == *first)
            .map(|r| r.text.as_str())
            .unwrap_or("");
        findings.push(Finding::for_paragraph(
            FindingKind::OrderMismatch,
            label.to_string(),
            *first,
            format!("{label} appears after {later_label}"),
            format!("{label} before {later_label}"),
            ExpectedValue::None,
            snippet,
            format!("Move the {label} section before {later_label}"),
        ));
    }
}

/// The fixed journal line must appear somewhere in the front-matter metadata.
fn check_required_text(findings: &mut Vec<Finding>, config: &RuleConfig, metadata_text: &str) {
    if config.required_metadata_text.is_empty() {
        return;
    }
    let required = &config.required_metadata_text;
    if normalize_exact(metadata_text).contains(&normalize_exact(required)) {
        return;
    }
    findings.push(Finding::structural(
        FindingKind::RequiredTextMissing,
        SectionLabel::JournalMetadata,
        "absent",
        required.clone(),
        format!("Add the required text \"{required}\" to the journal metadata"),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Alignment, RunRecord};

    fn styled(
        index: usize,
        text: &str,
        hp: u32,
        bold: bool,
        italic: bool,
        family: &str,
    ) -> ParagraphRecord {
        let mut run = RunRecord::new(text);
        run.font_size_half_points = Some(hp);
        run.font_size_pt = Some(hp as f32 / 2.0);
        run.bold = bold;
        run.italic = italic;
        run.font_family = Some(family.to_string());
        ParagraphRecord::from_runs(index, vec![run], None, Alignment::Left, None)
    }

    fn para(index: usize, text: &str, hp: u32) -> ParagraphRecord {
        styled(index, text, hp, false, false, "Times New Roman")
    }

    fn bare_config() -> RuleConfig {
        let mut config = RuleConfig::default();
        config.required_metadata_text = String::new();
        config
    }

    // Indices start at 2: real documents consume front-matter indices with
    // empty paragraphs that yield no records.
    fn template_records() -> Vec<ParagraphRecord> {
        vec![
            styled(2, "A Model Template Paper Title", 48, true, false, "Times New Roman"),
            para(3, "Abstract", 18),
            para(4, "The prose of the abstract body is long enough to count.", 20),
            styled(5, "Keywords: templates, formatting", 18, false, true, "Times New Roman"),
            para(6, "1. Introduction", 20),
            para(7, "Plain body prose for the introduction section here.", 20),
            para(8, "Acknowledgement", 20),
            para(9, "The authors thank the reviewers for their comments.", 20),
            para(10, "Funding Statement", 20),
            para(11, "This work received no external funding support.", 20),
            para(12, "References", 20),
            para(13, "Doe, J. An example reference entry with details.", 20),
        ]
    }

    fn profile_from(records: &[ParagraphRecord], config: &RuleConfig) -> TemplateProfile {
        TemplateProfile::build(records, None, config)
    }

    #[test]
    fn test_conforming_manuscript_yields_no_findings() {
        let config = bare_config();
        let profile = profile_from(&template_records(), &config);
        let manuscript = vec![
            styled(2, "A Different Manuscript Title", 48, true, false, "Times New Roman"),
            para(3, "Abstract", 18),
            para(4, "This study examines formatting compliance in detail.", 20),
            styled(5, "Keywords: compliance, documents", 18, false, true, "Times New Roman"),
            para(6, "1. Introduction", 20),
            para(7, "Plenty of ordinary body prose goes here for the test.", 20),
            para(8, "Acknowledgement", 20),
            para(9, "The authors thank their colleagues sincerely.", 20),
            para(10, "Funding Statement", 20),
            para(11, "No funding was received for this research work.", 20),
            para(12, "References", 20),
            para(13, "Smith, A. Another example reference entry here.", 20),
        ];
        let (findings, missing) = compare(&manuscript, &profile, &config);
        assert!(missing.is_empty(), "missing: {missing:?}");
        assert!(findings.is_empty(), "findings: {findings:?}");
    }

    #[test]
    fn test_size_and_bold_deviations() {
        let config = bare_config();
        let profile = profile_from(&template_records(), &config);
        let mut manuscript = template_records();
        // Body text blown up to 12 pt and made bold
        manuscript[5] = styled(
            7,
            "Plain body prose for the introduction section here.",
            24,
            true,
            false,
            "Times New Roman",
        );
        let (findings, _) = compare(&manuscript, &profile, &config);

        let size = findings
            .iter()
            .find(|f| f.kind == FindingKind::SizeMismatch)
            .unwrap();
        assert_eq!(size.paragraph_indices, vec![7]);
        assert_eq!(size.found, "12 pt");
        assert_eq!(size.expected, "10 pt");
        assert_eq!(size.expected_value, ExpectedValue::size_pt(10.0));
        assert_eq!(size.section, "body_text::introduction");
        assert_eq!(size.pages, vec![2]);

        let bold = findings
            .iter()
            .find(|f| f.kind == FindingKind::BoldIncorrect)
            .unwrap();
        assert_eq!(bold.expected_value, ExpectedValue::Bold(false));
        assert_eq!(findings.len(), 2);
    }

    #[test]
    fn test_keywords_without_italic() {
        let config = bare_config();
        let profile = profile_from(&template_records(), &config);
        let mut manuscript = template_records();
        manuscript[3] = styled(5, "Keywords: compliance, documents", 18, false, false, "Times New Roman");
        let (findings, _) = compare(&manuscript, &profile, &config);
        let italic = findings
            .iter()
            .find(|f| f.kind == FindingKind::ItalicMissing)
            .unwrap();
        assert_eq!(italic.section, "keywords");
        assert_eq!(italic.expected, "italic");
        assert_eq!(italic.expected_value, ExpectedValue::Italic(true));
    }

    #[test]
    fn test_stats_italic_unchecked_outside_mandatory_labels() {
        let config = bare_config();
        // Template authors line is upright, so the statistics vote
        // italic = false for the authors label
        let template = vec![
            styled(2, "A Model Template Paper Title", 48, true, false, "Times New Roman"),
            styled(3, "Alice Johnson, Bob Lee", 22, true, false, "Times New Roman"),
            para(4, "Abstract", 18),
            para(5, "The prose of the abstract body is long enough to count.", 20),
        ];
        let profile = profile_from(&template, &config);
        let manuscript = vec![
            styled(2, "A Different Manuscript Title", 48, true, false, "Times New Roman"),
            styled(3, "Carol Tan, David Kim", 22, true, true, "Times New Roman"),
            para(4, "Abstract", 18),
            para(5, "This study examines formatting compliance in detail.", 20),
        ];
        let (findings, _) = compare(&manuscript, &profile, &config);
        assert!(
            !findings.iter().any(|f| matches!(
                f.kind,
                FindingKind::ItalicMissing | FindingKind::ItalicIncorrect
            )),
            "findings: {findings:#?}"
        );
    }

    #[test]
    fn test_family_mismatch_tolerates_similar_fonts() {
        let config = bare_config();
        let profile = profile_from(&template_records(), &config);
        let mut manuscript = template_records();
        // Times vs Times New Roman is close enough
        manuscript[6] = styled(
            8,
            "Acknowledgement",
            20,
            false,
            false,
            "Times",
        );
        let (findings, _) = compare(&manuscript, &profile, &config);
        assert!(findings.is_empty(), "findings: {findings:?}");

        let mut manuscript = template_records();
        manuscript[6] = styled(8, "Acknowledgement", 20, false, false, "Comic Sans MS");
        let (findings, _) = compare(&manuscript, &profile, &config);
        let family = findings
            .iter()
            .find(|f| f.kind == FindingKind::FamilyMismatch)
            .unwrap();
        assert_eq!(family.found, "Comic Sans MS");
    }

    #[test]
    fn test_half_point_within_tolerance() {
        let expected = ExpectedFormat::new().size_pt(10.0);
        assert!(size_mismatch(&expected, &para(0, "text", 21)).is_none());
        assert!(size_mismatch(&expected, &para(0, "text", 24)).is_some());
    }

    #[test]
    fn test_missing_sections_reported() {
        let config = bare_config();
        let profile = profile_from(&template_records(), &config);
        let manuscript: Vec<ParagraphRecord> = template_records()
            .into_iter()
            .filter(|r| !r.text.starts_with("Keywords"))
            .collect();
        let (findings, missing) = compare(&manuscript, &profile, &config);
        assert_eq!(missing, vec![SectionLabel::Keywords]);
        assert!(findings
            .iter()
            .any(|f| f.kind == FindingKind::MissingSection && f.section == "keywords"));
    }

    #[test]
    fn test_duplicate_section_reported() {
        let config = bare_config();
        let profile = profile_from(&template_records(), &config);
        let mut manuscript = template_records();
        manuscript.push(para(14, "1. Introduction", 20));
        let (findings, _) = compare(&manuscript, &profile, &config);
        let dup = findings
            .iter()
            .find(|f| f.kind == FindingKind::DuplicateSection)
            .unwrap();
        assert_eq!(dup.section, "introduction");
        assert_eq!(dup.paragraph_indices, vec![6, 14]);
    }

    #[test]
    fn test_order_mismatch_anchored_at_late_section() {
        let config = bare_config();
        let profile = profile_from(&template_records(), &config);
        // Abstract after introduction, keywords left out entirely
        let manuscript = vec![
            styled(2, "A Shuffled Manuscript Title", 48, true, false, "Times New Roman"),
            para(3, "1. Introduction", 20),
            para(4, "Introduction prose that opens the manuscript here.", 20),
            para(5, "Abstract", 18),
            para(6, "Abstract prose that arrives far too late.", 20),
            para(7, "Acknowledgement", 20),
            para(8, "Thanks to everyone involved in this work.", 20),
            para(9, "Funding Statement", 20),
            para(10, "No funding was received for this work.", 20),
            para(11, "References", 20),
            para(12, "Doe, J. A reference entry with details.", 20),
        ];
        let (findings, missing) = compare(&manuscript, &profile, &config);
        assert_eq!(missing, vec![SectionLabel::Keywords]);
        let order: Vec<_> = findings
            .iter()
            .filter(|f| f.kind == FindingKind::OrderMismatch)
            .collect();
        assert_eq!(order.len(), 1);
        assert_eq!(order[0].section, "abstract");
        assert_eq!(order[0].paragraph_indices, vec![5]);
        assert!(order[0].found.contains("after introduction"));
    }

    #[test]
    fn test_required_metadata_text() {
        let config = RuleConfig::default();
        let profile = profile_from(&template_records(), &config);
        let (findings, _) = compare(&template_records(), &profile, &config);
        assert!(findings
            .iter()
            .any(|f| f.kind == FindingKind::RequiredTextMissing));

        let mut manuscript = vec![
            styled(0, "Journal of Informatics and Web Engineering", 40, true, false, "Times New Roman"),
            para(1, "Persiaran Multimedia, 63100 Cyberjaya, Selangor, Malaysia", 18),
        ];
        manuscript.extend(template_records());
        let (findings, _) = compare(&manuscript, &profile, &config);
        assert!(!findings
            .iter()
            .any(|f| f.kind == FindingKind::RequiredTextMissing));
    }
}
