//! Integration tests for the mutation operations.

mod common;

use common::{conforming_manuscript_paragraphs, docx, template, Para};
use manucheck::{analyze, DocxPackage, SectionLabel};

fn broken_manuscript() -> Vec<u8> {
    let mut paragraphs = conforming_manuscript_paragraphs();
    paragraphs[10] = Para::new("Manual formatting checks are slow and error prone for journal editors.")
        .size(24)
        .bold();
    docx(&paragraphs)
}

#[test]
fn test_highlight_marks_flagged_paragraphs_only() {
    let template = template();
    let manuscript = broken_manuscript();
    let report = analyze(&template, &manuscript);
    assert!(!report.findings.is_empty());

    let bytes = manucheck::highlight(&template, &manuscript, &report.findings).unwrap();
    let package = DocxPackage::from_bytes(&bytes).unwrap();
    assert!(package
        .content
        .paragraph_xml(10)
        .unwrap()
        .contains(r#"<w:highlight w:val="yellow"/>"#));
    assert!(!package.content.paragraph_xml(9).unwrap().contains("w:highlight"));
}

#[test]
fn test_highlight_is_idempotent() {
    let template = template();
    let manuscript = broken_manuscript();
    let report = analyze(&template, &manuscript);

    let once = manucheck::highlight(&template, &manuscript, &report.findings).unwrap();
    let twice = manucheck::highlight(&template, &once, &report.findings).unwrap();
    let first = DocxPackage::from_bytes(&once).unwrap();
    let second = DocxPackage::from_bytes(&twice).unwrap();
    assert_eq!(first.content.to_xml(), second.content.to_xml());
}

#[test]
fn test_highlight_preserves_other_parts() {
    let template = template();
    let manuscript = broken_manuscript();
    let report = analyze(&template, &manuscript);

    let bytes = manucheck::highlight(&template, &manuscript, &report.findings).unwrap();
    let original = DocxPackage::from_bytes(&manuscript).unwrap();
    let mutated = DocxPackage::from_bytes(&bytes).unwrap();
    // Styles part untouched
    assert_eq!(original.styles.default_font, mutated.styles.default_font);
    // Paragraph count unchanged; only runs gained attributes
    assert_eq!(
        original.content.paragraph_count(),
        mutated.content.paragraph_count()
    );
}

#[test]
fn test_correct_resolves_the_findings() {
    let template = template();
    let manuscript = broken_manuscript();
    let report = analyze(&template, &manuscript);
    assert_eq!(report.findings.len(), 2);

    let corrected = manucheck::correct(&template, &manuscript, &report.findings).unwrap();
    let after = analyze(&template, &corrected);
    assert!(after.findings.is_empty(), "still found: {:#?}", after.findings);
}

#[test]
fn test_correct_applies_size_to_runs() {
    let template = template();
    let manuscript = broken_manuscript();
    let report = analyze(&template, &manuscript);

    let corrected = manucheck::correct(&template, &manuscript, &report.findings).unwrap();
    let package = DocxPackage::from_bytes(&corrected).unwrap();
    let records = package.records();
    let fixed = records.iter().find(|r| r.index == 10).unwrap();
    assert_eq!(fixed.font_size_half_points, Some(20));
    assert!(!fixed.bold);
}

#[test]
fn test_insert_missing_pair_shifts_following_paragraphs() {
    let template = template();
    // Manuscript without acknowledgement and funding statement (indices 13-16)
    let mut paragraphs = conforming_manuscript_paragraphs();
    paragraphs.drain(13..17);
    let manuscript = docx(&paragraphs);

    let report = analyze(&template, &manuscript);
    let missing = report.missing_labels();
    assert!(missing.contains(&SectionLabel::Acknowledgement));
    assert!(missing.contains(&SectionLabel::FundingStatement));

    let references_before = find_index(&manuscript, "References");
    let bytes = manucheck::insert_missing_sections(&template, &manuscript, &missing).unwrap();
    let references_after = find_index(&bytes, "References");

    // Four paragraphs in one unit just before the references section
    assert_eq!(references_after, references_before + 4);
    let package = DocxPackage::from_bytes(&bytes).unwrap();
    let records = package.records();
    let position = records
        .iter()
        .position(|r| r.index == references_before)
        .unwrap();
    assert_eq!(records[position].text, "Acknowledgement");
    assert_eq!(records[position + 2].text, "Funding Statement");
    for offset in 0..4 {
        let xml = package
            .content
            .paragraph_xml(references_before + offset)
            .unwrap();
        assert!(xml.contains("w:highlight"), "paragraph {offset} not highlighted");
    }

    // Inserting fills the gap on re-analysis
    let after = analyze(&template, &bytes);
    assert!(after.missing_sections.is_empty(), "missing: {:?}", after.missing_sections);
}

fn find_index(package: &[u8], text: &str) -> usize {
    let package = DocxPackage::from_bytes(package).unwrap();
    package
        .records()
        .iter()
        .find(|r| r.text == text)
        .map(|r| r.index)
        .unwrap()
}
