//! Document package access.
//!
//! A DOCX package is a zip archive of XML parts. Only the main content part
//! is ever rewritten; every other part is carried through byte-for-byte.

mod content;
pub mod rules;
pub mod styles;

pub use content::{ContentPart, Segment};
pub use rules::StructuredRules;
pub use styles::StyleSheet;

use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::error::{Error, Result};
use crate::model::ParagraphRecord;

/// Name of the main content part.
pub const CONTENT_PART: &str = "word/document.xml";

/// Name of the paragraph-style part.
pub const STYLES_PART: &str = "word/styles.xml";

/// Preferred name of the structured-rules part.
pub const RULES_PART: &str = "word/formatRules.xml";

/// An opened document package with its parsed parts.
#[derive(Debug, Clone)]
pub struct DocxPackage {
    entries: Vec<(String, Vec<u8>)>,
    /// Segmented main content part
    pub content: ContentPart,
    /// Parsed style part, empty when absent
    pub styles: StyleSheet,
    /// Structured rules part, when the package embeds one
    pub structured_rules: Option<StructuredRules>,
}

impl DocxPackage {
    /// Open a package from its raw bytes.
    ///
    /// Fails with [`Error::PackageParse`] when the archive cannot be read and
    /// [`Error::MissingPart`] when the main content part is absent; both are
    /// fatal to analysis.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(data))
            .map_err(|e| Error::PackageParse(e.to_string()))?;

        let mut entries: Vec<(String, Vec<u8>)> = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| Error::PackageParse(e.to_string()))?;
            if file.is_dir() {
                continue;
            }
            let mut bytes = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut bytes)?;
            entries.push((file.name().to_string(), bytes));
        }

        let content_xml = entries
            .iter()
            .find(|(name, _)| name == CONTENT_PART)
            .map(|(_, bytes)| String::from_utf8_lossy(bytes).into_owned())
            .ok_or_else(|| Error::MissingPart(CONTENT_PART.to_string()))?;
        let content = ContentPart::parse(&content_xml)?;

        let styles = entries
            .iter()
            .find(|(name, _)| name == STYLES_PART)
            .map(|(_, bytes)| StyleSheet::parse(&String::from_utf8_lossy(bytes)))
            .transpose()?
            .unwrap_or_default();

        let structured_rules = find_rules_part(&entries)?;

        Ok(Self {
            entries,
            content,
            styles,
            structured_rules,
        })
    }

    /// Extract the ordered paragraph records of the content part.
    pub fn records(&self) -> Vec<ParagraphRecord> {
        self.content.extract_records(&self.styles)
    }

    /// Preview of the first paragraphs of the content part.
    pub fn preview(&self, max_paragraphs: usize) -> String {
        self.content.preview(&self.styles, max_paragraphs)
    }

    /// Serialize the package with `content` replacing the main content part.
    /// All other parts are written back byte-for-byte in their original
    /// order.
    pub fn write_with_content(&self, content: &ContentPart) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        let content_xml = content.to_xml();

        for (name, bytes) in &self.entries {
            writer
                .start_file(name.as_str(), options)
                .map_err(|e| Error::Mutation(e.to_string()))?;
            if name == CONTENT_PART {
                writer.write_all(content_xml.as_bytes())?;
            } else {
                writer.write_all(bytes)?;
            }
        }
        let cursor = writer
            .finish()
            .map_err(|e| Error::Mutation(e.to_string()))?;
        Ok(cursor.into_inner())
    }
}

/// Locate a structured-rules part: the well-known name first, then any
/// custom-XML part whose root element identifies it.
fn find_rules_part(entries: &[(String, Vec<u8>)]) -> Result<Option<StructuredRules>> {
    for (name, bytes) in entries {
        let candidate =
            name == RULES_PART || (name.starts_with("customXml/") && name.ends_with(".xml"));
        if !candidate {
            continue;
        }
        let xml = String::from_utf8_lossy(bytes);
        if StructuredRules::is_rules_part(&xml) {
            return Ok(Some(StructuredRules::parse(&xml)?));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_package(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (name, xml) in parts {
            writer.start_file(*name, options).unwrap();
            writer.write_all(xml.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    const MINIMAL_DOC: &str = r#"<w:document xmlns:w="x"><w:body><w:p><w:r><w:t>Hello</w:t></w:r></w:p></w:body></w:document>"#;

    #[test]
    fn test_open_and_extract() {
        let data = build_package(&[(CONTENT_PART, MINIMAL_DOC)]);
        let package = DocxPackage::from_bytes(&data).unwrap();
        let records = package.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "Hello");
        assert!(package.structured_rules.is_none());
    }

    #[test]
    fn test_missing_content_part_is_fatal() {
        let data = build_package(&[("word/other.xml", "<x/>")]);
        let err = DocxPackage::from_bytes(&data).unwrap_err();
        assert!(matches!(err, Error::MissingPart(part) if part == CONTENT_PART));
    }

    #[test]
    fn test_corrupt_archive_is_fatal() {
        let err = DocxPackage::from_bytes(b"definitely not a zip").unwrap_err();
        assert!(matches!(err, Error::PackageParse(_)));
    }

    #[test]
    fn test_other_parts_preserved_byte_for_byte() {
        let data = build_package(&[
            ("[Content_Types].xml", "<Types/>"),
            (CONTENT_PART, MINIMAL_DOC),
            ("word/media/blob.bin", "binary-ish payload"),
        ]);
        let package = DocxPackage::from_bytes(&data).unwrap();
        let rewritten = package.write_with_content(&package.content).unwrap();

        let reopened = DocxPackage::from_bytes(&rewritten).unwrap();
        assert_eq!(reopened.entries.len(), 3);
        for ((name_a, bytes_a), (name_b, bytes_b)) in
            package.entries.iter().zip(reopened.entries.iter())
        {
            assert_eq!(name_a, name_b);
            assert_eq!(bytes_a, bytes_b);
        }
    }

    #[test]
    fn test_rules_part_detection() {
        let rules = r#"<formattingRules><font role="title" size="24" weight="bold"/></formattingRules>"#;
        let data = build_package(&[(CONTENT_PART, MINIMAL_DOC), ("customXml/item1.xml", rules)]);
        let package = DocxPackage::from_bytes(&data).unwrap();
        let parsed = package.structured_rules.unwrap();
        assert!(parsed.overlay.contains_key(&crate::model::SectionLabel::Title));
    }
}
