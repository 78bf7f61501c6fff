//! Shared in-memory DOCX fixtures for the integration tests.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// One paragraph of a fixture document.
#[derive(Clone)]
pub struct Para {
    text: String,
    half_points: Option<u32>,
    bold: bool,
    italic: bool,
    family: Option<String>,
    centered: bool,
}

impl Para {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            half_points: None,
            bold: false,
            italic: false,
            family: None,
            centered: false,
        }
    }

    pub fn size(mut self, half_points: u32) -> Self {
        self.half_points = Some(half_points);
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn family(mut self, family: &str) -> Self {
        self.family = Some(family.to_string());
        self
    }

    pub fn centered(mut self) -> Self {
        self.centered = true;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    fn to_xml(&self) -> String {
        let mut ppr = String::new();
        if self.centered {
            ppr.push_str(r#"<w:jc w:val="center"/>"#);
        }
        let ppr = if ppr.is_empty() {
            String::new()
        } else {
            format!("<w:pPr>{ppr}</w:pPr>")
        };

        let mut rpr = String::new();
        if let Some(family) = &self.family {
            rpr.push_str(&format!(r#"<w:rFonts w:ascii="{family}" w:hAnsi="{family}"/>"#));
        }
        if self.bold {
            rpr.push_str("<w:b/>");
        }
        if self.italic {
            rpr.push_str("<w:i/>");
        }
        if let Some(hp) = self.half_points {
            rpr.push_str(&format!(r#"<w:sz w:val="{hp}"/><w:szCs w:val="{hp}"/>"#));
        }
        let rpr = if rpr.is_empty() {
            String::new()
        } else {
            format!("<w:rPr>{rpr}</w:rPr>")
        };

        format!(
            r#"<w:p>{ppr}<w:r>{rpr}<w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
            escape(&self.text)
        )
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Times New Roman" w:hAnsi="Times New Roman"/></w:rPr></w:rPrDefault></w:docDefaults>
</w:styles>"#;

/// Build a minimal but well-formed package from paragraph specs.
pub fn docx(paragraphs: &[Para]) -> Vec<u8> {
    docx_with_extra_part(paragraphs, None)
}

/// Like [`docx`], with one extra named part (e.g. a structured-rules part).
pub fn docx_with_extra_part(paragraphs: &[Para], extra: Option<(&str, &str)>) -> Vec<u8> {
    let body: String = paragraphs.iter().map(Para::to_xml).collect();
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
    );

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    let mut parts: Vec<(&str, String)> = vec![
        ("[Content_Types].xml", "<Types/>".to_string()),
        ("word/document.xml", document),
        ("word/styles.xml", STYLES_XML.to_string()),
    ];
    if let Some((name, xml)) = extra {
        parts.push((name, xml.to_string()));
    }
    for (name, xml) in parts {
        writer.start_file(name, options).unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// A template document in the shape of the journal's reference layout.
pub fn template() -> Vec<u8> {
    docx(&template_paragraphs())
}

pub fn template_paragraphs() -> Vec<Para> {
    vec![
        Para::new("Journal of Informatics and Web Engineering").size(40).bold(),
        Para::new("Persiaran Multimedia, 63100 Cyberjaya, Selangor, Malaysia").size(18),
        Para::new("How to Structure a Compliant Manuscript").size(48).bold().centered(),
        Para::new("Alice Johnson, Bob Lee").size(22).bold().centered(),
        Para::new("School of Computer Science, Example University, Springfield, USA").size(18),
        Para::new("alice@example.edu (Corresponding author)").size(18).italic(),
        Para::new("Abstract").size(18),
        Para::new("This template explains how each part of a manuscript should be formatted.").size(20),
        Para::new("Keywords: formatting, compliance, templates").size(18).italic(),
        Para::new("1. Introduction").size(20),
        Para::new("The introduction presents the background of the work in plain prose.").size(20),
        Para::new("2. Research Methodology").size(20),
        Para::new("The methodology section describes how the study was carried out.").size(20),
        Para::new("Acknowledgement").size(20),
        Para::new("The authors thank the anonymous reviewers for their helpful comments.").size(20),
        Para::new("Funding Statement").size(20),
        Para::new("This work was not supported by any external funding body.").size(20),
        Para::new("References").size(20),
        Para::new("[1] Doe, J., Example Work on Document Checking, Journal Press, 2024.").size(20),
    ]
}

/// A manuscript that follows the template exactly, with its own prose.
pub fn conforming_manuscript_paragraphs() -> Vec<Para> {
    vec![
        Para::new("Journal of Informatics and Web Engineering").size(40).bold(),
        Para::new("Persiaran Multimedia, 63100 Cyberjaya, Selangor, Malaysia").size(18),
        Para::new("Detecting Formatting Deviations in Submitted Papers").size(48).bold().centered(),
        Para::new("Carol Tan, David Kim").size(22).bold().centered(),
        Para::new("School of Computer Science, Example University, Springfield, USA").size(18),
        Para::new("carol@example.edu (Corresponding author)").size(18).italic(),
        Para::new("Abstract").size(18),
        Para::new("We present a tool that checks submitted manuscripts against a journal template.").size(20),
        Para::new("Keywords: validation, documents, tooling").size(18).italic(),
        Para::new("1. Introduction").size(20),
        Para::new("Manual formatting checks are slow and error prone for journal editors.").size(20),
        Para::new("2. Research Methodology").size(20),
        Para::new("We compare each paragraph of the submission with the template profile.").size(20),
        Para::new("Acknowledgement").size(20),
        Para::new("The authors are grateful to the editorial board for early feedback.").size(20),
        Para::new("Funding Statement").size(20),
        Para::new("No grants or external funds were used in this research.").size(20),
        Para::new("References").size(20),
        Para::new("[1] Smith, A., Automated Layout Validation, Journal Press, 2023.").size(20),
    ]
}
