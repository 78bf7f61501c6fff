//! Optional structured-rules part.
//!
//! A template package may embed an explicit rules part (either
//! `word/formatRules.xml` or any `customXml/*.xml` whose root element is
//! `formattingRules`). Its font declarations override statistically inferred
//! rules, and its section-order declaration overrides the first-seen template
//! order:
//!
//! ```xml
//! <formattingRules>
//!   <font role="introduction" family="Times New Roman" size="10"
//!         weight="normal" style="normal"/>
//!   <sectionOrder>
//!     <section name="title"/>
//!     <section name="abstract"/>
//!   </sectionOrder>
//! </formattingRules>
//! ```

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::Result;
use crate::model::SectionLabel;
use crate::profile::ExpectedFormat;

use super::styles::attr;

/// Parsed content of a structured-rules part.
#[derive(Debug, Clone, Default)]
pub struct StructuredRules {
    /// Explicit per-role format declarations
    pub overlay: HashMap<SectionLabel, ExpectedFormat>,

    /// Declared section order, empty when the part declares none
    pub order: Vec<SectionLabel>,
}

impl StructuredRules {
    /// Whether the XML looks like a rules part (root element name).
    pub fn is_rules_part(xml: &str) -> bool {
        let mut reader = Reader::from_str(xml);
        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                    return e.local_name().as_ref() == b"formattingRules";
                }
                Ok(Event::Eof) | Err(_) => return false,
                _ => {}
            }
        }
    }

    /// Parse a rules part. Declarations for unknown roles are skipped with a
    /// warning rather than failing the template.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut rules = StructuredRules::default();
        let mut in_order = false;

        loop {
            match reader.read_event()? {
                Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                    b"sectionOrder" => in_order = true,
                    b"section" if in_order => {
                        if let Some(label) = parse_role(attr(&e, "name").as_deref()) {
                            if !rules.order.contains(&label) {
                                rules.order.push(label);
                            }
                        }
                    }
                    b"font" => {
                        let Some(label) = parse_role(attr(&e, "role").as_deref()) else {
                            log::warn!(
                                "rules part declares unknown role {:?}",
                                attr(&e, "role")
                            );
                            continue;
                        };
                        let mut format = ExpectedFormat::new();
                        if let Some(family) = attr(&e, "family") {
                            format = format.family(family);
                        }
                        if let Some(pt) = attr(&e, "size").and_then(|s| s.parse::<f32>().ok()) {
                            format = format.size_pt(pt);
                        }
                        match attr(&e, "weight").as_deref() {
                            Some("bold") => format = format.bold(true),
                            Some("normal") => format = format.bold(false),
                            _ => {}
                        }
                        match attr(&e, "style").as_deref() {
                            Some("italic") => format = format.italic(true),
                            Some("normal") => format = format.italic(false),
                            _ => {}
                        }
                        rules.overlay.insert(label, format);
                    }
                    _ => {}
                },
                Event::End(e) if e.local_name().as_ref() == b"sectionOrder" => in_order = false,
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(rules)
    }
}

fn parse_role(raw: Option<&str>) -> Option<SectionLabel> {
    raw?.trim().parse().ok()
}
