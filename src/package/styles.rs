//! Paragraph-style sheet: style → font inheritance and the document default.

use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::Result;

/// One named paragraph style.
#[derive(Debug, Clone, Default)]
struct StyleEntry {
    font: Option<String>,
    based_on: Option<String>,
}

/// Font information extracted from the style part.
///
/// Used as the tail of the run font cascade: run fonts → paragraph run
/// defaults → paragraph style chain → document default.
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    /// Document-wide default font from `docDefaults`
    pub default_font: Option<String>,
    styles: HashMap<String, StyleEntry>,
}

impl StyleSheet {
    /// Parse the style part XML. A missing part parses as an empty sheet.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut sheet = StyleSheet::default();
        let mut in_doc_defaults = false;
        let mut current_style: Option<(String, StyleEntry)> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) | Event::Empty(e) => match local_name(&e) {
                    "docDefaults" => in_doc_defaults = true,
                    "style" => {
                        if let Some(done) = current_style.take() {
                            sheet.styles.insert(done.0, done.1);
                        }
                        if let Some(id) = attr(&e, "styleId") {
                            current_style = Some((id, StyleEntry::default()));
                        }
                    }
                    "basedOn" => {
                        if let (Some((_, entry)), Some(val)) = (current_style.as_mut(), attr(&e, "val")) {
                            entry.based_on = Some(val);
                        }
                    }
                    "rFonts" => {
                        let font = attr(&e, "ascii").or_else(|| attr(&e, "hAnsi"));
                        if let Some(font) = font {
                            if let Some((_, entry)) = current_style.as_mut() {
                                entry.font = Some(font);
                            } else if in_doc_defaults && sheet.default_font.is_none() {
                                sheet.default_font = Some(font);
                            }
                        }
                    }
                    _ => {}
                },
                Event::End(e) => match e.local_name().as_ref() {
                    b"docDefaults" => in_doc_defaults = false,
                    b"style" => {
                        if let Some(done) = current_style.take() {
                            sheet.styles.insert(done.0, done.1);
                        }
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }
        if let Some(done) = current_style.take() {
            sheet.styles.insert(done.0, done.1);
        }
        Ok(sheet)
    }

    /// Resolve the font for a style id, walking the `basedOn` chain and
    /// falling back to the document default.
    pub fn font_for_style(&self, style_id: &str) -> Option<String> {
        let mut current = Some(style_id.to_string());
        let mut hops = 0;
        while let Some(id) = current {
            // basedOn chains are short; the hop cap guards against cycles
            if hops > 16 {
                break;
            }
            hops += 1;
            match self.styles.get(&id) {
                Some(entry) => {
                    if let Some(font) = &entry.font {
                        return Some(font.clone());
                    }
                    current = entry.based_on.clone();
                }
                None => break,
            }
        }
        self.default_font.clone()
    }
}

/// Local element name without the namespace prefix.
fn local_name<'a>(e: &'a BytesStart<'a>) -> &'a str {
    std::str::from_utf8(e.local_name().into_inner()).unwrap_or("")
}

/// Attribute value by local name, ignoring the namespace prefix.
pub(crate) fn attr(e: &BytesStart<'_>, name: &str) -> Option<String> {
    for a in e.attributes().flatten() {
        let key = a.key.as_ref();
        let local = key.rsplit(|&b| b == b':').next().unwrap_or(key);
        if local == name.as_bytes() {
            return Some(String::from_utf8_lossy(&a.value).into_owned());
        }
    }
    None
}
