//! Core data model shared by the extractor, classifier, comparator, and
//! mutator.

mod finding;
mod label;
mod paragraph;

pub use finding::{qualified_section, text_snippet, ExpectedValue, Finding, FindingKind};
pub use label::SectionLabel;
pub use paragraph::{Alignment, ParagraphRecord, RunRecord};
