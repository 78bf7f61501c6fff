//! Deterministic section classification.
//!
//! The classifier is an explicit ordered rule list: each rule is a named
//! predicate that either assigns a [`SectionLabel`] or passes. The first
//! matching rule wins; the only scoring happens inside the journal-metadata
//! overlap rule and the early-title TitleCase count. Everything a rule may
//! accumulate across paragraphs lives in a per-call [`AnalysisContext`],
//! never in process-wide state.

pub mod normalize;

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::RuleConfig;
use crate::model::{Alignment, ParagraphRecord, SectionLabel};
use normalize::{token_overlap, token_set, Normalized};

/// Tokens that mark a front-matter line as an address or institution.
const ADDRESS_TOKENS: &[&str] = &[
    "university",
    "universiti",
    "faculty",
    "department",
    "institute",
    "school",
    "college",
    "laboratory",
    "persiaran",
    "jalan",
    "street",
    "avenue",
    "road",
    "box",
];

static FIGURE_CAPTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^fig(?:ure)?\b").unwrap());
static TABLE_CAPTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^tab(?:le)?\b").unwrap());
static NUMBERED_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+[.)]?\s*").unwrap());
static NUMBERED_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+[.)]?\s*\w+").unwrap());
static HEADING_SHAPED_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:heading|h)\d*$").unwrap());

/// Per-analysis accumulation state for the classifier.
///
/// Holds the journal-metadata token-sets registered while walking one
/// document. Created fresh for each analysis or mutation call and discarded
/// afterwards, so concurrent calls on different documents never share state.
#[derive(Debug)]
pub struct AnalysisContext {
    metadata_sets: Vec<BTreeSet<String>>,
}

impl AnalysisContext {
    /// Create a context seeded from the configured metadata lines.
    pub fn new(config: &RuleConfig) -> Self {
        Self {
            metadata_sets: config
                .metadata_token_seeds
                .iter()
                .map(|line| token_set(line))
                .collect(),
        }
    }

    fn register_metadata(&mut self, tokens: BTreeSet<String>) {
        if !tokens.is_empty() {
            self.metadata_sets.push(tokens);
        }
    }

    /// Best (shared, coverage) overlap of `probe` against registered sets.
    fn best_overlap(&self, probe: &BTreeSet<String>) -> (usize, f32) {
        self.metadata_sets
            .iter()
            .map(|set| token_overlap(probe, set))
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap_or((0, 0.0))
    }
}

type RuleFn =
    fn(&ParagraphRecord, &Normalized, &RuleConfig, &mut AnalysisContext) -> Option<SectionLabel>;

/// One entry of the classification cascade.
pub struct ClassifierRule {
    /// Rule name, for tracing and tests
    pub name: &'static str,
    apply: RuleFn,
}

impl ClassifierRule {
    /// Run the rule against one paragraph.
    pub fn apply(
        &self,
        record: &ParagraphRecord,
        norm: &Normalized,
        config: &RuleConfig,
        ctx: &mut AnalysisContext,
    ) -> Option<SectionLabel> {
        (self.apply)(record, norm, config, ctx)
    }
}

/// The classification cascade, in precedence order.
pub static RULES: &[ClassifierRule] = &[
    ClassifierRule {
        name: "role_tag",
        apply: rule_role_tag,
    },
    ClassifierRule {
        name: "special_text",
        apply: rule_special_text,
    },
    ClassifierRule {
        name: "journal_metadata",
        apply: rule_journal_metadata,
    },
    ClassifierRule {
        name: "title_size",
        apply: rule_title_size,
    },
    ClassifierRule {
        name: "style_hint",
        apply: rule_style_hint,
    },
    ClassifierRule {
        name: "caption",
        apply: rule_caption,
    },
    ClassifierRule {
        name: "early_title",
        apply: rule_early_title,
    },
    ClassifierRule {
        name: "section_keyword",
        apply: rule_section_keyword,
    },
    ClassifierRule {
        name: "author_block",
        apply: rule_author_block,
    },
];

/// Assign a semantic label to one paragraph.
///
/// Pure over the record's own fields plus the per-call context; two records
/// with identical fields classify identically within one analysis run.
pub fn classify(
    record: &ParagraphRecord,
    config: &RuleConfig,
    ctx: &mut AnalysisContext,
) -> SectionLabel {
    if record.is_empty() {
        return SectionLabel::BodyText;
    }
    let norm = Normalized::from_raw(&record.text);
    for rule in RULES {
        if let Some(label) = rule.apply(record, &norm, config, ctx) {
            log::trace!(
                "paragraph {} classified {} by rule {}",
                record.index,
                label,
                rule.name
            );
            return label;
        }
    }
    SectionLabel::BodyText
}

// --- individual rules ---

fn rule_role_tag(
    record: &ParagraphRecord,
    norm: &Normalized,
    _config: &RuleConfig,
    _ctx: &mut AnalysisContext,
) -> Option<SectionLabel> {
    let tag = record.role_tag.as_deref()?.to_lowercase();

    if let Ok(label) = tag.parse::<SectionLabel>() {
        return Some(label);
    }
    match tag.as_str() {
        "keyword" => return Some(SectionLabel::Keywords),
        "caption" => {
            return Some(if TABLE_CAPTION.is_match(&norm.cleaned) {
                SectionLabel::TableCaption
            } else {
                SectionLabel::FigureCaption
            })
        }
        _ => {}
    }
    // Unrecognized heading-shaped tags resolve through the keyword table,
    // else a generic heading.
    if HEADING_SHAPED_TAG.is_match(&tag) {
        return Some(resolve_heading_keyword(norm).unwrap_or(SectionLabel::MainHeading));
    }
    None
}

fn rule_special_text(
    _record: &ParagraphRecord,
    norm: &Normalized,
    config: &RuleConfig,
    _ctx: &mut AnalysisContext,
) -> Option<SectionLabel> {
    config.special_label(&norm.lower)
}

fn rule_journal_metadata(
    record: &ParagraphRecord,
    norm: &Normalized,
    config: &RuleConfig,
    ctx: &mut AnalysisContext,
) -> Option<SectionLabel> {
    if record.index >= config.front_matter_limit {
        return None;
    }

    if norm.lower.contains("received")
        && (norm.lower.contains("accepted")
            || norm.lower.contains("revised")
            || norm.lower.contains("published"))
    {
        return Some(SectionLabel::SubmissionHistory);
    }

    let tokens = token_set(&norm.text);

    // A banner address line sits at the very top of the document.
    if record.index < 3 && tokens.iter().any(|t| ADDRESS_TOKENS.contains(&t.as_str())) {
        ctx.register_metadata(tokens);
        return Some(SectionLabel::JournalMetadata);
    }

    let (shared, coverage) = ctx.best_overlap(&tokens);
    if shared >= 3 && coverage >= 0.5 {
        ctx.register_metadata(tokens);
        return Some(SectionLabel::JournalMetadata);
    }
    None
}

fn rule_title_size(
    record: &ParagraphRecord,
    _norm: &Normalized,
    config: &RuleConfig,
    _ctx: &mut AnalysisContext,
) -> Option<SectionLabel> {
    let size = record.font_size_pt?;
    if size >= config.title_size_threshold {
        Some(if record.index < 2 {
            SectionLabel::JournalName
        } else {
            SectionLabel::Title
        })
    } else {
        None
    }
}

fn rule_style_hint(
    record: &ParagraphRecord,
    norm: &Normalized,
    _config: &RuleConfig,
    _ctx: &mut AnalysisContext,
) -> Option<SectionLabel> {
    let style = record.style_id.as_deref()?.to_lowercase();
    if style.contains("subtitle") {
        return Some(SectionLabel::Subtitle);
    }
    if style.contains("title") {
        return Some(SectionLabel::Title);
    }
    if style.contains("heading") {
        return Some(resolve_heading_keyword(norm).unwrap_or(SectionLabel::MainHeading));
    }
    None
}

fn rule_caption(
    _record: &ParagraphRecord,
    norm: &Normalized,
    _config: &RuleConfig,
    _ctx: &mut AnalysisContext,
) -> Option<SectionLabel> {
    if norm.text.len() >= 300 {
        return None;
    }
    if FIGURE_CAPTION.is_match(&norm.cleaned) {
        let excluded = ["abstract", "keyword", "reference"]
            .iter()
            .any(|term| norm.cleaned.contains(term));
        if !excluded {
            return Some(SectionLabel::FigureCaption);
        }
    }
    if TABLE_CAPTION.is_match(&norm.cleaned) {
        return Some(SectionLabel::TableCaption);
    }
    None
}

fn rule_early_title(
    record: &ParagraphRecord,
    norm: &Normalized,
    _config: &RuleConfig,
    _ctx: &mut AnalysisContext,
) -> Option<SectionLabel> {
    if record.index < 4
        && record.alignment == Alignment::Center
        && !record.bold
        && norm.text.split_whitespace().count() > 2
        && norm.title_case_count() >= 2
    {
        Some(SectionLabel::Title)
    } else {
        None
    }
}

fn rule_section_keyword(
    _record: &ParagraphRecord,
    norm: &Normalized,
    _config: &RuleConfig,
    _ctx: &mut AnalysisContext,
) -> Option<SectionLabel> {
    if let Some(label) = resolve_heading_keyword(norm) {
        return Some(label);
    }

    // Numbered line that matched no keyword prefix: a loose containment
    // check, else a generic numbered heading.
    if NUMBERED_LINE.is_match(&norm.lower) && norm.text.len() < 200 {
        for label in SectionLabel::keyword_labels() {
            for kw in label.keywords() {
                if norm.lower.contains(kw) {
                    return Some(*label);
                }
            }
        }
        return Some(SectionLabel::MainHeading);
    }
    None
}

fn rule_author_block(
    record: &ParagraphRecord,
    norm: &Normalized,
    _config: &RuleConfig,
    _ctx: &mut AnalysisContext,
) -> Option<SectionLabel> {
    if record.index >= 6 {
        return None;
    }
    if norm.text.contains('@') || norm.lower.contains("correspond") {
        return Some(SectionLabel::CorrespondingAuthor);
    }
    let tokens = token_set(&norm.text);
    if tokens.iter().any(|t| ADDRESS_TOKENS.contains(&t.as_str())) {
        return Some(SectionLabel::Affiliation);
    }
    if norm.has_name_pair() {
        return Some(SectionLabel::Authors);
    }
    None
}

// --- keyword resolution ---

/// Match the normalized text against the known section-name table: keyword
/// prefix with a word boundary, numbered prefix, or trailing colon/dash.
fn resolve_heading_keyword(norm: &Normalized) -> Option<SectionLabel> {
    let denumbered = NUMBERED_PREFIX.replace(&norm.lower, "");
    for label in SectionLabel::keyword_labels() {
        for kw in label.keywords() {
            let matched = keyword_prefix(&norm.cleaned, kw)
                || keyword_prefix(&denumbered, kw)
                || keyword_with_separator(&norm.cleaned, kw);
            if matched {
                // Headings are short; abstract and keywords may run long
                // because the content follows on the same line.
                let heading_like = matches!(
                    label,
                    SectionLabel::Abstract | SectionLabel::Keywords
                ) || norm.cleaned_words() <= 15;
                if heading_like {
                    return Some(*label);
                }
            }
        }
    }
    None
}

/// `text` starts with `kw` ending at a word boundary.
fn keyword_prefix(text: &str, kw: &str) -> bool {
    if !text.starts_with(kw) {
        return false;
    }
    text[kw.len()..]
        .chars()
        .next()
        .map_or(true, |c| !c.is_alphanumeric())
}

/// `text` is `kw` immediately followed by a colon or dash separator.
fn keyword_with_separator(text: &str, kw: &str) -> bool {
    text.strip_prefix(kw)
        .map(|rest| {
            matches!(rest.trim_start().chars().next(), Some(':') | Some('-') | Some('–'))
        })
        .unwrap_or(false)
}
