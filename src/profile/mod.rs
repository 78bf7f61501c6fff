//! Template profile: expected-format rules inferred from a reference
//! document.

mod expected;
mod resolver;

pub use expected::ExpectedFormat;
pub use resolver::{fixed_overrides, resolve};

use std::collections::HashMap;

use crate::classify::{classify, AnalysisContext};
use crate::config::RuleConfig;
use crate::model::{ParagraphRecord, SectionLabel};
use crate::package::StructuredRules;

/// Aggregated formatting knowledge extracted from one template document.
#[derive(Debug, Clone, Default)]
pub struct TemplateProfile {
    /// Majority-vote format per label
    pub rules: HashMap<SectionLabel, ExpectedFormat>,

    /// Unique labels in first-seen order; a structured-rules order
    /// declaration takes precedence over the observed order
    pub order: Vec<SectionLabel>,

    /// Kept template paragraphs per label
    pub exemplars: HashMap<SectionLabel, Vec<ParagraphRecord>>,

    /// Body-text statistics under a given heading context
    pub context_rules: HashMap<(SectionLabel, SectionLabel), ExpectedFormat>,

    /// Body-text exemplars under a given heading context
    pub context_exemplars: HashMap<(SectionLabel, SectionLabel), Vec<ParagraphRecord>>,

    /// Explicit rules from the structured-rules part
    pub overlay: HashMap<SectionLabel, ExpectedFormat>,
}

impl TemplateProfile {
    /// Build a profile from the template's extracted paragraphs.
    ///
    /// Classification runs with a context scoped to this single pass; the
    /// profile itself carries no classifier state.
    pub fn build(
        records: &[ParagraphRecord],
        structured: Option<&StructuredRules>,
        config: &RuleConfig,
    ) -> Self {
        let mut profile = TemplateProfile::default();
        let mut ctx = AnalysisContext::new(config);
        let mut heading_context: Option<SectionLabel> = None;

        for record in records {
            if record.is_empty() {
                continue;
            }
            let label = classify(record, config, &mut ctx);
            if !profile.order.contains(&label) {
                profile.order.push(label);
            }
            if label.is_context() {
                heading_context = Some(label);
            }

            if !is_usable_exemplar(record) {
                continue;
            }
            profile
                .exemplars
                .entry(label)
                .or_default()
                .push(record.clone());
            if label == SectionLabel::BodyText {
                if let Some(ctx_label) = heading_context {
                    profile
                        .context_exemplars
                        .entry((label, ctx_label))
                        .or_default()
                        .push(record.clone());
                }
            }
        }

        for (label, examples) in &profile.exemplars {
            profile.rules.insert(*label, vote_format(examples, *label));
        }
        for (key, examples) in &profile.context_exemplars {
            profile
                .context_rules
                .insert(*key, vote_format(examples, key.0));
        }

        if let Some(structured) = structured {
            profile.overlay = structured.overlay.clone();
            if !structured.order.is_empty() {
                let mut order = structured.order.clone();
                for label in &profile.order {
                    if !order.contains(label) {
                        order.push(*label);
                    }
                }
                profile.order = order;
            }
        }
        profile
    }

    /// Exemplars for a label under a body-text context, falling back to the
    /// label's plain exemplars.
    pub fn exemplars_for(
        &self,
        label: SectionLabel,
        context: Option<SectionLabel>,
    ) -> Option<&[ParagraphRecord]> {
        if let Some(ctx) = context {
            if let Some(list) = self.context_exemplars.get(&(label, ctx)) {
                return Some(list.as_slice());
            }
        }
        self.exemplars.get(&label).map(|v| v.as_slice())
    }
}

/// Low-signal template paragraphs (numbers, separators) would skew the vote.
fn is_usable_exemplar(record: &ParagraphRecord) -> bool {
    let letters = record.text.chars().filter(|c| c.is_alphabetic()).count();
    if letters == 0 {
        return false;
    }
    let digits = record.text.chars().filter(|c| c.is_ascii_digit()).count();
    !(digits > letters * 2 && letters < 10)
}

/// Majority vote across exemplars, then instructional-text hints, then the
/// built-in defaults for anything still undecided.
fn vote_format(examples: &[ParagraphRecord], label: SectionLabel) -> ExpectedFormat {
    let mut format = ExpectedFormat::new();

    let mut size_votes: Vec<(u32, usize)> = Vec::new();
    let mut family_votes: Vec<(String, usize)> = Vec::new();
    let mut bold_count = 0;
    let mut italic_count = 0;

    for example in examples {
        if let Some(hp) = example.font_size_half_points {
            match size_votes.iter_mut().find(|(v, _)| *v == hp) {
                Some((_, n)) => *n += 1,
                None => size_votes.push((hp, 1)),
            }
        }
        if let Some(family) = &example.font_family {
            match family_votes.iter_mut().find(|(v, _)| v == family) {
                Some((_, n)) => *n += 1,
                None => family_votes.push((family.clone(), 1)),
            }
        }
        if example.bold {
            bold_count += 1;
        }
        if example.italic {
            italic_count += 1;
        }
    }

    if let Some((hp, _)) = size_votes.iter().max_by_key(|(_, n)| *n) {
        format.font_size_half_points = Some(*hp);
        format.font_size_pt = Some(*hp as f32 / 2.0);
    }
    if let Some((family, _)) = family_votes.iter().max_by_key(|(_, n)| *n) {
        format.font_family = Some(family.clone());
    }
    if !examples.is_empty() {
        format.bold = Some(bold_count * 2 > examples.len());
        format.italic = Some(italic_count * 2 > examples.len());
    }

    // Instructional phrases in the template text beat the vote.
    let mut hints = ExpectedFormat::new();
    for example in examples {
        hints.apply_text_hints(&example.text);
    }
    format.override_with(&hints);

    if format.is_empty() {
        return ExpectedFormat::default_for(label);
    }
    format.normalize_size();
    format
}
