//! Expectation resolution: merge every rule source for one paragraph.

use crate::classify::normalize::text_similarity;
use crate::model::SectionLabel;

use super::{ExpectedFormat, TemplateProfile};

/// Minimum similarity for an exemplar to drive expectations for a
/// specific paragraph.
const EXEMPLAR_SIMILARITY_FLOOR: f32 = 0.45;

/// Resolve the expected format for one classified paragraph.
///
/// Sources fill unset fields in precedence order: structured-rules overlay,
/// aggregated per-label statistics, context statistics for body text, the
/// closest matching exemplar, and finally the built-in default table. Fixed
/// per-label overrides are applied on top and win for the fields they define,
/// except that an overlay bold declaration for the title is honored.
pub fn resolve(
    profile: &TemplateProfile,
    label: SectionLabel,
    text: &str,
    context: Option<SectionLabel>,
) -> ExpectedFormat {
    let mut expected = ExpectedFormat::new();

    if let Some(overlay) = profile.overlay.get(&label) {
        expected.fill_from(overlay);
    }
    if let Some(stats) = profile.rules.get(&label) {
        expected.fill_from(stats);
    }
    if label == SectionLabel::BodyText {
        if let Some(ctx) = context {
            if let Some(stats) = profile.context_rules.get(&(label, ctx)) {
                expected.fill_from(stats);
            }
        }
    }

    let mut fixed = fixed_overrides(label);
    if label == SectionLabel::Title
        && profile.overlay.get(&label).is_some_and(|o| o.bold.is_some())
    {
        fixed.bold = None;
    }
    expected.override_with(&fixed);

    if let Some(exemplar) = best_exemplar(profile, label, text, context) {
        expected.fill_from(&exemplar);
    }
    expected.fill_from(&ExpectedFormat::default_for(label));
    expected.normalize_size();
    expected
}

/// Hard per-label constraints that no statistical vote may relax.
pub fn fixed_overrides(label: SectionLabel) -> ExpectedFormat {
    use SectionLabel::*;
    match label {
        Title => ExpectedFormat::new().bold(true).italic(false),
        Keywords | CorrespondingAuthor => ExpectedFormat::new().italic(true),
        BodyText => ExpectedFormat::new().bold(false),
        label if label.is_plain_header() => ExpectedFormat::new().bold(false).italic(false),
        _ => ExpectedFormat::new(),
    }
}

/// Format taken from the template exemplar most similar to `text`, with any
/// instructional hints in the exemplar applied over its measured format.
fn best_exemplar(
    profile: &TemplateProfile,
    label: SectionLabel,
    text: &str,
    context: Option<SectionLabel>,
) -> Option<ExpectedFormat> {
    let exemplars = profile.exemplars_for(label, context)?;

    let mut best: Option<(f32, &crate::model::ParagraphRecord)> = None;
    for exemplar in exemplars {
        let score = text_similarity(text, &exemplar.text);
        if score >= EXEMPLAR_SIMILARITY_FLOOR
            && best.map_or(true, |(prev, _)| score > prev)
        {
            best = Some((score, exemplar));
        }
    }
    let (_, exemplar) = best?;

    let mut format = ExpectedFormat::new();
    format.font_size_half_points = exemplar.font_size_half_points;
    format.font_size_pt = exemplar.font_size_pt;
    format.font_family = exemplar.font_family.clone();
    format.bold = Some(exemplar.bold);
    format.italic = Some(exemplar.italic);

    let mut hints = ExpectedFormat::new();
    hints.apply_text_hints(&exemplar.text);
    format.override_with(&hints);
    format.normalize_size();
    Some(format)
}
