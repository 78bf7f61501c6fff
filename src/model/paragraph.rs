//! Paragraph and run records produced by the structural extractor.

use serde::{Deserialize, Serialize};

/// Text alignment of a paragraph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Left alignment (default)
    #[default]
    Left,
    /// Center alignment
    Center,
    /// Right alignment
    Right,
    /// Justified alignment
    Justify,
}

impl Alignment {
    /// Map a `w:jc` attribute value onto an alignment.
    pub fn from_jc(val: &str) -> Self {
        match val {
            "center" => Alignment::Center,
            "right" | "end" => Alignment::Right,
            "both" | "justify" | "distribute" => Alignment::Justify,
            _ => Alignment::Left,
        }
    }
}

/// A contiguous styled span of text within a paragraph.
///
/// The unit at which font size, family, bold, and italic are actually
/// recorded in the document markup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    /// Text content of the run
    pub text: String,

    /// Font size in points
    pub font_size_pt: Option<f32>,

    /// Native half-point size value the point size was derived from
    pub font_size_half_points: Option<u32>,

    /// Normalized font family name
    pub font_family: Option<String>,

    /// Bold flag
    pub bold: bool,

    /// Italic flag
    pub italic: bool,
}

impl RunRecord {
    /// Create a plain run with no explicit formatting.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_size_pt: None,
            font_size_half_points: None,
            font_family: None,
            bold: false,
            italic: false,
        }
    }

    /// Set the size from its native half-point value, keeping the pair
    /// correlated. Unparsable values leave the size absent.
    pub fn set_size_from_half_points(&mut self, raw: &str) {
        if let Ok(half) = raw.trim().parse::<u32>() {
            if half > 0 {
                self.font_size_half_points = Some(half);
                self.font_size_pt = Some(half as f32 / 2.0);
            }
        }
    }
}

/// An immutable snapshot of one paragraph of the document body.
///
/// Produced once by the extractor and never mutated by the classifier or the
/// comparator. The index is the paragraph's 0-based position among every
/// paragraph element of the body, including ones that carried no text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParagraphRecord {
    /// Position among all paragraph elements, in document order
    pub index: usize,

    /// Concatenated run text
    pub text: String,

    /// Paragraph style id, if any
    pub style_id: Option<String>,

    /// Paragraph alignment
    pub alignment: Alignment,

    /// Explicit semantic role tag, when the paragraph style maps to one
    pub role_tag: Option<String>,

    /// Dominant font size in points (majority vote across runs)
    pub font_size_pt: Option<f32>,

    /// Dominant font size in half points
    pub font_size_half_points: Option<u32>,

    /// Dominant normalized font family
    pub font_family: Option<String>,

    /// Dominant bold flag (more than half of the runs)
    pub bold: bool,

    /// Dominant italic flag (more than half of the runs)
    pub italic: bool,

    /// The runs the dominant formatting was derived from
    pub runs: Vec<RunRecord>,
}

impl ParagraphRecord {
    /// Build a record from collected runs, deriving the dominant formatting.
    pub fn from_runs(
        index: usize,
        runs: Vec<RunRecord>,
        style_id: Option<String>,
        alignment: Alignment,
        role_tag: Option<String>,
    ) -> Self {
        let text = runs
            .iter()
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string();

        let (size_hp, family) = dominant_votes(&runs);
        let total = runs.len();
        let bold_count = runs.iter().filter(|r| r.bold).count();
        let italic_count = runs.iter().filter(|r| r.italic).count();

        Self {
            index,
            text,
            style_id,
            alignment,
            role_tag,
            font_size_pt: size_hp.map(|hp| hp as f32 / 2.0),
            font_size_half_points: size_hp,
            font_family: family,
            bold: total > 0 && bold_count * 2 > total,
            italic: total > 0 && italic_count * 2 > total,
            runs,
        }
    }

    /// Whether the paragraph carries any usable text.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Rough single-page estimate used in findings, 1-based.
    pub fn page_estimate(&self) -> usize {
        1 + self.index / 5
    }
}

/// Most frequent size and family across the runs; `None` when no run recorded
/// the attribute. Ties resolve to the value seen first.
fn dominant_votes(runs: &[RunRecord]) -> (Option<u32>, Option<String>) {
    let mut size_votes: Vec<(u32, usize)> = Vec::new();
    let mut family_votes: Vec<(&str, usize)> = Vec::new();

    for run in runs {
        if let Some(hp) = run.font_size_half_points {
            match size_votes.iter_mut().find(|(v, _)| *v == hp) {
                Some((_, n)) => *n += 1,
                None => size_votes.push((hp, 1)),
            }
        }
        if let Some(family) = run.font_family.as_deref() {
            match family_votes.iter_mut().find(|(v, _)| *v == family) {
                Some((_, n)) => *n += 1,
                None => family_votes.push((family, 1)),
            }
        }
    }

    let size = size_votes
        .iter()
        .max_by_key(|(_, n)| *n)
        .map(|(v, _)| *v);
    let family = family_votes
        .iter()
        .max_by_key(|(_, n)| *n)
        .map(|(v, _)| v.to_string());
    (size, family)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str, half: Option<u32>, family: Option<&str>, bold: bool) -> RunRecord {
        RunRecord {
            text: text.to_string(),
            font_size_pt: half.map(|h| h as f32 / 2.0),
            font_size_half_points: half,
            font_family: family.map(|f| f.to_string()),
            bold,
            italic: false,
        }
    }

    #[test]
    fn test_dominant_majority_vote() {
        let runs = vec![
            run("a", Some(20), Some("Times New Roman"), true),
            run("b", Some(20), Some("Times New Roman"), true),
            run("c", Some(24), Some("Arial"), false),
        ];
        let p = ParagraphRecord::from_runs(0, runs, None, Alignment::Left, None);
        assert_eq!(p.font_size_half_points, Some(20));
        assert_eq!(p.font_size_pt, Some(10.0));
        assert_eq!(p.font_family.as_deref(), Some("Times New Roman"));
        assert!(p.bold);
        assert!(!p.italic);
        assert_eq!(p.text, "a b c");
    }

    #[test]
    fn test_half_of_runs_is_not_a_majority() {
        let runs = vec![run("a", None, None, true), run("b", None, None, false)];
        let p = ParagraphRecord::from_runs(3, runs, None, Alignment::Left, None);
        assert!(!p.bold);
    }

    #[test]
    fn test_invalid_size_is_absent_not_zero() {
        let mut r = RunRecord::new("x");
        r.set_size_from_half_points("garbage");
        assert_eq!(r.font_size_half_points, None);
        assert_eq!(r.font_size_pt, None);

        r.set_size_from_half_points("0");
        assert_eq!(r.font_size_half_points, None);

        r.set_size_from_half_points("21");
        assert_eq!(r.font_size_half_points, Some(21));
        assert_eq!(r.font_size_pt, Some(10.5));
    }

    #[test]
    fn test_page_estimate() {
        let p = ParagraphRecord::from_runs(12, vec![RunRecord::new("t")], None, Alignment::Left, None);
        assert_eq!(p.page_estimate(), 3);
    }

    #[test]
    fn test_alignment_from_jc() {
        assert_eq!(Alignment::from_jc("center"), Alignment::Center);
        assert_eq!(Alignment::from_jc("both"), Alignment::Justify);
        assert_eq!(Alignment::from_jc("start"), Alignment::Left);
    }
}
