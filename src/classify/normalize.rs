//! Text and font normalization shared by the classifier and resolver.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Leading numbering such as "1.", "1.2", "IV." with trailing punctuation.
/// The separator is mandatory so that words starting with roman-numeral
/// letters ("introduction", "conclusion") keep their first letter.
static LEADING_NUMBERING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\s\-–—]*(?:[ivxlcdmIVXLCDM]+|\d+(?:[.\d]*)?)[\s.\-:)]+").unwrap()
});

/// Leading bullet or list markers.
static LEADING_BULLETS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[*•·\-–—]+\s*").unwrap());

static TITLE_CASE_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z][a-z]+$").unwrap());

/// Comma-separated pairs of TitleCase words, the shape of an author list.
static NAME_PAIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z][a-z]+\s+[A-Z][a-z]+\b").unwrap());

/// A paragraph's text in the normalized forms the classifier rules consume.
#[derive(Debug, Clone)]
pub struct Normalized {
    /// Whitespace-collapsed original text
    pub text: String,
    /// Lowercased collapsed text
    pub lower: String,
    /// Lowercased text with leading numbering and bullets stripped
    pub cleaned: String,
}

impl Normalized {
    pub fn from_raw(raw: &str) -> Self {
        let flat = raw.replace(['\r', '\n'], " ");
        let text = WHITESPACE.replace_all(flat.trim(), " ").to_string();
        let lower = text.to_lowercase();
        let cleaned = LEADING_NUMBERING.replace(&lower, "");
        let cleaned = LEADING_BULLETS.replace(&cleaned, "").trim().to_string();
        Self {
            text,
            lower,
            cleaned,
        }
    }

    /// Word count of the cleaned form.
    pub fn cleaned_words(&self) -> usize {
        self.cleaned.split_whitespace().count()
    }

    /// Number of TitleCase words (length > 2) in the original text.
    pub fn title_case_count(&self) -> usize {
        self.text
            .split_whitespace()
            .filter(|w| w.len() > 2 && TITLE_CASE_WORD.is_match(w))
            .count()
    }

    /// Whether the text contains a comma-separated TitleCase name pair.
    pub fn has_name_pair(&self) -> bool {
        self.text.contains(',') && NAME_PAIR.is_match(&self.text)
    }
}

/// Normalization used for exact-text override lookups: lowercased, whitespace
/// collapsed.
pub fn normalize_exact(raw: &str) -> String {
    WHITESPACE
        .replace_all(raw.trim(), " ")
        .to_lowercase()
        .to_string()
}

/// Lowercased alphanumeric token set of a line.
pub fn token_set(text: &str) -> BTreeSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() > 1)
        .map(|t| t.to_string())
        .collect()
}

/// Shared-token count and coverage fraction of `probe` against `registered`.
pub fn token_overlap(probe: &BTreeSet<String>, registered: &BTreeSet<String>) -> (usize, f32) {
    if probe.is_empty() || registered.is_empty() {
        return (0, 0.0);
    }
    let shared = probe.intersection(registered).count();
    (shared, shared as f32 / probe.len() as f32)
}

/// Similarity of two normalized texts in `[0, 1]`.
///
/// Containment of the shorter text in the longer one counts as a near-exact
/// match; otherwise a token Dice coefficient.
pub fn text_similarity(a: &str, b: &str) -> f32 {
    let a = normalize_exact(a);
    let b = normalize_exact(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }
    if a.contains(&b) || b.contains(&a) {
        return 0.95;
    }
    let ta = token_set(&a);
    let tb = token_set(&b);
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }
    let shared = ta.intersection(&tb).count();
    (2 * shared) as f32 / (ta.len() + tb.len()) as f32
}

/// Canonical font family names for common aliases.
pub fn normalize_font_name(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    if lower.is_empty() {
        return String::new();
    }
    const ALIASES: &[(&str, &str)] = &[
        ("timesnewroman", "Times New Roman"),
        ("times new roman", "Times New Roman"),
        ("times roman", "Times New Roman"),
        ("times", "Times New Roman"),
        ("arial", "Arial"),
        ("helvetica", "Arial"),
        ("calibri", "Calibri"),
        ("cambria", "Cambria"),
    ];
    for (alias, canonical) in ALIASES {
        if lower.contains(alias) {
            return (*canonical).to_string();
        }
    }
    // Title-case unknown families
    lower
        .split_whitespace()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether two font families are close enough to count as the same.
pub fn fonts_similar(a: &str, b: &str) -> bool {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    const GROUPS: &[&[&str]] = &[
        &["times new roman", "times", "timesroman", "times roman"],
        &["arial", "helvetica"],
        &["calibri", "cambria"],
    ];
    for group in GROUPS {
        if group.contains(&a.as_str()) && group.contains(&b.as_str()) {
            return true;
        }
    }
    a == b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbering_and_bullets_stripped() {
        let n = Normalized::from_raw("1.2  Introduction");
        assert_eq!(n.cleaned, "introduction");
        let n = Normalized::from_raw("• Keywords: web");
        assert_eq!(n.cleaned, "keywords: web");
        let n = Normalized::from_raw("IV. Conclusion");
        assert_eq!(n.cleaned, "conclusion");
    }

    #[test]
    fn test_whitespace_collapsed() {
        let n = Normalized::from_raw("  A \n  Title\r Here ");
        assert_eq!(n.text, "A Title Here");
        assert_eq!(n.lower, "a title here");
    }

    #[test]
    fn test_title_case_count() {
        let n = Normalized::from_raw("Deep Learning for the Web");
        assert_eq!(n.title_case_count(), 3); // Deep, Learning, Web
    }

    #[test]
    fn test_name_pair() {
        assert!(Normalized::from_raw("Jane Doe, John Smith").has_name_pair());
        assert!(!Normalized::from_raw("lowercase names, here").has_name_pair());
    }

    #[test]
    fn test_token_overlap() {
        let a = token_set("journal of informatics and web engineering");
        let b = token_set("informatics web engineering journal");
        let (shared, coverage) = token_overlap(&b, &a);
        assert_eq!(shared, 4);
        assert!(coverage >= 0.99);
    }

    #[test]
    fn test_text_similarity_containment() {
        assert!(text_similarity("Introduction", "1. Introduction") > 0.9);
        assert_eq!(text_similarity("abc def", "abc def"), 1.0);
        assert!(text_similarity("completely different", "nothing shared") < 0.45);
    }

    #[test]
    fn test_font_normalization() {
        assert_eq!(normalize_font_name("TimesNewRoman"), "Times New Roman");
        assert_eq!(normalize_font_name("helvetica"), "Arial");
        assert_eq!(normalize_font_name("Garamond"), "Garamond");
    }

    #[test]
    fn test_fonts_similar_groups() {
        assert!(fonts_similar("Times New Roman", "times"));
        assert!(fonts_similar("Arial", "Helvetica"));
        assert!(!fonts_similar("Arial", "Times New Roman"));
        assert!(fonts_similar("Garamond", "garamond"));
    }
}
