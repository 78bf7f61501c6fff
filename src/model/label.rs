//! Semantic section labels assigned to manuscript paragraphs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Semantic role of a paragraph within a manuscript.
///
/// The vocabulary is curated but open-ended: everything the classifier cannot
/// name ends up as [`SectionLabel::BodyText`], which additionally carries the
/// nearest preceding heading as context (tracked by the comparator, not here).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionLabel {
    Title,
    Subtitle,
    Authors,
    Affiliation,
    CorrespondingAuthor,
    Abstract,
    Keywords,
    Introduction,
    LiteratureReview,
    Methodology,
    ResultsAndDiscussion,
    Conclusion,
    Acknowledgement,
    FundingStatement,
    AuthorContributions,
    ConflictOfInterests,
    EthicsStatement,
    References,
    FigureCaption,
    TableCaption,
    JournalName,
    JournalMetadata,
    SubmissionHistory,
    MainHeading,
    BodyText,
}

impl SectionLabel {
    /// Stable snake_case name, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionLabel::Title => "title",
            SectionLabel::Subtitle => "subtitle",
            SectionLabel::Authors => "authors",
            SectionLabel::Affiliation => "affiliation",
            SectionLabel::CorrespondingAuthor => "corresponding_author",
            SectionLabel::Abstract => "abstract",
            SectionLabel::Keywords => "keywords",
            SectionLabel::Introduction => "introduction",
            SectionLabel::LiteratureReview => "literature_review",
            SectionLabel::Methodology => "methodology",
            SectionLabel::ResultsAndDiscussion => "results_and_discussion",
            SectionLabel::Conclusion => "conclusion",
            SectionLabel::Acknowledgement => "acknowledgement",
            SectionLabel::FundingStatement => "funding_statement",
            SectionLabel::AuthorContributions => "author_contributions",
            SectionLabel::ConflictOfInterests => "conflict_of_interests",
            SectionLabel::EthicsStatement => "ethics_statement",
            SectionLabel::References => "references",
            SectionLabel::FigureCaption => "figure_caption",
            SectionLabel::TableCaption => "table_caption",
            SectionLabel::JournalName => "journal_name",
            SectionLabel::JournalMetadata => "journal_metadata",
            SectionLabel::SubmissionHistory => "submission_history",
            SectionLabel::MainHeading => "main_heading",
            SectionLabel::BodyText => "body_text",
        }
    }

    /// All labels, in a stable order.
    pub fn all() -> &'static [SectionLabel] {
        use SectionLabel::*;
        &[
            Title,
            Subtitle,
            Authors,
            Affiliation,
            CorrespondingAuthor,
            Abstract,
            Keywords,
            Introduction,
            LiteratureReview,
            Methodology,
            ResultsAndDiscussion,
            Conclusion,
            Acknowledgement,
            FundingStatement,
            AuthorContributions,
            ConflictOfInterests,
            EthicsStatement,
            References,
            FigureCaption,
            TableCaption,
            JournalName,
            JournalMetadata,
            SubmissionHistory,
            MainHeading,
            BodyText,
        ]
    }

    /// Keyword phrases that identify this section when a heading starts with,
    /// or is punctuated as, one of them. Empty for labels that are only ever
    /// assigned by other heuristics.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            SectionLabel::Abstract => &["abstract"],
            SectionLabel::Keywords => &["keywords", "keyword", "index terms"],
            SectionLabel::Introduction => &["introduction"],
            SectionLabel::LiteratureReview => &["literature review", "related work"],
            SectionLabel::Methodology => &["research methodology", "methodology", "methods"],
            SectionLabel::ResultsAndDiscussion => &[
                "results and discussions",
                "results and discussion",
                "results",
                "discussion",
            ],
            SectionLabel::Conclusion => &["conclusion", "conclusions"],
            SectionLabel::Acknowledgement => &[
                "acknowledgement",
                "acknowledgements",
                "acknowledgments",
                "acknowledgment",
            ],
            SectionLabel::FundingStatement => &["funding statement", "funding"],
            SectionLabel::AuthorContributions => &["author contributions", "contributions"],
            SectionLabel::ConflictOfInterests => &[
                "conflict of interests",
                "conflicts of interest",
                "conflict of interest",
                "competing interests",
            ],
            SectionLabel::EthicsStatement => &["ethics statements", "ethics statement", "ethical statement", "ethics"],
            SectionLabel::References => &["references", "reference", "bibliography"],
            _ => &[],
        }
    }

    /// Labels checked by the keyword rule, most specific phrases first.
    pub fn keyword_labels() -> &'static [SectionLabel] {
        use SectionLabel::*;
        &[
            Abstract,
            Keywords,
            Introduction,
            LiteratureReview,
            Methodology,
            ResultsAndDiscussion,
            Conclusion,
            Acknowledgement,
            FundingStatement,
            AuthorContributions,
            ConflictOfInterests,
            EthicsStatement,
            References,
        ]
    }

    /// Header-type labels that must never be bold or italic.
    pub fn is_plain_header(&self) -> bool {
        use SectionLabel::*;
        matches!(
            self,
            Abstract
                | Introduction
                | LiteratureReview
                | Methodology
                | ResultsAndDiscussion
                | Conclusion
                | Acknowledgement
                | FundingStatement
                | AuthorContributions
                | ConflictOfInterests
                | EthicsStatement
                | References
                | MainHeading
        )
    }

    /// Labels that may legitimately occur only once; a second classification
    /// of the same one is reported as a duplicate section.
    pub fn is_significant(&self) -> bool {
        use SectionLabel::*;
        matches!(
            self,
            Title
                | Abstract
                | Keywords
                | Introduction
                | LiteratureReview
                | Methodology
                | ResultsAndDiscussion
                | Conclusion
                | Acknowledgement
                | FundingStatement
                | AuthorContributions
                | ConflictOfInterests
                | EthicsStatement
                | References
        )
    }

    /// Whether this label can serve as the context of subsequent body text.
    ///
    /// Captions, front-matter metadata, and body text itself never form a
    /// context; everything heading-shaped does.
    pub fn is_context(&self) -> bool {
        use SectionLabel::*;
        !matches!(
            self,
            BodyText
                | FigureCaption
                | TableCaption
                | JournalName
                | JournalMetadata
                | SubmissionHistory
        )
    }

    /// Canned heading text used when inserting this section into a manuscript.
    pub fn canned_heading(&self) -> Option<&'static str> {
        use SectionLabel::*;
        match self {
            Abstract => Some("Abstract"),
            Keywords => Some("Keywords:"),
            Introduction => Some("Introduction"),
            LiteratureReview => Some("Literature Review"),
            Methodology => Some("Research Methodology"),
            ResultsAndDiscussion => Some("Results and Discussions"),
            Conclusion => Some("Conclusion"),
            Acknowledgement => Some("Acknowledgement"),
            FundingStatement => Some("Funding Statement"),
            AuthorContributions => Some("Author Contributions"),
            ConflictOfInterests => Some("Conflict of Interests"),
            EthicsStatement => Some("Ethics Statements"),
            References => Some("References"),
            _ => None,
        }
    }

    /// Canned placeholder body inserted under a canned heading.
    pub fn canned_body(&self) -> Option<&'static str> {
        use SectionLabel::*;
        match self {
            Abstract => Some("[Insert the abstract of the manuscript here.]"),
            Keywords => Some("[keyword one; keyword two; keyword three]"),
            Acknowledgement => {
                Some("[Acknowledge contributors and supporting institutions here.]")
            }
            FundingStatement => Some("[State the funding sources for this work here.]"),
            AuthorContributions => Some("[Describe each author's contribution here.]"),
            ConflictOfInterests => Some("[Declare any conflicts of interest here.]"),
            EthicsStatement => Some("[State the ethics approval for this study here.]"),
            Conclusion | Introduction | LiteratureReview | Methodology
            | ResultsAndDiscussion => Some("[Insert the section content here.]"),
            References => Some("[Insert the reference list here.]"),
            _ => None,
        }
    }
}

impl fmt::Display for SectionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionLabel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SectionLabel::all()
            .iter()
            .copied()
            .find(|label| label.as_str() == s)
            .ok_or(())
    }
}
