use serde::{Deserialize, Serialize};

/// Rule family that triggered an edit
///
/// Categories mirror what the Reviewer reports in its `rule_category`
/// field. Deserialization is total: any string the Reviewer invents that
/// is not a known category maps to `Other` instead of failing the review.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Grammar,
    Style,
    Formatting,
    Punctuation,
    Spelling,
    Syntax,
    /// Greek Τελικό Ν placement ("Greek-Final-Nu")
    GreekFinalNu,
    /// Greek monotonic accent rules
    Monotonic,
    #[default]
    Other,
}

impl Category {
    /// Canonical category name as it appears on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Grammar => "Grammar",
            Category::Style => "Style",
            Category::Formatting => "Formatting",
            Category::Punctuation => "Punctuation",
            Category::Spelling => "Spelling",
            Category::Syntax => "Syntax",
            Category::GreekFinalNu => "Greek-Final-Nu",
            Category::Monotonic => "Monotonic",
            Category::Other => "Other",
        }
    }

    /// Presentation class for a category badge
    ///
    /// Total over all variants; `Other` falls back to the grammar style.
    pub fn badge_class(&self) -> &'static str {
        match self {
            Category::Grammar => "rule-grammar",
            Category::Style => "rule-style",
            Category::Formatting => "rule-formatting",
            Category::Punctuation => "rule-punctuation",
            Category::Spelling => "rule-spelling",
            Category::Syntax => "rule-syntax",
            Category::GreekFinalNu => "rule-greek-final-nu",
            Category::Monotonic => "rule-monotonic",
            Category::Other => "rule-grammar",
        }
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Grammar" => Category::Grammar,
            "Style" => Category::Style,
            "Formatting" => Category::Formatting,
            "Punctuation" => Category::Punctuation,
            "Spelling" => Category::Spelling,
            "Syntax" => Category::Syntax,
            "Greek-Final-Nu" => Category::GreekFinalNu,
            "Monotonic" => Category::Monotonic,
            _ => Category::Other,
        }
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.as_str().to_string()
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single proposed change to a paragraph, as produced by the Reviewer
///
/// Proposals are read-only inputs: the Reviewer owns them, the core only
/// locates, filters, and applies them. A proposal whose `original_text`
/// equals its `revised_text` is a no-op and is excluded from counting and
/// rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditProposal {
    /// The exact original text that needs to be edited
    pub original_text: String,
    /// The corrected or improved version of the text
    pub revised_text: String,
    /// The category of rule that triggered this edit
    #[serde(default)]
    pub rule_category: Category,
    /// Explanation of why this edit was made, citing the rule applied
    #[serde(default)]
    pub reasoning: String,
}

impl EditProposal {
    /// True when the proposal changes nothing
    pub fn is_noop(&self) -> bool {
        self.original_text == self.revised_text
    }
}

/// All edits the Reviewer identified in one text segment
///
/// This is the top-level response schema the Reviewer produces per
/// paragraph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentReview {
    #[serde(default)]
    pub edits: Vec<EditProposal>,
}

impl SegmentReview {
    /// Check if any actual changes were made
    pub fn has_changes(&self) -> bool {
        self.edits.iter().any(|edit| !edit.is_noop())
    }

    /// Return only edits where text was actually modified
    pub fn actual_changes(&self) -> Vec<&EditProposal> {
        self.edits.iter().filter(|edit| !edit.is_noop()).collect()
    }
}
