use crate::proposal::EditProposal;

/// Byte span inside a paragraph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Starting byte offset (inclusive)
    pub start: usize,
    /// Ending byte offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Length of the span in bytes
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True for a zero-length span
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True when two spans share at least one byte
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A proposal pinned to its first occurrence in the paragraph text
///
/// Derived and ephemeral: located edits are recomputed per render and
/// never stored. `sequence_number` is the 1-based position in the raw
/// proposal list; it is a tie-break and numbering key only, never an
/// identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedEdit {
    pub proposal: EditProposal,
    pub span: Span,
    pub sequence_number: usize,
}

impl LocatedEdit {
    /// Starting byte offset of the located span
    pub fn start(&self) -> usize {
        self.span.start
    }

    /// Ending byte offset (exclusive) of the located span
    pub fn end(&self) -> usize {
        self.span.end
    }
}

/// Find the first occurrence of a proposal's original text
///
/// Every proposal is located independently against the original paragraph
/// text, always scanning from offset 0: two proposals quoting the same
/// text resolve to the same span and are disambiguated downstream by the
/// conflict resolver. Lookup is exact; no normalization of case or
/// accents is attempted, so a quote that drifted from the paragraph is
/// dropped rather than matched fuzzily.
///
/// # Arguments
/// * `text` - The paragraph text to search
/// * `proposal` - The proposal whose `original_text` is being located
/// * `sequence_number` - 1-based position of the proposal in the raw list
///
/// # Returns
/// * `Some(LocatedEdit)` when the span occurs in `text`
/// * `None` when the span is absent or empty
///
/// # Example
/// ```
/// use redline::{Category, EditProposal, locate};
/// let proposal = EditProposal {
///     original_text: "τον".to_string(),
///     revised_text: "το".to_string(),
///     rule_category: Category::GreekFinalNu,
///     reasoning: String::new(),
/// };
/// let edit = locate("τον βιβλίο", &proposal, 1).unwrap();
/// assert_eq!(edit.start(), 0);
/// ```
pub fn locate(text: &str, proposal: &EditProposal, sequence_number: usize) -> Option<LocatedEdit> {
    if proposal.original_text.is_empty() {
        return None;
    }

    let start = text.find(&proposal.original_text)?;
    let end = start + proposal.original_text.len();

    Some(LocatedEdit {
        proposal: proposal.clone(),
        span: Span { start, end },
        sequence_number,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proposal::Category;

    fn proposal(original: &str, revised: &str) -> EditProposal {
        EditProposal {
            original_text: original.to_string(),
            revised_text: revised.to_string(),
            rule_category: Category::Grammar,
            reasoning: String::new(),
        }
    }

    #[test]
    fn test_locate_returns_matching_span() {
        let text = "The quick brown fox";
        let located = locate(text, &proposal("quick", "slow"), 1).unwrap();

        assert_eq!(&text[located.start()..located.end()], "quick");
        assert_eq!(located.sequence_number, 1);
    }

    #[test]
    fn test_locate_first_occurrence_only() {
        let text = "foo bar foo";
        let first = locate(text, &proposal("foo", "baz"), 1).unwrap();
        let second = locate(text, &proposal("foo", "qux"), 2).unwrap();

        // Both proposals resolve to the same first occurrence
        assert_eq!(first.span, second.span);
        assert_eq!(first.start(), 0);
        assert_eq!(first.end(), 3);
    }

    #[test]
    fn test_locate_absent_span_is_none() {
        assert!(locate("already edited text", &proposal("typo", "fixed"), 1).is_none());
    }

    #[test]
    fn test_locate_empty_span_is_none() {
        // An empty original span can never be located
        assert!(locate("some text", &proposal("", "inserted"), 1).is_none());
    }

    #[test]
    fn test_locate_multibyte_text() {
        let text = "τον βιβλίο";
        let located = locate(text, &proposal("τον", "το"), 1).unwrap();

        assert_eq!(located.start(), 0);
        assert_eq!(located.span.len(), "τον".len());
        assert_eq!(&text[located.start()..located.end()], "τον");
    }

    #[test]
    fn test_span_overlaps() {
        let a = Span { start: 0, end: 5 };
        let b = Span { start: 4, end: 8 };
        let c = Span { start: 5, end: 8 };

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
        assert!(!c.overlaps(&a));
    }
}
