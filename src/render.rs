use crate::span::LocatedEdit;

/// A single replacement to splice into a paragraph, by byte offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    /// Starting byte offset (inclusive)
    pub start: usize,
    /// Ending byte offset (exclusive)
    pub end: usize,
    /// Text written in place of the span
    pub text: String,
}

impl Replacement {
    /// Build a replacement from a located edit and its final text
    pub fn new(edit: &LocatedEdit, text: impl Into<String>) -> Self {
        Self {
            start: edit.start(),
            end: edit.end(),
            text: text.into(),
        }
    }
}

/// Produce the final paragraph text by splicing replacements
///
/// The output is reconstructed left to right from offset-sliced segments:
/// prefix text, replacement, prefix text, replacement, tail. Spans are
/// never searched for again, so a duplicate of a replaced span elsewhere
/// in the text is left untouched. An empty replacement set returns the
/// input unchanged.
///
/// Replacements must come from a resolved (non-overlapping) edit set; a
/// replacement that overlaps an earlier one is skipped rather than
/// spliced at a wrong offset.
///
/// # Example
/// ```
/// use redline::{Replacement, substitute};
/// let replacements = vec![Replacement { start: 4, end: 9, text: "slow".to_string() }];
/// assert_eq!(substitute("the quick fox", &replacements), "the slow fox");
/// ```
pub fn substitute(text: &str, replacements: &[Replacement]) -> String {
    let mut ordered: Vec<&Replacement> = replacements.iter().collect();
    ordered.sort_by_key(|replacement| replacement.start);

    let mut output = String::with_capacity(text.len());
    let mut position = 0;

    for replacement in ordered {
        debug_assert!(replacement.end <= text.len(), "replacement out of bounds");
        if replacement.start < position || replacement.end > text.len() {
            continue;
        }
        output.push_str(&text[position..replacement.start]);
        output.push_str(&replacement.text);
        position = replacement.end;
    }

    output.push_str(&text[position..]);
    output
}

/// Kind of a rendered segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    /// Untouched paragraph text
    Plain,
    /// Text covered by a resolved edit; `edit_number` is the 1-based
    /// position of the edit in the stable-order resolved sequence
    Highlighted { edit_number: usize },
}

/// One piece of an annotated paragraph, in left-to-right order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub text: String,
}

impl Segment {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            kind: SegmentKind::Plain,
            text: text.into(),
        }
    }
}

/// Marker appended when annotated text is cut at the window boundary
pub const TRUNCATION_MARKER: &str = "...";

/// Options for annotated rendering
#[derive(Debug, Clone)]
pub struct AnnotateOptions {
    /// Maximum characters of paragraph text to render before truncating
    pub max_len: usize,
}

impl Default for AnnotateOptions {
    fn default() -> Self {
        Self { max_len: 800 }
    }
}

/// Render paragraph text as plain and highlighted segments
///
/// `edits` must be the stable-order resolved set for the paragraph; edit
/// numbers in the output are 1-based positions within it, so they line up
/// with the numbering used by decision keys and the revision summary.
///
/// Text longer than `options.max_len` characters is cut at the preceding
/// char boundary and a trailing marker segment is appended; only edits
/// that fall fully inside the window are highlighted.
pub fn annotate(text: &str, edits: &[LocatedEdit], options: &AnnotateOptions) -> Vec<Segment> {
    let (window, truncated) = match text.char_indices().nth(options.max_len) {
        Some((byte_end, _)) => (byte_end, true),
        None => (text.len(), false),
    };
    let visible = &text[..window];

    let mut segments = Vec::new();
    let mut position = 0;

    for (index, edit) in edits.iter().enumerate() {
        if edit.start() < position || edit.end() > window {
            continue;
        }
        if edit.start() > position {
            segments.push(Segment::plain(&visible[position..edit.start()]));
        }
        segments.push(Segment {
            kind: SegmentKind::Highlighted {
                edit_number: index + 1,
            },
            text: visible[edit.start()..edit.end()].to_string(),
        });
        position = edit.end();
    }

    if position < window {
        segments.push(Segment::plain(&visible[position..]));
    }
    if truncated {
        segments.push(Segment::plain(TRUNCATION_MARKER));
    }

    segments
}
