use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::decision::{DecisionKey, DecisionStatus, DecisionStore};
use crate::proposal::{Category, SegmentReview};
use crate::render::{Replacement, substitute};
use crate::resolve::{ResolvePolicy, resolve, sweep};
use crate::span::LocatedEdit;

/// A paragraph of the loaded document
///
/// Text is immutable once loaded; export produces new text, the original
/// is never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub index: usize,
    pub text: String,
}

/// Error types for document operations
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid UTF-8 in document: {0}")]
    InvalidUtf8(String),
}

/// Split raw document text into paragraphs, one per line
///
/// Empty lines are kept as empty paragraphs so that indices and
/// paragraph-level structure survive a load/export round trip. Richer
/// formats are converted to and from this shape by an external codec.
pub fn split_paragraphs(text: &str) -> Vec<Paragraph> {
    text.lines()
        .enumerate()
        .map(|(index, line)| Paragraph {
            index,
            text: line.to_string(),
        })
        .collect()
}

/// Read a plain-text document from disk with UTF-8 validation
///
/// # Arguments
/// * `path` - Path to the document to read
///
/// # Returns
/// * `Ok(Vec<Paragraph>)` - Ordered paragraph list
/// * `Err(DocumentError)` - Not found, I/O error, or invalid UTF-8
pub fn load_paragraphs<P: AsRef<Path>>(path: P) -> Result<Vec<Paragraph>, DocumentError> {
    let path_ref = path.as_ref();

    if !path_ref.exists() {
        return Err(DocumentError::NotFound(path_ref.display().to_string()));
    }

    let bytes = fs::read(path_ref)?;
    let content = String::from_utf8(bytes)
        .map_err(|_| DocumentError::InvalidUtf8(path_ref.display().to_string()))?;

    Ok(split_paragraphs(&content))
}

/// BLAKE3 fingerprint over all paragraph texts (hex-encoded)
///
/// Computed at load and echoed into the revision summary so an export can
/// be matched to the exact content it was produced from.
pub fn fingerprint(paragraphs: &[Paragraph]) -> String {
    let mut hasher = blake3::Hasher::new();
    for paragraph in paragraphs {
        hasher.update(paragraph.text.as_bytes());
        hasher.update(b"\n");
    }
    hasher.finalize().to_hex().to_string()
}

/// The resolved, numbered edit list for one paragraph
///
/// This is the list decision keys refer to: stable-order resolution of
/// the paragraph's actual changes, recomputed per call and never stored.
pub fn numbered_edits(paragraph: &Paragraph, review: &SegmentReview) -> Vec<LocatedEdit> {
    resolve(&paragraph.text, &review.edits, ResolvePolicy::StableOrder)
}

/// Export flavors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportMode {
    /// Apply only edits the user accepted
    AcceptedOnly,
    /// Apply every surviving edit and append a revision summary
    FullWithSummary,
}

/// Error types for export preconditions
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No document loaded")]
    NoDocument,
    #[error("No accepted edits to apply")]
    NoAcceptedEdits,
}

/// Output artifact of an export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalDocument {
    /// Revised document text, paragraphs joined by newlines
    pub text: String,
    /// Number of edits actually written into the output
    pub applied: usize,
}

/// One entry of the appended revision summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryEntry {
    pub paragraph: usize,
    pub edit_number: usize,
    pub category: Category,
    pub original_text: String,
    pub final_text: String,
    pub reasoning: String,
}

/// Apply the accepted subset of one paragraph's edits to its text
///
/// Accepted edits are gathered by their stable-order index, re-resolved
/// under the longest-first export policy, and spliced by offset. A
/// paragraph with no accepted edits passes through unchanged.
pub fn apply_accepted(
    paragraph: &Paragraph,
    review: &SegmentReview,
    decisions: &DecisionStore,
) -> (String, usize) {
    let mut accepted = Vec::new();

    for (index, mut edit) in numbered_edits(paragraph, review).into_iter().enumerate() {
        let decision = decisions.peek(DecisionKey::new(paragraph.index, index));
        if decision.status != DecisionStatus::Accepted {
            continue;
        }
        let final_text = decision.final_text(&edit.proposal.revised_text).to_string();
        edit.proposal.revised_text = final_text;
        accepted.push(edit);
    }

    if accepted.is_empty() {
        return (paragraph.text.clone(), 0);
    }

    let kept = sweep(accepted, ResolvePolicy::LongestFirst);
    let replacements: Vec<Replacement> = kept
        .iter()
        .map(|edit| Replacement::new(edit, edit.proposal.revised_text.clone()))
        .collect();

    (substitute(&paragraph.text, &replacements), kept.len())
}

/// Export the document with only accepted edits applied
///
/// # Arguments
/// * `paragraphs` - Original paragraphs in document order
/// * `reviews` - One review per paragraph (missing entries mean no edits)
/// * `decisions` - The session's decision store
///
/// # Returns
/// * `Ok(FinalDocument)` - Revised text and applied-edit count
/// * `Err(ExportError)` - Precondition failure; export is withheld
pub fn export_accepted(
    paragraphs: &[Paragraph],
    reviews: &[SegmentReview],
    decisions: &DecisionStore,
) -> Result<FinalDocument, ExportError> {
    if paragraphs.is_empty() {
        return Err(ExportError::NoDocument);
    }
    if decisions.count(DecisionStatus::Accepted) == 0 {
        return Err(ExportError::NoAcceptedEdits);
    }

    let empty = SegmentReview::default();
    let mut texts = Vec::with_capacity(paragraphs.len());
    let mut applied = 0;

    for paragraph in paragraphs {
        let review = reviews.get(paragraph.index).unwrap_or(&empty);
        let (text, count) = apply_accepted(paragraph, review, decisions);
        applied += count;
        texts.push(text);
    }

    info!(applied, "exported document with accepted edits");
    Ok(FinalDocument {
        text: texts.join("\n"),
        applied,
    })
}

/// Export the document with every surviving edit applied, plus a summary
///
/// All non-no-op edits are applied regardless of decision, resolved under
/// the longest-first policy. The appended report lists each applied edit
/// in paragraph order then span order: category, original span, final
/// span, and the Reviewer's reasoning.
pub fn export_with_summary(
    paragraphs: &[Paragraph],
    reviews: &[SegmentReview],
    document_fingerprint: &str,
    run_id: &str,
) -> Result<FinalDocument, ExportError> {
    if paragraphs.is_empty() {
        return Err(ExportError::NoDocument);
    }

    let empty = SegmentReview::default();
    let mut texts = Vec::with_capacity(paragraphs.len());
    let mut entries = Vec::new();

    for paragraph in paragraphs {
        let review = reviews.get(paragraph.index).unwrap_or(&empty);
        let kept = resolve(&paragraph.text, &review.edits, ResolvePolicy::LongestFirst);

        for (index, edit) in kept.iter().enumerate() {
            entries.push(SummaryEntry {
                paragraph: paragraph.index,
                edit_number: index + 1,
                category: edit.proposal.rule_category,
                original_text: edit.proposal.original_text.clone(),
                final_text: edit.proposal.revised_text.clone(),
                reasoning: edit.proposal.reasoning.clone(),
            });
        }

        let replacements: Vec<Replacement> = kept
            .iter()
            .map(|edit| Replacement::new(edit, edit.proposal.revised_text.clone()))
            .collect();
        texts.push(substitute(&paragraph.text, &replacements));
    }

    let applied = entries.len();
    let mut text = texts.join("\n");
    text.push_str(&render_summary(&entries, document_fingerprint, run_id));

    info!(applied, "exported document with revision summary");
    Ok(FinalDocument { text, applied })
}

fn render_summary(entries: &[SummaryEntry], document_fingerprint: &str, run_id: &str) -> String {
    let mut out = String::new();
    out.push_str("\n\n----------------------------------------\n");
    out.push_str("Revision summary\n");
    out.push_str(&format!("Run:      {}\n", run_id));
    out.push_str(&format!("Document: {}\n", document_fingerprint));
    out.push_str(&format!("Edits:    {}\n", entries.len()));

    for entry in entries {
        out.push_str(&format!(
            "\nParagraph {}, edit {} [{}]\n",
            entry.paragraph + 1,
            entry.edit_number,
            entry.category
        ));
        out.push_str(&format!("  - {}\n", entry.original_text));
        out.push_str(&format!("  + {}\n", entry.final_text));
        if !entry.reasoning.is_empty() {
            out.push_str(&format!("  {}\n", entry.reasoning));
        }
    }

    out
}
