use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::proposal::{EditProposal, SegmentReview};

/// Proposals for one paragraph, as supplied to `redline apply`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParagraphProposals {
    /// Zero-based index of the paragraph the proposals quote
    pub paragraph: usize,
    #[serde(default)]
    pub edits: Vec<EditProposal>,
}

/// Input file format for offline application of proposals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalFile {
    /// Run identifier; "auto" asks the tool to generate one
    #[serde(default = "default_run_id")]
    pub run_id: String,
    #[serde(default)]
    pub proposals: Vec<ParagraphProposals>,
}

fn default_run_id() -> String {
    "auto".to_string()
}

impl ProposalFile {
    /// Expand into one review per paragraph for a document of `len`
    /// paragraphs
    ///
    /// Proposals addressing paragraphs beyond the document are dropped;
    /// repeated entries for the same paragraph are concatenated in file
    /// order.
    pub fn into_reviews(self, len: usize) -> Vec<SegmentReview> {
        let mut reviews = vec![SegmentReview::default(); len];
        for entry in self.proposals {
            if let Some(slot) = reviews.get_mut(entry.paragraph) {
                slot.edits.extend(entry.edits);
            }
        }
        reviews
    }
}

/// Machine-readable CLI response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliResponse {
    pub success: bool,
    pub run_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    pub paragraphs: usize,
    pub edits_applied: usize,
    pub paragraphs_failed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CliResponse {
    /// Create a successful response
    pub fn success(
        run_id: String,
        fingerprint: Option<String>,
        paragraphs: usize,
        edits_applied: usize,
        paragraphs_failed: usize,
    ) -> Self {
        Self {
            success: true,
            run_id,
            fingerprint,
            paragraphs,
            edits_applied,
            paragraphs_failed,
            error: None,
        }
    }

    /// Create a failure response
    pub fn failure(run_id: String, error: String) -> Self {
        Self {
            success: false,
            run_id,
            fingerprint: None,
            paragraphs: 0,
            edits_applied: 0,
            paragraphs_failed: 0,
            error: Some(error),
        }
    }
}

/// Generate a unique run identifier
pub fn generate_run_id() -> String {
    Uuid::new_v4().to_string()
}
