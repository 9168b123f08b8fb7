use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::analyze::{AnalysisRun, AnalyzeOptions, ProgressFn, analyze_paragraphs};
use crate::decision::{DecisionKey, DecisionStatus, DecisionStore};
use crate::document::{
    ExportError, ExportMode, FinalDocument, Paragraph, export_accepted, export_with_summary,
    fingerprint, numbered_edits, split_paragraphs,
};
use crate::proposal::SegmentReview;
use crate::render::{AnnotateOptions, Segment, annotate};
use crate::review::Reviewer;

/// Counts surfaced to status displays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    /// Non-empty paragraphs in the document
    pub paragraphs: usize,
    pub words: usize,
    pub characters: usize,
    /// Edits surviving resolution across all paragraphs
    pub total_edits: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub pending: usize,
}

/// One document-review session
///
/// Owns the loaded paragraphs, the latest analysis run, and the decision
/// store. Everything derived (located edits, resolved sets, annotations)
/// is recomputed per call; the decision store is the only state with a
/// lifecycle of its own, and it is reset whenever a new run is installed.
#[derive(Default)]
pub struct ReviewSession {
    paragraphs: Vec<Paragraph>,
    document_fingerprint: String,
    run: Option<AnalysisRun>,
    decisions: DecisionStore,
}

impl ReviewSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session over already-split paragraphs
    pub fn load(paragraphs: Vec<Paragraph>) -> Self {
        let document_fingerprint = fingerprint(&paragraphs);
        info!(
            paragraphs = paragraphs.len(),
            fingerprint = %document_fingerprint,
            "document loaded"
        );
        Self {
            paragraphs,
            document_fingerprint,
            run: None,
            decisions: DecisionStore::new(),
        }
    }

    /// Start a session from raw document text, one paragraph per line
    pub fn from_text(text: &str) -> Self {
        Self::load(split_paragraphs(text))
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn fingerprint(&self) -> &str {
        &self.document_fingerprint
    }

    pub fn run(&self) -> Option<&AnalysisRun> {
        self.run.as_ref()
    }

    pub fn decisions(&self) -> &DecisionStore {
        &self.decisions
    }

    pub fn decisions_mut(&mut self) -> &mut DecisionStore {
        &mut self.decisions
    }

    /// Analyze all paragraphs with the given reviewer
    ///
    /// Starts a fresh decision map; every edit surviving resolution is
    /// registered as pending so bulk operations see the full set.
    pub async fn analyze(
        &mut self,
        reviewer: Arc<dyn Reviewer>,
        options: AnalyzeOptions,
        progress: Option<ProgressFn>,
    ) -> &AnalysisRun {
        let texts: Vec<String> = self
            .paragraphs
            .iter()
            .map(|paragraph| paragraph.text.clone())
            .collect();

        let run = analyze_paragraphs(reviewer, &texts, &options, progress).await;
        self.install_run(run)
    }

    /// Install an externally produced set of reviews (offline runs)
    pub fn attach_reviews(&mut self, run_id: String, mut reviews: Vec<SegmentReview>) -> &AnalysisRun {
        reviews.resize(self.paragraphs.len(), SegmentReview::default());
        let analyzed = self
            .paragraphs
            .iter()
            .filter(|paragraph| !paragraph.text.trim().is_empty())
            .count();

        self.install_run(AnalysisRun {
            run_id,
            reviews,
            analyzed,
            failed: 0,
        })
    }

    fn install_run(&mut self, run: AnalysisRun) -> &AnalysisRun {
        self.decisions.reset_all();
        for paragraph in &self.paragraphs {
            let review = &run.reviews[paragraph.index];
            for edit in 0..numbered_edits(paragraph, review).len() {
                self.decisions.get(DecisionKey::new(paragraph.index, edit));
            }
        }
        &*self.run.insert(run)
    }

    /// The resolved, numbered edit list decisions refer to
    ///
    /// Recomputed per call from the paragraph's current review.
    pub fn resolved_edits(&self, paragraph: usize) -> Vec<crate::span::LocatedEdit> {
        let Some(run) = &self.run else {
            return Vec::new();
        };
        match (self.paragraphs.get(paragraph), run.reviews.get(paragraph)) {
            (Some(paragraph), Some(review)) => numbered_edits(paragraph, review),
            _ => Vec::new(),
        }
    }

    /// Annotated view of one paragraph
    pub fn annotated(&self, paragraph: usize, options: &AnnotateOptions) -> Vec<Segment> {
        match self.paragraphs.get(paragraph) {
            Some(found) => annotate(&found.text, &self.resolved_edits(paragraph), options),
            None => Vec::new(),
        }
    }

    /// Record a decision on one edit
    ///
    /// A key referencing an edit that no longer exists (stale after
    /// re-analysis) is stored harmlessly and ignored at export.
    pub fn decide(
        &mut self,
        paragraph: usize,
        edit: usize,
        status: DecisionStatus,
        custom_text: Option<String>,
    ) {
        self.decisions
            .set(DecisionKey::new(paragraph, edit), status, custom_text);
    }

    /// Produce the final output artifact
    pub fn export(&self, mode: ExportMode) -> Result<FinalDocument, ExportError> {
        if self.paragraphs.is_empty() {
            return Err(ExportError::NoDocument);
        }
        let empty = Vec::new();
        let reviews = self
            .run
            .as_ref()
            .map(|run| run.reviews.as_slice())
            .unwrap_or(&empty);

        match mode {
            ExportMode::AcceptedOnly => export_accepted(&self.paragraphs, reviews, &self.decisions),
            ExportMode::FullWithSummary => export_with_summary(
                &self.paragraphs,
                reviews,
                &self.document_fingerprint,
                self.run.as_ref().map(|run| run.run_id.as_str()).unwrap_or("-"),
            ),
        }
    }

    /// Counts for status displays
    pub fn stats(&self) -> SessionStats {
        let non_empty: Vec<&Paragraph> = self
            .paragraphs
            .iter()
            .filter(|paragraph| !paragraph.text.trim().is_empty())
            .collect();

        let total_edits: usize = self
            .paragraphs
            .iter()
            .map(|paragraph| self.resolved_edits(paragraph.index).len())
            .sum();
        let accepted = self.decisions.count(DecisionStatus::Accepted);
        let rejected = self.decisions.count(DecisionStatus::Rejected);

        SessionStats {
            paragraphs: non_empty.len(),
            words: non_empty
                .iter()
                .map(|paragraph| paragraph.text.split_whitespace().count())
                .sum(),
            characters: non_empty
                .iter()
                .map(|paragraph| paragraph.text.chars().count())
                .sum(),
            total_edits,
            accepted,
            rejected,
            pending: total_edits.saturating_sub(accepted + rejected),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proposal::{Category, EditProposal};

    fn proposal(original: &str, revised: &str) -> EditProposal {
        EditProposal {
            original_text: original.to_string(),
            revised_text: revised.to_string(),
            rule_category: Category::Grammar,
            reasoning: String::new(),
        }
    }

    fn session_with_reviews() -> ReviewSession {
        let mut session = ReviewSession::from_text("τον βιβλίο\n\nfoo bar foo");
        session.attach_reviews(
            "run-1".to_string(),
            vec![
                SegmentReview {
                    edits: vec![proposal("τον", "το")],
                },
                SegmentReview::default(),
                SegmentReview {
                    edits: vec![proposal("foo", "qux"), proposal("foo", "zap")],
                },
            ],
        );
        session
    }

    #[test]
    fn test_attach_reviews_registers_pending_decisions() {
        let session = session_with_reviews();

        // One surviving edit in paragraph 0, one in paragraph 2 (the
        // duplicate span collapses to a single numbered edit)
        assert_eq!(session.decisions().len(), 2);
        assert_eq!(session.stats().pending, 2);
    }

    #[test]
    fn test_new_run_resets_decisions() {
        let mut session = session_with_reviews();
        session.decide(0, 0, DecisionStatus::Accepted, None);

        session.attach_reviews(
            "run-2".to_string(),
            vec![SegmentReview {
                edits: vec![proposal("βιβλίο", "τετράδιο")],
            }],
        );

        assert_eq!(session.decisions().count(DecisionStatus::Accepted), 0);
        assert_eq!(session.run().unwrap().run_id, "run-2");
    }

    #[test]
    fn test_decide_stale_key_is_harmless() {
        let mut session = session_with_reviews();
        session.decide(7, 42, DecisionStatus::Accepted, None);

        // Stale key contributes nothing at export beyond the count guard
        let document = session.export(ExportMode::AcceptedOnly).unwrap();
        assert_eq!(document.applied, 0);
        assert_eq!(document.text, "τον βιβλίο\n\nfoo bar foo");
    }

    #[test]
    fn test_export_accepted_duplicate_span_scenario() {
        let mut session = session_with_reviews();
        session.decide(2, 0, DecisionStatus::Accepted, None);

        let document = session.export(ExportMode::AcceptedOnly).unwrap();

        // Exactly one replacement at offset 0; the second foo survives
        assert_eq!(document.text, "τον βιβλίο\n\nqux bar foo");
        assert_eq!(document.applied, 1);
    }

    #[test]
    fn test_export_without_document_is_withheld() {
        let session = ReviewSession::new();
        assert!(matches!(
            session.export(ExportMode::AcceptedOnly),
            Err(ExportError::NoDocument)
        ));
    }

    #[test]
    fn test_export_without_accepted_edits_is_withheld() {
        let session = session_with_reviews();
        assert!(matches!(
            session.export(ExportMode::AcceptedOnly),
            Err(ExportError::NoAcceptedEdits)
        ));
    }

    #[test]
    fn test_summary_export_needs_no_decisions() {
        let session = session_with_reviews();
        let document = session.export(ExportMode::FullWithSummary).unwrap();

        assert!(document.text.starts_with("το βιβλίο\n\nqux bar foo"));
        assert!(document.text.contains("Revision summary"));
        assert!(document.text.contains("Run:      run-1"));
        assert_eq!(document.applied, 2);
    }

    #[test]
    fn test_stats_counts() {
        let mut session = session_with_reviews();
        session.decide(0, 0, DecisionStatus::Accepted, None);

        let stats = session.stats();
        assert_eq!(stats.paragraphs, 2);
        assert_eq!(stats.total_edits, 2);
        assert_eq!(stats.accepted, 1);
        assert_eq!(stats.rejected, 0);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.words, 5);
    }

    #[test]
    fn test_annotated_view_numbers_edits() {
        let session = session_with_reviews();
        let segments = session.annotated(0, &AnnotateOptions::default());

        let highlighted: Vec<&Segment> = segments
            .iter()
            .filter(|segment| {
                matches!(
                    segment.kind,
                    crate::render::SegmentKind::Highlighted { .. }
                )
            })
            .collect();
        assert_eq!(highlighted.len(), 1);
        assert_eq!(highlighted[0].text, "τον");
    }
}
