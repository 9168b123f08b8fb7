use std::sync::Arc;

use async_trait::async_trait;

use redline::{
    AnalyzeOptions, AnnotateOptions, Category, DecisionStatus, EditProposal, ExportError,
    ExportMode, Language, ResolvePolicy, ReviewError, ReviewSession, Reviewer, SegmentKind,
    SegmentReview, locate, resolve,
};

fn proposal(original: &str, revised: &str, category: Category) -> EditProposal {
    EditProposal {
        original_text: original.to_string(),
        revised_text: revised.to_string(),
        rule_category: category,
        reasoning: format!("{original} should read {revised}"),
    }
}

/// Reviewer with canned proposals per recognized phrase
struct CannedReviewer;

#[async_trait]
impl Reviewer for CannedReviewer {
    async fn review_segment(
        &self,
        text: &str,
        _language: Language,
    ) -> Result<SegmentReview, ReviewError> {
        let mut edits = Vec::new();
        if text.contains("τον βιβλίο") {
            edits.push(proposal("τον", "το", Category::GreekFinalNu));
        }
        if text.contains("red, white and blue") {
            edits.push(proposal(
                "white and blue",
                "white, and blue",
                Category::Punctuation,
            ));
        }
        // A quote that drifted from the paragraph; must be dropped silently
        edits.push(proposal("not actually present", "whatever", Category::Other));
        // A no-op; must never be counted or rendered
        edits.push(proposal("the", "the", Category::Style));
        Ok(SegmentReview { edits })
    }
}

#[tokio::test]
async fn test_full_session_analyze_decide_export() {
    let mut session =
        ReviewSession::from_text("τον βιβλίο\n\nthe flag is red, white and blue");

    let options = AnalyzeOptions::new(Language::Greek).with_concurrency(4);
    session
        .analyze(Arc::new(CannedReviewer), options, None)
        .await;

    // Unlocatable and no-op proposals are excluded from the numbered lists
    assert_eq!(session.resolved_edits(0).len(), 1);
    assert_eq!(session.resolved_edits(2).len(), 1);

    let stats = session.stats();
    assert_eq!(stats.total_edits, 2);
    assert_eq!(stats.pending, 2);

    // Accept the Greek fix, reject the punctuation fix
    session.decide(0, 0, DecisionStatus::Accepted, None);
    session.decide(2, 0, DecisionStatus::Rejected, None);

    let document = session.export(ExportMode::AcceptedOnly).unwrap();
    assert_eq!(
        document.text,
        "το βιβλίο\n\nthe flag is red, white and blue"
    );
    assert_eq!(document.applied, 1);
}

#[tokio::test]
async fn test_custom_text_overrides_reviewer_suggestion() {
    let mut session = ReviewSession::from_text("τον βιβλίο");
    session
        .analyze(
            Arc::new(CannedReviewer),
            AnalyzeOptions::new(Language::Greek),
            None,
        )
        .await;

    session.decide(0, 0, DecisionStatus::Accepted, Some("  αυτό το  ".to_string()));

    let document = session.export(ExportMode::AcceptedOnly).unwrap();
    assert_eq!(document.text, "αυτό το βιβλίο");
}

#[tokio::test]
async fn test_reanalysis_resets_decisions_and_renumbers() {
    let mut session = ReviewSession::from_text("τον βιβλίο");
    session
        .analyze(
            Arc::new(CannedReviewer),
            AnalyzeOptions::new(Language::Greek),
            None,
        )
        .await;
    session.decide(0, 0, DecisionStatus::Accepted, None);
    assert_eq!(session.stats().accepted, 1);

    // A new run discards in-flight decisions
    session
        .analyze(
            Arc::new(CannedReviewer),
            AnalyzeOptions::new(Language::Greek),
            None,
        )
        .await;
    assert_eq!(session.stats().accepted, 0);
    assert!(matches!(
        session.export(ExportMode::AcceptedOnly),
        Err(ExportError::NoAcceptedEdits)
    ));
}

#[test]
fn test_locate_content_matches_for_any_substring() {
    let text = "Κάθε λέξη στη θέση της";
    for needle in ["Κάθε", "λέξη", "στη θέση", "της"] {
        let edit = locate(text, &proposal(needle, "x", Category::Other), 1).unwrap();
        assert_eq!(&text[edit.start()..edit.end()], needle);
    }
}

#[test]
fn test_resolution_policies_disagree_only_on_conflicts() {
    let text = "the quick brown fox";
    let proposals = vec![
        proposal("quick", "slow", Category::Style),
        proposal("quick brown", "slow grey", Category::Style),
        proposal("fox", "dog", Category::Style),
    ];

    let stable = resolve(text, &proposals, ResolvePolicy::StableOrder);
    let longest = resolve(text, &proposals, ResolvePolicy::LongestFirst);

    // The non-conflicting edit survives under both policies
    assert!(stable.iter().any(|edit| edit.proposal.original_text == "fox"));
    assert!(longest.iter().any(|edit| edit.proposal.original_text == "fox"));

    // The conflict is decided differently
    assert!(stable.iter().any(|edit| edit.proposal.original_text == "quick"));
    assert!(
        longest
            .iter()
            .any(|edit| edit.proposal.original_text == "quick brown")
    );
}

#[tokio::test]
async fn test_annotated_view_matches_decision_numbering() {
    let mut session = ReviewSession::from_text("τον βιβλίο");
    session
        .analyze(
            Arc::new(CannedReviewer),
            AnalyzeOptions::new(Language::Greek),
            None,
        )
        .await;

    let segments = session.annotated(0, &AnnotateOptions::default());
    let numbers: Vec<usize> = segments
        .iter()
        .filter_map(|segment| match segment.kind {
            SegmentKind::Highlighted { edit_number } => Some(edit_number),
            SegmentKind::Plain => None,
        })
        .collect();

    // Edit number 1 is the edit addressed by decision key (0, 0)
    assert_eq!(numbers, vec![1]);
}
