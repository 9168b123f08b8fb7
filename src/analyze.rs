use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::json::generate_run_id;
use crate::language::Language;
use crate::proposal::SegmentReview;
use crate::review::Reviewer;

/// Default number of concurrent Reviewer requests
pub const DEFAULT_CONCURRENCY: usize = 15;
/// Upper bound on concurrent Reviewer requests
pub const MAX_CONCURRENCY: usize = 50;

/// Progress callback, invoked per completion as (completed, total)
pub type ProgressFn = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Options for one analysis run
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub language: Language,
    /// Concurrent Reviewer requests; clamped to 1..=MAX_CONCURRENCY
    pub concurrency: usize,
}

impl AnalyzeOptions {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }
}

/// Result of one analysis run
#[derive(Debug, Clone)]
pub struct AnalysisRun {
    pub run_id: String,
    /// One review per paragraph, in original paragraph order
    pub reviews: Vec<SegmentReview>,
    /// Paragraphs actually sent to the Reviewer
    pub analyzed: usize,
    /// Paragraphs whose review failed and degraded to zero edits
    pub failed: usize,
}

/// Review every non-empty paragraph concurrently
///
/// One Reviewer call per non-empty paragraph, bounded by a semaphore.
/// Results are reassembled by paragraph index, so output order never
/// depends on completion order; empty paragraphs get empty reviews
/// without a Reviewer call.
///
/// Each call is fault-isolated: a failure for one paragraph degrades to
/// zero edits for that paragraph and never aborts sibling in-flight work.
/// Failures surface only as the aggregate `failed` count.
///
/// # Arguments
/// * `reviewer` - The Reviewer collaborator
/// * `paragraphs` - Paragraph texts in document order
/// * `options` - Language and concurrency settings
/// * `progress` - Optional per-completion callback (completed, total)
pub async fn analyze_paragraphs(
    reviewer: Arc<dyn Reviewer>,
    paragraphs: &[String],
    options: &AnalyzeOptions,
    progress: Option<ProgressFn>,
) -> AnalysisRun {
    let run_id = generate_run_id();
    let concurrency = options.concurrency.clamp(1, MAX_CONCURRENCY);

    let tasks: Vec<(usize, String)> = paragraphs
        .iter()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(index, text)| (index, text.clone()))
        .collect();
    let total = tasks.len();

    info!(run_id = %run_id, paragraphs = total, concurrency, "starting analysis run");

    let semaphore = Arc::new(Semaphore::new(concurrency));
    let completed = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));

    let futures: Vec<_> = tasks
        .into_iter()
        .map(|(index, text)| {
            let reviewer = Arc::clone(&reviewer);
            let semaphore = Arc::clone(&semaphore);
            let completed = Arc::clone(&completed);
            let failed = Arc::clone(&failed);
            let progress = progress.clone();
            let language = options.language;

            async move {
                let _permit = match semaphore.acquire().await {
                    Ok(permit) => permit,
                    Err(_) => return (index, SegmentReview::default()),
                };

                let review = match reviewer.review_segment(&text, language).await {
                    Ok(review) => review,
                    Err(error) => {
                        warn!(paragraph = index, %error, "review failed, degrading to zero edits");
                        failed.fetch_add(1, Ordering::Relaxed);
                        SegmentReview::default()
                    }
                };

                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                if let Some(report) = &progress {
                    report(done, total);
                }

                (index, review)
            }
        })
        .collect();

    let results = join_all(futures).await;

    // Reassemble in original paragraph order
    let mut reviews = vec![SegmentReview::default(); paragraphs.len()];
    for (index, review) in results {
        reviews[index] = review;
    }

    let failed = failed.load(Ordering::Relaxed);
    if failed > 0 {
        warn!(run_id = %run_id, failed, "analysis degraded for some paragraphs");
    }
    info!(run_id = %run_id, analyzed = total, failed, "analysis run complete");

    AnalysisRun {
        run_id,
        reviews,
        analyzed: total,
        failed,
    }
}
