// Edit proposal model
pub mod proposal;

// Span locator
pub mod span;

// Conflict resolver
pub mod resolve;

// Text renderer
pub mod render;

// Decision store
pub mod decision;

// Document assembler
pub mod document;

// Review session surface
pub mod session;

// Reviewer collaborator
pub mod review;

// Concurrent analysis pool
pub mod analyze;

// Rule-set blobs
pub mod rules;

// Language selection
pub mod language;

// Wire formats
pub mod json;

// Re-exports
pub use proposal::{Category, EditProposal, SegmentReview};
pub use span::{LocatedEdit, Span, locate};
pub use resolve::{ResolvePolicy, resolve, sweep};
pub use render::{
    AnnotateOptions, Replacement, Segment, SegmentKind, TRUNCATION_MARKER, annotate, substitute,
};
pub use decision::{DecisionKey, DecisionStatus, DecisionStore, EditDecision};
pub use document::{
    DocumentError, ExportError, ExportMode, FinalDocument, Paragraph, SummaryEntry,
    export_accepted, export_with_summary, fingerprint, load_paragraphs, numbered_edits,
    split_paragraphs,
};
pub use session::{ReviewSession, SessionStats};
pub use review::{DEFAULT_MODEL, EDITOR_SYSTEM_PROMPT, GeminiReviewer, ReviewError, Reviewer};
pub use analyze::{
    AnalysisRun, AnalyzeOptions, DEFAULT_CONCURRENCY, MAX_CONCURRENCY, ProgressFn,
    analyze_paragraphs,
};
pub use rules::{RulesError, default_rules, load_rules, save_rules};
pub use language::Language;
pub use json::{CliResponse, ParagraphProposals, ProposalFile, generate_run_id};
