use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use redline::{
    AnalyzeOptions, CliResponse, DEFAULT_CONCURRENCY, DEFAULT_MODEL, DecisionStatus, ExportError,
    ExportMode, FinalDocument, GeminiReviewer, Language, ProgressFn, ProposalFile, ReviewSession,
    Reviewer, generate_run_id, load_paragraphs,
};

/// Reviewer-backed copyediting for plain-text documents
#[derive(Parser, Debug)]
#[command(name = "redline")]
#[command(version = "0.1.0")]
#[command(about = "Reconcile and apply reviewer edit proposals", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Review a document with the Gemini reviewer and export the result
    Review {
        /// Document to review (plain text, one paragraph per line)
        #[arg(short, long)]
        file: PathBuf,

        /// Document language
        #[arg(short, long, value_enum, default_value_t = Language::English)]
        language: Language,

        /// Parallel reviewer requests (1-50)
        #[arg(short, long, default_value_t = DEFAULT_CONCURRENCY)]
        concurrency: usize,

        /// Gemini model name
        #[arg(long, default_value = DEFAULT_MODEL)]
        model: String,

        /// API key (defaults to the GEMINI_API_KEY environment variable)
        #[arg(long)]
        api_key: Option<String>,

        /// Directory of replacement rule files (<language>.txt)
        #[arg(long)]
        rules_dir: Option<PathBuf>,

        /// Export the full document with an appended revision summary
        #[arg(short, long)]
        summary: bool,

        /// Emit a structured JSON response instead of a status line
        #[arg(short, long)]
        json: bool,

        /// Write the revised document to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Apply proposals from a JSON file without calling the reviewer
    Apply {
        /// Document to revise (plain text, one paragraph per line)
        #[arg(short, long)]
        file: PathBuf,

        /// JSON file with proposal lists (omit to read from stdin)
        #[arg(short, long)]
        proposals: Option<PathBuf>,

        /// Export the full document with an appended revision summary
        #[arg(short, long)]
        summary: bool,

        /// Emit a structured JSON response instead of a status line
        #[arg(short, long)]
        json: bool,

        /// Write the revised document to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    if let Err(error) = run(args).await {
        eprintln!("Error: {error:#}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Review {
            file,
            language,
            concurrency,
            model,
            api_key,
            rules_dir,
            summary,
            json,
            output,
        } => {
            run_review(
                file, language, concurrency, model, api_key, rules_dir, summary, json, output,
            )
            .await
        }
        Command::Apply {
            file,
            proposals,
            summary,
            json,
            output,
        } => run_apply(file, proposals, summary, json, output),
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_review(
    file: PathBuf,
    language: Language,
    concurrency: usize,
    model: String,
    api_key: Option<String>,
    rules_dir: Option<PathBuf>,
    summary: bool,
    json: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let paragraphs = load_paragraphs(&file)
        .with_context(|| format!("failed to read document '{}'", file.display()))?;
    let mut session = ReviewSession::load(paragraphs);

    // A missing key is reported here, before the batch starts
    let mut reviewer = GeminiReviewer::new(api_key)?.with_model(model);
    if let Some(dir) = rules_dir {
        reviewer = reviewer.with_rules_dir(dir);
    }
    let reviewer: Arc<dyn Reviewer> = Arc::new(reviewer);

    let progress: ProgressFn = Arc::new(|done, total| {
        eprintln!("Analyzed {done} of {total} paragraphs...");
    });

    let options = AnalyzeOptions::new(language).with_concurrency(concurrency);
    session.analyze(reviewer, options, Some(progress)).await;

    // Non-interactive run: accept every surviving edit before export
    session.decisions_mut().bulk_set(DecisionStatus::Accepted);

    let run_id = session
        .run()
        .map(|run| run.run_id.clone())
        .unwrap_or_default();
    let failed = session.run().map(|run| run.failed).unwrap_or(0);

    let mode = if summary {
        ExportMode::FullWithSummary
    } else {
        ExportMode::AcceptedOnly
    };
    let document = match session.export(mode) {
        Ok(document) => document,
        Err(error @ ExportError::NoAcceptedEdits) => {
            output_response(&CliResponse::failure(run_id, error.to_string()), json);
            return Ok(());
        }
        Err(error) => return Err(error.into()),
    };

    emit(&session, run_id, failed, &document, json, output.as_ref())
}

fn run_apply(
    file: PathBuf,
    proposals: Option<PathBuf>,
    summary: bool,
    json: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let paragraphs = load_paragraphs(&file)
        .with_context(|| format!("failed to read document '{}'", file.display()))?;
    let request = read_proposal_file(proposals.as_ref())?;

    let run_id = if request.run_id == "auto" {
        generate_run_id()
    } else {
        request.run_id.clone()
    };

    let mut session = ReviewSession::load(paragraphs);
    let reviews = request.into_reviews(session.paragraphs().len());
    session.attach_reviews(run_id.clone(), reviews);
    session.decisions_mut().bulk_set(DecisionStatus::Accepted);

    let mode = if summary {
        ExportMode::FullWithSummary
    } else {
        ExportMode::AcceptedOnly
    };
    let document = match session.export(mode) {
        Ok(document) => document,
        Err(error @ ExportError::NoAcceptedEdits) => {
            output_response(&CliResponse::failure(run_id, error.to_string()), json);
            return Ok(());
        }
        Err(error) => return Err(error.into()),
    };

    emit(&session, run_id, 0, &document, json, output.as_ref())
}

/// Read a ProposalFile from a path or stdin
fn read_proposal_file(path: Option<&PathBuf>) -> Result<ProposalFile> {
    let json_str = if let Some(path) = path {
        fs::read_to_string(path)
            .with_context(|| format!("failed to read proposals '{}'", path.display()))?
    } else {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read proposals from stdin")?;
        buffer
    };

    serde_json::from_str(&json_str).context("invalid proposal JSON")
}

/// Write the revised document and report the outcome
fn emit(
    session: &ReviewSession,
    run_id: String,
    failed: usize,
    document: &FinalDocument,
    json: bool,
    output: Option<&PathBuf>,
) -> Result<()> {
    match output {
        Some(path) => fs::write(path, &document.text)
            .with_context(|| format!("failed to write output to '{}'", path.display()))?,
        None => println!("{}", document.text),
    }

    let response = CliResponse::success(
        run_id,
        Some(session.fingerprint().to_string()),
        session.paragraphs().len(),
        document.applied,
        failed,
    );
    output_response(&response, json);
    Ok(())
}

/// Format and print the response to stderr
///
/// The revised document owns stdout, so status goes to stderr in both
/// human-readable and JSON form.
fn output_response(response: &CliResponse, json_mode: bool) {
    if json_mode {
        let payload = serde_json::to_string_pretty(response)
            .unwrap_or_else(|_| r#"{"error": "failed to serialize response"}"#.to_string());
        eprintln!("{payload}");
    } else if response.success {
        eprintln!(
            "Applied {} edit(s) across {} paragraph(s)",
            response.edits_applied, response.paragraphs
        );
        if response.paragraphs_failed > 0 {
            eprintln!(
                "Warning: {} paragraph(s) could not be analyzed",
                response.paragraphs_failed
            );
        }
    } else {
        eprintln!(
            "Nothing exported: {}",
            response.error.as_deref().unwrap_or("unknown error")
        );
    }
}
