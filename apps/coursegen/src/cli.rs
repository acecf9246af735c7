//! Command-line definitions for the `coursegen` binary.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};

use crate::evaluation::summarize;
use crate::generation::ContentType;
use crate::llm_client::{LlmClient, StructuredPayload};
use crate::pipeline::{run_pipeline, GenerationReport, PipelineRequest, SyllabusSource};

/// Width of the `=` rules around content printed to stdout.
const RULE_WIDTH: usize = 80;

/// Generate teaching material from a course syllabus.
#[derive(Parser)]
#[command(name = "coursegen", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate one piece of content from a syllabus file.
    Generate(GenerateArgs),

    /// Serve the JSON HTTP API.
    Serve {
        /// Port to listen on (defaults to PORT or 8080).
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Path to syllabus file (PDF, DOCX, or TXT).
    #[arg(long)]
    pub syllabus: PathBuf,

    /// Type of content to generate.
    #[arg(long = "type", value_enum)]
    pub content_type: ContentType,

    /// Specific topic to focus on.
    #[arg(long)]
    pub topic: Option<String>,

    /// Output file path. Prints to stdout when omitted.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Evaluate the generated content.
    #[arg(long)]
    pub evaluate: bool,
}

/// Runs the `generate` subcommand.
pub async fn generate(args: GenerateArgs, llm: &LlmClient, language: &str) -> Result<()> {
    let report = run_pipeline(
        PipelineRequest {
            source: SyllabusSource::File(args.syllabus),
            content_type: args.content_type,
            topic: args.topic,
            evaluate: args.evaluate,
        },
        llm,
        language,
    )
    .await
    .context("Content generation failed")?;

    if let Some(evaluation) = &report.evaluation {
        log_evaluation(evaluation);
    }

    match &args.output {
        Some(path) => save(&report, path)?,
        None => println!("{}", framed(&report.content)),
    }
    Ok(())
}

fn log_evaluation(evaluation: &StructuredPayload) {
    if let Some(reason) = evaluation.error() {
        error!("Content evaluation failed: {reason}");
        return;
    }

    let summary = summarize(evaluation);
    match summary.overall_score {
        Some(score) => info!("Content evaluation: Overall score: {score}"),
        None => info!("Content evaluation: Overall score: N/A"),
    }
    for criterion in &summary.criteria {
        info!("- {}: {}/5", criterion.criterion, criterion.score);
    }
}

fn save(report: &GenerationReport, path: &Path) -> Result<()> {
    std::fs::write(path, &report.content)
        .with_context(|| format!("Failed to write output file {}", path.display()))?;
    info!("Content saved to {}", path.display());
    Ok(())
}

/// Content between two blank-line-padded `=` rules.
fn framed(content: &str) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    format!("\n{rule}\n\n{content}\n\n{rule}\n")
}
