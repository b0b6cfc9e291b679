//! # Text Animator CLI
//!
//! Evaluates text layer documents outside the editor.
//!
//! ## Commands
//! - `eval`: Print per-character state for one frame as JSON
//! - `check`: Report configuration and expression problems

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use text_animator_core::{GlyphState, LayerEvaluation, LayerEvaluator};
use text_animator_data::{TextLayerDocument, UnitKind};

#[derive(Parser)]
#[command(name = "text-animator")]
#[command(about = "Evaluate per-character text animators")]
#[command(version)]
struct Cli {
    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate one frame of a text layer document
    Eval {
        /// Path to the document (`-` reads stdin)
        input: PathBuf,

        /// Frame number; time is derived from the frame rate
        #[arg(short, long, conflicts_with = "time")]
        frame: Option<i64>,

        /// Time in seconds; the frame is derived from the frame rate
        #[arg(short, long)]
        time: Option<f64>,

        /// Override the document's frame rate
        #[arg(long)]
        fps: Option<f32>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Report configuration and expression problems in a document
    Check {
        /// Path to the document (`-` reads stdin)
        input: PathBuf,

        /// Exit with an error when any problem is found
        #[arg(long)]
        strict: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format);

    match cli.command {
        Commands::Eval {
            input,
            frame,
            time,
            fps,
            pretty,
            output,
        } => cmd_eval(&input, frame, time, fps, pretty, output.as_deref()),
        Commands::Check { input, strict } => cmd_check(&input, strict),
    }
}

fn init_logging(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn load_document(path: &Path) -> Result<TextLayerDocument> {
    let text = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read document from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
    };
    parse_document(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

fn parse_document(text: &str) -> Result<TextLayerDocument> {
    Ok(serde_json::from_str(text)?)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DiagnosticReport {
    animator_id: String,
    based_on: UnitKind,
    unit: usize,
    error: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FrameReport {
    frame: i64,
    time: f64,
    glyphs: Vec<GlyphState>,
    diagnostics: Vec<DiagnosticReport>,
}

impl FrameReport {
    fn new(frame: i64, time: f64, evaluation: LayerEvaluation) -> Self {
        let diagnostics = evaluation
            .diagnostics
            .into_iter()
            .map(|d| DiagnosticReport {
                animator_id: d.animator_id,
                based_on: d.unit.kind,
                unit: d.unit.index,
                error: d.error.to_string(),
            })
            .collect();
        Self {
            frame,
            time,
            glyphs: evaluation.glyphs,
            diagnostics,
        }
    }
}

/// Resolves the requested frame and time against a frame rate.
fn frame_and_time(frame: Option<i64>, time: Option<f64>, fps: f64) -> (i64, f64) {
    let to_time = |f: i64| if fps > 0.0 { f as f64 / fps } else { 0.0 };
    match (frame, time) {
        (_, Some(t)) => ((t * fps).floor() as i64, t),
        (Some(f), None) => (f, to_time(f)),
        (None, None) => (0, 0.0),
    }
}

fn cmd_eval(
    input: &Path,
    frame: Option<i64>,
    time: Option<f64>,
    fps: Option<f32>,
    pretty: bool,
    output: Option<&Path>,
) -> Result<()> {
    let mut document = load_document(input)?;
    if let Some(fps) = fps {
        document.frame_rate = fps;
    }
    let (frame, time) = frame_and_time(frame, time, document.frame_rate as f64);
    tracing::info!(frame, time, animators = document.animators.len(), "evaluating");

    let evaluation = LayerEvaluator::from_document(&document).evaluate(frame, time);
    let report = FrameReport::new(frame, time, evaluation);
    let json = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };

    match output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}

fn check_messages(document: &TextLayerDocument) -> Vec<String> {
    let evaluator = LayerEvaluator::from_document(document);
    let mut messages: Vec<String> = evaluator
        .config_diagnostics()
        .into_iter()
        .map(|(id, e)| format!("{id}: {e}"))
        .collect();
    messages.extend(
        evaluator
            .expression_errors()
            .into_iter()
            .map(|(id, e)| format!("{id}: expression {e}")),
    );
    messages
}

fn cmd_check(input: &Path, strict: bool) -> Result<()> {
    let document = load_document(input)?;
    let messages = check_messages(&document);

    if messages.is_empty() {
        println!("{}: {} animator(s), no problems", input.display(), document.animators.len());
        return Ok(());
    }
    for message in &messages {
        println!("  • {message}");
    }
    if strict {
        bail!("{} problem(s) found in {}", messages.len(), input.display());
    }
    Ok(())
}
