//! CLI for the sentiment comment board.
//!
//! Subcommands:
//!  - `serve`    : load the classifier once and serve the board over HTTP.
//!  - `classify` : label one or more texts with the configured backend.
//!
//! Usage examples:
//!  cargo run -p sentiment-board -- serve --port 8501
//!  cargo run -p sentiment-board -- serve --backend lexicon
//!  echo "I love this!" | cargo run -p sentiment-board -- classify --json
//!
//! Every `serve` option can also be set through a `SENTIMENT_BOARD_*`
//! environment variable; logging verbosity follows `RUST_LOG` (default `info`).

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use sentiment_board::{
    classify::{DEFAULT_MODEL_ID, DEFAULT_REVISION, DEFAULT_TOKENIZER_FALLBACK},
    load_classifier,
    render::DEFAULT_VIDEO_URL,
    ClassifierBackend, ClassifierConfig, PageSettings, SentimentClassifier,
};

mod server;

use crate::server::ServerConfig;

/// CLI entrypoint.
#[derive(Parser)]
#[command(
    name = "sentiment-board",
    about = "Sentiment Board: comment page with pretrained sentiment labels",
    version
)]
struct Cli {
    /// Subcommands
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the comment board over HTTP.
    Serve(ServeArgs),

    /// Classify texts given with --text or read line by line from stdin.
    Classify(ClassifyArgs),
}

/// Classifier selection shared by both subcommands.
#[derive(Args, Debug, Clone)]
struct ModelArgs {
    /// Classifier backend: model|lexicon.
    #[arg(long, env = "SENTIMENT_BOARD_BACKEND", default_value = "model")]
    backend: ClassifierBackend,

    /// Local directory with config.json, model.safetensors and tokenizer.json.
    /// When set, the model hub is not contacted.
    #[arg(long, env = "SENTIMENT_BOARD_MODEL_DIR", value_name = "PATH")]
    model_dir: Option<PathBuf>,

    /// Hub model id to download when --model-dir is not given.
    #[arg(long, env = "SENTIMENT_BOARD_MODEL_ID", default_value = DEFAULT_MODEL_ID)]
    model_id: String,

    /// Hub revision (branch, tag or commit).
    #[arg(long, env = "SENTIMENT_BOARD_REVISION", default_value = DEFAULT_REVISION)]
    revision: String,

    /// Hub repo providing tokenizer.json if the model repo has none.
    #[arg(
        long,
        env = "SENTIMENT_BOARD_TOKENIZER_FALLBACK",
        default_value = DEFAULT_TOKENIZER_FALLBACK
    )]
    tokenizer_fallback: String,
}

impl ModelArgs {
    fn to_config(&self) -> ClassifierConfig {
        ClassifierConfig {
            backend: self.backend,
            model_dir: self.model_dir.clone(),
            model_id: self.model_id.clone(),
            revision: self.revision.clone(),
            tokenizer_fallback: self.tokenizer_fallback.clone(),
        }
    }
}

/// Arguments for the `serve` subcommand.
#[derive(Args, Debug)]
struct ServeArgs {
    #[command(flatten)]
    model: ModelArgs,

    /// Address to bind.
    #[arg(long, env = "SENTIMENT_BOARD_BIND", default_value = "0.0.0.0")]
    bind: String,

    /// Port to listen on.
    #[arg(long, env = "SENTIMENT_BOARD_PORT", default_value_t = 8501)]
    port: u16,

    /// Video shown under the page title.
    #[arg(long, env = "SENTIMENT_BOARD_VIDEO_URL", default_value = DEFAULT_VIDEO_URL)]
    video_url: String,

    /// Seconds a session may stay idle before its comments are discarded.
    #[arg(long, env = "SENTIMENT_BOARD_SESSION_TTL_SECS", default_value_t = 1800)]
    session_ttl_secs: u64,

    /// Seconds between idle-session sweeps.
    #[arg(long, env = "SENTIMENT_BOARD_SWEEP_INTERVAL_SECS", default_value_t = 60)]
    sweep_interval_secs: u64,
}

/// Arguments for the `classify` subcommand.
#[derive(Args, Debug)]
struct ClassifyArgs {
    #[command(flatten)]
    model: ModelArgs,

    /// Text to classify. Repeatable; when omitted, stdin lines are used.
    #[arg(short, long)]
    text: Vec<String>,

    /// Output results as JSON to stdout.
    #[arg(long)]
    json: bool,
}

/// Application entry point.
fn main() -> Result<()> {
    // Default to info-level logs; override via RUST_LOG if needed. Logs go to
    // stderr so `classify --json` output stays parseable.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => run_serve(args),
        Commands::Classify(args) => run_classify(args),
    }
}

/// Load the classifier, showing a spinner on a terminal when enabled.
fn load_with_feedback(args: &ModelArgs) -> Result<Arc<dyn SentimentClassifier>> {
    let config = args.to_config();

    #[cfg(feature = "progress")]
    let spinner = {
        use indicatif::{ProgressBar, ProgressStyle};
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(format!("Loading {} classifier...", config.backend));
        bar.enable_steady_tick(Duration::from_millis(120));
        bar
    };

    let loaded = load_classifier(&config)
        .with_context(|| format!("loading {} classifier", config.backend));

    #[cfg(feature = "progress")]
    spinner.finish_and_clear();

    loaded
}

/// Run the `serve` subcommand.
///
/// The classifier is loaded before the runtime starts so a broken model setup
/// fails fast instead of on the first comment.
fn run_serve(args: ServeArgs) -> Result<()> {
    let classifier = load_with_feedback(&args.model)?;
    tracing::info!(backend = classifier.name(), "classifier ready");

    let config = ServerConfig {
        bind: args.bind,
        port: args.port,
        session_ttl: Duration::from_secs(args.session_ttl_secs.max(1)),
        sweep_interval: Duration::from_secs(args.sweep_interval_secs.max(1)),
        page: PageSettings {
            video_url: args.video_url,
            ..PageSettings::default()
        },
    };

    let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
    runtime.block_on(server::run(config, classifier))
}

/// Run the `classify` subcommand.
fn run_classify(args: ClassifyArgs) -> Result<()> {
    let texts: Vec<String> = if args.text.is_empty() {
        io::stdin()
            .lock()
            .lines()
            .collect::<io::Result<Vec<_>>>()
            .context("reading texts from stdin")?
    } else {
        args.text.clone()
    };
    if texts.is_empty() {
        return Err(anyhow::anyhow!("nothing to classify; pass --text or pipe lines on stdin"));
    }

    let classifier = load_with_feedback(&args.model)?;

    let mut results = Vec::with_capacity(texts.len());
    for text in &texts {
        let out = classifier
            .classify(text)
            .with_context(|| format!("classifying {:?}", text))?;
        results.push((text, out));
    }

    if args.json {
        let rows: Vec<serde_json::Value> = results
            .iter()
            .map(|(text, out)| {
                json!({
                    "text": text,
                    "label": out.label,
                    "score": out.score,
                })
            })
            .collect();
        let payload = json!({
            "backend": classifier.name(),
            "results": rows,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        for (text, out) in &results {
            println!("{:<8} {:.4}  {}", out.label.as_str(), out.score, text);
        }
    }
    Ok(())
}
