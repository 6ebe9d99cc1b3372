/*
Sentiment classification backends.

- `distilbert`: the pretrained DistilBERT SST-2 checkpoint run through candle.
  Compiled only with the `model` feature (on by default).
- `lexicon`: deterministic word-list classifier. Always compiled; used for
  development without model files and by tests that need stable labels.

Both sit behind the `SentimentClassifier` trait so callers (the comment service,
the web server, tests) never depend on a concrete backend. The classifier is
loaded once per process and shared behind an `Arc`.
*/

#[cfg(feature = "model")]
pub mod distilbert;
pub mod lexicon;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::model::sentiment::SentimentLabel;

/// Hugging Face id of the checkpoint the board was built around.
pub const DEFAULT_MODEL_ID: &str = "distilbert/distilbert-base-uncased-finetuned-sst-2-english";
/// Pinned snapshot revision of `DEFAULT_MODEL_ID`.
pub const DEFAULT_REVISION: &str = "714eb0fa89d2f80546fda750413ed43d93601a13";
/// Repository providing `tokenizer.json` when the checkpoint only ships `vocab.txt`.
pub const DEFAULT_TOKENIZER_FALLBACK: &str = "distilbert/distilbert-base-uncased";

/// Errors raised while loading or running a classifier.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("classifier backend '{0}' is not compiled into this build")]
    BackendUnavailable(String),

    #[error("failed to load model: {0}")]
    ModelLoad(String),

    #[error("tokenization failed: {0}")]
    Tokenization(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("model produced class id {0} with no label mapping")]
    UnknownClass(usize),
}

/// Raw classifier output: a label plus its confidence.
///
/// Only `label` is used by the board; `score` is surfaced by the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: SentimentLabel,
    pub score: f32,
}

/// Narrow interface over the black-box sentiment model.
///
/// Implementations must be deterministic for a given text within a process
/// lifetime and free of observable side effects.
pub trait SentimentClassifier: Send + Sync {
    /// Classify `text`. Empty text is passed through to the model untouched.
    fn classify(&self, text: &str) -> Result<Classification, ClassifierError>;

    /// Short backend name for logs.
    fn name(&self) -> &str;
}

/// Which backend `load_classifier` should construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierBackend {
    #[default]
    Model,
    Lexicon,
}

impl ClassifierBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassifierBackend::Model => "model",
            ClassifierBackend::Lexicon => "lexicon",
        }
    }
}

impl fmt::Display for ClassifierBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassifierBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "model" => Ok(ClassifierBackend::Model),
            "lexicon" => Ok(ClassifierBackend::Lexicon),
            other => Err(anyhow::anyhow!(
                "unsupported classifier backend '{}'; supported: model, lexicon",
                other
            )),
        }
    }
}

/// Where and how to load the classifier.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub backend: ClassifierBackend,
    /// Local directory holding `config.json`, `model.safetensors` and
    /// `tokenizer.json`. When set the hub is not contacted.
    pub model_dir: Option<PathBuf>,
    /// Hub model id used when `model_dir` is `None`.
    pub model_id: String,
    /// Hub revision (branch, tag or commit).
    pub revision: String,
    /// Hub repo to take `tokenizer.json` from if the model repo lacks one.
    pub tokenizer_fallback: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig {
            backend: ClassifierBackend::Model,
            model_dir: None,
            model_id: DEFAULT_MODEL_ID.to_string(),
            revision: DEFAULT_REVISION.to_string(),
            tokenizer_fallback: DEFAULT_TOKENIZER_FALLBACK.to_string(),
        }
    }
}

/// Construct the configured classifier. Called once at process start.
pub fn load_classifier(
    config: &ClassifierConfig,
) -> Result<Arc<dyn SentimentClassifier>, ClassifierError> {
    match config.backend {
        ClassifierBackend::Lexicon => {
            tracing::info!("using lexicon sentiment classifier");
            Ok(Arc::new(lexicon::LexiconClassifier::new()))
        }
        #[cfg(feature = "model")]
        ClassifierBackend::Model => {
            let classifier = distilbert::DistilBertClassifier::load(config)?;
            Ok(Arc::new(classifier))
        }
        #[cfg(not(feature = "model"))]
        ClassifierBackend::Model => Err(ClassifierError::BackendUnavailable(
            ClassifierBackend::Model.to_string(),
        )),
    }
}
