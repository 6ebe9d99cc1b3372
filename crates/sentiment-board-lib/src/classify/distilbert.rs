//! DistilBERT SST-2 sequence classifier on candle.
//!
//! Loads a `DistilBertForSequenceClassification` checkpoint (Hugging Face
//! layout: `config.json`, `model.safetensors`, `tokenizer.json`) and reproduces
//! the classification head on top of candle's DistilBERT encoder:
//! first-token hidden state → `pre_classifier` → ReLU → `classifier` → softmax.
//!
//! The checkpoint is resolved either from a local directory or through the
//! hub cache (`hf-hub`), mirroring how model snapshots are normally laid out on
//! disk.

use std::collections::BTreeMap;
use std::fmt::{self, Debug, Display};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use candle_core::{DType, Device, IndexOp, Tensor, D};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::distilbert::{Config as DistilBertConfig, DistilBertModel};
use hf_hub::{api::sync::Api, Repo, RepoType};
use serde::Deserialize;
use tokenizers::Tokenizer;

use super::{Classification, ClassifierConfig, ClassifierError, SentimentClassifier};
use crate::model::sentiment::SentimentLabel;

/// DistilBERT's position table size; used when `config.json` omits it.
const DEFAULT_MAX_POSITIONS: usize = 512;

fn default_max_positions() -> usize {
    DEFAULT_MAX_POSITIONS
}

/// The parts of `config.json` the classification head needs. Parsed from the
/// same file as candle's encoder config.
#[derive(Debug, Deserialize)]
struct HeadConfig {
    dim: usize,
    #[serde(default = "default_max_positions")]
    max_position_embeddings: usize,
    #[serde(default)]
    id2label: BTreeMap<String, String>,
}

impl HeadConfig {
    /// Labels ordered by class id. SST-2 checkpoints always carry `id2label`;
    /// the fallback follows the same NEGATIVE/POSITIVE order.
    fn labels(&self) -> Result<Vec<SentimentLabel>, ClassifierError> {
        if self.id2label.is_empty() {
            return Ok(vec![SentimentLabel::Negative, SentimentLabel::Positive]);
        }
        let mut indexed: Vec<(usize, SentimentLabel)> = Vec::with_capacity(self.id2label.len());
        for (id, name) in &self.id2label {
            let id = id.parse::<usize>().map_err(|_| {
                ClassifierError::ModelLoad(format!("non-numeric id2label key '{}'", id))
            })?;
            indexed.push((id, SentimentLabel::from_raw(name)));
        }
        indexed.sort_by_key(|(id, _)| *id);
        for (pos, (id, _)) in indexed.iter().enumerate() {
            if pos != *id {
                return Err(ClassifierError::UnknownClass(pos));
            }
        }
        Ok(indexed.into_iter().map(|(_, label)| label).collect())
    }
}

/// Paths of the three files a checkpoint consists of.
#[derive(Debug, Clone)]
struct ModelFiles {
    config: PathBuf,
    weights: PathBuf,
    tokenizer: PathBuf,
}

impl ModelFiles {
    fn from_dir(dir: &Path) -> Result<Self, ClassifierError> {
        let files = ModelFiles {
            config: dir.join("config.json"),
            weights: dir.join("model.safetensors"),
            tokenizer: dir.join("tokenizer.json"),
        };
        for path in [&files.config, &files.weights, &files.tokenizer] {
            if !path.is_file() {
                return Err(ClassifierError::ModelLoad(format!(
                    "missing model file {}",
                    path.display()
                )));
            }
        }
        Ok(files)
    }

    fn from_hub(config: &ClassifierConfig) -> Result<Self, ClassifierError> {
        let api = Api::new().map_err(|e| load_err("failed to initialise hub client", e))?;
        let repo = api.repo(Repo::with_revision(
            config.model_id.clone(),
            RepoType::Model,
            config.revision.clone(),
        ));

        tracing::info!(model_id = %config.model_id, revision = %config.revision, "fetching model files");
        let config_path = repo
            .get("config.json")
            .map_err(|e| load_err("failed to download config.json", e))?;
        let weights = repo
            .get("model.safetensors")
            .map_err(|e| load_err("failed to download model.safetensors", e))?;
        let tokenizer = match repo.get("tokenizer.json") {
            Ok(path) => path,
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    fallback = %config.tokenizer_fallback,
                    "model repo has no tokenizer.json; using fallback repo"
                );
                api.model(config.tokenizer_fallback.clone())
                    .get("tokenizer.json")
                    .map_err(|e| load_err("failed to download fallback tokenizer.json", e))?
            }
        };

        Ok(ModelFiles {
            config: config_path,
            weights,
            tokenizer,
        })
    }
}

fn load_err(context: &str, err: impl Display) -> ClassifierError {
    ClassifierError::ModelLoad(format!("{}: {}", context, err))
}

impl From<candle_core::Error> for ClassifierError {
    fn from(err: candle_core::Error) -> Self {
        ClassifierError::Inference(err.to_string())
    }
}

/// Pretrained DistilBERT sentiment classifier.
pub struct DistilBertClassifier {
    encoder: DistilBertModel,
    pre_classifier: Linear,
    classifier: Linear,
    tokenizer: Tokenizer,
    labels: Vec<SentimentLabel>,
    max_len: usize,
    device: Device,
}

impl Debug for DistilBertClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DistilBertClassifier")
            .field("labels", &self.labels)
            .field("max_len", &self.max_len)
            .field("device", &self.device)
            .finish()
    }
}

impl DistilBertClassifier {
    /// Resolve the checkpoint files and build the model on CPU.
    pub fn load(config: &ClassifierConfig) -> Result<Self, ClassifierError> {
        let start = Instant::now();
        let files = match &config.model_dir {
            Some(dir) => {
                tracing::info!(dir = %dir.display(), "loading model from local directory");
                ModelFiles::from_dir(dir)?
            }
            None => ModelFiles::from_hub(config)?,
        };

        let device = Device::Cpu;
        let raw_config =
            fs::read_to_string(&files.config).map_err(|e| load_err("failed to read config.json", e))?;
        let encoder_config: DistilBertConfig = serde_json::from_str(&raw_config)
            .map_err(|e| load_err("failed to parse encoder config", e))?;
        let head: HeadConfig = serde_json::from_str(&raw_config)
            .map_err(|e| load_err("failed to parse head config", e))?;
        let labels = head.labels()?;

        let tokenizer = Tokenizer::from_file(&files.tokenizer)
            .map_err(|e| load_err("failed to load tokenizer", e))?;

        // SAFETY: the safetensors file is memory-mapped read-only and is not
        // modified while the process runs.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[files.weights.clone()], DType::F32, &device)
                .map_err(|e| load_err("failed to map weights", e))?
        };
        let encoder = DistilBertModel::load(vb.pp("distilbert"), &encoder_config)
            .map_err(|e| load_err("failed to build encoder", e))?;
        let pre_classifier = candle_nn::linear(head.dim, head.dim, vb.pp("pre_classifier"))
            .map_err(|e| load_err("failed to build pre_classifier", e))?;
        let classifier = candle_nn::linear(head.dim, labels.len(), vb.pp("classifier"))
            .map_err(|e| load_err("failed to build classifier", e))?;

        tracing::info!(
            labels = ?labels,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "DistilBERT classifier loaded"
        );

        Ok(Self {
            encoder,
            pre_classifier,
            classifier,
            tokenizer,
            labels,
            max_len: head.max_position_embeddings,
            device,
        })
    }

    fn encode(&self, text: &str) -> Result<Vec<u32>, ClassifierError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| ClassifierError::Tokenization(e.to_string()))?;
        Ok(truncate_ids(encoding.get_ids().to_vec(), self.max_len))
    }

    fn class_probabilities(&self, ids: &[u32]) -> Result<Vec<f32>, ClassifierError> {
        let len = ids.len();
        let input_ids = Tensor::new(ids, &self.device)?.unsqueeze(0)?;
        // Single unpadded sequence: nothing is masked.
        let mask = Tensor::zeros((len, len), DType::U8, &self.device)?;
        let hidden = self.encoder.forward(&input_ids, &mask)?;
        let first_token = hidden.i((.., 0, ..))?;
        let pooled = self.pre_classifier.forward(&first_token)?.relu()?;
        let logits = self.classifier.forward(&pooled)?;
        let probs = candle_nn::ops::softmax(&logits, D::Minus1)?
            .squeeze(0)?
            .to_vec1::<f32>()?;
        Ok(probs)
    }
}

/// Clip to `max_len` tokens while keeping the trailing `[SEP]`.
fn truncate_ids(mut ids: Vec<u32>, max_len: usize) -> Vec<u32> {
    if ids.len() > max_len && max_len > 0 {
        let last = ids[ids.len() - 1];
        ids.truncate(max_len - 1);
        ids.push(last);
    }
    ids
}

impl SentimentClassifier for DistilBertClassifier {
    fn classify(&self, text: &str) -> Result<Classification, ClassifierError> {
        let ids = self.encode(text)?;
        let probs = self.class_probabilities(&ids)?;
        let (best, score) = probs
            .iter()
            .copied()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .ok_or_else(|| ClassifierError::Inference("model returned no logits".to_string()))?;
        let label = self
            .labels
            .get(best)
            .cloned()
            .ok_or(ClassifierError::UnknownClass(best))?;
        tracing::debug!(tokens = ids.len(), label = %label, score, "DistilBERT classification");
        Ok(Classification { label, score })
    }

    fn name(&self) -> &str {
        "distilbert"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_head_config_reads_sst2_labels() {
        let raw = r#"{
            "activation": "gelu", "dim": 768, "n_layers": 6, "n_heads": 12,
            "hidden_dim": 3072, "max_position_embeddings": 512,
            "id2label": {"0": "NEGATIVE", "1": "POSITIVE"},
            "label2id": {"NEGATIVE": 0, "POSITIVE": 1}
        }"#;
        let head: HeadConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(head.dim, 768);
        assert_eq!(
            head.labels().unwrap(),
            vec![SentimentLabel::Negative, SentimentLabel::Positive]
        );
    }

    #[test]
    fn test_head_config_rejects_gapped_ids() {
        let head = HeadConfig {
            dim: 4,
            max_position_embeddings: 8,
            id2label: [("0".to_string(), "NEGATIVE".to_string()), ("2".to_string(), "POSITIVE".to_string())]
                .into_iter()
                .collect(),
        };
        assert!(matches!(head.labels(), Err(ClassifierError::UnknownClass(1))));
    }

    #[test]
    fn test_truncation_keeps_separator() {
        let ids = vec![101, 1, 2, 3, 4, 5, 102];
        assert_eq!(truncate_ids(ids.clone(), 4), vec![101, 1, 2, 102]);
        assert_eq!(truncate_ids(ids.clone(), 16), ids);
    }

    #[test]
    fn test_missing_local_files_are_reported() {
        let dir = std::env::temp_dir().join("sentiment_board_no_model_here");
        let err = ModelFiles::from_dir(&dir).unwrap_err();
        assert!(err.to_string().contains("config.json"));
    }
}
