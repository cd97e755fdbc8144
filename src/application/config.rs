// ============================================================
// Layer 2: Configuration
// ============================================================
// Everything the pipeline needs to locate, fetch and run the
// model. Defaults reproduce the stock setup:
//
//   model      : BERT-large uncased, whole word masking,
//                fine-tuned on SQuAD, ONNX export
//   tokenizer  : the matching HuggingFace tokenizer.json
//   backoff    : 5 seconds between download attempts
//
// The struct is serde-serialisable so it can live in a JSON
// file (--config) and be overridden by CLI flags. Missing
// fields fall back to their defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::error::{QaError, QaResult};
use crate::infra::downloader::DEFAULT_RETRY_DELAY;
use crate::ml::extractor::DEFAULT_MAX_ANSWER_TOKENS;

pub const DEFAULT_MODEL_URL: &str =
    "https://storage.yandexcloud.net/dotnet4/bert-large-uncased-whole-word-masking-finetuned-squad.onnx";
pub const DEFAULT_MODEL_PATH: &str = "bert-large-uncased-whole-word-masking-finetuned-squad.onnx";
pub const DEFAULT_TOKENIZER_URL: &str =
    "https://huggingface.co/bert-large-uncased-whole-word-masking-finetuned-squad/resolve/main/tokenizer.json";
pub const DEFAULT_TOKENIZER_PATH: &str = "bert-large-uncased-whole-word-masking-finetuned-squad.tokenizer.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QaConfig {
    pub model_url:         String,
    pub model_path:        PathBuf,
    pub tokenizer_url:     Option<String>,
    pub tokenizer_path:    PathBuf,
    pub retry_delay_secs:  u64,
    pub max_answer_tokens: Option<usize>,
    pub intra_threads:     Option<usize>,
}

impl Default for QaConfig {
    fn default() -> Self {
        Self {
            model_url:         DEFAULT_MODEL_URL.to_string(),
            model_path:        PathBuf::from(DEFAULT_MODEL_PATH),
            tokenizer_url:     Some(DEFAULT_TOKENIZER_URL.to_string()),
            tokenizer_path:    PathBuf::from(DEFAULT_TOKENIZER_PATH),
            retry_delay_secs:  DEFAULT_RETRY_DELAY.as_secs(),
            max_answer_tokens: Some(DEFAULT_MAX_ANSWER_TOKENS),
            intra_threads:     None,
        }
    }
}

impl QaConfig {
    /// Read a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read config from '{}'", path.display()))?;
        let cfg: Self = serde_json::from_str(&json)
            .with_context(|| format!("Invalid config JSON in '{}'", path.display()))?;
        tracing::debug!("Loaded config from '{}'", path.display());
        Ok(cfg)
    }

    /// Write this config as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved config to '{}'", path.display());
        Ok(())
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> QaResult<()> {
        let invalid = |msg: &str| Err(QaError::Config(msg.to_string()));

        if self.model_url.trim().is_empty() {
            return invalid("model_url must not be empty");
        }
        if self.model_path.as_os_str().is_empty() {
            return invalid("model_path must not be empty");
        }
        if self.tokenizer_path.as_os_str().is_empty() {
            return invalid("tokenizer_path must not be empty");
        }
        if matches!(&self.tokenizer_url, Some(url) if url.trim().is_empty()) {
            return invalid("tokenizer_url must not be empty when set");
        }
        if self.max_answer_tokens == Some(0) {
            return invalid("max_answer_tokens must be at least 1");
        }
        if self.intra_threads == Some(0) {
            return invalid("intra_threads must be at least 1");
        }
        Ok(())
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}
