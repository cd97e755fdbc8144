// ============================================================
// Layer 3: Core Traits (Abstractions)
// ============================================================
// The pipeline talks to its two outside collaborators through
// these traits:
//
//   TokenizerAdapter → BertTokenizer (tokenizers crate)
//   ArtifactSource   → HttpSource    (reqwest streaming GET)
//
// The numeric engine has its own trait pair in ml::engine
// because its inputs are tensors.
//
// Tests swap in in-memory fakes for all of them.

use std::path::Path;

use async_trait::async_trait;

use crate::domain::cancel::CancelToken;
use crate::domain::error::QaResult;
use crate::domain::tokens::{EncodedToken, Token};

// ─── TokenizerAdapter ─────────────────────────────────────────────────────────
/// Subword tokenisation, vocabulary lookup and detokenisation.
pub trait TokenizerAdapter: Send + Sync {
    /// Split `text` into ordered subword tokens, special tokens included.
    fn tokenize(&self, text: &str) -> QaResult<Vec<Token>>;

    /// Encode `text` into exactly `count` model positions,
    /// padding with zeros or truncating as needed.
    fn encode(&self, count: usize, text: &str) -> QaResult<Vec<EncodedToken>>;

    /// Vocabulary text for a token id.
    fn id_to_token(&self, id: i64) -> QaResult<String>;

    /// Reassemble subword texts into word fragments.
    fn untokenize(&self, tokens: &[String]) -> Vec<String>;
}

// ─── ArtifactSource ───────────────────────────────────────────────────────────
/// A remote location a model artifact can be streamed from.
#[async_trait]
pub trait ArtifactSource: Send + Sync {
    /// Human-readable location, used in logs.
    fn location(&self) -> &str;

    /// Stream the artifact into `dest`, creating or truncating it.
    /// Returns the number of bytes written.
    ///
    /// Transport failures must be reported as `QaError::Download`
    /// so callers can retry them; `cancel` is checked between chunks.
    async fn fetch_into(&self, dest: &Path, cancel: &CancelToken) -> QaResult<u64>;
}
