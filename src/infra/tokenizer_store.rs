// ============================================================
// Layer 6: Tokenizer Store
// ============================================================
// Loads the BERT WordPiece tokenizer (HuggingFace
// tokenizer.json) and exposes it through TokenizerAdapter.
//
//   tokenize     → encoding tokens + ids, [CLS]/[SEP] included
//   encode       → (input id, attention mask, type id) per
//                  position, padded or cut to the requested count
//   id_to_token  → vocabulary lookup
//   untokenize   → "##" continuations merged onto the previous
//                  fragment, special tokens dropped
//
// Inputs longer than the model's 512 positions are truncated
// by the tokenizer itself.
//
// Reference: Wu et al. (2016) WordPiece
//            tokenizers crate documentation

use std::path::Path;

use tokenizers::{Encoding, Tokenizer, TruncationParams};

use crate::domain::error::{QaError, QaResult};
use crate::domain::tokens::{EncodedToken, Token};
use crate::domain::traits::TokenizerAdapter;

/// Longest input the BERT-large SQuAD export accepts.
pub const MAX_SEQ_LEN: usize = 512;

const SPECIAL_TOKENS: [&str; 3] = ["[CLS]", "[SEP]", "[PAD]"];

/// Merge WordPiece continuations (`##xyz`) onto the preceding
/// fragment and drop special tokens.
///
/// `["the", "hob", "##bit", "[SEP]"]` → `["the", "hobbit"]`
pub fn merge_word_pieces(tokens: &[String]) -> Vec<String> {
    let mut words: Vec<String> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if SPECIAL_TOKENS.contains(&token.as_str()) {
            continue;
        }
        match (token.strip_prefix("##"), words.last_mut()) {
            (Some(rest), Some(last)) => last.push_str(rest),
            (Some(rest), None)       => words.push(rest.to_string()),
            (None, _)                => words.push(token.clone()),
        }
    }
    words
}

pub struct BertTokenizer {
    inner: Tokenizer,
}

impl BertTokenizer {
    /// Load a tokenizer.json from disk and cap it at MAX_SEQ_LEN.
    pub fn from_file(path: &Path) -> QaResult<Self> {
        let inner = Tokenizer::from_file(path).map_err(|e| {
            QaError::Tokenizer(format!(
                "Cannot load tokenizer from '{}': {}",
                path.display(),
                e
            ))
        })?;
        tracing::info!("Loaded tokenizer from '{}'", path.display());
        Self::from_tokenizer(inner)
    }

    pub fn from_tokenizer(mut inner: Tokenizer) -> QaResult<Self> {
        inner
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQ_LEN,
                ..Default::default()
            }))
            .map_err(|e| QaError::Tokenizer(e.to_string()))?;
        inner.with_padding(None);
        Ok(Self { inner })
    }

    fn encoding(&self, text: &str) -> QaResult<Encoding> {
        self.inner
            .encode(text, true)
            .map_err(|e| QaError::Tokenizer(format!("Cannot tokenize input: {e}")))
    }
}

impl TokenizerAdapter for BertTokenizer {
    fn tokenize(&self, text: &str) -> QaResult<Vec<Token>> {
        let encoding = self.encoding(text)?;
        Ok(encoding
            .get_tokens()
            .iter()
            .zip(encoding.get_ids())
            .map(|(text, &id)| Token::new(text.clone(), i64::from(id)))
            .collect())
    }

    fn encode(&self, count: usize, text: &str) -> QaResult<Vec<EncodedToken>> {
        let encoding = self.encoding(text)?;
        let ids      = encoding.get_ids();
        let mask     = encoding.get_attention_mask();
        let types    = encoding.get_type_ids();

        Ok((0..count)
            .map(|i| EncodedToken {
                input_id:       ids.get(i).copied().map(i64::from).unwrap_or(0),
                attention_mask: mask.get(i).copied().map(i64::from).unwrap_or(0),
                token_type_id:  types.get(i).copied().map(i64::from).unwrap_or(0),
            })
            .collect())
    }

    fn id_to_token(&self, id: i64) -> QaResult<String> {
        u32::try_from(id)
            .ok()
            .and_then(|id| self.inner.id_to_token(id))
            .ok_or_else(|| QaError::Tokenizer(format!("unknown token id {id}")))
    }

    fn untokenize(&self, tokens: &[String]) -> Vec<String> {
        merge_word_pieces(tokens)
    }
}
