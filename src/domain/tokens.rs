// ============================================================
// Layer 3: Token-Level Data
// ============================================================
// Transient values that flow through one question:
//
//   Token         (text, vocabulary id) from the tokenizer
//   EncodedToken  (input id, attention mask, token type id)
//   EncodedBatch  the three id columns split out of the
//                 encoded tokens, equal length by construction
//   LogitVectors  start/end scores, one per input position

use serde::{Deserialize, Serialize};

/// A subword token and its vocabulary index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub id:   i64,
}

impl Token {
    pub fn new(text: impl Into<String>, id: i64) -> Self {
        Self { text: text.into(), id }
    }
}

/// One position of the model input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedToken {
    pub input_id:       i64,
    pub attention_mask: i64,
    pub token_type_id:  i64,
}

/// Column-wise view of a sequence of encoded tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedBatch {
    pub input_ids:      Vec<i64>,
    pub attention_mask: Vec<i64>,
    pub token_type_ids: Vec<i64>,
}

impl EncodedBatch {
    pub fn from_encoded(encoded: &[EncodedToken]) -> Self {
        Self {
            input_ids:      encoded.iter().map(|t| t.input_id).collect(),
            attention_mask: encoded.iter().map(|t| t.attention_mask).collect(),
            token_type_ids: encoded.iter().map(|t| t.token_type_id).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.input_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input_ids.is_empty()
    }
}

/// Raw model scores for "answer starts here" / "answer ends here".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogitVectors {
    pub start: Vec<f32>,
    pub end:   Vec<f32>,
}

impl LogitVectors {
    pub fn new(start: Vec<f32>, end: Vec<f32>) -> Self {
        Self { start, end }
    }
}
