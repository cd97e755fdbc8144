// ============================================================
// Layer 3: QaPair and AnswerSpan
// ============================================================
// Extractive Q&A in domain terms:
//   - a question
//   - a context passage that should contain the answer
//   - the answer is a SPAN of tokens inside the encoded input
//
// The model never generates text. It scores every token as a
// possible start and a possible end, and the span between the
// two winners is read back out of the token sequence.
//
// Example:
//   Question: "Where does the hobbit live?"
//   Context:  "The hobbit lives in a hole in the ground"
//   Answer:   the context tokens "in a hole in the ground"

use serde::{Deserialize, Serialize};

/// One question asked against one context passage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
    /// The natural language question being asked
    pub question: String,

    /// The passage the answer is extracted from
    pub context: String,
}

impl QaPair {
    pub fn new(question: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            context:  context.into(),
        }
    }

    /// The single-sentence wrapper handed to the tokenizer:
    /// `{"question": "<question>", "context": "<context>"}`
    ///
    /// The BERT SQuAD export was fed inputs in this shape, so the
    /// text is embedded verbatim with no escaping.
    pub fn to_sentence(&self) -> String {
        format!(
            "{{\"question\": \"{}\", \"context\": \"{}\"}}",
            self.question, self.context
        )
    }
}

/// An inclusive `[start, end]` range of token indices.
///
/// A span with `end < start` is degenerate: the start and end
/// predictions disagree and the answer is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSpan {
    /// Index of the FIRST answer token
    pub start: usize,

    /// Index of the LAST answer token (inclusive)
    pub end: usize,
}

impl AnswerSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn is_degenerate(&self) -> bool {
        self.end < self.start
    }

    /// Number of tokens covered; zero for a degenerate span.
    pub fn span_length(&self) -> usize {
        if self.is_degenerate() {
            0
        } else {
            self.end - self.start + 1
        }
    }

    /// Keep at most `max_tokens` tokens, counted from the start.
    pub fn truncated(self, max_tokens: usize) -> Self {
        if max_tokens == 0 || self.span_length() <= max_tokens {
            return self;
        }
        Self {
            start: self.start,
            end:   self.start + max_tokens - 1,
        }
    }
}
