// ============================================================
// Layer 5: Answer Extractor
// ============================================================
// Turns the start/end logits of one run into answer text:
//
//   1. start = argmax(start logits)   (ties → lowest index)
//   2. end   = argmax(end logits)     (ties → lowest index)
//   3. tokens[start..=end] → vocabulary text via id_to_token
//   4. untokenize (merges word pieces) and join with spaces
//
// Span policies:
//   - end < start (degenerate)  → empty answer
//   - span longer than max_answer_tokens → cut after that many
//     tokens from the start
//   - logits shorter than the token list → argmax runs over the
//     common prefix only
//
// Reference: Devlin et al. (2019) BERT, §4.2 SQuAD span decoding

use crate::domain::error::QaResult;
use crate::domain::qa_pair::AnswerSpan;
use crate::domain::tokens::{LogitVectors, Token};
use crate::domain::traits::TokenizerAdapter;

/// Maximum answer length used when nothing is configured.
pub const DEFAULT_MAX_ANSWER_TOKENS: usize = 30;

/// Index of the first maximum. NaN scores never win.
pub fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerExtractor {
    max_answer_tokens: Option<usize>,
}

impl Default for AnswerExtractor {
    fn default() -> Self {
        Self::new(Some(DEFAULT_MAX_ANSWER_TOKENS))
    }
}

impl AnswerExtractor {
    /// `None` disables the answer length cap.
    pub fn new(max_answer_tokens: Option<usize>) -> Self {
        Self { max_answer_tokens }
    }

    /// Predicted span over the first `token_count` positions.
    /// `None` when there is nothing to choose from.
    pub fn span(&self, logits: &LogitVectors, token_count: usize) -> Option<AnswerSpan> {
        let n     = token_count.min(logits.start.len()).min(logits.end.len());
        let start = argmax(&logits.start[..n])?;
        let end   = argmax(&logits.end[..n])?;

        let span = AnswerSpan::new(start, end);
        Some(match self.max_answer_tokens {
            Some(max) => span.truncated(max),
            None => span,
        })
    }

    /// Full extraction: span → token texts → joined answer.
    pub fn extract(
        &self,
        logits:    &LogitVectors,
        tokens:    &[Token],
        tokenizer: &dyn TokenizerAdapter,
    ) -> QaResult<String> {
        let Some(span) = self.span(logits, tokens.len()) else {
            tracing::debug!("No scorable tokens; empty answer");
            return Ok(String::new());
        };
        if span.is_degenerate() {
            tracing::debug!("Degenerate span [{}, {}]; empty answer", span.start, span.end);
            return Ok(String::new());
        }

        let pieces = tokens[span.start..=span.end]
            .iter()
            .map(|t| tokenizer.id_to_token(t.id))
            .collect::<QaResult<Vec<String>>>()?;

        let answer = tokenizer.untokenize(&pieces).join(" ");
        tracing::debug!("Span [{},{}] answer='{}'", span.start, span.end, answer);
        Ok(answer)
    }
}
