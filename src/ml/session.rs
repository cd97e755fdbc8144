// ============================================================
// Layer 5: Inference Session
// ============================================================
// Owns the single loaded model handle for the lifetime of the
// pipeline and serialises every run against it.
//
//   run(input_ids, input_mask, segment_ids) → (start, end) logits
//
// The lock is held for the duration of one engine run only.
// Engine failures surface as QaError::Inference; nothing here
// retries.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::data::tensor::ModelInputs;
use crate::domain::error::{QaError, QaResult};
use crate::domain::tokens::LogitVectors;
use crate::ml::engine::ModelEngine;

pub struct InferenceSession {
    engine: Mutex<Box<dyn ModelEngine>>,
}

impl InferenceSession {
    pub fn new(engine: Box<dyn ModelEngine>) -> Self {
        Self { engine: Mutex::new(engine) }
    }

    /// Run the model on one request. Blocks the calling thread.
    pub fn run(&self, inputs: ModelInputs) -> QaResult<LogitVectors> {
        let seq_len = inputs.seq_len();

        let logits = {
            let mut engine = self.engine.lock();
            engine.run(inputs)?
        };

        if logits.start.len() != logits.end.len() {
            return Err(QaError::Inference(format!(
                "start/end logits differ in length ({} vs {})",
                logits.start.len(),
                logits.end.len()
            )));
        }
        tracing::debug!("Inference over {} tokens produced {} logits", seq_len, logits.start.len());
        Ok(logits)
    }

    /// `run` on the blocking thread pool, so async callers only
    /// suspend while they wait for the lock and the engine.
    pub async fn run_blocking(self: Arc<Self>, inputs: ModelInputs) -> QaResult<LogitVectors> {
        tokio::task::spawn_blocking(move || self.run(inputs))
            .await
            .map_err(|e| QaError::Inference(format!("inference task failed: {e}")))?
    }
}
