// ============================================================
// Layer 2: QA Pipeline (orchestrator)
// ============================================================
// The only component callers talk to. Construction starts the
// model acquisition in a background task and returns at once;
// questions can be asked immediately.
//
// Per question:
//
//   Step 1: clean question/context, build the sentence wrapper
//   Step 2: tokenize
//   Step 3: encode, sized to the token count
//   Step 4: build the three [1, N] tensors
//   Step 5: cancelled?                      → Err(Cancelled)
//   Step 6: await the shared acquisition    (suspends this task)
//   Step 7: cancelled?                      → Err(Cancelled)
//   Step 8: run under the session lock      (blocking pool)
//   Step 9: extract the span, reassemble the answer
//
// Steps 1–7 run fully in parallel across questions; only step 8
// is serialised.
//
// Lifecycle:
//
//   Constructed → Acquiring → Ready
//                           ↘ Failed   (cancelled or fatal load)

use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;

use crate::data::preprocessor::Preprocessor;
use crate::data::tensor::ModelInputs;
use crate::domain::cancel::CancelToken;
use crate::domain::error::{QaError, QaResult};
use crate::domain::qa_pair::QaPair;
use crate::domain::tokens::EncodedBatch;
use crate::domain::traits::TokenizerAdapter;
use crate::infra::acquisition::ModelAcquisition;
use crate::ml::extractor::AnswerExtractor;
use crate::ml::session::InferenceSession;

type SharedSession = Shared<BoxFuture<'static, QaResult<Arc<InferenceSession>>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Constructed,
    Acquiring,
    Ready,
    Failed,
}

pub struct QaPipeline {
    tokenizer:    Arc<dyn TokenizerAdapter>,
    preprocessor: Preprocessor,
    extractor:    AnswerExtractor,
    session:      SharedSession,
    state:        Arc<Mutex<PipelineState>>,
    cancel:       CancelToken,
}

impl QaPipeline {
    /// Spawn the acquisition and return immediately.
    ///
    /// Must be called from inside a Tokio runtime.
    pub fn new(
        tokenizer:   Arc<dyn TokenizerAdapter>,
        acquisition: ModelAcquisition,
        extractor:   AnswerExtractor,
        cancel:      CancelToken,
    ) -> Self {
        let state = Arc::new(Mutex::new(PipelineState::Constructed));

        let task_state  = Arc::clone(&state);
        let task_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            *task_state.lock() = PipelineState::Acquiring;
            let outcome = acquisition.acquire(task_cancel).await.map(Arc::new);
            *task_state.lock() = match &outcome {
                Ok(_) => PipelineState::Ready,
                Err(QaError::Cancelled) => {
                    tracing::warn!("Model acquisition cancelled");
                    PipelineState::Failed
                }
                Err(e) => {
                    tracing::error!("Model acquisition failed: {}", e);
                    PipelineState::Failed
                }
            };
            outcome
        });

        let session = async move {
            task.await
                .map_err(|e| QaError::ModelLoad(format!("acquisition task failed: {e}")))?
        }
        .boxed()
        .shared();

        Self {
            tokenizer,
            preprocessor: Preprocessor::new(),
            extractor,
            session,
            state,
            cancel,
        }
    }

    pub fn state(&self) -> PipelineState {
        *self.state.lock()
    }

    /// Wait for acquisition to finish without asking anything.
    pub async fn wait_ready(&self) -> QaResult<()> {
        self.cancel.check()?;
        self.session.clone().await?;
        Ok(())
    }

    /// Answer `question` from `context`.
    pub async fn answer_one_question(&self, context: &str, question: &str) -> QaResult<String> {
        // Steps 1–4: text → tensors
        let pair = QaPair::new(
            self.preprocessor.clean(question),
            self.preprocessor.clean(context),
        );
        let sentence = pair.to_sentence();
        let tokens   = self.tokenizer.tokenize(&sentence)?;
        let encoded  = self.tokenizer.encode(tokens.len(), &sentence)?;
        let inputs   = ModelInputs::from_batch(&EncodedBatch::from_encoded(&encoded));
        tracing::debug!("Question '{}' encoded to {} tokens", pair.question, inputs.seq_len());
        tracing::trace!("Tokens: {:?}", tokens.iter().map(|t| t.text.as_str()).collect::<Vec<_>>());

        // Steps 5–7: wait for the model
        self.cancel.check()?;
        let session = self.session.clone().await?;
        self.cancel.check()?;

        // Step 8: serialised run
        let logits = session.run_blocking(inputs).await?;

        // Step 9: span → text
        self.extractor.extract(&logits, &tokens, self.tokenizer.as_ref())
    }
}
