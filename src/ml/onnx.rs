// ============================================================
// Layer 5: ONNX Runtime Engine
// ============================================================
// Loads the BERT-large SQuAD export with the `ort` crate and
// runs it on three named [1, N] int64 inputs.
//
// Output order of the export:
//   first output → start logits, shape [1, N]
//   last output  → end logits,   shape [1, N]
//
// The output names are read from the session at load time so
// the ordering rule holds for any export of the graph.
//
// Reference: ort documentation (Session, inputs!, Tensor)

use std::fmt::Display;
use std::path::Path;

use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;

use crate::data::tensor::ModelInputs;
use crate::domain::error::{QaError, QaResult};
use crate::domain::tokens::LogitVectors;
use crate::ml::engine::{EngineLoader, ModelEngine, INPUT_IDS, INPUT_MASK, SEGMENT_IDS};

fn load_err(e: impl Display) -> QaError {
    QaError::ModelLoad(e.to_string())
}

fn run_err(e: impl Display) -> QaError {
    QaError::Inference(e.to_string())
}

/// Builds ONNX Runtime sessions from a model file.
#[derive(Debug, Clone, Default)]
pub struct OnnxLoader {
    /// Intra-op thread count; `None` keeps the runtime default
    intra_threads: Option<usize>,
}

impl OnnxLoader {
    pub fn new(intra_threads: Option<usize>) -> Self {
        Self { intra_threads }
    }
}

impl EngineLoader for OnnxLoader {
    fn load(&self, path: &Path) -> QaResult<Box<dyn ModelEngine>> {
        if !path.is_file() {
            return Err(QaError::ModelLoad(format!(
                "'{}' does not exist",
                path.display()
            )));
        }

        let mut builder = Session::builder()
            .map_err(load_err)?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(load_err)?;
        if let Some(n) = self.intra_threads {
            builder = builder.with_intra_threads(n).map_err(load_err)?;
        }
        let session = builder.commit_from_file(path).map_err(load_err)?;

        let start_output = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| QaError::ModelLoad("model has no outputs".into()))?;
        let end_output = session
            .outputs
            .last()
            .map(|o| o.name.clone())
            .ok_or_else(|| QaError::ModelLoad("model has no outputs".into()))?;

        tracing::info!(
            "Loaded ONNX model '{}' (outputs: start='{}', end='{}')",
            path.display(),
            start_output,
            end_output
        );

        Ok(Box::new(OnnxEngine {
            session,
            start_output,
            end_output,
        }))
    }
}

/// A committed ONNX Runtime session plus its output names.
pub struct OnnxEngine {
    session:      Session,
    start_output: String,
    end_output:   String,
}

impl ModelEngine for OnnxEngine {
    fn run(&mut self, inputs: ModelInputs) -> QaResult<LogitVectors> {
        let ModelInputs { input_ids, attention_mask, token_type_ids } = inputs;

        let input_ids      = Tensor::from_array(input_ids).map_err(run_err)?;
        let attention_mask = Tensor::from_array(attention_mask).map_err(run_err)?;
        let token_type_ids = Tensor::from_array(token_type_ids).map_err(run_err)?;

        let outputs = self
            .session
            .run(ort::inputs![
                INPUT_IDS => input_ids,
                INPUT_MASK => attention_mask,
                SEGMENT_IDS => token_type_ids
            ])
            .map_err(run_err)?;

        // [1, N] outputs flatten to N scores
        let (_, start) = outputs[self.start_output.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(run_err)?;
        let (_, end) = outputs[self.end_output.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(run_err)?;

        Ok(LogitVectors::new(start.to_vec(), end.to_vec()))
    }
}
