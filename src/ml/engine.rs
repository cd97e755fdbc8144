// ============================================================
// Layer 5: Engine Abstraction
// ============================================================
// The numeric engine is consumed through two traits:
//
//   EngineLoader::load(path) → a loaded model handle
//   ModelEngine::run(inputs) → start/end logits
//
// OnnxLoader / OnnxEngine implement them on ONNX Runtime.

use std::path::Path;

use crate::data::tensor::ModelInputs;
use crate::domain::error::QaResult;
use crate::domain::tokens::LogitVectors;

/// Input names expected by the BERT SQuAD ONNX graph.
pub const INPUT_IDS:   &str = "input_ids";
pub const INPUT_MASK:  &str = "input_mask";
pub const SEGMENT_IDS: &str = "segment_ids";

/// A loaded model. `run` takes `&mut self`: execution state is
/// not safe to share, and InferenceSession serialises access.
pub trait ModelEngine: Send {
    fn run(&mut self, inputs: ModelInputs) -> QaResult<LogitVectors>;
}

/// Opens a model artifact from disk.
pub trait EngineLoader: Send + Sync {
    /// Fails with `QaError::ModelLoad` if the file is missing or invalid.
    fn load(&self, path: &Path) -> QaResult<Box<dyn ModelEngine>>;
}
