// ============================================================
// Layer 4: Data Pipeline
// ============================================================
// Everything between raw strings and model-ready tensors:
//
//   question + context
//       │
//       ▼
//   Preprocessor      → one clean line per field
//       │
//       ▼
//   QaPair::to_sentence → single-sentence wrapper
//       │
//       ▼
//   TokenizerAdapter  → tokens + encoded ids   (infra layer)
//       │
//       ▼
//   Tensor Builder    → three [1, N] tensors
//
// Reference: Rust Book §13 (Iterators and Closures)

/// Normalises question and context text
pub mod preprocessor;

/// Builds the [1, N] input tensors
pub mod tensor;
