// ============================================================
// Layer 5: ML / Model Layer
// ============================================================
// All model-runtime code lives here. No other layer imports
// `ort` directly.
//
//   engine.rs    : EngineLoader / ModelEngine traits and the
//                  fixed input names of the graph
//   onnx.rs      : ONNX Runtime implementation of the traits
//   session.rs   : the single shared handle, one run at a time
//   extractor.rs : argmax span decoding and answer text
//
// Reference: Devlin et al. (2019) BERT

pub mod engine;

pub mod onnx;

pub mod session;

pub mod extractor;
