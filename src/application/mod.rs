// ============================================================
// Layer 2: Application / Use Cases
// ============================================================
// Coordinates the other layers:
//
//   config.rs        : QaConfig, JSON file + defaults
//   qa_pipeline.rs   : the per-question orchestrator and the
//                      model lifecycle
//   ask_use_case.rs  : builds a pipeline from a config with the
//                      production tokenizer, HTTP source and
//                      ONNX engine
//
// No printing here (that's Layer 1) and no runtime-specific
// model code (that's Layer 5).

pub mod config;

pub mod qa_pipeline;

pub mod ask_use_case;
