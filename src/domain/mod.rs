// ============================================================
// Layer 3: Domain Layer
// ============================================================
// Plain Rust structs, enums and traits that define the core
// concepts of the system.
//
// Rules for this layer:
//   - NO tensor or runtime types
//   - NO file I/O or network calls
//   - Only data types, errors and the collaborator traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// Question + context and the answer span
pub mod qa_pair;

// Tokens, encoded ids and logits
pub mod tokens;

// Cooperative cancellation flag
pub mod cancel;

// Error taxonomy shared by the lower layers
pub mod error;

// Tokenizer and artifact-source abstractions
pub mod traits;
