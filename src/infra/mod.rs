// ============================================================
// Layer 6: Infrastructure Layer
// ============================================================
// Filesystem, network and tokenizer plumbing:
//
//   tokenizer_store.rs : loads tokenizer.json and adapts it to
//                        the TokenizerAdapter trait
//
//   downloader.rs      : streaming HTTP source and the
//                        fixed-delay retry loop
//
//   acquisition.rs     : load-or-download-then-load for the
//                        model artifact
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling)

/// Tokenizer loading and WordPiece detokenisation
pub mod tokenizer_store;

/// Retrying artifact download
pub mod downloader;

/// Model artifact acquisition
pub mod acquisition;
