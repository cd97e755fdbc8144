// ============================================================
// Layer 1: CLI Commands and Arguments
// ============================================================
// Two subcommands, `ask` and `fetch`, sharing one group of
// model/config flags. Every flag is optional and overrides the
// value from --config (or the built-in default).
//
// Reference: Rust Book §12 (Building a CLI Program)

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::application::config::QaConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer one or more questions about a context passage
    Ask(AskArgs),

    /// Download (if needed) and verify the model, then exit
    Fetch(FetchArgs),
}

/// Where the model and tokenizer come from and how answers are cut.
#[derive(Args, Debug, Default)]
pub struct ModelArgs {
    /// JSON config file; flags below override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Local path of the ONNX model (download destination)
    #[arg(long)]
    pub model_path: Option<PathBuf>,

    /// URL the ONNX model is downloaded from
    #[arg(long)]
    pub model_url: Option<String>,

    /// Local path of tokenizer.json
    #[arg(long)]
    pub tokenizer_path: Option<PathBuf>,

    /// URL tokenizer.json is downloaded from when missing
    #[arg(long)]
    pub tokenizer_url: Option<String>,

    /// Seconds to wait between failed download attempts
    #[arg(long)]
    pub retry_delay_secs: Option<u64>,

    /// Longest answer, in tokens
    #[arg(long)]
    pub max_answer_tokens: Option<usize>,

    /// ONNX Runtime intra-op threads
    #[arg(long)]
    pub intra_threads: Option<usize>,

    /// Write the effective config to this path before running
    #[arg(long)]
    pub write_config: Option<PathBuf>,
}

impl ModelArgs {
    /// Defaults, then --config, then individual flags.
    pub fn resolve(&self) -> Result<QaConfig> {
        let mut cfg = match &self.config {
            Some(path) => QaConfig::load(path)?,
            None => QaConfig::default(),
        };

        if let Some(v) = &self.model_path        { cfg.model_path = v.clone(); }
        if let Some(v) = &self.model_url         { cfg.model_url = v.clone(); }
        if let Some(v) = &self.tokenizer_path    { cfg.tokenizer_path = v.clone(); }
        if let Some(v) = &self.tokenizer_url     { cfg.tokenizer_url = Some(v.clone()); }
        if let Some(v) = self.retry_delay_secs   { cfg.retry_delay_secs = v; }
        if let Some(v) = self.max_answer_tokens  { cfg.max_answer_tokens = Some(v); }
        if let Some(v) = self.intra_threads      { cfg.intra_threads = Some(v); }

        if let Some(path) = &self.write_config {
            cfg.save(path)?;
        }
        Ok(cfg)
    }
}

/// Arguments for the `ask` command
#[derive(Args, Debug)]
pub struct AskArgs {
    /// Context passage text
    #[arg(long, conflicts_with = "context_file", required_unless_present = "context_file")]
    pub context: Option<String>,

    /// Read the context passage from a file
    #[arg(long)]
    pub context_file: Option<PathBuf>,

    /// Question to answer; repeat for several questions
    #[arg(long = "question", short = 'q', required = true)]
    pub questions: Vec<String>,

    #[command(flatten)]
    pub model: ModelArgs,
}

impl AskArgs {
    pub fn context_text(&self) -> Result<String> {
        match (&self.context, &self.context_file) {
            (Some(text), _) => Ok(text.clone()),
            (None, Some(path)) => std::fs::read_to_string(path)
                .with_context(|| format!("Cannot read context from '{}'", path.display())),
            (None, None) => anyhow::bail!("either --context or --context-file is required"),
        }
    }
}

/// Arguments for the `fetch` command
#[derive(Args, Debug)]
pub struct FetchArgs {
    #[command(flatten)]
    pub model: ModelArgs,
}
