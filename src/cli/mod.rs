// ============================================================
// Layer 1: CLI / Presentation Layer
// ============================================================
// Parses arguments with `clap` and hands off to Layer 2.
//
//   1. `ask`   : answers questions about a context passage
//   2. `fetch` : prepares the model without asking anything
//
// Ctrl-C fires the shared cancellation token: downloads stop
// retrying and unanswered questions fail with "cancelled".
//
// Reference: Rust Book §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{AskArgs, Commands, FetchArgs};

use crate::application::ask_use_case::AskUseCase;
use crate::domain::cancel::CancelToken;

#[derive(Parser, Debug)]
#[command(
    name = "bert-qa",
    version,
    about = "Answer questions about a passage with a BERT SQuAD ONNX model."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let cancel = CancelToken::new();
        cancel_on_interrupt(cancel.clone());

        match self.command {
            Commands::Ask(args)   => run_ask(args, cancel).await,
            Commands::Fetch(args) => run_fetch(args, cancel).await,
        }
    }
}

fn cancel_on_interrupt(cancel: CancelToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received; cancelling");
            cancel.cancel();
        }
    });
}

async fn run_ask(args: AskArgs, cancel: CancelToken) -> Result<()> {
    let context  = args.context_text()?;
    let config   = args.model.resolve()?;
    let use_case = AskUseCase::new(config, cancel).await?;

    let answers = use_case.answer_all(&context, &args.questions).await;

    let mut failures = 0usize;
    for (question, answer) in args.questions.iter().zip(answers) {
        match answer {
            Ok(text) => println!("Q: {question}\nA: {text}\n"),
            Err(e) => {
                failures += 1;
                eprintln!("Q: {question}\nerror: {e:#}\n");
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {} questions failed", args.questions.len());
    }
    Ok(())
}

async fn run_fetch(args: FetchArgs, cancel: CancelToken) -> Result<()> {
    let config   = args.model.resolve()?;
    let path     = config.model_path.clone();
    let use_case = AskUseCase::new(config, cancel).await?;

    use_case.wait_ready().await?;
    tracing::debug!("Pipeline state: {:?}", use_case.state());
    println!("Model ready at '{}'", path.display());
    Ok(())
}
