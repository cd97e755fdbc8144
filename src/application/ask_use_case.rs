// ============================================================
// Layer 2: Ask Use Case
// ============================================================
// Wires the production collaborators into a QaPipeline:
//
//   Step 1: validate the config
//   Step 2: make sure the tokenizer file exists (download it
//           with the same retry loop if a URL is configured)
//   Step 3: load the tokenizer
//   Step 4: start the model acquisition (HTTP source + ONNX)
//
// Then answers any number of questions about one context.
// Each question runs on its own task, so tokenization and
// tensor building proceed in parallel; only the model run is
// serialised.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use futures_util::future::join_all;

use crate::application::config::QaConfig;
use crate::application::qa_pipeline::{PipelineState, QaPipeline};
use crate::domain::cancel::CancelToken;
use crate::domain::traits::ArtifactSource;
use crate::infra::acquisition::ModelAcquisition;
use crate::infra::downloader::{download_with_retry, HttpSource};
use crate::infra::tokenizer_store::BertTokenizer;
use crate::ml::engine::EngineLoader;
use crate::ml::extractor::AnswerExtractor;
use crate::ml::onnx::OnnxLoader;

pub struct AskUseCase {
    pipeline: Arc<QaPipeline>,
}

impl AskUseCase {
    pub async fn new(config: QaConfig, cancel: CancelToken) -> Result<Self> {
        config.validate()?;

        let tokenizer = load_tokenizer(&config, &cancel).await?;

        let source = HttpSource::new(config.model_url.clone())
            .context("Cannot build HTTP client for model download")?;
        let acquisition = ModelAcquisition::new(
            config.model_path.clone(),
            Arc::new(source) as Arc<dyn ArtifactSource>,
            Arc::new(OnnxLoader::new(config.intra_threads)) as Arc<dyn EngineLoader>,
            config.retry_delay(),
        );

        let pipeline = QaPipeline::new(
            Arc::new(tokenizer),
            acquisition,
            AnswerExtractor::new(config.max_answer_tokens),
            cancel,
        );
        Ok(Self::from_pipeline(pipeline))
    }

    pub fn from_pipeline(pipeline: QaPipeline) -> Self {
        Self { pipeline: Arc::new(pipeline) }
    }

    pub fn state(&self) -> PipelineState {
        self.pipeline.state()
    }

    /// Block until the model is downloaded and loaded.
    pub async fn wait_ready(&self) -> Result<()> {
        self.pipeline
            .wait_ready()
            .await
            .context("Model is not available")
    }

    /// Answer every question about `context` concurrently.
    /// Results come back in question order.
    pub async fn answer_all(&self, context: &str, questions: &[String]) -> Vec<Result<String>> {
        let context: Arc<str> = Arc::from(context);

        let tasks = questions.iter().cloned().map(|question| {
            let pipeline = Arc::clone(&self.pipeline);
            let context  = Arc::clone(&context);
            tokio::spawn(async move {
                pipeline
                    .answer_one_question(&context, &question)
                    .await
                    .with_context(|| format!("Cannot answer '{question}'"))
            })
        });

        join_all(tasks)
            .await
            .into_iter()
            .map(|joined| joined.context("Question task failed").and_then(|answer| answer))
            .collect()
    }
}

/// Load the tokenizer, fetching it first when it is missing.
async fn load_tokenizer(config: &QaConfig, cancel: &CancelToken) -> Result<BertTokenizer> {
    let path = &config.tokenizer_path;

    if !path.is_file() {
        let Some(url) = &config.tokenizer_url else {
            bail!(
                "Tokenizer '{}' not found and no tokenizer_url configured",
                path.display()
            );
        };
        tracing::info!("Tokenizer '{}' missing; downloading", path.display());
        let source = HttpSource::new(url.clone())?;
        download_with_retry(&source, path, config.retry_delay(), cancel)
            .await
            .with_context(|| format!("Cannot download tokenizer from '{url}'"))?;
    }

    Ok(BertTokenizer::from_file(path)?)
}
