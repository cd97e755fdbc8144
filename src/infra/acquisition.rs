// ============================================================
// Layer 6: Model Acquisition
// ============================================================
// Produces the one InferenceSession of a pipeline:
//
//   Step 1: load the artifact from the local path
//   Step 2: if that fails for any reason, download it from the
//           remote source into the same path (retrying, see
//           downloader.rs)
//   Step 3: load again; a failure now is fatal (ModelLoad)
//
// Loading is CPU-heavy and synchronous, so it runs on the
// blocking thread pool.
//
// Reference: ort documentation (Session::builder)

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::cancel::CancelToken;
use crate::domain::error::{QaError, QaResult};
use crate::domain::traits::ArtifactSource;
use crate::infra::downloader::download_with_retry;
use crate::ml::engine::{EngineLoader, ModelEngine};
use crate::ml::session::InferenceSession;

pub struct ModelAcquisition {
    model_path:  PathBuf,
    source:      Arc<dyn ArtifactSource>,
    loader:      Arc<dyn EngineLoader>,
    retry_delay: Duration,
}

impl ModelAcquisition {
    pub fn new(
        model_path:  impl Into<PathBuf>,
        source:      Arc<dyn ArtifactSource>,
        loader:      Arc<dyn EngineLoader>,
        retry_delay: Duration,
    ) -> Self {
        Self {
            model_path: model_path.into(),
            source,
            loader,
            retry_delay,
        }
    }

    /// Run the whole acquisition. Resolves to the session, or to
    /// `Cancelled` / `ModelLoad` / `Io`.
    pub async fn acquire(self, cancel: CancelToken) -> QaResult<InferenceSession> {
        match self.load().await {
            Ok(engine) => {
                tracing::info!("Model ready from local copy '{}'", self.model_path.display());
                return Ok(InferenceSession::new(engine));
            }
            Err(reason) => {
                tracing::info!(
                    "Local model '{}' not usable ({}); fetching a fresh copy",
                    self.model_path.display(),
                    reason
                );
            }
        }

        cancel.check()?;
        download_with_retry(self.source.as_ref(), &self.model_path, self.retry_delay, &cancel).await?;

        let engine = self.load().await?;
        tracing::info!("Model ready from downloaded copy '{}'", self.model_path.display());
        Ok(InferenceSession::new(engine))
    }

    async fn load(&self) -> QaResult<Box<dyn ModelEngine>> {
        let loader = Arc::clone(&self.loader);
        let path   = self.model_path.clone();
        tokio::task::spawn_blocking(move || loader.load(&path))
            .await
            .map_err(|e| QaError::ModelLoad(format!("load task failed: {e}")))?
    }
}
