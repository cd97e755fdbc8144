// ============================================================
// Test Fakes
// ============================================================
// In-memory stand-ins for the outside collaborators:
//
//   FakeTokenizer  : whitespace tokenizer over a fixed vocabulary
//   FakeEngine     : returns one-hot start/end logits
//   CountingLoader : "loads" files whose bytes equal MODEL_BYTES
//   FlakySource    : fails N times, then writes a payload
//   StubHttpServer : local HTTP/1.1 server with scripted replies
//   CapturedLogs   : tracing output collected into a buffer

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;

use crate::data::tensor::ModelInputs;
use crate::domain::cancel::CancelToken;
use crate::domain::error::{QaError, QaResult};
use crate::domain::tokens::{EncodedToken, LogitVectors, Token};
use crate::domain::traits::{ArtifactSource, TokenizerAdapter};
use crate::infra::tokenizer_store::merge_word_pieces;
use crate::ml::engine::{EngineLoader, ModelEngine};

/// Contents of a "valid" model file for CountingLoader.
pub const MODEL_BYTES: &[u8] = b"onnx-model";

// ─── FakeTokenizer ────────────────────────────────────────────────────────────
/// Id 0 is `[UNK]`; vocabulary words get ids 1, 2, 3, ...
/// Words are lowercased and stripped of characters other than
/// letters, digits and `#`.
pub struct FakeTokenizer {
    vocab:          Vec<String>,
    tokenize_delay: Duration,
    active:         AtomicUsize,
    max_active:     Arc<AtomicUsize>,
}

impl FakeTokenizer {
    pub fn new(words: &[&str]) -> Self {
        let mut vocab = vec!["[UNK]".to_string()];
        vocab.extend(words.iter().map(|w| w.to_string()));
        Self {
            vocab,
            tokenize_delay: Duration::ZERO,
            active:         AtomicUsize::new(0),
            max_active:     Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make every tokenize call block the calling thread this long.
    pub fn with_tokenize_delay_ms(mut self, ms: u64) -> Self {
        self.tokenize_delay = Duration::from_millis(ms);
        self
    }

    /// Highest number of tokenize calls observed running at once.
    pub fn max_concurrent_tokenize(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.max_active)
    }

    fn words(text: &str) -> Vec<String> {
        text.split_whitespace()
            .map(|w| {
                w.chars()
                    .filter(|c| c.is_alphanumeric() || *c == '#')
                    .collect::<String>()
                    .to_lowercase()
            })
            .filter(|w| !w.is_empty())
            .collect()
    }

    fn id_of(&self, word: &str) -> i64 {
        self.vocab.iter().position(|v| v == word).unwrap_or(0) as i64
    }
}

impl TokenizerAdapter for FakeTokenizer {
    fn tokenize(&self, text: &str) -> QaResult<Vec<Token>> {
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now_active, Ordering::SeqCst);
        if !self.tokenize_delay.is_zero() {
            std::thread::sleep(self.tokenize_delay);
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        Ok(Self::words(text)
            .into_iter()
            .map(|w| {
                let id = self.id_of(&w);
                Token::new(w, id)
            })
            .collect())
    }

    fn encode(&self, count: usize, text: &str) -> QaResult<Vec<EncodedToken>> {
        let ids: Vec<i64> = Self::words(text).iter().map(|w| self.id_of(w)).collect();
        Ok((0..count)
            .map(|i| EncodedToken {
                input_id:       ids.get(i).copied().unwrap_or(0),
                attention_mask: i64::from(i < ids.len()),
                token_type_id:  0,
            })
            .collect())
    }

    fn id_to_token(&self, id: i64) -> QaResult<String> {
        usize::try_from(id)
            .ok()
            .and_then(|i| self.vocab.get(i).cloned())
            .ok_or_else(|| QaError::Tokenizer(format!("unknown token id {id}")))
    }

    fn untokenize(&self, tokens: &[String]) -> Vec<String> {
        merge_word_pieces(tokens)
    }
}

// ─── FakeEngine ───────────────────────────────────────────────────────────────
pub struct FakeEngine {
    start:      usize,
    end:        usize,
    failure:    Option<String>,
    run_delay:  Duration,
    active:     Arc<AtomicUsize>,
    max_active: Arc<AtomicUsize>,
}

impl FakeEngine {
    /// Logits peak at `start` and `end` respectively.
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            failure:    None,
            run_delay:  Duration::ZERO,
            active:     Arc::new(AtomicUsize::new(0)),
            max_active: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(message: &str) -> Self {
        let mut engine = Self::new(0, 0);
        engine.failure = Some(message.to_string());
        engine
    }

    pub fn with_run_delay_ms(mut self, ms: u64) -> Self {
        self.run_delay = Duration::from_millis(ms);
        self
    }

    /// Highest number of runs observed executing at once.
    pub fn max_concurrent_runs(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.max_active)
    }
}

impl ModelEngine for FakeEngine {
    fn run(&mut self, inputs: ModelInputs) -> QaResult<LogitVectors> {
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now_active, Ordering::SeqCst);
        if !self.run_delay.is_zero() {
            std::thread::sleep(self.run_delay);
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        if let Some(message) = &self.failure {
            return Err(QaError::Inference(message.clone()));
        }

        let n = inputs.seq_len();
        let one_hot = |at: usize| (0..n).map(|i| if i == at { 1.0 } else { 0.0 }).collect();
        Ok(LogitVectors::new(one_hot(self.start), one_hot(self.end)))
    }
}

// ─── CountingLoader ───────────────────────────────────────────────────────────
pub struct CountingLoader {
    start:     usize,
    end:       usize,
    attempts:  AtomicUsize,
    successes: AtomicUsize,
}

impl CountingLoader {
    pub fn new() -> Self {
        Self::answering(0, 0)
    }

    /// Loaded engines answer with the span `[start, end]`.
    pub fn answering(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            attempts:  AtomicUsize::new(0),
            successes: AtomicUsize::new(0),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn successful_loads(&self) -> usize {
        self.successes.load(Ordering::SeqCst)
    }
}

impl EngineLoader for CountingLoader {
    fn load(&self, path: &Path) -> QaResult<Box<dyn ModelEngine>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let bytes = std::fs::read(path).map_err(|e| QaError::ModelLoad(e.to_string()))?;
        if bytes != MODEL_BYTES {
            return Err(QaError::ModelLoad("invalid model file".into()));
        }
        self.successes.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeEngine::new(self.start, self.end)))
    }
}

// ─── FlakySource ──────────────────────────────────────────────────────────────
pub struct FlakySource {
    payload:      Vec<u8>,
    failures:     AtomicUsize,
    fetches:      AtomicUsize,
    cancel_hook:  Option<CancelToken>,
    gate:         Option<Arc<Notify>>,
}

impl FlakySource {
    pub fn new(payload: &[u8]) -> Self {
        Self {
            payload:     payload.to_vec(),
            failures:    AtomicUsize::new(0),
            fetches:     AtomicUsize::new(0),
            cancel_hook: None,
            gate:        None,
        }
    }

    /// Fail the first `n` fetches with a transport error.
    pub fn failing_times(self, n: usize) -> Self {
        self.failures.store(n, Ordering::SeqCst);
        self
    }

    /// Fire `cancel` from inside every fetch.
    pub fn cancelling_on_fetch(mut self, cancel: CancelToken) -> Self {
        self.cancel_hook = Some(cancel);
        self
    }

    /// Hold every fetch until `gate` is notified.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArtifactSource for FlakySource {
    fn location(&self) -> &str {
        "memory://model.onnx"
    }

    async fn fetch_into(&self, dest: &Path, cancel: &CancelToken) -> QaResult<u64> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(hook) = &self.cancel_hook {
            hook.cancel();
        }
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let failed = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(QaError::Download("connection reset by peer".into()));
        }

        cancel.check()?;
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(dest, &self.payload).await?;
        Ok(self.payload.len() as u64)
    }
}

// ─── StubHttpServer ───────────────────────────────────────────────────────────
/// One scripted reply per accepted connection, in order.
pub enum StubReply {
    /// Full response, then the connection is closed.
    Complete { status: u16, reason: &'static str, body: Vec<u8> },
    /// `200 OK` announcing `declared` bytes, sends `sent`, then
    /// keeps the connection open without writing anything else.
    Stall { declared: usize, sent: Vec<u8> },
}

impl StubReply {
    pub fn ok(body: &[u8]) -> Self {
        StubReply::Complete { status: 200, reason: "OK", body: body.to_vec() }
    }

    pub fn status(status: u16, reason: &'static str) -> Self {
        StubReply::Complete { status, reason, body: b"error".to_vec() }
    }

    pub fn stall(declared: usize, sent: &[u8]) -> Self {
        StubReply::Stall { declared, sent: sent.to_vec() }
    }
}

pub struct StubHttpServer {
    url:      String,
    requests: Arc<AtomicUsize>,
}

impl StubHttpServer {
    pub async fn start(replies: Vec<StubReply>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr     = listener.local_addr().unwrap();
        let requests = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&requests);
        tokio::spawn(async move {
            for reply in replies {
                let Ok((mut socket, _)) = listener.accept().await else { return };
                read_request_head(&mut socket).await;
                counter.fetch_add(1, Ordering::SeqCst);

                match reply {
                    StubReply::Complete { status, reason, body } => {
                        let head = format!(
                            "HTTP/1.1 {status} {reason}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                            body.len()
                        );
                        let _ = socket.write_all(head.as_bytes()).await;
                        let _ = socket.write_all(&body).await;
                        let _ = socket.shutdown().await;
                    }
                    StubReply::Stall { declared, sent } => {
                        let head = format!("HTTP/1.1 200 OK\r\nContent-Length: {declared}\r\n\r\n");
                        let _ = socket.write_all(head.as_bytes()).await;
                        let _ = socket.write_all(&sent).await;
                        let _ = socket.flush().await;
                        tokio::spawn(async move {
                            let _held = socket;
                            std::future::pending::<()>().await
                        });
                    }
                }
            }
        });

        Self {
            url: format!("http://{addr}/model.onnx"),
            requests,
        }
    }

    pub fn url(&self) -> String {
        self.url.clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

async fn read_request_head(socket: &mut TcpStream) {
    let mut head = Vec::new();
    let mut buf  = [0u8; 1024];
    loop {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => {
                head.extend_from_slice(&buf[..n]);
                if head.windows(4).any(|w| w == b"\r\n\r\n") {
                    return;
                }
            }
        }
    }
}

// ─── CapturedLogs ─────────────────────────────────────────────────────────────
/// Plain-text fmt output of every event on the current thread
/// while the guard from `install` is alive.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<parking_lot::Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let sink       = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .with_writer(move || sink.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
