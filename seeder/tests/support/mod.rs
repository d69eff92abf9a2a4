#![allow(dead_code)]

use async_trait::async_trait;
use jsonwebtoken::{EncodingKey, Header, encode};
use seeder::config::SeedConfig;
use seeder::fixture::{FixtureError, TableWriter};
use seeder::transport::{ApiClient, ApiRequest, Method, RetryPolicy, Transport, TransportError};
use serde_json::{Map, Value, json};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::fmt::MakeWriter;

pub fn token_for(id: &str) -> String {
    encode(
        &Header::default(),
        &json!({ "id": id, "exp": 4_102_444_800u64 }),
        &EncodingKey::from_secret(b"test-secret"),
    )
    .unwrap()
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub token: Option<String>,
}

type Handler = Box<dyn Fn(&Recorded, usize) -> Result<Value, TransportError> + Send + Sync>;

/// In-memory API: every call is logged, then answered by `handler`, which
/// also receives the 0-based call number.
pub struct FakeApi {
    handler: Handler,
    log: Mutex<Vec<Recorded>>,
}

impl FakeApi {
    pub fn new(
        handler: impl Fn(&Recorded, usize) -> Result<Value, TransportError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            log: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Recorded> {
        self.log.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> Vec<Recorded> {
        self.calls().into_iter().filter(|c| c.path == path).collect()
    }
}

#[async_trait]
impl Transport for FakeApi {
    async fn send(&self, request: ApiRequest<'_>) -> Result<Value, TransportError> {
        let recorded = Recorded {
            method: request.method,
            path: request.path.to_string(),
            body: request.body.cloned(),
            token: request.token.map(str::to_string),
        };
        let n = {
            let mut log = self.log.lock().unwrap();
            log.push(recorded.clone());
            log.len() - 1
        };
        (self.handler)(&recorded, n)
    }
}

pub fn status(code: u16) -> TransportError {
    TransportError::Status {
        status: code,
        message: "scripted".into(),
    }
}

pub fn instant_retries() -> RetryPolicy {
    RetryPolicy {
        base_delay: Duration::ZERO,
        ..RetryPolicy::default()
    }
}

pub fn client(api: FakeApi) -> ApiClient<FakeApi> {
    ApiClient::new(api, instant_retries())
}

/// Three teachers, ten students, teacher #1 special with four.
pub fn small_config() -> SeedConfig {
    SeedConfig {
        total_teachers: 3,
        total_students: 10,
        special_students: 4,
        special_batches: 2,
        batches_per_teacher: 1,
        active_batch_cap: None,
        null_batches: 1,
        special_assignments: 3,
        special_notes: 2,
        special_messages: 4,
        random_seed: Some(5),
        retry: instant_retries(),
        ..SeedConfig::default()
    }
}

/// Records every chunk; chunk numbers listed in `fail_on` are rejected.
pub struct RecordingWriter {
    pub chunks: Mutex<Vec<(String, Vec<Map<String, Value>>)>>,
    pub fail_on: Vec<usize>,
}

impl RecordingWriter {
    pub fn new(fail_on: Vec<usize>) -> Self {
        Self {
            chunks: Mutex::new(Vec::new()),
            fail_on,
        }
    }

    pub fn sizes_for(&self, table: &str) -> Vec<usize> {
        self.chunks
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, _)| t == table)
            .map(|(_, items)| items.len())
            .collect()
    }
}

#[async_trait]
impl TableWriter for RecordingWriter {
    async fn batch_write(&self, table: &str, items: &[Map<String, Value>]) -> Result<usize, FixtureError> {
        let mut chunks = self.chunks.lock().unwrap();
        let n = chunks.len();
        chunks.push((table.to_string(), items.to_vec()));
        if self.fail_on.contains(&n) {
            return Err(FixtureError::Store("ProvisionedThroughputExceeded".into()));
        }
        Ok(0)
    }
}

/// Collects formatted log output in memory for assertions.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Routes this thread's events into the buffer until the guard drops.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_target(false)
            .with_max_level(tracing::Level::INFO)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn lines(&self) -> Vec<String> {
        let buf = self.0.lock().unwrap();
        String::from_utf8_lossy(&buf).lines().map(str::to_owned).collect()
    }

    pub fn count(&self, needle: &str) -> usize {
        self.lines().iter().filter(|l| l.contains(needle)).count()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
