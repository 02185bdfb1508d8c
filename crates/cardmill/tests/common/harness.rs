//! Test harness for isolated, deterministic pipeline execution.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use cardmill::db::Database;
use cardmill::extractor::ExtractorRegistry;
use cardmill::generator::GenerationRequest;
use cardmill::{
    BackendError, DeckService, GenerationOptions, GenerationPolicy, GenerativeBackend,
    InlineScheduler, SubmitReceipt,
};

/// Generative backend that replays a fixed script of responses and records
/// every request it receives.
pub struct MockBackend {
    script: Mutex<VecDeque<Result<String, BackendError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queues a successful response.
    pub fn respond(&self, body: impl Into<String>) {
        self.script.lock().unwrap().push_back(Ok(body.into()));
    }

    /// Queues a failure.
    pub fn fail(&self, message: impl Into<String>) {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(BackendError::Request(message.into())));
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Instructions of the nth request received.
    pub fn instructions(&self, n: usize) -> String {
        self.requests.lock().unwrap()[n].instructions.clone()
    }
}

#[async_trait]
impl GenerativeBackend for MockBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendError> {
        self.requests.lock().unwrap().push(request.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::Request("no scripted response".to_string())))
    }
}

/// Isolated environment: in-memory database, scripted backend, and a
/// scheduler that only runs jobs when the test says so.
pub struct TestHarness {
    pub service: DeckService,
    pub backend: Arc<MockBackend>,
    pub scheduler: Arc<InlineScheduler>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_policy(GenerationPolicy::default())
    }

    pub fn with_policy(policy: GenerationPolicy) -> Self {
        let db = Database::open_in_memory().expect("Failed to open in-memory database");
        let backend = Arc::new(MockBackend::new());
        let scheduler = Arc::new(InlineScheduler::new());
        let service = DeckService::new(
            db,
            backend.clone(),
            ExtractorRegistry::new(),
            scheduler.clone(),
            policy,
        );
        Self {
            service,
            backend,
            scheduler,
        }
    }

    /// Submits a plain-text document.
    pub fn submit_text(&self, text: &str, options: GenerationOptions) -> SubmitReceipt {
        self.service
            .submit_job(
                text.as_bytes().to_vec(),
                Some("text/plain".to_string()),
                "notes.txt",
                options,
            )
            .expect("submit_job failed")
    }

    /// Runs every scheduled job to completion.
    pub async fn run_jobs(&self) {
        self.scheduler.run_pending().await;
    }
}
