//! Shared in-memory transport for adapter tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::stream;
use unify_llm::UnifyError;
use unify_llm::http::{HttpRequest, HttpResponse, HttpStreamResponse, HttpTransport};

/// Canned reply popped per request, in queue order.
pub struct CannedResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl CannedResponse {
    pub fn new(status: u16, body: &str) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.as_bytes().to_vec(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }
}

/// Transport replaying canned responses and recording every request it sees.
#[derive(Default)]
pub struct MockTransport {
    requests: Mutex<Vec<HttpRequest>>,
    responses: Mutex<VecDeque<CannedResponse>>,
}

impl MockTransport {
    pub fn new(responses: Vec<CannedResponse>) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            responses: Mutex::new(responses.into()),
        })
    }

    pub fn recorded_requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn pop(&self, request: HttpRequest) -> Result<CannedResponse, UnifyError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| UnifyError::transport("no canned response left"))
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, UnifyError> {
        let canned = self.pop(request)?;
        Ok(HttpResponse {
            status: canned.status,
            headers: canned.headers,
            body: canned.body,
        })
    }

    async fn send_stream(&self, request: HttpRequest) -> Result<HttpStreamResponse, UnifyError> {
        let canned = self.pop(request)?;
        Ok(HttpStreamResponse {
            status: canned.status,
            headers: canned.headers,
            body: Box::pin(stream::once(async move { Ok(canned.body) })),
        })
    }
}
