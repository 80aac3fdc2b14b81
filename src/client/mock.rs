//! Mock transport for testing purposes.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::client::ClientError;
use crate::utils::Transport;

/// A single request observed by [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub path: String,
    pub params: Vec<(String, String)>,
}

impl RecordedCall {
    /// Value of a query parameter, if it was sent.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// A transport that serves canned bodies and records every request.
///
/// Queued responses are served first, in order; once the queue is empty the
/// default body (if any) is returned for every call.
#[derive(Debug, Default)]
pub struct MockTransport {
    queued: Mutex<VecDeque<Result<String, String>>>,
    default_body: Mutex<Option<String>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    /// Create a mock with no responses configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that answers every request with `body`.
    pub fn with_body(body: impl Into<String>) -> Self {
        let mock = Self::new();
        mock.set_default_body(body);
        mock
    }

    /// Set the body returned once the queue is empty.
    pub fn set_default_body(&self, body: impl Into<String>) {
        *self.default_body.lock().unwrap() = Some(body.into());
    }

    /// Queue a body for the next unanswered request.
    pub fn push_body(&self, body: impl Into<String>) {
        self.queued.lock().unwrap().push_back(Ok(body.into()));
    }

    /// Queue a transport failure for the next unanswered request.
    pub fn push_error(&self, message: impl Into<String>) {
        self.queued.lock().unwrap().push_back(Err(message.into()));
    }

    /// All requests seen so far, oldest first.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of requests seen so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, path: &str, params: &[(String, String)]) -> Result<String, ClientError> {
        self.calls.lock().unwrap().push(RecordedCall {
            path: path.to_string(),
            params: params.to_vec(),
        });

        let queued = self.queued.lock().unwrap().pop_front();
        match queued {
            Some(Ok(body)) => Ok(body),
            Some(Err(message)) => Err(ClientError::Transport(message)),
            None => self
                .default_body
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| ClientError::Transport("no mock response configured".to_string())),
        }
    }
}
