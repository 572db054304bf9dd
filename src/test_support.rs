use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{FacebookError, Result};
use crate::request::HttpMethod;
use crate::transport::{BinaryAttachment, TransportResponse, WebRequestor};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecordedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub body: Option<String>,
    pub attachment: Option<String>,
}

/// Replays scripted responses in order and remembers what was sent.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingTransport {
    responses: Arc<Mutex<VecDeque<TransportResponse>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl RecordingTransport {
    pub fn new(responses: Vec<TransportResponse>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into())),
            requests: Arc::default(),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn respond(&self, request: RecordedRequest) -> Result<TransportResponse> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| FacebookError::network("no scripted response left"))
    }
}

#[async_trait]
impl WebRequestor for RecordingTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse> {
        self.respond(RecordedRequest {
            method: HttpMethod::Get,
            url: url.to_string(),
            body: None,
            attachment: None,
        })
    }

    async fn post(
        &self,
        url: &str,
        body: &str,
        attachment: Option<&BinaryAttachment>,
    ) -> Result<TransportResponse> {
        self.respond(RecordedRequest {
            method: HttpMethod::Post,
            url: url.to_string(),
            body: Some(body.to_string()),
            attachment: attachment.map(|a| a.filename.clone()),
        })
    }
}
