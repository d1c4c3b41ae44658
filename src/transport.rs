use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use reqwest::Client;
use serde::Serialize;
use std::pin::Pin;

use crate::error::ChatError;

pub const LOCAL_ENDPOINT: &str = "http://localhost:8000/api/chat/stream";
pub const PRODUCTION_ENDPOINT: &str =
    "https://coryfitzpatrick-ai-backend-fcwbtvbnfa-uc.a.run.app/api/chat/stream";

/// Raw reply body, one item per chunk as it arrives off the wire.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Bytes, ChatError>> + Send>>;

/// Where the chat backend lives for this build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deployment {
    LocalDevelopment,
    Production,
}

impl Deployment {
    /// Debug builds talk to the backend on localhost, release builds to
    /// the hosted one.
    pub fn detect() -> Self {
        if cfg!(debug_assertions) {
            Deployment::LocalDevelopment
        } else {
            Deployment::Production
        }
    }

    pub fn endpoint(&self) -> &'static str {
        match self {
            Deployment::LocalDevelopment => LOCAL_ENDPOINT,
            Deployment::Production => PRODUCTION_ENDPOINT,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Deployment::LocalDevelopment => "local",
            Deployment::Production => "production",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
}

/// Opens one streamed reply per user message.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn open(&self, message: &str) -> Result<ChunkStream, ChatError>;
}

/// Streams replies from the chat backend over HTTP.
///
/// The body is plain text with no framing; concatenating every chunk in
/// order yields the full reply. No timeout is set on the request.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
        }
    }

    pub fn for_deployment(deployment: Deployment) -> Self {
        Self::new(deployment.endpoint())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn open(&self, message: &str) -> Result<ChunkStream, ChatError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&ChatRequest { message })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ChatError::Status {
                status: response.status().as_u16(),
            });
        }

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(ChatError::from));

        Ok(Box::pin(stream))
    }
}
