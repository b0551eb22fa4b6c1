//! # Bionet Observer
//!
//! Optional lesson generation for the teacher.
//!
//! The engine never awaits anything. It queues [`DelegateRequest`]s; the host
//! hands them to a [`DelegateDispatcher`], which runs the configured
//! [`TextGenerator`] on tokio with a hard timeout and parks each
//! [`DelegateReply`] until the host drains it between ticks.

use async_trait::async_trait;
use bionet_data::{DelegateReply, DelegateRequest};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum DelegateError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("generator returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("generator timed out after {0:?}")]
    Timeout(Duration),

    #[error("generator returned no text")]
    Empty,
}

/// Produces lesson text for a prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, DelegateError>;
}

/// Offline generator: a few template sentences about the quoted topic.
pub struct HeuristicGenerator;

#[async_trait]
impl TextGenerator for HeuristicGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, DelegateError> {
        let topic = prompt
            .split('"')
            .nth(1)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(DelegateError::Empty)?;
        Ok(format!(
            "Das ist {topic}. Ich kenne {topic}. {topic} ist wichtig."
        ))
    }
}

/// Always answers with the same text. Useful for scripted sessions.
pub struct CannedGenerator(pub String);

#[async_trait]
impl TextGenerator for CannedGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, DelegateError> {
        if self.0.trim().is_empty() {
            Err(DelegateError::Empty)
        } else {
            Ok(self.0.clone())
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Calls a completion endpoint that accepts `{model, prompt, stream}` and
/// answers with `{response}`.
pub struct HttpGenerator {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

impl HttpGenerator {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl TextGenerator for HttpGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, DelegateError> {
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };
        tracing::debug!(endpoint = %self.endpoint, model = %self.model, "Generator request");

        let response = self.client.post(&self.endpoint).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DelegateError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        if parsed.response.trim().is_empty() {
            return Err(DelegateError::Empty);
        }
        Ok(parsed.response)
    }
}

/// Runs generator calls off the tick loop and collects their replies.
pub struct DelegateDispatcher {
    pub replies: Arc<Mutex<Vec<DelegateReply>>>,
    pub max_pending: usize,
    tx: mpsc::UnboundedSender<DelegateRequest>,
}

impl DelegateDispatcher {
    /// Spawns the worker. Must be called from inside a tokio runtime.
    pub fn new(generator: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        let replies = Arc::new(Mutex::new(Vec::new()));
        let (tx, mut rx) = mpsc::unbounded_channel::<DelegateRequest>();

        let replies_clone = Arc::clone(&replies);
        let max_pending = 16;

        tokio::spawn(async move {
            while let Some(req) = rx.recv().await {
                let generator = Arc::clone(&generator);
                let replies = Arc::clone(&replies_clone);
                tokio::spawn(async move {
                    let result = match tokio::time::timeout(timeout, generator.generate(&req.prompt)).await
                    {
                        Ok(Ok(text)) => Ok(text),
                        Ok(Err(e)) => Err(e.to_string()),
                        Err(_) => Err(DelegateError::Timeout(timeout).to_string()),
                    };
                    if let Err(e) = &result {
                        tracing::warn!(request = %req.id, topic = %req.topic, error = %e, "Generator failed");
                    }

                    if let Ok(mut list) = replies.lock() {
                        if list.len() >= max_pending {
                            list.remove(0);
                        }
                        list.push(DelegateReply { id: req.id, result });
                    }
                });
            }
        });

        Self {
            replies,
            max_pending,
            tx,
        }
    }

    /// Queues a request for the worker. Returns `false` when the worker is
    /// gone; the request is dropped and the teacher's timeout takes over.
    pub fn dispatch(&self, request: DelegateRequest) -> bool {
        match self.tx.send(request) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(request = %e.0.id, topic = %e.0.topic, "Generator worker gone, request dropped");
                false
            }
        }
    }

    pub fn consume_replies(&self) -> Vec<DelegateReply> {
        if let Ok(mut list) = self.replies.lock() {
            std::mem::take(&mut *list)
        } else {
            Vec::new()
        }
    }
}
