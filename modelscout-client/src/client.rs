//! HTTP client for the Ollama-style inference server.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use modelscout_common::{
    ChatMessage, ChatRequest, ChatResponse, EmbedRequest, EmbedResponse, GenerateOptions,
    GenerateRequest, GenerateResponse, ModelDescriptor, ModelInfo,
};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::stream::ChunkStream;

/// Default timeout for the liveness probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Liveness snapshot of the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStatus {
    pub reachable: bool,
    pub model_count: usize,
}

impl ServerStatus {
    fn down() -> Self {
        Self {
            reachable: false,
            model_count: 0,
        }
    }
}

/// Client for the inference server HTTP API.
///
/// Stateless: every call is an independent round trip, nothing is cached,
/// and no call retries on failure. Clones share the underlying connection
/// pool and are cheap.
///
/// Only the liveness probe carries a built-in timeout. Inference calls do
/// not; timeout policy belongs to the caller, who knows the model size and
/// prompt length.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http_client: Client,
    base_url: String,
    probe_timeout: Duration,
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelDescriptor>,
}

#[derive(Debug, Serialize)]
struct ShowWireRequest<'a> {
    model: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerateWireRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<&'a GenerateOptions>,
}

#[derive(Debug, Serialize)]
struct ChatWireRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<&'a GenerateOptions>,
}

#[derive(Debug, Serialize)]
struct EmbeddingsWireRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<&'a GenerateOptions>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsWireResponse {
    #[serde(default)]
    embedding: Vec<f32>,
}

/// Error body the server attaches to non-success responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl OllamaClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.server.base_url)
            .with_probe_timeout(Duration::from_secs(config.server.probe_timeout_secs))
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Liveness probe.
    ///
    /// Never fails for connectivity problems: an unreachable server, a
    /// timeout or an unparseable payload all come back as
    /// `{ reachable: false, model_count: 0 }`. Bounded by the probe
    /// timeout so it cannot stall a UI.
    pub async fn status(&self) -> ServerStatus {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .http_client
            .get(&url)
            .timeout(self.probe_timeout)
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => {
                match response.json::<TagsResponse>().await {
                    Ok(tags) => ServerStatus {
                        reachable: true,
                        model_count: tags.models.len(),
                    },
                    Err(e) => {
                        tracing::debug!("status probe got unparseable payload: {}", e);
                        ServerStatus::down()
                    }
                }
            }
            Ok(response) => {
                tracing::debug!("status probe got HTTP {}", response.status());
                ServerStatus::down()
            }
            Err(e) => {
                tracing::debug!("status probe failed: {}", e);
                ServerStatus::down()
            }
        }
    }

    /// List the models the server currently has.
    ///
    /// An unreachable server yields an empty list, not an error; callers
    /// that need to tell "empty" from "down" should check [`status`]
    /// first. Each call returns a fresh snapshot with no ordering
    /// guarantee.
    ///
    /// [`status`]: OllamaClient::status
    pub async fn list_models(&self) -> Result<Vec<ModelDescriptor>> {
        let url = format!("{}/api/tags", self.base_url);

        let response = match self.http_client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("model listing skipped, server unreachable: {}", e);
                return Ok(vec![]);
            }
        };

        let response = Self::check_status(response).await?;
        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| Error::MalformedResponse(e.to_string()))?;
        Ok(tags.models)
    }

    /// Fetch extended metadata for one model by exact name.
    pub async fn model_info(&self, name: &str) -> Result<ModelInfo> {
        let url = format!("{}/api/show", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .json(&ShowWireRequest { model: name })
            .send()
            .await
            .map_err(|e| Error::Unreachable(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::ModelNotFound(name.to_string()));
        }

        let response = Self::check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| Error::MalformedResponse(e.to_string()))
    }

    /// One-shot text generation; blocks until the full response is in.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        let response = self.post_generate(request, false).await?;
        response
            .json()
            .await
            .map_err(|e| Error::MalformedResponse(e.to_string()))
    }

    /// Streamed text generation.
    ///
    /// Chunks arrive in server emission order and the in-order
    /// concatenation of their `text` fragments equals the non-streaming
    /// result for the same input. The stream is single-pass; dropping it
    /// before exhaustion closes the connection.
    pub async fn generate_stream(
        &self,
        request: &GenerateRequest,
    ) -> Result<ChunkStream<GenerateResponse>> {
        let response = self.post_generate(request, true).await?;
        Ok(ChunkStream::new(response))
    }

    /// Chat completion over the full conversation context, oldest message
    /// first. An empty `messages` sequence is rejected before any network
    /// call.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let response = self.post_chat(request, false).await?;
        response
            .json()
            .await
            .map_err(|e| Error::MalformedResponse(e.to_string()))
    }

    /// Streamed chat completion; fragments arrive in `message.content`.
    /// Same streaming contract as [`generate_stream`].
    ///
    /// [`generate_stream`]: OllamaClient::generate_stream
    pub async fn chat_stream(&self, request: &ChatRequest) -> Result<ChunkStream<ChatResponse>> {
        let response = self.post_chat(request, true).await?;
        Ok(ChunkStream::new(response))
    }

    /// Embedding vector for one text. Non-streaming only; empty text is
    /// rejected before any network call.
    pub async fn embeddings(&self, request: &EmbedRequest) -> Result<EmbedResponse> {
        if request.text.is_empty() {
            return Err(Error::InvalidArgument(
                "embedding text must not be empty".to_string(),
            ));
        }

        let url = format!("{}/api/embeddings", self.base_url);

        tracing::debug!(model = %request.model, "sending embeddings request");

        let response = self
            .http_client
            .post(&url)
            .json(&EmbeddingsWireRequest {
                model: &request.model,
                prompt: &request.text,
                options: request.options.as_ref(),
            })
            .send()
            .await
            .map_err(|e| Error::Unreachable(e.to_string()))?;

        let response = Self::check_status(response).await?;
        let wire: EmbeddingsWireResponse = response
            .json()
            .await
            .map_err(|e| Error::MalformedResponse(e.to_string()))?;

        Ok(EmbedResponse {
            model: request.model.clone(),
            embedding: wire.embedding,
        })
    }

    async fn post_generate(
        &self,
        request: &GenerateRequest,
        stream: bool,
    ) -> Result<reqwest::Response> {
        let url = format!("{}/api/generate", self.base_url);

        tracing::debug!(model = %request.model, stream, "sending generate request");

        let response = self
            .http_client
            .post(&url)
            .json(&GenerateWireRequest {
                model: &request.model,
                prompt: &request.prompt,
                stream,
                options: request.options.as_ref(),
            })
            .send()
            .await
            .map_err(|e| Error::Unreachable(e.to_string()))?;

        Self::check_status(response).await
    }

    async fn post_chat(&self, request: &ChatRequest, stream: bool) -> Result<reqwest::Response> {
        if request.messages.is_empty() {
            return Err(Error::InvalidArgument(
                "chat requires at least one message".to_string(),
            ));
        }

        let url = format!("{}/api/chat", self.base_url);

        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            stream,
            "sending chat request"
        );

        let response = self
            .http_client
            .post(&url)
            .json(&ChatWireRequest {
                model: &request.model,
                messages: &request.messages,
                stream,
                options: request.options.as_ref(),
            })
            .send()
            .await
            .map_err(|e| Error::Unreachable(e.to_string()))?;

        Self::check_status(response).await
    }

    /// Turn a non-success response into a `Server` error, keeping the
    /// server's own message when the body carries one.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
        };
        Err(Error::Server {
            status: status.as_u16(),
            message,
        })
    }
}
