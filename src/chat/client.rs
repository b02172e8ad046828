//! HTTP client for a local Ollama server.

use super::message::ChatMessage;
use super::stream::{ChatResponseLine, LineDecoder};
use crate::config::ChatConfig;
use crate::error::{CalcError, Result};
use serde::{Deserialize, Serialize};

/// Size and quantization details reported for a model.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ModelDetails {
    /// Primary model family.
    #[serde(default)]
    pub family: String,
    /// All families, including projector families on multimodal models.
    #[serde(default)]
    pub families: Option<Vec<String>>,
    /// Parameter count label, e.g. `7B`.
    #[serde(default)]
    pub parameter_size: String,
    /// Quantization label, e.g. `Q4_0`.
    #[serde(default)]
    pub quantization_level: String,
}

/// An installed model as listed by `/api/tags`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ModelInfo {
    /// Model tag, e.g. `llama3.2:latest`.
    pub name: String,
    /// Size on disk in bytes.
    #[serde(default)]
    pub size: u64,
    /// Model details.
    #[serde(default)]
    pub details: ModelDetails,
}

/// The subset of `/api/show` used for capability probing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelCard {
    /// Model details.
    #[serde(default)]
    pub details: ModelDetails,
    /// Capability tags, e.g. `completion`, `vision`.
    #[serde(default)]
    pub capabilities: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: RequestOptions,
}

#[derive(Debug, Serialize)]
struct RequestOptions {
    temperature: f64,
    top_p: f64,
    num_predict: u32,
}

#[derive(Debug, Serialize)]
struct ShowRequest<'a> {
    model: &'a str,
}

/// Callback receiving each streamed text fragment.
pub type DeltaSink<'a> = &'a mut (dyn FnMut(&str) + Send);

/// Client for the Ollama HTTP API.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    config: ChatConfig,
}

impl OllamaClient {
    /// Create a client from configuration.
    pub fn new(config: ChatConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()?;
        Ok(Self { http, config })
    }

    /// Configuration this client was built with.
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Liveness probe against `/api/version`.
    pub async fn check_connection(&self) -> bool {
        let url = self.config.endpoint("/api/version");
        match self
            .http
            .get(&url)
            .timeout(self.config.probe_timeout)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("Connection check failed: {}", e);
                false
            },
        }
    }

    /// List installed models.
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let url = self.config.endpoint("/api/tags");
        let request = self.http.get(&url).timeout(self.config.probe_timeout);
        let response = self.send(request, &url).await?;
        let body = response.bytes().await?;
        let tags: TagsResponse = serde_json::from_slice(&body)?;
        tracing::info!("Found {} models", tags.models.len());
        Ok(tags.models)
    }

    /// Fetch a model card.
    pub async fn show_model(&self, name: &str) -> Result<ModelCard> {
        let url = self.config.endpoint("/api/show");
        let request = self
            .http
            .post(&url)
            .timeout(self.config.probe_timeout)
            .json(&ShowRequest { model: name });
        let response = self.send(request, &url).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Send a conversation to `/api/chat` and return the full reply.
    ///
    /// With a sink the reply is streamed: every fragment is passed to the
    /// sink as it arrives and the return value is their concatenation.
    /// Without one a single JSON object is read.
    pub async fn send_chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
        on_delta: Option<DeltaSink<'_>>,
    ) -> Result<String> {
        let url = self.config.endpoint("/api/chat");
        let options = &self.config.options;
        let body = ChatRequest {
            model,
            messages,
            stream: on_delta.is_some(),
            options: RequestOptions {
                temperature: options.temperature,
                top_p: options.top_p,
                num_predict: options.num_predict,
            },
        };
        tracing::debug!(
            "POST {} model={} messages={} stream={}",
            url,
            model,
            messages.len(),
            body.stream
        );

        let mut response = self.send(self.http.post(&url).json(&body), &url).await?;

        let Some(sink) = on_delta else {
            let bytes = response.bytes().await?;
            let line: ChatResponseLine = serde_json::from_slice(&bytes)?;
            if let Some(message) = line.error {
                tracing::warn!("{} reported: {}", url, message);
                return Err(CalcError::Stream(message));
            }
            return Ok(line.content().unwrap_or_default().to_string());
        };

        let mut decoder = LineDecoder::new();
        let mut full = String::new();
        let mut deliver = |lines: Vec<ChatResponseLine>, full: &mut String| -> Result<()> {
            for line in lines {
                if let Some(message) = &line.error {
                    tracing::warn!("Stream from {} failed: {}", url, message);
                    return Err(CalcError::Stream(message.clone()));
                }
                if let Some(text) = line.content() {
                    full.push_str(text);
                    sink(text);
                }
            }
            Ok(())
        };

        while let Some(chunk) = response.chunk().await? {
            deliver(decoder.push(&chunk), &mut full)?;
        }
        deliver(decoder.finish().into_iter().collect(), &mut full)?;

        if decoder.skipped() > 0 {
            tracing::debug!("Dropped {} malformed lines", decoder.skipped());
        }
        tracing::info!("Reply complete, {} chars", full.chars().count());
        Ok(full)
    }

    async fn send(&self, request: reqwest::RequestBuilder, url: &str) -> Result<reqwest::Response> {
        let response = request.send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                tracing::warn!("Ollama unreachable at {}: {}", url, e);
                CalcError::unreachable(&self.config.base_url, e)
            } else {
                CalcError::Request(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("{} returned {}", url, status);
            return Err(CalcError::HttpStatus {
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_shape() {
        let messages = [ChatMessage::system("sys"), ChatMessage::user("hi")];
        let body = ChatRequest {
            model: "llama3.2",
            messages: &messages,
            stream: true,
            options: RequestOptions {
                temperature: 0.7,
                top_p: 0.9,
                num_predict: 2048,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "llama3.2");
        assert_eq!(json["stream"], true);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["options"]["num_predict"], 2048);
    }

    #[test]
    fn tags_tolerate_missing_fields() {
        let tags: TagsResponse =
            serde_json::from_str(r#"{"models":[{"name":"llava:7b","details":{"family":"llama"}}]}"#)
                .unwrap();
        assert_eq!(tags.models[0].name, "llava:7b");
        assert_eq!(tags.models[0].size, 0);
        assert_eq!(tags.models[0].details.family, "llama");

        let empty: TagsResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.models.is_empty());
    }
}
