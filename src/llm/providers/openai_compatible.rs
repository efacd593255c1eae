//! OpenAI-compatible chat completion provider (`/v1/chat/completions`).
//!
//! Exposes the two call shapes of the `LlmProvider` abstraction: a plain
//! completion and a tool-enabled completion following the function-calling
//! protocol. All OpenAI wire types are private to this module — callers
//! never see them.
//!
//! Covers OpenAI itself and OpenAI-compatible local servers (Ollama,
//! LM Studio…). Constructed once at startup, then cheaply cloned because
//! `reqwest::Client` is an `Arc` internally.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace};

use crate::llm::{Completion, ModelTier, ProviderError, ToolOutcome, ToolSpec};

// ── Public provider ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct OpenAiCompatibleProvider {
    client: Client,
    api_base_url: String,
    extract_model: String,
    synth_model: String,
    api_key: Option<String>,
}

impl OpenAiCompatibleProvider {
    /// Build a provider from config values and an optional API key.
    ///
    /// `api_key` is `None` for keyless local models. When present it is sent
    /// as `Authorization: Bearer <key>` on every request.
    pub fn new(
        api_base_url: String,
        extract_model: String,
        synth_model: String,
        timeout_seconds: u64,
        api_key: Option<String>,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| ProviderError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base_url,
            extract_model,
            synth_model,
            api_key,
        })
    }

    fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Extract => &self.extract_model,
            ModelTier::Synthesize => &self.synth_model,
        }
    }

    /// One plain round-trip: prompt in, trimmed text out.
    pub async fn complete(&self, request: &Completion<'_>) -> Result<String, ProviderError> {
        let message = self.round_trip(request, None).await?;

        message
            .content
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ProviderError::Request("empty or missing content in response".into()))
    }

    /// One tool-enabled round-trip with `tool_choice: "required"`.
    ///
    /// Returns the first tool call when the model elected one, or its plain
    /// text content otherwise.
    pub async fn complete_with_tools(
        &self,
        request: &Completion<'_>,
        tools: &[ToolSpec],
    ) -> Result<ToolOutcome, ProviderError> {
        let message = self.round_trip(request, Some(tools)).await?;

        if let Some(call) = message.tool_calls.into_iter().flatten().next() {
            return Ok(ToolOutcome::ToolCall {
                name: call.function.name,
                arguments: call.function.arguments,
            });
        }

        let text = message
            .content
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                ProviderError::Request("neither tool call nor content in response".into())
            })?;
        Ok(ToolOutcome::Text(text))
    }

    async fn round_trip(
        &self,
        request: &Completion<'_>,
        tools: Option<&[ToolSpec]>,
    ) -> Result<ChoiceMessage, ProviderError> {
        let model = self.model_for(request.tier);

        // Some models (gpt-5 family) do not accept a temperature parameter.
        let temperature = if model.starts_with("gpt-5") {
            None
        } else {
            Some(request.temperature)
        };

        let mut messages = Vec::new();
        if let Some(sys) = request.system {
            messages.push(Message {
                role: "system".to_string(),
                content: sys.to_string(),
            });
        }
        messages.push(Message {
            role: "user".to_string(),
            content: request.user.to_string(),
        });

        let payload = ChatCompletionRequest {
            model: model.to_string(),
            messages,
            temperature,
            max_tokens: request.max_tokens,
            tools: tools.map(|specs| specs.iter().map(ToolDef::from).collect()),
            tool_choice: tools.map(|_| "required".to_string()),
        };

        debug!(
            model = %payload.model,
            temperature = ?payload.temperature,
            tools = tools.map(<[ToolSpec]>::len).unwrap_or(0),
            content_len = request.user.len(),
            "sending LLM request"
        );
        if tracing::enabled!(tracing::Level::TRACE) {
            let json = serde_json::to_string_pretty(&payload)
                .unwrap_or_else(|e| format!("<serialization failed: {e}>"));
            trace!(payload = %json, "full LLM request payload");
        }

        let mut req = self.client.post(&self.api_base_url).json(&payload);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().await.map_err(|e| {
            error!(url = %self.api_base_url, error = %e, "LLM HTTP request failed (transport)");
            ProviderError::Request(e.to_string())
        })?;

        let response = check_status(response).await?;

        let parsed = response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| {
                error!(error = %e, "failed to deserialize LLM response");
                ProviderError::Request(format!("failed to parse response body: {e}"))
            })?;

        debug!(choices = parsed.choices.len(), "received LLM response");

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| ProviderError::Request("response contained no choices".into()))
    }
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ToolDef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<String>,
}

#[derive(Debug, Serialize)]
struct ToolDef {
    #[serde(rename = "type")]
    kind: &'static str,
    function: FunctionDef,
}

#[derive(Debug, Serialize)]
struct FunctionDef {
    name: &'static str,
    description: &'static str,
    parameters: serde_json::Value,
}

impl From<&ToolSpec> for ToolDef {
    fn from(spec: &ToolSpec) -> Self {
        Self {
            kind: "function",
            function: FunctionDef {
                name: spec.name,
                description: spec.description,
                parameters: spec.parameters.clone(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCallData>>,
}

#[derive(Debug, Deserialize)]
struct ToolCallData {
    function: FunctionData,
}

#[derive(Debug, Deserialize)]
struct FunctionData {
    name: String,
    arguments: String,
}

// Error envelope used by OpenAI and compatible APIs.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

/// Consume the response and return it if successful, or a structured error.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error body>".to_string());

    let message = if let Ok(env) = serde_json::from_str::<ErrorEnvelope>(&body) {
        let code = env
            .error
            .code
            .map(|v| match v {
                serde_json::Value::String(s) => format!(" [code={s}]"),
                other => format!(" [code={other}]"),
            })
            .unwrap_or_default();
        format!("HTTP {status}{code}: {}", env.error.message)
    } else {
        format!("HTTP {status}: {body}")
    };

    error!(%status, %message, "LLM request returned HTTP error");
    Err(ProviderError::Request(message))
}
