use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::CrimeGradeResult;
use super::geocode::Geocoder;
use super::resolver::CrimeAnalysisResolver;
use super::scraper::PageBrowser;
use super::{CrimeGrader, GraderError};
use crate::config::OpenAiConfig;

/// Name of the internal grading function exposed to the model.
const GRADING_TOOL: &str = "grade_address";

/// Tool rounds are capped so a model that keeps requesting the same tool
/// cannot loop the agent forever.
const MAX_TOOL_ROUNDS: usize = 2;

/// Hard failures surfaced by the agent path. Unlike the resolver, there is no
/// fallback here: the caller sees every one of these.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("Missing OPENAI_API_KEY environment variable. Please set it in your .env file or environment.")]
    MissingApiKey,
    #[error("chat completion request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("chat completion endpoint returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("No response from chat model")]
    NoResponse,
    #[error("model response did not contain a JSON object")]
    MissingJson,
    #[error("model response is not valid JSON: {0}")]
    MalformedResponse(#[from] serde_json::Error),
}

/// One message in a chat-completion conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::plain("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain("user", content)
    }

    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: "tool".to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.into()),
        }
    }

    fn plain(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }
}

/// Model-initiated request to run a named function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: FunctionSpec,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub temperature: f32,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

/// Chat-completion transport, kept behind a trait so the agent protocol can be
/// exercised without a live endpoint.
#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn complete(&self, request: ChatCompletionRequest)
        -> Result<ChatCompletionResponse, AgentError>;
}

/// OpenAI-style chat-completion client.
pub struct OpenAiChatApi {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl OpenAiChatApi {
    pub fn new(config: &OpenAiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
        }
    }
}

#[async_trait]
impl ChatApi for OpenAiChatApi {
    async fn complete(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, AgentError> {
        let api_key = self.api_key.as_deref().ok_or(AgentError::MissingApiKey)?;

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AgentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

/// Grades an address by asking a chat model for a strict-JSON result,
/// optionally executing one bounded tool-call round trip against the internal
/// resolver.
pub struct GradingAgent<C, B, G> {
    chat: C,
    model: String,
    resolver: Arc<CrimeAnalysisResolver<B, G>>,
}

impl<C, B, G> GradingAgent<C, B, G>
where
    C: ChatApi,
    B: PageBrowser,
    G: Geocoder,
{
    pub fn new(chat: C, model: impl Into<String>, resolver: Arc<CrimeAnalysisResolver<B, G>>) -> Self {
        Self {
            chat,
            model: model.into(),
            resolver,
        }
    }

    pub async fn grade(&self, address: &str) -> Result<CrimeGradeResult, AgentError> {
        let mut messages = vec![
            ChatMessage::system(system_prompt()),
            ChatMessage::user(format!("Grade this address like CrimeGrade: \"{address}\"")),
        ];

        let first = self
            .chat
            .complete(ChatCompletionRequest {
                model: self.model.clone(),
                temperature: 0.2,
                messages: messages.clone(),
                tools: Some(vec![grading_tool()]),
            })
            .await?;
        let mut message = first_message(first)?;

        let mut rounds = 0;
        while rounds < MAX_TOOL_ROUNDS {
            let Some(calls) = message
                .tool_calls
                .clone()
                .filter(|calls| !calls.is_empty())
            else {
                break;
            };

            let mut tool_outputs = Vec::new();
            for call in &calls {
                if call.kind != "function" || call.function.name != GRADING_TOOL {
                    continue;
                }
                let args: GradeToolArgs = serde_json::from_str(&call.function.arguments)?;
                let analysis = self.resolver.analyze_crime_for_address(&args.address).await;
                tool_outputs.push(ChatMessage::tool(
                    call.id.clone(),
                    serde_json::to_string(&analysis)?,
                ));
            }

            if tool_outputs.is_empty() {
                break;
            }

            messages.push(message.clone());
            messages.extend(tool_outputs);

            let follow_up = self
                .chat
                .complete(ChatCompletionRequest {
                    model: self.model.clone(),
                    temperature: 0.1,
                    messages: messages.clone(),
                    tools: None,
                })
                .await?;
            message = first_message(follow_up)?;
            rounds += 1;
        }

        parse_grade_result(message.content.as_deref().unwrap_or_default())
    }
}

#[async_trait]
impl<C, B, G> CrimeGrader for GradingAgent<C, B, G>
where
    C: ChatApi,
    B: PageBrowser,
    G: Geocoder,
{
    async fn grade_address(&self, address: &str) -> Result<CrimeGradeResult, GraderError> {
        self.grade(address).await.map_err(GraderError::from)
    }
}

#[derive(Debug, Deserialize)]
struct GradeToolArgs {
    address: String,
}

fn first_message(response: ChatCompletionResponse) -> Result<ChatMessage, AgentError> {
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message)
        .ok_or(AgentError::NoResponse)
}

/// Models often prepend conversational text; parse from the first `{`.
fn parse_grade_result(content: &str) -> Result<CrimeGradeResult, AgentError> {
    let text = content.trim();
    let start = text.find('{').ok_or(AgentError::MissingJson)?;
    Ok(serde_json::from_str(&text[start..])?)
}

fn system_prompt() -> String {
    [
        "You are an address safety grader.",
        "You return a CrimeGrade-style letter grade (A\u{2013}F).",
        "Prefer concise JSON only. Do not include extra prose.",
        "Use the provided tool to perform the actual grading.",
        "Output must be a single JSON object matching the schema: { \"address\": string, \"zip\"?: string, \"overall_grade\": string, \"components\"?: { \"violent_crime\"?: string, \"property_crime\"?: string }, \"notes\"?: string, \"evidence\"?: [{ \"source\"?: string, \"snippet\": string }] }",
    ]
    .join("\n")
}

fn grading_tool() -> ToolDefinition {
    ToolDefinition {
        kind: "function",
        function: FunctionSpec {
            name: GRADING_TOOL,
            description: "Return a CrimeGrade-style result for an address using the internal crime analysis resolver.",
            parameters: json!({
                "type": "object",
                "properties": { "address": { "type": "string" } },
                "required": ["address"]
            }),
        },
    }
}
