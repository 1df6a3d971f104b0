//! Minimal OpenAI-compatible client for quiz generation.
//!
//! We only call chat.completions and ask for the quiz as a bare JSON object.
//! Works against any compatible endpoint (OpenAI, Groq, local gateways) via OPENAI_BASE_URL.
//! Calls are instrumented and log model name, latency and token usage (not contents).
//!
//! NOTE: We never log the API key and we keep payload truncations short to avoid PII leaks.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use crate::config::{GenerationCfg, Prompts};
use crate::domain::Quiz;
use crate::util::{fill_template, json_object_span, strip_think_blocks, trunc_for_log};

/// What the generation collaborator can answer besides a transport error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuizReply {
  Quiz(Quiz),
  /// The model declined the topic (bare `null`).
  NotATopic,
}

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
}

impl OpenAI {
  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env(timeout: Duration) -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty())?;
    let base_url = std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());

    let client = reqwest::Client::builder().timeout(timeout).build().ok()?;

    Some(Self { client, api_key, base_url, model })
  }

  /// Plain-text chat completion; returns the first choice's content.
  #[instrument(level = "info", skip(self, system, user, generation), fields(model = %self.model))]
  async fn chat_plain(&self, system: &str, user: &str, generation: &GenerationCfg) -> Result<String, String> {
    let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
    let req = ChatCompletionRequest {
      model: self.model.clone(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: system.into() },
        ChatMessageReq { role: "user".into(), content: user.into() },
      ],
      temperature: generation.temperature,
      top_p: Some(generation.top_p),
      max_tokens: Some(generation.max_tokens),
    };

    let res = self
      .client
      .post(&url)
      .header(USER_AGENT, "quizcraft-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req)
      .send()
      .await
      .map_err(|e| e.to_string())?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_openai_error(&body).unwrap_or(body);
      return Err(format!("Model HTTP {}: {}", status, msg));
    }

    let body: ChatCompletionResponse = res.json().await.map_err(|e| e.to_string())?;
    if let Some(usage) = &body.usage {
      info!(target: "quizcraft_backend", prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "Model usage");
    }
    Ok(body.choices.first().and_then(|c| c.message.content.clone()).unwrap_or_default())
  }

  /// Ask the model for a quiz on `topic`. Returns the raw reply; see `parse_quiz_reply`.
  #[instrument(level = "info", skip(self, prompts, generation), fields(topic_len = topic.len(), model = %self.model))]
  pub async fn generate_quiz(&self, prompts: &Prompts, generation: &GenerationCfg, topic: &str) -> Result<String, String> {
    let user = fill_template(&prompts.user_template, &[("topic", topic)]);
    let start = std::time::Instant::now();
    let result = self.chat_plain(&prompts.system, &user, generation).await;
    let elapsed = start.elapsed();

    match &result {
      Ok(raw) => info!(target: "quizcraft_backend", ?elapsed, reply_len = raw.len(), "Model response received"),
      Err(e) => error!(target: "quizcraft_backend", ?elapsed, error = %e, "Model call failed during quiz generation"),
    }
    result
  }
}

/// Clean a model reply and interpret it.
///
/// Reasoning blocks are dropped, a bare `null` means the topic was declined,
/// and otherwise the outermost `{...}` span must parse as a quiz.
pub fn parse_quiz_reply(raw: &str) -> Result<QuizReply, String> {
  let cleaned = strip_think_blocks(raw);
  let cleaned = cleaned.trim();
  let unfenced = cleaned
    .trim_start_matches("```json")
    .trim_start_matches("```")
    .trim_end_matches("```")
    .trim();
  if unfenced == "null" {
    return Ok(QuizReply::NotATopic);
  }

  let Some(span) = json_object_span(unfenced) else {
    warn!(target: "quizcraft_backend", raw = %trunc_for_log(unfenced, 200), "Model reply has no JSON object");
    return Err("reply contains no JSON object".into());
  };
  serde_json::from_str::<Quiz>(span)
    .map(QuizReply::Quiz)
    .map_err(|e| format!("JSON parse error: {}", e))
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  #[serde(skip_serializing_if = "Option::is_none")]
  top_p: Option<f32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  max_tokens: Option<u32>,
}
#[derive(Serialize)]
struct ChatMessageReq {
  role: String,
  content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)]
  usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice {
  message: ChatMessageResp,
}
#[derive(Deserialize)]
struct ChatMessageResp {
  content: Option<String>,
}
#[derive(Deserialize)]
struct Usage {
  #[serde(default)]
  prompt_tokens: Option<u32>,
  #[serde(default)]
  completion_tokens: Option<u32>,
  #[serde(default)]
  total_tokens: Option<u32>,
}

/// Try to extract a clean error message from an OpenAI-style error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap {
    error: EObj,
  }
  #[derive(Deserialize)]
  struct EObj {
    message: String,
  }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::AnswerLetter;

  const QUIZ_JSON: &str =
    r#"{"subject":"Colors","questions":[{"question":"Sky?","options":["Red","Blue","Green","Yellow"],"answer":"B"}]}"#;

  #[test]
  fn null_reply_declines_the_topic() {
    assert_eq!(parse_quiz_reply("null").unwrap(), QuizReply::NotATopic);
    assert_eq!(parse_quiz_reply("<think>not a topic</think>\n null \n").unwrap(), QuizReply::NotATopic);
  }

  #[test]
  fn reasoning_and_chatter_are_stripped() {
    let raw = format!("<think>{{\"draft\": true}}</think>Here you go:\n{}\nEnjoy!", QUIZ_JSON);
    match parse_quiz_reply(&raw).unwrap() {
      QuizReply::Quiz(q) => {
        assert_eq!(q.subject, "Colors");
        assert_eq!(q.questions[0].answer, AnswerLetter::B);
      }
      other => panic!("unexpected reply {:?}", other),
    }
  }

  #[test]
  fn fenced_reply_is_accepted() {
    let raw = format!("```json\n{}\n```", QUIZ_JSON);
    assert!(matches!(parse_quiz_reply(&raw), Ok(QuizReply::Quiz(_))));
  }

  #[test]
  fn garbage_is_a_parse_error() {
    assert!(parse_quiz_reply("I cannot do that").is_err());
    assert!(parse_quiz_reply("{\"subject\": 3}").is_err());
  }

  #[test]
  fn openai_error_body_is_unwrapped() {
    let body = r#"{"error":{"message":"Invalid API key","type":"auth"}}"#;
    assert_eq!(extract_openai_error(body).as_deref(), Some("Invalid API key"));
    assert_eq!(extract_openai_error("<html>"), None);
  }
}
