//! Loading application configuration (prompts, generation knobs, library policy,
//! optional local quiz bank) from TOML.
//!
//! See `AppConfig` for the expected schema. Every section is optional.

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::Quiz;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub generation: GenerationCfg,
  #[serde(default)]
  pub library: LibraryCfg,
  /// Local quiz bank, served when no model is configured.
  #[serde(default)]
  pub quizzes: Vec<Quiz>,
}

/// Prompts used by the model client.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub system: String,
  /// `{topic}` is replaced with the trimmed user prompt.
  pub user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      system: QUIZ_SYSTEM_PROMPT.trim().into(),
      user_template: "{topic}".into(),
    }
  }
}

const QUIZ_SYSTEM_PROMPT: &str = r#"
You are an AI that generates multiple-choice quizzes (MCQs).

You must respond with ONLY a valid JSON object: no extra text, explanations, or tags.
Do NOT include <think>, <thought>, <analysis>, or any reasoning text. If you must reason, do it silently.

If the provided request is invalid or cannot reasonably produce a quiz topic, respond with:
null

Only return null if you are certain that the input is not a valid quiz topic.

Each question must:
- Have exactly 4 options labeled A, B, C, D (in order).
- Include only one correct answer, indicated by its letter (e.g. "A", "B", "C", or "D").
- NOT include the answer text itself inside the "answer" field.
- Ensure the correct option text appears within "options" array, but "answer" only contains the letter.
- Randomize the answers

Output format:
{
  "subject": "<subject>",
  "questions": [
    {
      "question": "<string>",
      "options": ["<string>", "<string>", "<string>", "<string>"],
      "answer": "<A|B|C|D>"
    }
  ]
}
"#;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GenerationCfg {
  pub temperature: f32,
  pub top_p: f32,
  pub max_tokens: u32,
  pub timeout_secs: u64,
}

impl Default for GenerationCfg {
  fn default() -> Self {
    Self { temperature: 0.6, top_p: 0.95, max_tokens: 2048, timeout_secs: 30 }
  }
}

/// How the library matches subjects when collecting duplicate candidates.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubjectMatch {
  /// Byte-for-byte subject equality.
  Exact,
  /// Trimmed, lower-cased subject equality (same normalization as the signature).
  #[default]
  Normalized,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LibraryCfg {
  pub recent_limit: usize,
  pub max_quizzes_per_owner: usize,
  pub subject_match: SubjectMatch,
}

impl Default for LibraryCfg {
  fn default() -> Self {
    Self { recent_limit: 30, max_quizzes_per_owner: 500, subject_match: SubjectMatch::Normalized }
  }
}

pub fn parse_config(s: &str) -> Result<AppConfig, toml::de::Error> {
  toml::from_str::<AppConfig>(s)
}

/// Attempt to load `AppConfig` from QUIZ_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("QUIZ_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_config(&s) {
      Ok(cfg) => {
        info!(target: "quizcraft_backend", %path, bank = cfg.quizzes.len(), "Loaded config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "quizcraft_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "quizcraft_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
