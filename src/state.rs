//! Application state: library, per-user workspaces, prompts, model client and
//! the local quiz bank.
//!
//! Generation policy: ask the model when OPENAI_API_KEY is set. Otherwise serve
//! from the local bank (config `[[quizzes]]` first, then built-in seeds), matched by
//! normalized subject; unknown topics are declined the same way the model declines them.

use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::sync::RwLock;
use tracing::{error, info, instrument, warn};

use crate::config::{load_config_from_env, AppConfig, GenerationCfg, Prompts};
use crate::domain::Quiz;
use crate::error::QuizError;
use crate::openai::{parse_quiz_reply, OpenAI, QuizReply};
use crate::seeds::seed_quizzes;
use crate::signature::normalize_text;
use crate::store::Library;
use crate::workspace::Workspace;

pub struct AppState {
  pub library: Library,
  pub workspaces: Arc<RwLock<HashMap<String, Workspace>>>,
  pub bank: HashMap<String, Quiz>,
  pub openai: Option<OpenAI>,
  pub prompts: Prompts,
  pub generation: GenerationCfg,
}

impl AppState {
  /// Build state from env: load config, init the model client.
  #[instrument(level = "info", skip_all)]
  pub fn new() -> Self {
    let cfg = load_config_from_env().unwrap_or_default();
    let openai = OpenAI::from_env(Duration::from_secs(cfg.generation.timeout_secs));
    if let Some(oa) = &openai {
      info!(target: "quizcraft_backend", base_url = %oa.base_url, model = %oa.model, "Model generation enabled.");
    } else {
      info!(target: "quizcraft_backend", "Model generation disabled (no OPENAI_API_KEY). Serving the local quiz bank.");
    }
    Self::from_config(cfg, openai)
  }

  pub fn from_config(cfg: AppConfig, openai: Option<OpenAI>) -> Self {
    let mut bank = HashMap::<String, Quiz>::new();

    // Config entries take precedence over built-in seeds with the same subject.
    for quiz in cfg.quizzes {
      if let Err(e) = quiz.validate() {
        error!(target: "quiz", subject = %quiz.subject, error = %e, "Skipping bank quiz: malformed");
        continue;
      }
      bank.insert(normalize_text(&quiz.subject), quiz);
    }
    for quiz in seed_quizzes() {
      bank.entry(normalize_text(&quiz.subject)).or_insert(quiz);
    }
    info!(target: "quiz", bank = bank.len(), "Local quiz bank ready");

    Self {
      library: Library::new(cfg.library),
      workspaces: Arc::new(RwLock::new(HashMap::new())),
      bank,
      openai,
      prompts: cfg.prompts,
      generation: cfg.generation,
    }
  }

  /// How long an unfinished generation blocks the next one: the model timeout plus slack.
  pub fn generation_stale_after(&self) -> Duration {
    Duration::from_secs(self.generation.timeout_secs + 5)
  }

  pub fn generator_name(&self) -> &'static str {
    if self.openai.is_some() { "model" } else { "local_bank" }
  }

  /// Produce a validated quiz for `topic`, or the "not a valid topic" signal.
  #[instrument(level = "info", skip(self), fields(generator = self.generator_name()))]
  pub async fn generate(&self, topic: &str) -> Result<QuizReply, QuizError> {
    let reply = if let Some(oa) = &self.openai {
      let raw = oa
        .generate_quiz(&self.prompts, &self.generation, topic)
        .await
        .map_err(QuizError::Generation)?;
      parse_quiz_reply(&raw).map_err(|e| {
        warn!(target: "quiz", %topic, error = %e, "Model reply could not be parsed");
        QuizError::MalformedQuiz(e)
      })?
    } else {
      match self.bank.get(&normalize_text(topic)) {
        Some(quiz) => QuizReply::Quiz(quiz.clone()),
        None => QuizReply::NotATopic,
      }
    };

    if let QuizReply::Quiz(quiz) = &reply {
      quiz.validate()?;
    }
    Ok(reply)
  }
}
