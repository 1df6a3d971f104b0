//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Generating a quiz and making it the user's active quiz
//!   - Locking answers and scoring the active quiz
//!   - Saving through the duplicate guard, loading saved quizzes
//!   - Library listing, visibility and deletion
//!   - Public (shared) quiz views and stateless scoring
//!
//! Workspace locks are never held across a collaborator call.

use tracing::{debug, info, instrument, warn};

use crate::dedup::{is_duplicate, matching_record};
use crate::domain::{AnswerLetter, Quiz};
use crate::error::{QuizError, StoreError};
use crate::openai::QuizReply;
use crate::protocol::{FeedbackOut, LibraryOut, PublicSelection, QuizView, SavedQuizSummary, WorkspaceOut};
use crate::session::AnswerSession;
use crate::signature::QuizSignature;
use crate::state::AppState;

fn out(feedback: Option<FeedbackOut>, quiz: Option<QuizView>) -> WorkspaceOut {
  WorkspaceOut { feedback, quiz }
}

/// Validate a user-supplied selection against the quiz before it reaches the session.
fn checked_selection(quiz: &Quiz, index: usize, letter: &str) -> Result<AnswerLetter, QuizError> {
  let count = quiz.question_count();
  if index >= count {
    return Err(QuizError::QuestionOutOfRange { index, count });
  }
  AnswerLetter::parse(letter).ok_or_else(|| QuizError::InvalidLetter(letter.to_string()))
}

#[instrument(level = "info", skip(state, prompt), fields(%user, prompt_len = prompt.len()))]
pub async fn generate_quiz(state: &AppState, user: &str, prompt: &str) -> Result<WorkspaceOut, QuizError> {
  let topic = prompt.trim();
  if topic.is_empty() {
    return Err(QuizError::EmptyTopic);
  }

  let ticket = {
    let mut workspaces = state.workspaces.write().await;
    let ws = workspaces.entry(user.to_string()).or_default();
    let ticket = ws.begin_generation(state.generation_stale_after()).ok_or(QuizError::GenerationInProgress)?;
    ws.active = None;
    ticket
  };

  let result = state.generate(topic).await;

  let mut workspaces = state.workspaces.write().await;
  let ws = workspaces.entry(user.to_string()).or_default();
  if !ws.finish_generation(ticket) {
    warn!(target: "quiz", %user, %topic, "Generation finished after a newer request took over; result dropped");
    return Err(QuizError::GenerationInProgress);
  }

  match result? {
    QuizReply::Quiz(quiz) => {
      let active = ws.activate(quiz, None);
      info!(target: "quiz", %user, subject = %active.quiz.subject, questions = active.quiz.question_count(), "Quiz generated and activated");
      Ok(out(Some(FeedbackOut::success("Here is your freshly generated quiz. Have fun!")), Some(active.view())))
    }
    QuizReply::NotATopic => {
      info!(target: "quiz", %user, %topic, "Topic declined");
      Err(QuizError::TopicRejected(topic.to_string()))
    }
  }
}

#[instrument(level = "debug", skip(state), fields(%user))]
pub async fn active_quiz(state: &AppState, user: &str) -> WorkspaceOut {
  let workspaces = state.workspaces.read().await;
  out(None, workspaces.get(user).and_then(|ws| ws.view()))
}

#[instrument(level = "info", skip(state), fields(%user))]
pub async fn select_answer(state: &AppState, user: &str, index: usize, letter: &str) -> Result<WorkspaceOut, QuizError> {
  let mut workspaces = state.workspaces.write().await;
  let active = workspaces
    .get_mut(user)
    .and_then(|ws| ws.active.as_mut())
    .ok_or(QuizError::NoActiveQuiz)?;

  let letter = checked_selection(&active.quiz, index, letter)?;
  if active.session.is_locked(index) {
    debug!(target: "quiz", %user, index, "Answer already locked; selection ignored");
  } else {
    active.session = active.session.select_answer(index, letter.as_str());
    info!(target: "quiz", %user, index, %letter, correct = letter == active.quiz.questions[index].answer, "Answer locked");
  }
  Ok(out(None, Some(active.view())))
}

/// Save the active quiz unless an identical one is already in the user's library.
/// On failure the active quiz and its answers stay as they were.
#[instrument(level = "info", skip(state), fields(%user))]
pub async fn save_active_quiz(state: &AppState, user: &str) -> Result<WorkspaceOut, QuizError> {
  let (quiz, signature) = {
    let workspaces = state.workspaces.read().await;
    let active = workspaces.get(user).and_then(|ws| ws.active.as_ref()).ok_or(QuizError::NoActiveQuiz)?;
    if active.is_saved {
      return Ok(out(Some(FeedbackOut::info("This quiz is already in your library.")), Some(active.view())));
    }
    (active.quiz.clone(), active.signature.clone())
  };

  let existing = state.library.find_by_owner_and_subject(user, &quiz.subject).await?;
  let (feedback, saved_id) = if is_duplicate(&quiz, existing.iter().map(|s| &s.quiz)) {
    let existing_id = matching_record(&signature, &existing).map(|s| s.id.clone());
    info!(target: "quiz", %user, subject = %quiz.subject, ?existing_id, "Duplicate quiz; not saved again");
    (FeedbackOut::info("This quiz is already in your library."), existing_id)
  } else {
    match state.library.insert(user, quiz).await {
      Ok(saved) => (FeedbackOut::success("Quiz saved successfully. Find it anytime in your library."), Some(saved.id)),
      Err(StoreError::DuplicateSignature { existing_id }) => {
        warn!(target: "quiz", %user, %existing_id, "Concurrent save of the same quiz caught by the library");
        (FeedbackOut::info("This quiz is already in your library."), Some(existing_id))
      }
      Err(e) => {
        warn!(target: "quiz", %user, error = %e, "Save failed");
        return Err(QuizError::Persistence(e));
      }
    }
  };

  let mut workspaces = state.workspaces.write().await;
  let view = match workspaces.get_mut(user).and_then(|ws| ws.active_with_signature(&signature)) {
    Some(active) => {
      if let Some(id) = saved_id {
        active.mark_saved(id);
      }
      Some(active.view())
    }
    None => workspaces.get(user).and_then(|ws| ws.view()),
  };
  Ok(out(Some(feedback), view))
}

#[instrument(level = "info", skip(state), fields(%user))]
pub async fn load_saved_quiz(state: &AppState, user: &str, quiz_id: &str) -> Result<WorkspaceOut, QuizError> {
  {
    let mut workspaces = state.workspaces.write().await;
    if let Some(active) = workspaces
      .get_mut(user)
      .and_then(|ws| ws.active.as_mut())
      .filter(|a| a.saved_quiz_id.as_deref() == Some(quiz_id))
    {
      active.is_saved = true;
      return Ok(out(None, Some(active.view())));
    }
  }

  let saved = state.library.get_owned(user, quiz_id).await?;
  let mut workspaces = state.workspaces.write().await;
  let ws = workspaces.entry(user.to_string()).or_default();
  let active = ws.activate(saved.quiz, Some(saved.id));
  let feedback = FeedbackOut::success(format!("Loaded \"{}\" from your library.", active.quiz.subject));
  Ok(out(Some(feedback), Some(active.view())))
}

/// Recent saved quizzes, optionally filtered by a case-insensitive subject substring.
#[instrument(level = "debug", skip(state), fields(%user))]
pub async fn library(state: &AppState, user: &str, filter: Option<&str>, limit: Option<usize>) -> LibraryOut {
  let limit = limit.unwrap_or_else(|| state.library.recent_limit());
  let recent = state.library.list_recent(user, limit).await;
  let total = recent.len();
  let needle = filter.map(|f| f.trim().to_lowercase()).unwrap_or_default();
  let quizzes = recent
    .iter()
    .filter(|s| needle.is_empty() || s.quiz.subject.to_lowercase().contains(&needle))
    .map(SavedQuizSummary::from)
    .collect();
  LibraryOut { total, quizzes }
}

#[instrument(level = "info", skip(state), fields(%user))]
pub async fn set_visibility(
  state: &AppState,
  user: &str,
  quiz_id: &str,
  public: bool,
) -> Result<(FeedbackOut, SavedQuizSummary), QuizError> {
  let saved = state.library.set_visibility(user, quiz_id, public).await?;
  let message = if public { "Quiz is now public. Anyone with the link can take it." } else { "Quiz is now private." };
  Ok((FeedbackOut::success(message), SavedQuizSummary::from(&saved)))
}

#[instrument(level = "info", skip(state), fields(%user))]
pub async fn delete_saved_quiz(state: &AppState, user: &str, quiz_id: &str) -> Result<FeedbackOut, QuizError> {
  let removed = state.library.delete(user, quiz_id).await?;
  let removed_signature = QuizSignature::compute(&removed.quiz);

  let mut workspaces = state.workspaces.write().await;
  if let Some(active) = workspaces
    .get_mut(user)
    .and_then(|ws| ws.active.as_mut())
    .filter(|a| a.saved_quiz_id.as_deref() == Some(quiz_id) || a.signature == removed_signature)
  {
    active.mark_unsaved();
  }
  Ok(FeedbackOut::success("Quiz deleted."))
}

#[instrument(level = "info", skip(state))]
pub async fn public_quiz(state: &AppState, share_id: &str) -> Result<QuizView, QuizError> {
  let saved = state.library.find_public(share_id).await.ok_or(QuizError::NotPublic)?;
  Ok(QuizView::render(&saved.quiz, &AnswerSession::for_quiz(&saved.quiz)))
}

/// Replay selections against a shared quiz. Nothing is stored.
#[instrument(level = "info", skip(state, selections), fields(selections = selections.len()))]
pub async fn score_public(state: &AppState, share_id: &str, selections: &[PublicSelection]) -> Result<QuizView, QuizError> {
  let saved = state.library.find_public(share_id).await.ok_or(QuizError::NotPublic)?;
  let quiz = &saved.quiz;
  let mut session = AnswerSession::for_quiz(quiz);
  for sel in selections {
    let letter = checked_selection(quiz, sel.index, &sel.letter)?;
    session = session.select_answer(sel.index, letter.as_str());
  }
  Ok(QuizView::render(quiz, &session))
}
