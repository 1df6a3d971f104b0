//! Error taxonomy for quiz operations and its rendering as user-facing feedback.
//!
//! Nothing here is fatal: every error ends up as a dismissible feedback banner
//! with a severity and an HTTP status.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};

use crate::protocol::{FeedbackOut, Severity, WorkspaceOut};

/// Failures of the library (persistence collaborator).
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
  #[error("quiz not found")]
  NotFound,
  #[error("an identical quiz is already saved as {existing_id}")]
  DuplicateSignature { existing_id: String },
  #[error("library is full ({limit} quizzes)")]
  QuotaExceeded { limit: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum QuizError {
  #[error("Please enter a subject first.")]
  EmptyTopic,
  #[error("\"{0}\" is not a valid quiz topic. Try a different subject.")]
  TopicRejected(String),
  #[error("I couldn't understand the quiz data I received. Please try again.")]
  MalformedQuiz(String),
  #[error("{0}")]
  Generation(String),
  #[error("Error saving quiz: {0}")]
  Persistence(StoreError),
  #[error("I couldn't confirm your session. Please log in again.")]
  NotAuthenticated,
  #[error("There is no active quiz. Generate or load one first.")]
  NoActiveQuiz,
  #[error("Question {index} does not exist (the quiz has {count} questions).")]
  QuestionOutOfRange { index: usize, count: usize },
  #[error("\"{0}\" is not an option. Pick A, B, C or D.")]
  InvalidLetter(String),
  #[error("Unable to find that quiz.")]
  NotFound,
  #[error("This quiz is not public or doesn't exist.")]
  NotPublic,
  #[error("A quiz is already being generated. Please wait for it to finish.")]
  GenerationInProgress,
}

impl From<StoreError> for QuizError {
  fn from(e: StoreError) -> Self {
    match e {
      StoreError::NotFound => QuizError::NotFound,
      other => QuizError::Persistence(other),
    }
  }
}

impl QuizError {
  pub fn severity(&self) -> Severity {
    match self {
      QuizError::EmptyTopic | QuizError::TopicRejected(_) | QuizError::GenerationInProgress => Severity::Info,
      _ => Severity::Error,
    }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      QuizError::EmptyTopic | QuizError::QuestionOutOfRange { .. } | QuizError::InvalidLetter(_) => {
        StatusCode::BAD_REQUEST
      }
      QuizError::TopicRejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
      QuizError::MalformedQuiz(_) | QuizError::Generation(_) => StatusCode::BAD_GATEWAY,
      QuizError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
      QuizError::NotAuthenticated => StatusCode::UNAUTHORIZED,
      QuizError::NoActiveQuiz | QuizError::GenerationInProgress => StatusCode::CONFLICT,
      QuizError::NotFound | QuizError::NotPublic => StatusCode::NOT_FOUND,
    }
  }

  pub fn feedback(&self) -> FeedbackOut {
    FeedbackOut::new(self.severity(), self.to_string())
  }
}

impl IntoResponse for QuizError {
  fn into_response(self) -> Response {
    let body = WorkspaceOut { feedback: Some(self.feedback()), quiz: None };
    (self.status(), Json(body)).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rejections_are_informational() {
    assert_eq!(QuizError::EmptyTopic.severity(), Severity::Info);
    assert_eq!(QuizError::TopicRejected("asdf".into()).severity(), Severity::Info);
    assert_eq!(QuizError::Generation("timeout".into()).severity(), Severity::Error);
    assert_eq!(QuizError::NotAuthenticated.status(), StatusCode::UNAUTHORIZED);
  }

  #[test]
  fn rejection_message_names_the_topic() {
    let msg = QuizError::TopicRejected("asdf".into()).to_string();
    assert!(msg.contains("\"asdf\" is not a valid quiz topic"));
  }

  #[test]
  fn store_not_found_maps_to_not_found() {
    assert!(matches!(QuizError::from(StoreError::NotFound), QuizError::NotFound));
    assert!(matches!(
      QuizError::from(StoreError::QuotaExceeded { limit: 1 }),
      QuizError::Persistence(StoreError::QuotaExceeded { limit: 1 })
    ));
  }
}
