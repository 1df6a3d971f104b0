//! Duplicate guard: decides whether a quiz is already present among a user's saved quizzes.
//!
//! Pure decision functions. Callers fetch the candidates (same owner, same subject)
//! and only write when the guard says no.

use crate::domain::{Quiz, SavedQuiz};
use crate::signature::{compute_signature, QuizSignature};

pub fn is_duplicate<'a, I>(candidate: &Quiz, existing: I) -> bool
where
  I: IntoIterator<Item = &'a Quiz>,
{
  contains_signature(&compute_signature(candidate), existing)
}

/// Same as `is_duplicate` for callers that already hold the candidate's signature.
pub fn contains_signature<'a, I>(signature: &QuizSignature, existing: I) -> bool
where
  I: IntoIterator<Item = &'a Quiz>,
{
  existing.into_iter().any(|q| &compute_signature(q) == signature)
}

/// The saved record holding the quiz with `signature`, if any.
pub fn matching_record<'a, I>(signature: &QuizSignature, saved: I) -> Option<&'a SavedQuiz>
where
  I: IntoIterator<Item = &'a SavedQuiz>,
{
  saved.into_iter().find(|s| &compute_signature(&s.quiz) == signature)
}
