//! Answer session for the active quiz.
//!
//! Each question index is either unanswered or locked to the first letter chosen.
//! Transitions return a new session; the caller decides where it lives.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{AnswerLetter, Quiz};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnswerSession {
  question_count: usize,
  answers: BTreeMap<usize, String>,
}

/// How one option of an answered (or unanswered) question should be presented.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionState {
  /// Question not answered yet; the option is still selectable.
  Unanswered,
  /// The correct option, revealed once the question is locked.
  Correct,
  /// The option the user picked, when it is not the correct one.
  Wrong,
  Dimmed,
}

impl AnswerSession {
  pub fn new(question_count: usize) -> Self {
    Self { question_count, answers: BTreeMap::new() }
  }

  pub fn for_quiz(quiz: &Quiz) -> Self {
    Self::new(quiz.question_count())
  }

  /// Record `letter` for `index` unless the index is already locked (first choice wins).
  ///
  /// The letter is stored as given; validating it is the caller's job.
  /// Panics if `index` is outside the quiz.
  #[must_use]
  pub fn select_answer(&self, index: usize, letter: impl Into<String>) -> Self {
    assert!(
      index < self.question_count,
      "question index {} out of range for a session of {} questions",
      index,
      self.question_count
    );
    let mut next = self.clone();
    next.answers.entry(index).or_insert_with(|| letter.into());
    next
  }

  pub fn answer(&self, index: usize) -> Option<&str> {
    self.answers.get(&index).map(String::as_str)
  }

  pub fn is_locked(&self, index: usize) -> bool {
    self.answers.contains_key(&index)
  }

  pub fn answered_count(&self) -> usize {
    self.answers.len()
  }

  /// Number of locked answers equal to the quiz's answer letter. Unanswered questions count 0.
  pub fn score(&self, quiz: &Quiz) -> usize {
    quiz
      .questions
      .iter()
      .enumerate()
      .filter(|(i, q)| self.answer(*i) == Some(q.answer.as_str()))
      .count()
  }

  pub fn is_complete(&self, quiz: &Quiz) -> bool {
    (0..quiz.question_count()).all(|i| self.is_locked(i))
  }

  pub fn option_state(&self, quiz: &Quiz, index: usize, letter: AnswerLetter) -> OptionState {
    let Some(selected) = self.answer(index) else {
      return OptionState::Unanswered;
    };
    let Some(question) = quiz.questions.get(index) else {
      return OptionState::Unanswered;
    };
    if letter == question.answer {
      OptionState::Correct
    } else if selected == letter.as_str() {
      OptionState::Wrong
    } else {
      OptionState::Dimmed
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::Question;

  fn colors() -> Quiz {
    Quiz {
      subject: "Colors".into(),
      questions: vec![Question {
        question: "Sky?".into(),
        options: vec!["Red".into(), "Blue".into(), "Green".into(), "Yellow".into()],
        answer: AnswerLetter::B,
      }],
    }
  }

  fn three_questions() -> Quiz {
    let mut quiz = colors();
    let mut grass = quiz.questions[0].clone();
    grass.question = "Grass?".into();
    grass.answer = AnswerLetter::C;
    let mut sun = quiz.questions[0].clone();
    sun.question = "Sun?".into();
    sun.answer = AnswerLetter::D;
    quiz.questions.push(grass);
    quiz.questions.push(sun);
    quiz
  }

  #[test]
  fn correct_answer_scores_and_completes() {
    let quiz = colors();
    let session = AnswerSession::for_quiz(&quiz).select_answer(0, "B");
    assert_eq!(session.answer(0), Some("B"));
    assert_eq!(session.score(&quiz), 1);
    assert!(session.is_complete(&quiz));
  }

  #[test]
  fn first_choice_is_locked_in() {
    let quiz = colors();
    let session = AnswerSession::for_quiz(&quiz).select_answer(0, "A");
    let again = session.select_answer(0, "C");
    assert_eq!(again, session);
    assert_eq!(again.answer(0), Some("A"));
    assert_eq!(again.score(&quiz), 0);
  }

  #[test]
  fn select_is_idempotent_per_index() {
    let quiz = three_questions();
    let empty = AnswerSession::for_quiz(&quiz);
    let once = empty.select_answer(1, "C");
    let twice = empty.select_answer(1, "C").select_answer(1, "A");
    assert_eq!(once, twice);
  }

  #[test]
  fn score_is_zero_when_empty_and_grows_with_correct_answers() {
    let quiz = three_questions();
    let mut session = AnswerSession::for_quiz(&quiz);
    assert_eq!(session.score(&quiz), 0);
    assert!(!session.is_complete(&quiz));

    let mut last = 0;
    for (i, letter) in ["B", "C", "D"].iter().enumerate() {
      session = session.select_answer(i, *letter);
      let score = session.score(&quiz);
      assert!(score >= last);
      last = score;
    }
    assert_eq!(last, 3);
    assert!(session.is_complete(&quiz));
  }

  #[test]
  fn partial_sessions_can_be_scored() {
    let quiz = three_questions();
    let session = AnswerSession::for_quiz(&quiz).select_answer(2, "D").select_answer(0, "A");
    assert_eq!(session.score(&quiz), 1);
    assert_eq!(session.answered_count(), 2);
    assert!(!session.is_complete(&quiz));
  }

  #[test]
  fn letters_are_compared_exactly() {
    let quiz = colors();
    let session = AnswerSession::for_quiz(&quiz).select_answer(0, "b");
    assert_eq!(session.score(&quiz), 0);
  }

  #[test]
  #[should_panic(expected = "out of range")]
  fn out_of_range_index_panics() {
    let quiz = colors();
    let _ = AnswerSession::for_quiz(&quiz).select_answer(1, "A");
  }

  #[test]
  fn option_states_reveal_after_lock() {
    let quiz = colors();
    let session = AnswerSession::for_quiz(&quiz);
    assert_eq!(session.option_state(&quiz, 0, AnswerLetter::B), OptionState::Unanswered);

    let session = session.select_answer(0, "A");
    assert_eq!(session.option_state(&quiz, 0, AnswerLetter::A), OptionState::Wrong);
    assert_eq!(session.option_state(&quiz, 0, AnswerLetter::B), OptionState::Correct);
    assert_eq!(session.option_state(&quiz, 0, AnswerLetter::C), OptionState::Dimmed);
  }
}
