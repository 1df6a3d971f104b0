//! Domain models: answer letters, questions, quizzes and saved library records.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::QuizError;

/// Every question carries exactly this many options, labeled A..D in order.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// Label of one of the four options. The answer of a question is always a label, never option text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AnswerLetter {
  A,
  B,
  C,
  D,
}

impl AnswerLetter {
  pub const ALL: [AnswerLetter; OPTIONS_PER_QUESTION] =
    [AnswerLetter::A, AnswerLetter::B, AnswerLetter::C, AnswerLetter::D];

  /// Parse a label, ignoring surrounding whitespace and case.
  pub fn parse(s: &str) -> Option<Self> {
    match s.trim().to_uppercase().as_str() {
      "A" => Some(AnswerLetter::A),
      "B" => Some(AnswerLetter::B),
      "C" => Some(AnswerLetter::C),
      "D" => Some(AnswerLetter::D),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      AnswerLetter::A => "A",
      AnswerLetter::B => "B",
      AnswerLetter::C => "C",
      AnswerLetter::D => "D",
    }
  }

  /// Position of the labeled option inside `Question::options`.
  pub fn index(&self) -> usize {
    match self {
      AnswerLetter::A => 0,
      AnswerLetter::B => 1,
      AnswerLetter::C => 2,
      AnswerLetter::D => 3,
    }
  }
}

impl fmt::Display for AnswerLetter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl TryFrom<String> for AnswerLetter {
  type Error = String;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    AnswerLetter::parse(&value).ok_or_else(|| format!("answer must be one of A, B, C, D (got {:?})", value))
  }
}

impl From<AnswerLetter> for String {
  fn from(letter: AnswerLetter) -> Self {
    letter.as_str().to_string()
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
  pub question: String,
  pub options: Vec<String>,
  pub answer: AnswerLetter,
}

impl Question {
  /// Text of the option the answer label points at.
  pub fn correct_option(&self) -> Option<&str> {
    self.options.get(self.answer.index()).map(String::as_str)
  }
}

/// A subject plus an ordered list of questions. Order is part of the quiz identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
  pub subject: String,
  pub questions: Vec<Question>,
}

impl Quiz {
  pub fn question_count(&self) -> usize {
    self.questions.len()
  }

  /// Boundary validation applied to every quiz entering the system
  /// (model replies, config bank entries).
  pub fn validate(&self) -> Result<(), QuizError> {
    if self.subject.trim().is_empty() {
      return Err(QuizError::MalformedQuiz("subject is empty".into()));
    }
    if self.questions.is_empty() {
      return Err(QuizError::MalformedQuiz("quiz has no questions".into()));
    }
    for (i, q) in self.questions.iter().enumerate() {
      if q.question.trim().is_empty() {
        return Err(QuizError::MalformedQuiz(format!("question {} has no text", i + 1)));
      }
      if q.options.len() != OPTIONS_PER_QUESTION {
        return Err(QuizError::MalformedQuiz(format!(
          "question {} has {} options, expected {}",
          i + 1,
          q.options.len(),
          OPTIONS_PER_QUESTION
        )));
      }
    }
    Ok(())
  }
}

/// A quiz persisted in a user's library.
#[derive(Clone, Debug, Serialize)]
pub struct SavedQuiz {
  pub id: String,
  #[serde(skip)]
  pub owner_id: String,
  #[serde(flatten)]
  pub quiz: Quiz,
  pub created_at: DateTime<Utc>,
  pub is_public: bool,
  pub share_id: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn colors_quiz() -> Quiz {
    Quiz {
      subject: "Colors".into(),
      questions: vec![Question {
        question: "Sky?".into(),
        options: vec!["Red".into(), "Blue".into(), "Green".into(), "Yellow".into()],
        answer: AnswerLetter::B,
      }],
    }
  }

  #[test]
  fn answer_letter_parses_loosely() {
    assert_eq!(AnswerLetter::parse(" b "), Some(AnswerLetter::B));
    assert_eq!(AnswerLetter::parse("D"), Some(AnswerLetter::D));
    assert_eq!(AnswerLetter::parse("E"), None);
    assert_eq!(AnswerLetter::parse("Blue"), None);
  }

  #[test]
  fn quiz_deserializes_from_model_json() {
    let json = r#"{
      "subject": "Colors",
      "questions": [
        { "question": "Sky?", "options": ["Red", "Blue", "Green", "Yellow"], "answer": "b" }
      ]
    }"#;
    let quiz: Quiz = serde_json::from_str(json).unwrap();
    assert_eq!(quiz, colors_quiz());
    assert_eq!(quiz.questions[0].correct_option(), Some("Blue"));
    assert!(quiz.validate().is_ok());
  }

  #[test]
  fn answer_text_instead_of_label_is_rejected() {
    let json = r#"{"subject":"Colors","questions":[{"question":"Sky?","options":["Red","Blue","Green","Yellow"],"answer":"Blue"}]}"#;
    assert!(serde_json::from_str::<Quiz>(json).is_err());
  }

  #[test]
  fn validate_rejects_malformed_quizzes() {
    let mut q = colors_quiz();
    q.subject = "   ".into();
    assert!(matches!(q.validate(), Err(QuizError::MalformedQuiz(_))));

    let mut q = colors_quiz();
    q.questions.clear();
    assert!(matches!(q.validate(), Err(QuizError::MalformedQuiz(_))));

    let mut q = colors_quiz();
    q.questions[0].options.pop();
    assert!(matches!(q.validate(), Err(QuizError::MalformedQuiz(_))));
  }

  #[test]
  fn letter_serializes_upper_case() {
    let json = serde_json::to_string(&AnswerLetter::C).unwrap();
    assert_eq!(json, "\"C\"");
  }
}
