//! Quiz signatures: a normalized rendering of a quiz used as the duplicate key.
//!
//! The signature is a plain concatenation, not a hash. Subject, question text and
//! options are trimmed and lower-cased, answers are upper-case letters, and question
//! order is preserved, so two quizzes with the same questions in a different order
//! are different quizzes.

use crate::domain::Quiz;

const SUBJECT_SEP: &str = "::";
const QUESTION_SEP: &str = "||";
const FIELD_SEP: &str = "|~|";

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QuizSignature(String);

impl QuizSignature {
  pub fn compute(quiz: &Quiz) -> Self {
    let questions = quiz
      .questions
      .iter()
      .map(|q| {
        let mut fields = Vec::with_capacity(2 + q.options.len());
        fields.push(normalize_text(&q.question));
        fields.push(q.answer.as_str().to_string());
        fields.extend(q.options.iter().map(|o| normalize_text(o)));
        fields.join(FIELD_SEP)
      })
      .collect::<Vec<_>>()
      .join(QUESTION_SEP);

    QuizSignature(format!("{}{}{}", normalize_text(&quiz.subject), SUBJECT_SEP, questions))
  }
}

pub fn compute_signature(quiz: &Quiz) -> QuizSignature {
  QuizSignature::compute(quiz)
}

/// Trim + lower-case. Also used by the library when matching subjects.
pub fn normalize_text(s: &str) -> String {
  s.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{AnswerLetter, Question};

  fn question(text: &str, options: [&str; 4], answer: AnswerLetter) -> Question {
    Question {
      question: text.into(),
      options: options.iter().map(|o| o.to_string()).collect(),
      answer,
    }
  }

  fn history(first: &str) -> Quiz {
    Quiz {
      subject: "History".into(),
      questions: vec![
        question(first, ["1066", "1215", "1492", "1776"], AnswerLetter::C),
        question("Who?", ["Caesar", "Napoleon", "Cleopatra", "Ghandi"], AnswerLetter::A),
      ],
    }
  }

  #[test]
  fn case_and_surrounding_whitespace_are_ignored() {
    let a = history(" What year? ");
    let b = history("what year?");
    assert_eq!(compute_signature(&a), compute_signature(&b));

    let mut c = history("What year?");
    c.subject = "  hIsToRy ".into();
    c.questions[1].options[2] = " CLEOPATRA".into();
    assert_eq!(compute_signature(&a), compute_signature(&c));
  }

  #[test]
  fn question_order_matters() {
    let a = history("What year?");
    let mut b = a.clone();
    b.questions.reverse();
    assert_ne!(compute_signature(&a), compute_signature(&b));
  }

  #[test]
  fn option_order_and_answer_matter() {
    let a = history("What year?");
    let mut b = a.clone();
    b.questions[0].options.swap(0, 1);
    assert_ne!(compute_signature(&a), compute_signature(&b));

    let mut c = a.clone();
    c.questions[0].answer = AnswerLetter::D;
    assert_ne!(compute_signature(&a), compute_signature(&c));
  }

  #[test]
  fn inner_whitespace_is_significant() {
    let a = history("What year?");
    let b = history("What  year?");
    assert_ne!(compute_signature(&a), compute_signature(&b));
  }

  #[test]
  fn layout_uses_subject_and_field_separators() {
    let quiz = Quiz {
      subject: " Colors ".into(),
      questions: vec![question("Sky?", ["Red", "Blue", "Green", "Yellow"], AnswerLetter::B)],
    };
    assert_eq!(compute_signature(&quiz).0, "colors::sky?|~|B|~|red|~|blue|~|green|~|yellow");
  }
}
