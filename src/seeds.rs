//! Built-in quiz bank. Keeps the app usable without a model or external config.

use crate::domain::{AnswerLetter, Question, Quiz};

fn q(question: &str, options: [&str; 4], answer: AnswerLetter) -> Question {
  Question {
    question: question.into(),
    options: options.iter().map(|o| o.to_string()).collect(),
    answer,
  }
}

pub fn seed_quizzes() -> Vec<Quiz> {
  vec![
    Quiz {
      subject: "Colors".into(),
      questions: vec![
        q("What color is a clear daytime sky?", ["Red", "Blue", "Green", "Yellow"], AnswerLetter::B),
        q("Mixing blue and yellow paint gives?", ["Purple", "Orange", "Green", "Brown"], AnswerLetter::C),
        q("Which color has the longest visible wavelength?", ["Red", "Violet", "Blue", "Green"], AnswerLetter::A),
      ],
    },
    Quiz {
      subject: "Photosynthesis".into(),
      questions: vec![
        q("Which gas do plants absorb for photosynthesis?", ["Oxygen", "Nitrogen", "Carbon dioxide", "Helium"], AnswerLetter::C),
        q("Where does photosynthesis mainly happen?", ["Mitochondria", "Nucleus", "Ribosome", "Chloroplast"], AnswerLetter::D),
        q("Which pigment captures light energy?", ["Chlorophyll", "Melanin", "Hemoglobin", "Keratin"], AnswerLetter::A),
        q("What sugar is produced?", ["Sucrose", "Glucose", "Lactose", "Maltose"], AnswerLetter::B),
      ],
    },
  ]
}
