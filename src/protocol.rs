//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{AnswerLetter, Quiz, SavedQuiz};
use crate::session::{AnswerSession, OptionState};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    Generate {
        prompt: String,
    },
    SelectAnswer {
        index: usize,
        letter: String,
    },
    Save,
    LoadSaved {
        #[serde(rename = "quizId")]
        quiz_id: String,
    },
    Active,
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Workspace {
        #[serde(flatten)]
        workspace: WorkspaceOut,
    },
    Error {
        feedback: FeedbackOut,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Error,
    Info,
}

impl Severity {
    pub fn heading(&self) -> &'static str {
        match self {
            Severity::Success => "Success",
            Severity::Error => "Something went wrong",
            Severity::Info => "Heads up",
        }
    }
}

/// Dismissible banner shown after an interaction.
#[derive(Clone, Debug, Serialize)]
pub struct FeedbackOut {
    pub kind: Severity,
    pub heading: &'static str,
    pub message: String,
}

impl FeedbackOut {
    pub fn new(kind: Severity, message: impl Into<String>) -> Self {
        Self { kind, heading: kind.heading(), message: message.into() }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Severity::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }
}

/// Response shared by every workspace operation: optional banner plus the active quiz view.
#[derive(Clone, Debug, Serialize)]
pub struct WorkspaceOut {
    pub feedback: Option<FeedbackOut>,
    pub quiz: Option<QuizView>,
}

#[derive(Clone, Debug, Serialize)]
pub struct OptionOut {
    pub letter: AnswerLetter,
    pub text: String,
    pub state: OptionState,
}

#[derive(Clone, Debug, Serialize)]
pub struct QuestionOut {
    pub index: usize,
    pub question: String,
    pub options: Vec<OptionOut>,
    pub selected: Option<String>,
    /// Only revealed once the question is locked.
    pub correct_answer: Option<AnswerLetter>,
    pub correct_text: Option<String>,
}

/// A quiz rendered against an answer session.
#[derive(Clone, Debug, Serialize)]
pub struct QuizView {
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_quiz_id: Option<String>,
    pub is_saved: bool,
    pub answered: usize,
    pub total: usize,
    pub score: usize,
    pub complete: bool,
    pub questions: Vec<QuestionOut>,
}

impl QuizView {
    pub fn render(quiz: &Quiz, session: &AnswerSession) -> Self {
        let questions = quiz
            .questions
            .iter()
            .enumerate()
            .map(|(index, q)| {
                let options = AnswerLetter::ALL
                    .iter()
                    .zip(q.options.iter())
                    .map(|(letter, text)| OptionOut {
                        letter: *letter,
                        text: text.clone(),
                        state: session.option_state(quiz, index, *letter),
                    })
                    .collect();
                let locked = session.is_locked(index);
                QuestionOut {
                    index,
                    question: q.question.clone(),
                    options,
                    selected: session.answer(index).map(str::to_string),
                    correct_answer: locked.then_some(q.answer),
                    correct_text: locked.then(|| q.correct_option()).flatten().map(str::to_string),
                }
            })
            .collect();

        Self {
            subject: quiz.subject.clone(),
            saved_quiz_id: None,
            is_saved: false,
            answered: session.answered_count(),
            total: quiz.question_count(),
            score: session.score(quiz),
            complete: session.is_complete(quiz),
            questions,
        }
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct GenerateIn {
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct AnswerIn {
    pub index: usize,
    pub letter: String,
}

#[derive(Debug, Deserialize)]
pub struct LibraryQuery {
    pub filter: Option<String>,
    pub limit: Option<usize>,
}

/// Library sidebar entry.
#[derive(Debug, Serialize)]
pub struct SavedQuizSummary {
    pub id: String,
    pub subject: String,
    pub question_count: usize,
    pub created_at: DateTime<Utc>,
    pub is_public: bool,
    pub share_id: Option<String>,
}

impl From<&SavedQuiz> for SavedQuizSummary {
    fn from(s: &SavedQuiz) -> Self {
        Self {
            id: s.id.clone(),
            subject: s.quiz.subject.clone(),
            question_count: s.quiz.question_count(),
            created_at: s.created_at,
            is_public: s.is_public,
            share_id: s.share_id.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LibraryOut {
    pub total: usize,
    pub quizzes: Vec<SavedQuizSummary>,
}

#[derive(Debug, Deserialize)]
pub struct VisibilityIn {
    pub public: bool,
}

#[derive(Debug, Serialize)]
pub struct VisibilityOut {
    pub feedback: FeedbackOut,
    pub quiz: SavedQuizSummary,
}

#[derive(Debug, Serialize)]
pub struct DeletedOut {
    pub feedback: FeedbackOut,
}

#[derive(Debug, Deserialize)]
pub struct PublicSelection {
    pub index: usize,
    pub letter: String,
}

/// Selections replayed in order; the first selection per question wins.
#[derive(Debug, Deserialize)]
pub struct PublicScoreIn {
    #[serde(default)]
    pub answers: Vec<PublicSelection>,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
    pub generator: &'static str,
}
