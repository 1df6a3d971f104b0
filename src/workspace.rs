//! Per-user interaction state: the active quiz with its answer session, and the
//! in-flight generation marker.
//!
//! Activating a quiz always starts from an empty session, so answers from a previous
//! quiz can never be scored against a new one.

use std::time::{Duration, Instant};

use crate::domain::Quiz;
use crate::protocol::QuizView;
use crate::session::AnswerSession;
use crate::signature::QuizSignature;

#[derive(Clone, Debug)]
pub struct ActiveQuiz {
  pub quiz: Quiz,
  pub signature: QuizSignature,
  pub saved_quiz_id: Option<String>,
  pub is_saved: bool,
  pub session: AnswerSession,
}

impl ActiveQuiz {
  pub fn new(quiz: Quiz, saved_quiz_id: Option<String>) -> Self {
    let signature = QuizSignature::compute(&quiz);
    let session = AnswerSession::for_quiz(&quiz);
    let is_saved = saved_quiz_id.is_some();
    Self { quiz, signature, saved_quiz_id, is_saved, session }
  }

  pub fn mark_saved(&mut self, saved_quiz_id: String) {
    self.is_saved = true;
    self.saved_quiz_id = Some(saved_quiz_id);
  }

  pub fn mark_unsaved(&mut self) {
    self.is_saved = false;
    self.saved_quiz_id = None;
  }

  pub fn view(&self) -> QuizView {
    let mut view = QuizView::render(&self.quiz, &self.session);
    view.saved_quiz_id = self.saved_quiz_id.clone();
    view.is_saved = self.is_saved;
    view
  }
}

#[derive(Clone, Copy, Debug)]
struct InFlight {
  ticket: u64,
  since: Instant,
}

#[derive(Clone, Debug, Default)]
pub struct Workspace {
  pub active: Option<ActiveQuiz>,
  /// Set while a generation request is in flight. A request whose handler was dropped
  /// never clears it, so it expires after `stale_after` (see `is_generating`).
  in_flight: Option<InFlight>,
  tickets_issued: u64,
}

impl Workspace {
  pub fn is_generating(&self, stale_after: Duration) -> bool {
    self.in_flight.is_some_and(|g| g.since.elapsed() < stale_after)
  }

  /// Claim the generation slot. Returns the ticket to hand back to `finish_generation`,
  /// or `None` while another generation is in flight.
  pub fn begin_generation(&mut self, stale_after: Duration) -> Option<u64> {
    if self.is_generating(stale_after) {
      return None;
    }
    self.tickets_issued += 1;
    let ticket = self.tickets_issued;
    self.in_flight = Some(InFlight { ticket, since: Instant::now() });
    Some(ticket)
  }

  /// Release the slot if `ticket` still holds it. Returns false when a newer
  /// generation took over after this one went stale.
  pub fn finish_generation(&mut self, ticket: u64) -> bool {
    if self.in_flight.is_some_and(|g| g.ticket == ticket) {
      self.in_flight = None;
      true
    } else {
      false
    }
  }

  pub fn activate(&mut self, quiz: Quiz, saved_quiz_id: Option<String>) -> &ActiveQuiz {
    self.active.insert(ActiveQuiz::new(quiz, saved_quiz_id))
  }

  /// The active quiz, if it still is the quiz identified by `signature`.
  pub fn active_with_signature(&mut self, signature: &QuizSignature) -> Option<&mut ActiveQuiz> {
    self.active.as_mut().filter(|a| &a.signature == signature)
  }

  pub fn view(&self) -> Option<QuizView> {
    self.active.as_ref().map(ActiveQuiz::view)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::seeds::seed_quizzes;

  #[test]
  fn activation_resets_answers() {
    let quizzes = seed_quizzes();
    let mut ws = Workspace::default();
    ws.activate(quizzes[0].clone(), None);
    if let Some(active) = ws.active.as_mut() {
      active.session = active.session.select_answer(0, "B");
    }
    assert_eq!(ws.view().unwrap().answered, 1);

    ws.activate(quizzes[1].clone(), None);
    let view = ws.view().unwrap();
    assert_eq!(view.answered, 0);
    assert_eq!(view.subject, "Photosynthesis");
    assert!(!view.is_saved);
  }

  #[test]
  fn loaded_quizzes_start_saved() {
    let mut ws = Workspace::default();
    let active = ws.activate(seed_quizzes()[0].clone(), Some("id-1".into()));
    assert!(active.is_saved);
    assert_eq!(active.view().saved_quiz_id.as_deref(), Some("id-1"));
  }

  #[test]
  fn generation_marker_expires() {
    let minute = Duration::from_secs(60);
    let mut ws = Workspace::default();
    assert!(!ws.is_generating(minute));
    let ticket = ws.begin_generation(minute).unwrap();
    assert!(ws.is_generating(minute));
    assert!(ws.begin_generation(minute).is_none());
    assert!(!ws.is_generating(Duration::ZERO));
    assert!(ws.finish_generation(ticket));
    assert!(!ws.is_generating(minute));
  }

  #[test]
  fn stale_generation_cannot_release_a_newer_one() {
    let minute = Duration::from_secs(60);
    let mut ws = Workspace::default();
    let stale = ws.begin_generation(minute).unwrap();
    // The first marker has expired, so a second request takes over.
    let current = ws.begin_generation(Duration::ZERO).unwrap();
    assert_ne!(stale, current);

    assert!(!ws.finish_generation(stale));
    assert!(ws.is_generating(minute));
    assert!(ws.begin_generation(minute).is_none());

    assert!(ws.finish_generation(current));
    assert!(!ws.is_generating(minute));
  }

  #[test]
  fn unsaving_drops_the_library_link() {
    let mut ws = Workspace::default();
    ws.activate(seed_quizzes()[0].clone(), None);
    let active = ws.active.as_mut().unwrap();
    active.mark_saved("id-1".into());
    assert_eq!(active.view().saved_quiz_id.as_deref(), Some("id-1"));
    active.mark_unsaved();
    let view = active.view();
    assert!(!view.is_saved);
    assert!(view.saved_quiz_id.is_none());
  }

  #[test]
  fn signature_match_guards_late_updates() {
    let quizzes = seed_quizzes();
    let mut ws = Workspace::default();
    ws.activate(quizzes[0].clone(), None);
    let first = QuizSignature::compute(&quizzes[0]);
    ws.activate(quizzes[1].clone(), None);
    assert!(ws.active_with_signature(&first).is_none());
  }
}
