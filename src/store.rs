//! Library: in-process persistence for saved quizzes.
//!
//! Every operation is scoped to an owner except the public share lookup.
//! `insert` enforces uniqueness of (owner, signature) under the write lock, so two
//! concurrent saves of the same quiz cannot both land even if both passed the
//! duplicate guard.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::config::{LibraryCfg, SubjectMatch};
use crate::domain::{Quiz, SavedQuiz};
use crate::error::StoreError;
use crate::signature::{normalize_text, QuizSignature};

struct Row {
  seq: u64,
  signature: QuizSignature,
  record: SavedQuiz,
}

pub struct Library {
  rows: RwLock<HashMap<String, Row>>,
  next_seq: AtomicU64,
  cfg: LibraryCfg,
}

impl Library {
  pub fn new(cfg: LibraryCfg) -> Self {
    Self { rows: RwLock::new(HashMap::new()), next_seq: AtomicU64::new(0), cfg }
  }

  pub fn recent_limit(&self) -> usize {
    self.cfg.recent_limit
  }

  fn subject_matches(&self, stored: &str, wanted: &str) -> bool {
    match self.cfg.subject_match {
      SubjectMatch::Exact => stored == wanted,
      SubjectMatch::Normalized => normalize_text(stored) == normalize_text(wanted),
    }
  }

  /// Saved quizzes of `owner` whose subject matches `subject`: the duplicate-guard candidates.
  #[instrument(level = "debug", skip(self))]
  pub async fn find_by_owner_and_subject(&self, owner: &str, subject: &str) -> Result<Vec<SavedQuiz>, StoreError> {
    let rows = self.rows.read().await;
    let found: Vec<SavedQuiz> = rows
      .values()
      .filter(|r| r.record.owner_id == owner && self.subject_matches(&r.record.quiz.subject, subject))
      .map(|r| r.record.clone())
      .collect();
    debug!(target: "quiz", %owner, %subject, candidates = found.len(), "Duplicate candidates fetched");
    Ok(found)
  }

  /// Persist a new private quiz for `owner`.
  #[instrument(level = "info", skip(self, quiz), fields(subject = %quiz.subject))]
  pub async fn insert(&self, owner: &str, quiz: Quiz) -> Result<SavedQuiz, StoreError> {
    let signature = QuizSignature::compute(&quiz);
    let mut rows = self.rows.write().await;

    let mut owned = 0usize;
    for row in rows.values().filter(|r| r.record.owner_id == owner) {
      if row.signature == signature {
        return Err(StoreError::DuplicateSignature { existing_id: row.record.id.clone() });
      }
      owned += 1;
    }
    if owned >= self.cfg.max_quizzes_per_owner {
      return Err(StoreError::QuotaExceeded { limit: self.cfg.max_quizzes_per_owner });
    }

    let record = SavedQuiz {
      id: Uuid::new_v4().to_string(),
      owner_id: owner.to_string(),
      quiz,
      created_at: Utc::now(),
      is_public: false,
      share_id: None,
    };
    let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
    rows.insert(record.id.clone(), Row { seq, signature, record: record.clone() });
    info!(target: "quiz", %owner, id = %record.id, "Quiz saved to library");
    Ok(record)
  }

  #[instrument(level = "debug", skip(self))]
  pub async fn get_owned(&self, owner: &str, id: &str) -> Result<SavedQuiz, StoreError> {
    let rows = self.rows.read().await;
    rows
      .get(id)
      .filter(|r| r.record.owner_id == owner)
      .map(|r| r.record.clone())
      .ok_or(StoreError::NotFound)
  }

  /// Newest first.
  #[instrument(level = "debug", skip(self))]
  pub async fn list_recent(&self, owner: &str, limit: usize) -> Vec<SavedQuiz> {
    let rows = self.rows.read().await;
    let mut owned: Vec<&Row> = rows.values().filter(|r| r.record.owner_id == owner).collect();
    owned.sort_by(|a, b| (b.record.created_at, b.seq).cmp(&(a.record.created_at, a.seq)));
    owned.into_iter().take(limit).map(|r| r.record.clone()).collect()
  }

  /// Lookup by share id; private quizzes are invisible here.
  #[instrument(level = "debug", skip(self))]
  pub async fn find_public(&self, share_id: &str) -> Option<SavedQuiz> {
    let rows = self.rows.read().await;
    rows
      .values()
      .find(|r| r.record.is_public && r.record.share_id.as_deref() == Some(share_id))
      .map(|r| r.record.clone())
  }

  /// Making a quiz public assigns a share id on first publish. Going private keeps it,
  /// so re-publishing restores the same link.
  #[instrument(level = "info", skip(self))]
  pub async fn set_visibility(&self, owner: &str, id: &str, public: bool) -> Result<SavedQuiz, StoreError> {
    let mut rows = self.rows.write().await;
    let row = rows.get_mut(id).filter(|r| r.record.owner_id == owner).ok_or(StoreError::NotFound)?;
    row.record.is_public = public;
    if public && row.record.share_id.is_none() {
      row.record.share_id = Some(Uuid::new_v4().to_string());
    }
    info!(target: "quiz", %owner, %id, public, share_id = ?row.record.share_id, "Visibility updated");
    Ok(row.record.clone())
  }

  /// Remove an owned record and hand it back.
  #[instrument(level = "info", skip(self))]
  pub async fn delete(&self, owner: &str, id: &str) -> Result<SavedQuiz, StoreError> {
    let mut rows = self.rows.write().await;
    let owned = rows.get(id).is_some_and(|r| r.record.owner_id == owner);
    if !owned {
      return Err(StoreError::NotFound);
    }
    let row = rows.remove(id).ok_or(StoreError::NotFound)?;
    info!(target: "quiz", %owner, %id, "Quiz deleted");
    Ok(row.record)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{AnswerLetter, Question};

  fn quiz(subject: &str, text: &str) -> Quiz {
    Quiz {
      subject: subject.into(),
      questions: vec![Question {
        question: text.into(),
        options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
        answer: AnswerLetter::A,
      }],
    }
  }

  fn library() -> Library {
    Library::new(LibraryCfg::default())
  }

  #[tokio::test]
  async fn insert_starts_private_and_is_owner_scoped() {
    let lib = library();
    let saved = lib.insert("alice", quiz("History", "Q1")).await.unwrap();
    assert!(!saved.is_public);
    assert!(saved.share_id.is_none());

    assert!(lib.get_owned("alice", &saved.id).await.is_ok());
    assert_eq!(lib.get_owned("bob", &saved.id).await.unwrap_err(), StoreError::NotFound);
    assert_eq!(lib.delete("bob", &saved.id).await.unwrap_err(), StoreError::NotFound);
    assert!(lib.list_recent("bob", 10).await.is_empty());
  }

  #[tokio::test]
  async fn same_signature_is_rejected_per_owner() {
    let lib = library();
    let first = lib.insert("alice", quiz("History", "Q1")).await.unwrap();
    let err = lib.insert("alice", quiz(" history", "q1 ")).await.unwrap_err();
    assert_eq!(err, StoreError::DuplicateSignature { existing_id: first.id });
    // Another owner may hold the same quiz.
    assert!(lib.insert("bob", quiz("History", "Q1")).await.is_ok());
  }

  #[tokio::test]
  async fn quota_is_enforced() {
    let lib = Library::new(LibraryCfg { max_quizzes_per_owner: 1, ..LibraryCfg::default() });
    lib.insert("alice", quiz("History", "Q1")).await.unwrap();
    let err = lib.insert("alice", quiz("History", "Q2")).await.unwrap_err();
    assert_eq!(err, StoreError::QuotaExceeded { limit: 1 });
  }

  #[tokio::test]
  async fn subject_lookup_follows_policy() {
    let normalized = library();
    normalized.insert("alice", quiz("History", "Q1")).await.unwrap();
    normalized.insert("alice", quiz("Math", "Q1")).await.unwrap();
    let found = normalized.find_by_owner_and_subject("alice", " HISTORY").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].quiz.subject, "History");
    assert!(normalized.find_by_owner_and_subject("bob", "History").await.unwrap().is_empty());

    let exact = Library::new(LibraryCfg { subject_match: SubjectMatch::Exact, ..LibraryCfg::default() });
    exact.insert("alice", quiz("History", "Q1")).await.unwrap();
    assert!(exact.find_by_owner_and_subject("alice", "history").await.unwrap().is_empty());
    assert_eq!(exact.find_by_owner_and_subject("alice", "History").await.unwrap().len(), 1);
  }

  #[tokio::test]
  async fn recent_is_newest_first_and_limited() {
    let lib = library();
    for i in 0..5 {
      lib.insert("alice", quiz("History", &format!("Q{}", i))).await.unwrap();
    }
    let recent = lib.list_recent("alice", 3).await;
    let texts: Vec<&str> = recent.iter().map(|r| r.quiz.questions[0].question.as_str()).collect();
    assert_eq!(texts, vec!["Q4", "Q3", "Q2"]);
  }

  #[tokio::test]
  async fn share_link_follows_visibility() {
    let lib = library();
    let saved = lib.insert("alice", quiz("History", "Q1")).await.unwrap();

    let public = lib.set_visibility("alice", &saved.id, true).await.unwrap();
    let share_id = public.share_id.clone().unwrap();
    assert!(lib.find_public(&share_id).await.is_some());

    let private = lib.set_visibility("alice", &saved.id, false).await.unwrap();
    assert_eq!(private.share_id.as_deref(), Some(share_id.as_str()));
    assert!(lib.find_public(&share_id).await.is_none());

    let again = lib.set_visibility("alice", &saved.id, true).await.unwrap();
    assert_eq!(again.share_id, Some(share_id));
    assert_eq!(lib.set_visibility("bob", &saved.id, true).await.unwrap_err(), StoreError::NotFound);
  }

  #[tokio::test]
  async fn delete_removes_the_record() {
    let lib = library();
    let saved = lib.insert("alice", quiz("History", "Q1")).await.unwrap();
    let removed = lib.delete("alice", &saved.id).await.unwrap();
    assert_eq!(removed.id, saved.id);
    assert_eq!(lib.get_owned("alice", &saved.id).await.unwrap_err(), StoreError::NotFound);
    // Deleting frees the signature.
    assert!(lib.insert("alice", quiz("History", "Q1")).await.is_ok());
  }
}
