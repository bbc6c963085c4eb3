use chrono::{DateTime, Duration, SubsecRound, Utc};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::database::models::{NewNote, Note};
use crate::database::NoteRepository;
use crate::services::validation::{NoteDraft, ValidationError};
use crate::services::ServiceError;

/// Owner-scoped note operations.
///
/// Every method takes the owner's id and never reads or writes another
/// owner's notes. Payloads arrive already validated as `NoteDraft`s.
#[derive(Clone)]
pub struct NoteService {
    notes: Arc<dyn NoteRepository>,
}

impl NoteService {
    pub fn new(notes: Arc<dyn NoteRepository>) -> Self {
        Self { notes }
    }

    /// All notes of the owner, optionally narrowed by a case-insensitive
    /// substring of title or text. An empty term means no filter.
    pub async fn list(
        &self,
        owner_id: Uuid,
        search: Option<&str>,
    ) -> Result<Vec<Note>, ServiceError> {
        let search = search.filter(|term| !term.is_empty());
        Ok(self.notes.list_notes(owner_id, search).await?)
    }

    pub async fn create(&self, owner_id: Uuid, draft: NoteDraft) -> Result<Note, ServiceError> {
        let note = self.notes.insert_note(Self::new_note(owner_id, draft, now())).await?;
        debug!("Created note {} for {}", note.id, owner_id);
        Ok(note)
    }

    pub async fn get_by_title(&self, owner_id: Uuid, title: &str) -> Result<Note, ServiceError> {
        self.notes
            .find_by_title(owner_id, title)
            .await?
            .ok_or_else(Self::not_found)
    }

    /// Returns whether a note was removed; a miss is not an error.
    pub async fn delete_by_title(&self, owner_id: Uuid, title: &str) -> Result<bool, ServiceError> {
        Ok(self.notes.delete_by_title(owner_id, title).await?)
    }

    /// Replace a note's text unless it is frozen.
    pub async fn update_text_by_title(
        &self,
        owner_id: Uuid,
        title: &str,
        text: &str,
    ) -> Result<Note, ServiceError> {
        if let Some(note) = self
            .notes
            .update_text_if_unfrozen(owner_id, title, text, now())
            .await?
        {
            return Ok(note);
        }

        // Nothing was written: either there is no such note or it was frozen at write time
        match self.notes.find_by_title(owner_id, title).await? {
            None => Err(Self::not_found()),
            Some(_) => {
                debug!("Refused to edit frozen note '{}' for {}", title, owner_id);
                Err(ServiceError::Forbidden(
                    "This note is frozen and cannot be edited".to_string(),
                ))
            }
        }
    }

    /// Freezing and unfreezing are always allowed. Returns whether the note's
    /// state actually changed.
    pub async fn set_freeze_by_title(
        &self,
        owner_id: Uuid,
        title: &str,
        freeze: bool,
    ) -> Result<bool, ServiceError> {
        Ok(self.notes.set_freeze(owner_id, title, freeze).await?)
    }

    /// Insert a batch of drafts atomically.
    pub async fn bulk_create(
        &self,
        owner_id: Uuid,
        drafts: Vec<NoteDraft>,
    ) -> Result<u64, ServiceError> {
        if drafts.is_empty() {
            return Err(ValidationError::InvalidNotesArray.into());
        }

        // One microsecond apart so duplicate titles in a batch resolve in batch order
        let created_at = now();
        let notes = drafts
            .into_iter()
            .zip(0i64..)
            .map(|(draft, offset)| {
                Self::new_note(owner_id, draft, created_at + Duration::microseconds(offset))
            })
            .collect();

        let inserted = self.notes.insert_notes(notes).await?;
        info!("Inserted {} notes for {}", inserted, owner_id);
        Ok(inserted)
    }

    fn new_note(owner_id: Uuid, draft: NoteDraft, created_at: DateTime<Utc>) -> NewNote {
        NewNote {
            owner_id,
            title: draft.title,
            text: draft.text,
            freeze: draft.freeze,
            created_at,
        }
    }

    fn not_found() -> ServiceError {
        ServiceError::NotFound("Note not found".to_string())
    }
}

// Microsecond precision, matching what PostgreSQL stores
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStorage;

    fn service() -> NoteService {
        NoteService::new(Arc::new(MemoryStorage::new()))
    }

    fn draft(title: &str, text: &str, freeze: &str) -> NoteDraft {
        NoteDraft::new(title, text, freeze).unwrap()
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let notes = service();
        let owner = Uuid::new_v4();
        notes.create(owner, draft("Shop", "milk", "false")).await.unwrap();

        let note = notes.get_by_title(owner, "Shop").await.unwrap();
        assert_eq!(note.title, "Shop");
        assert_eq!(note.text, "milk");
        assert!(!note.freeze);
        assert_eq!(note.created_at, note.updated_at);
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let err = service().get_by_title(Uuid::new_v4(), "nope").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn notes_are_isolated_per_owner() {
        let notes = service();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        notes.create(alice, draft("Shop", "milk", "false")).await.unwrap();
        notes.create(bob, draft("Shop", "beer", "false")).await.unwrap();

        for search in [None, Some(""), Some("shop"), Some("beer")] {
            let listed = notes.list(alice, search).await.unwrap();
            assert!(listed.iter().all(|n| n.owner_id == alice), "search {search:?}");
        }
        assert!(notes.list(alice, Some("beer")).await.unwrap().is_empty());
        assert_eq!(notes.get_by_title(bob, "Shop").await.unwrap().text, "beer");

        assert!(!notes.delete_by_title(alice, "missing").await.unwrap());
        assert!(notes.delete_by_title(alice, "Shop").await.unwrap());
        assert!(notes.get_by_title(bob, "Shop").await.is_ok());
    }

    #[tokio::test]
    async fn search_filters_title_or_text() {
        let notes = service();
        let owner = Uuid::new_v4();
        notes.create(owner, draft("Shopping List", "Buy milk", "false")).await.unwrap();
        notes.create(owner, draft("Ideas", "Write a SHOPPING app", "false")).await.unwrap();
        notes.create(owner, draft("Todo", "laundry", "false")).await.unwrap();

        assert_eq!(notes.list(owner, None).await.unwrap().len(), 3);
        assert_eq!(notes.list(owner, Some("shopping")).await.unwrap().len(), 2);
        assert_eq!(notes.list(owner, Some("MILK")).await.unwrap().len(), 1);
        assert!(notes.list(owner, Some("%")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_refreshes_updated_at() {
        let notes = service();
        let owner = Uuid::new_v4();
        let created = notes.create(owner, draft("Shop", "milk", "false")).await.unwrap();

        let updated = notes.update_text_by_title(owner, "Shop", "eggs").await.unwrap();
        assert_eq!(updated.text, "eggs");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let err = service()
            .update_text_by_title(Uuid::new_v4(), "nope", "x")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn frozen_note_rejects_text_updates_after_any_cycles() {
        let notes = service();
        let owner = Uuid::new_v4();
        notes.create(owner, draft("Shop", "milk", "true")).await.unwrap();

        let err = notes.update_text_by_title(owner, "Shop", "eggs").await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        for _ in 0..3 {
            assert!(notes.set_freeze_by_title(owner, "Shop", false).await.unwrap());
            assert!(notes.set_freeze_by_title(owner, "Shop", true).await.unwrap());
        }

        let err = notes.update_text_by_title(owner, "Shop", "eggs").await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
        assert_eq!(notes.get_by_title(owner, "Shop").await.unwrap().text, "milk");

        notes.set_freeze_by_title(owner, "Shop", false).await.unwrap();
        assert_eq!(notes.update_text_by_title(owner, "Shop", "eggs").await.unwrap().text, "eggs");
    }

    #[tokio::test]
    async fn set_freeze_reports_changes_only() {
        let notes = service();
        let owner = Uuid::new_v4();
        notes.create(owner, draft("Shop", "milk", "false")).await.unwrap();

        assert!(notes.set_freeze_by_title(owner, "Shop", true).await.unwrap());
        assert!(!notes.set_freeze_by_title(owner, "Shop", true).await.unwrap());
        assert!(!notes.set_freeze_by_title(owner, "Other", true).await.unwrap());
        assert!(notes.get_by_title(owner, "Shop").await.unwrap().freeze);
    }

    #[tokio::test]
    async fn bulk_create_inserts_all() {
        let notes = service();
        let owner = Uuid::new_v4();
        let count = notes
            .bulk_create(owner, vec![draft("a", "1", "false"), draft("b", "2", "true")])
            .await
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(notes.list(owner, None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn bulk_duplicates_resolve_in_batch_order() {
        let notes = service();
        let owner = Uuid::new_v4();
        let batch = vec![
            draft("Dup", "first", "false"),
            draft("Dup", "second", "false"),
            draft("Dup", "third", "false"),
        ];
        notes.bulk_create(owner, batch).await.unwrap();

        let listed = notes.list(owner, None).await.unwrap();
        assert!(listed.windows(2).all(|w| w[0].created_at < w[1].created_at));
        assert_eq!(notes.get_by_title(owner, "Dup").await.unwrap().text, "first");

        notes.delete_by_title(owner, "Dup").await.unwrap();
        assert_eq!(notes.get_by_title(owner, "Dup").await.unwrap().text, "second");
    }

    #[tokio::test]
    async fn bulk_create_rejects_empty_batch() {
        let err = service().bulk_create(Uuid::new_v4(), Vec::new()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ValidationError::InvalidNotesArray)));
    }
}
