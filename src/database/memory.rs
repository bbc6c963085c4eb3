use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewNote, NewUser, Note, User};
use crate::database::repository::{NoteRepository, Storage, UserRepository};

/// In-process storage for development and tests. Notes are kept in insertion
/// order, which is also the order title lookups resolve duplicates in.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    users: RwLock<Vec<User>>,
    notes: RwLock<Vec<Note>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(notes: &[Note], owner_id: Uuid, title: &str) -> Option<usize> {
        notes
            .iter()
            .position(|n| n.owner_id == owner_id && n.title == title)
    }

    fn materialize(note: NewNote) -> Note {
        Note {
            id: Uuid::new_v4(),
            owner_id: note.owner_id,
            title: note.title,
            text: note.text,
            freeze: note.freeze,
            created_at: note.created_at,
            updated_at: note.created_at,
        }
    }
}

#[async_trait]
impl UserRepository for MemoryStorage {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.username == user.username) {
            return Err(DatabaseError::UniqueViolation("users_username_key".to_string()));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: user.username,
            password_hash: user.password_hash,
            created_at: user.created_at,
        };
        users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl NoteRepository for MemoryStorage {
    async fn list_notes(
        &self,
        owner_id: Uuid,
        search: Option<&str>,
    ) -> Result<Vec<Note>, DatabaseError> {
        let notes = self.notes.read().await;
        Ok(notes
            .iter()
            .filter(|n| n.owner_id == owner_id)
            .filter(|n| search.map_or(true, |term| n.matches(term)))
            .cloned()
            .collect())
    }

    async fn insert_note(&self, note: NewNote) -> Result<Note, DatabaseError> {
        let note = Self::materialize(note);
        self.notes.write().await.push(note.clone());
        Ok(note)
    }

    async fn insert_notes(&self, notes: Vec<NewNote>) -> Result<u64, DatabaseError> {
        let count = notes.len() as u64;
        let mut stored = self.notes.write().await;
        stored.extend(notes.into_iter().map(Self::materialize));
        Ok(count)
    }

    async fn find_by_title(
        &self,
        owner_id: Uuid,
        title: &str,
    ) -> Result<Option<Note>, DatabaseError> {
        let notes = self.notes.read().await;
        Ok(Self::position(&notes, owner_id, title).map(|i| notes[i].clone()))
    }

    async fn delete_by_title(&self, owner_id: Uuid, title: &str) -> Result<bool, DatabaseError> {
        let mut notes = self.notes.write().await;
        match Self::position(&notes, owner_id, title) {
            Some(i) => {
                notes.remove(i);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_text_if_unfrozen(
        &self,
        owner_id: Uuid,
        title: &str,
        text: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Note>, DatabaseError> {
        let mut notes = self.notes.write().await;
        let Some(i) = Self::position(&notes, owner_id, title) else {
            return Ok(None);
        };

        let note = &mut notes[i];
        if note.freeze {
            return Ok(None);
        }
        note.text = text.to_string();
        note.updated_at = updated_at;
        Ok(Some(note.clone()))
    }

    async fn set_freeze(
        &self,
        owner_id: Uuid,
        title: &str,
        freeze: bool,
    ) -> Result<bool, DatabaseError> {
        let mut notes = self.notes.write().await;
        match Self::position(&notes, owner_id, title) {
            Some(i) if notes[i].freeze != freeze => {
                notes[i].freeze = freeze;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
