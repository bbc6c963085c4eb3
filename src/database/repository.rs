use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{NewNote, NewUser, Note, User};

/// Persistence for user identity records
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError>;

    /// Insert a user; fails with `UniqueViolation` when the username is taken.
    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError>;
}

/// Persistence for notes. Every method is scoped to one owner.
///
/// Title lookups act on the oldest note with that title when an owner has
/// several.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    async fn list_notes(
        &self,
        owner_id: Uuid,
        search: Option<&str>,
    ) -> Result<Vec<Note>, DatabaseError>;

    async fn insert_note(&self, note: NewNote) -> Result<Note, DatabaseError>;

    /// Insert all notes or none of them.
    async fn insert_notes(&self, notes: Vec<NewNote>) -> Result<u64, DatabaseError>;

    async fn find_by_title(
        &self,
        owner_id: Uuid,
        title: &str,
    ) -> Result<Option<Note>, DatabaseError>;

    async fn delete_by_title(&self, owner_id: Uuid, title: &str) -> Result<bool, DatabaseError>;

    /// Replace the text of the matching note only if it is not frozen.
    /// Returns `None` when no unfrozen note matched.
    async fn update_text_if_unfrozen(
        &self,
        owner_id: Uuid,
        title: &str,
        text: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Note>, DatabaseError>;

    /// Set the freeze flag; returns whether a note actually changed.
    async fn set_freeze(
        &self,
        owner_id: Uuid,
        title: &str,
        freeze: bool,
    ) -> Result<bool, DatabaseError>;
}

/// A complete storage backend
#[async_trait]
pub trait Storage: UserRepository + NoteRepository {
    async fn health_check(&self) -> Result<(), DatabaseError>;
}

/// PostgreSQL-backed storage
#[derive(Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const NOTE_COLUMNS: &str = "id, owner_id, title, text, freeze, created_at, updated_at";

// Oldest note with the given title for the owner
const FIRST_BY_TITLE: &str =
    "SELECT id FROM notes WHERE owner_id = $1 AND title = $2 ORDER BY created_at, id LIMIT 1";

#[async_trait]
impl UserRepository for PgStorage {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, username, password_hash, created_at)
             VALUES ($1, $2, $3, $4)
             RETURNING id, username, password_hash, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }
}

#[async_trait]
impl NoteRepository for PgStorage {
    async fn list_notes(
        &self,
        owner_id: Uuid,
        search: Option<&str>,
    ) -> Result<Vec<Note>, DatabaseError> {
        let notes = match search {
            Some(term) => {
                // strpos keeps the term literal; LIKE would treat % and _ as wildcards
                let sql = format!(
                    "SELECT {NOTE_COLUMNS} FROM notes
                     WHERE owner_id = $1
                       AND (strpos(lower(title), lower($2)) > 0
                            OR strpos(lower(text), lower($2)) > 0)
                     ORDER BY created_at, id"
                );
                sqlx::query_as::<_, Note>(&sql)
                    .bind(owner_id)
                    .bind(term)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!(
                    "SELECT {NOTE_COLUMNS} FROM notes WHERE owner_id = $1 ORDER BY created_at, id"
                );
                sqlx::query_as::<_, Note>(&sql)
                    .bind(owner_id)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(notes)
    }

    async fn insert_note(&self, note: NewNote) -> Result<Note, DatabaseError> {
        let sql = format!(
            "INSERT INTO notes (id, owner_id, title, text, freeze, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $6)
             RETURNING {NOTE_COLUMNS}"
        );
        let note = sqlx::query_as::<_, Note>(&sql)
            .bind(Uuid::new_v4())
            .bind(note.owner_id)
            .bind(&note.title)
            .bind(&note.text)
            .bind(note.freeze)
            .bind(note.created_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(note)
    }

    async fn insert_notes(&self, notes: Vec<NewNote>) -> Result<u64, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0u64;

        for note in &notes {
            let result = sqlx::query(
                "INSERT INTO notes (id, owner_id, title, text, freeze, created_at, updated_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $6)",
            )
            .bind(Uuid::new_v4())
            .bind(note.owner_id)
            .bind(&note.title)
            .bind(&note.text)
            .bind(note.freeze)
            .bind(note.created_at)
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    async fn find_by_title(
        &self,
        owner_id: Uuid,
        title: &str,
    ) -> Result<Option<Note>, DatabaseError> {
        let sql = format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ({FIRST_BY_TITLE})");
        let note = sqlx::query_as::<_, Note>(&sql)
            .bind(owner_id)
            .bind(title)
            .fetch_optional(&self.pool)
            .await?;

        Ok(note)
    }

    async fn delete_by_title(&self, owner_id: Uuid, title: &str) -> Result<bool, DatabaseError> {
        let sql = format!("DELETE FROM notes WHERE id = ({FIRST_BY_TITLE})");
        let result = sqlx::query(&sql)
            .bind(owner_id)
            .bind(title)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_text_if_unfrozen(
        &self,
        owner_id: Uuid,
        title: &str,
        text: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Note>, DatabaseError> {
        // The freeze check is part of the write so a concurrent freeze cannot slip in between
        let sql = format!(
            "UPDATE notes SET text = $3, updated_at = $4
             WHERE id = ({FIRST_BY_TITLE}) AND freeze = FALSE
             RETURNING {NOTE_COLUMNS}"
        );
        let note = sqlx::query_as::<_, Note>(&sql)
            .bind(owner_id)
            .bind(title)
            .bind(text)
            .bind(updated_at)
            .fetch_optional(&self.pool)
            .await?;

        Ok(note)
    }

    async fn set_freeze(
        &self,
        owner_id: Uuid,
        title: &str,
        freeze: bool,
    ) -> Result<bool, DatabaseError> {
        let sql = format!(
            "UPDATE notes SET freeze = $3 WHERE id = ({FIRST_BY_TITLE}) AND freeze <> $3"
        );
        let result = sqlx::query(&sql)
            .bind(owner_id)
            .bind(title)
            .bind(freeze)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Storage for PgStorage {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
