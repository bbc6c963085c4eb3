use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A stored note. `freeze` is a real boolean here and a `"true"`/`"false"`
/// string on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Note {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub owner_id: Uuid,
    pub title: String,
    pub text: String,
    #[serde(with = "freeze_flag")]
    pub freeze: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Case-insensitive substring match on title or text.
    pub fn matches(&self, search: &str) -> bool {
        let needle = search.to_lowercase();
        self.title.to_lowercase().contains(&needle) || self.text.to_lowercase().contains(&needle)
    }
}

/// A validated note ready to be inserted for an owner.
#[derive(Debug, Clone)]
pub struct NewNote {
    pub owner_id: Uuid,
    pub title: String,
    pub text: String,
    pub freeze: bool,
    pub created_at: DateTime<Utc>,
}

/// Wire representation of the freeze flag.
pub mod freeze_flag {
    use serde::Serializer;

    pub const TRUE: &str = "true";
    pub const FALSE: &str = "false";

    pub fn to_wire(value: bool) -> &'static str {
        if value {
            TRUE
        } else {
            FALSE
        }
    }

    /// Only the exact strings `"true"` and `"false"` are accepted.
    pub fn from_wire(value: &str) -> Option<bool> {
        match value {
            TRUE => Some(true),
            FALSE => Some(false),
            _ => None,
        }
    }

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(to_wire(*value))
    }
}
