//! Shape checks for request payloads.
//!
//! Checks run in a fixed order: field presence, then the freeze value
//! whitelist, then field types. Type errors are reported separately since the
//! API answers them with 403 rather than 400.

use serde_json::{Map, Value};

use crate::database::models::freeze_flag;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    #[error("freeze value should be true or false")]
    InvalidFreeze,

    #[error("{0} should be string")]
    WrongType(&'static str),

    #[error("Only 'title' is required to get note, unexpected field '{0}'")]
    UnexpectedField(&'static str),

    #[error("Username and password required")]
    MissingCredentials,

    #[error("Invalid or empty 'notes' array")]
    InvalidNotesArray,

    #[error("Invalid note format at index {index}: {reason}")]
    InvalidNote {
        index: usize,
        reason: Box<ValidationError>,
    },
}

impl ValidationError {
    /// Whether the payload had every field but one carried the wrong JSON type.
    pub fn is_type_error(&self) -> bool {
        matches!(self, ValidationError::WrongType(_))
    }

    /// The offending field, when there is a single one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::MissingField(field)
            | ValidationError::WrongType(field)
            | ValidationError::UnexpectedField(field) => Some(*field),
            ValidationError::InvalidFreeze => Some("freeze"),
            ValidationError::InvalidNotesArray => Some("notes"),
            ValidationError::InvalidNote { reason, .. } => reason.field(),
            _ => None,
        }
    }
}

/// Username and password for signup and login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Both fields must be non-empty strings.
    pub fn from_payload(payload: &Value) -> Result<Self, ValidationError> {
        let obj = payload.as_object().ok_or(ValidationError::MissingCredentials)?;
        let field = |name: &str| {
            obj.get(name)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .ok_or(ValidationError::MissingCredentials)
        };

        Ok(Self {
            username: field("username")?,
            password: field("password")?,
        })
    }
}

/// A validated note body, as accepted by add and bulk insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub text: String,
    pub freeze: bool,
}

impl NoteDraft {
    pub fn new(
        title: impl Into<String>,
        text: impl Into<String>,
        freeze: &str,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            title: title.into(),
            text: text.into(),
            freeze: freeze_flag::from_wire(freeze).ok_or(ValidationError::InvalidFreeze)?,
        })
    }

    pub fn from_payload(payload: &Value) -> Result<Self, ValidationError> {
        let obj = object(payload)?;

        let title = require(obj, "title")?;
        let text = require(obj, "text")?;
        let freeze = freeze_value(require(obj, "freeze")?)?;

        Ok(Self {
            title: string(title, "title")?,
            text: string(text, "text")?,
            freeze,
        })
    }
}

/// A lookup by title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleQuery {
    pub title: String,
}

impl TitleQuery {
    pub fn from_payload(payload: &Value) -> Result<Self, ValidationError> {
        let obj = object(payload)?;
        let title = require(obj, "title")?;
        Ok(Self {
            title: string(title, "title")?,
        })
    }

    /// Like `from_payload`, but a body that also carries note content is
    /// rejected instead of ignored.
    pub fn strict_from_payload(payload: &Value) -> Result<Self, ValidationError> {
        let obj = object(payload)?;
        for field in ["text", "freeze"] {
            if obj.contains_key(field) {
                return Err(ValidationError::UnexpectedField(field));
            }
        }
        Self::from_payload(payload)
    }
}

/// New text for the note with the given title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextUpdate {
    pub title: String,
    pub text: String,
}

impl TextUpdate {
    pub fn from_payload(payload: &Value) -> Result<Self, ValidationError> {
        let obj = object(payload)?;
        let title = string(require(obj, "title")?, "title")?;
        let text = string(require(obj, "text")?, "text")?;
        Ok(Self { title, text })
    }
}

/// New freeze state for the note with the given title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreezeUpdate {
    pub title: String,
    pub freeze: bool,
}

impl FreezeUpdate {
    pub fn from_payload(payload: &Value) -> Result<Self, ValidationError> {
        let obj = object(payload)?;
        let title = require(obj, "title")?;
        let freeze = require(obj, "freeze")?;
        let title = string(title, "title")?;
        Ok(Self {
            title,
            freeze: freeze_value(freeze)?,
        })
    }
}

/// Validate a `{"notes": [...]}` body. Every element is checked before any
/// is returned, so a single bad element rejects the whole batch.
pub fn note_batch(payload: &Value) -> Result<Vec<NoteDraft>, ValidationError> {
    let notes = payload
        .get("notes")
        .and_then(Value::as_array)
        .filter(|notes| !notes.is_empty())
        .ok_or(ValidationError::InvalidNotesArray)?;

    notes
        .iter()
        .enumerate()
        .map(|(index, note)| {
            NoteDraft::from_payload(note).map_err(|reason| ValidationError::InvalidNote {
                index,
                reason: Box::new(reason),
            })
        })
        .collect()
}

fn object(payload: &Value) -> Result<&Map<String, Value>, ValidationError> {
    payload.as_object().ok_or(ValidationError::NotAnObject)
}

fn require<'a>(
    obj: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a Value, ValidationError> {
    obj.get(field).ok_or(ValidationError::MissingField(field))
}

fn string(value: &Value, field: &'static str) -> Result<String, ValidationError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or(ValidationError::WrongType(field))
}

fn freeze_value(value: &Value) -> Result<bool, ValidationError> {
    value
        .as_str()
        .and_then(freeze_flag::from_wire)
        .ok_or(ValidationError::InvalidFreeze)
}
