pub mod credential_service;
pub mod error;
pub mod note_service;
pub mod validation;

pub use credential_service::CredentialService;
pub use error::ServiceError;
pub use note_service::NoteService;
pub use validation::ValidationError;
