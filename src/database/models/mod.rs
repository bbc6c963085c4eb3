pub mod note;
pub mod user;

pub use note::{freeze_flag, NewNote, Note};
pub use user::{NewUser, User};
