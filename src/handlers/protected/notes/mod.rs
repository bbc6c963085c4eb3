// handlers/protected/notes/mod.rs - Note endpoints
//
// Every handler here runs behind jwt_auth_middleware and only sees the
// caller's own notes.

pub mod add;
pub mod delete;
pub mod freeze;
pub mod get;
pub mod list;
pub mod sample;
pub mod update;

pub use add::add_note;
pub use delete::delete_note;
pub use freeze::freeze_note;
pub use get::get_note;
pub use list::list_notes;
pub use sample::insert_sample_notes;
pub use update::update_note;
