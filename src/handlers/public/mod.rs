// handlers/public/mod.rs - Public handlers (no authentication required)

pub mod auth;
pub mod home;

pub use auth::*;
pub use home::{health, root};
