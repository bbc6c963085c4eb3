// handlers/protected/mod.rs - Handlers that require a valid bearer token

pub mod notes;

pub use notes::*;
