// handlers/mod.rs - HTTP handlers grouped by access tier

pub mod protected;
pub mod public;
