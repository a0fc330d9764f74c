// Public endpoints need no token; resource writes are gated by role in routes.rs
pub mod extract;
pub mod public;
pub mod resources;
