pub mod bootstrap;
pub mod manager;
pub mod models;

pub use bootstrap::bootstrap;
pub use manager::{Database, DatabaseError, DbConnection};
