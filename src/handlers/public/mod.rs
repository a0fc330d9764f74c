// Public handlers: no bearer token required.

pub mod session;
pub mod system;

pub use session::{login, logout};
pub use system::{health, method_not_allowed, not_found, panic_response, root};
