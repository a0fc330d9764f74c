pub mod auth;
pub mod response;
pub mod role_gate;

pub use auth::{authenticate, bearer_token};
pub use response::{ApiResponse, ApiResult, Message, Success};
pub use role_gate::{require_role, RoleGate, ADMIN_ONLY, STAFF};
