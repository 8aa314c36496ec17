pub mod auth;
pub mod ownership;
pub mod response;
pub mod validate_user;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use ownership::{authorize, parse_id};
pub use response::{ApiResponse, ApiResult, Message};
pub use validate_user::{validate_user_middleware, CurrentUser};
