// handlers/public/mod.rs - endpoints reachable without a session

pub mod auth;

pub use auth::login as auth_login;
pub use auth::register as auth_register;
