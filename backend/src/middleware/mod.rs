//! Request middleware

pub mod auth;

pub use auth::{session_middleware, session_token, CurrentUser};
