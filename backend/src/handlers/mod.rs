//! HTTP handlers

pub mod analysis;
pub mod auth;
pub mod health;
pub mod upload;

pub use analysis::{get_analysis, list_analyses};
pub use auth::{check_auth, get_session, login, logout, signup};
pub use health::health_check;
pub use upload::upload_soil_image;
