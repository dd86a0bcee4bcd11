//! Shared types and scoring rules for the SoilSense platform
//!
//! This crate contains the soil models and the pure estimators used by the
//! backend analysis pipeline and, through WASM, by the browser.

pub mod models;
pub mod recommendations;
pub mod scoring;
pub mod types;
pub mod validation;

pub use models::*;
pub use recommendations::*;
pub use scoring::*;
pub use types::*;
pub use validation::*;
