//! Domain models for the SoilSense platform

mod soil;
mod user;

pub use soil::*;
pub use user::*;
