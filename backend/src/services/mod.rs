//! Business logic services for SoilSense

pub mod analysis;
pub mod auth;
pub mod conditions;
pub mod enrichment;

pub use analysis::{AnalysisPipeline, Assessment};
pub use auth::AuthService;
pub use enrichment::{EnrichedReport, NarrativeEnricher};
