//! Persistence seams: PostgreSQL for accounts and analyses, Redis for sessions

pub mod analysis;
pub mod session;
pub mod user;

pub use analysis::{AnalysisStore, PgAnalysisStore};
pub use session::{RedisSessionStore, SessionStore};
pub use user::{PgUserStore, UserStore};
