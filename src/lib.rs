//! Personal trading journal: a SQLite-backed store for trade entries and
//! a pure analytics engine deriving per-trade metrics, calendar and
//! periodic rollups, FTMO-style compliance, and goal/achievement state.
//!
//! The [`commands`] module is the service surface: CRUD for trades and
//! the profile, plus the derived summaries. The [`analytics`] module is
//! side-effect free and can be driven directly with an in-memory trade
//! snapshot.

pub mod analytics;
pub mod commands;
pub mod db;
pub mod error;
pub mod models;

pub use db::Database;
pub use error::JournalError;
