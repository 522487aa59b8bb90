//! Shared domain layer for the job-market intelligence engine.
//!
//! Holds the posting data model and its derived tables, the error taxonomy,
//! counting and rounding helpers, the role classifier, the location
//! normaliser seam, posted-date parsing and the CLI settings.

pub mod calculations;
pub mod error;
pub mod location;
pub mod models;
pub mod roles;
pub mod settings;
pub mod time_utils;

pub use error::{AnalyticsError, Result};
