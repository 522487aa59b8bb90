//! Aggregation engine for job-market intelligence.
//!
//! Derives the dashboard tables (salary trends, skill demand, company and
//! location rankings, posting trends, experience and role distributions,
//! summary figures) from an in-memory snapshot of job postings, and loads
//! such snapshots from disk.

pub mod aggregator;
pub mod analysis;
pub mod analyzer;
pub mod filter;
pub mod reader;
pub mod trends;

pub use analysis::{DashboardReport, ReportMetadata, WidgetResults};
pub use analyzer::MarketAnalyzer;
pub use market_core as core;
