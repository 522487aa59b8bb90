use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::GroupKey;

/// Sentinel location meaning "do not filter".
pub const ALL_LOCATIONS: &str = "All";

pub const DEFAULT_TOP_SKILLS: usize = 20;
pub const DEFAULT_TOP_COMPANIES: usize = 15;
pub const DEFAULT_TOP_ROLES: usize = 10;
pub const DEFAULT_TREND_DAYS: u32 = 30;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Job-market intelligence metrics for a dashboard
#[derive(Parser, Debug, Clone)]
#[command(
    name = "market-intel",
    about = "Job-market intelligence metrics for a dashboard",
    version
)]
pub struct Settings {
    /// File or directory holding the job-posting snapshot (.json / .jsonl)
    #[arg(long, env = "MARKET_INTEL_DATA")]
    pub data_path: Option<PathBuf>,

    /// Restrict every widget except the summary to this location
    #[arg(long, default_value = ALL_LOCATIONS)]
    pub location: String,

    /// Field the salary trend is grouped by
    #[arg(long, value_enum, default_value = "location")]
    pub group_by: GroupKey,

    /// Number of skills to rank
    #[arg(long, default_value_t = DEFAULT_TOP_SKILLS)]
    pub top_skills: usize,

    /// Number of companies to rank
    #[arg(long, default_value_t = DEFAULT_TOP_COMPANIES)]
    pub top_companies: usize,

    /// Number of roles to rank
    #[arg(long, default_value_t = DEFAULT_TOP_ROLES)]
    pub top_roles: usize,

    /// Trailing window of the posting trend, in days (1-3650)
    #[arg(long, default_value_t = DEFAULT_TREND_DAYS, value_parser = clap::value_parser!(u32).range(1..=3650))]
    pub days: u32,

    /// Timezone used for calendar days (auto-detected if not specified)
    #[arg(long, default_value = "auto")]
    pub timezone: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Pretty-print the JSON report
    #[arg(long)]
    pub pretty: bool,
}

impl Settings {
    /// The log level after applying `--debug`.
    pub fn effective_log_level(&self) -> &str {
        if self.debug {
            "DEBUG"
        } else {
            &self.log_level
        }
    }

    /// Engine parameters for one dashboard render.
    pub fn dashboard_request(&self) -> DashboardRequest {
        DashboardRequest {
            location: self.location.clone(),
            group_by: self.group_by,
            top_skills: self.top_skills,
            top_companies: self.top_companies,
            top_roles: self.top_roles,
            days: self.days,
        }
    }
}

// ── DashboardRequest ───────────────────────────────────────────────────────────

/// Parameters of one dashboard render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardRequest {
    /// Requested location, or [`ALL_LOCATIONS`] / empty for no filter.
    pub location: String,
    pub group_by: GroupKey,
    pub top_skills: usize,
    pub top_companies: usize,
    pub top_roles: usize,
    pub days: u32,
}

impl Default for DashboardRequest {
    fn default() -> Self {
        Self {
            location: ALL_LOCATIONS.to_string(),
            group_by: GroupKey::Location,
            top_skills: DEFAULT_TOP_SKILLS,
            top_companies: DEFAULT_TOP_COMPANIES,
            top_roles: DEFAULT_TOP_ROLES,
            days: DEFAULT_TREND_DAYS,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
