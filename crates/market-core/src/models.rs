use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calculations::midpoint;

// ── Schema ────────────────────────────────────────────────────────────────────

/// The named columns a job-posting dataset may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    JobId,
    Title,
    Company,
    Location,
    SalaryMin,
    SalaryMax,
    Skills,
    Experience,
    PostedDate,
}

impl Column {
    /// Every column, in schema order.
    pub const ALL: [Column; 9] = [
        Column::JobId,
        Column::Title,
        Column::Company,
        Column::Location,
        Column::SalaryMin,
        Column::SalaryMax,
        Column::Skills,
        Column::Experience,
        Column::PostedDate,
    ];

    /// The column's name as it appears in snapshot files.
    pub fn name(self) -> &'static str {
        match self {
            Column::JobId => "job_id",
            Column::Title => "title",
            Column::Company => "company",
            Column::Location => "location",
            Column::SalaryMin => "salary_min",
            Column::SalaryMax => "salary_max",
            Column::Skills => "skills",
            Column::Experience => "experience",
            Column::PostedDate => "posted_date",
        }
    }

    /// Look a column up by its snapshot name.
    pub fn from_name(name: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Text fields a salary trend may be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GroupKey {
    Location,
    Title,
    Company,
    Experience,
}

impl GroupKey {
    pub fn column(self) -> Column {
        match self {
            GroupKey::Location => Column::Location,
            GroupKey::Title => Column::Title,
            GroupKey::Company => Column::Company,
            GroupKey::Experience => Column::Experience,
        }
    }

    /// The grouping value of `posting`, or `None` when the cell is empty.
    pub fn value_of(self, posting: &JobPosting) -> Option<&str> {
        match self {
            GroupKey::Location => posting.location.as_deref(),
            GroupKey::Title => posting.title.as_deref(),
            GroupKey::Company => posting.company.as_deref(),
            GroupKey::Experience => posting.experience.as_deref(),
        }
    }
}

// ── JobPosting ────────────────────────────────────────────────────────────────

/// One row of the dataset. `None` marks an empty cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    /// Unique identifier of the posting.
    pub job_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    /// Raw location text, before normalisation.
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub salary_min: Option<f64>,
    #[serde(default)]
    pub salary_max: Option<f64>,
    /// Comma-separated skill list.
    #[serde(default)]
    pub skills: Option<String>,
    #[serde(default)]
    pub experience: Option<String>,
    /// Raw posting timestamp; parsed lazily by the time-based aggregations.
    #[serde(default)]
    pub posted_date: Option<String>,
}

impl JobPosting {
    /// A posting with only its identifier set.
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            ..Self::default()
        }
    }

    /// Both salary bounds, when both are strictly positive.
    pub fn valid_salary(&self) -> Option<(f64, f64)> {
        match (self.salary_min, self.salary_max) {
            (Some(min), Some(max)) if min > 0.0 && max > 0.0 => Some((min, max)),
            _ => None,
        }
    }

    /// Midpoint of a valid salary pair.
    pub fn salary_midpoint(&self) -> Option<f64> {
        self.valid_salary().map(|(min, max)| midpoint(min, max))
    }

    /// Trimmed, non-empty skill tokens of the comma-separated `skills` cell.
    pub fn skill_list(&self) -> impl Iterator<Item = &str> {
        self.skills
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

// ── Dataset ───────────────────────────────────────────────────────────────────

/// An ordered snapshot of postings together with the columns it carries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: BTreeSet<Column>,
    records: Vec<JobPosting>,
}

impl Dataset {
    /// A dataset carrying every column.
    pub fn new(records: Vec<JobPosting>) -> Self {
        Self {
            columns: Column::ALL.into_iter().collect(),
            records,
        }
    }

    /// A dataset with an explicit schema. `job_id` is always present.
    pub fn with_columns(columns: impl IntoIterator<Item = Column>, records: Vec<JobPosting>) -> Self {
        let mut columns: BTreeSet<Column> = columns.into_iter().collect();
        columns.insert(Column::JobId);
        Self { columns, records }
    }

    /// An empty dataset sharing this one's schema.
    pub fn empty_like(&self) -> Self {
        Self {
            columns: self.columns.clone(),
            records: Vec::new(),
        }
    }

    /// A dataset with this schema holding `records`.
    pub fn with_records(&self, records: Vec<JobPosting>) -> Self {
        Self {
            columns: self.columns.clone(),
            records,
        }
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    pub fn columns(&self) -> impl Iterator<Item = Column> + '_ {
        self.columns.iter().copied()
    }

    pub fn records(&self) -> &[JobPosting] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ── Derived tables ────────────────────────────────────────────────────────────

/// Salary statistics for one group, every figure rounded to an integer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryStat {
    #[serde(rename = "group")]
    pub group_key: String,
    #[serde(rename = "Average Salary")]
    pub mean: f64,
    #[serde(rename = "Typical Salary")]
    pub median: f64,
    #[serde(rename = "Lowest Salary")]
    pub min: f64,
    #[serde(rename = "Highest Salary")]
    pub max: f64,
    #[serde(rename = "Number of Jobs")]
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillCount {
    pub skill: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyCount {
    pub company: String,
    #[serde(rename = "job_count")]
    pub count: usize,
}

/// Per-location job volume and salary averages.
///
/// The averages are `None` when no row of the location carries a salary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationStat {
    pub location: String,
    pub job_count: usize,
    pub avg_salary_min: Option<f64>,
    pub avg_salary_max: Option<f64>,
    pub avg_salary: Option<f64>,
}

/// Number of postings on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExperienceCount {
    #[serde(rename = "experience_level")]
    pub level: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleCount {
    pub role: String,
    pub count: usize,
}

/// Headline figures for the whole dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryStats {
    pub total_jobs: usize,
    pub total_companies: usize,
    pub total_locations: usize,
    pub avg_salary: i64,
    pub jobs_today: usize,
    pub jobs_this_week: usize,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
