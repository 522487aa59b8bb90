//! Time-based aggregations: the daily posting trend and the summary figures.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Days, NaiveDate, TimeDelta, Utc};
use market_core::calculations::{mean, midpoint};
use market_core::error::{AnalyticsError, Result};
use market_core::models::{Column, DailyCount, Dataset, JobPosting, SummaryStats};
use tracing::{debug, info};

use crate::aggregator::checked_salary;
use crate::analyzer::MarketAnalyzer;

/// Length of the "this week" window in Summary Statistics, in days.
const WEEK_DAYS: u64 = 7;

impl MarketAnalyzer {
    /// Parse a posting's date, logging and skipping unparseable cells.
    fn posted_at(&self, operation: &'static str, posting: &JobPosting) -> Option<DateTime<Utc>> {
        let raw = posting.posted_date.as_deref()?;
        let parsed = self.dates().parse(raw);
        if parsed.is_none() {
            self.log(|| {
                debug!(
                    parent: self.span(),
                    operation,
                    job_id = %posting.job_id,
                    column = %Column::PostedDate,
                    "skipping unparseable posted date"
                )
            });
        }
        parsed
    }

    /// Daily posting counts over the trailing `days`-day window.
    ///
    /// Postings at or after `now - days` are bucketed by calendar date in the
    /// analyzer's timezone. The series covers every day from `today - days`
    /// through `today`, so it always has `days + 1` entries, zero-filled where
    /// nothing was posted. A posting counts only if its calendar date lies in
    /// that series, so the counts always sum to the contributing postings.
    /// Empty when the column is missing or no posting falls in the window.
    pub fn posting_trends(&self, dataset: &Dataset, days: u32) -> Result<Vec<DailyCount>> {
        const OP: &str = "posting_trends";
        let out_of_range = || AnalyticsError::WindowOutOfRange { operation: OP, days };

        if dataset.is_empty() || !dataset.has_column(Column::PostedDate) {
            return Ok(Vec::new());
        }

        let cutoff = TimeDelta::try_days(i64::from(days))
            .and_then(|window| self.now().checked_sub_signed(window))
            .ok_or_else(out_of_range)?;
        let today = self.dates().calendar_date(self.now());
        let first_day = today
            .checked_sub_days(Days::new(u64::from(days)))
            .ok_or_else(out_of_range)?;

        let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        let mut in_window = 0usize;
        for posting in dataset.records() {
            let Some(posted) = self.posted_at(OP, posting) else {
                continue;
            };
            if posted < cutoff {
                continue;
            }
            // The instant cutoff and the first calendar day disagree across
            // DST shifts; the calendar range is authoritative.
            let day = self.dates().calendar_date(posted);
            if day < first_day || day > today {
                continue;
            }
            in_window += 1;
            *per_day.entry(day).or_default() += 1;
        }

        if in_window == 0 {
            return Ok(Vec::new());
        }

        let series: Vec<DailyCount> = first_day
            .iter_days()
            .take_while(|date| *date <= today)
            .map(|date| DailyCount {
                date,
                count: per_day.get(&date).copied().unwrap_or(0),
            })
            .collect();

        self.log(|| {
            info!(
                parent: self.span(),
                operation = OP,
                "Calculated posting trends for {} days",
                series.len()
            )
        });
        Ok(series)
    }

    /// Headline figures over the whole dataset.
    ///
    /// `None` for an empty dataset, which is distinct from a dataset with no
    /// recent activity. Figures whose column is missing are zero.
    /// `avg_salary` is the truncated mean midpoint of valid salary pairs;
    /// `jobs_this_week` counts postings dated from `today - 7` through today.
    pub fn summary_stats(&self, dataset: &Dataset) -> Result<Option<SummaryStats>> {
        const OP: &str = "summary_stats";

        if dataset.is_empty() {
            return Ok(None);
        }
        let records = dataset.records();

        let distinct = |column: Column, field: fn(&JobPosting) -> Option<&str>| -> usize {
            if !dataset.has_column(column) {
                return 0;
            }
            records.iter().filter_map(field).collect::<HashSet<_>>().len()
        };
        let total_companies = distinct(Column::Company, |p| p.company.as_deref());
        let total_locations = distinct(Column::Location, |p| p.location.as_deref());

        let mut avg_salary = 0;
        if dataset.has_column(Column::SalaryMin) && dataset.has_column(Column::SalaryMax) {
            let mut midpoints = Vec::new();
            for posting in records {
                if let Some((min, max)) = checked_salary(OP, posting)? {
                    midpoints.push(midpoint(min, max));
                }
            }
            if let Some(average) = mean(&midpoints) {
                avg_salary = average.trunc() as i64;
            }
        }

        let mut jobs_today = 0;
        let mut jobs_this_week = 0;
        if dataset.has_column(Column::PostedDate) {
            let today = self.dates().calendar_date(self.now());
            let week_ago = today
                .checked_sub_days(Days::new(WEEK_DAYS))
                .ok_or_else(|| AnalyticsError::Computation {
                    operation: OP,
                    detail: format!("no calendar date {WEEK_DAYS} days before {today}"),
                })?;
            for posting in records {
                let Some(posted) = self.posted_at(OP, posting) else {
                    continue;
                };
                let date = self.dates().calendar_date(posted);
                if date == today {
                    jobs_today += 1;
                }
                if (week_ago..=today).contains(&date) {
                    jobs_this_week += 1;
                }
            }
        }

        self.log(|| info!(parent: self.span(), operation = OP, "Calculated summary statistics"));
        Ok(Some(SummaryStats {
            total_jobs: records.len(),
            total_companies,
            total_locations,
            avg_salary,
            jobs_today,
            jobs_this_week,
        }))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
