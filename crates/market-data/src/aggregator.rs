//! Grouping and frequency aggregations over a posting snapshot.
//!
//! Salary trend, skill demand, company ranking, location statistics,
//! experience distribution and role distribution. None of them touches the
//! dataset it is given; working values live in locals of each call.

use std::collections::BTreeMap;

use market_core::calculations::{mean, median, midpoint, round_half_even, FrequencyCounter};
use market_core::error::{AnalyticsError, Result};
use market_core::models::{
    Column, CompanyCount, Dataset, ExperienceCount, GroupKey, JobPosting, LocationStat,
    RoleCount, SalaryStat, SkillCount,
};
use tracing::{debug, info};

use crate::analyzer::MarketAnalyzer;

// ── Shared helpers ────────────────────────────────────────────────────────────

/// The posting's valid salary pair, rejecting infinite bounds.
pub(crate) fn checked_salary(
    operation: &'static str,
    posting: &JobPosting,
) -> Result<Option<(f64, f64)>> {
    let Some((min, max)) = posting.valid_salary() else {
        return Ok(None);
    };
    for (column, value) in [(Column::SalaryMin, min), (Column::SalaryMax, max)] {
        if !value.is_finite() {
            return Err(AnalyticsError::NonFiniteValue {
                operation,
                column,
                job_id: posting.job_id.clone(),
            });
        }
    }
    Ok(Some((min, max)))
}

/// A present, non-NaN salary bound, rejecting infinities.
fn checked_bound(
    operation: &'static str,
    posting: &JobPosting,
    column: Column,
    value: Option<f64>,
) -> Result<Option<f64>> {
    match value {
        Some(v) if v.is_nan() => Ok(None),
        Some(v) if v.is_infinite() => Err(AnalyticsError::NonFiniteValue {
            operation,
            column,
            job_id: posting.job_id.clone(),
        }),
        other => Ok(other),
    }
}

#[derive(Default)]
struct LocationAccumulator {
    job_count: usize,
    salary_min: Vec<f64>,
    salary_max: Vec<f64>,
}

// ── Aggregations ──────────────────────────────────────────────────────────────

impl MarketAnalyzer {
    /// Salary statistics of valid salary pairs grouped by `group_by`.
    ///
    /// Each posting contributes its midpoint `(salary_min + salary_max) / 2`;
    /// mean, median, min and max of the midpoints are rounded to integers.
    /// Groups are ordered by descending mean, ties by group key.
    ///
    /// Missing salary columns or no valid pairs yield an empty table. A
    /// missing grouping column is an error.
    pub fn salary_trends(&self, dataset: &Dataset, group_by: GroupKey) -> Result<Vec<SalaryStat>> {
        const OP: &str = "salary_trends";

        if dataset.is_empty()
            || !dataset.has_column(Column::SalaryMin)
            || !dataset.has_column(Column::SalaryMax)
        {
            return Ok(Vec::new());
        }
        if !dataset.has_column(group_by.column()) {
            return Err(AnalyticsError::MissingColumn {
                operation: OP,
                column: group_by.column(),
            });
        }

        let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for posting in dataset.records() {
            let Some((min, max)) = checked_salary(OP, posting)? else {
                continue;
            };
            let Some(key) = group_by.value_of(posting) else {
                continue;
            };
            groups.entry(key).or_default().push(midpoint(min, max));
        }

        let mut stats: Vec<SalaryStat> = groups
            .into_iter()
            .filter_map(|(key, mut midpoints)| {
                midpoints.sort_by(f64::total_cmp);
                let average = mean(&midpoints)?;
                Some(SalaryStat {
                    group_key: key.to_string(),
                    mean: round_half_even(average),
                    median: round_half_even(median(&midpoints)),
                    min: round_half_even(*midpoints.first()?),
                    max: round_half_even(*midpoints.last()?),
                    count: midpoints.len(),
                })
            })
            .collect();
        stats.sort_by(|a, b| b.mean.total_cmp(&a.mean));

        self.log(|| {
            info!(
                parent: self.span(),
                operation = OP,
                group_by = %group_by.column(),
                "Calculated salary trends for {} groups",
                stats.len()
            )
        });
        Ok(stats)
    }

    /// The `top_n` most requested skills, ties in first-seen order.
    pub fn top_skills(&self, dataset: &Dataset, top_n: usize) -> Result<Vec<SkillCount>> {
        const OP: &str = "top_skills";

        if dataset.is_empty() || !dataset.has_column(Column::Skills) {
            return Ok(Vec::new());
        }

        let counter: FrequencyCounter<&str> = dataset
            .records()
            .iter()
            .flat_map(JobPosting::skill_list)
            .collect();
        let skills: Vec<SkillCount> = counter
            .top(top_n)
            .into_iter()
            .map(|(skill, count)| SkillCount {
                skill: skill.to_string(),
                count,
            })
            .collect();

        self.log(|| {
            info!(
                parent: self.span(),
                operation = OP,
                "Found {} top skills",
                skills.len()
            )
        });
        Ok(skills)
    }

    /// The `top_n` companies with the most postings.
    pub fn top_companies(&self, dataset: &Dataset, top_n: usize) -> Result<Vec<CompanyCount>> {
        const OP: &str = "top_companies";

        if dataset.is_empty() || !dataset.has_column(Column::Company) {
            return Ok(Vec::new());
        }

        let counter: FrequencyCounter<&str> = dataset
            .records()
            .iter()
            .filter_map(|p| p.company.as_deref())
            .collect();
        let companies: Vec<CompanyCount> = counter
            .top(top_n)
            .into_iter()
            .map(|(company, count)| CompanyCount {
                company: company.to_string(),
                count,
            })
            .collect();

        self.log(|| {
            info!(
                parent: self.span(),
                operation = OP,
                "Found {} top companies",
                companies.len()
            )
        });
        Ok(companies)
    }

    /// Job count and salary averages per raw location string.
    ///
    /// Unlike [`salary_trends`](Self::salary_trends) every present salary
    /// value counts, zeros included. Each mean is rounded; `avg_salary` is the
    /// midpoint of the two rounded means. Ordered by descending job count,
    /// ties by location.
    pub fn location_stats(&self, dataset: &Dataset) -> Result<Vec<LocationStat>> {
        const OP: &str = "location_stats";

        if dataset.is_empty() || !dataset.has_column(Column::Location) {
            return Ok(Vec::new());
        }
        let has_min = dataset.has_column(Column::SalaryMin);
        let has_max = dataset.has_column(Column::SalaryMax);

        let mut groups: BTreeMap<&str, LocationAccumulator> = BTreeMap::new();
        for posting in dataset.records() {
            let Some(location) = posting.location.as_deref() else {
                continue;
            };
            let acc = groups.entry(location).or_default();
            acc.job_count += 1;
            if has_min {
                if let Some(v) = checked_bound(OP, posting, Column::SalaryMin, posting.salary_min)? {
                    acc.salary_min.push(v);
                }
            }
            if has_max {
                if let Some(v) = checked_bound(OP, posting, Column::SalaryMax, posting.salary_max)? {
                    acc.salary_max.push(v);
                }
            }
        }

        let mut stats: Vec<LocationStat> = groups
            .into_iter()
            .map(|(location, acc)| {
                let avg_salary_min = mean(&acc.salary_min).map(round_half_even);
                let avg_salary_max = mean(&acc.salary_max).map(round_half_even);
                let avg_salary = match (avg_salary_min, avg_salary_max) {
                    (Some(lo), Some(hi)) => Some(midpoint(lo, hi)),
                    _ => None,
                };
                LocationStat {
                    location: location.to_string(),
                    job_count: acc.job_count,
                    avg_salary_min,
                    avg_salary_max,
                    avg_salary,
                }
            })
            .collect();
        stats.sort_by(|a, b| b.job_count.cmp(&a.job_count));

        self.log(|| {
            info!(
                parent: self.span(),
                operation = OP,
                "Calculated stats for {} locations",
                stats.len()
            )
        });
        Ok(stats)
    }

    /// Count of postings per experience label, most common first.
    pub fn experience_distribution(&self, dataset: &Dataset) -> Result<Vec<ExperienceCount>> {
        const OP: &str = "experience_distribution";

        if dataset.is_empty() || !dataset.has_column(Column::Experience) {
            return Ok(Vec::new());
        }

        let counter: FrequencyCounter<&str> = dataset
            .records()
            .iter()
            .filter_map(|p| p.experience.as_deref())
            .collect();
        let levels: Vec<ExperienceCount> = counter
            .ranked()
            .into_iter()
            .map(|(level, count)| ExperienceCount {
                level: level.to_string(),
                count,
            })
            .collect();

        self.log(|| {
            info!(
                parent: self.span(),
                operation = OP,
                "Calculated experience distribution"
            )
        });
        Ok(levels)
    }

    /// The `top_n` canonical roles by posting count.
    ///
    /// Every title is classified with the analyzer's [`RoleClassifier`];
    /// postings without a title count as the fallback role.
    ///
    /// [`RoleClassifier`]: market_core::roles::RoleClassifier
    pub fn role_distribution(&self, dataset: &Dataset, top_n: usize) -> Result<Vec<RoleCount>> {
        const OP: &str = "role_distribution";

        if dataset.is_empty() || !dataset.has_column(Column::Title) {
            return Ok(Vec::new());
        }

        let classifier = self.classifier();
        let counter: FrequencyCounter<&'static str> = dataset
            .records()
            .iter()
            .map(|p| classifier.classify(p.title.as_deref().unwrap_or_default()))
            .collect();
        self.log(|| {
            debug!(
                parent: self.span(),
                operation = OP,
                distinct_roles = counter.distinct(),
                "classified titles"
            )
        });

        let roles: Vec<RoleCount> = counter
            .top(top_n)
            .into_iter()
            .map(|(role, count)| RoleCount {
                role: role.to_string(),
                count,
            })
            .collect();

        self.log(|| info!(parent: self.span(), operation = OP, "Calculated role distribution"));
        Ok(roles)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
