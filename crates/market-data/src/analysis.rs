//! Dashboard assembly.
//!
//! Runs every aggregation for one [`DashboardRequest`] and collects the
//! results into a [`DashboardReport`] ready for the presentation layer.

use market_core::error::Result;
use market_core::models::{
    CompanyCount, DailyCount, Dataset, ExperienceCount, LocationStat, RoleCount, SalaryStat,
    SkillCount, SummaryStats,
};
use market_core::settings::DashboardRequest;
use serde::Serialize;
use tracing::info;

use crate::analyzer::MarketAnalyzer;

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the dashboard tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportMetadata {
    /// RFC 3339 instant the trailing windows were anchored at.
    pub generated_at: String,
    /// IANA name of the timezone calendar days were taken in.
    pub timezone: String,
    /// Location filter that was applied.
    pub location: String,
    /// Postings in the snapshot.
    pub records_total: usize,
    /// Postings left after the location filter.
    pub records_filtered: usize,
}

/// Raw outcome of every aggregation, before failures are settled.
#[derive(Debug)]
pub struct WidgetResults {
    pub summary: Result<Option<SummaryStats>>,
    pub salary_trends: Result<Vec<SalaryStat>>,
    pub top_skills: Result<Vec<SkillCount>>,
    pub top_companies: Result<Vec<CompanyCount>>,
    pub location_stats: Result<Vec<LocationStat>>,
    pub posting_trends: Result<Vec<DailyCount>>,
    pub experience_distribution: Result<Vec<ExperienceCount>>,
    pub role_distribution: Result<Vec<RoleCount>>,
}

/// Every dashboard widget's table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub metadata: ReportMetadata,
    /// `None` when the snapshot holds no postings at all.
    pub summary: Option<SummaryStats>,
    pub salary_trends: Vec<SalaryStat>,
    pub top_skills: Vec<SkillCount>,
    pub top_companies: Vec<CompanyCount>,
    pub location_stats: Vec<LocationStat>,
    pub posting_trends: Vec<DailyCount>,
    pub experience_distribution: Vec<ExperienceCount>,
    pub role_distribution: Vec<RoleCount>,
}

// ── MarketAnalyzer ────────────────────────────────────────────────────────────

impl MarketAnalyzer {
    /// Metadata for a report over `dataset` filtered down to `filtered`.
    pub fn report_metadata(
        &self,
        dataset: &Dataset,
        filtered: &Dataset,
        request: &DashboardRequest,
    ) -> ReportMetadata {
        ReportMetadata {
            generated_at: self.now().to_rfc3339(),
            timezone: self.dates().reference().name().to_string(),
            location: request.location.clone(),
            records_total: dataset.len(),
            records_filtered: filtered.len(),
        }
    }

    /// Run every aggregation in turn.
    ///
    /// Summary statistics cover the whole snapshot; every other widget
    /// covers `filtered`.
    pub fn run_widgets(
        &self,
        dataset: &Dataset,
        filtered: &Dataset,
        request: &DashboardRequest,
    ) -> WidgetResults {
        WidgetResults {
            summary: self.summary_stats(dataset),
            salary_trends: self.salary_trends(filtered, request.group_by),
            top_skills: self.top_skills(filtered, request.top_skills),
            top_companies: self.top_companies(filtered, request.top_companies),
            location_stats: self.location_stats(filtered),
            posting_trends: self.posting_trends(filtered, request.days),
            experience_distribution: self.experience_distribution(filtered),
            role_distribution: self.role_distribution(filtered, request.top_roles),
        }
    }

    /// Settle every widget result into a report; failed widgets render empty.
    pub fn settle_report(&self, metadata: ReportMetadata, results: WidgetResults) -> DashboardReport {
        DashboardReport {
            metadata,
            summary: self.settle(results.summary),
            salary_trends: self.settle(results.salary_trends),
            top_skills: self.settle(results.top_skills),
            top_companies: self.settle(results.top_companies),
            location_stats: self.settle(results.location_stats),
            posting_trends: self.settle(results.posting_trends),
            experience_distribution: self.settle(results.experience_distribution),
            role_distribution: self.settle(results.role_distribution),
        }
    }

    /// Build the full dashboard for `request` on a single thread.
    pub fn build_report(&self, dataset: &Dataset, request: &DashboardRequest) -> DashboardReport {
        let filtered = self.filter_by_location(dataset, &request.location);
        let metadata = self.report_metadata(dataset, &filtered, request);
        let results = self.run_widgets(dataset, &filtered, request);

        self.log(|| {
            info!(
                parent: self.span(),
                location = %request.location,
                records = filtered.len(),
                "Built dashboard report"
            )
        });
        self.settle_report(metadata, results)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use market_core::models::{Column, GroupKey, JobPosting};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    fn posting(id: &str, location: &str, title: &str, salary: f64, days_ago: i64) -> JobPosting {
        JobPosting {
            job_id: id.to_string(),
            title: Some(title.to_string()),
            company: Some(format!("Company {id}")),
            location: Some(location.to_string()),
            salary_min: Some(salary),
            salary_max: Some(salary * 2.0),
            skills: Some("Rust, SQL".to_string()),
            experience: Some("2-4 years".to_string()),
            posted_date: Some((now() - Duration::days(days_ago)).to_rfc3339()),
        }
    }

    fn snapshot() -> Dataset {
        Dataset::new(vec![
            posting("1", "Pune", "Data Engineer", 100.0, 0),
            posting("2", "Mumbai", "Data Scientist", 200.0, 2),
            posting("3", "Remote", "Backend Developer", 300.0, 5),
        ])
    }

    #[test]
    fn test_build_report_all_locations() {
        let analyzer = MarketAnalyzer::new().with_now(now());
        let report = analyzer.build_report(&snapshot(), &DashboardRequest::default());

        assert_eq!(report.metadata.records_total, 3);
        assert_eq!(report.metadata.records_filtered, 3);
        assert_eq!(report.metadata.timezone, "UTC");
        assert_eq!(report.summary.as_ref().unwrap().total_jobs, 3);
        assert_eq!(report.salary_trends.len(), 3);
        assert_eq!(report.top_skills.len(), 2);
        assert_eq!(report.posting_trends.len(), 31);
        assert_eq!(report.role_distribution.len(), 3);
    }

    #[test]
    fn test_build_report_filters_all_but_summary() {
        let analyzer = MarketAnalyzer::new().with_now(now());
        let request = DashboardRequest {
            location: "Pune".to_string(),
            group_by: GroupKey::Title,
            ..DashboardRequest::default()
        };
        let report = analyzer.build_report(&snapshot(), &request);

        assert_eq!(report.metadata.records_filtered, 2);
        assert_eq!(report.summary.as_ref().unwrap().total_jobs, 3);
        let groups: Vec<&str> = report
            .salary_trends
            .iter()
            .map(|s| s.group_key.as_str())
            .collect();
        assert_eq!(groups, vec!["Backend Developer", "Data Engineer"]);
        assert_eq!(report.top_skills[0].count, 2);
    }

    #[test]
    fn test_build_report_empty_snapshot() {
        let analyzer = MarketAnalyzer::new().with_now(now());
        let report = analyzer.build_report(&Dataset::default(), &DashboardRequest::default());
        assert_eq!(report.summary, None);
        assert!(report.salary_trends.is_empty());
        assert!(report.posting_trends.is_empty());
    }

    #[test]
    fn test_failed_widget_renders_empty() {
        let ds = Dataset::with_columns(
            [Column::SalaryMin, Column::SalaryMax, Column::Skills],
            snapshot().records().to_vec(),
        );
        let analyzer = MarketAnalyzer::new().with_now(now());
        let filtered = ds.clone();
        let request = DashboardRequest::default();

        let results = analyzer.run_widgets(&ds, &filtered, &request);
        assert!(results.salary_trends.is_err());

        let report = analyzer.settle_report(analyzer.report_metadata(&ds, &filtered, &request), results);
        assert!(report.salary_trends.is_empty());
        assert_eq!(report.top_skills.len(), 2);
    }

    #[test]
    fn test_report_serializes_with_dashboard_labels() {
        let analyzer = MarketAnalyzer::new().with_now(now());
        let report = analyzer.build_report(&snapshot(), &DashboardRequest::default());
        let json = serde_json::to_value(&report).unwrap();

        assert!(json["salary_trends"][0].get("Average Salary").is_some());
        assert!(json["top_companies"][0].get("job_count").is_some());
        assert!(json["experience_distribution"][0].get("experience_level").is_some());
        assert_eq!(json["posting_trends"][30]["date"], "2024-03-15");
    }

    #[test]
    fn test_build_report_is_idempotent() {
        let analyzer = MarketAnalyzer::new().with_now(now());
        let ds = snapshot();
        let request = DashboardRequest::default();
        let first = serde_json::to_string(&analyzer.build_report(&ds, &request)).unwrap();
        let second = serde_json::to_string(&analyzer.build_report(&ds, &request)).unwrap();
        assert_eq!(first, second);
    }
}
