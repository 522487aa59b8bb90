//! Concurrent dashboard build.
//!
//! The aggregations are independent reads of one immutable snapshot, so each
//! runs on its own blocking task over `Arc`-shared inputs.

use std::sync::Arc;

use market_core::models::Dataset;
use market_core::settings::DashboardRequest;
use market_data::{DashboardReport, MarketAnalyzer, WidgetResults};
use tokio::task::JoinHandle;

fn spawn_widget<T, F>(analyzer: &Arc<MarketAnalyzer>, data: &Arc<Dataset>, widget: F) -> JoinHandle<T>
where
    F: FnOnce(&MarketAnalyzer, &Dataset) -> T + Send + 'static,
    T: Send + 'static,
{
    let analyzer = Arc::clone(analyzer);
    let data = Arc::clone(data);
    tokio::task::spawn_blocking(move || widget(&analyzer, &data))
}

/// Build the dashboard for `request`, running the aggregations in parallel.
pub async fn build_report_concurrently(
    analyzer: Arc<MarketAnalyzer>,
    dataset: Arc<Dataset>,
    request: DashboardRequest,
) -> anyhow::Result<DashboardReport> {
    let filtered = Arc::new(analyzer.filter_by_location(&dataset, &request.location));
    let metadata = analyzer.report_metadata(&dataset, &filtered, &request);

    let DashboardRequest {
        group_by,
        top_skills,
        top_companies,
        top_roles,
        days,
        ..
    } = request;

    let (
        summary,
        salary_trends,
        skills,
        companies,
        location_stats,
        posting_trends,
        experience_distribution,
        role_distribution,
    ) = tokio::try_join!(
        spawn_widget(&analyzer, &dataset, |a, d| a.summary_stats(d)),
        spawn_widget(&analyzer, &filtered, move |a, d| a.salary_trends(d, group_by)),
        spawn_widget(&analyzer, &filtered, move |a, d| a.top_skills(d, top_skills)),
        spawn_widget(&analyzer, &filtered, move |a, d| a.top_companies(d, top_companies)),
        spawn_widget(&analyzer, &filtered, |a, d| a.location_stats(d)),
        spawn_widget(&analyzer, &filtered, move |a, d| a.posting_trends(d, days)),
        spawn_widget(&analyzer, &filtered, |a, d| a.experience_distribution(d)),
        spawn_widget(&analyzer, &filtered, move |a, d| a.role_distribution(d, top_roles)),
    )?;

    let results = WidgetResults {
        summary,
        salary_trends,
        top_skills: skills,
        top_companies: companies,
        location_stats,
        posting_trends,
        experience_distribution,
        role_distribution,
    };
    Ok(analyzer.settle_report(metadata, results))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use market_core::models::JobPosting;

    fn snapshot() -> Dataset {
        let posting = |id: &str, location: &str, skills: &str| JobPosting {
            title: Some("Software Engineer".to_string()),
            company: Some("Acme".to_string()),
            location: Some(location.to_string()),
            salary_min: Some(100.0),
            salary_max: Some(300.0),
            skills: Some(skills.to_string()),
            posted_date: Some("2024-03-14T09:00:00Z".to_string()),
            ..JobPosting::new(id)
        };
        Dataset::new(vec![
            posting("1", "Pune", "Rust, Go"),
            posting("2", "Delhi", "Rust"),
            posting("3", "Remote", "SQL"),
        ])
    }

    #[tokio::test]
    async fn test_concurrent_build_matches_sequential_build() {
        let analyzer =
            MarketAnalyzer::new().with_now(Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap());
        let dataset = snapshot();
        let request = DashboardRequest {
            location: "Pune".to_string(),
            days: 7,
            ..DashboardRequest::default()
        };

        let sequential = analyzer.build_report(&dataset, &request);
        let concurrent =
            build_report_concurrently(Arc::new(analyzer), Arc::new(dataset), request)
                .await
                .unwrap();

        assert_eq!(concurrent, sequential);
        assert_eq!(concurrent.metadata.records_filtered, 2);
        assert_eq!(concurrent.posting_trends.len(), 8);
    }
}
