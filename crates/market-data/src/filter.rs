//! Location filtering of a dataset snapshot.

use market_core::location::REMOTE;
use market_core::models::{Column, Dataset};
use market_core::settings::ALL_LOCATIONS;
use tracing::debug;

use crate::analyzer::MarketAnalyzer;

impl MarketAnalyzer {
    /// Restrict `dataset` to postings in `location`.
    ///
    /// An empty request or the `"All"` sentinel returns the dataset unchanged.
    /// Otherwise both the request and every posting's location are
    /// normalised and lower-cased; a posting is kept when the two are equal or
    /// when the posting is remote. Row order is preserved.
    pub fn filter_by_location(&self, dataset: &Dataset, location: &str) -> Dataset {
        if location.is_empty() || location == ALL_LOCATIONS {
            return dataset.clone();
        }

        if !dataset.has_column(Column::Location) {
            self.log(|| {
                debug!(
                    parent: self.span(),
                    operation = "filter_by_location",
                    column = %Column::Location,
                    "column missing; no posting can match"
                )
            });
            return dataset.empty_like();
        }

        let normalizer = self.normalizer();
        let wanted = normalizer.normalize(location).to_lowercase();
        let remote = REMOTE.to_lowercase();

        let records: Vec<_> = dataset
            .records()
            .iter()
            .filter(|posting| {
                let normalized = normalizer
                    .normalize(posting.location.as_deref().unwrap_or_default())
                    .to_lowercase();
                normalized == wanted || normalized == remote
            })
            .cloned()
            .collect();

        self.log(|| {
            debug!(
                parent: self.span(),
                operation = "filter_by_location",
                location,
                kept = records.len(),
                total = dataset.len(),
                "filtered postings by location"
            )
        });
        dataset.with_records(records)
    }
}
