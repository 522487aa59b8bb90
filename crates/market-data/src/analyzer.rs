//! Shared context for every aggregation.
//!
//! A [`MarketAnalyzer`] carries the explicit inputs the aggregations depend
//! on besides the dataset itself: the reference instant, the posted-date
//! parser, the role classifier, the location normaliser, and the tracing
//! dispatcher and span that diagnostics are sent to.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use market_core::error::Result;
use market_core::location::{CityNormalizer, LocationNormalizer};
use market_core::roles::RoleClassifier;
use market_core::time_utils::PostedDateParser;
use tracing::{warn, Dispatch, Span};

// ── MarketAnalyzer ────────────────────────────────────────────────────────────

/// Immutable aggregation context. Cheap to clone and safe to share across
/// threads; every aggregation borrows it and the dataset read-only.
#[derive(Clone)]
pub struct MarketAnalyzer {
    now: DateTime<Utc>,
    dates: PostedDateParser,
    classifier: RoleClassifier,
    normalizer: Arc<dyn LocationNormalizer>,
    dispatch: Dispatch,
    span: Span,
}

impl Default for MarketAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MarketAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarketAnalyzer")
            .field("now", &self.now)
            .field("timezone", &self.dates.reference())
            .field("rules", &self.classifier.rules().len())
            .finish_non_exhaustive()
    }
}

impl MarketAnalyzer {
    /// Context anchored at the current instant, with UTC calendar days, the
    /// default role table and [`CityNormalizer`]. Diagnostics are discarded
    /// until a dispatcher is supplied with [`with_dispatch`](Self::with_dispatch);
    /// the process-wide default subscriber is never consulted.
    pub fn new() -> Self {
        Self {
            now: Utc::now(),
            dates: PostedDateParser::default(),
            classifier: RoleClassifier::default(),
            normalizer: Arc::new(CityNormalizer),
            dispatch: Dispatch::none(),
            span: Span::none(),
        }
    }

    /// Anchor trailing windows and "today" at `now`.
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Interpret naive timestamps and bucket calendar days in `timezone`.
    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.dates = PostedDateParser::new(timezone);
        self
    }

    pub fn with_classifier(mut self, classifier: RoleClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_normalizer(mut self, normalizer: impl LocationNormalizer + 'static) -> Self {
        self.normalizer = Arc::new(normalizer);
        self
    }

    /// Send diagnostics emitted by aggregations to `dispatch`.
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Attach diagnostics emitted by aggregations to `span`. The span should
    /// belong to the same dispatcher as [`with_dispatch`](Self::with_dispatch).
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn dates(&self) -> &PostedDateParser {
        &self.dates
    }

    pub fn classifier(&self) -> &RoleClassifier {
        &self.classifier
    }

    pub fn normalizer(&self) -> &dyn LocationNormalizer {
        self.normalizer.as_ref()
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Run `emit` with this analyzer's dispatcher as the default, so the
    /// events it records reach that dispatcher only.
    pub(crate) fn log(&self, emit: impl FnOnce()) {
        tracing::dispatcher::with_default(&self.dispatch, emit)
    }

    /// Unwrap an aggregation result for rendering: failures are logged with
    /// the failing operation and replaced by the empty value.
    pub fn settle<T: Default>(&self, result: Result<T>) -> T {
        match result {
            Ok(value) => value,
            Err(err) => {
                self.log(|| {
                    warn!(
                        parent: &self.span,
                        operation = err.operation().unwrap_or("unknown"),
                        error = %err,
                        "aggregation failed; rendering an empty widget"
                    )
                });
                T::default()
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
