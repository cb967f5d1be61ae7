use super::SessionCatalog;

/// Cross-session statistics of one category. Derived on demand from a catalog snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryAggregate {
    pub category: String,
    /// Sessions that contributed, i.e. sessions with telemetry
    pub session_count: usize,
    /// All sessions of the category, with or without telemetry
    pub run_count: usize,
    /// Mean of the per-session mean speeds
    pub mean_of_means: f64,
    /// Best per-session mean speed
    pub best_mean: f64,
    /// Highest speed recorded in any session of the category
    pub record_max: f64,
}

impl CategoryAggregate {
    fn empty(category: &str, run_count: usize) -> Self {
        Self {
            category: category.to_string(),
            session_count: 0,
            run_count,
            mean_of_means: 0.,
            best_mean: 0.,
            record_max: 0.,
        }
    }

    /// Whether there is anything worth displaying. Derived metrics of an empty aggregate are
    /// zero placeholders.
    pub fn has_data(&self) -> bool {
        self.session_count > 0
    }
}

/// Aggregate all sessions of `category` that carry telemetry.
///
/// Every session weighs the same regardless of how many samples it has: the result is the mean of
/// the per-session means, not the mean over all samples together.
pub fn aggregate(catalog: &SessionCatalog, category: &str) -> CategoryAggregate {
    let runs = catalog
        .records()
        .iter()
        .filter(|r| r.category == category)
        .collect::<Vec<_>>();
    let per_session = runs.iter().filter_map(|r| r.stats()).collect::<Vec<_>>();

    if per_session.is_empty() {
        return CategoryAggregate::empty(category, runs.len());
    }

    let count = per_session.len();
    let sum_of_means: f64 = per_session.iter().map(|s| s.avg_speed).sum();
    CategoryAggregate {
        category: category.to_string(),
        session_count: count,
        run_count: runs.len(),
        mean_of_means: sum_of_means / count as f64,
        best_mean: per_session
            .iter()
            .map(|s| s.avg_speed)
            .fold(f64::MIN, f64::max),
        record_max: per_session
            .iter()
            .map(|s| s.max_speed)
            .fold(f64::MIN, f64::max),
    }
}
