use std::collections::HashMap;
use std::sync::Arc;

use crate::player_stats::Dataset;
use crate::stats_fetch::{DataSource, FetchError};

/// Memoizes one dataset per season for the life of the owner. Entries are
/// never invalidated. Failed fetches and empty seasons are not stored, so a
/// retry hits the source again.
pub struct SeasonCache {
    source: Box<dyn DataSource>,
    entries: HashMap<String, Arc<Dataset>>,
    fetches: usize,
}

impl SeasonCache {
    pub fn new(source: Box<dyn DataSource>) -> Self {
        Self {
            source,
            entries: HashMap::new(),
            fetches: 0,
        }
    }

    pub fn get_or_fetch(&mut self, season: &str) -> Result<Arc<Dataset>, FetchError> {
        if let Some(dataset) = self.entries.get(season) {
            return Ok(Arc::clone(dataset));
        }
        self.fetches += 1;
        let dataset = self.source.fetch_season(season)?;
        if dataset.is_empty() {
            return Err(FetchError::NoRows {
                season: season.to_string(),
            });
        }
        let dataset = Arc::new(dataset);
        log::info!(
            "cached {} rows for season {season} from {}",
            dataset.len(),
            self.source.describe()
        );
        self.entries.insert(season.to_string(), Arc::clone(&dataset));
        Ok(dataset)
    }

    pub fn cached(&self, season: &str) -> Option<Arc<Dataset>> {
        self.entries.get(season).cloned()
    }

    /// Number of times the underlying source was called.
    pub fn fetch_count(&self) -> usize {
        self.fetches
    }

    pub fn source_label(&self) -> String {
        self.source.describe()
    }
}
