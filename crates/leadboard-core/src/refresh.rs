//! Time-to-live cache in front of a [`LeadSource`].

use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::LeadError;
use crate::model::SheetValues;
use crate::source::LeadSource;

struct Snapshot {
    values: SheetValues,
    fetched_at: Instant,
}

/// Serves the last fetched sheet until it is older than `ttl` or explicitly
/// invalidated. Owned by the caller; there is no process-wide cache.
pub struct CachedSource<S: LeadSource> {
    source: S,
    ttl: Duration,
    snapshot: Option<Snapshot>,
}

impl<S: LeadSource> CachedSource<S> {
    pub fn new(source: S, ttl: Duration) -> Self {
        CachedSource {
            source,
            ttl,
            snapshot: None,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Current values and whether they came from the cache.
    ///
    /// An expired snapshot is dropped before refetching, so a failed refetch
    /// returns the error instead of stale data.
    pub fn get(&mut self) -> Result<(SheetValues, bool), LeadError> {
        if let Some(snapshot) = &self.snapshot {
            if snapshot.fetched_at.elapsed() < self.ttl {
                debug!(source = self.source.name(), "serving cached values");
                return Ok((snapshot.values.clone(), true));
            }
            self.snapshot = None;
        }

        debug!(source = self.source.name(), "fetching values");
        let values = self.source.fetch()?;
        self.snapshot = Some(Snapshot {
            values: values.clone(),
            fetched_at: Instant::now(),
        });
        Ok((values, false))
    }

    /// Force the next `get` to hit the source.
    pub fn invalidate(&mut self) {
        self.snapshot = None;
    }

    pub fn is_cached(&self) -> bool {
        self.snapshot
            .as_ref()
            .is_some_and(|s| s.fetched_at.elapsed() < self.ttl)
    }
}
