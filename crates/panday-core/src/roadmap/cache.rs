//! Time-bounded roadmap cache.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use panday_types::error::RoadmapError;
use panday_types::roadmap::Roadmap;
use serde::Serialize;

use super::source::RoadmapSource;

pub const CACHE_TTL: Duration = Duration::from_secs(5 * 60);

struct CacheEntry {
    roadmap: Arc<Roadmap>,
    loaded_at: Instant,
}

/// Outcome of a full cache rebuild.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    pub refreshed: usize,
    pub failed: Vec<String>,
}

/// Caches built roadmaps for [`CACHE_TTL`].
///
/// Concurrent misses for the same ID may both rebuild; the last write wins.
pub struct RoadmapCache<S: RoadmapSource> {
    source: S,
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl<S: RoadmapSource> RoadmapCache<S> {
    pub fn new(source: S) -> Self {
        Self::with_ttl(source, CACHE_TTL)
    }

    pub fn with_ttl(source: S, ttl: Duration) -> Self {
        Self {
            source,
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Cached roadmap, rebuilt from the source when missing or stale.
    pub async fn get(&self, roadmap_id: &str) -> Result<Arc<Roadmap>, RoadmapError> {
        if let Some(entry) = self.entries.get(roadmap_id) {
            if entry.loaded_at.elapsed() < self.ttl {
                return Ok(Arc::clone(&entry.roadmap));
            }
        }

        let roadmap = Arc::new(self.source.build_roadmap(roadmap_id).await?);
        tracing::debug!(
            roadmap_id,
            nodes = roadmap.graph.nodes.len(),
            "roadmap loaded into cache"
        );
        self.entries.insert(
            roadmap_id.to_string(),
            CacheEntry {
                roadmap: Arc::clone(&roadmap),
                loaded_at: Instant::now(),
            },
        );
        Ok(roadmap)
    }

    /// Drop one entry, or everything when `roadmap_id` is `None`.
    pub fn clear(&self, roadmap_id: Option<&str>) {
        match roadmap_id {
            Some(id) => {
                self.entries.remove(id);
            }
            None => self.entries.clear(),
        }
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// Clear the cache and rebuild every available roadmap.
    pub async fn refresh_all(&self) -> Result<RefreshReport, RoadmapError> {
        self.clear(None);
        let mut report = RefreshReport::default();
        for id in self.source.available_roadmaps().await? {
            match self.get(&id).await {
                Ok(_) => report.refreshed += 1,
                Err(e) => {
                    tracing::warn!(roadmap_id = %id, error = %e, "roadmap refresh failed");
                    report.failed.push(id);
                }
            }
        }
        tracing::info!(
            refreshed = report.refreshed,
            failed = report.failed.len(),
            "roadmap cache refreshed"
        );
        Ok(report)
    }
}
