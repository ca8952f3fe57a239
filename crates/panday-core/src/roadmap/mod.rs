//! Roadmap loading, caching, validation and progress.
//!
//! A roadmap is a directory of `metadata.json`, `graph.json` and one markdown
//! file per node. The [`RoadmapSource`] port reads them (the filesystem
//! adapter lives in panday-infra); [`RoadmapCache`] keeps built roadmaps for
//! five minutes.

pub mod cache;
pub mod markdown;
pub mod progress;
pub mod source;
pub mod validation;

pub use cache::{RefreshReport, RoadmapCache};
pub use source::{RoadmapSource, validate_roadmap_id};
