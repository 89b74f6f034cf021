//! Dataset Snapshot
//!
//! The immutable bundle readers query against, and the single slot it is
//! published through. Readers clone the `Arc` and drop the lock immediately;
//! a publish replaces the `Arc` in one step, so a reader only ever sees the
//! snapshot it started with.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::constants::DEFAULT_MITRE_DATA_PATH;
use crate::logic::content::{load_content, ContentRecord, FilterIndex, LoadError, LoadReport, LoaderOptions};
use crate::logic::taxonomy::{
    build_matrix, load_taxonomy, techniques_in_use, Taxonomy, TaxonomyMatrix, TechniqueUsage,
};

/// Inputs for building a snapshot
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub loader: LoaderOptions,
    pub mitre_data: PathBuf,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            loader: LoaderOptions::default(),
            mitre_data: PathBuf::from(DEFAULT_MITRE_DATA_PATH),
        }
    }
}

/// Records, filter index and taxonomy from one load pass
#[derive(Debug, Clone)]
pub struct DatasetSnapshot {
    /// Assigned on publish; 0 until then
    pub generation: u64,
    pub loaded_at: DateTime<Utc>,
    pub records: Vec<ContentRecord>,
    pub filters: FilterIndex,
    pub taxonomy: Taxonomy,
    pub load_errors: Vec<LoadError>,
}

impl DatasetSnapshot {
    /// No content, fallback taxonomy
    pub fn empty() -> Self {
        Self::from_parts(LoadReport::default(), Taxonomy::fallback())
    }

    pub fn from_parts(report: LoadReport, taxonomy: Taxonomy) -> Self {
        Self {
            generation: 0,
            loaded_at: Utc::now(),
            records: report.records,
            filters: report.filters,
            taxonomy,
            load_errors: report.errors,
        }
    }

    /// Run the loader and the taxonomy store. Blocking filesystem work.
    pub fn build(paths: &DataPaths) -> Self {
        let taxonomy = load_taxonomy(&paths.mitre_data);
        let report = load_content(&paths.loader);
        Self::from_parts(report, taxonomy)
    }

    pub fn find(&self, id: &str) -> Option<&ContentRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn techniques_in_use(&self) -> BTreeMap<String, TechniqueUsage> {
        techniques_in_use(&self.records)
    }

    pub fn matrix(&self) -> TaxonomyMatrix {
        build_matrix(&self.techniques_in_use(), &self.taxonomy)
    }

    /// Same records, filters and taxonomy; generation and timestamp ignored
    pub fn same_content(&self, other: &DatasetSnapshot) -> bool {
        self.records == other.records
            && self.filters == other.filters
            && self.taxonomy == other.taxonomy
            && self.load_errors == other.load_errors
    }
}

// ============================================================================
// STORE
// ============================================================================

/// Process-wide "current snapshot" slot
pub struct SnapshotStore {
    current: RwLock<Arc<DatasetSnapshot>>,
}

impl SnapshotStore {
    /// Publish `initial` as generation 1
    pub fn new(mut initial: DatasetSnapshot) -> Self {
        initial.generation = 1;
        Self {
            current: RwLock::new(Arc::new(initial)),
        }
    }

    /// The snapshot to serve this request from
    pub fn current(&self) -> Arc<DatasetSnapshot> {
        self.current.read().clone()
    }

    pub fn generation(&self) -> u64 {
        self.current.read().generation
    }

    /// Swap in `next`; returns the snapshot as published
    pub fn publish(&self, mut next: DatasetSnapshot) -> Arc<DatasetSnapshot> {
        let mut slot = self.current.write();
        next.generation = slot.generation + 1;
        let published = Arc::new(next);
        *slot = published.clone();
        drop(slot);

        log::info!(
            "Published dataset generation {} ({} records)",
            published.generation,
            published.records.len()
        );
        published
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new(DatasetSnapshot::empty())
    }
}
