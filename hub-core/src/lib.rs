//! XQL Hub Core - detection content catalog
//!
//! Loads a directory of YAML detection documents and a MITRE ATT&CK snapshot
//! into an immutable dataset, answers search queries against it, and swaps in
//! a fresh dataset when a signed webhook reports new content upstream.

pub mod constants;
pub mod logic;

pub use logic::content::{ContentRecord, ContentType, FilterIndex, LoaderOptions};
pub use logic::query::{search, SearchParams, SearchRequest, SortKey};
pub use logic::refresh::{
    ContentSource, GitSource, GitSourceConfig, RefreshConfig, RefreshController, RefreshError,
    RefreshStatus, RefreshTrigger, TriggerOutcome, WebhookSecret,
};
pub use logic::snapshot::{DataPaths, DatasetSnapshot, SnapshotStore};
pub use logic::taxonomy::{Taxonomy, TaxonomyMatrix};
