//! Content Module - Document Loader & Normalizer
//!
//! Turns a directory of YAML detection documents into typed records plus
//! the derived filter index.
//!
//! # Components
//! - `types.rs`: `ContentRecord`, `ContentType`, `FilterIndex`, load errors
//! - `normalize.rs`: per-document validation and defaults
//! - `loader.rs`: directory scan and batch report

pub mod types;
pub mod normalize;
pub mod loader;


pub use types::{
    ContentRecord, ContentType, FilterIndex,
    LoadError, LoadErrorKind, LoadReport, LoaderOptions,
};
pub use normalize::{canonical_mitre_id, normalize_document, MITRE_ID_PATTERN};
pub use loader::{load_content, load_document};
