//! Taxonomy Module - MITRE ATT&CK store and matcher
//!
//! # Components
//! - `types.rs`: tactics, techniques, matrix output
//! - `store.rs`: snapshot file loading with legacy/fallback handling
//! - `matcher.rs`: technique hierarchy matching and tactic matrix

pub mod types;
pub mod store;
pub mod matcher;

pub use types::{
    MatrixCell, MatrixColumn, MatrixSubtechnique,
    Tactic, Taxonomy, TaxonomyMatrix, TaxonomySource, Technique, TechniqueUsage,
};
pub use store::{fallback_tactics, load_taxonomy, parse_taxonomy, FALLBACK_TACTICS};
pub use matcher::{
    base_technique_id, build_matrix, matches_any_technique, technique_matches, techniques_in_use,
};
