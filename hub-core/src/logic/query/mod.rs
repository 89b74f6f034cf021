//! Query Module - search / filter / sort
//!
//! # Components
//! - `types.rs`: `SearchParams` (raw), `SearchRequest` (validated), `SortKey`
//! - `sanitize.rs`: raw → validated
//! - `engine.rs`: the pure search function

pub mod types;
pub mod sanitize;
pub mod engine;


pub use types::{SearchParams, SearchRequest, SortKey};
pub use sanitize::sanitize_string;
pub use engine::{matches_text, search, severity_rank, sort_records};
