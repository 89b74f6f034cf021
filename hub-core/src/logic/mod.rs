//! Logic Module - Content Hub Engines
//!
//! ## Architecture
//! - `content/` - YAML document loader, normalizer, filter index
//! - `taxonomy/` - MITRE ATT&CK store, technique matcher, tactic matrix
//! - `query/` - search request sanitization and the query engine
//! - `snapshot` - immutable dataset snapshot and its publish slot
//! - `refresh/` - webhook verification and the git-driven refresh controller

pub mod content;
pub mod taxonomy;
pub mod query;
pub mod snapshot;
pub mod refresh;

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::Path;

    use crate::logic::content::{ContentRecord, ContentType};

    pub fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    pub fn write_doc(dir: &Path, name: &str, body: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, body).unwrap();
    }

    /// Bare record: xql type, empty text fields
    pub fn record(id: &str, name: &str, mitre: &[&str]) -> ContentRecord {
        ContentRecord {
            id: id.to_string(),
            content_type: ContentType::Xql,
            mitre_ids: mitre.iter().map(|m| m.to_string()).collect(),
            log_sources: Vec::new(),
            tags: Vec::new(),
            name: name.to_string(),
            description: String::new(),
            author: String::new(),
            query: String::new(),
            severity: String::new(),
            extra: Default::default(),
        }
    }
}
