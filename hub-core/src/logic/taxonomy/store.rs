//! Taxonomy Store
//!
//! Loads the ATT&CK snapshot written by the taxonomy downloader. Never fails:
//! a missing or malformed file degrades to the built-in tactic table.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::types::{Tactic, Taxonomy, TaxonomySource, Technique};

// ============================================================================
// FALLBACK TACTICS
// ============================================================================

/// Canonical enterprise kill chain: (id, name, shortname). Position is `order`.
pub const FALLBACK_TACTICS: [(&str, &str, &str); 14] = [
    ("TA0043", "Reconnaissance", "Reconnaissance"),
    ("TA0042", "Resource Development", "Resource Dev"),
    ("TA0001", "Initial Access", "Initial Access"),
    ("TA0002", "Execution", "Execution"),
    ("TA0003", "Persistence", "Persistence"),
    ("TA0004", "Privilege Escalation", "Priv Escalation"),
    ("TA0005", "Defense Evasion", "Defense Evasion"),
    ("TA0006", "Credential Access", "Cred Access"),
    ("TA0007", "Discovery", "Discovery"),
    ("TA0008", "Lateral Movement", "Lateral Move"),
    ("TA0009", "Collection", "Collection"),
    ("TA0011", "Command and Control", "C2"),
    ("TA0010", "Exfiltration", "Exfiltration"),
    ("TA0040", "Impact", "Impact"),
];

pub fn fallback_tactics() -> Vec<Tactic> {
    FALLBACK_TACTICS
        .iter()
        .enumerate()
        .map(|(order, (id, name, shortname))| Tactic {
            id: id.to_string(),
            name: name.to_string(),
            shortname: shortname.to_string(),
            order: order as u32,
            kill_chain_phase: None,
        })
        .collect()
}

impl Taxonomy {
    /// Built-in tactics, no techniques
    pub fn fallback() -> Self {
        Self {
            tactics: fallback_tactics(),
            techniques: BTreeMap::new(),
            source: TaxonomySource::Fallback,
        }
    }

    pub fn technique(&self, id: &str) -> Option<&Technique> {
        self.techniques.get(id)
    }
}

// ============================================================================
// LOADING
// ============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum TaxonomyFile {
    Structured {
        tactics: Vec<Tactic>,
        techniques: BTreeMap<String, Technique>,
    },
    Legacy(BTreeMap<String, Technique>),
}

/// Load the taxonomy snapshot at `path`
pub fn load_taxonomy(path: &Path) -> Taxonomy {
    if !path.exists() {
        log::warn!(
            "{} not found. Run the taxonomy downloader to generate it; using fallback tactics",
            path.display()
        );
        return Taxonomy::fallback();
    }

    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            log::error!("Error loading MITRE data from {}: {}", path.display(), e);
            return Taxonomy::fallback();
        }
    };

    match parse_taxonomy(&text) {
        Ok(taxonomy) => {
            match taxonomy.source {
                TaxonomySource::Legacy => log::info!(
                    "Loaded {} techniques (legacy format, using fallback tactics)",
                    taxonomy.techniques.len()
                ),
                _ => log::info!(
                    "Loaded {} tactics and {} techniques",
                    taxonomy.tactics.len(),
                    taxonomy.techniques.len()
                ),
            }
            taxonomy
        }
        Err(e) => {
            log::error!("Invalid JSON in MITRE data file {}: {}", path.display(), e);
            Taxonomy::fallback()
        }
    }
}

/// Parse either accepted file shape
pub fn parse_taxonomy(text: &str) -> Result<Taxonomy, serde_json::Error> {
    let taxonomy = match serde_json::from_str::<TaxonomyFile>(text)? {
        TaxonomyFile::Structured { mut tactics, techniques } => {
            tactics.sort_by_key(|t| t.order);
            for tactic in &mut tactics {
                if tactic.shortname.is_empty() {
                    tactic.shortname = tactic.name.clone();
                }
            }
            Taxonomy {
                tactics,
                techniques: keyed(techniques),
                source: TaxonomySource::Structured,
            }
        }
        TaxonomyFile::Legacy(techniques) => Taxonomy {
            tactics: fallback_tactics(),
            techniques: keyed(techniques),
            source: TaxonomySource::Legacy,
        },
    };
    Ok(taxonomy)
}

fn keyed(techniques: BTreeMap<String, Technique>) -> BTreeMap<String, Technique> {
    techniques
        .into_iter()
        .map(|(id, mut technique)| {
            technique.id = id.clone();
            (id, technique)
        })
        .collect()
}
