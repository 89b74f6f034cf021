//! ATT&CK Taxonomy Types

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

// ============================================================================
// TACTICS & TECHNIQUES
// ============================================================================

/// Top-level adversary goal (kill-chain column)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tactic {
    /// `TA####`
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub shortname: String,
    /// Kill-chain display position, ascending
    #[serde(default)]
    pub order: u32,
    /// Kill-chain phase slug, e.g. `initial-access`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kill_chain_phase: Option<String>,
}

/// Technique or sub-technique metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Technique {
    /// Filled from the map key when loading
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Tactics this technique belongs to; may be empty
    #[serde(default)]
    pub tactic_ids: Vec<String>,
}

/// Where the loaded taxonomy came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxonomySource {
    /// `{tactics, techniques}` file
    Structured,
    /// Bare techniques map, built-in tactics
    Legacy,
    /// No usable file, built-in tactics only
    Fallback,
}

/// Tactics in kill-chain order plus techniques by id
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Taxonomy {
    pub tactics: Vec<Tactic>,
    pub techniques: BTreeMap<String, Technique>,
    pub source: TaxonomySource,
}

// ============================================================================
// MATCHER OUTPUT
// ============================================================================

/// A base technique referenced by loaded content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TechniqueUsage {
    pub id: String,
    /// Full sub-technique ids seen under this base
    pub subtechniques: BTreeSet<String>,
    /// Records referencing the base or any of its sub-techniques
    pub record_count: usize,
}

/// One in-use technique placed in the matrix
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixCell {
    pub id: String,
    /// None when the taxonomy does not know the id
    pub name: Option<String>,
    pub subtechniques: Vec<MatrixSubtechnique>,
    pub record_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixSubtechnique {
    pub id: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixColumn {
    pub tactic: Tactic,
    pub techniques: Vec<MatrixCell>,
}

/// Tactic-organized view of the techniques in use
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxonomyMatrix {
    pub columns: Vec<MatrixColumn>,
    /// In use, but unknown to the taxonomy or not mapped to a known tactic
    pub unmapped: Vec<MatrixCell>,
}
