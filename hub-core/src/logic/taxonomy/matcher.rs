//! Taxonomy Matcher
//!
//! Technique hierarchy resolution over loaded content. Everything here is a
//! pure function of its inputs and safe to call from any number of readers.

use std::collections::{BTreeMap, BTreeSet};

use crate::logic::content::ContentRecord;
use super::types::{
    MatrixCell, MatrixColumn, MatrixSubtechnique, Taxonomy, TaxonomyMatrix, TechniqueUsage,
};

/// Separator between a technique and its sub-technique suffix
pub const SUBTECHNIQUE_SEPARATOR: char = '.';

/// `T1055.001` -> `T1055`; base ids are returned unchanged
pub fn base_technique_id(id: &str) -> &str {
    id.split(SUBTECHNIQUE_SEPARATOR).next().unwrap_or(id)
}

/// A selected id matches itself and any of its sub-techniques.
///
/// The relation is one-way: selecting `T1055` matches `T1055.001`, but
/// selecting `T1055.001` does not match a record tagged only `T1055`.
pub fn technique_matches(selected: &str, candidate: &str) -> bool {
    match candidate.strip_prefix(selected) {
        Some("") => true,
        Some(rest) => rest.starts_with(SUBTECHNIQUE_SEPARATOR),
        None => false,
    }
}

/// OR across the selection: any selected id matching any record id wins
pub fn matches_any_technique(selected: &[String], record: &ContentRecord) -> bool {
    selected.iter().any(|sel| {
        record
            .mitre_ids
            .iter()
            .any(|candidate| technique_matches(sel, candidate))
    })
}

/// Group every referenced technique id under its base id.
///
/// This is an aggregation of what content references; it does not consult the
/// taxonomy, so unknown ids are reported too.
pub fn techniques_in_use<'a, I>(records: I) -> BTreeMap<String, TechniqueUsage>
where
    I: IntoIterator<Item = &'a ContentRecord>,
{
    let mut in_use: BTreeMap<String, TechniqueUsage> = BTreeMap::new();

    for record in records {
        let mut counted: BTreeSet<&str> = BTreeSet::new();

        for id in &record.mitre_ids {
            let base = base_technique_id(id);
            let usage = in_use.entry(base.to_string()).or_insert_with(|| TechniqueUsage {
                id: base.to_string(),
                subtechniques: BTreeSet::new(),
                record_count: 0,
            });

            if id.contains(SUBTECHNIQUE_SEPARATOR) {
                usage.subtechniques.insert(id.clone());
            }
            if counted.insert(base) {
                usage.record_count += 1;
            }
        }
    }

    in_use
}

/// Lay the techniques in use out by tactic, in kill-chain order.
///
/// A technique mapped to several tactics appears in each of their columns.
/// Techniques the taxonomy does not know, or whose tactics are all unknown,
/// land in `unmapped`.
pub fn build_matrix(in_use: &BTreeMap<String, TechniqueUsage>, taxonomy: &Taxonomy) -> TaxonomyMatrix {
    let mut columns: Vec<MatrixColumn> = taxonomy
        .tactics
        .iter()
        .map(|tactic| MatrixColumn {
            tactic: tactic.clone(),
            techniques: Vec::new(),
        })
        .collect();
    let mut unmapped = Vec::new();

    for usage in in_use.values() {
        let cell = matrix_cell(usage, taxonomy);
        let tactic_ids = taxonomy
            .technique(&usage.id)
            .map(|t| t.tactic_ids.as_slice())
            .unwrap_or(&[]);

        let mut placed = false;
        for column in columns.iter_mut() {
            if tactic_ids.iter().any(|tid| *tid == column.tactic.id) {
                column.techniques.push(cell.clone());
                placed = true;
            }
        }

        if !placed {
            unmapped.push(cell);
        }
    }

    TaxonomyMatrix { columns, unmapped }
}

fn matrix_cell(usage: &TechniqueUsage, taxonomy: &Taxonomy) -> MatrixCell {
    let name_of = |id: &str| taxonomy.technique(id).map(|t| t.name.clone());

    MatrixCell {
        id: usage.id.clone(),
        name: name_of(&usage.id),
        subtechniques: usage
            .subtechniques
            .iter()
            .map(|id| MatrixSubtechnique {
                id: id.clone(),
                name: name_of(id),
            })
            .collect(),
        record_count: usage.record_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::test_support::record;
    use crate::logic::taxonomy::store::parse_taxonomy;

    #[test]
    fn test_base_technique_id() {
        assert_eq!(base_technique_id("T1055.001"), "T1055");
        assert_eq!(base_technique_id("T1055"), "T1055");
    }

    #[test]
    fn test_parent_matches_children_not_reverse() {
        assert!(technique_matches("T1055", "T1055"));
        assert!(technique_matches("T1055", "T1055.001"));
        assert!(!technique_matches("T1055.001", "T1055"));
        assert!(technique_matches("T1055.001", "T1055.001"));
        assert!(!technique_matches("T1055.001", "T1055.012"));
    }

    #[test]
    fn test_prefix_without_separator_does_not_match() {
        assert!(!technique_matches("T105", "T1055"));
        assert!(!technique_matches("T1055", "T10550"));
    }

    #[test]
    fn test_selection_is_or() {
        let r = record("a.yaml", "A", &["T1078.004"]);
        let selected = vec!["T9999".to_string(), "T1078".to_string()];
        assert!(matches_any_technique(&selected, &r));
        assert!(!matches_any_technique(&["T9999".to_string()], &r));
        assert!(!matches_any_technique(&[], &r));
    }

    #[test]
    fn test_techniques_in_use_groups_by_base() {
        let records = vec![
            record("a.yaml", "A", &["T1078", "T1078.004"]),
            record("b.yaml", "B", &["T1055.001", "T1055.012"]),
            record("c.yaml", "C", &["T1055"]),
        ];
        let in_use = techniques_in_use(&records);

        assert_eq!(in_use.len(), 2);
        let valid = &in_use["T1078"];
        assert_eq!(valid.subtechniques.iter().collect::<Vec<_>>(), vec!["T1078.004"]);
        assert_eq!(valid.record_count, 1);
        let injection = &in_use["T1055"];
        assert_eq!(injection.subtechniques.len(), 2);
        assert_eq!(injection.record_count, 2);
    }

    #[test]
    fn test_matrix_places_by_tactic_and_keeps_unknown() {
        let taxonomy = parse_taxonomy(r#"{
            "tactics": [
                {"id": "TA0001", "name": "Initial Access", "order": 0},
                {"id": "TA0003", "name": "Persistence", "order": 1},
                {"id": "TA0005", "name": "Defense Evasion", "order": 2}
            ],
            "techniques": {
                "T1078": {"name": "Valid Accounts", "tactic_ids": ["TA0001", "TA0003", "TA0005"]},
                "T1078.004": {"name": "Cloud Accounts", "tactic_ids": ["TA0001"]},
                "T1027": {"name": "Obfuscated Files", "tactic_ids": ["TA9999"]}
            }
        }"#).unwrap();
        let records = vec![
            record("a.yaml", "A", &["T1078.004"]),
            record("b.yaml", "B", &["T1027", "T4242"]),
        ];

        let matrix = build_matrix(&techniques_in_use(&records), &taxonomy);

        assert_eq!(matrix.columns.len(), 3);
        for column in &matrix.columns {
            assert_eq!(column.techniques.len(), 1);
            let cell = &column.techniques[0];
            assert_eq!(cell.id, "T1078");
            assert_eq!(cell.name.as_deref(), Some("Valid Accounts"));
            assert_eq!(cell.subtechniques[0].name.as_deref(), Some("Cloud Accounts"));
        }

        let unmapped: Vec<_> = matrix.unmapped.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(unmapped, vec!["T1027", "T4242"]);
        assert_eq!(matrix.unmapped[1].name, None);
    }
}
