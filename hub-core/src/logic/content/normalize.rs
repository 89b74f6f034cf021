//! Document normalization
//!
//! Every "field may be missing or have the wrong shape" decision lives here.
//! Consumers only ever see a fully typed [`ContentRecord`].

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_yaml::Value;

use super::types::{ContentRecord, ContentType, LoadErrorKind};

/// `T####` or `T####.###`, ASCII digits only
pub static MITRE_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^T[0-9]{4}(\.[0-9]{3})?$").expect("MITRE id pattern compiles"));

/// Canonicalize a technique id: trimmed, upper-cased, pattern-checked.
pub fn canonical_mitre_id(raw: &str) -> Option<String> {
    let candidate = raw.trim().to_ascii_uppercase();
    if MITRE_ID_PATTERN.is_match(&candidate) {
        Some(candidate)
    } else {
        None
    }
}

/// Turn a parsed document into a record. Only a non-mapping root is an error;
/// every other irregularity is repaired with a default.
pub fn normalize_document(id: String, root: Value) -> Result<ContentRecord, LoadErrorKind> {
    let Value::Mapping(mapping) = root else {
        return Err(LoadErrorKind::NotAMapping);
    };

    let mut record = ContentRecord {
        id,
        content_type: ContentType::Xql,
        mitre_ids: Vec::new(),
        log_sources: Vec::new(),
        tags: Vec::new(),
        name: String::new(),
        description: String::new(),
        author: String::new(),
        query: String::new(),
        severity: String::new(),
        extra: BTreeMap::new(),
    };

    for (key, value) in mapping {
        let Some(key) = key.as_str() else {
            continue;
        };

        match key {
            // The filename is authoritative
            "id" => {}
            "content_type" => {
                record.content_type = value
                    .as_str()
                    .and_then(ContentType::parse)
                    .unwrap_or_default();
            }
            "mitre_ids" => record.mitre_ids = mitre_ids(&value),
            "log_sources" => record.log_sources = string_list(&value),
            "tags" => record.tags = string_list(&value),
            "name" => record.name = text_field(&value),
            "description" => record.description = text_field(&value),
            "author" => record.author = text_field(&value),
            "query" => record.query = text_field(&value),
            "severity" => record.severity = text_field(&value),
            other => match serde_json::to_value(&value) {
                Ok(json) => {
                    record.extra.insert(other.to_string(), json);
                }
                Err(e) => log::debug!("{}: dropping field '{}': {}", record.id, other, e),
            },
        }
    }

    Ok(record)
}

fn text_field(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Sequence(items) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

fn mitre_ids(value: &Value) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for raw in string_list(value) {
        if let Some(id) = canonical_mitre_id(&raw) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_canonical_mitre_id() {
        assert_eq!(canonical_mitre_id("T1078"), Some("T1078".to_string()));
        assert_eq!(canonical_mitre_id(" t1078.004 "), Some("T1078.004".to_string()));
        assert_eq!(canonical_mitre_id("T107"), None);
        assert_eq!(canonical_mitre_id("T1078.04"), None);
        assert_eq!(canonical_mitre_id("TA0001"), None);
        assert_eq!(canonical_mitre_id("INVALID"), None);
        assert_eq!(canonical_mitre_id("T1078.004.001"), None);
    }

    #[test]
    fn test_non_ascii_digits_rejected() {
        assert_eq!(canonical_mitre_id("T١٢٣٤"), None);
    }

    #[test]
    fn test_non_mapping_root() {
        let err = normalize_document("a.yaml".into(), parse("- one\n- two")).unwrap_err();
        assert_eq!(err, LoadErrorKind::NotAMapping);

        let err = normalize_document("b.yaml".into(), Value::Null).unwrap_err();
        assert_eq!(err, LoadErrorKind::NotAMapping);
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let record = normalize_document("empty.yaml".into(), parse("{}")).unwrap();
        assert_eq!(record.id, "empty.yaml");
        assert_eq!(record.content_type, ContentType::Xql);
        assert!(record.mitre_ids.is_empty());
        assert!(record.log_sources.is_empty());
        assert!(record.tags.is_empty());
        assert_eq!(record.name, "");
        assert_eq!(record.severity, "");
    }

    #[test]
    fn test_invalid_content_type_defaults_to_xql() {
        for raw in ["content_type: rootkit", "content_type: 42", "content_type: [hunting]"] {
            let record = normalize_document("x.yaml".into(), parse(raw)).unwrap();
            assert_eq!(record.content_type, ContentType::Xql, "input: {raw}");
        }
    }

    #[test]
    fn test_content_type_is_coerced() {
        let record = normalize_document("x.yaml".into(), parse("content_type: ' Hunting '")).unwrap();
        assert_eq!(record.content_type, ContentType::Hunting);
    }

    #[test]
    fn test_wrong_shapes_are_repaired() {
        let doc = parse(
            r#"
name: 12
mitre_ids: T1078
log_sources: {a: b}
tags: [ok, 3, {nested: true}, fine]
description: [not, text]
"#,
        );
        let record = normalize_document("x.yaml".into(), doc).unwrap();
        assert_eq!(record.name, "12");
        assert!(record.mitre_ids.is_empty());
        assert!(record.log_sources.is_empty());
        assert_eq!(record.tags, vec!["ok", "fine"]);
        assert_eq!(record.description, "");
    }

    #[test]
    fn test_mitre_ids_filtered_and_canonicalized() {
        let doc = parse("mitre_ids: [t1055, T1055.001, INVALID, 1234, T1055]");
        let record = normalize_document("x.yaml".into(), doc).unwrap();
        assert_eq!(record.mitre_ids, vec!["T1055", "T1055.001"]);
    }

    #[test]
    fn test_document_id_field_is_ignored() {
        let doc = parse("id: spoofed\ncreated: 2024-01-02\nreferences: [https://example.com]");
        let record = normalize_document("real.yaml".into(), doc).unwrap();
        assert_eq!(record.id, "real.yaml");
        assert!(!record.extra.contains_key("id"));
        assert_eq!(record.extra["created"], serde_json::json!("2024-01-02"));
        assert_eq!(record.extra["references"], serde_json::json!(["https://example.com"]));
    }
}
