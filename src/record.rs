use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Value of one extracted field. Scalars degrade to `""`, lists to `[]`;
/// a key is never absent from a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    Items(Vec<BTreeMap<String, String>>),
}

impl FieldValue {
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::List(v) => v.is_empty(),
            FieldValue::Items(v) => v.is_empty(),
        }
    }
}

/// One fully-assembled profile. Immutable once built; the run loop only
/// appends records to its output vector.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileRecord {
    pub url: String,
    pub scraped_at: String,
    #[serde(flatten)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl ProfileRecord {
    pub fn is_empty(&self) -> bool {
        self.fields.values().all(FieldValue::is_empty)
    }
}

/// Write the whole run as one pretty-printed JSON array.
pub fn save_records(path: &Path, records: &[ProfileRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    let mut file = fs::File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> ProfileRecord {
        let mut fields = BTreeMap::new();
        fields.insert(
            "name".to_string(),
            FieldValue::Text("Jane Doe".to_string()),
        );
        fields.insert("skills".to_string(), FieldValue::List(Vec::new()));
        ProfileRecord {
            url: "https://example.com/in/jane".to_string(),
            scraped_at: "2026-01-01T00:00:00".to_string(),
            fields,
        }
    }

    #[test]
    fn record_serializes_with_flattened_fields() {
        let json = serde_json::to_value(vec![sample_record()]).unwrap();
        assert_eq!(json[0]["name"], "Jane Doe");
        assert_eq!(json[0]["url"], "https://example.com/in/jane");
        assert!(json[0]["skills"].as_array().unwrap().is_empty());
    }

    #[test]
    fn empty_list_field_still_serializes_its_key() {
        let json = serde_json::to_value(sample_record()).unwrap();
        assert!(json.as_object().unwrap().contains_key("skills"));
    }

    #[test]
    fn save_records_writes_a_json_array() {
        let mut path = std::env::temp_dir();
        path.push("profile_scrape_records_test.json");
        save_records(&path, &[sample_record()]).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 1);
        let _ = fs::remove_file(&path);
    }
}
