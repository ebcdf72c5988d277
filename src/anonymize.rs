use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context};
use serde_json::Value;
use tracing::info;

/// Leading entries in the export that are not real students.
pub const SKIPPED_ENTRIES: usize = 2;

/// Replaces identifying fields with placeholders numbered from 1.
///
/// The first [`SKIPPED_ENTRIES`] entries are dropped. Every other key on an
/// entry is kept as-is, in its original position.
pub fn anonymize(entries: Vec<Value>) -> anyhow::Result<Vec<Value>> {
    let mut cleaned = Vec::with_capacity(entries.len().saturating_sub(SKIPPED_ENTRIES));

    for (index, mut entry) in entries.into_iter().skip(SKIPPED_ENTRIES).enumerate() {
        let position = index + 1;
        let Some(student) = entry.as_object_mut() else {
            bail!("entry {position} is not a JSON object");
        };

        student.insert("name".to_string(), Value::from(format!("student{position}")));
        student.insert(
            "email".to_string(),
            Value::from(format!("student{position}@pybites.org")),
        );
        student.insert(
            "profile_url".to_string(),
            Value::from(format!("https://codechalleng.es/profiles/student{position}")),
        );
        student.insert("certificates".to_string(), Value::from(""));
        cleaned.push(entry);
    }

    Ok(cleaned)
}

pub fn anonymize_file(json_path: &Path, out_path: &Path) -> anyhow::Result<usize> {
    let file = File::open(json_path)
        .with_context(|| format!("failed to open JSON {}", json_path.display()))?;
    let data: Value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to read JSON from {}", json_path.display()))?;
    let Value::Array(entries) = data else {
        bail!("expected a JSON array in {}", json_path.display());
    };

    let cleaned = anonymize(entries)?;

    let out = File::create(out_path)
        .with_context(|| format!("failed to create {}", out_path.display()))?;
    let mut writer = BufWriter::new(out);
    serde_json::to_writer(&mut writer, &cleaned)?;
    writer.flush()?;

    info!(
        source = %json_path.display(),
        out = %out_path.display(),
        students = cleaned.len(),
        "anonymized student data"
    );
    Ok(cleaned.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_student(name: &str, class_: &str) -> Value {
        json!({
            "name": name,
            "email": format!("{name}@example.com"),
            "class_": class_,
            "profile_url": format!("https://codechalleng.es/profiles/{name}"),
            "newbie_completed": 4,
            "intro_completed": 2,
            "regular_completed": 1,
            "certificates": "intro-cert",
            "joined": "2021-09-01"
        })
    }

    #[test]
    fn skips_header_entries_and_numbers_from_one() {
        let entries = vec![
            raw_student("teacher", "DEA"),
            raw_student("sample", "DEA"),
            raw_student("avery", "period 1"),
            raw_student("jules", "period 2"),
        ];

        let cleaned = anonymize(entries).unwrap();
        assert_eq!(cleaned.len(), 2);

        assert_eq!(cleaned[0]["name"], "student1");
        assert_eq!(cleaned[0]["email"], "student1@pybites.org");
        assert_eq!(
            cleaned[0]["profile_url"],
            "https://codechalleng.es/profiles/student1"
        );
        assert_eq!(cleaned[0]["certificates"], "");
        assert_eq!(cleaned[1]["name"], "student2");
    }

    #[test]
    fn keeps_other_fields_and_key_order() {
        let entries = vec![
            raw_student("teacher", "DEA"),
            raw_student("sample", "DEA"),
            raw_student("avery", "period 1"),
        ];

        let cleaned = anonymize(entries).unwrap();
        let student = cleaned[0].as_object().unwrap();

        assert_eq!(student["class_"], "period 1");
        assert_eq!(student["newbie_completed"], 4);
        assert_eq!(student["joined"], "2021-09-01");
        let keys: Vec<&str> = student.keys().map(String::as_str).collect();
        assert_eq!(keys.first(), Some(&"name"));
        assert_eq!(keys.last(), Some(&"joined"));
    }

    #[test]
    fn short_input_yields_empty_output() {
        let cleaned = anonymize(vec![raw_student("teacher", "DEA")]).unwrap();
        assert!(cleaned.is_empty());
    }

    #[test]
    fn rejects_non_object_entries() {
        let entries = vec![json!(1), json!(2), json!("not a student")];
        assert!(anonymize(entries).is_err());
    }

    #[test]
    fn anonymize_file_writes_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("student_data.json");
        let out = dir.path().join("cleaned_data.json");
        let entries = json!([
            raw_student("teacher", "DEA"),
            raw_student("sample", "DEA"),
            raw_student("avery", "period 1")
        ]);
        std::fs::write(&source, entries.to_string()).unwrap();

        let written = anonymize_file(&source, &out).unwrap();
        assert_eq!(written, 1);

        let reread: Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(reread[0]["name"], "student1");
        assert!(!reread.to_string().contains("avery"));
    }

    #[test]
    fn anonymize_file_rejects_non_array() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("student_data.json");
        std::fs::write(&source, "{\"name\": \"avery\"}").unwrap();

        let err = anonymize_file(&source, &dir.path().join("out.json")).unwrap_err();
        assert!(err.to_string().contains("expected a JSON array"));
    }
}
