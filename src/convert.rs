use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context;
use tracing::info;

use crate::models::StudentRecord;

pub fn read_json_records(json_path: &Path) -> anyhow::Result<Vec<StudentRecord>> {
    let file = File::open(json_path)
        .with_context(|| format!("failed to open JSON {}", json_path.display()))?;
    let records: Vec<StudentRecord> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to read JSON from {}", json_path.display()))?;
    Ok(records)
}

pub fn write_csv(records: &[StudentRecord], csv_path: &Path) -> anyhow::Result<usize> {
    let mut writer = csv::Writer::from_path(csv_path)
        .with_context(|| format!("failed to create CSV {}", csv_path.display()))?;

    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    Ok(records.len())
}

/// Converts a JSON export into a CSV with the student record header.
pub fn json_to_csv(json_path: &Path, csv_path: &Path) -> anyhow::Result<usize> {
    let records = read_json_records(json_path)?;
    let written = write_csv(&records, csv_path)?;
    info!(
        json = %json_path.display(),
        csv = %csv_path.display(),
        rows = written,
        "wrote CSV"
    );
    Ok(written)
}
