use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use tracing::{debug, info};

use crate::models::{AggregateOptions, ClassAverage, Direction, SortKey, SortOrder, StudentRecord};

/// Decimal places beyond this exceed what an `f64` mean can carry.
pub const MAX_PRECISION: u32 = 15;

pub fn load_records(csv_path: &Path) -> anyhow::Result<Vec<StudentRecord>> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open CSV {}", csv_path.display()))?;
    let mut records = Vec::new();

    for result in reader.deserialize::<StudentRecord>() {
        let record =
            result.with_context(|| format!("malformed row in {}", csv_path.display()))?;
        records.push(record);
    }

    debug!(path = %csv_path.display(), rows = records.len(), "loaded student records");
    Ok(records)
}

/// Groups records by class label and averages the completed counts.
///
/// Rows carrying the excluded label or no label at all are dropped before
/// grouping. Each row's
/// total is summed alongside its counts, so the averaged total equals the sum
/// of the unrounded category means.
pub fn aggregate(records: &[StudentRecord], options: &AggregateOptions) -> Vec<ClassAverage> {
    // (members, newbie, intro, regular, total)
    let mut groups: BTreeMap<&str, (usize, u64, u64, u64, u64)> = BTreeMap::new();
    let mut excluded = 0usize;
    let mut unlabelled = 0usize;

    for record in records {
        if record.class_.is_empty() {
            unlabelled += 1;
            continue;
        }
        if record.class_ == options.excluded_class {
            excluded += 1;
            continue;
        }

        let entry = groups.entry(record.class_.as_str()).or_insert((0, 0, 0, 0, 0));
        entry.0 += 1;
        entry.1 += u64::from(record.newbie_completed);
        entry.2 += u64::from(record.intro_completed);
        entry.3 += u64::from(record.regular_completed);
        entry.4 += record.total_completed();
    }

    let mut rows: Vec<ClassAverage> = groups
        .into_iter()
        .map(|(class_, (count, newbie, intro, regular, total))| {
            let count = count as f64;
            ClassAverage {
                class_: class_.to_string(),
                newbie_completed: round_to(newbie as f64 / count, options.precision),
                intro_completed: round_to(intro as f64 / count, options.precision),
                regular_completed: round_to(regular as f64 / count, options.precision),
                total_completed: round_to(total as f64 / count, options.precision),
            }
        })
        .collect();

    if let Some(order) = options.sort {
        sort_rows(&mut rows, order);
    }

    info!(
        classes = rows.len(),
        excluded,
        unlabelled,
        excluded_class = %options.excluded_class,
        "aggregated class averages"
    );
    rows
}

pub fn sort_rows(rows: &mut [ClassAverage], order: SortOrder) {
    rows.sort_by(|a, b| {
        let ordering = match order.key {
            SortKey::Class => a.class_.cmp(&b.class_),
            SortKey::Total => a
                .total_completed
                .partial_cmp(&b.total_completed)
                .unwrap_or(std::cmp::Ordering::Equal),
        };
        match order.direction {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        }
    });
}

/// Rounds half to even, so 0.25 becomes 0.2 and 2.5 becomes 2.
pub fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision.min(MAX_PRECISION) as i32);
    (value * factor).round_ties_even() / factor
}
