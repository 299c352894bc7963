//! CSV table export

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use terraseries_core::vector::Feature;
use terraseries_core::Result;

/// Serialize features to `{sink}/{description}.csv`.
///
/// Columns are the sorted union of all attribute keys across rows; a row
/// missing a key renders an empty cell. One row per feature, in input order,
/// so identical inputs produce byte-identical files. Zero features produce
/// an empty (but present) file.
pub fn export_table(features: &[Feature], sink: &Path, description: &str) -> Result<PathBuf> {
    let path = sink.join(format!("{}.csv", description));

    let columns: BTreeSet<&str> = features
        .iter()
        .flat_map(|f| f.properties.keys().map(String::as_str))
        .collect();

    let mut writer = csv::Writer::from_path(&path)?;

    if !columns.is_empty() {
        writer.write_record(&columns)?;
        for feature in features {
            let record: Vec<String> = columns
                .iter()
                .map(|key| {
                    feature
                        .get_property(key)
                        .map(|v| v.to_string())
                        .unwrap_or_default()
                })
                .collect();
            writer.write_record(&record)?;
        }
    }

    writer.flush()?;
    Ok(path)
}
