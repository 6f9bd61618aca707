//! Batch text encoding and atomic file output

use crate::core::format::{format_record, BatchHeader};
use crate::domain::context::ResultExt;
use crate::domain::{BpaError, Competence, OrgType, ProductionRecord, Result};
use std::cmp::Ordering;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Output file name: `{prefix}{competence}.{extension}`
pub fn output_file_name(prefix: &str, competence: &Competence, extension: &str) -> String {
    let extension = extension.trim_start_matches('.');
    if extension.is_empty() {
        format!("{prefix}{competence}")
    } else {
        format!("{prefix}{competence}.{extension}")
    }
}

type OutputKey<'a> = (
    OrgType,
    &'a str,
    &'a str,
    &'a str,
    &'a str,
    &'a str,
    &'a str,
    Option<u64>,
);

fn output_key(record: &ProductionRecord) -> OutputKey<'_> {
    (
        record.org_type,
        record.facility_code.trim(),
        record.procedure_code.trim(),
        record.cbo_code.trim(),
        record.competence.trim(),
        record.page.trim(),
        record.sequence.trim(),
        record.numeric_quantity(),
    )
}

fn output_order(a: &ProductionRecord, b: &ProductionRecord) -> Ordering {
    output_key(a).cmp(&output_key(b))
}

/// Sorts records into file order: consolidated before individualized, then
/// facility, procedure, CBO, competence, page, sequence and quantity
pub fn sort_for_output(records: &mut [ProductionRecord]) {
    records.sort_by(output_order);
}

/// Encodes the header followed by every record, CRLF-terminated
///
/// `records` must already be in file order.
pub fn encode_batch(header: &BatchHeader, records: &[ProductionRecord]) -> Result<String> {
    let mut contents = header.encode()?;
    for record in records {
        contents.push_str(&format_record(record));
    }
    Ok(contents)
}

/// Writes `contents` next to `path` and renames it into place
///
/// A partially written batch file is never visible under `path`.
pub async fn write_atomically(path: PathBuf, contents: String) -> Result<()> {
    tokio::task::spawn_blocking(move || write_blocking(&path, contents.as_bytes()))
        .await
        .map_err(|e| BpaError::Other(format!("Output writer task failed: {e}")))?
}

fn write_blocking(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| {
        BpaError::Io(format!(
            "Failed to create output directory {}: {e}",
            dir.display()
        ))
    })?;

    let mut file = NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temporary file in {}", dir.display()))?;
    file.write_all(bytes)
        .and_then(|_| file.flush())
        .and_then(|_| file.as_file().sync_all())
        .with_context(|| format!("writing {}", file.path().display()))?;
    file.persist(path).map_err(|e| {
        BpaError::Io(format!(
            "Failed to move batch file into place at {}: {}",
            path.display(),
            e.error
        ))
    })?;

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "Batch file written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(org: OrgType, facility: &str, procedure: &str, page: &str, seq: &str) -> ProductionRecord {
        let mut r = ProductionRecord::new(org);
        r.facility_code = facility.to_string();
        r.procedure_code = procedure.to_string();
        r.page = page.to_string();
        r.sequence = seq.to_string();
        r
    }

    #[test]
    fn test_output_file_name() {
        let competence = Competence::new("202403").unwrap();
        assert_eq!(output_file_name("bpa_", &competence, "txt"), "bpa_202403.txt");
        assert_eq!(output_file_name("", &competence, ".TXT"), "202403.TXT");
        assert_eq!(output_file_name("BPA", &competence, ""), "BPA202403");
    }

    #[test]
    fn test_sort_for_output() {
        let mut records = vec![
            record(OrgType::Individualized, "0000001", "0301010030", "001", "01"),
            record(OrgType::Consolidated, "0000002", "0301010110", "001", "01"),
            record(OrgType::Consolidated, "0000001", "0301010110", "001", "02"),
            record(OrgType::Consolidated, "0000001", "0301010110", "001", "01"),
        ];
        sort_for_output(&mut records);

        let order: Vec<(OrgType, &str, &str)> = records
            .iter()
            .map(|r| (r.org_type, r.facility_code.as_str(), r.sequence.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                (OrgType::Consolidated, "0000001", "01"),
                (OrgType::Consolidated, "0000001", "02"),
                (OrgType::Consolidated, "0000002", "01"),
                (OrgType::Individualized, "0000001", "01"),
            ]
        );
    }

    #[tokio::test]
    async fn test_write_atomically_creates_directory_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("bpa_202403.txt");

        write_atomically(path.clone(), "first\r\n".to_string())
            .await
            .unwrap();
        write_atomically(path.clone(), "second\r\n".to_string())
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second\r\n");
        let leftovers = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
