//! CSV export of collected page records

use crate::crawler::PageRecord;
use crate::ExportError;
use chrono::{DateTime, Local};
use std::fs;
use std::path::Path;

/// Header row of every export
pub const CSV_HEADER: [&str; 3] = ["URL", "Page Title", "Main Heading"];

/// Longest file stem kept by [`timestamped_filename`]
const MAX_STEM_CHARS: usize = 200;

/// Writes records to a CSV file, one row per record
///
/// Missing parent directories are created. Nothing is written when
/// `records` is empty.
///
/// # Returns
///
/// * `Ok(usize)` - Number of rows written
/// * `Err(ExportError::Empty)` - There was nothing to export
/// * `Err(ExportError)` - The destination could not be written
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use url_grabby::export::export_csv;
///
/// # fn example(records: &[url_grabby::PageRecord]) -> Result<(), url_grabby::ExportError> {
/// let rows = export_csv(records, Path::new("pages.csv"))?;
/// println!("{} pages exported", rows);
/// # Ok(())
/// # }
/// ```
pub fn export_csv(records: &[PageRecord], path: &Path) -> Result<usize, ExportError> {
    if records.is_empty() {
        return Err(ExportError::Empty);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(CSV_HEADER)?;
    for record in records {
        writer.write_record([
            record.url.as_str(),
            record.title.as_str(),
            record.heading.as_str(),
        ])?;
    }
    writer.flush()?;

    tracing::info!("Exported {} pages to {}", records.len(), path.display());
    Ok(records.len())
}

/// Builds `<stem>_<YYYYmmdd_HHMMSS>.csv` from the current local time
pub fn timestamped_filename(stem: &str) -> String {
    timestamped_filename_at(stem, Local::now())
}

/// Builds a timestamped file name for a given instant
pub fn timestamped_filename_at(stem: &str, at: DateTime<Local>) -> String {
    format!("{}_{}.csv", safe_file_stem(stem), at.format("%Y%m%d_%H%M%S"))
}

/// Replaces characters that are not allowed in file names
///
/// `<>:"/\|?*` become `_`, control characters are removed and the result is
/// capped at 200 characters.
pub fn safe_file_stem(stem: &str) -> String {
    stem.chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            other => other,
        })
        .take(MAX_STEM_CHARS)
        .collect()
}
