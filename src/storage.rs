//! CSV output.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::ScrapeError;
use crate::models::ReviewTable;

/// UTF-8 byte order mark, so spreadsheet tools pick the right encoding.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// File name for a listing's reviews: `<prefix><stem>.csv`.
pub fn csv_file_name(prefix: &str, stem: &str) -> String {
    format!("{}{}.csv", prefix, stem)
}

/// Write `table` to `<dir>/<prefix><stem>.csv`, replacing any earlier file.
///
/// Returns the path written.
pub fn write_reviews_csv(
    dir: &Path,
    stem: &str,
    prefix: &str,
    table: &ReviewTable,
) -> Result<PathBuf, ScrapeError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(csv_file_name(prefix, stem));

    let mut file = File::create(&path)?;
    file.write_all(UTF8_BOM)?;

    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.values())?;
    }
    writer.flush()?;

    info!("Saved {} reviews to {}", table.len(), path.display());
    Ok(path)
}
