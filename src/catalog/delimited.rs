use super::{Catalog, CatalogEntry, CatalogFile};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::Read;

pub fn parse_delimited(file: CatalogFile) -> Result<Catalog> {
    let reader = File::open(&file.path)
        .with_context(|| format!("open catalog {}", file.path.display()))?;
    let entries =
        read_entries(reader).with_context(|| format!("parse catalog {}", file.path.display()))?;
    debug!("parsed {} rows from {}", entries.len(), file.file_name);

    Ok(Catalog::new(file.file_name, entries))
}

/// Reads a headed CSV. Columns are matched by name and extra columns are
/// ignored; only `title` is required.
pub fn read_entries<R: Read>(reader: R) -> Result<Vec<CatalogEntry>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = reader.headers()?.clone();
    if !headers.iter().any(|h| h == "title") {
        return Err(anyhow::anyhow!(
            "missing title column, available columns: {:?}",
            headers.iter().collect::<Vec<_>>()
        ));
    }

    let mut entries = vec![];
    for (row, record) in reader.deserialize::<CatalogEntry>().enumerate() {
        // header is line 1
        let entry = record.with_context(|| format!("read row at line {}", row + 2))?;
        if entry.title.is_empty() {
            warn!("row at line {} has an empty title", row + 2);
        }
        entries.push(entry);
    }

    Ok(entries)
}
