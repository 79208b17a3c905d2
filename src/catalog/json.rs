use super::{Catalog, CatalogEntry, CatalogFile};
use anyhow::{Context, Result};

pub fn parse_json(file: CatalogFile) -> Result<Catalog> {
    let content = std::fs::read_to_string(&file.path)
        .with_context(|| format!("open catalog {}", file.path.display()))?;
    let entries = read_entries(&content)
        .with_context(|| format!("parse catalog {}", file.path.display()))?;
    debug!("parsed {} entries from {}", entries.len(), file.file_name);

    Ok(Catalog::new(file.file_name, entries))
}

pub fn read_entries(content: &str) -> Result<Vec<CatalogEntry>> {
    let entries = serde_json::from_str::<Vec<CatalogEntry>>(content)?;
    Ok(entries)
}
