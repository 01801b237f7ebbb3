use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};

/// A whole headed CSV file held in memory.
#[derive(Debug, Clone)]
pub struct Table {
    pub headers: StringRecord,
    pub rows: Vec<StringRecord>,
}

impl Table {
    /// Position of the `index` column.
    pub fn index_column(&self) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h.trim() == "index")
            .ok_or_else(|| anyhow!("CSV has no 'index' column"))
    }

    /// Reorder this table's rows into the column order of `target`.
    pub fn project_onto(&self, target: &StringRecord) -> Result<Vec<StringRecord>> {
        let positions = target
            .iter()
            .map(|name| {
                self.headers
                    .iter()
                    .position(|h| h == name)
                    .ok_or_else(|| anyhow!("missing column '{name}'"))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(self
            .rows
            .iter()
            .map(|row| positions.iter().map(|&i| row.get(i).unwrap_or("")).collect())
            .collect())
    }
}

pub fn read_table(path: &Path) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV: {}", path.display()))?;
    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read CSV header: {}", path.display()))?
        .clone();
    let rows = reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;
    Ok(Table { headers, rows })
}

pub fn write_table(path: &Path, headers: &StringRecord, rows: &[StringRecord]) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to create CSV: {}", path.display()))?;
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write CSV: {}", path.display()))?;
    Ok(())
}

/// Expand directories to the `*.csv` files directly inside them, sorted by
/// name; plain file paths are kept as given.
pub fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found = std::fs::read_dir(input)
                .with_context(|| format!("Failed to list directory: {}", input.display()))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "csv"))
                .collect::<Vec<_>>();
            found.sort();
            files.extend(found);
        } else {
            files.push(input.clone());
        }
    }
    Ok(files)
}
