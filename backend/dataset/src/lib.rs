//! `metricscan-dataset`: file-level tooling around a measurement run.
//!
//! Provides:
//! - `split`: cut an input CSV into N roughly equal parts for parallel runs
//! - `combine`: merge prediction files, dedupe by index, sort by index
//! - `filter_unpredicted`: drop reference rows that already have a prediction
//!
//! All three work on headed CSV files and only interpret the `index` column.

pub mod index;
pub mod table;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::info;

pub use index::IndexKey;
pub use table::{expand_inputs, read_table, write_table, Table};

/// Split `input` into `parts` files named `<stem>1.csv` … `<stem>N.csv` in
/// `out_dir`. Every part but the last holds `total / parts` rows; the last
/// takes the remainder.
pub fn split(input: &Path, parts: usize, out_dir: &Path, stem: &str) -> Result<Vec<PathBuf>> {
    if parts == 0 {
        bail!("number of parts must be greater than 0");
    }
    let table = read_table(input)?;
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;

    let total = table.rows.len();
    let per_part = total / parts;
    let mut written = Vec::with_capacity(parts);
    for part in 0..parts {
        let start = part * per_part;
        let end = if part + 1 == parts { total } else { start + per_part };
        let path = out_dir.join(format!("{stem}{}.csv", part + 1));
        write_table(&path, &table.headers, &table.rows[start..end])?;
        info!(path = %path.display(), rows = end - start, "Wrote dataset part");
        written.push(path);
    }
    Ok(written)
}

/// Counts reported by [`combine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombineSummary {
    pub files: usize,
    pub rows_read: usize,
    pub rows_written: usize,
}

/// Concatenate prediction files, keep the first row per index, and write them
/// sorted by index. Directories in `inputs` expand to their `*.csv` files.
pub fn combine(inputs: &[PathBuf], output: &Path) -> Result<CombineSummary> {
    let files = expand_inputs(inputs)?;
    let Some((first, rest)) = files.split_first() else {
        bail!("no CSV files to combine");
    };

    let mut combined = read_table(first)?;
    for path in rest {
        let table = read_table(path)?;
        let projected = table.project_onto(&combined.headers).with_context(|| {
            format!("{} does not share the columns of {}", path.display(), first.display())
        })?;
        combined.rows.extend(projected);
    }
    let rows_read = combined.rows.len();

    let index_col = combined.index_column()?;
    let mut seen = HashSet::new();
    let mut rows: Vec<_> = combined
        .rows
        .into_iter()
        .filter(|row| seen.insert(IndexKey::parse(row.get(index_col).unwrap_or(""))))
        .collect();
    rows.sort_by(|a, b| {
        IndexKey::parse(a.get(index_col).unwrap_or(""))
            .sort_cmp(&IndexKey::parse(b.get(index_col).unwrap_or("")))
    });

    write_table(output, &combined.headers, &rows)?;
    info!(
        files = files.len(),
        rows_read,
        rows_written = rows.len(),
        output = %output.display(),
        "Combined prediction files"
    );
    Ok(CombineSummary { files: files.len(), rows_read, rows_written: rows.len() })
}

/// Counts reported by [`filter_unpredicted`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSummary {
    pub kept: usize,
    pub removed: usize,
}

/// Write the rows of `reference` whose index does not appear in any of the
/// `predictions` files.
pub fn filter_unpredicted(
    reference: &Path,
    predictions: &[PathBuf],
    output: &Path,
) -> Result<FilterSummary> {
    let mut predicted = HashSet::new();
    for path in expand_inputs(predictions)? {
        let table = read_table(&path)?;
        let col = table.index_column()?;
        predicted.extend(
            table.rows.iter().map(|row| IndexKey::parse(row.get(col).unwrap_or(""))),
        );
    }

    let table = read_table(reference)?;
    let col = table.index_column()?;
    let total = table.rows.len();
    let kept: Vec<_> = table
        .rows
        .into_iter()
        .filter(|row| !predicted.contains(&IndexKey::parse(row.get(col).unwrap_or(""))))
        .collect();

    write_table(output, &table.headers, &kept)?;
    let summary = FilterSummary { kept: kept.len(), removed: total - kept.len() };
    info!(kept = summary.kept, removed = summary.removed, output = %output.display(), "Filtered reference set");
    Ok(summary)
}
