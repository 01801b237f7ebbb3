//! Input row sources.
//!
//! The pipeline pulls records a batch at a time through [`BatchSource`]; the
//! CSV implementation applies the malformed-row policy while reading.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ByteRecord, ReaderBuilder, StringRecord, Trim};
use metricscan_core::{InputRecord, MalformedRowPolicy, MetricScanError};
use tracing::warn;

pub const INPUT_COLUMNS: [&str; 4] = ["index", "image_link", "group_id", "entity_name"];

/// Something the pipeline can pull batches of records from.
pub trait BatchSource {
    /// Up to `size` records; an empty vec means the source is exhausted.
    fn next_batch(&mut self, size: usize) -> Result<Vec<InputRecord>, MetricScanError>;

    /// Rows dropped so far because they were malformed.
    fn skipped(&self) -> u64 {
        0
    }
}

/// An in-memory sequence of records.
pub struct IterSource<I> {
    inner: I,
}

impl<I: Iterator<Item = InputRecord>> IterSource<I> {
    pub fn new(records: impl IntoIterator<IntoIter = I>) -> Self {
        Self { inner: records.into_iter() }
    }
}

impl<I: Iterator<Item = InputRecord>> BatchSource for IterSource<I> {
    fn next_batch(&mut self, size: usize) -> Result<Vec<InputRecord>, MetricScanError> {
        Ok(self.inner.by_ref().take(size).collect())
    }
}

/// Column positions of the required fields in the input header.
#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    index: usize,
    image_link: usize,
    group_id: usize,
    entity_name: usize,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Result<Self, MetricScanError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| {
                    MetricScanError::Input(format!("input header is missing required column '{name}'"))
                })
        };
        Ok(Self {
            index: find("index")?,
            image_link: find("image_link")?,
            group_id: find("group_id")?,
            entity_name: find("entity_name")?,
        })
    }
}

/// Streams [`InputRecord`]s out of a headed CSV file.
///
/// Field values are kept verbatim; only header names are trimmed.
pub struct CsvRecordSource<R: Read> {
    reader: csv::Reader<R>,
    columns: ColumnMap,
    policy: MalformedRowPolicy,
    record: ByteRecord,
    skipped: u64,
}

/// Why the current row could not be taken as-is.
enum RowProblem {
    /// Some fields are absent, blank or not valid UTF-8; the record carries
    /// whatever could be recovered.
    Incomplete(InputRecord, Vec<String>),
    /// The index itself cannot be decoded, so no prediction can be keyed to it.
    Unusable(String),
}

impl CsvRecordSource<File> {
    pub fn open(path: &Path, policy: MalformedRowPolicy) -> Result<Self, MetricScanError> {
        let file = File::open(path).map_err(|e| {
            MetricScanError::Input(format!("failed to open {}: {e}", path.display()))
        })?;
        Self::from_reader(file, policy)
    }
}

impl<R: Read> CsvRecordSource<R> {
    pub fn from_reader(reader: R, policy: MalformedRowPolicy) -> Result<Self, MetricScanError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::Headers)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| MetricScanError::Input(format!("failed to read CSV header: {e}")))?
            .clone();
        let columns = ColumnMap::from_headers(&headers)?;

        Ok(Self {
            reader,
            columns,
            policy,
            record: ByteRecord::new(),
            skipped: 0,
        })
    }

    /// Read the next usable record, applying the malformed-row policy.
    fn next_record(&mut self) -> Result<Option<InputRecord>, MetricScanError> {
        loop {
            match self.reader.read_byte_record(&mut self.record) {
                Ok(false) => return Ok(None),
                Ok(true) => {
                    let line = self.record.position().map(|p| p.line()).unwrap_or(0);
                    match self.parse_current() {
                        Ok(record) => return Ok(Some(record)),
                        Err(RowProblem::Incomplete(partial, problems)) => {
                            let message = problems.join(", ");
                            match self.policy {
                                MalformedRowPolicy::Fallback => {
                                    warn!(line, %message, "Malformed row, processing with fallback");
                                    return Ok(Some(partial));
                                }
                                MalformedRowPolicy::Skip => {
                                    warn!(line, %message, "Skipping malformed row");
                                    self.skipped += 1;
                                }
                                MalformedRowPolicy::Fail => {
                                    return Err(MetricScanError::MalformedRow { line, message });
                                }
                            }
                        }
                        Err(RowProblem::Unusable(message)) => {
                            if self.policy == MalformedRowPolicy::Fail {
                                return Err(MetricScanError::MalformedRow { line, message });
                            }
                            warn!(line, %message, "Skipping row without a usable index");
                            self.skipped += 1;
                        }
                    }
                }
                Err(e) => {
                    let line = e.position().map(|p| p.line()).unwrap_or(0);
                    if matches!(e.kind(), csv::ErrorKind::Io(_)) {
                        return Err(MetricScanError::Input(e.to_string()));
                    }
                    if self.policy == MalformedRowPolicy::Fail {
                        return Err(MetricScanError::MalformedRow { line, message: e.to_string() });
                    }
                    warn!(line, error = %e, "Skipping unreadable row");
                    self.skipped += 1;
                }
            }
        }
    }

    /// Build a record from the current row. Absent or blank fields come back
    /// empty and fields that are not valid UTF-8 are decoded lossily; either
    /// way the row is reported as incomplete.
    fn parse_current(&self) -> Result<InputRecord, RowProblem> {
        let mut problems = Vec::new();
        let mut field = |idx: usize, name: &str| -> (String, bool) {
            match self.record.get(idx) {
                Some(bytes) if !bytes.iter().all(u8::is_ascii_whitespace) => {
                    match std::str::from_utf8(bytes) {
                        Ok(value) => (value.to_string(), true),
                        Err(_) => {
                            problems.push(format!("invalid UTF-8 in {name}"));
                            (String::from_utf8_lossy(bytes).into_owned(), false)
                        }
                    }
                }
                _ => {
                    problems.push(format!("missing {name}"));
                    (String::new(), true)
                }
            }
        };

        let (index, index_decoded) = field(self.columns.index, "index");
        let (image_link, _) = field(self.columns.image_link, "image_link");
        let (group_id, _) = field(self.columns.group_id, "group_id");
        let (entity_name, _) = field(self.columns.entity_name, "entity_name");

        if !index_decoded {
            return Err(RowProblem::Unusable(problems.join(", ")));
        }
        let record = InputRecord::new(index, image_link, group_id, &entity_name);
        if problems.is_empty() {
            Ok(record)
        } else {
            Err(RowProblem::Incomplete(record, problems))
        }
    }
}

impl<R: Read> BatchSource for CsvRecordSource<R> {
    fn next_batch(&mut self, size: usize) -> Result<Vec<InputRecord>, MetricScanError> {
        let mut batch = Vec::with_capacity(size);
        while batch.len() < size {
            match self.next_record()? {
                Some(record) => batch.push(record),
                None => break,
            }
        }
        Ok(batch)
    }

    fn skipped(&self) -> u64 {
        self.skipped
    }
}
