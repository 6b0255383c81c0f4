//! Uploaded sample tables.
//!
//! A table is read in two steps: the header row first, which decides whether
//! the upload is usable at all, and then the data rows, which are parsed as
//! numbers column by column. Keeping the steps apart lets a single-column
//! upload fall back to synthetic data without its content ever being parsed.

use std::collections::HashMap;
use std::io::Read;

use crate::error::PipelineError;

/// Raw CSV table: header labels and unparsed data rows
#[derive(Debug, Clone, PartialEq)]
pub struct SampleTable {
    headers: Vec<String>,
    records: Vec<Vec<String>>,
}

/// Header-only view of an upload, used before committing to a full parse
pub struct TableReader<R: Read> {
    reader: csv::Reader<R>,
    headers: Vec<String>,
}

impl<R: Read> TableReader<R> {
    /// Read the header row
    ///
    /// # Errors
    /// `EmptyUpload` when the input has no header row.
    pub fn open(input: R) -> Result<Self, PipelineError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Fields)
            .from_reader(input);

        let raw_headers = reader.headers()?.clone();
        if raw_headers.is_empty() {
            return Err(PipelineError::EmptyUpload);
        }

        let headers = dedupe_labels(raw_headers.iter().map(str::to_string).collect());
        Ok(Self { reader, headers })
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Read every remaining data row
    ///
    /// # Errors
    /// `MalformedTable` for ragged rows or broken quoting.
    pub fn read_all(mut self) -> Result<SampleTable, PipelineError> {
        let mut records = Vec::new();
        for record in self.reader.records() {
            let record = record?;
            records.push(record.iter().map(str::to_string).collect());
        }

        Ok(SampleTable {
            headers: self.headers,
            records,
        })
    }
}

impl SampleTable {
    /// Number of data rows (time samples)
    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    /// Transpose into one numeric series per column
    ///
    /// # Errors
    /// `NonNumericValue` naming the first cell that is not a finite number.
    pub fn into_channels(self) -> Result<(Vec<String>, Vec<Vec<f64>>), PipelineError> {
        let mut channels: Vec<Vec<f64>> = self
            .headers
            .iter()
            .map(|_| Vec::with_capacity(self.records.len()))
            .collect();

        for (row_idx, record) in self.records.iter().enumerate() {
            for ((cell, channel), label) in record.iter().zip(channels.iter_mut()).zip(&self.headers)
            {
                let value = parse_sample(cell).ok_or_else(|| PipelineError::NonNumericValue {
                    row: row_idx + 1,
                    column: label.clone(),
                    value: cell.chars().take(MAX_REPORTED_CELL_CHARS).collect(),
                })?;
                channel.push(value);
            }
        }

        Ok((self.headers, channels))
    }
}

/// Offending cells are cut to this many characters in error reports
const MAX_REPORTED_CELL_CHARS: usize = 64;

fn parse_sample(cell: &str) -> Option<f64> {
    cell.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Rename repeated labels to `label.1`, `label.2`, ... in order of appearance
fn dedupe_labels(labels: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(labels.len());

    for label in labels {
        let mut candidate = label.clone();
        while let Some(count) = seen.get_mut(&candidate) {
            *count += 1;
            candidate = format!("{}.{}", label, count);
        }
        seen.insert(candidate.clone(), 0);
        out.push(candidate);
    }

    out
}
