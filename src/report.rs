use crate::error::ReportError;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// Key every record carries, holding the benchmark identifier.
pub const BENCHMARK_FIELD: &str = "Benchmark";

/// Counters collected for one benchmark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    fields: HashMap<String, String>,
}

impl ResultRecord {
    pub fn new(benchmark: &str) -> Self {
        let mut fields = HashMap::new();
        fields.insert(BENCHMARK_FIELD.to_string(), benchmark.to_string());
        Self { fields }
    }

    /// Set a counter, replacing any earlier value for the same name.
    pub fn insert(&mut self, name: &str, value: &str) {
        self.fields.insert(name.to_string(), value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn benchmark(&self) -> &str {
        self.get(BENCHMARK_FIELD).unwrap_or_default()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

/// Records in the order their benchmarks were requested.
#[derive(Debug, Clone, Default)]
pub struct ResultTable {
    records: Vec<ResultRecord>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ResultRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    /// Union of all record keys, sorted case-insensitively.
    pub fn fields(&self) -> Vec<String> {
        let set: BTreeSet<&str> = self.records.iter().flat_map(|r| r.keys()).collect();
        let mut fields: Vec<String> = set.into_iter().map(str::to_string).collect();
        // stable: names equal ignoring case stay in byte order
        fields.sort_by_key(|f| f.to_lowercase());
        fields
    }

    /// Header row followed by one row per record. Missing fields are blank.
    pub fn rows(&self) -> Vec<Vec<String>> {
        let fields = self.fields();
        let mut rows = Vec::with_capacity(self.records.len() + 1);
        rows.push(fields);
        for record in &self.records {
            let row: Vec<String> = rows[0]
                .iter()
                .map(|f| record.get(f).unwrap_or_default().to_string())
                .collect();
            rows.push(row);
        }
        rows
    }

    /// Write the table as CSV, one row per benchmark.
    pub fn write_csv(&self, path: &Path) -> Result<(), ReportError> {
        let rows = self.rows();
        tracing::debug!(
            path = %path.display(),
            columns = rows.first().map_or(0, Vec::len),
            benchmarks = self.records.len(),
            "writing report"
        );
        write_rows(path, &rows)
    }
}

/// Swap rows and columns. Ragged input is cut to its shortest row.
pub fn transpose(rows: &[Vec<String>]) -> Vec<Vec<String>> {
    let width = match rows.iter().map(Vec::len).min() {
        Some(w) => w,
        None => return Vec::new(),
    };
    (0..width)
        .map(|col| rows.iter().map(|row| row[col].clone()).collect())
        .collect()
}

/// Read the CSV at `path`, transpose it and overwrite the file.
pub fn transpose_file(path: &Path) -> Result<(), ReportError> {
    let rows = read_rows(path)?;
    let transposed = transpose(&rows);
    tracing::debug!(
        path = %path.display(),
        rows_before = rows.len(),
        rows_after = transposed.len(),
        "transposing report"
    );
    write_rows(path, &transposed)
}

fn read_rows(path: &Path) -> Result<Vec<Vec<String>>, ReportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| ReportError::csv(path, e))?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ReportError::csv(path, e))?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

fn write_rows(path: &Path, rows: &[Vec<String>]) -> Result<(), ReportError> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::CRLF)
        .from_path(path)
        .map_err(|e| ReportError::csv(path, e))?;

    for row in rows {
        writer
            .write_record(row)
            .map_err(|e| ReportError::csv(path, e))?;
    }
    writer.flush().map_err(|e| ReportError::io(path, e))
}
