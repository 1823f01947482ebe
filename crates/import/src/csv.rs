use std::borrow::Cow;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CsvError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Could not decode input as UTF-8 or Shift_JIS")]
    Decode,
    #[error("Missing header row")]
    MissingHeader,
    #[error("Column '{name}' has {actual} values, table has {expected} rows")]
    ColumnLength {
        name: String,
        expected: usize,
        actual: usize,
    },
}

/// A ledger export held as text: one header row plus data rows, each row
/// padded or cut to the header width.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl LedgerTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut r| {
                r.resize(width, String::new());
                r
            })
            .collect();
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// `None` when the column does not exist; blank cells come back as `""`.
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column_index(column)?;
        self.rows.get(row).map(|r| r[col].as_str())
    }

    /// All cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &str>> {
        let col = self.column_index(name)?;
        Some(self.rows.iter().map(move |r| r[col].as_str()))
    }

    /// Renames headers in place. Pairs whose source column is absent are
    /// ignored.
    pub fn rename_columns(&mut self, renames: &[(&str, &str)]) {
        for header in &mut self.headers {
            if let Some((_, to)) = renames.iter().find(|(from, _)| header.as_str() == *from) {
                *header = (*to).to_string();
            }
        }
    }

    /// Drops every column whose header fails `keep`. Returns how many went.
    pub fn retain_columns<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&str) -> bool,
    {
        let mask: Vec<bool> = self.headers.iter().map(|h| keep(h)).collect();
        let dropped = mask.iter().filter(|k| !**k).count();
        if dropped == 0 {
            return 0;
        }

        let mut flags = mask.iter();
        self.headers.retain(|_| *flags.next().unwrap_or(&true));
        for row in &mut self.rows {
            let mut flags = mask.iter();
            row.retain(|_| *flags.next().unwrap_or(&true));
        }
        dropped
    }

    pub fn push_column(&mut self, name: &str, values: Vec<String>) -> Result<(), CsvError> {
        if values.len() != self.rows.len() {
            return Err(CsvError::ColumnLength {
                name: name.to_string(),
                expected: self.rows.len(),
                actual: values.len(),
            });
        }
        self.headers.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(())
    }
}

/// UTF-8 (with or without BOM) is taken as is; anything else is decoded as
/// Shift_JIS, which `encoding_rs` treats as the Windows-31J superset that
/// Japanese accounting tools export.
fn decode(data: &[u8]) -> Result<Cow<'_, str>, CsvError> {
    let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
    if let Ok(text) = std::str::from_utf8(data) {
        return Ok(Cow::Borrowed(text));
    }

    let (text, _, had_errors) = encoding_rs::SHIFT_JIS.decode(data);
    if had_errors {
        return Err(CsvError::Decode);
    }
    Ok(text)
}

pub fn read_ledger(data: &[u8]) -> Result<LedgerTable, CsvError> {
    let text = decode(data)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.iter().all(String::is_empty) {
        return Err(CsvError::MissingHeader);
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(LedgerTable::new(headers, rows))
}

pub fn read_ledger_file(path: &Path) -> Result<LedgerTable, CsvError> {
    let data = std::fs::read(path)?;
    read_ledger(&data)
}

/// Writes the table as UTF-8 CSV.
pub fn write_ledger<W: Write>(table: &LedgerTable, writer: W) -> Result<(), CsvError> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(table.headers())?;
    for row in table.rows() {
        out.write_record(row)?;
    }
    out.flush()?;
    Ok(())
}
