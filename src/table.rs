//! Columnar table engine
//!
//! A small in-memory dataframe used by every pipeline stage: a mapping from
//! column name to an ordered sequence of values. Cells are dynamically typed
//! (`Value`) so a table can mix the numeric feature columns with the string
//! and integer session columns, and so "not measured" stays distinguishable
//! from a real zero reading.
//!
//! Tables are written and read back as gzip-compressed CSV. Null cells
//! serialize as empty fields.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::ProcessError;

/// One table cell
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Explicit null sentinel ("not measured")
    Null,
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    /// Parse a delimited-text field by first-success inference:
    /// empty or `null` → Null, then i64, then f64, else string.
    pub fn parse(field: &str) -> Value {
        let trimmed = field.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Value::Null;
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            // zero-padded tokens (folder ids like "00005") stay strings
            if i.to_string() == trimmed {
                return Value::Int(i);
            }
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            // a nan reading carries no measurement
            if f.is_nan() {
                return Value::Null;
            }
            return Value::Float(f);
        }
        Value::Str(trimmed.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the cell, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Str(s) => write!(f, "{}", s),
        }
    }
}

/// Columnar table: ordered named columns, each an equal-length value vector
#[derive(Debug, Clone, Default)]
pub struct ColumnTable {
    names: Vec<String>,
    index: HashMap<String, usize>,
    columns: Vec<Vec<Value>>,
    rows: usize,
}

impl ColumnTable {
    /// Create an empty table with no columns
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table with the given column schema
    pub fn with_columns<S: AsRef<str>>(names: &[S]) -> Self {
        let mut table = Self::new();
        for name in names {
            table.add_column(name.as_ref());
        }
        table
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Values of a named column, if present
    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.index.get(name).map(|&i| self.columns[i].as_slice())
    }

    fn add_column(&mut self, name: &str) -> usize {
        debug_assert!(!self.index.contains_key(name));
        let i = self.names.len();
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), i);
        self.columns.push(vec![Value::Null; self.rows]);
        i
    }

    /// Append one row. The row width must match the column count.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), ProcessError> {
        if row.len() != self.names.len() {
            return Err(ProcessError::MalformedTable(format!(
                "row has {} values, table has {} columns",
                row.len(),
                self.names.len()
            )));
        }
        for (column, value) in self.columns.iter_mut().zip(row) {
            column.push(value);
        }
        self.rows += 1;
        Ok(())
    }

    /// Append a row of null sentinels across every column
    pub fn push_null_row(&mut self) {
        for column in self.columns.iter_mut() {
            column.push(Value::Null);
        }
        self.rows += 1;
    }

    /// Append a full column of values. The first column of an empty table
    /// fixes its row count; every later column must match it.
    pub fn push_column(&mut self, name: &str, values: Vec<Value>) -> Result<(), ProcessError> {
        if self.index.contains_key(name) {
            return Err(ProcessError::MalformedTable(format!(
                "duplicate column {}",
                name
            )));
        }
        if self.column_count() > 0 && values.len() != self.rows {
            return Err(ProcessError::MalformedTable(format!(
                "column {} has {} values, table has {} rows",
                name,
                values.len(),
                self.rows
            )));
        }
        self.rows = values.len();
        let i = self.add_column(name);
        self.columns[i] = values;
        Ok(())
    }

    /// Set a column to one constant value for every row, adding the column
    /// if it does not exist yet.
    pub fn set_constant(&mut self, name: &str, value: Value) {
        let i = match self.index.get(name) {
            Some(&i) => i,
            None => self.add_column(name),
        };
        self.columns[i] = vec![value; self.rows];
    }

    /// Concatenate tables row-wise. The result's column set is the union of
    /// the inputs' columns in first-seen order; cells absent from a source
    /// table are null-filled.
    pub fn concat(tables: &[ColumnTable]) -> ColumnTable {
        let mut out = ColumnTable::new();
        for table in tables {
            for name in &table.names {
                if !out.index.contains_key(name) {
                    out.add_column(name);
                }
            }
        }
        for table in tables {
            for i in 0..out.names.len() {
                let source = table.column(&out.names[i]);
                let column = &mut out.columns[i];
                match source {
                    Some(values) => column.extend_from_slice(values),
                    None => column.extend(std::iter::repeat(Value::Null).take(table.rows)),
                }
            }
            out.rows += table.rows;
        }
        out
    }

    /// Write the table as CSV to any writer
    pub fn write_csv<W: Write>(&self, mut w: W) -> Result<(), ProcessError> {
        if self.names.is_empty() {
            return Ok(());
        }
        write_record(&mut w, self.names.iter().map(String::as_str))?;
        for r in 0..self.rows {
            write_record(&mut w, self.columns.iter().map(|col| col[r].to_string()))?;
        }
        Ok(())
    }

    /// Write the table as gzip-compressed CSV, overwriting any prior file
    pub fn write_csv_gz(&self, path: &Path) -> Result<(), ProcessError> {
        let file = File::create(path)?;
        let mut enc = GzEncoder::new(BufWriter::new(file), Compression::default());
        self.write_csv(&mut enc)?;
        enc.finish()?;
        Ok(())
    }

    /// Read a table back from CSV, inferring cell types per field
    pub fn read_csv<R: BufRead>(reader: R) -> Result<ColumnTable, ProcessError> {
        let mut lines = reader.lines();
        let header = match lines.next() {
            Some(line) => line?,
            None => return Ok(ColumnTable::new()),
        };
        let names = parse_record(&header);
        let mut table = ColumnTable::with_columns(&names);
        for line in lines {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let fields = parse_record(&line);
            if fields.len() != names.len() {
                return Err(ProcessError::MalformedTable(format!(
                    "record has {} fields, header has {}",
                    fields.len(),
                    names.len()
                )));
            }
            table.push_row(fields.iter().map(|f| Value::parse(f)).collect())?;
        }
        Ok(table)
    }

    /// Read a table from a gzip-compressed CSV file
    pub fn read_csv_gz(path: &Path) -> Result<ColumnTable, ProcessError> {
        let file = File::open(path)?;
        ColumnTable::read_csv(BufReader::new(GzDecoder::new(file)))
    }
}

fn write_record<W: Write, I, S>(w: &mut W, fields: I) -> Result<(), ProcessError>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    for (i, field) in fields.enumerate() {
        if i > 0 {
            w.write_all(b",")?;
        }
        write_field(w, field.as_ref())?;
    }
    w.write_all(b"\n")?;
    Ok(())
}

/// Quote a field only when it contains the delimiter, a quote, or a newline
fn write_field<W: Write>(w: &mut W, field: &str) -> Result<(), ProcessError> {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        w.write_all(b"\"")?;
        w.write_all(field.replace('"', "\"\"").as_bytes())?;
        w.write_all(b"\"")?;
    } else {
        w.write_all(field.as_bytes())?;
    }
    Ok(())
}

/// Split one CSV record, honoring double-quoted fields
fn parse_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}
