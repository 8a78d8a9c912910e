//! Tabular decoding.
//!
//! Turns an uploaded file into headers plus an ordered sequence of rows,
//! where each row maps a header to its cell text. Three formats are accepted,
//! chosen by file extension only:
//!
//! - `csv`: delimited text, decoded incrementally from any `Read`
//! - `xls`: legacy spreadsheet binary, first sheet
//! - `xlsx`: spreadsheet archive, first sheet
//!
//! Row order is preserved exactly; downstream placement depends on it.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Cursor, Read, Seek};
use std::path::Path;

use calamine::{Data, Range, Reader, Xls, Xlsx};
use serde::Serialize;

use crate::error::{EngineError, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// The three accepted format families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TabularFormat {
    /// Comma-separated text (`.csv`)
    Delimited,
    /// Legacy binary workbook (`.xls`)
    LegacySpreadsheet,
    /// Zipped XML workbook (`.xlsx`)
    Spreadsheet,
}

impl TabularFormat {
    /// Pick the format from a file name's extension (case-insensitive).
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");

        match extension.to_ascii_lowercase().as_str() {
            "csv" => Ok(TabularFormat::Delimited),
            "xls" => Ok(TabularFormat::LegacySpreadsheet),
            "xlsx" => Ok(TabularFormat::Spreadsheet),
            _ => Err(EngineError::UnsupportedFormat {
                extension: extension.to_string(),
            }),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            TabularFormat::Delimited => "csv",
            TabularFormat::LegacySpreadsheet => "xls",
            TabularFormat::Spreadsheet => "xlsx",
        }
    }
}

impl std::fmt::Display for TabularFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// One data row: header name → cell text.
///
/// A header that appears twice keeps the value of its last column. Cells
/// missing from a short row are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    cells: HashMap<String, String>,
}

impl Row {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn from_cells<I>(headers: &[String], cells: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Row {
            cells: headers.iter().cloned().zip(cells).collect(),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Row {
            cells: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A fully materialized document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub format: TabularFormat,
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

/// Delimited text rows, read one record at a time.
pub struct DelimitedRows<R> {
    reader: csv::Reader<BufReader<R>>,
    headers: Vec<String>,
    record: csv::ByteRecord,
}

impl<R: Read> DelimitedRows<R> {
    /// Read the header row and prepare to stream the rest.
    ///
    /// A leading UTF-8 byte-order mark is skipped and header names are
    /// trimmed. Invalid UTF-8 is replaced rather than rejected.
    pub fn new(source: R) -> Result<Self> {
        let mut buffered = BufReader::new(source);
        if buffered.fill_buf()?.starts_with(UTF8_BOM) {
            buffered.consume(UTF8_BOM.len());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(buffered);

        let headers = reader
            .byte_headers()
            .map_err(|e| EngineError::decode(TabularFormat::Delimited, e))?
            .iter()
            .map(|h| String::from_utf8_lossy(h).trim().to_string())
            .collect();

        Ok(Self {
            reader,
            headers,
            record: csv::ByteRecord::new(),
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}

impl<R: Read> Iterator for DelimitedRows<R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_byte_record(&mut self.record) {
            Ok(true) => {
                let cells = self
                    .record
                    .iter()
                    .map(|c| String::from_utf8_lossy(c).into_owned());
                Some(Ok(Row::from_cells(&self.headers, cells)))
            }
            Ok(false) => None,
            Err(e) => Some(Err(EngineError::decode(TabularFormat::Delimited, e))),
        }
    }
}

/// Rows of an opened document, delimited text streamed, spreadsheets buffered.
pub enum RowStream<R> {
    Delimited(DelimitedRows<R>),
    Sheet {
        format: TabularFormat,
        headers: Vec<String>,
        rows: std::vec::IntoIter<Row>,
    },
}

impl<R: Read> RowStream<R> {
    pub fn format(&self) -> TabularFormat {
        match self {
            RowStream::Delimited(_) => TabularFormat::Delimited,
            RowStream::Sheet { format, .. } => *format,
        }
    }

    pub fn headers(&self) -> &[String] {
        match self {
            RowStream::Delimited(rows) => rows.headers(),
            RowStream::Sheet { headers, .. } => headers,
        }
    }
}

impl<R: Read> Iterator for RowStream<R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            RowStream::Delimited(rows) => rows.next(),
            RowStream::Sheet { rows, .. } => rows.next().map(Ok),
        }
    }
}

/// Open `source` as the format named by `file_name`.
///
/// Spreadsheets need random access, so their bytes are read fully before the
/// first sheet is parsed; delimited text is consumed lazily.
pub fn open<R: Read>(file_name: &str, mut source: R) -> Result<RowStream<R>> {
    let format = TabularFormat::from_file_name(file_name)?;
    match format {
        TabularFormat::Delimited => Ok(RowStream::Delimited(DelimitedRows::new(source)?)),
        TabularFormat::LegacySpreadsheet | TabularFormat::Spreadsheet => {
            let mut bytes = Vec::new();
            source.read_to_end(&mut bytes)?;
            let (headers, rows) = decode_sheet(&bytes, format)?;
            Ok(RowStream::Sheet {
                format,
                headers,
                rows: rows.into_iter(),
            })
        }
    }
}

/// Decode a complete in-memory file.
pub fn decode(file_name: &str, bytes: &[u8]) -> Result<Table> {
    let stream = open(file_name, bytes)?;
    let format = stream.format();
    let headers = stream.headers().to_vec();
    let rows = stream.collect::<Result<Vec<_>>>()?;
    Ok(Table {
        format,
        headers,
        rows,
    })
}

fn decode_sheet(bytes: &[u8], format: TabularFormat) -> Result<(Vec<String>, Vec<Row>)> {
    let cursor = Cursor::new(bytes);
    let range = match format {
        TabularFormat::Spreadsheet => {
            let workbook: Xlsx<_> =
                Xlsx::new(cursor).map_err(|e| EngineError::decode(format, e))?;
            first_sheet(workbook, format)?
        }
        TabularFormat::LegacySpreadsheet => {
            let workbook: Xls<_> = Xls::new(cursor).map_err(|e| EngineError::decode(format, e))?;
            first_sheet(workbook, format)?
        }
        TabularFormat::Delimited => {
            return Err(EngineError::decode(format, "not a spreadsheet format"))
        }
    };

    if range.height() < 2 {
        return Err(EngineError::EmptyDocument);
    }

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(cells) => cells.iter().map(|c| cell_text(c).trim().to_string()).collect(),
        None => return Err(EngineError::EmptyDocument),
    };
    let data = rows
        .map(|cells| Row::from_cells(&headers, cells.iter().map(cell_text)))
        .collect();

    Ok((headers, data))
}

fn first_sheet<RS, W>(mut workbook: W, format: TabularFormat) -> Result<Range<Data>>
where
    RS: Read + Seek,
    W: Reader<RS>,
    W::Error: std::fmt::Display,
{
    match workbook.worksheet_range_at(0) {
        Some(Ok(range)) => Ok(range),
        Some(Err(e)) => Err(EngineError::decode(format, e)),
        None => Err(EngineError::EmptyDocument),
    }
}

/// Render any cell as text. Whole numbers print without a fractional part.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}
