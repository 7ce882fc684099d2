use crate::errors::{AppError, AppResult};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use encoding_rs::WINDOWS_1252;
use std::io::Cursor;
use tracing::debug;

/// Tabular resource formats the fetcher knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceFormat {
    Xlsx,
    Xls,
    Csv,
}

impl ResourceFormat {
    /// Maps a portal-declared format (e.g. `"XLSX"`, `" csv "`) to a known format.
    pub fn from_declared(format: &str) -> Option<Self> {
        match format.trim().to_lowercase().as_str() {
            "xlsx" => Some(Self::Xlsx),
            "xls" => Some(Self::Xls),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Xls => "xls",
            Self::Csv => "csv",
        }
    }
}

/// Character encodings tried, in order, when decoding a CSV resource.
///
/// Latin-1 accepts any byte sequence and [`parse_csv_text`] accepts any decoded
/// text, so in practice the cp1252 attempt is never reached: bytes that are not
/// UTF-8 always come out as Latin-1.
pub const CSV_ENCODINGS: [TextEncoding; 3] = [
    TextEncoding::Utf8,
    TextEncoding::Latin1,
    TextEncoding::Windows1252,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Latin1,
    Windows1252,
}

impl TextEncoding {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Latin1 => "latin-1",
            Self::Windows1252 => "cp1252",
        }
    }

    /// Decodes `bytes`, returning `None` if they are invalid in this encoding.
    ///
    /// Latin-1 maps every byte to the code point of the same value and never fails.
    /// Windows-1252 fails on the five bytes it leaves undefined.
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            Self::Utf8 => {
                let text = std::str::from_utf8(bytes).ok()?;
                Some(text.strip_prefix('\u{feff}').unwrap_or(text).to_string())
            }
            Self::Latin1 => Some(bytes.iter().map(|&b| b as char).collect()),
            Self::Windows1252 => WINDOWS_1252
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|text| text.into_owned()),
        }
    }
}

/// Rows of a tabular resource with the header row split out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    records: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, records: Vec<Vec<String>>) -> Self {
        Self { headers, records }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.records.iter().map(move |cells| Row {
            headers: &self.headers,
            cells,
        })
    }
}

/// A single data row, addressed by column name.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    headers: &'a [String],
    cells: &'a [String],
}

impl<'a> Row<'a> {
    /// Returns the trimmed cell under `column`, or `None` if the table has no such column.
    ///
    /// Column names are compared trimmed and ASCII case-insensitively. A row shorter
    /// than the header yields `""` for the missing cells.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let index = self
            .headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(column))?;
        Some(self.cells.get(index).map(|c| c.trim()).unwrap_or(""))
    }

    /// Returns the cell of the first listed column present in the table, or `""`.
    pub fn first_of(&self, columns: &[&str]) -> &'a str {
        columns
            .iter()
            .find_map(|column| self.get(column))
            .unwrap_or("")
    }
}

/// Parses a downloaded resource body according to its declared format.
pub fn parse_resource(format: ResourceFormat, bytes: &[u8]) -> AppResult<Table> {
    match format {
        ResourceFormat::Xlsx | ResourceFormat::Xls => parse_spreadsheet(bytes),
        ResourceFormat::Csv => parse_csv_bytes(bytes),
    }
}

/// Decodes and parses CSV bytes, trying each of [`CSV_ENCODINGS`] in order.
///
/// The first encoding under which the bytes both decode and parse wins.
///
/// # Errors
///
/// Returns `DecodingError`, listing each attempt, when no encoding produces a table.
pub fn parse_csv_bytes(bytes: &[u8]) -> AppResult<Table> {
    let mut failures = Vec::with_capacity(CSV_ENCODINGS.len());

    for encoding in CSV_ENCODINGS {
        let Some(text) = encoding.decode(bytes) else {
            failures.push(format!("{}: invalid byte sequence", encoding.label()));
            continue;
        };
        match parse_csv_text(&text) {
            Ok(table) => {
                debug!(encoding = encoding.label(), rows = table.len(), "CSV decoded");
                return Ok(table);
            }
            Err(e) => failures.push(format!("{}: {e}", encoding.label())),
        }
    }

    Err(AppError::DecodingError(failures.join("; ")))
}

/// Parses comma-delimited text whose first line is the header row.
///
/// Rows may have fewer or more fields than the header; missing cells read as `""`
/// and extra cells are ignored by column lookups.
pub fn parse_csv_text(text: &str) -> AppResult<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        records.push(record.iter().map(str::to_string).collect());
    }

    Ok(Table::new(headers, records))
}

/// Reads the first worksheet of an `xlsx`/`xls` workbook; its first row is the header.
pub fn parse_spreadsheet(bytes: &[u8]) -> AppResult<Table> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| AppError::ParseError("Workbook has no sheets".into()))?;
    let range = workbook.worksheet_range(&sheet_name)?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(cell_to_string).collect(),
        None => return Ok(Table::default()),
    };
    let records = rows
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    Ok(Table::new(headers, records))
}

/// Renders a spreadsheet cell as text.
///
/// Numeric codes are often stored as floats, so integral values lose the `.0`.
pub(crate) fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}
