//! Catalog loading: bytes -> text -> CSV rows -> `MethodDefinition`s.
//!
//! A source either loads completely or fails; rows are never skipped to
//! recover from a malformed cell. Fully blank rows are not data and are
//! ignored.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use csv::StringRecord;

use crate::catalog::cells::{
    CellError, parse_decimals, parse_formula, parse_lower_limit, parse_optional_float,
    parse_upper_limit,
};
use crate::catalog::input::{EncodingIssue, decode_catalog_bytes};
use crate::catalog::method::{Catalog, MethodDefinition};
use crate::normalize::headers::{find_header, normalize_headers};
use crate::normalize::trim::{ascii_trim, is_blank_cell};

pub const COL_METHOD: &str = "Method";
pub const COL_R: &str = "r";
pub const COL_BIG_R: &str = "R";
pub const COL_UNIT: &str = "Unit";
pub const COL_FORMULA_R: &str = "Formula_r";
pub const COL_FORMULA_BIG_R: &str = "Formula_R";
pub const COL_DECIMALS: &str = "Number_of_Decimals";
pub const COL_LOWER_LIMIT: &str = "Lower_Limit";
pub const COL_UPPER_LIMIT: &str = "Upper_Limit";

/// Columns every catalog must carry (order in the file is free).
pub const REQUIRED_COLUMNS: [&str; 9] = [
    COL_METHOD,
    COL_R,
    COL_BIG_R,
    COL_UNIT,
    COL_FORMULA_R,
    COL_FORMULA_BIG_R,
    COL_DECIMALS,
    COL_LOWER_LIMIT,
    COL_UPPER_LIMIT,
];

/// Why a catalog source could not be turned into a `Catalog`.
#[derive(Debug)]
pub enum CatalogLoadError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Encoding(EncodingIssue),
    Csv {
        line: Option<u64>,
        source: csv::Error,
    },
    MissingHeader,
    DuplicateHeader {
        name: String,
    },
    MissingColumn {
        column: &'static str,
    },
    ExtraFields {
        line: u64,
    },
    EmptyMethod {
        line: u64,
    },
    InvalidCell {
        line: u64,
        column: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl fmt::Display for CatalogLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogLoadError::Io { path, source } => {
                write!(f, "cannot read catalog {}: {source}", path.display())
            }
            CatalogLoadError::Encoding(issue) => write!(f, "catalog contains a {issue}"),
            CatalogLoadError::Csv {
                line: Some(line),
                source,
            } => write!(f, "catalog CSV parse error at line {line}: {source}"),
            CatalogLoadError::Csv { line: None, source } => {
                write!(f, "catalog CSV parse error: {source}")
            }
            CatalogLoadError::MissingHeader => f.write_str("catalog has no header row"),
            CatalogLoadError::DuplicateHeader { name } => {
                write!(f, "catalog has duplicate header \"{name}\"")
            }
            CatalogLoadError::MissingColumn { column } => {
                write!(f, "catalog is missing required column \"{column}\"")
            }
            CatalogLoadError::ExtraFields { line } => {
                write!(f, "catalog line {line} has non-empty fields beyond the header")
            }
            CatalogLoadError::EmptyMethod { line } => {
                write!(f, "catalog line {line} has an empty {COL_METHOD}")
            }
            CatalogLoadError::InvalidCell {
                line,
                column,
                value,
                expected,
            } => write!(
                f,
                "catalog line {line}, column {column}: expected {expected}, found \"{value}\""
            ),
        }
    }
}

impl std::error::Error for CatalogLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogLoadError::Io { source, .. } => Some(source),
            CatalogLoadError::Csv { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<EncodingIssue> for CatalogLoadError {
    fn from(issue: EncodingIssue) -> Self {
        CatalogLoadError::Encoding(issue)
    }
}

/// Header positions of the required columns.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    method: usize,
    r: usize,
    big_r: usize,
    unit: usize,
    formula_r: usize,
    formula_big_r: usize,
    decimals: usize,
    lower_limit: usize,
    upper_limit: usize,
}

impl ColumnIndex {
    fn resolve(headers: &[String]) -> Result<Self, CatalogLoadError> {
        let find = |column: &'static str| {
            find_header(headers, column).ok_or(CatalogLoadError::MissingColumn { column })
        };
        Ok(Self {
            method: find(COL_METHOD)?,
            r: find(COL_R)?,
            big_r: find(COL_BIG_R)?,
            unit: find(COL_UNIT)?,
            formula_r: find(COL_FORMULA_R)?,
            formula_big_r: find(COL_FORMULA_BIG_R)?,
            decimals: find(COL_DECIMALS)?,
            lower_limit: find(COL_LOWER_LIMIT)?,
            upper_limit: find(COL_UPPER_LIMIT)?,
        })
    }
}

/// One data row with the header width applied: missing trailing cells read
/// as empty.
struct Row<'a> {
    record: &'a StringRecord,
    line: u64,
}

impl<'a> Row<'a> {
    fn cell(&self, index: usize) -> &'a str {
        self.record.get(index).unwrap_or("")
    }

    fn coerce<T>(
        &self,
        index: usize,
        column: &'static str,
        parse: impl FnOnce(&str) -> Result<T, CellError>,
    ) -> Result<T, CatalogLoadError> {
        let raw = self.cell(index);
        parse(raw).map_err(|err| CatalogLoadError::InvalidCell {
            line: self.line,
            column,
            value: raw.to_string(),
            expected: err.expected,
        })
    }
}

/// Read and parse a catalog file.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog, CatalogLoadError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| CatalogLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let catalog = parse_catalog(&bytes)?;
    tracing::debug!(
        path = %path.display(),
        methods = catalog.len(),
        "catalog loaded"
    );
    Ok(catalog)
}

/// Parse catalog bytes (encoding fallback included).
pub fn parse_catalog(bytes: &[u8]) -> Result<Catalog, CatalogLoadError> {
    let decoded = decode_catalog_bytes(bytes)?;
    tracing::debug!(encoding = decoded.encoding.as_str(), "catalog decoded");
    parse_catalog_text(&decoded.text)
}

/// Parse already-decoded catalog text.
pub fn parse_catalog_text(text: &str) -> Result<Catalog, CatalogLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut record = StringRecord::new();
    if !read_record(&mut reader, &mut record)? {
        return Err(CatalogLoadError::MissingHeader);
    }
    let headers = normalize_headers(record.iter())
        .map_err(|dup| CatalogLoadError::DuplicateHeader { name: dup.name })?;
    let columns = ColumnIndex::resolve(&headers)?;

    let mut catalog = Catalog::empty();
    while read_record(&mut reader, &mut record)? {
        if record.iter().all(is_blank_cell) {
            continue;
        }
        let line = record.position().map(|pos| pos.line()).unwrap_or(0);
        if record.iter().skip(headers.len()).any(|cell| !is_blank_cell(cell)) {
            return Err(CatalogLoadError::ExtraFields { line });
        }
        let row = Row {
            record: &record,
            line,
        };
        catalog.insert(parse_row(&row, &columns)?);
    }

    Ok(catalog)
}

fn read_record<R: io::Read>(
    reader: &mut csv::Reader<R>,
    record: &mut StringRecord,
) -> Result<bool, CatalogLoadError> {
    reader.read_record(record).map_err(|source| {
        let line = source.position().map(|pos| pos.line());
        CatalogLoadError::Csv { line, source }
    })
}

fn parse_row(row: &Row<'_>, columns: &ColumnIndex) -> Result<MethodDefinition, CatalogLoadError> {
    let name = ascii_trim(row.cell(columns.method));
    if name.is_empty() {
        return Err(CatalogLoadError::EmptyMethod { line: row.line });
    }

    Ok(MethodDefinition {
        name: name.to_string(),
        unit: ascii_trim(row.cell(columns.unit)).to_string(),
        static_r: row.coerce(columns.r, COL_R, parse_optional_float)?,
        static_big_r: row.coerce(columns.big_r, COL_BIG_R, parse_optional_float)?,
        formula_r: parse_formula(row.cell(columns.formula_r)),
        formula_big_r: parse_formula(row.cell(columns.formula_big_r)),
        lower_limit: row.coerce(columns.lower_limit, COL_LOWER_LIMIT, parse_lower_limit)?,
        upper_limit: row.coerce(columns.upper_limit, COL_UPPER_LIMIT, parse_upper_limit)?,
        decimals: row.coerce(columns.decimals, COL_DECIMALS, parse_decimals)?,
    })
}
