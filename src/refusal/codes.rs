use std::fmt;
use std::str::FromStr;

/// Canonical refusal codes (v0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefusalCode {
    Io,
    Encoding,
    CsvParse,
    Headers,
    Cell,
    NoMethod,
    Bounds,
    Formula,
    Save,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownRefusalCode;

impl RefusalCode {
    pub const ALL: [RefusalCode; 9] = [
        RefusalCode::Io,
        RefusalCode::Encoding,
        RefusalCode::CsvParse,
        RefusalCode::Headers,
        RefusalCode::Cell,
        RefusalCode::NoMethod,
        RefusalCode::Bounds,
        RefusalCode::Formula,
        RefusalCode::Save,
    ];

    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            RefusalCode::Io => "E_IO",
            RefusalCode::Encoding => "E_ENCODING",
            RefusalCode::CsvParse => "E_CSV_PARSE",
            RefusalCode::Headers => "E_HEADERS",
            RefusalCode::Cell => "E_CELL",
            RefusalCode::NoMethod => "E_NO_METHOD",
            RefusalCode::Bounds => "E_BOUNDS",
            RefusalCode::Formula => "E_FORMULA",
            RefusalCode::Save => "E_SAVE",
        }
    }

    /// A short, stable reason label for human output.
    #[inline]
    pub const fn reason(self) -> &'static str {
        match self {
            RefusalCode::Io => "catalog read error",
            RefusalCode::Encoding => "unsupported catalog text encoding",
            RefusalCode::CsvParse => "catalog CSV parse failure",
            RefusalCode::Headers => "missing, duplicate or misaligned catalog columns",
            RefusalCode::Cell => "malformed catalog cell",
            RefusalCode::NoMethod => "no valid method selected",
            RefusalCode::Bounds => "value outside the method's accepted range",
            RefusalCode::Formula => "limit formula could not be evaluated",
            RefusalCode::Save => "results could not be saved",
        }
    }
}

impl fmt::Display for RefusalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for UnknownRefusalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown refusal code")
    }
}

impl std::error::Error for UnknownRefusalCode {}

impl FromStr for RefusalCode {
    type Err = UnknownRefusalCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RefusalCode::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or(UnknownRefusalCode)
    }
}
