//! CSV row source with encoding and delimiter auto-detection.
//!
//! Produces positional rows of cells. Mapping cells to record fields is
//! entirely the rule set's business, so nothing here knows about records.

use csv::ReaderBuilder;
use std::io::Read;
use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::transform::dsl::value::Row;

/// Rows read from one CSV input plus what was detected about it.
#[derive(Debug, Clone)]
pub struct CsvSource {
    /// Rows as positional cell vectors.
    pub rows: Vec<Row>,
    /// Detected or requested encoding.
    pub encoding: String,
    /// Detected or requested delimiter.
    pub delimiter: char,
}

impl CsvSource {
    /// Read rows from raw bytes, detecting encoding and delimiter.
    pub fn from_bytes(bytes: &[u8]) -> CsvResult<Self> {
        if bytes.is_empty() {
            return Err(CsvError::EmptyFile);
        }

        let encoding = detect_encoding(bytes);
        let content = decode_content(bytes, &encoding)?;
        if content.trim().is_empty() {
            return Err(CsvError::EmptyFile);
        }

        let delimiter = detect_delimiter(&content);
        let rows = read_rows(&content, delimiter)?;

        Ok(Self {
            rows,
            encoding,
            delimiter,
        })
    }

    /// Read rows from a file, detecting encoding and delimiter.
    pub fn from_file<P: AsRef<Path>>(path: P) -> CsvResult<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Read rows from a reader, detecting encoding and delimiter.
    pub fn from_reader<R: Read>(mut reader: R) -> CsvResult<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes)
    }
}

/// Detect the encoding of raw bytes using chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to a string using the named encoding.
///
/// Decoding is lossy for the known encodings; an unknown charset that
/// `encoding_rs` has no label for is an error.
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => Ok(encoding_rs::UTF_8.decode(bytes).0.into_owned()),
        "iso-8859-1" | "latin-1" | "latin1" => {
            Ok(encoding_rs::ISO_8859_15.decode(bytes).0.into_owned())
        }
        "windows-1252" | "cp1252" => Ok(encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()),
        other => match encoding_rs::Encoding::for_label(other.as_bytes()) {
            Some(enc) => Ok(enc.decode(bytes).0.into_owned()),
            None => Err(CsvError::EncodingError(format!(
                "unsupported charset '{other}'"
            ))),
        },
    }
}

/// Detect the delimiter by counting occurrences in the first line.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse rows from decoded content with an explicit delimiter.
///
/// No header row is expected; every line is data. Quoted cells may contain
/// the delimiter. Rows may have differing cell counts; rules referring to
/// a cell a short row does not have fail at the row tier, not here.
/// The delimiter must be ASCII.
pub fn read_rows(content: &str, delimiter: char) -> CsvResult<Vec<Row>> {
    // the reader matches a single byte; a multi-byte delimiter can never
    // match and would be truncated silently
    if !delimiter.is_ascii() {
        return Err(CsvError::Delimiter(delimiter));
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .delimiter(delimiter as u8)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(rows)
}
