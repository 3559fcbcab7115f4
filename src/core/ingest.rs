// distress-triage - core/ingest.rs
//
// CSV/TSV decoding into raw rows keyed by the original header strings.
// Core layer: accepts any `Read`, never touches the filesystem directly.
// The `path` arguments are for error context only.

use crate::core::model::RawRow;
use crate::util::constants;
use crate::util::error::IngestError;
use std::io::Read;
use std::path::Path;

/// Field delimiter of a listing export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delimiter {
    #[default]
    Comma,
    Tab,
}

impl Delimiter {
    /// Choose the delimiter from the file extension, rejecting anything that
    /// is not a tabular text export.
    pub fn from_path(path: &Path) -> Result<Self, IngestError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        if !constants::ACCEPTED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(IngestError::UnsupportedFileType {
                path: path.to_path_buf(),
            });
        }
        Ok(if ext == "tsv" {
            Delimiter::Tab
        } else {
            Delimiter::Comma
        })
    }

    fn byte(self) -> u8 {
        match self {
            Delimiter::Comma => b',',
            Delimiter::Tab => b'\t',
        }
    }
}

/// A decoded export: header row plus one raw row per data line.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    /// Header strings in file order, exactly as written (trimmed).
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

/// Decode a listing export.
///
/// Short rows are padded with empty values and long rows have their extra
/// cells ignored, so ragged exports still load. Completely blank lines are
/// skipped. Duplicate headers keep the first column's value.
pub fn read_rows<R: Read>(reader: R, delimiter: Delimiter, path: &Path) -> Result<RawTable, IngestError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter.byte())
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    let mut lossy_cells = 0usize;
    let headers: Vec<String> = csv_reader
        .byte_headers()
        .map_err(|e| IngestError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?
        .iter()
        .map(|h| {
            decode_cell(h, &mut lossy_cells)
                .trim_start_matches('\u{feff}')
                .trim()
                .to_string()
        })
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(IngestError::MissingHeader {
            path: path.to_path_buf(),
        });
    }

    let mut rows = Vec::new();
    for record in csv_reader.byte_records() {
        let record = record.map_err(|e| IngestError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;
        let cells: Vec<String> = record
            .iter()
            .map(|cell| decode_cell(cell, &mut lossy_cells))
            .collect();
        if cells.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let mut row = RawRow::with_capacity(headers.len());
        for (idx, header) in headers.iter().enumerate() {
            if header.is_empty() || row.contains_key(header) {
                continue;
            }
            let value = cells.get(idx).cloned().unwrap_or_default();
            row.insert(header.clone(), value);
        }
        rows.push(row);
    }

    if lossy_cells > 0 {
        tracing::warn!(
            path = %path.display(),
            cells = lossy_cells,
            "Export is not valid UTF-8; invalid bytes replaced"
        );
    }
    tracing::debug!(
        path = %path.display(),
        columns = headers.len(),
        rows = rows.len(),
        "Decoded listing export"
    );

    Ok(RawTable { headers, rows })
}

/// Decode one cell, replacing invalid UTF-8 (e.g. Windows-1252 exports)
/// instead of rejecting the file.
fn decode_cell(bytes: &[u8], lossy_cells: &mut usize) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            *lossy_cells += 1;
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn decode(text: &str) -> RawTable {
        read_rows(text.as_bytes(), Delimiter::Comma, &PathBuf::from("test.csv")).unwrap()
    }

    #[test]
    fn test_delimiter_from_path() {
        assert_eq!(Delimiter::from_path(Path::new("a.csv")).unwrap(), Delimiter::Comma);
        assert_eq!(Delimiter::from_path(Path::new("a.CSV")).unwrap(), Delimiter::Comma);
        assert_eq!(Delimiter::from_path(Path::new("a.tsv")).unwrap(), Delimiter::Tab);
        assert!(matches!(
            Delimiter::from_path(Path::new("a.xlsx")),
            Err(IngestError::UnsupportedFileType { .. })
        ));
        assert!(Delimiter::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_read_rows_keyed_by_header() {
        let t = decode("Address,Asking Price\n\"1 Main St, Sydney\",\"$1,250,000\"\n");
        assert_eq!(t.headers, vec!["Address", "Asking Price"]);
        assert_eq!(t.rows.len(), 1);
        assert_eq!(t.rows[0]["Address"], "1 Main St, Sydney");
        assert_eq!(t.rows[0]["Asking Price"], "$1,250,000");
    }

    #[test]
    fn test_read_rows_ragged_and_blank_lines() {
        let t = decode("A,B,C\n1,2\n\n,,\n4,5,6,7\n");
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.rows[0]["C"], "");
        assert_eq!(t.rows[1]["C"], "6");
    }

    #[test]
    fn test_read_rows_strips_bom_and_whitespace() {
        let t = decode("\u{feff} Address ,Suburb\nx,y\n");
        assert_eq!(t.headers[0], "Address");
        assert_eq!(t.rows[0]["Address"], "x");
    }

    #[test]
    fn test_read_rows_duplicate_header_first_wins() {
        let t = decode("Suburb,Suburb\nfirst,second\n");
        assert_eq!(t.rows[0]["Suburb"], "first");
    }

    #[test]
    fn test_read_rows_tab_delimited() {
        let t = read_rows(
            "Address\tDOM\n1 Main St\t45\n".as_bytes(),
            Delimiter::Tab,
            &PathBuf::from("t.tsv"),
        )
        .unwrap();
        assert_eq!(t.rows[0]["DOM"], "45");
    }

    #[test]
    fn test_read_rows_invalid_utf8_degrades() {
        // Windows-1252: 0x96 is an en-dash, 0xE9 is e-acute
        let bytes: &[u8] =
            b"Address,Price,Description\n1 A St,$850k \x96 $900k,Caf\xe9 must sell\n2 B St,$1M,ok\n";
        let t = read_rows(bytes, Delimiter::Comma, &PathBuf::from("cp1252.csv")).unwrap();
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.rows[0]["Address"], "1 A St");
        assert_eq!(t.rows[0]["Price"], "$850k \u{fffd} $900k");
        assert_eq!(t.rows[0]["Description"], "Caf\u{fffd} must sell");
        assert_eq!(t.rows[1]["Price"], "$1M");
    }

    #[test]
    fn test_read_rows_invalid_utf8_header() {
        let bytes: &[u8] = b"Adresse\xe9,Price\nx,$5\n";
        let t = read_rows(bytes, Delimiter::Comma, &PathBuf::from("h.csv")).unwrap();
        assert_eq!(t.headers[0], "Adresse\u{fffd}");
        assert_eq!(t.rows[0]["Price"], "$5");
    }

    #[test]
    fn test_empty_input_has_no_header() {
        let result = read_rows("".as_bytes(), Delimiter::Comma, &PathBuf::from("e.csv"));
        assert!(matches!(result, Err(IngestError::MissingHeader { .. })));
    }
}
