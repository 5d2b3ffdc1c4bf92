// CSV/TSV import

use std::io::Read;
use std::path::Path;

use tabsum_engine::Table;

use crate::IoError;

const UTF8_BOM: char = '\u{feff}';

pub fn import(path: &Path) -> Result<Table, IoError> {
    let content = read_file_as_utf8(path)?;
    import_from_str(&content, None)
}

pub fn import_tsv(path: &Path) -> Result<Table, IoError> {
    let content = read_file_as_utf8(path)?;
    import_from_str(&content, Some(b'\t'))
}

pub fn import_with_delimiter(path: &Path, delimiter: u8) -> Result<Table, IoError> {
    let content = read_file_as_utf8(path)?;
    import_from_str(&content, Some(delimiter))
}

/// Read CSV from any reader (stdin). `None` sniffs the delimiter.
pub fn import_reader<R: Read>(mut reader: R, delimiter: Option<u8>) -> Result<Table, IoError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).map_err(IoError::Stream)?;
    import_from_str(&decode(bytes), delimiter)
}

/// Candidate field delimiters, in tie-break order.
const DELIMITER_CANDIDATES: &[u8] = b"\t;,|";

const SNIFF_LINES: usize = 10;

/// Detect the most likely field delimiter from the first few lines.
///
/// Each candidate is scored by how many lines share the header line's field
/// count, times that count. A candidate that leaves the header as a single
/// field scores zero. Comma is the fallback.
pub fn sniff_delimiter(content: &str) -> u8 {
    let sample: Vec<&str> = content.lines().take(SNIFF_LINES).collect();

    let mut best = b',';
    let mut best_score = 0;
    for &delim in DELIMITER_CANDIDATES {
        let score = delimiter_score(&sample, delim);
        // Strictly greater: on equal scores the earlier candidate stays
        if score > best_score {
            best = delim;
            best_score = score;
        }
    }
    best
}

fn delimiter_score(sample: &[&str], delim: u8) -> usize {
    let mut counts = sample.iter().map(|line| field_count(line, delim));
    let header = match counts.next() {
        Some(n) if n > 1 => n,
        _ => return 0,
    };
    let agreeing = 1 + counts.filter(|&n| n == header).count();
    agreeing * header
}

fn field_count(line: &str, delim: u8) -> usize {
    csv::ReaderBuilder::new()
        .delimiter(delim)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes())
        .records()
        .next()
        .and_then(|r| r.ok())
        .map_or(1, |r| r.len())
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let bytes = std::fs::read(path).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(decode(bytes))
}

fn decode(bytes: Vec<u8>) -> String {
    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            // Excel-exported CSVs are commonly Windows-1252
            log::debug!("input is not UTF-8; decoding as Windows-1252");
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };
    match text.strip_prefix(UTF8_BOM) {
        Some(rest) => rest.to_string(),
        None => text,
    }
}

/// Parse CSV text. The first record is the header row; blank records are dropped.
pub fn import_from_str(content: &str, delimiter: Option<u8>) -> Result<Table, IoError> {
    let delimiter = delimiter.unwrap_or_else(|| sniff_delimiter(content));
    log::debug!("parsing CSV with delimiter {:?}", delimiter as char);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut table: Option<Table> = None;

    for result in reader.records() {
        let record = result.map_err(|e| IoError::Csv {
            line: e.position().map(|p| p.line()).unwrap_or(0),
            message: e.to_string(),
        })?;

        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        let fields: Vec<String> = record.iter().map(str::to_string).collect();
        match table.as_mut() {
            None => table = Some(Table::new(fields)),
            Some(t) => t.push_row(fields),
        }
    }

    let table = table.ok_or(IoError::Empty)?;
    log::debug!("read {} data rows", table.row_count());
    Ok(table)
}
