// Input format detection and dispatch

use std::path::Path;

use tabsum_engine::Table;

use crate::IoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Tsv,
    Xlsx,
}

impl InputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputFormat::Csv => "csv",
            InputFormat::Tsv => "tsv",
            InputFormat::Xlsx => "xlsx",
        }
    }
}

/// Guess the format from the file extension. Anything unrecognized is CSV.
pub fn infer_format(path: &Path) -> InputFormat {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match ext.as_deref() {
        Some("tsv") | Some("tab") => InputFormat::Tsv,
        Some("xlsx") | Some("xls") | Some("xlsb") | Some("xlsm") | Some("ods") => InputFormat::Xlsx,
        _ => InputFormat::Csv,
    }
}

/// Load a table from `path`. `delimiter` only applies to CSV; `None` sniffs it.
pub fn load(path: &Path, format: InputFormat, delimiter: Option<u8>) -> Result<Table, IoError> {
    log::info!("loading {} as {}", path.display(), format.as_str());
    match format {
        InputFormat::Csv => match delimiter {
            Some(d) => crate::csv::import_with_delimiter(path, d),
            None => crate::csv::import(path),
        },
        InputFormat::Tsv => crate::csv::import_tsv(path),
        InputFormat::Xlsx => crate::xlsx::import(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_infer_format() {
        assert_eq!(infer_format(&PathBuf::from("data.csv")), InputFormat::Csv);
        assert_eq!(infer_format(&PathBuf::from("data.TSV")), InputFormat::Tsv);
        assert_eq!(infer_format(&PathBuf::from("book.xlsx")), InputFormat::Xlsx);
        assert_eq!(infer_format(&PathBuf::from("book.ods")), InputFormat::Xlsx);
        assert_eq!(infer_format(&PathBuf::from("data.txt")), InputFormat::Csv);
        assert_eq!(infer_format(&PathBuf::from("data")), InputFormat::Csv);
    }

    #[test]
    fn test_load_with_explicit_delimiter() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.txt");
        // Sniffing would pick ';' here; the explicit delimiter wins
        std::fs::write(&path, "Category;x,Value\nA;b,1\n").unwrap();

        let table = load(&path, InputFormat::Csv, Some(b',')).unwrap();
        assert_eq!(table.headers, vec!["Category;x", "Value"]);
    }
}
