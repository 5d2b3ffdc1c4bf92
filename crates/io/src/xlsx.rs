// Excel import (xlsx, xls, xlsb, ods) - first worksheet only

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use tabsum_engine::Table;

use crate::IoError;

/// Import the first worksheet. The first non-blank row of the used range is
/// the header row; blank rows after it are dropped.
pub fn import(path: &Path) -> Result<Table, IoError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| {
        let message = format!("failed to open Excel file {}: {e}", path.display());
        IoError::Excel(message)
    })?;

    let Some(sheet_name) = workbook.sheet_names().first().cloned() else {
        return Err(IoError::Excel("workbook contains no sheets".to_string()));
    };

    let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
        let message = format!("failed to read sheet '{sheet_name}': {e}");
        IoError::Excel(message)
    })?;

    let (height, width) = range.get_size();
    log::debug!("reading sheet '{sheet_name}' ({height}x{width})");

    let mut table: Option<Table> = None;
    for row in range.rows() {
        let fields: Vec<String> = row.iter().map(cell_text).collect();
        if fields.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        match table.as_mut() {
            None => table = Some(Table::new(fields)),
            Some(t) => t.push_row(fields),
        }
    }

    table.ok_or(IoError::Empty)
}

/// Render a cell the way it would appear in a CSV export.
pub(crate) fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => {
            // Integers without decimals
            if n.fract() == 0.0 && n.abs() < 1e15 {
                (*n as i64).to_string()
            } else {
                n.to_string()
            }
        }
        Data::Int(n) => n.to_string(),
        Data::Bool(true) => "TRUE".to_string(),
        Data::Bool(false) => "FALSE".to_string(),
        Data::Error(e) => format!("#{e:?}"),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}
