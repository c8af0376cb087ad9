// Primitives for reading the survey exports.

use std::path::Path;

use ballot_inversion::builder::{Builder, RowKind};
use calamine::{open_workbook, DataType, Reader, Xlsx};
use log::debug;
use snafu::{OptionExt, ResultExt};

use crate::convert::*;

/// Reads a full export, CSV or Excel depending on the extension of the file.
pub fn read_export(path: &str, rules: &InversionRules) -> ConvertResult<Conversion> {
    let mut builder = Builder::new(rules);
    if is_excel(path) {
        read_excel_rows(path, &mut builder)?;
    } else {
        read_csv_rows(path, &mut builder)?;
    }
    builder.finish().context(InvalidFormatSnafu {})
}

fn is_excel(path: &str) -> bool {
    Path::new(path)
        .extension()
        .map(|e| e.eq_ignore_ascii_case("xlsx"))
        .unwrap_or(false)
}

fn add_row(builder: &mut Builder, lineno: usize, row: &[String]) -> ConvertResult<()> {
    let kind = builder.add_row(row).context(InvalidFormatSnafu {})?;
    if kind == RowKind::Metadata {
        debug!("add_row: line {}: skipped metadata row", lineno);
    }
    Ok(())
}

fn read_csv_rows(path: &str, builder: &mut Builder) -> ConvertResult<()> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(OpeningCsvSnafu { path })?;
    for (idx, line_r) in rdr.into_records().enumerate() {
        let lineno = idx + 1;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        let row: Vec<String> = line.iter().map(|s| s.to_string()).collect();
        add_row(builder, lineno, &row)?;
    }
    Ok(())
}

fn read_excel_rows(path: &str, builder: &mut Builder) -> ConvertResult<()> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange = workbook
        .worksheet_range_at(0)
        .context(EmptyExcelSnafu {})?
        .context(OpeningExcelSnafu { path })?;
    for (idx, cells) in wrange.rows().enumerate() {
        let row: Vec<String> = cells.iter().map(cell_text).collect();
        // Formatted but empty rows at the end of a sheet.
        if row.iter().all(|c| c.is_empty()) {
            continue;
        }
        add_row(builder, idx + 1, &row)?;
    }
    Ok(())
}

/// The text of a cell, as it would appear in the CSV export.
fn cell_text(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.clone(),
        // Ranks are stored as numbers: 1.0 must read "1".
        DataType::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        DataType::Float(f) => f.to_string(),
        // Dates are kept as the serial number stored in the sheet.
        DataType::DateTime(f) => f.to_string(),
        DataType::Int(i) => i.to_string(),
        DataType::Bool(b) => b.to_string(),
        DataType::Error(_) | DataType::Empty => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn cells() {
        assert_eq!(cell_text(&DataType::Float(2.0)), "2");
        assert_eq!(cell_text(&DataType::Float(2.5)), "2.5");
        assert_eq!(cell_text(&DataType::Int(-99)), "-99");
        assert_eq!(cell_text(&DataType::String("Bob".to_string())), "Bob");
        assert_eq!(cell_text(&DataType::Empty), "");
        assert_eq!(cell_text(&DataType::DateTime(44291.5)), "44291.5");
        assert_eq!(
            cell_text(&DataType::Error(calamine::CellErrorType::NA)),
            ""
        );
    }

    #[test]
    fn excel_extension() {
        assert!(is_excel("/data/export.xlsx"));
        assert!(is_excel("export.XLSX"));
        assert!(!is_excel("export.csv"));
        assert!(!is_excel("export"));
    }

    #[test]
    fn reads_csv_with_ragged_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        let meta = "a,b,c,d,e,f,g,h,i,j";
        let content = format!(
            "{m},Q1_1,Q1_2,Q1_3\n{m},X - Ann,X - Ben,X - Text\n{m},2,1\n",
            m = meta
        );
        fs::write(&path, content).unwrap();
        let conversion = read_export(path.to_str().unwrap(), &InversionRules::default()).unwrap();
        assert_eq!(conversion.ballots.len(), 1);
        let choices: Vec<&str> = conversion.ballots[0].choices[0]
            .iter()
            .map(|c| c.as_str())
            .collect();
        assert_eq!(choices, vec!["Ben", "Ann"]);
    }

    #[test]
    fn missing_file() {
        let res = read_export("/nonexistent/export.csv", &InversionRules::default());
        assert!(matches!(res, Err(ConvertError::OpeningCsv { .. })));
    }

    #[test]
    fn header_only_export_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        fs::write(&path, "a,b,c,d,e,f,g,h,i,j,Q1_1\n").unwrap();
        let res = read_export(path.to_str().unwrap(), &InversionRules::default());
        assert!(matches!(
            res,
            Err(ConvertError::InvalidFormat {
                source: FormatError::MissingHeaderRows
            })
        ));
    }
}
