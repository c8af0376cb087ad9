// Writers for the ES&S cast vote records.

use std::path::Path;

use snafu::ResultExt;

use crate::convert::*;

/// The name of the worksheet that holds the records.
#[cfg(feature = "xlsx")]
pub const SHEET_NAME: &str = "Marked Sheet";

pub fn write_csv(path: &Path, records: &CastVoteRecords) -> ConvertResult<()> {
    let p = path.display().to_string();
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_path(path)
        .context(WritingCsvSnafu { path: p.clone() })?;
    wtr.write_record(&records.header)
        .context(WritingCsvSnafu { path: p.clone() })?;
    for record in records.records.iter() {
        wtr.write_record(record.to_row())
            .context(WritingCsvSnafu { path: p.clone() })?;
    }
    wtr.flush().context(WritingFileSnafu { path: p })?;
    Ok(())
}

#[cfg(feature = "xlsx")]
pub fn write_xlsx(path: &Path, records: &CastVoteRecords) -> ConvertResult<()> {
    use rust_xlsxwriter::{Workbook, XlsxError};

    let p = path.display().to_string();
    let fail = |e: XlsxError| {
        WritingExcelSnafu {
            path: p.clone(),
            message: e.to_string(),
        }
        .build()
    };

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME).map_err(fail)?;
    for (col, title) in records.header.iter().enumerate() {
        sheet.write_string(0, col as u16, title).map_err(fail)?;
    }
    for (idx, record) in records.records.iter().enumerate() {
        let row = (idx + 1) as u32;
        // The record number is the only numeric cell.
        sheet.write_number(row, 0, record.id as f64).map_err(fail)?;
        sheet.write_string(row, 1, &record.precinct).map_err(fail)?;
        sheet
            .write_string(row, 2, &record.ballot_style)
            .map_err(fail)?;
        for (col, choice) in record.choices.iter().enumerate() {
            sheet
                .write_string(row, (col + 3) as u16, choice.as_str())
                .map_err(fail)?;
        }
    }
    workbook.save(path).map_err(fail)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> CastVoteRecords {
        CastVoteRecords {
            label: "Q1".to_string(),
            header: vec![
                "Cast Vote Record".to_string(),
                "Precinct".to_string(),
                "Ballot Style".to_string(),
                "Q1 Choice 1".to_string(),
                "Q1 Choice 2".to_string(),
            ],
            records: vec![CastVoteRecord {
                id: 1,
                precinct: "Election, 2021".to_string(),
                ballot_style: "Qualtrics".to_string(),
                choices: vec![
                    BallotChoice::WriteIn("Jane Doe".to_string()),
                    BallotChoice::Undervote,
                ],
            }],
        }
    }

    #[test]
    fn csv_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_csv(&path, &records()).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "Cast Vote Record,Precinct,Ballot Style,Q1 Choice 1,Q1 Choice 2\r\n\
             1,\"Election, 2021\",Qualtrics,Jane Doe,undervote\r\n"
        );
    }

    #[test]
    fn csv_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let res = write_csv(&path, &records());
        assert!(matches!(res, Err(ConvertError::WritingCsv { .. })));
    }

    #[cfg(feature = "xlsx")]
    #[test]
    fn xlsx_records() {
        use calamine::{open_workbook, DataType, Reader, Xlsx};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        write_xlsx(&path, &records()).unwrap();
        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        let range = workbook.worksheet_range(SHEET_NAME).unwrap().unwrap();
        assert_eq!(range.get_size(), (2, 5));
        assert_eq!(
            range.get_value((1, 1)),
            Some(&DataType::String("Election, 2021".to_string()))
        );
        assert_eq!(range.get_value((1, 0)), Some(&DataType::Float(1.0)));
        assert_eq!(
            range.get_value((1, 4)),
            Some(&DataType::String("undervote".to_string()))
        );
    }
}
