use log::{debug, info, warn};

use ballot_inversion::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use crate::convert::config_writer::*;
use crate::convert::io_common::ExportName;

pub mod config_writer;
pub mod io_common;
pub mod io_ess;
pub mod io_qualtrics;

/// Written in the "Ballot Style" column of every cast vote record.
const BALLOT_STYLE: &str = "Qualtrics";

#[derive(Debug, Snafu)]
pub enum ConvertError {
    #[snafu(display("Error opening file {path}"))]
    OpeningCsv { source: csv::Error, path: String },
    #[snafu(display("Error parsing line {lineno} of the export"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The workbook does not contain any worksheet"))]
    EmptyExcel {},
    #[snafu(display("Invalid export: {source}"))]
    InvalidFormat { source: FormatError },
    #[snafu(display("Error writing file {path}"))]
    WritingCsv { source: csv::Error, path: String },
    #[snafu(display("Error writing file {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing workbook {path}: {message}"))]
    WritingExcel { path: String, message: String },
    #[snafu(display("Error serializing the tabulator configuration"))]
    SerializingJson { source: serde_json::Error },
    #[snafu(display("Cannot determine the output directory"))]
    MissingOutputDir { source: std::io::Error },
    #[snafu(display("Unknown output type {name:?} (expected csv or xlsx)"))]
    UnknownOutputType { name: String },
}

pub type ConvertResult<T> = Result<T, ConvertError>;

/// The format of the cast vote records.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum OutputType {
    Csv,
    #[cfg(feature = "xlsx")]
    Xlsx,
}

impl OutputType {
    /// Reads the `--output-type` option. Without a value, workbooks are preferred
    /// when the workbook writer is available.
    pub fn from_name(name: Option<&str>) -> ConvertResult<OutputType> {
        match name {
            #[cfg(feature = "xlsx")]
            None | Some("xlsx") => Ok(OutputType::Xlsx),
            #[cfg(not(feature = "xlsx"))]
            None => Ok(OutputType::Csv),
            #[cfg(not(feature = "xlsx"))]
            Some("xlsx") => {
                warn!("This program was built without the Excel writer, writing CSV files instead");
                Ok(OutputType::Csv)
            }
            Some("csv") => Ok(OutputType::Csv),
            Some(x) => UnknownOutputTypeSnafu { name: x }.fail(),
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            OutputType::Csv => "csv",
            #[cfg(feature = "xlsx")]
            OutputType::Xlsx => "xlsx",
        }
    }
}

/// Writes each contest next to the export: the cast vote records and the
/// tabulator configuration.
struct FileSink<'a> {
    export: &'a ExportName,
    output_type: OutputType,
    written: Vec<PathBuf>,
}

impl<'a> FileSink<'a> {
    fn new(export: &'a ExportName, output_type: OutputType) -> FileSink<'a> {
        FileSink {
            export,
            output_type,
            written: Vec::new(),
        }
    }

    fn saved(&mut self, path: PathBuf) {
        info!("Saved: {}", path.display());
        self.written.push(path);
    }
}

impl<'a> ContestSink for FileSink<'a> {
    type Error = ConvertError;

    fn write_summary(&mut self, summary: &ContestSummary) -> ConvertResult<()> {
        let config = build_config(self.export, summary);
        let path = self.export.config_path(&summary.label);
        let js = config_to_json(&config)?;
        fs::write(&path, js).context(WritingFileSnafu {
            path: path.display().to_string(),
        })?;
        self.saved(path);
        Ok(())
    }

    fn write_records(&mut self, records: &CastVoteRecords) -> ConvertResult<()> {
        let path = self
            .export
            .records_path(&records.label, self.output_type.extension());
        debug!(
            "write_records: contest {}: {} records to {:?}",
            records.label,
            records.records.len(),
            path
        );
        match self.output_type {
            OutputType::Csv => io_ess::write_csv(&path, records)?,
            #[cfg(feature = "xlsx")]
            OutputType::Xlsx => io_ess::write_xlsx(&path, records)?,
        }
        self.saved(path);
        Ok(())
    }
}

/// Converts the export at `input_path` and writes the files of every contest.
///
/// The whole export is read before anything is written: a malformed header
/// produces no output at all. Returns the paths of the files written.
pub fn run_conversion(input_path: &str, output_type: OutputType) -> ConvertResult<Vec<PathBuf>> {
    info!("Attempting to read export {:?}", input_path);
    let export = ExportName::from_path(Path::new(input_path))?;
    debug!("run_conversion: export: {:?}", export);

    let rules = InversionRules::default();
    let conversion = io_qualtrics::read_export(input_path, &rules)?;

    let options = EmitOptions {
        source_id: export.base_name.clone(),
        ballot_style: BALLOT_STYLE.to_string(),
    };
    let mut sink = FileSink::new(&export, output_type);
    emit_contests(&conversion, &options, &mut sink)?;

    if output_type == OutputType::Csv {
        warn!("Output CSV files must be opened by Excel and resaved as Excel Workbook (.xlsx) files.");
    }
    warn!("Election rules are not determined! Open the _cdf.json files in the RCV Tabulator, and set the Rules Description and Winning Rules.");
    Ok(sink.written)
}
