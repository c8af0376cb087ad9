use clap::Parser;

/// Converts a ranked-choice survey export (Qualtrics "Candidate by Choice" CSV) into
/// cast vote records and configuration files for the RCV Universal Tabulator.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The survey export, in CSV or Excel (xlsx) format. One pair of output files
    /// is written next to it for each contest.
    #[clap(value_parser)]
    pub input: String,

    /// (csv or xlsx, default xlsx) The format of the cast vote records. The tabulator only
    /// reads Excel files: CSV files must be resaved as workbooks.
    #[clap(long, value_parser)]
    pub output_type: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_input_file() {
        let args = Args::try_parse_from(["qualtrics2ess", "export.csv"]).unwrap();
        assert_eq!(args.input, "export.csv");
        assert_eq!(args.output_type, None);
        assert!(!args.verbose);

        let args = Args::try_parse_from([
            "qualtrics2ess",
            "--verbose",
            "--output-type",
            "csv",
            "export.csv",
        ])
        .unwrap();
        assert_eq!(args.output_type.as_deref(), Some("csv"));
        assert!(args.verbose);
    }

    #[test]
    fn input_is_required() {
        assert!(Args::try_parse_from(["qualtrics2ess"]).is_err());
    }

    #[test]
    fn single_input_only() {
        assert!(Args::try_parse_from(["qualtrics2ess", "a.csv", "b.csv"]).is_err());
    }
}
