use crate::convert::io_common::ExportName;
use crate::convert::*;

use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use snafu::ResultExt;

// The configuration format of the RCV Universal Tabulator:
// https://github.com/BrightSpots/rcv/blob/develop/config_file_documentation.txt
// Fields are declared in the order in which they are written.

pub const TABULATOR_VERSION: &str = "1.2.0";

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "contestName")]
    pub contest_name: String,
    #[serde(rename = "outputDirectory")]
    pub output_directory: String,
    #[serde(rename = "contestDate")]
    pub contest_date: String,
    #[serde(rename = "contestJurisdiction")]
    pub contest_jurisdiction: String,
    #[serde(rename = "contestOffice")]
    pub contest_office: String,
    #[serde(rename = "tabulateByPrecinct")]
    pub tabulate_by_precinct: bool,
    #[serde(rename = "generateCdfJson")]
    pub generate_cdf_json: bool,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "contestId")]
    pub contest_id: String,
    #[serde(rename = "firstVoteColumnIndex")]
    pub first_vote_column_index: String,
    #[serde(rename = "firstVoteRowIndex")]
    pub first_vote_row_index: String,
    #[serde(rename = "idColumnIndex")]
    pub id_column_index: String,
    #[serde(rename = "precinctColumnIndex")]
    pub precinct_column_index: String,
    #[serde(rename = "overvoteDelimiter")]
    pub overvote_delimiter: String,
    pub provider: String,
    #[serde(rename = "overvoteLabel")]
    pub overvote_label: String,
    #[serde(rename = "undervoteLabel")]
    pub undervote_label: String,
    #[serde(rename = "undeclaredWriteInLabel")]
    pub undeclared_write_in_label: String,
    #[serde(rename = "treatBlankAsUndeclaredWriteIn")]
    pub treat_blank_as_undeclared_write_in: bool,
}

impl FileSource {
    /// An ES&S cast vote record file, as written by the converter.
    pub fn ess(file_path: String) -> FileSource {
        FileSource {
            file_path,
            contest_id: String::new(),
            first_vote_column_index: "4".to_string(),
            first_vote_row_index: "2".to_string(),
            id_column_index: "1".to_string(),
            precinct_column_index: "2".to_string(),
            overvote_delimiter: String::new(),
            provider: "ess".to_string(),
            overvote_label: "overvote".to_string(),
            undervote_label: UNDERVOTE.to_string(),
            undeclared_write_in_label: String::new(),
            treat_blank_as_undeclared_write_in: false,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RcvCandidate {
    pub name: String,
    pub code: String,
    pub excluded: bool,
}

impl From<&Candidate> for RcvCandidate {
    fn from(c: &Candidate) -> Self {
        RcvCandidate {
            name: c.name.clone(),
            code: c.code.clone().unwrap_or_default(),
            excluded: c.excluded,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RcvRules {
    #[serde(rename = "tiebreakMode")]
    pub tiebreak_mode: String,
    #[serde(rename = "overvoteRule")]
    pub overvote_rule: String,
    #[serde(rename = "winnerElectionMode")]
    pub winner_election_mode: String,
    #[serde(rename = "randomSeed")]
    pub random_seed: String,
    #[serde(rename = "numberOfWinners")]
    pub number_of_winners: String,
    #[serde(rename = "multiSeatBottomsUpPercentageThreshold")]
    pub multi_seat_bottoms_up_percentage_threshold: String,
    #[serde(rename = "decimalPlacesForVoteArithmetic")]
    pub decimal_places_for_vote_arithmetic: String,
    #[serde(rename = "minimumVoteThreshold")]
    pub minimum_vote_threshold: String,
    #[serde(rename = "maxSkippedRanksAllowed")]
    pub max_skipped_ranks_allowed: String,
    #[serde(rename = "maxRankingsAllowed")]
    pub max_rankings_allowed: String,
    #[serde(rename = "nonIntegerWinningThreshold")]
    pub non_integer_winning_threshold: bool,
    #[serde(rename = "hareQuota")]
    pub hare_quota: bool,
    #[serde(rename = "batchElimination")]
    pub batch_elimination: bool,
    #[serde(rename = "continueUntilTwoCandidatesRemain")]
    pub continue_until_two_candidates_remain: bool,
    #[serde(rename = "exhaustOnDuplicateCandidate")]
    pub exhaust_on_duplicate_candidate: bool,
    #[serde(rename = "rulesDescription")]
    pub rules_description: String,
    #[serde(rename = "treatBlankAsUndeclaredWriteIn")]
    pub treat_blank_as_undeclared_write_in: bool,
}

impl RcvRules {
    /// Placeholder rules: the winning rules are left blank, to be completed in the tabulator.
    pub fn defaults(random_seed: String) -> RcvRules {
        RcvRules {
            tiebreak_mode: "previousRoundCountsThenRandom".to_string(),
            overvote_rule: "exhaustImmediately".to_string(),
            winner_election_mode: String::new(),
            random_seed,
            number_of_winners: String::new(),
            multi_seat_bottoms_up_percentage_threshold: String::new(),
            decimal_places_for_vote_arithmetic: "4".to_string(),
            minimum_vote_threshold: String::new(),
            max_skipped_ranks_allowed: "1".to_string(),
            max_rankings_allowed: "max".to_string(),
            non_integer_winning_threshold: false,
            hare_quota: false,
            batch_elimination: false,
            continue_until_two_candidates_remain: false,
            exhaust_on_duplicate_candidate: false,
            rules_description: String::new(),
            treat_blank_as_undeclared_write_in: false,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RcvConfig {
    #[serde(rename = "tabulatorVersion")]
    pub tabulator_version: String,
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(rename = "cvrFileSources")]
    pub cvr_file_sources: Vec<FileSource>,
    pub candidates: Vec<RcvCandidate>,
    pub rules: RcvRules,
}

/// A seed in `0..10000` that only depends on the name of the contest files,
/// so that converting the same export twice gives the same configuration.
fn random_seed(contest_file_name: &str) -> String {
    let hash = sha256::digest(contest_file_name);
    let seed = u32::from_str_radix(&hash[..8], 16).unwrap_or(0) % 10000;
    seed.to_string()
}

pub fn build_config(export: &ExportName, summary: &ContestSummary) -> RcvConfig {
    let contest_file_name = export.contest_file_name(&summary.label);
    RcvConfig {
        tabulator_version: TABULATOR_VERSION.to_string(),
        output_settings: OutputSettings {
            contest_name: export.contest_name.clone(),
            output_directory: export.output_directory.display().to_string(),
            contest_date: export.contest_date_iso(),
            contest_jurisdiction: String::new(),
            contest_office: summary.label.clone(),
            tabulate_by_precinct: false,
            generate_cdf_json: false,
        },
        // The tabulator only reads workbooks for this provider.
        cvr_file_sources: vec![FileSource::ess(format!("{}.xlsx", contest_file_name))],
        candidates: summary.candidates.iter().map(RcvCandidate::from).collect(),
        rules: RcvRules::defaults(random_seed(&contest_file_name)),
    }
}

/// Pretty-prints the configuration with 4 spaces of indentation.
pub fn config_to_json(config: &RcvConfig) -> ConvertResult<String> {
    let mut buf: Vec<u8> = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    config.serialize(&mut ser).context(SerializingJsonSnafu {})?;
    // serde_json only writes UTF-8: the fallback never copies in practice.
    Ok(String::from_utf8(buf)
        .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::Value as JSValue;
    use std::path::PathBuf;

    fn export() -> ExportName {
        ExportName {
            base_name: "Board Election_April 5, 2021_01.40".to_string(),
            contest_name: "Board Election".to_string(),
            contest_date: NaiveDate::from_ymd_opt(2021, 4, 5),
            output_directory: PathBuf::from("/data"),
        }
    }

    fn summary() -> ContestSummary {
        ContestSummary {
            label: "Q3".to_string(),
            candidates: vec![
                Candidate {
                    name: "Alice".to_string(),
                    code: None,
                    excluded: false,
                },
                Candidate {
                    name: "Jane Doe".to_string(),
                    code: None,
                    excluded: false,
                },
            ],
        }
    }

    #[test]
    fn config_fields() {
        let config = build_config(&export(), &summary());
        assert_eq!(config.output_settings.contest_name, "Board Election");
        assert_eq!(config.output_settings.contest_date, "2021-04-05");
        assert_eq!(config.output_settings.contest_office, "Q3");
        assert_eq!(config.output_settings.output_directory, "/data");
        assert_eq!(config.cvr_file_sources.len(), 1);
        assert_eq!(
            config.cvr_file_sources[0].file_path,
            "Board Election_April 5, 2021_01.40_Q3.xlsx"
        );
        assert_eq!(config.cvr_file_sources[0].undervote_label, "undervote");
        assert_eq!(config.candidates.len(), 2);
        assert_eq!(config.candidates[1].name, "Jane Doe");
        assert_eq!(config.candidates[1].code, "");
        assert!(!config.candidates[1].excluded);
    }

    #[test]
    fn seed_is_stable() {
        let a = build_config(&export(), &summary());
        let b = build_config(&export(), &summary());
        assert_eq!(a.rules.random_seed, b.rules.random_seed);
        let seed: u32 = a.rules.random_seed.parse().unwrap();
        assert!(seed < 10000);
    }

    #[test]
    fn json_layout() {
        let config = build_config(&export(), &summary());
        let js = config_to_json(&config).unwrap();
        assert!(js.starts_with("{\n    \"tabulatorVersion\": \"1.2.0\",\n    \"outputSettings\": {\n        \"contestName\""));
        let keys: Vec<String> = match serde_json::from_str::<JSValue>(&js).unwrap() {
            JSValue::Object(m) => m.keys().cloned().collect(),
            _ => vec![],
        };
        assert_eq!(keys.len(), 5);

        let back: RcvConfig = serde_json::from_str(&js).unwrap();
        assert_eq!(back, config);
        assert_eq!(back.rules.max_rankings_allowed, "max");
        assert_eq!(back.rules.tiebreak_mode, "previousRoundCountsThenRandom");
    }

    #[test]
    fn json_keeps_non_ascii_names() {
        let mut s = summary();
        s.candidates[0].name = "Zoë Müller".to_string();
        let js = config_to_json(&build_config(&export(), &s)).unwrap();
        assert!(js.contains("\"name\": \"Zoë Müller\""));
    }
}
