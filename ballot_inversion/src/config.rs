// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;
use std::ops::Range;

/// The keyword written in a choice column when no preference was expressed at that rank.
pub const UNDERVOTE: &str = "undervote";

/// The layout conventions of a "Candidate by Choice" export.
///
/// The default values correspond to the exports produced by the Qualtrics survey tool.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct InversionRules {
    /// The number of leading columns that describe the respondent (ids, dates, ...)
    /// and carry no ranking information.
    pub metadata_columns: usize,
    /// The candidate name that marks the write-in column of a contest.
    pub write_in_label: String,
    /// The candidate name of the free-text column holding the write-in value.
    pub write_in_text_label: String,
}

impl Default for InversionRules {
    fn default() -> Self {
        InversionRules {
            metadata_columns: 10,
            write_in_label: "Write-In".to_string(),
            write_in_text_label: "Text".to_string(),
        }
    }
}

impl InversionRules {
    /// True if the name is one of the layout markers rather than a candidate.
    pub fn is_marker(&self, name: &str) -> bool {
        name == self.write_in_label || name == self.write_in_text_label
    }
}

/// One ranked-choice question of the export.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Contest {
    /// The contest tag, for example `Q1`.
    pub label: String,
    /// The half-open range of columns of this contest in the flat row.
    /// The last column holds the write-in text.
    pub columns: Range<usize>,
    /// The declared name for each column of the range, in column order.
    pub candidates: Vec<String>,
    // Declared candidates first, then the write-ins in the order they were found.
    all_candidates: Vec<String>,
}

impl Contest {
    pub fn new(
        label: String,
        columns: Range<usize>,
        candidates: Vec<String>,
        rules: &InversionRules,
    ) -> Contest {
        let mut contest = Contest {
            label,
            columns,
            candidates: candidates.clone(),
            all_candidates: Vec::new(),
        };
        for name in candidates.iter().filter(|n| !rules.is_marker(n)) {
            contest.record_candidate(name);
        }
        contest
    }

    /// The number of rank positions (K-1): every column except the write-in text.
    pub fn rank_slots(&self) -> usize {
        self.columns.len().saturating_sub(1)
    }

    /// The columns that may hold a rank marker.
    pub fn rank_columns(&self) -> Range<usize> {
        self.columns.start..(self.columns.start + self.rank_slots())
    }

    /// The trailing free-text column, if the contest has any column at all.
    pub fn write_in_text_column(&self) -> Option<usize> {
        if self.columns.is_empty() {
            None
        } else {
            Some(self.columns.end - 1)
        }
    }

    /// Adds a name to the set of all the candidates of this contest.
    /// Returns true if the name was not seen before.
    pub fn record_candidate(&mut self, name: &str) -> bool {
        if self.all_candidates.iter().any(|n| n == name) {
            false
        } else {
            self.all_candidates.push(name.to_string());
            true
        }
    }

    /// All the distinct candidates seen so far: declared ones and write-ins.
    pub fn all_candidates(&self) -> &[String] {
        &self.all_candidates
    }
}

/// The content of one rank position after inversion.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum BallotChoice {
    /// A declared candidate.
    Candidate(String),
    /// A name typed in by the respondent in the write-in text column.
    WriteIn(String),
    /// No preference at this rank.
    Undervote,
}

impl BallotChoice {
    /// The text written in the output cell.
    pub fn as_str(&self) -> &str {
        match self {
            BallotChoice::Candidate(s) => s.as_str(),
            BallotChoice::WriteIn(s) => s.as_str(),
            BallotChoice::Undervote => UNDERVOTE,
        }
    }
}

/// The choices of one ballot for one contest, by rank position.
pub type ChoiceSequence = Vec<BallotChoice>;

/// One respondent, with a choice sequence for each contest (in contest order).
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Ballot {
    pub choices: Vec<ChoiceSequence>,
}

/// The result of reading a full export.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Conversion {
    pub contests: Vec<Contest>,
    pub ballots: Vec<Ballot>,
}

// ******** Output data structures *********

/// Constants written in the metadata columns of each cast vote record.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct EmitOptions {
    /// Written in the precinct column, usually the name of the source file.
    pub source_id: String,
    pub ballot_style: String,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Candidate {
    pub name: String,
    pub code: Option<String>,
    pub excluded: bool,
}

/// One row of the "Choice by Candidate" output.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CastVoteRecord {
    /// Sequence number, starting at 1.
    pub id: u64,
    pub precinct: String,
    pub ballot_style: String,
    pub choices: ChoiceSequence,
}

impl CastVoteRecord {
    pub fn to_row(&self) -> Vec<String> {
        let mut row = vec![
            self.id.to_string(),
            self.precinct.clone(),
            self.ballot_style.clone(),
        ];
        row.extend(self.choices.iter().map(|c| c.as_str().to_string()));
        row
    }
}

/// The cast vote records of a single contest.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CastVoteRecords {
    pub label: String,
    pub header: Vec<String>,
    pub records: Vec<CastVoteRecord>,
}

/// What the tabulator configuration of a contest needs to know.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ContestSummary {
    pub label: String,
    pub candidates: Vec<Candidate>,
}

/// Errors in the structure of the header rows. They stop the whole conversion.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum FormatError {
    /// The first row does not extend past the respondent metadata.
    MissingContestColumns { columns: usize },
    /// A column label has no contest tag before the `_` separator.
    MissingContestTag { column: usize },
    /// The row of candidate names does not cover all the contest columns.
    CandidateRowTooShort { expected: usize, found: usize },
    /// The input ended before both header rows were read.
    MissingHeaderRows,
}

impl Error for FormatError {}

impl Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatError::MissingContestColumns { columns } => write!(
                f,
                "the export does not have election information (only {} columns in the first row)",
                columns
            ),
            FormatError::MissingContestTag { column } => write!(
                f,
                "column {} of the first row does not start with a contest tag",
                column + 1
            ),
            FormatError::CandidateRowTooShort { expected, found } => write!(
                f,
                "the row of candidate names has {} columns, expected at least {}",
                found, expected
            ),
            FormatError::MissingHeaderRows => {
                write!(f, "the export is missing its two header rows")
            }
        }
    }
}
