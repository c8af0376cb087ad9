mod config;
use log::{debug, info};

use std::collections::HashMap;

pub mod builder;
pub mod manual;

pub use crate::config::*;

/// Receives the assembled output of each contest.
///
/// Implementations decide where the cast vote records and the configuration go
/// (files, workbooks, memory for tests, ...).
pub trait ContestSink {
    type Error;

    fn write_summary(&mut self, summary: &ContestSummary) -> Result<(), Self::Error>;

    fn write_records(&mut self, records: &CastVoteRecords) -> Result<(), Self::Error>;
}

// **** Header parser ****

/// The tag of a column label: `Q1_3` -> `Q1`.
fn contest_tag(label: &str) -> &str {
    label.split('_').next().unwrap_or("")
}

/// Extracts the candidate from a display name: `Q1 - Rank - Alice` -> `Alice`.
pub fn candidate_name(display_name: &str) -> &str {
    display_name.rsplit(" - ").next().unwrap_or(display_name)
}

/// Splits the first row into contests.
///
/// Returns the labels of the contests and the boundary indices. The boundaries
/// start at the first column after the metadata and always end with the length
/// of the row, so that contest `i` spans `boundaries[i]..boundaries[i+1]`.
pub fn contest_boundaries(
    labels: &[String],
    rules: &InversionRules,
) -> Result<(Vec<String>, Vec<usize>), FormatError> {
    let start = rules.metadata_columns;
    if labels.len() <= start {
        return Err(FormatError::MissingContestColumns {
            columns: labels.len(),
        });
    }
    let mut tags: Vec<String> = Vec::new();
    let mut boundaries: Vec<usize> = Vec::new();
    for (idx, label) in labels.iter().enumerate().skip(start) {
        let tag = contest_tag(label);
        if tag.is_empty() {
            return Err(FormatError::MissingContestTag { column: idx });
        }
        if tags.last().map(|t| t.as_str()) != Some(tag) {
            tags.push(tag.to_string());
            boundaries.push(idx);
        }
    }
    boundaries.push(labels.len());
    debug!("contest_boundaries: tags: {:?} boundaries: {:?}", tags, boundaries);
    Ok((tags, boundaries))
}

/// Reads the two header rows of the export into the list of contests.
///
/// Candidates keep the column order, duplicates included.
pub fn parse_header(
    labels: &[String],
    names: &[String],
    rules: &InversionRules,
) -> Result<Vec<Contest>, FormatError> {
    let (tags, boundaries) = contest_boundaries(labels, rules)?;
    if names.len() < labels.len() {
        return Err(FormatError::CandidateRowTooShort {
            expected: labels.len(),
            found: names.len(),
        });
    }
    let contests: Vec<Contest> = tags
        .into_iter()
        .zip(boundaries.windows(2))
        .map(|(tag, bounds)| {
            let columns = bounds[0]..bounds[1];
            let candidates: Vec<String> = names[columns.clone()]
                .iter()
                .map(|n| candidate_name(n).to_string())
                .collect();
            Contest::new(tag, columns, candidates, rules)
        })
        .collect();
    for c in contests.iter() {
        info!(
            "Contest {}: columns {:?}, {} ranks, candidates: {:?}",
            c.label,
            c.columns,
            c.rank_slots(),
            c.candidates
        );
    }
    Ok(contests)
}

// **** Ballot inverter ****

/// Rows starting with `{` carry import metadata and are not ballots.
pub fn is_metadata_row(row: &[String]) -> bool {
    row.first().map(|c| c.starts_with('{')).unwrap_or(false)
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(|s| s.as_str()).unwrap_or("")
}

/// Turns the rank given to each candidate into the candidate given at each rank.
///
/// Write-ins typed in the text column are added to the candidates of the contest.
/// Anything that cannot be resolved becomes an undervote.
pub fn invert_contest(
    row: &[String],
    contest: &mut Contest,
    rules: &InversionRules,
) -> ChoiceSequence {
    // Rank marker -> position in the contest. The first column wins.
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for (pos, col) in contest.rank_columns().enumerate() {
        let marker = cell(row, col);
        if marker.is_empty() {
            continue;
        }
        if let Some(prev) = positions.get(marker) {
            debug!(
                "invert_contest: contest {}: rank {:?} found at positions {} and {}, keeping {}",
                contest.label, marker, prev, pos, prev
            );
        } else {
            positions.insert(marker, pos);
        }
    }

    let mut choices: ChoiceSequence = Vec::with_capacity(contest.rank_slots());
    for rank in 1..=contest.rank_slots() {
        let choice = match positions.get(rank.to_string().as_str()) {
            None => BallotChoice::Undervote,
            Some(pos) if contest.candidates[*pos] == rules.write_in_label => {
                let text = contest
                    .write_in_text_column()
                    .map(|col| cell(row, col).trim())
                    .unwrap_or("");
                if text.is_empty() {
                    BallotChoice::Undervote
                } else {
                    if contest.record_candidate(text) {
                        debug!(
                            "invert_contest: contest {}: new write-in {:?}",
                            contest.label, text
                        );
                    }
                    BallotChoice::WriteIn(text.to_string())
                }
            }
            Some(pos) => BallotChoice::Candidate(contest.candidates[*pos].clone()),
        };
        choices.push(choice);
    }
    choices
}

/// Inverts every contest of a data row.
pub fn invert_ballot(row: &[String], contests: &mut [Contest], rules: &InversionRules) -> Ballot {
    Ballot {
        choices: contests
            .iter_mut()
            .map(|c| invert_contest(row, c, rules))
            .collect(),
    }
}

// **** Contest emitter ****

/// The header of the cast vote records of a contest.
pub fn records_header(contest: &Contest) -> Vec<String> {
    let mut header: Vec<String> = vec![
        "Cast Vote Record".to_string(),
        "Precinct".to_string(),
        "Ballot Style".to_string(),
    ];
    for n in 1..=contest.rank_slots() {
        header.push(format!("{} Choice {}", contest.label, n));
    }
    header
}

/// Builds the output of the contest at position `contest_idx`.
pub fn assemble_contest(
    conversion: &Conversion,
    contest_idx: usize,
    options: &EmitOptions,
) -> (ContestSummary, CastVoteRecords) {
    let contest = &conversion.contests[contest_idx];
    let summary = ContestSummary {
        label: contest.label.clone(),
        candidates: contest
            .all_candidates()
            .iter()
            .map(|name| Candidate {
                name: name.clone(),
                code: None,
                excluded: false,
            })
            .collect(),
    };
    let records: Vec<CastVoteRecord> = conversion
        .ballots
        .iter()
        .enumerate()
        .map(|(idx, b)| CastVoteRecord {
            id: (idx + 1) as u64,
            precinct: options.source_id.clone(),
            ballot_style: options.ballot_style.clone(),
            choices: b.choices.get(contest_idx).cloned().unwrap_or_default(),
        })
        .collect();
    let cvrs = CastVoteRecords {
        label: contest.label.clone(),
        header: records_header(contest),
        records,
    };
    (summary, cvrs)
}

/// Hands every contest to the sink, in the order of the header.
///
/// Returns the number of contests written.
pub fn emit_contests<S: ContestSink>(
    conversion: &Conversion,
    options: &EmitOptions,
    sink: &mut S,
) -> Result<usize, S::Error> {
    info!(
        "Emitting {} contests for {} ballots",
        conversion.contests.len(),
        conversion.ballots.len()
    );
    for idx in 0..conversion.contests.len() {
        let (summary, records) = assemble_contest(conversion, idx, options);
        sink.write_summary(&summary)?;
        sink.write_records(&records)?;
    }
    Ok(conversion.contests.len())
}
