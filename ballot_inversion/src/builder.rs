use log::{debug, info};

use crate::*;

/// What a row turned out to be.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum RowKind {
    /// The first row, with the `<Contest>_<N>` column labels.
    Labels,
    /// The second row, with the candidate names.
    Candidates,
    /// An import metadata row, skipped.
    Metadata,
    /// A respondent. The number is the sequence number of the ballot, starting at 1.
    Ballot(u64),
}

/// Converts an export by feeding it one row at a time.
///
/// ```
/// use ballot_inversion::builder::Builder;
/// use ballot_inversion::{FormatError, InversionRules};
///
/// let row = |cells: &[&str]| -> Vec<String> {
///     let mut r: Vec<String> = (0..10).map(|i| format!("m{}", i)).collect();
///     r.extend(cells.iter().map(|s| s.to_string()));
///     r
/// };
///
/// let mut builder = Builder::new(&InversionRules::default());
/// builder.add_row(&row(&["Q1_1", "Q1_2", "Q1_3"]))?;
/// builder.add_row(&row(&["Q1 - Anna", "Q1 - Bob", "Q1 - Text"]))?;
/// builder.add_row(&row(&["2", "1", ""]))?;
/// let conversion = builder.finish()?;
///
/// assert_eq!(conversion.ballots[0].choices[0][0].as_str(), "Bob");
/// # Ok::<(), FormatError>(())
/// ```
pub struct Builder {
    pub(crate) _rules: InversionRules,
    pub(crate) _labels: Option<Vec<String>>,
    pub(crate) _contests: Option<Vec<Contest>>,
    pub(crate) _ballots: Vec<Ballot>,
}

impl Builder {
    pub fn new(rules: &InversionRules) -> Builder {
        Builder {
            _rules: rules.clone(),
            _labels: None,
            _contests: None,
            _ballots: Vec::new(),
        }
    }

    /// Adds the next row of the export.
    ///
    /// The first two rows are the headers. A malformed header is reported
    /// immediately; data rows never fail.
    pub fn add_row(&mut self, row: &[String]) -> Result<RowKind, FormatError> {
        if let Some(contests) = self._contests.as_mut() {
            if is_metadata_row(row) {
                debug!("add_row: skipping metadata row {:?}", row.first());
                return Ok(RowKind::Metadata);
            }
            let ballot = invert_ballot(row, contests, &self._rules);
            debug!("add_row: ballot {}: {:?}", self._ballots.len() + 1, ballot);
            self._ballots.push(ballot);
            return Ok(RowKind::Ballot(self._ballots.len() as u64));
        }

        match self._labels.as_ref() {
            None => {
                // Fail early, before reading the candidates.
                contest_boundaries(row, &self._rules)?;
                self._labels = Some(row.to_vec());
                Ok(RowKind::Labels)
            }
            Some(labels) => {
                let contests = parse_header(labels, row, &self._rules)?;
                self._contests = Some(contests);
                Ok(RowKind::Candidates)
            }
        }
    }

    /// The number of ballots read so far.
    pub fn num_ballots(&self) -> usize {
        self._ballots.len()
    }

    pub fn finish(self) -> Result<Conversion, FormatError> {
        match self._contests {
            Some(contests) => {
                info!(
                    "Read {} ballots for {} contests",
                    self._ballots.len(),
                    contests.len()
                );
                Ok(Conversion {
                    contests,
                    ballots: self._ballots,
                })
            }
            None => Err(FormatError::MissingHeaderRows),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        let mut r: Vec<String> = (0..10).map(|i| format!("m{}", i)).collect();
        r.extend(cells.iter().map(|s| s.to_string()));
        r
    }

    #[test]
    fn rows_are_classified() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut builder = Builder::new(&InversionRules::default());
        assert_eq!(
            builder.add_row(&row(&["Q1_1", "Q1_2", "Q1_3"])),
            Ok(RowKind::Labels)
        );
        assert_eq!(
            builder.add_row(&row(&["Q - A", "Q - Write-In", "Q - Write-In - Text"])),
            Ok(RowKind::Candidates)
        );
        let mut import = row(&["", "", ""]);
        import[0] = "{\"ImportId\":\"startDate\"}".to_string();
        assert_eq!(builder.add_row(&import), Ok(RowKind::Metadata));
        assert_eq!(builder.add_row(&row(&["1", "2", "Zoe"])), Ok(RowKind::Ballot(1)));
        assert_eq!(builder.add_row(&import), Ok(RowKind::Metadata));
        assert_eq!(builder.add_row(&row(&["2", "1", " "])), Ok(RowKind::Ballot(2)));
        assert_eq!(builder.num_ballots(), 2);

        let conversion = builder.finish().unwrap();
        assert_eq!(conversion.ballots.len(), 2);
        let first: Vec<&str> = conversion.ballots[0].choices[0]
            .iter()
            .map(|c| c.as_str())
            .collect();
        assert_eq!(first, vec!["A", "Zoe"]);
        let second: Vec<&str> = conversion.ballots[1].choices[0]
            .iter()
            .map(|c| c.as_str())
            .collect();
        assert_eq!(second, vec!["undervote", "A"]);
        assert_eq!(
            conversion.contests[0].all_candidates(),
            &["A".to_string(), "Zoe".to_string()]
        );
    }

    #[test]
    fn bad_labels_fail_on_first_row() {
        let mut builder = Builder::new(&InversionRules::default());
        let labels: Vec<String> = (0..10).map(|i| format!("m{}", i)).collect();
        assert_eq!(
            builder.add_row(&labels),
            Err(FormatError::MissingContestColumns { columns: 10 })
        );
    }

    #[test]
    fn missing_candidate_row() {
        let mut builder = Builder::new(&InversionRules::default());
        builder.add_row(&row(&["Q1_1", "Q1_2"])).unwrap();
        assert_eq!(builder.finish(), Err(FormatError::MissingHeaderRows));
    }

    #[test]
    fn no_ballots() {
        let mut builder = Builder::new(&InversionRules::default());
        builder.add_row(&row(&["Q1_1", "Q1_2"])).unwrap();
        builder.add_row(&row(&["Q - A", "Q - Text"])).unwrap();
        let conversion = builder.finish().unwrap();
        assert!(conversion.ballots.is_empty());
        assert_eq!(conversion.contests.len(), 1);
    }
}
