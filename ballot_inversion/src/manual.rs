/*!

This is the long-form manual for `ballot_inversion` and `qualtrics2ess`.

## Input format

Survey tools such as Qualtrics export ranked questions in the "Candidate by Choice"
layout: one column per candidate, and in each cell the rank that the respondent gave
to that candidate.

| row | content |
|-----|---------|
| 1   | column labels. The first 10 columns describe the respondent. The others are labeled `<Contest>_<N>`, for example `Q1_1`, `Q1_2`, `Q2_1`. |
| 2   | display names, for example `Who should be president? - Alice`. The candidate is the text after the last ` - `. |
| 3   | (optional) import metadata, starting with `{`. Such rows are skipped wherever they appear. |
| 4.. | one respondent per row. |

Consecutive columns with the same contest tag form one contest. The last column of each
contest is the free-text column of the write-in option: it is never read as a rank.

A candidate named `Write-In` marks the write-in option. When a respondent ranks it, the
content of the free-text column (without surrounding whitespace) is used as the name of
the candidate. An empty free-text column is an undervote.

Any rank that cannot be found (blank cells, `-99`, numbers out of range, text) becomes an
`undervote`. Overvotes are not checked: the survey tool is expected to prevent them. If the
same rank appears twice in a contest, the leftmost column is used.

## Output format

Every contest is written separately, in the "Choice by Candidate" layout of the ES&S
cast vote records:

```text
Cast Vote Record,Precinct,Ballot Style,Q1 Choice 1,Q1 Choice 2,Q1 Choice 3
1,"Election 2021_April 5, 2021_01.40",Qualtrics,Alice,Jane Doe,undervote
2,"Election 2021_April 5, 2021_01.40",Qualtrics,Bob,undervote,undervote
```

The records are numbered from 1, in the order of the respondents.

Next to it, a configuration file for the RCV Universal Tabulator (`_cdf.json`) lists
all the candidates of the contest, including the write-ins that were found. The
tabulation rules are filled with defaults and must be completed by hand in the
tabulator before running the election.

## Command line

```bash
qualtrics2ess 'Election+2021_April 5, 2021_01.40.csv'
```

The name of the export is expected to be `<Election>_<Month Day, Year>_<time>`, as
produced by Qualtrics. The date is used in the configuration files. The output files are
written next to the input file:

* `Election 2021_April 5, 2021_01.40_Q1.xlsx` (or `.csv` when the workbook writer is not available)
* `Election 2021_April 5, 2021_01.40_Q1_cdf.json`

Options:

* `--output-type csv|xlsx`: the format of the cast vote records (default `xlsx`).
* `--verbose`: print debugging information.

*/
