use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::warn;
use percent_encoding::percent_decode_str;
use snafu::ResultExt;

use crate::convert::*;

/// The naming information carried by the name of an export file.
///
/// Qualtrics names its exports `<Survey>_<Month Day, Year>_<HH.MM>.csv`, with the
/// survey name URL-encoded.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ExportName {
    /// The decoded file name, without extension. All the outputs are named after it.
    pub base_name: String,
    pub contest_name: String,
    pub contest_date: Option<NaiveDate>,
    pub output_directory: PathBuf,
}

impl ExportName {
    pub fn from_path(path: &Path) -> ConvertResult<ExportName> {
        let output_directory = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => std::env::current_dir().context(MissingOutputDirSnafu {})?,
        };
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let base_name = simplify_file_name(&unquote_plus(&stem));
        let (contest_name, contest_date) = split_base_name(&base_name);
        Ok(ExportName {
            base_name,
            contest_name,
            contest_date,
            output_directory,
        })
    }

    /// `<base>_<label>`, the root of the output files of a contest.
    pub fn contest_file_name(&self, label: &str) -> String {
        format!("{}_{}", self.base_name, label)
    }

    pub fn records_path(&self, label: &str, extension: &str) -> PathBuf {
        self.output_directory
            .join(format!("{}.{}", self.contest_file_name(label), extension))
    }

    pub fn config_path(&self, label: &str) -> PathBuf {
        self.output_directory
            .join(format!("{}_cdf.json", self.contest_file_name(label)))
    }

    /// The date in ISO format, or an empty string.
    pub fn contest_date_iso(&self) -> String {
        self.contest_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}

/// Decodes an `application/x-www-form-urlencoded` string: `+` is a space and
/// `%XX` is a byte. Malformed escapes are kept as they are.
pub fn unquote_plus(s: &str) -> String {
    percent_decode_str(&s.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}

/// Removes the characters that cannot appear in a file name on this platform.
pub fn simplify_file_name(name: &str) -> String {
    let forbidden: &[char] = if cfg!(windows) {
        &['\\', '/', ':', '*', '"', '<', '>', '|', '.', '%', '$', '?', '^', '&', '£']
    } else if cfg!(target_os = "macos") {
        &['/', ':']
    } else {
        &['/']
    };
    name.chars().filter(|c| !forbidden.contains(c)).collect()
}

/// Splits `<Survey>_<Month Day, Year>_<time>` into the survey name and the date.
fn split_base_name(base_name: &str) -> (String, Option<NaiveDate>) {
    let parts: Vec<&str> = base_name.split('_').collect();
    match parts.as_slice() {
        [name, date, _time] => match NaiveDate::parse_from_str(date.trim(), "%B %d, %Y") {
            Ok(d) => (name.to_string(), Some(d)),
            Err(e) => {
                warn!(
                    "Cannot read the election date {:?} in the file name ({}), the contest date is left empty",
                    date, e
                );
                (name.to_string(), None)
            }
        },
        _ => {
            warn!(
                "The file name {:?} does not follow the pattern <Election>_<Month Day, Year>_<time>, the contest date is left empty",
                base_name
            );
            (base_name.to_string(), None)
        }
    }
}
