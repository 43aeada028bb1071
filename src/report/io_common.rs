use std::collections::HashSet;
use std::path::{Path, PathBuf};

use survey_report::CellValue;

/// The spellings of a missing value in spreadsheet exports.
pub const DEFAULT_NULL_MARKERS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct NullMarkers(HashSet<String>);

impl NullMarkers {
    pub fn new(markers: &[String]) -> NullMarkers {
        NullMarkers(markers.iter().cloned().collect())
    }

    pub fn is_null(&self, s: &str) -> bool {
        self.0.contains(s)
    }

    /// A text cell, or an empty cell if the text is a null marker.
    pub fn cell(&self, s: &str) -> CellValue {
        if self.is_null(s) {
            CellValue::Empty
        } else {
            CellValue::Text(s.to_string())
        }
    }
}

impl Default for NullMarkers {
    fn default() -> Self {
        NullMarkers(DEFAULT_NULL_MARKERS.iter().map(|s| s.to_string()).collect())
    }
}

/// Header names as exported by spreadsheet tools may carry a byte order mark
/// or stray spaces.
pub fn clean_header(name: &str) -> String {
    name.trim_start_matches('\u{feff}').trim().to_string()
}

/// Resolves a path from the configuration against the directory of the
/// configuration file.
pub fn relative_to(root: Option<&Path>, path: &str) -> String {
    match root {
        Some(r) if Path::new(path).is_relative() => {
            let p: PathBuf = [r, Path::new(path)].iter().collect();
            p.as_path().display().to_string()
        }
        _ => path.to_string(),
    }
}

/// The destination of the document: either an explicit `.pdf` path or a
/// directory in which the derived file name is placed.
pub fn output_path(out: Option<&str>, file_name: &str) -> PathBuf {
    match out {
        Some(o) if o.to_lowercase().ends_with(".pdf") => PathBuf::from(o),
        Some(o) => [o, file_name].iter().collect(),
        None => PathBuf::from(file_name),
    }
}
