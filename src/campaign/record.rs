use std::fs;
use std::fs::OpenOptions;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use super::parameters::CodeKind;
use crate::error::IoResultExt;
use crate::error::Result;

/// What happened in one run of a campaign. Appended to the record
/// file after every run, so the file also documents interrupted
/// campaigns.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunRecord {
    pub label: String,
    pub code: CodeKind,
    pub input: PathBuf,
    pub success: bool,
    pub relocated: Vec<PathBuf>,
    /// RFC 3339 timestamp of the end of the run.
    pub finished: String,
}

pub fn append_record(path: &Path, record: &RunRecord) -> Result<()> {
    let f = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .at_path(path)?;
    serde_yaml::to_writer(&f, &[record])?;
    Ok(())
}

pub fn read_records(path: &Path) -> Result<Vec<RunRecord>> {
    let contents = fs::read_to_string(path).at_path(path)?;
    if contents.trim().is_empty() {
        return Ok(vec![]);
    }
    Ok(serde_yaml::from_str(&contents)?)
}
