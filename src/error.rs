use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("file {0:?} does not exist")]
    FileNotFound(PathBuf),
    #[error("i/o error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: {message}")]
    Ini { line: usize, message: String },
    #[error("no section: {0:?}")]
    NoSection(String),
    #[error("no option {option:?} in section {section:?}")]
    NoOption { section: String, option: String },
    #[error("section {0:?} already exists")]
    DuplicateSection(String),
    #[error("option {option:?} in section {section:?} already exists")]
    DuplicateOption { section: String, option: String },
    #[error("{0:?} is not an Athena input file")]
    NotAthenaFormat(PathBuf),
    #[error("problem {problem:?} is not one of the known problems {known:?}")]
    UnknownProblem { problem: String, known: Vec<String> },
    #[error("failed to start {program}: {source}")]
    CommandSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error(transparent)]
    Hdf5(#[from] hdf5::Error),
    #[error("dataset {name:?} missing in {file:?}")]
    MissingDataset { file: PathBuf, name: String },
    #[error("no iteration {iteration} in {file:?}")]
    MissingIteration { file: PathBuf, iteration: usize },
    #[error("{path:?}, line {line}: {message}")]
    Tabular {
        path: PathBuf,
        line: usize,
        message: String,
    },
    #[error("unexpected array shape: {0}")]
    Shape(String),
    #[error("invalid parameters: {0}")]
    Parameters(String),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error("output directory {0:?} already exists")]
    OutputExists(PathBuf),
}

pub type Result<T> = std::result::Result<T, Error>;

pub(crate) trait IoResultExt<T> {
    fn at_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn at_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| Error::Io {
            path: path.into(),
            source,
        })
    }
}
