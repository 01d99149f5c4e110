mod athena;
mod fv2d;
mod problems;

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use log::info;

pub use self::athena::AthenaBuildOptions;
pub use self::athena::AthenaCode;
pub use self::fv2d::Fv2dBuildOptions;
pub use self::fv2d::Fv2dCode;
pub use self::problems::AthenaProblem;
use crate::error::Error;
use crate::error::IoResultExt;
use crate::error::Result;
use crate::named::Named;

/// How a simulator run is set up and where its output ends up.
#[derive(Clone, Debug)]
pub struct RunOptions {
    /// Directory the output files are moved to. Uses the
    /// simulator's default if not given.
    pub destination: Option<PathBuf>,
    /// Base name of the output files written by fv2d.
    pub out_name: String,
    /// Directory the simulator is started in and writes its output to.
    pub work_dir: PathBuf,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            destination: None,
            out_name: "run".into(),
            work_dir: ".".into(),
        }
    }
}

#[derive(Debug)]
pub struct RunOutcome {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    /// Final location of every relocated output file.
    pub relocated: Vec<PathBuf>,
}

/// Build tools used to compile the simulators. Found on the `PATH`
/// unless given as paths.
#[derive(Clone, Debug)]
pub struct BuildTools {
    pub cmake: PathBuf,
    pub make: PathBuf,
}

impl Default for BuildTools {
    fn default() -> Self {
        Self {
            cmake: "cmake".into(),
            make: "make".into(),
        }
    }
}

pub trait Simulator: Named {
    /// The directory outputs are moved to if the run options do not name one.
    fn default_destination(&self) -> PathBuf {
        format!("{}_output", Self::name()).into()
    }

    /// Run the simulator on the given input file and move its
    /// output into the destination directory.
    fn run(&self, input: &Path, options: &RunOptions) -> Result<RunOutcome>;
}

fn existing_file(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_owned()));
    }
    fs::canonicalize(path).at_path(path)
}

fn make_destination_dir(destination: &Path) -> Result<()> {
    fs::create_dir_all(destination).at_path(destination)
}

/// Move a file, copying it if a rename is not possible, for example
/// across file systems.
pub fn relocate(source: &Path, destination: &Path) -> Result<PathBuf> {
    if !source.exists() {
        return Err(Error::FileNotFound(source.to_owned()));
    }
    info!("Moving {:?} -> {:?}", source, destination);
    if fs::rename(source, destination).is_err() {
        fs::copy(source, destination).at_path(destination)?;
        fs::remove_file(source).at_path(source)?;
    }
    Ok(destination.to_owned())
}

fn file_stem(path: &Path) -> Result<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .ok_or_else(|| Error::FileNotFound(path.to_owned()))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::relocate;
    use crate::error::Error;

    #[test]
    fn relocate_moves_file() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("run.h5");
        fs::write(&source, "data").unwrap();
        let destination = dir.path().join("run_setup.h5");
        relocate(&source, &destination).unwrap();
        assert!(!source.exists());
        assert_eq!(fs::read_to_string(destination).unwrap(), "data");
    }

    #[test]
    fn relocate_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            relocate(&dir.path().join("run.h5"), &dir.path().join("x.h5")),
            Err(Error::FileNotFound(_))
        ));
    }
}
