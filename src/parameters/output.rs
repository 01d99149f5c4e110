use std::fs;
use std::path::Path;
use std::path::PathBuf;

use derive_custom::simdriver_parameters;
use log::info;
use log::warn;

use crate::error::Error;
use crate::error::IoResultExt;
use crate::error::Result;

/// How to handle the case of an already existing output directory.
#[derive(Default, PartialEq, Eq)]
#[simdriver_parameters]
pub enum HandleExistingOutput {
    /// Stop before running anything.
    Fail,
    /// Overwrite already existing files if the names match. Results of
    /// earlier campaigns that are not overwritten stay in place and
    /// the run record is appended to.
    #[default]
    Overwrite,
    /// Delete the existing output folder. This will erase all
    /// data of the previous campaign.
    Delete,
}

/// Where the results of a campaign are written.
#[simdriver_parameters("output")]
pub struct OutputParameters {
    /// The directory to which the output is written.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// The name of the sub-directory of the output directory
    /// to which the generated input files are written.
    #[serde(default = "default_inputs_dir")]
    pub inputs_dir: PathBuf,
    /// The name of the file which contains a copy of parameters used
    /// in the campaign.
    #[serde(default = "default_used_parameters_filename")]
    pub used_parameters_filename: String,
    /// The name of the file every finished run is appended to.
    #[serde(default = "default_record_filename")]
    pub record_filename: String,
    /// What to do when the output folder already exists.
    #[serde(default)]
    pub handle_existing_output: HandleExistingOutput,
}

fn default_output_dir() -> PathBuf {
    "results".into()
}

fn default_inputs_dir() -> PathBuf {
    "inputs".into()
}

fn default_used_parameters_filename() -> String {
    "parameters.yml".into()
}

fn default_record_filename() -> String {
    "runs.yml".into()
}

impl Default for OutputParameters {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            inputs_dir: default_inputs_dir(),
            used_parameters_filename: default_used_parameters_filename(),
            record_filename: default_record_filename(),
            handle_existing_output: HandleExistingOutput::default(),
        }
    }
}

impl OutputParameters {
    pub fn inputs_dir(&self) -> PathBuf {
        self.output_dir.join(&self.inputs_dir)
    }

    pub fn used_parameters_file(&self) -> PathBuf {
        self.output_dir.join(&self.used_parameters_filename)
    }

    pub fn record_file(&self) -> PathBuf {
        self.output_dir.join(&self.record_filename)
    }

    /// Default destination of the output files of the run with the given label.
    pub fn run_dir(&self, label: &str) -> PathBuf {
        self.output_dir.join(label)
    }

    /// Create the output directories, dealing with a previous
    /// output directory as configured.
    pub fn make_output_dirs(&self) -> Result<()> {
        let output_dir = &self.output_dir;
        if output_dir.exists() {
            match self.handle_existing_output {
                HandleExistingOutput::Fail => {
                    return Err(Error::OutputExists(output_dir.clone()));
                }
                HandleExistingOutput::Overwrite => {
                    warn!("Output directory {:?} exists, overwriting", output_dir);
                }
                HandleExistingOutput::Delete => {
                    info!("Deleting previous output directory {:?}", output_dir);
                    remove_dir(output_dir)?;
                }
            }
        }
        let inputs_dir = self.inputs_dir();
        fs::create_dir_all(&inputs_dir).at_path(&inputs_dir)
    }
}

fn remove_dir(dir: &Path) -> Result<()> {
    fs::remove_dir_all(dir).at_path(dir)
}
