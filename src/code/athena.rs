use std::fs;
use std::path::Path;
use std::path::PathBuf;

use derive_custom::simdriver_parameters;
use log::info;
use log::warn;

use super::existing_file;
use super::file_stem;
use super::make_destination_dir;
use super::relocate;
use super::AthenaProblem;
use super::BuildTools;
use super::RunOptions;
use super::RunOutcome;
use super::Simulator;
use crate::error::IoResultExt;
use crate::error::Result;
use crate::ini::ParameterFile;
use crate::named::Named;
use crate::process::Invocation;

/// Options for configuring and building Athena++.
#[simdriver_parameters]
pub struct AthenaBuildOptions {
    /// Configure with magnetic fields (`-b`).
    #[serde(default = "default_true")]
    pub mhd: bool,
    /// The python interpreter running `configure.py`. On MacOS and some
    /// Linux distributions this has to be `python3` rather than `python`.
    #[serde(default = "default_python")]
    pub python: String,
    /// The Riemann solver.
    #[serde(default = "default_flux")]
    pub flux: String,
    /// Build for this problem (name or label) instead of the one
    /// given in the input file.
    #[serde(default)]
    pub problem: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_python() -> String {
    "python3".into()
}

fn default_flux() -> String {
    "hlld".into()
}

impl Default for AthenaBuildOptions {
    fn default() -> Self {
        Self {
            mhd: true,
            python: default_python(),
            flux: default_flux(),
            problem: None,
        }
    }
}

/// A checkout of Athena++. Athena has to be reconfigured and rebuilt
/// for every problem generator, the executable is `<base>/bin/athena`.
#[derive(Named, Clone, Debug)]
#[name = "athena"]
pub struct AthenaCode {
    base_path: PathBuf,
    tools: BuildTools,
    output_extensions: Vec<String>,
}

impl AthenaCode {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            tools: BuildTools::default(),
            output_extensions: vec!["tab".into()],
        }
    }

    pub fn with_tools(self, tools: BuildTools) -> Self {
        Self { tools, ..self }
    }

    /// Which output files (by extension) are collected after a run.
    pub fn with_output_extensions(self, output_extensions: Vec<String>) -> Self {
        Self {
            output_extensions,
            ..self
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn executable(&self) -> PathBuf {
        self.base_path.join("bin").join("athena")
    }

    /// The problem generator that `compile` would build for.
    pub fn problem(&self, input: &ParameterFile, options: &AthenaBuildOptions) -> Result<AthenaProblem> {
        match options.problem {
            Some(ref problem) => AthenaProblem::lookup(problem),
            None => AthenaProblem::from_input(input),
        }
    }

    pub fn compile(&self, input: &ParameterFile, options: &AthenaBuildOptions) -> Result<AthenaProblem> {
        let problem = self.problem(input, options)?;
        info!("Configuring Athena++ for problem {}", problem.name());
        Invocation::new(&options.python)
            .arg("configure.py")
            .args(["--prob", problem.name(), "--flux", &options.flux])
            .arg_if(options.mhd, "-b")
            .current_dir(&self.base_path)
            .checked()?;
        self.make().arg("clean").checked()?;
        self.make().arg("-j").checked()?;
        Ok(problem)
    }

    fn make(&self) -> Invocation {
        Invocation::new(&self.tools.make).current_dir(&self.base_path)
    }

    fn output_files(&self, work_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = vec![];
        for entry in fs::read_dir(work_dir).at_path(work_dir)? {
            let path = entry.at_path(work_dir)?.path();
            let matches = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| self.output_extensions.iter().any(|wanted| wanted == ext))
                .unwrap_or(false);
            if matches && path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

impl Simulator for AthenaCode {
    fn run(&self, input: &Path, options: &RunOptions) -> Result<RunOutcome> {
        let input = existing_file(input)?;
        let executable = existing_file(&self.executable())?;
        let output = Invocation::new(executable)
            .arg0(&self.base_path)
            .arg("-i")
            .arg(&input)
            .current_dir(&options.work_dir)
            .output()?;
        let destination = options
            .destination
            .clone()
            .unwrap_or_else(|| self.default_destination());
        make_destination_dir(&destination)?;
        let files = self.output_files(&options.work_dir)?;
        if files.is_empty() {
            warn!("Athena++ run on {:?} did not leave any output files", input);
        }
        let relocated = files
            .iter()
            .map(|file| {
                let extension = file
                    .extension()
                    .map(|ext| ext.to_string_lossy().into_owned())
                    .unwrap_or_default();
                relocate(
                    file,
                    &destination.join(format!("{}.{}", file_stem(file)?, extension)),
                )
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(RunOutcome {
            success: output.success(),
            stdout: output.stdout,
            stderr: output.stderr,
            relocated,
        })
    }
}
