//! A campaign is a YAML file describing a list of simulator runs,
//! each starting from a template input file with some parameters
//! changed. Executing it writes the inputs, builds the codes as
//! needed, runs them and collects their output.

mod parameters;
mod record;

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use log::info;
use log::warn;

pub use self::parameters::AthenaParameters;
pub use self::parameters::CodeKind;
pub use self::parameters::Fv2dParameters;
pub use self::parameters::RunDescription;
pub use self::parameters::Runs;
pub use self::record::read_records;
pub use self::record::RunRecord;
use self::parameters::value_to_parameter;
use self::record::append_record;
use crate::code::AthenaCode;
use crate::code::AthenaProblem;
use crate::code::BuildTools;
use crate::code::Fv2dCode;
use crate::code::RunOptions;
use crate::code::RunOutcome;
use crate::code::Simulator;
use crate::emit_build_information::emit_build_information;
use crate::error::Error;
use crate::error::IoResultExt;
use crate::error::Result;
use crate::ini::ParameterFile;
use crate::parameters::OutputParameters;
use crate::parameters::Override;
use crate::parameters::ParameterFileContents;

pub struct Campaign {
    base_dir: PathBuf,
    output: OutputParameters,
    fv2d: Option<Fv2dParameters>,
    athena: Option<AthenaParameters>,
    runs: Vec<RunDescription>,
    used_parameters: String,
    tools: BuildTools,
    work_dir: PathBuf,
}

/// Build state carried from one run to the next.
#[derive(Default)]
struct BuildState {
    fv2d_compiled: bool,
    athena_problem: Option<AthenaProblem>,
}

impl Campaign {
    pub fn from_file(path: &Path, overrides: Vec<Override>) -> Result<Self> {
        info!("Reading campaign file {:?}", path);
        let mut contents = ParameterFileContents::from_file(path)?;
        contents.with_overrides(overrides);
        let base_dir = path
            .parent()
            .map(|dir| dir.to_owned())
            .unwrap_or_default();
        Self::from_contents(contents, base_dir)
    }

    /// Extract all sections. Relative template and code paths are
    /// resolved against `base_dir`.
    pub fn from_contents(mut contents: ParameterFileContents, base_dir: PathBuf) -> Result<Self> {
        let output = contents.extract_parameter_struct::<OutputParameters>()?;
        let fv2d = contents.extract_optional_parameter_struct::<Fv2dParameters>()?;
        let athena = contents.extract_optional_parameter_struct::<AthenaParameters>()?;
        let runs = contents.extract_parameter_struct::<Runs>()?.0;
        for name in contents.get_section_names() {
            if !["output", "fv2d", "athena", "runs"].contains(&name.as_str()) {
                warn!("Ignoring unknown section {:?} in campaign file", name);
            }
        }
        let campaign = Self {
            base_dir,
            output,
            fv2d,
            athena,
            runs,
            used_parameters: contents.contents()?,
            tools: BuildTools::default(),
            work_dir: ".".into(),
        };
        campaign.validate()?;
        Ok(campaign)
    }

    pub fn with_tools(self, tools: BuildTools) -> Self {
        Self { tools, ..self }
    }

    /// The directory the simulators are started in.
    pub fn with_work_dir(self, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            ..self
        }
    }

    pub fn runs(&self) -> &[RunDescription] {
        &self.runs
    }

    pub fn output(&self) -> &OutputParameters {
        &self.output
    }

    /// Check everything that can be checked before running anything.
    pub fn validate(&self) -> Result<()> {
        let mut labels = HashSet::new();
        for run in self.runs.iter() {
            if run.label.is_empty() || run.label.contains(std::path::is_separator) {
                return Err(Error::Parameters(format!(
                    "invalid run label {:?}",
                    run.label
                )));
            }
            if !labels.insert(run.label.as_str()) {
                return Err(Error::Parameters(format!(
                    "duplicate run label {:?}",
                    run.label
                )));
            }
            let configured = match run.code {
                CodeKind::Fv2d => self.fv2d.is_some(),
                CodeKind::Athena => self.athena.is_some(),
            };
            if !configured {
                return Err(Error::Parameters(format!(
                    "run {:?} needs a {} section",
                    run.label,
                    run.code.section_name()
                )));
            }
            let template = self.resolve(&run.template);
            if !template.exists() {
                return Err(Error::FileNotFound(template));
            }
        }
        Ok(())
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_owned()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Run all runs in order. Returns the records of all runs, which
    /// are also appended to the record file one by one.
    pub fn execute(&self) -> Result<Vec<RunRecord>> {
        self.output.make_output_dirs()?;
        let used_parameters_file = self.output.used_parameters_file();
        fs::write(&used_parameters_file, &self.used_parameters).at_path(&used_parameters_file)?;
        emit_build_information(&self.output.output_dir)?;
        let mut state = BuildState::default();
        let mut records = vec![];
        for (num, run) in self.runs.iter().enumerate() {
            info!(
                "Run {}/{}: {} ({})",
                num + 1,
                self.runs.len(),
                run.label,
                run.code.section_name()
            );
            let input = self.write_input(run)?;
            let outcome = match run.code {
                CodeKind::Fv2d => self.run_fv2d(run, &input, &mut state)?,
                CodeKind::Athena => self.run_athena(run, &input, &mut state)?,
            };
            if !outcome.success {
                warn!("Run {} failed", run.label);
            }
            let record = RunRecord {
                label: run.label.clone(),
                code: run.code,
                input,
                success: outcome.success,
                relocated: outcome.relocated,
                finished: chrono::Local::now().to_rfc3339(),
            };
            append_record(&self.output.record_file(), &record)?;
            records.push(record);
        }
        Ok(records)
    }

    /// Write the input file of a run into the inputs directory.
    fn write_input(&self, run: &RunDescription) -> Result<PathBuf> {
        let dialect = run.code.dialect();
        let mut file = ParameterFile::open(self.resolve(&run.template), dialect)?;
        for (section, options) in run.parameters.iter() {
            for (option, value) in options.iter() {
                file.set_param(section, option, value_to_parameter(value)?)?;
            }
        }
        let path = self
            .output
            .inputs_dir()
            .join(format!("{}.{}", run.label, dialect.extension()));
        file.write(Some(&path))
    }

    fn run_options(&self, run: &RunDescription, default_destination: PathBuf) -> RunOptions {
        RunOptions {
            destination: Some(run.destination.clone().unwrap_or(default_destination)),
            work_dir: self.work_dir.clone(),
            ..Default::default()
        }
    }

    fn run_fv2d(&self, run: &RunDescription, input: &Path, state: &mut BuildState) -> Result<RunOutcome> {
        let parameters = self
            .fv2d
            .as_ref()
            .ok_or_else(|| Error::Parameters("missing fv2d section".into()))?;
        let code = Fv2dCode::new(self.resolve(&parameters.base_path)).with_tools(self.tools.clone());
        if parameters.compile && !state.fv2d_compiled {
            code.compile(&parameters.build_options())?;
            state.fv2d_compiled = true;
        }
        let options = RunOptions {
            out_name: parameters.out_name.clone(),
            ..self.run_options(run, self.output.output_dir.join(code.default_destination()))
        };
        code.run(input, &options)
    }

    fn run_athena(&self, run: &RunDescription, input: &Path, state: &mut BuildState) -> Result<RunOutcome> {
        let parameters = self
            .athena
            .as_ref()
            .ok_or_else(|| Error::Parameters("missing athena section".into()))?;
        let code = AthenaCode::new(self.resolve(&parameters.base_path))
            .with_tools(self.tools.clone())
            .with_output_extensions(parameters.outputs.clone());
        if parameters.compile {
            let input_file = ParameterFile::open(input, run.code.dialect())?;
            let build_options = parameters.build_options();
            let problem = code.problem(&input_file, &build_options)?;
            if state.athena_problem != Some(problem) {
                code.compile(&input_file, &build_options)?;
                state.athena_problem = Some(problem);
            } else {
                info!("Athena++ is already built for {}", problem.name());
            }
        }
        let destination = self
            .output
            .output_dir
            .join(code.default_destination())
            .join(&run.label);
        code.run(input, &self.run_options(run, destination))
    }
}
