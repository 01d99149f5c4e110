use std::path::PathBuf;

use derive_custom::simdriver_parameters;
use linked_hash_map::LinkedHashMap;
use serde_yaml::Value;

use crate::code::AthenaBuildOptions;
use crate::code::Fv2dBuildOptions;
use crate::error::Error;
use crate::error::Result;
use crate::ini::Dialect;

/// Where fv2d lives and how to build it.
#[simdriver_parameters("fv2d")]
pub struct Fv2dParameters {
    /// The fv2d checkout. Relative paths are relative to the campaign file.
    pub base_path: PathBuf,
    /// Build fv2d once before the first fv2d run.
    #[serde(default)]
    pub compile: bool,
    #[serde(default = "default_true")]
    pub mhd: bool,
    #[serde(default = "default_true")]
    pub parallel: bool,
    #[serde(default)]
    pub clean: bool,
    /// Base name of the files fv2d writes.
    #[serde(default = "default_out_name")]
    pub out_name: String,
}

/// Where Athena++ lives and how to configure it.
#[simdriver_parameters("athena")]
pub struct AthenaParameters {
    /// The Athena++ checkout. Relative paths are relative to the campaign file.
    pub base_path: PathBuf,
    /// Configure and build Athena++ before a run whenever the problem
    /// generator differs from the previous build.
    #[serde(default)]
    pub compile: bool,
    #[serde(default = "default_true")]
    pub mhd: bool,
    #[serde(default = "default_python")]
    pub python: String,
    #[serde(default = "default_flux")]
    pub flux: String,
    /// Extensions of the output files collected after each run.
    #[serde(default = "default_outputs")]
    pub outputs: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_out_name() -> String {
    "run".into()
}

fn default_python() -> String {
    AthenaBuildOptions::default().python
}

fn default_flux() -> String {
    AthenaBuildOptions::default().flux
}

fn default_outputs() -> Vec<String> {
    vec!["tab".into()]
}

impl Fv2dParameters {
    pub fn build_options(&self) -> Fv2dBuildOptions {
        Fv2dBuildOptions {
            mhd: self.mhd,
            parallel: self.parallel,
            clean: self.clean,
        }
    }
}

impl AthenaParameters {
    pub fn build_options(&self) -> AthenaBuildOptions {
        AthenaBuildOptions {
            mhd: self.mhd,
            python: self.python.clone(),
            flux: self.flux.clone(),
            problem: None,
        }
    }
}

#[derive(Copy, PartialEq, Eq)]
#[simdriver_parameters]
pub enum CodeKind {
    Fv2d,
    Athena,
}

impl CodeKind {
    pub fn dialect(self) -> Dialect {
        match self {
            Self::Fv2d => Dialect::Standard,
            Self::Athena => Dialect::Athena,
        }
    }

    pub fn section_name(self) -> &'static str {
        match self {
            Self::Fv2d => "fv2d",
            Self::Athena => "athena",
        }
    }
}

/// One simulation of a campaign: a template input file, the
/// parameters to change in it and the code to run it with.
#[simdriver_parameters]
pub struct RunDescription {
    /// Names the generated input file and the run's output.
    pub label: String,
    pub code: CodeKind,
    /// The input file the run starts from. Relative paths are relative
    /// to the campaign file.
    pub template: PathBuf,
    /// New values, by section and option.
    #[serde(default)]
    pub parameters: LinkedHashMap<String, LinkedHashMap<String, Value>>,
    /// Where the output files end up, relative to the current directory.
    #[serde(default)]
    pub destination: Option<PathBuf>,
}

/// The text a campaign file value is written as in an input file.
pub fn value_to_parameter(value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(Error::Parameters(format!(
            "cannot write {other:?} as an input file parameter"
        ))),
    }
}

#[simdriver_parameters("runs")]
pub struct Runs(pub Vec<RunDescription>);

#[cfg(test)]
mod tests {
    use serde_yaml::Value;

    use super::value_to_parameter;
    use super::CodeKind;
    use super::Fv2dParameters;
    use super::RunDescription;

    #[test]
    fn parse_run_description() {
        let run: RunDescription = serde_yaml::from_str(
            "label: brio_wu
code: athena
template: athinput.bw
parameters:
  mesh:
    nx1: 256
  time:
    tlim: 0.2",
        )
        .unwrap();
        assert_eq!(run.code, CodeKind::Athena);
        assert_eq!(run.parameters["mesh"]["nx1"].as_u64(), Some(256));
        assert_eq!(
            run.parameters.keys().collect::<Vec<_>>(),
            vec!["mesh", "time"]
        );
        assert!(run.destination.is_none());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(serde_yaml::from_str::<RunDescription>(
            "label: a\ncode: fv2d\ntemplate: a.ini\ntemplates: b.ini"
        )
        .is_err());
        assert!(serde_yaml::from_str::<RunDescription>(
            "label: a\ncode: arepo\ntemplate: a.ini"
        )
        .is_err());
    }

    #[test]
    fn fv2d_defaults() {
        let parameters: Fv2dParameters = serde_yaml::from_str("base_path: fv2d").unwrap();
        assert!(!parameters.compile);
        assert_eq!(parameters.out_name, "run");
        let options = parameters.build_options();
        assert!(options.mhd && options.parallel && !options.clean);
    }

    #[test]
    fn parameter_values() {
        assert_eq!(value_to_parameter(&Value::from(0.25)).unwrap(), "0.25");
        assert_eq!(value_to_parameter(&Value::from(64)).unwrap(), "64");
        assert_eq!(value_to_parameter(&Value::from(false)).unwrap(), "false");
        assert_eq!(value_to_parameter(&Value::from("hlld")).unwrap(), "hlld");
        assert!(value_to_parameter(&Value::Sequence(vec![])).is_err());
    }
}
