use std::path::Path;
use std::path::PathBuf;

use derive_custom::simdriver_parameters;
use log::warn;

use super::existing_file;
use super::file_stem;
use super::make_destination_dir;
use super::relocate;
use super::BuildTools;
use super::RunOptions;
use super::RunOutcome;
use super::Simulator;
use crate::error::IoResultExt;
use crate::error::Result;
use crate::named::Named;
use crate::process::Invocation;

/// Extensions of the files fv2d writes for every run.
const OUTPUT_EXTENSIONS: [&str; 2] = ["h5", "xdmf"];

/// Options passed to the cmake/make build of fv2d.
#[simdriver_parameters]
pub struct Fv2dBuildOptions {
    /// Build the MHD version of the code.
    #[serde(default = "default_true")]
    pub mhd: bool,
    /// Run make with `-j`.
    #[serde(default = "default_true")]
    pub parallel: bool,
    /// Run `make clean` before building.
    #[serde(default)]
    pub clean: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Fv2dBuildOptions {
    fn default() -> Self {
        Self {
            mhd: true,
            parallel: true,
            clean: false,
        }
    }
}

/// A checkout of the fv2d code. The code is built in `<base>/build`
/// and the executable ends up in `<base>/build/fv2d`.
#[derive(Named, Clone, Debug)]
#[name = "fv2d"]
pub struct Fv2dCode {
    base_path: PathBuf,
    tools: BuildTools,
}

impl Fv2dCode {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            tools: BuildTools::default(),
        }
    }

    pub fn with_tools(self, tools: BuildTools) -> Self {
        Self { tools, ..self }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn build_dir(&self) -> PathBuf {
        self.base_path.join("build")
    }

    pub fn executable(&self) -> PathBuf {
        self.build_dir().join("fv2d")
    }

    fn cmake(&self, options: &Fv2dBuildOptions) -> Invocation {
        Invocation::new(&self.tools.cmake)
            .arg("-DCMAKE_BUILD_TYPE=Release")
            .arg_if(options.mhd, "-DMHD=ON")
            .arg("..")
            .current_dir(self.build_dir())
    }

    fn make(&self) -> Invocation {
        Invocation::new(&self.tools.make).current_dir(self.build_dir())
    }

    pub fn compile(&self, options: &Fv2dBuildOptions) -> Result<()> {
        let build_dir = self.build_dir();
        std::fs::create_dir_all(&build_dir).at_path(&build_dir)?;
        self.cmake(options).checked()?;
        if options.clean {
            self.make().arg("clean").checked()?;
        }
        self.make().arg_if(options.parallel, "-j").checked()?;
        Ok(())
    }
}

impl Simulator for Fv2dCode {
    fn run(&self, input: &Path, options: &RunOptions) -> Result<RunOutcome> {
        let input = existing_file(input)?;
        let executable = existing_file(&self.executable())?;
        let output = Invocation::new(executable)
            .arg0(&self.base_path)
            .arg(&input)
            .current_dir(&options.work_dir)
            .output()?;
        let destination = options
            .destination
            .clone()
            .unwrap_or_else(|| self.default_destination());
        make_destination_dir(&destination)?;
        let stem = file_stem(&input)?;
        let mut relocated = vec![];
        for extension in OUTPUT_EXTENSIONS {
            let source = options
                .work_dir
                .join(format!("{}.{}", options.out_name, extension));
            if !output.success() && !source.exists() {
                warn!("Failed fv2d run on {:?} did not write {:?}", input, source);
                continue;
            }
            relocated.push(relocate(
                &source,
                &destination.join(format!("{}_{}.{}", options.out_name, stem, extension)),
            )?);
        }
        Ok(RunOutcome {
            success: output.success(),
            stdout: output.stdout,
            stderr: output.stderr,
            relocated,
        })
    }
}
