use std::ffi::OsStr;
use std::ffi::OsString;
use std::fmt;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::ExitStatus;

use log::debug;
use log::error;
use log::info;

use crate::error::Error;
use crate::error::Result;

/// An external program call, built up step by step and then
/// executed with its output captured.
#[derive(Clone, Debug)]
pub struct Invocation {
    program: PathBuf,
    arg0: Option<OsString>,
    args: Vec<OsString>,
    work_dir: Option<PathBuf>,
}

/// Captured result of a finished program.
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            arg0: None,
            args: vec![],
            work_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_owned());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|arg| arg.as_ref().to_owned()));
        self
    }

    /// Only add the argument if `condition` holds.
    pub fn arg_if(self, condition: bool, arg: impl AsRef<OsStr>) -> Self {
        if condition {
            self.arg(arg)
        } else {
            self
        }
    }

    /// The name the program sees as its own, if different from the
    /// program path. Ignored on platforms without `argv[0]` support.
    pub fn arg0(mut self, arg0: impl AsRef<OsStr>) -> Self {
        self.arg0 = Some(arg0.as_ref().to_owned());
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(dir.into());
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(ref dir) = self.work_dir {
            command.current_dir(dir);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            if let Some(ref arg0) = self.arg0 {
                command.arg0(arg0);
            }
        }
        command
    }

    /// Run the program to completion. A non-zero exit status is
    /// logged and returned, not treated as an error.
    pub fn output(&self) -> Result<CommandOutput> {
        match self.work_dir {
            Some(ref dir) => info!("Running `{}` in {:?}", self, dir),
            None => info!("Running `{}`", self),
        }
        let output = self
            .command()
            .output()
            .map_err(|source| Error::CommandSpawn {
                program: self.program.display().to_string(),
                source,
            })?;
        let output = CommandOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        if !output.stdout.is_empty() {
            debug!("{}", output.stdout.trim_end());
        }
        if !output.success() {
            error!(
                "`{}` exited with {}: {}",
                self,
                output.status,
                output.stderr.trim_end()
            );
        }
        Ok(output)
    }

    /// Run the program and turn a non-zero exit status into an error.
    pub fn checked(&self) -> Result<CommandOutput> {
        let output = self.output()?;
        if output.success() {
            Ok(output)
        } else {
            Err(Error::CommandFailed {
                program: self.program.display().to_string(),
                status: output.status,
                stderr: output.stderr,
            })
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in self.args.iter() {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use tempfile::TempDir;

    use super::Invocation;
    use crate::error::Error;
    use crate::test_utils::write_script;

    #[test]
    fn display_lists_program_and_arguments() {
        let invocation = Invocation::new("make").arg("-j").arg_if(false, "clean");
        assert_eq!(invocation.to_string(), "make -j");
    }

    #[test]
    fn captures_output() {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("echo.sh");
        write_script(&script, "echo \"out $1\"\necho err >&2");
        let output = Invocation::new(&script).arg("a").output().unwrap();
        assert!(output.success());
        assert_eq!(output.stdout, "out a\n");
        assert_eq!(output.stderr, "err\n");
    }

    #[test]
    fn runs_in_working_directory() {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("touch.sh");
        write_script(&script, "touch created");
        Invocation::new(&script)
            .current_dir(dir.path())
            .checked()
            .unwrap();
        assert!(dir.path().join("created").exists());
    }

    #[test]
    fn failing_program() {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("fail.sh");
        write_script(&script, "echo broken >&2\nexit 3");
        let output = Invocation::new(&script).output().unwrap();
        assert!(!output.success());
        match Invocation::new(&script).checked() {
            Err(Error::CommandFailed { stderr, .. }) => assert_eq!(stderr, "broken\n"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn missing_program() {
        assert!(matches!(
            Invocation::new("/nonexistent/program").output(),
            Err(Error::CommandSpawn { .. })
        ));
    }
}
