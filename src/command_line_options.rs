use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

use crate::ini::Assignment;
use crate::ini::Dialect;
use crate::ini::OptionPath;
use crate::parameters::Override;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct CommandLineOptions {
    #[clap(short, parse(from_occurrences), global = true)]
    pub verbosity: usize,
    /// Only print warnings and errors.
    #[clap(short, long, global = true)]
    pub quiet: bool,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Translate a configuration file between the standard and the Athena++ dialect.
    Convert {
        input: PathBuf,
        output: PathBuf,
        /// Dialect of the input. Inferred from the file name if omitted.
        #[clap(long)]
        from: Option<Dialect>,
        /// Dialect of the output. Inferred from the file name if omitted.
        #[clap(long)]
        to: Option<Dialect>,
    },
    /// Change parameters of an input file.
    Set {
        input: PathBuf,
        /// Where to write the file. Defaults to its name in the current directory.
        #[clap(short, long)]
        output: Option<PathBuf>,
        #[clap(long)]
        dialect: Option<Dialect>,
        /// `section.option=value`, may be repeated.
        #[clap(short = 's', long = "set", required = true)]
        assignments: Vec<Assignment>,
    },
    /// Print a parameter of an input file.
    Get {
        input: PathBuf,
        /// `section.option`
        parameter: OptionPath,
        #[clap(long)]
        dialect: Option<Dialect>,
    },
    /// Build a simulator.
    Compile {
        #[clap(subcommand)]
        code: CompileCommand,
    },
    /// Run a simulator and move its output into a destination directory.
    Run {
        #[clap(subcommand)]
        code: RunCommand,
    },
    /// Print a summary of an output file (`.tab` or `.h5`).
    Inspect {
        file: PathBuf,
        /// fv2d iteration. Defaults to the latest.
        #[clap(long)]
        iteration: Option<usize>,
    },
    /// Export a one-dimensional profile of an output file as columns.
    Profile {
        file: PathBuf,
        #[clap(short, long)]
        output: PathBuf,
        /// Row of an fv2d snapshot.
        #[clap(long, default_value = "0")]
        row: usize,
        /// fv2d iteration. Defaults to the latest.
        #[clap(long)]
        iteration: Option<usize>,
        /// Shift Athena++ coordinates so that the domain starts at zero.
        #[clap(long)]
        shift: bool,
    },
    /// Execute all runs described in a campaign file.
    Campaign {
        file: PathBuf,
        /// Override a campaign parameter: `section/key/subkey=value`.
        #[clap(short = 'p', long = "param")]
        overrides: Vec<Override>,
    },
}

#[derive(Subcommand, Debug)]
pub enum CompileCommand {
    Fv2d {
        base: PathBuf,
        /// Build without magnetic fields.
        #[clap(long)]
        hydro: bool,
        /// Run make without `-j`.
        #[clap(long)]
        serial: bool,
        /// Run `make clean` first.
        #[clap(long)]
        clean: bool,
    },
    Athena {
        base: PathBuf,
        /// Input file naming the problem generator in `comment/configure`.
        input: PathBuf,
        #[clap(long)]
        hydro: bool,
        #[clap(long, default_value = "python3")]
        python: String,
        #[clap(long, default_value = "hlld")]
        flux: String,
        /// Problem generator to build instead of the one in the input file.
        #[clap(long)]
        problem: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum RunCommand {
    Fv2d {
        base: PathBuf,
        input: PathBuf,
        #[clap(long)]
        destination: Option<PathBuf>,
        #[clap(long, default_value = "run")]
        out_name: String,
        #[clap(long, default_value = ".")]
        work_dir: PathBuf,
    },
    Athena {
        base: PathBuf,
        input: PathBuf,
        #[clap(long)]
        destination: Option<PathBuf>,
        #[clap(long, default_value = ".")]
        work_dir: PathBuf,
    },
}
