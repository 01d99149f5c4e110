use std::path::Path;

use clap::Parser;
use log::error;
use log::info;
use simdriver::campaign::Campaign;
use simdriver::code::AthenaBuildOptions;
use simdriver::code::AthenaCode;
use simdriver::code::Fv2dBuildOptions;
use simdriver::code::Fv2dCode;
use simdriver::code::RunOptions;
use simdriver::code::Simulator;
use simdriver::command_line_options::Command;
use simdriver::command_line_options::CommandLineOptions;
use simdriver::command_line_options::CompileCommand;
use simdriver::command_line_options::RunCommand;
use simdriver::ini;
use simdriver::ini::Dialect;
use simdriver::ini::ParameterFile;
use simdriver::io;
use simdriver::logging;
use simdriver::Result;

fn dialect_or_inferred(dialect: Option<Dialect>, path: &Path) -> Dialect {
    dialect.unwrap_or_else(|| Dialect::infer(path))
}

fn report(outcome: &simdriver::code::RunOutcome) {
    for file in outcome.relocated.iter() {
        println!("{}", file.display());
    }
    if !outcome.success {
        error!("Simulation failed");
    }
}

fn compile(command: CompileCommand) -> Result<()> {
    match command {
        CompileCommand::Fv2d {
            base,
            hydro,
            serial,
            clean,
        } => Fv2dCode::new(base).compile(&Fv2dBuildOptions {
            mhd: !hydro,
            parallel: !serial,
            clean,
        }),
        CompileCommand::Athena {
            base,
            input,
            hydro,
            python,
            flux,
            problem,
        } => {
            let input = ParameterFile::open(&input, Dialect::Athena)?;
            let problem = AthenaCode::new(base).compile(
                &input,
                &AthenaBuildOptions {
                    mhd: !hydro,
                    python,
                    flux,
                    problem,
                },
            )?;
            info!("Built Athena++ for {} ({})", problem.name(), problem.label());
            Ok(())
        }
    }
}

fn run(command: RunCommand) -> Result<()> {
    let outcome = match command {
        RunCommand::Fv2d {
            base,
            input,
            destination,
            out_name,
            work_dir,
        } => Fv2dCode::new(base).run(
            &input,
            &RunOptions {
                destination,
                out_name,
                work_dir,
            },
        )?,
        RunCommand::Athena {
            base,
            input,
            destination,
            work_dir,
        } => AthenaCode::new(base).run(
            &input,
            &RunOptions {
                destination,
                work_dir,
                ..Default::default()
            },
        )?,
    };
    report(&outcome);
    Ok(())
}

fn execute(command: Command) -> Result<()> {
    match command {
        Command::Convert {
            input,
            output,
            from,
            to,
        } => ini::convert(
            &input,
            &output,
            dialect_or_inferred(from, &input),
            dialect_or_inferred(to, &output),
        ),
        Command::Set {
            input,
            output,
            dialect,
            assignments,
        } => {
            let mut file = ParameterFile::open(&input, dialect_or_inferred(dialect, &input))?;
            for assignment in assignments.iter() {
                file.set_param(&assignment.section, &assignment.option, &assignment.value)?;
            }
            let written = file.write(output.as_deref())?;
            println!("{}", written.display());
            Ok(())
        }
        Command::Get {
            input,
            parameter,
            dialect,
        } => {
            let file = ParameterFile::open(&input, dialect_or_inferred(dialect, &input))?;
            println!("{}", file.get(&parameter.section, &parameter.option)?);
            Ok(())
        }
        Command::Compile { code } => compile(code),
        Command::Run { code } => run(code),
        Command::Inspect { file, iteration } => {
            let summary = io::Summary::of_file(&file, iteration)?;
            print!("{}", serde_yaml::to_string(&summary)?);
            Ok(())
        }
        Command::Profile {
            file,
            output,
            row,
            iteration,
            shift,
        } => {
            let profile = io::load_profile(&file, iteration, row, shift)?;
            io::write_columns(profile.as_ref(), &output)
        }
        Command::Campaign { file, overrides } => {
            let records = Campaign::from_file(&file, overrides)?.execute()?;
            let failed = records.iter().filter(|record| !record.success).count();
            info!("Finished {} runs, {} failed", records.len(), failed);
            Ok(())
        }
    }
}

fn main() {
    let opts = CommandLineOptions::parse();
    logging::init(opts.verbosity, opts.quiet);
    if let Err(e) = execute(opts.command) {
        error!("{}", e);
        std::process::exit(1);
    }
}
