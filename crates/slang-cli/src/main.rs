//! Command-line driver for the S-Lang compiler front-end.
//!
//! Reads one source file, parses it, generates textual IR, writes the IR to
//! a file (`output.ll` unless renamed with `-r`) and optionally echoes it to
//! stdout with `-e`. Every failure prints a single `[ERROR]` line to stderr
//! and exits with code 1; usage problems (including `-h`) also exit 1.

mod debug;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser as CliParser;
use owo_colors::OwoColorize;

use slang_codegen::Codegen;
use slang_parser::Parser;
use slang_syntax::error::{Error, ErrorKind};

#[derive(CliParser, Debug)]
#[command(name = "slang-cli", about = "S-Lang compiler front-end", disable_version_flag = true)]
struct Cli {
    /// Source file to compile
    file: PathBuf,

    /// Rename the IR output file
    #[arg(short = 'r', long = "rename", value_name = "NAME", default_value = "output.ll")]
    output: PathBuf,

    /// Emit the generated IR to stdout
    #[arg(short = 'e', long = "emit-ir")]
    emit_ir: bool,

    /// Enable verbose debug output
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Help and usage errors alike exit 1; only a clean compile
            // exits 0.
            let _ = err.print();
            return ExitCode::FAILURE;
        }
    };

    debug::init(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {}", "[ERROR]".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Error> {
    let source = fs::read_to_string(&cli.file).map_err(|e| {
        Error::new(
            ErrorKind::FileProcess,
            format!("Failed to read {}: {}", cli.file.display(), e),
        )
    })?;

    let mut parser = Parser::new(&source)?;
    let program = parser.parse_program()?;

    let mut codegen = Codegen::new();
    let ir = codegen.generate(&program)?;

    fs::write(&cli.output, &ir).map_err(|e| {
        Error::new(
            ErrorKind::FileProcess,
            format!("Failed to write {}: {}", cli.output.display(), e),
        )
    })?;

    if cli.emit_ir {
        print!("{ir}");
    }

    Ok(())
}
