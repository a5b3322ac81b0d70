use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::reporter::ConsoleReporter;
use crate::scanner::tokenize;

mod repl;
mod reporter;
mod scanner;
#[cfg(test)]
mod test_helpers;
mod token;

/// Bad command line usage.
const EXIT_USAGE: u8 = 64;
/// The script had lexical errors.
const EXIT_DATA_ERROR: u8 = 65;

/// Splits Lox source into tokens and prints them, one per line.
#[derive(Debug, Parser)]
#[command(name = "rlox", version)]
struct Cli {
    /// Script to scan. Starts an interactive prompt when omitted.
    script: Option<PathBuf>,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("file does not seem to exist {}", .0.display())]
    FileDoesNotExist(PathBuf),
}

fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            err.print()?;
            // --help and --version also come through here
            return Ok(if err.use_stderr() {
                ExitCode::from(EXIT_USAGE)
            } else {
                ExitCode::SUCCESS
            });
        }
    };
    debug!(?cli, "starting");

    let mut reporter = ConsoleReporter::new(io::stderr());
    match cli.script {
        Some(path) => Ok(run_file(&path, &mut reporter)?),
        None => {
            repl::run_prompt(io::stdin().lock(), &mut io::stdout().lock(), &mut reporter)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn run_file<E: Write>(
    path: &Path,
    reporter: &mut ConsoleReporter<E>,
) -> Result<ExitCode, CliError> {
    let source = read_source(path)?;
    run(&source, &mut io::stdout().lock(), reporter)?;
    if reporter.had_error() {
        return Ok(ExitCode::from(EXIT_DATA_ERROR));
    }
    Ok(ExitCode::SUCCESS)
}

/// Bytes that are not valid UTF-8 become U+FFFD and get reported by the scanner.
fn read_source(path: &Path) -> Result<String, CliError> {
    if !path.try_exists()? {
        return Err(CliError::FileDoesNotExist(path.to_path_buf()));
    }
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Nothing consumes the tokens yet, so running a program means listing them.
fn run<W: Write, E: Write>(
    source: &str,
    output: &mut W,
    reporter: &mut ConsoleReporter<E>,
) -> io::Result<()> {
    for token in tokenize(source, reporter) {
        writeln!(output, "{token}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::Path;
    use std::process::ExitCode;

    use clap::Parser;
    use tempfile::NamedTempFile;

    use crate::reporter::ConsoleReporter;
    use crate::{read_source, run, run_file, Cli, CliError};

    #[test]
    fn test_run_lists_tokens() {
        let mut output = vec![];
        let mut reporter = ConsoleReporter::new(Vec::<u8>::new());
        run("print \"hi\" + 45.67;", &mut output, &mut reporter).unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "PRINT print null\nSTRING \"hi\" hi\nPLUS + null\nNUMBER 45.67 45.67\nSEMICOLON ; null\nEOF  null\n"
        );
        assert!(!reporter.had_error());
    }

    #[test]
    fn test_run_reports_errors_and_keeps_going() {
        let mut output = vec![];
        let mut reporter = ConsoleReporter::new(Vec::<u8>::new());
        run("{}&.9", &mut output, &mut reporter).unwrap();
        assert!(reporter.had_error());
        assert_eq!(String::from_utf8(output).unwrap().lines().count(), 5);
    }

    #[test]
    fn test_missing_file() {
        let mut reporter = ConsoleReporter::new(Vec::<u8>::new());
        let result = run_file(Path::new("this/file/is/not/there.lox"), &mut reporter);
        assert!(matches!(result, Err(CliError::FileDoesNotExist(_))));
    }

    #[test]
    fn test_invalid_utf8_is_scanned_lossily() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"print \xff;").unwrap();

        let source = read_source(file.path()).unwrap();
        assert_eq!(source, "print \u{FFFD};");

        let mut reporter = ConsoleReporter::new(Vec::<u8>::new());
        let exit_code = run_file(file.path(), &mut reporter).unwrap();
        assert_eq!(exit_code, ExitCode::from(65));
        assert_eq!(
            String::from_utf8(reporter.into_inner()).unwrap(),
            "[line 1] Error: Unexpected character '\u{FFFD}'.\n"
        );
    }

    #[test]
    fn test_cli_arguments() {
        let cli = Cli::try_parse_from(["rlox"]).unwrap();
        assert_eq!(cli.script, None);

        let cli = Cli::try_parse_from(["rlox", "script.lox"]).unwrap();
        assert_eq!(cli.script.as_deref(), Some(Path::new("script.lox")));

        assert!(Cli::try_parse_from(["rlox", "one.lox", "two.lox"]).is_err());
    }
}
