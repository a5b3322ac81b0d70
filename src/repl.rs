use std::io::{self, BufRead, Write};

use tracing::debug;

use crate::reporter::ConsoleReporter;

const PROMPT: &str = "> ";

/// Reads lines until the input closes. The error flag is cleared after every line so one bad
/// line does not fail the session.
pub fn run_prompt<T: BufRead, W: Write, E: Write>(
    input: T,
    output: &mut W,
    reporter: &mut ConsoleReporter<E>,
) -> io::Result<()> {
    let mut lines = input.lines();
    loop {
        write!(output, "{PROMPT}")?;
        output.flush()?;
        // None on CTRL+D, which ends the session.
        let Some(line) = lines.next() else {
            break;
        };
        // each line is scanned on its own, a string left open at the end of it is an error.
        crate::run(&line?, &mut *output, reporter)?;
        reporter.reset();
    }
    debug!("input closed, leaving prompt");
    // leave the terminal on a fresh line after the last prompt
    writeln!(output)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use crate::repl::run_prompt;
    use crate::reporter::ConsoleReporter;

    #[test]
    fn test_run_prompt_scans_each_line() {
        let mut output = vec![];
        let mut reporter = ConsoleReporter::new(Vec::<u8>::new());
        run_prompt(Cursor::new("(\nvar x;\n"), &mut output, &mut reporter).unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "> LEFT_PAREN ( null\nEOF  null\n> VAR var null\nIDENTIFIER x null\nSEMICOLON ; null\nEOF  null\n> \n"
        );
    }

    #[test]
    fn test_run_prompt_resets_errors_between_lines() {
        let mut output = vec![];
        let mut reporter = ConsoleReporter::new(Vec::<u8>::new());
        run_prompt(Cursor::new("&\n1\n"), &mut output, &mut reporter).unwrap();
        assert!(!reporter.had_error());
        assert_eq!(
            String::from_utf8(reporter.into_inner()).unwrap(),
            "[line 1] Error: Unexpected character '&'.\n"
        );
    }

    #[test]
    fn test_each_line_starts_at_line_one() {
        let mut output = vec![];
        let mut reporter = ConsoleReporter::new(Vec::<u8>::new());
        run_prompt(Cursor::new("\"open\n\"again\n"), &mut output, &mut reporter).unwrap();
        assert_eq!(
            String::from_utf8(reporter.into_inner()).unwrap(),
            "[line 1] Error: Unterminated string.\n[line 1] Error: Unterminated string.\n"
        );
    }
}
