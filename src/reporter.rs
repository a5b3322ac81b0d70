use std::io::Write;

use crate::scanner::ScanningError;

/// Receives lexical errors as the scanner finds them. Reporting never stops the scan.
pub trait ErrorReporter {
    fn error(&mut self, error: ScanningError);
}

// lets tests pass `|err| panic!("{err:?}")` the way they always did.
impl<F: FnMut(ScanningError)> ErrorReporter for F {
    fn error(&mut self, error: ScanningError) {
        self(error)
    }
}

/// Prints errors as `[line N] Error: message` and remembers that something went wrong,
/// so the caller can pick an exit code.
pub struct ConsoleReporter<W: Write> {
    writer: W,
    had_error: bool,
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(writer: W) -> ConsoleReporter<W> {
        ConsoleReporter {
            writer,
            had_error: false,
        }
    }

    pub fn had_error(&self) -> bool {
        self.had_error
    }

    /// The REPL calls this between lines: a typo on one line should not poison the next.
    pub fn reset(&mut self) {
        self.had_error = false;
    }

    fn report(&mut self, line: usize, location: &str, message: &str) {
        self.had_error = true;
        // nowhere left to report a failing error stream to.
        let _ = writeln!(self.writer, "[line {line}] Error{location}: {message}");
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ErrorReporter for ConsoleReporter<W> {
    fn error(&mut self, error: ScanningError) {
        self.report(error.line(), "", &format!("{error}"));
    }
}
