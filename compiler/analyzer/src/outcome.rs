//! Maps the result of a compilation run to what the driver reports and
//! the process exit status.
use std::io::{self, Write};

use crate::reporter::{ErrorReporter, InternalCompilerError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompilationOutcome {
    Success,
    /// The run completed but reported at least one error.
    Failed,
    /// A compiler invariant did not hold.
    Internal(InternalCompilerError),
}

impl CompilationOutcome {
    pub fn from_result<T>(
        result: &Result<T, InternalCompilerError>,
        reporter: &ErrorReporter,
    ) -> Self {
        match result {
            Err(err) => CompilationOutcome::Internal(err.clone()),
            Ok(_) if reporter.has_errors() => CompilationOutcome::Failed,
            Ok(_) => CompilationOutcome::Success,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            CompilationOutcome::Success => 0,
            CompilationOutcome::Failed => 1,
            CompilationOutcome::Internal(_) => 2,
        }
    }

    /// Writes the diagnostics, the bug report request for an internal
    /// error and the summary line.
    pub fn write_report<W: Write>(
        &self,
        reporter: &ErrorReporter,
        writer: &mut W,
    ) -> io::Result<()> {
        reporter.write_all(writer)?;
        if let CompilationOutcome::Internal(err) = self {
            writeln!(writer, "{}", err.to_diagnostic())?;
        }
        if let Some(summary) = reporter.summary() {
            writeln!(writer, "{}", summary)?;
        }
        Ok(())
    }

    pub fn report(&self, reporter: &ErrorReporter) {
        let _ = self.write_report(reporter, &mut io::stderr().lock());
    }
}
