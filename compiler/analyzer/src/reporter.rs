//! Collects the diagnostics of one compilation run.
//!
//! Ordinary diagnostics accumulate without stopping the run. An internal
//! error is recorded and then returned as an `InternalCompilerError` that
//! callers propagate (see `internal_error!`) up to the driver, which picks
//! the exit status.
use std::io::{self, Write};
use std::sync::{LazyLock, Mutex, PoisonError};

use log::{debug, error};
use plctype_dsl::diagnostic::{Category, Diagnostic, Severity, SourceLocation};
use plctype_problems::Problem;
use thiserror::Error;

/// Signal that a compiler invariant was violated. Carries the position in
/// the compiler source that detected the violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct InternalCompilerError {
    pub message: String,
    pub file: String,
    pub line: u32,
}

impl InternalCompilerError {
    /// The diagnostic that tells the user this is a compiler bug.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::internal(self.message.clone(), &self.file, self.line)
    }
}

/// Reports an internal error and returns it from the enclosing function.
///
/// ```ignore
/// internal_error!(reporter, "symbol {} has no datatype", name);
/// ```
#[macro_export]
macro_rules! internal_error {
    ($reporter:expr, $($arg:tt)*) => {
        return Err($reporter
            .report_internal_error(&format!($($arg)*), Some(file!()), line!())
            .into())
    };
}

pub type DiagnosticObserver = Box<dyn FnMut(&Diagnostic) + Send>;

#[derive(Default)]
pub struct ErrorReporter {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
    has_fatal: bool,
    observer: Option<DiagnosticObserver>,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a function that is called with each diagnostic as it is reported.
    pub fn set_observer(&mut self, observer: DiagnosticObserver) {
        self.observer = Some(observer);
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error | Severity::Fatal => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
            Severity::Note => {}
        }
        if diagnostic.is_fatal() {
            self.has_fatal = true;
        }

        debug!("Reported {}", diagnostic.format());
        if let Some(observer) = self.observer.as_mut() {
            observer(&diagnostic);
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn report_all(&mut self, diagnostics: Vec<Diagnostic>) {
        diagnostics.into_iter().for_each(|d| self.report(d));
    }

    pub fn report_syntax_error(&mut self, message: &str, location: Option<SourceLocation>) {
        self.report(
            Diagnostic::new(Severity::Error, Category::Syntax, message).with_location(location),
        );
    }

    pub fn report_semantic_error(&mut self, problem: Problem, location: Option<SourceLocation>) {
        self.report(Diagnostic::problem(problem, Category::Semantic).with_location(location));
    }

    pub fn report_type_error(
        &mut self,
        problem: Problem,
        expected: &str,
        actual: &str,
        location: Option<SourceLocation>,
    ) {
        self.report(Diagnostic::type_error(problem, expected, actual).with_location(location));
    }

    pub fn report_warning(&mut self, message: &str, location: Option<SourceLocation>) {
        self.report(
            Diagnostic::new(Severity::Warning, Category::Semantic, message).with_location(location),
        );
    }

    /// Records a fatal internal diagnostic and returns the signal for the
    /// caller to propagate. Prefer `internal_error!`, which returns it.
    #[must_use]
    pub fn report_internal_error(
        &mut self,
        message: &str,
        file: Option<&str>,
        line: u32,
    ) -> InternalCompilerError {
        let file = file.unwrap_or("<unknown>");
        let mut full_message = format!("Internal compiler error in file {} at line {}", file, line);
        if !message.is_empty() {
            full_message.push_str(": ");
            full_message.push_str(message);
        }

        error!("{}", full_message);
        let mut diagnostic = Diagnostic::new(Severity::Fatal, Category::Internal, &full_message);
        diagnostic.code = Problem::InternalInvariant.code().to_string();
        self.report(diagnostic);

        InternalCompilerError {
            message: full_message,
            file: file.to_string(),
            line,
        }
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn has_fatal(&self) -> bool {
        self.has_fatal
    }

    /// The diagnostics in the order they were reported.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Writes each diagnostic on its own line in the order reported.
    pub fn write_all<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for diagnostic in &self.diagnostics {
            writeln!(writer, "{}", diagnostic.format())?;
        }
        Ok(())
    }

    pub fn print_all(&self) {
        // Nothing useful can be done if stderr is gone.
        let _ = self.write_all(&mut io::stderr().lock());
    }

    /// Returns a line such as `2 errors, 1 warning generated.` or nothing
    /// when there are neither errors nor warnings.
    pub fn summary(&self) -> Option<String> {
        if self.error_count == 0 && self.warning_count == 0 {
            return None;
        }
        let mut summary = format!("{} error{}", self.error_count, plural(self.error_count));
        if self.warning_count > 0 {
            summary.push_str(&format!(
                ", {} warning{}",
                self.warning_count,
                plural(self.warning_count)
            ));
        }
        summary.push_str(" generated.");
        Some(summary)
    }

    pub fn print_summary(&self) {
        if let Some(summary) = self.summary() {
            eprintln!("{}", summary);
        }
    }

    /// Returns the reporter to its initial state. The observer is kept.
    pub fn clear(&mut self) {
        self.diagnostics.clear();
        self.error_count = 0;
        self.warning_count = 0;
        self.has_fatal = false;
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

static DEFAULT_REPORTER: LazyLock<Mutex<ErrorReporter>> =
    LazyLock::new(|| Mutex::new(ErrorReporter::new()));

/// Runs the function with the process-wide reporter.
///
/// The default reporter is shared by every run in the process. Call
/// `reset_default_reporter` between unrelated runs.
pub fn with_default_reporter<R>(f: impl FnOnce(&mut ErrorReporter) -> R) -> R {
    let mut reporter = DEFAULT_REPORTER
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    f(&mut reporter)
}

pub fn reset_default_reporter() {
    with_default_reporter(|reporter| reporter.clear());
}

#[cfg(test)]
mod tests {
    use super::*;
    use plctype_dsl::core::FileId;
    use std::sync::Arc;

    fn failing_check(reporter: &mut ErrorReporter) -> Result<u32, InternalCompilerError> {
        internal_error!(reporter, "invariant {} broken", 7);
    }

    #[test]
    fn report_when_error_and_warning_then_counts() {
        let mut reporter = ErrorReporter::new();
        reporter.report_semantic_error(Problem::TypeDeclNameDuplicated, None);
        reporter.report_warning("unused", None);
        reporter.report(Diagnostic::new(Severity::Note, Category::Semantic, "note"));

        assert_eq!(1, reporter.error_count());
        assert_eq!(1, reporter.warning_count());
        assert!(!reporter.has_fatal());
        assert_eq!(3, reporter.diagnostics().len());
    }

    #[test]
    fn report_when_observer_then_called_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut reporter = ErrorReporter::new();
        reporter.set_observer(Box::new(move |d: &Diagnostic| {
            sink.lock().unwrap().push(d.description())
        }));

        reporter.report_warning("first", None);
        reporter.report_warning("second", None);

        assert_eq!(vec!["first", "second"], *seen.lock().unwrap());
    }

    #[test]
    fn summary_when_nothing_reported_then_none() {
        assert_eq!(None, ErrorReporter::new().summary());
    }

    #[test]
    fn summary_when_one_error_then_singular() {
        let mut reporter = ErrorReporter::new();
        reporter.report_semantic_error(Problem::ParentTypeNotDeclared, None);
        assert_eq!(Some("1 error generated.".to_string()), reporter.summary());
    }

    #[test]
    fn summary_when_two_errors_one_warning_then_plural_errors() {
        let mut reporter = ErrorReporter::new();
        reporter.report_semantic_error(Problem::ParentTypeNotDeclared, None);
        reporter.report_type_error(Problem::AssignmentTypeMismatch, "INT", "DINT", None);
        reporter.report_warning("unused", None);
        assert_eq!(
            Some("2 errors, 1 warning generated.".to_string()),
            reporter.summary()
        );
    }

    #[test]
    fn summary_when_only_warnings_then_zero_errors() {
        let mut reporter = ErrorReporter::new();
        reporter.report_warning("a", None);
        reporter.report_warning("b", None);
        assert_eq!(
            Some("0 errors, 2 warnings generated.".to_string()),
            reporter.summary()
        );
    }

    #[test]
    fn internal_error_when_raised_then_recorded_and_returned() {
        let mut reporter = ErrorReporter::new();

        let err = failing_check(&mut reporter).unwrap_err();

        assert!(err
            .message
            .ends_with(&format!("at line {}: invariant 7 broken", err.line)));
        assert!(err.file.ends_with("reporter.rs"));
        assert!(reporter.has_fatal());
        assert_eq!(1, reporter.error_count());
        let logged = &reporter.diagnostics()[0];
        assert_eq!(Category::Internal, logged.category);
        assert_eq!(Severity::Fatal, logged.severity);
        assert_eq!(err.message, logged.description());
    }

    #[test]
    fn report_internal_error_when_no_file_then_unknown() {
        let mut reporter = ErrorReporter::new();
        let err = reporter.report_internal_error("", None, 12);
        assert_eq!("Internal compiler error in file <unknown> at line 12", err.message);
    }

    #[test]
    fn internal_error_to_diagnostic_then_bug_report_format() {
        let err = InternalCompilerError {
            message: "boom".to_string(),
            file: "bridge.rs".to_string(),
            line: 3,
        };
        assert_eq!(
            "INTERNAL COMPILER ERROR at bridge.rs:3\n  boom\n  Please report this bug.",
            err.to_diagnostic().format()
        );
    }

    #[test]
    fn clear_then_initial_state() {
        let mut reporter = ErrorReporter::new();
        reporter.report_warning("w", None);
        let _ = reporter.report_internal_error("x", Some("f.rs"), 1);

        reporter.clear();

        assert_eq!(0, reporter.error_count());
        assert_eq!(0, reporter.warning_count());
        assert!(!reporter.has_fatal());
        assert!(reporter.diagnostics().is_empty());
        assert_eq!(None, reporter.summary());
    }

    #[test]
    fn write_all_then_insertion_order() {
        let mut reporter = ErrorReporter::new();
        let location = SourceLocation::new(FileId::from_string("main.st"), 2, Some(5));
        reporter.report_warning("first", Some(location));
        reporter.report_warning("second", None);

        let mut out = Vec::new();
        reporter.write_all(&mut out).unwrap();

        assert_eq!(
            "main.st:2:5: warning: first\nwarning: second\n",
            String::from_utf8(out).unwrap()
        );
    }

    #[test]
    fn default_reporter_when_reset_then_empty() {
        with_default_reporter(|reporter| reporter.report_warning("leak", None));
        reset_default_reporter();
        assert_eq!(0, with_default_reporter(|reporter| reporter.warning_count()));
    }
}
