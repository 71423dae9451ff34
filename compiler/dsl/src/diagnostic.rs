//! Provides definition for diagnostics, which are normally errors and warnings
//! associated with compilation.
//!
//! Diagnostics are immutable once constructed. Collecting them is the job of
//! the error reporter in the analyzer.

use std::fmt;

use plctype_problems::Problem;

use crate::core::{FileId, Id};

/// How serious a diagnostic is. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Note,
    Warning,
    Error,
    Fatal,
}

impl Severity {
    /// Returns true for errors and worse.
    pub fn is_error(&self) -> bool {
        *self >= Severity::Error
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Note => f.write_str("note"),
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
            Severity::Fatal => f.write_str("fatal error"),
        }
    }
}

/// The stage of compilation that a diagnostic is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Lexical,
    Syntax,
    Semantic,
    Type,
    /// A violated compiler invariant. Never attributable to the user's program.
    Internal,
}

/// A line oriented position in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file_id: FileId,
    /// Line (1-indexed). Zero means the line is not known.
    pub line: usize,
    /// Column (1-indexed).
    pub column: Option<usize>,
}

impl SourceLocation {
    pub fn new(file_id: FileId, line: usize, column: Option<usize>) -> Self {
        Self {
            file_id,
            line,
            column,
        }
    }

    /// A location is valid when it names a file and a line.
    pub fn is_valid(&self) -> bool {
        self.file_id.is_named() && self.line > 0
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return f.write_str("<unknown location>");
        }
        write!(f, "{}:{}", self.file_id, self.line)?;
        match self.column {
            Some(column) if column > 0 => write!(f, ":{}", column),
            _ => Ok(()),
        }
    }
}

/// Additional information that some categories of diagnostic carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detail {
    None,
    /// Incompatible types. Either name may be empty when it is not known.
    Type { expected: String, actual: String },
    /// A compiler bug. The position is in the compiler source, not the
    /// IEC 61131-3 source.
    Internal { file: String, line: u32 },
}

/// A diagnostic. Diagnostics have a code that is indicative of the problem,
/// a severity, a category, and possibly a location in the user's program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// A normally unique value describing the type of diagnostic. Empty for
    /// free form diagnostics.
    pub code: String,

    pub severity: Severity,

    pub category: Category,

    message: String,

    /// Additional descriptions appended to the message.
    pub described: Vec<String>,

    pub location: Option<SourceLocation>,

    pub detail: Detail,
}

impl Diagnostic {
    /// Creates a free form diagnostic.
    pub fn new(severity: Severity, category: Category, message: impl Into<String>) -> Self {
        Self {
            code: String::new(),
            severity,
            category,
            message: message.into(),
            described: vec![],
            location: None,
            detail: Detail::None,
        }
    }

    /// Creates an error diagnostic from the problem code.
    pub fn problem(problem: Problem, category: Category) -> Self {
        Self {
            code: problem.code().to_string(),
            severity: Severity::Error,
            category,
            message: problem.message().to_string(),
            described: vec![],
            location: None,
            detail: Detail::None,
        }
    }

    /// Creates a type error from the problem code naming the expected
    /// and actual types.
    pub fn type_error(
        problem: Problem,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            detail: Detail::Type {
                expected: expected.into(),
                actual: actual.into(),
            },
            ..Diagnostic::problem(problem, Category::Type)
        }
    }

    /// Creates a diagnostic for a violated compiler invariant.
    ///
    /// Unlike other diagnostics, the position in this is related to the
    /// compiler rather than the IEC 61131-3 source.
    pub fn internal(message: impl Into<String>, file: &str, line: u32) -> Self {
        Self {
            code: Problem::InternalInvariant.code().to_string(),
            severity: Severity::Fatal,
            category: Category::Internal,
            message: message.into(),
            described: vec![],
            location: None,
            detail: Detail::Internal {
                file: file.to_string(),
                line,
            },
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_location(mut self, location: Option<SourceLocation>) -> Self {
        self.location = location;
        self
    }

    /// Adds to the problem description (primary text) additional context
    /// about the problem.
    pub fn with_context(mut self, description: &str, item: &str) -> Self {
        self.described.push(format!("{}={}", description, item));
        self
    }

    pub fn with_context_id(mut self, description: &str, item: &Id) -> Self {
        self.described.push(format!("{}={}", description, item));
        self
    }

    /// Returns the description for the diagnostic including any context.
    pub fn description(&self) -> String {
        if self.described.is_empty() {
            self.message.clone()
        } else {
            format!("{} ({})", self.message, self.described.join(", "))
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity.is_error()
    }

    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }

    /// Formats the diagnostic in the style `file:line:col: severity: message`.
    pub fn format(&self) -> String {
        if let Detail::Internal { file, line } = &self.detail {
            return format!(
                "INTERNAL COMPILER ERROR at {}:{}\n  {}\n  Please report this bug.",
                file,
                line,
                self.description()
            );
        }

        let mut out = String::new();
        if let Some(location) = self.location.as_ref().filter(|loc| loc.is_valid()) {
            out.push_str(&format!("{}: ", location));
        }
        out.push_str(&format!("{}: {}", self.severity, self.description()));

        if let Detail::Type { expected, actual } = &self.detail {
            let parts: Vec<String> = [("expected", expected), ("got", actual)]
                .iter()
                .filter(|(_, name)| !name.is_empty())
                .map(|(label, name)| format!("{}: {}", label, name))
                .collect();
            if !parts.is_empty() {
                out.push_str(&format!(" ({})", parts.join(", ")));
            }
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}
