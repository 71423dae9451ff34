//! Core items for identifying language elements and where they came from.
use core::fmt;
use std::path::Path;
use std::sync::{Arc, LazyLock};
use std::{hash::Hash, hash::Hasher};

// Shared empty path so that FileId::default() does not allocate.
static EMPTY_FILE_ID: LazyLock<Arc<str>> = LazyLock::new(|| Arc::from(""));

/// FileId identifies the origin of source code.
///
/// FileId can also represent items that are built-in to the compiler
/// such as the elementary types.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum FileId {
    /// Source code from a file. The string is the file path.
    File(Arc<str>),
    /// Built-in to the compiler (elementary types).
    BuiltIn,
}

impl FileId {
    /// Creates a file identifier from the path.
    pub fn from_path(path: &Path) -> Self {
        FileId::File(Arc::from(path.to_string_lossy().as_ref()))
    }

    /// Creates a file identifier from the slice. The slice
    /// is normally the file path.
    pub fn from_string(path: &str) -> Self {
        FileId::File(Arc::from(path))
    }

    pub fn builtin() -> Self {
        FileId::BuiltIn
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, FileId::BuiltIn)
    }

    /// Returns true if the identifier names a file with a non-empty path.
    pub fn is_named(&self) -> bool {
        match self {
            FileId::File(path) => !path.is_empty(),
            FileId::BuiltIn => false,
        }
    }
}

impl Default for FileId {
    fn default() -> Self {
        FileId::File(EMPTY_FILE_ID.clone())
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileId::File(path) => write!(f, "{}", path),
            FileId::BuiltIn => write!(f, "<builtin>"),
        }
    }
}

/// Location in a file of a language element instance.
///
/// The location is defined by indices in the source file.
#[derive(Debug, Clone)]
pub struct SourceSpan {
    /// The position of the starting character (0-indexed).
    pub start: usize,
    /// The position of the ending character (0-indexed).
    pub end: usize,
    pub file_id: FileId,
}

impl SourceSpan {
    pub fn range(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            file_id: FileId::default(),
        }
    }

    pub fn with_file_id(&self, file_id: &FileId) -> Self {
        Self {
            start: self.start,
            end: self.end,
            file_id: file_id.clone(),
        }
    }

    /// Creates a span for built-in items. These have no meaningful
    /// source position since they are intrinsic to the language.
    pub fn builtin() -> Self {
        Self {
            start: 0,
            end: 0,
            file_id: FileId::builtin(),
        }
    }

    pub fn is_builtin(&self) -> bool {
        self.file_id.is_builtin()
    }
}

impl Default for SourceSpan {
    fn default() -> Self {
        SourceSpan::range(0, 0)
    }
}

impl PartialEq for SourceSpan {
    fn eq(&self, _other: &Self) -> bool {
        // When comparing language elements we almost never care whether they
        // were declared at the same position.
        true
    }
}
impl Eq for SourceSpan {}

/// Defines an element that has a location in source code.
pub trait Located {
    /// Get the source code position of the object.
    fn span(&self) -> SourceSpan;
}

/// Implements Identifier.
///
/// 61131-3 declares that identifiers are case insensitive.
/// This class ensures that we do case insensitive comparisons
/// and can use containers as appropriate.
///
/// See section 2.1.2.
pub struct Id {
    pub original: String,
    pub lower_case: String,
    pub span: SourceSpan,
}

impl Id {
    /// Converts a `&str` into an `Identifier`.
    pub fn from(str: &str) -> Self {
        Id {
            original: String::from(str),
            lower_case: str.to_lowercase(),
            span: SourceSpan::default(),
        }
    }

    pub fn with_position(mut self, loc: SourceSpan) -> Self {
        self.span = loc;
        self
    }

    pub fn lower_case(&self) -> &str {
        &self.lower_case
    }

    pub fn original(&self) -> &str {
        &self.original
    }
}

impl Clone for Id {
    fn clone(&self) -> Self {
        Id {
            original: self.original.clone(),
            lower_case: self.lower_case.clone(),
            span: self.span.clone(),
        }
    }
}

impl PartialEq for Id {
    fn eq(&self, other: &Self) -> bool {
        self.lower_case == other.lower_case
    }
}
impl Eq for Id {}

impl Hash for Id {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.lower_case.hash(state);
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl Located for Id {
    fn span(&self) -> SourceSpan {
        self.span.clone()
    }
}
