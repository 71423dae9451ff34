//! Options that adjust how literals are typed.
use plctype_dsl::common::ElementaryTypeName;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyzerOptions {
    /// The type of a bit string literal written without a type prefix.
    pub default_bit_string_type: ElementaryTypeName,
    /// When set, a real literal is typed REAL only if REAL's shortest
    /// decimal form reproduces the literal exactly.
    pub strict_real_precision: bool,
}

impl AnalyzerOptions {
    pub fn with_default_bit_string_type(mut self, type_name: ElementaryTypeName) -> Self {
        self.default_bit_string_type = type_name;
        self
    }

    pub fn with_strict_real_precision(mut self, strict: bool) -> Self {
        self.strict_real_precision = strict;
        self
    }
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            default_bit_string_type: ElementaryTypeName::LWORD,
            strict_real_precision: true,
        }
    }
}
