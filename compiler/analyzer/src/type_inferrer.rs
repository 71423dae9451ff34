//! Derives the type of a literal.
//!
//! Untyped integer literals take the smallest of INT, DINT and LINT that
//! holds the value. Untyped real literals are REAL unless REAL cannot
//! represent them, in which case they are LREAL. The remaining literal
//! kinds have exactly one type.
use log::trace;
use plctype_dsl::{
    common::{ConstantKind, ElementaryTypeName, IntegerLiteral, LiteralError, RealLiteral},
    diagnostic::{Category, Diagnostic, Severity},
};
use plctype_problems::Problem;

use crate::options::AnalyzerOptions;
use crate::type_registry::{TypeRef, TypeRegistry};

/// Candidate types for an integer literal without a prefix, in order.
const INTEGER_LITERAL_TYPES: [ElementaryTypeName; 3] = [
    ElementaryTypeName::INT,
    ElementaryTypeName::DINT,
    ElementaryTypeName::LINT,
];

pub struct TypeInferrer<'r> {
    registry: &'r TypeRegistry,
    options: AnalyzerOptions,
}

impl<'r> TypeInferrer<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self::with_options(registry, AnalyzerOptions::default())
    }

    pub fn with_options(registry: &'r TypeRegistry, options: AnalyzerOptions) -> Self {
        Self { registry, options }
    }

    /// Returns the type of the literal.
    ///
    /// A literal that no type can represent, or whose prefix names a type
    /// of the wrong kind, is a type diagnostic.
    pub fn infer_type(&self, literal: &ConstantKind) -> Result<TypeRef<'r>, Diagnostic> {
        let inferred = match literal {
            ConstantKind::IntegerLiteral(lit) => self.infer_integer(lit),
            ConstantKind::RealLiteral(lit) => self.infer_real(lit),
            ConstantKind::Boolean(_) => Ok(self.registry.get_bool()),
            ConstantKind::CharacterString(_) => Ok(self.registry.get_string()),
            ConstantKind::Duration(_) => Ok(self.registry.get_time()),
            ConstantKind::Date(_) => Ok(self.registry.get_date()),
            ConstantKind::BitStringLiteral(lit) => {
                let type_name = lit
                    .data_type
                    .unwrap_or(self.options.default_bit_string_type);
                self.bounded(type_name, lit.value.value as i128, &lit.value.to_string())
            }
        };
        if let Ok(ty) = &inferred {
            trace!("Inferred {:?} for {:?}", ty, literal);
        }
        inferred
    }

    /// Recognizes the literal text and returns the type of the literal.
    ///
    /// The text comes from a token that the lexer accepted so text that is
    /// not a literal is an internal error. A literal too large to parse is
    /// out of range like any other.
    pub fn infer_text(&self, text: &str) -> Result<TypeRef<'r>, Diagnostic> {
        let literal = ConstantKind::try_from(text).map_err(|err| match err {
            LiteralError::OutOfRange(type_name) => out_of_range(type_name.name(), text),
            LiteralError::Invalid(reason) => {
                Diagnostic::problem(Problem::LiteralTextInvalid, Category::Internal)
                    .with_severity(Severity::Fatal)
                    .with_context("text", text)
                    .with_context("reason", reason)
            }
        })?;
        self.infer_type(&literal)
    }

    fn infer_integer(&self, lit: &IntegerLiteral) -> Result<TypeRef<'r>, Diagnostic> {
        let text = lit.value.to_string();
        let value = i128::try_from(&lit.value).map_err(|_| {
            out_of_range(
                lit.data_type.unwrap_or(ElementaryTypeName::LINT).name(),
                &text,
            )
        })?;

        match lit.data_type {
            Some(type_name) => self.bounded(type_name, value, &text),
            None => INTEGER_LITERAL_TYPES
                .iter()
                .map(|name| self.registry.elementary_type(*name))
                .find(|ty| ty.ty().contains_integer(value))
                .ok_or_else(|| out_of_range(ElementaryTypeName::LINT.name(), &text)),
        }
    }

    /// Returns the named integer or bit string type if it holds the value.
    fn bounded(
        &self,
        type_name: ElementaryTypeName,
        value: i128,
        text: &str,
    ) -> Result<TypeRef<'r>, Diagnostic> {
        let ty = self.registry.elementary_type(type_name);
        match ty.ty().integer_range() {
            Some(_) if ty.ty().contains_integer(value) => Ok(ty),
            Some(_) => Err(out_of_range(type_name.name(), text)),
            None => Err(mismatch(type_name.name(), text)),
        }
    }

    fn infer_real(&self, lit: &RealLiteral) -> Result<TypeRef<'r>, Diagnostic> {
        let text = lit.value.to_string();
        if !lit.value.is_finite() {
            return Err(out_of_range(
                lit.data_type.unwrap_or(ElementaryTypeName::LREAL).name(),
                &text,
            ));
        }

        match lit.data_type {
            Some(ElementaryTypeName::REAL) if !fits_real(lit.value, false) => {
                Err(out_of_range(ElementaryTypeName::REAL.name(), &text))
            }
            Some(type_name) if type_name.is_real() => Ok(self.registry.elementary_type(type_name)),
            Some(type_name) => Err(mismatch(type_name.name(), &text)),
            None if fits_real(lit.value, self.options.strict_real_precision) => {
                Ok(self.registry.get_real())
            }
            None => Ok(self.registry.get_lreal()),
        }
    }
}

/// Returns true if REAL represents the finite value.
///
/// Values beyond REAL's largest magnitude or below its smallest normal
/// magnitude need LREAL. With `strict`, the value must also survive a
/// round trip through REAL's shortest decimal representation.
fn fits_real(value: f64, strict: bool) -> bool {
    if value == 0.0 {
        return true;
    }
    let magnitude = value.abs();
    if magnitude > f32::MAX as f64 || magnitude < f32::MIN_POSITIVE as f64 {
        return false;
    }
    if !strict {
        return true;
    }
    format!("{}", value as f32)
        .parse::<f64>()
        .is_ok_and(|round_trip| round_trip == value)
}

fn out_of_range(type_name: &str, text: &str) -> Diagnostic {
    Diagnostic::type_error(Problem::LiteralOutOfRange, type_name, "").with_context("value", text)
}

fn mismatch(type_name: &str, text: &str) -> Diagnostic {
    Diagnostic::type_error(Problem::LiteralTypeMismatch, type_name, "").with_context("value", text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use plctype_dsl::common::{BitStringLiteral, Integer};
    use plctype_dsl::core::SourceSpan;
    use rstest::rstest;

    fn infer(text: &str) -> Result<String, String> {
        let registry = TypeRegistry::new();
        let inferrer = TypeInferrer::new(&registry);
        inferrer
            .infer_text(text)
            .map(|ty| ty.name().to_string())
            .map_err(|err| err.code)
    }

    #[rstest]
    #[case("123", "INT")]
    #[case("-32768", "INT")]
    #[case("32767", "INT")]
    #[case("32768", "DINT")]
    #[case("-32769", "DINT")]
    #[case("2147483647", "DINT")]
    #[case("2147483648", "LINT")]
    #[case("9223372036854775807", "LINT")]
    #[case("16#FF", "INT")]
    #[case("2#1010", "INT")]
    #[case("1_000_000", "DINT")]
    #[case("UINT#5", "UINT")]
    #[case("usint#255", "USINT")]
    #[case("BYTE#16#FF", "BYTE")]
    #[case("LREAL#1", "LREAL")]
    #[case("TRUE", "BOOL")]
    #[case("FALSE", "BOOL")]
    #[case("BOOL#1", "BOOL")]
    #[case("3.14", "REAL")]
    #[case("0.5", "REAL")]
    #[case("0.0", "REAL")]
    #[case("1.0E10", "REAL")]
    #[case("3.141592653589793", "LREAL")]
    #[case("1.0E39", "LREAL")]
    #[case("1.0E-40", "LREAL")]
    #[case("REAL#2.5", "REAL")]
    #[case("'abc'", "STRING")]
    #[case("T#5s", "TIME")]
    #[case("TIME#1h30m", "TIME")]
    #[case("D#2024-01-31", "DATE")]
    fn infer_text_when_literal_then_type(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(Ok(expected.to_string()), infer(text));
    }

    #[rstest]
    #[case("9223372036854775808", Problem::LiteralOutOfRange)]
    #[case("-9223372036854775809", Problem::LiteralOutOfRange)]
    #[case("USINT#256", Problem::LiteralOutOfRange)]
    #[case("UINT#-1", Problem::LiteralOutOfRange)]
    #[case("SINT#128", Problem::LiteralOutOfRange)]
    #[case("BYTE#256", Problem::LiteralOutOfRange)]
    #[case("REAL#1.0E39", Problem::LiteralOutOfRange)]
    #[case("REAL#1.0E-50", Problem::LiteralOutOfRange)]
    #[case("REAL#-1.0E-50", Problem::LiteralOutOfRange)]
    #[case("340282366920938463463374607431768211456", Problem::LiteralOutOfRange)]
    #[case("-340282366920938463463374607431768211456", Problem::LiteralOutOfRange)]
    #[case("16#1_0000_0000_0000_0000_0000_0000_0000_0000", Problem::LiteralOutOfRange)]
    #[case("WORD#16#1_0000_0000_0000_0000_0000_0000_0000_0000", Problem::LiteralOutOfRange)]
    #[case("T#9999999999999999d", Problem::LiteralOutOfRange)]
    #[case("T#18446744073709551615ns", Problem::LiteralOutOfRange)]
    #[case("T#99999999999999999999s", Problem::LiteralOutOfRange)]
    #[case("T#9223372036854775807s1s", Problem::LiteralOutOfRange)]
    #[case("DATE#5", Problem::LiteralTypeMismatch)]
    #[case("STRING#5", Problem::LiteralTypeMismatch)]
    #[case("INT#1.5", Problem::LiteralTypeMismatch)]
    #[case("not a literal", Problem::LiteralTextInvalid)]
    fn infer_text_when_invalid_then_problem(#[case] text: &str, #[case] expected: Problem) {
        assert_eq!(Err(expected.code().to_string()), infer(text));
    }

    #[test]
    fn infer_text_when_out_of_range_then_type_category() {
        let registry = TypeRegistry::new();
        let err = TypeInferrer::new(&registry)
            .infer_text("99999999999999999999")
            .unwrap_err();
        assert_eq!(Category::Type, err.category);
        assert_eq!(Severity::Error, err.severity);
    }

    #[test]
    fn infer_text_when_not_literal_then_internal_category() {
        let registry = TypeRegistry::new();
        let err = TypeInferrer::new(&registry).infer_text("%IX0.0").unwrap_err();
        assert_eq!(Category::Internal, err.category);
        assert!(err.is_fatal());
    }

    #[test]
    fn infer_type_when_integer_literal_then_canonical_instance() {
        let registry = TypeRegistry::new();
        let inferrer = TypeInferrer::new(&registry);
        let literal = ConstantKind::integer_literal("123").unwrap();
        assert_eq!(registry.get_int(), inferrer.infer_type(&literal).unwrap());
    }

    #[test]
    fn infer_type_when_bit_string_without_prefix_then_default() {
        let registry = TypeRegistry::new();
        let literal = ConstantKind::BitStringLiteral(BitStringLiteral {
            value: Integer {
                span: SourceSpan::default(),
                value: 0xFFFF,
            },
            data_type: None,
        });

        let default = TypeInferrer::new(&registry).infer_type(&literal).unwrap();
        assert_eq!(registry.get_lword(), default);

        let options = AnalyzerOptions::default()
            .with_default_bit_string_type(ElementaryTypeName::WORD);
        let word = TypeInferrer::with_options(&registry, options)
            .infer_type(&literal)
            .unwrap();
        assert_eq!(registry.get_word(), word);
    }

    #[test]
    fn infer_type_when_bit_string_wider_than_64_bits_then_out_of_range() {
        let registry = TypeRegistry::new();
        let literal = ConstantKind::BitStringLiteral(BitStringLiteral {
            value: Integer {
                span: SourceSpan::default(),
                value: u64::MAX as u128 + 1,
            },
            data_type: None,
        });
        let err = TypeInferrer::new(&registry).infer_type(&literal).unwrap_err();
        assert_eq!(Problem::LiteralOutOfRange.code(), err.code);
    }

    #[test]
    fn infer_type_when_relaxed_precision_then_real() {
        let registry = TypeRegistry::new();
        let options = AnalyzerOptions::default().with_strict_real_precision(false);
        let literal = ConstantKind::try_from("3.141592653589793").unwrap();
        let ty = TypeInferrer::with_options(&registry, options)
            .infer_type(&literal)
            .unwrap();
        assert_eq!(registry.get_real(), ty);
    }
}
