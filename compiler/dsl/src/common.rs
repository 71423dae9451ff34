//! Provides definitions of objects from IEC 61131-3 common elements.
//!
//! See section 2.
use core::str::FromStr;
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::num::{IntErrorKind, ParseIntError};

use time::{Date, Month};

use crate::core::{Id, Located, SourceSpan};
use crate::time::{DateLiteral, DurationLiteral};

/// Container for elementary constants.
///
/// See section 2.2.
#[derive(PartialEq, Clone, Debug)]
pub enum ConstantKind {
    IntegerLiteral(IntegerLiteral),
    RealLiteral(RealLiteral),
    Boolean(BooleanLiteral),
    CharacterString(CharacterStringLiteral),
    Duration(DurationLiteral),
    Date(DateLiteral),
    BitStringLiteral(BitStringLiteral),
}

impl ConstantKind {
    pub fn integer_literal(value: &str) -> Result<Self, LiteralError> {
        Ok(Self::IntegerLiteral(IntegerLiteral {
            value: SignedInteger::new(value, SourceSpan::default())?,
            data_type: None,
        }))
    }

    /// Returns the explicit type prefix of the literal (for example
    /// `UINT` in `UINT#5`), if the literal has one.
    pub fn data_type(&self) -> Option<ElementaryTypeName> {
        match self {
            ConstantKind::IntegerLiteral(lit) => lit.data_type,
            ConstantKind::RealLiteral(lit) => lit.data_type,
            ConstantKind::BitStringLiteral(lit) => lit.data_type,
            ConstantKind::Boolean(_)
            | ConstantKind::CharacterString(_)
            | ConstantKind::Duration(_)
            | ConstantKind::Date(_) => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Boolean {
    True,
    False,
}

// Numeric literals declared by 2.2.1. Numeric literals define
// how data is expressed and are distinct from but associated with
// data types.

/// Integer literal. The representation is of the largest possible integer
/// and later bound to smaller types depending on context.
#[derive(Debug, Clone, PartialEq)]
pub struct Integer {
    pub span: SourceSpan,
    /// The value in the maximum possible size. An integer is inherently
    /// an unsigned value.
    pub value: u128,
}

impl Located for Integer {
    fn span(&self) -> SourceSpan {
        self.span.clone()
    }
}

impl Integer {
    pub fn new(a: &str, span: SourceSpan) -> Result<Self, LiteralError> {
        let without_underscore: String = a.chars().filter(|c| *c != '_').collect();
        if without_underscore.is_empty() || !without_underscore.chars().all(|c| c.is_ascii_digit())
        {
            return Err(LiteralError::Invalid("dec"));
        }
        without_underscore
            .parse::<u128>()
            .map(|value| Integer { span, value })
            .map_err(|e| integer_error(e, ElementaryTypeName::LINT, "dec"))
    }

    /// Parses an integer written with a base prefix (`2#`, `8#` or `16#`).
    pub fn try_based(a: &str, span: SourceSpan) -> Result<Self, LiteralError> {
        let (radix, digits) = if let Some(digits) = a.strip_prefix("16#") {
            (16, digits)
        } else if let Some(digits) = a.strip_prefix("8#") {
            (8, digits)
        } else if let Some(digits) = a.strip_prefix("2#") {
            (2, digits)
        } else {
            return Err(LiteralError::Invalid("Non-based start"));
        };

        let (valid, remainder): (Vec<_>, Vec<_>) = digits
            .chars()
            .filter(|c| *c != '_')
            .partition(|c| c.is_digit(radix));
        if !remainder.is_empty() || valid.is_empty() {
            return Err(LiteralError::Invalid("Non-digit characters for base"));
        }
        let valid: String = valid.into_iter().collect();
        u128::from_str_radix(valid.as_str(), radix)
            .map(|value| Integer { span, value })
            .map_err(|e| integer_error(e, ElementaryTypeName::LINT, "based"))
    }
}

/// Maps a failure to parse digits. The digits were already checked so an
/// overflow means the literal does not fit `type_name`.
fn integer_error(
    err: ParseIntError,
    type_name: ElementaryTypeName,
    invalid: &'static str,
) -> LiteralError {
    match err.kind() {
        IntErrorKind::PosOverflow => LiteralError::OutOfRange(type_name),
        _ => LiteralError::Invalid(invalid),
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{}", self.value))
    }
}

#[derive(Debug)]
pub struct TryFromIntegerError();

/// Why the text of a literal was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralError {
    /// The text is not a literal.
    Invalid(&'static str),
    /// The text is a well formed literal with a magnitude that the named
    /// type cannot hold.
    OutOfRange(ElementaryTypeName),
}

impl From<&'static str> for LiteralError {
    fn from(reason: &'static str) -> Self {
        LiteralError::Invalid(reason)
    }
}

impl fmt::Display for LiteralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralError::Invalid(reason) => f.write_str(reason),
            LiteralError::OutOfRange(type_name) => write!(f, "out of range for {}", type_name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignedInteger {
    pub value: Integer,
    pub is_neg: bool,
}

impl SignedInteger {
    pub fn new(a: &str, span: SourceSpan) -> Result<Self, LiteralError> {
        match a.chars().next() {
            Some('+') => {
                let whole = a.get(1..).ok_or("int")?;
                Ok(Self {
                    value: Integer::new(whole, span)?,
                    is_neg: false,
                })
            }
            Some('-') => {
                let whole = a.get(1..).ok_or("int")?;
                Ok(Self {
                    value: Integer::new(whole, span)?,
                    is_neg: true,
                })
            }
            _ => Ok(Self {
                value: Integer::new(a, span)?,
                is_neg: false,
            }),
        }
    }

    pub fn positive(a: &str) -> Result<Self, LiteralError> {
        Ok(Self {
            value: Integer::new(a, SourceSpan::default())?,
            is_neg: false,
        })
    }

    pub fn negative(a: &str) -> Result<Self, LiteralError> {
        Ok(Self {
            value: Integer::new(a, SourceSpan::default())?,
            is_neg: true,
        })
    }
}

impl From<Integer> for SignedInteger {
    fn from(value: Integer) -> SignedInteger {
        SignedInteger {
            value,
            is_neg: false,
        }
    }
}

impl TryFrom<&SignedInteger> for i128 {
    type Error = TryFromIntegerError;
    fn try_from(value: &SignedInteger) -> Result<i128, Self::Error> {
        let magnitude: i128 = value
            .value
            .value
            .try_into()
            .map_err(|_e| TryFromIntegerError {})?;
        if value.is_neg {
            Ok(-magnitude)
        } else {
            Ok(magnitude)
        }
    }
}

impl fmt::Display for SignedInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_neg {
            f.write_fmt(format_args!("-{}", self.value))
        } else {
            f.write_fmt(format_args!("{}", self.value))
        }
    }
}

/// A signed integer literal with a optional type name.
///
/// See section 2.2.1.
#[derive(Debug, PartialEq, Clone)]
pub struct IntegerLiteral {
    pub value: SignedInteger,
    pub data_type: Option<ElementaryTypeName>,
}

/// The fixed point structure represents a fixed point number.
///
/// The structure keeps the whole and decimal parts as integers so that
/// we do not lose precision with floating point rounding.
#[derive(Debug, PartialEq, Clone)]
pub struct FixedPoint {
    pub span: SourceSpan,
    pub whole: u64,
    pub femptos: u64,
}

impl FixedPoint {
    pub const FRACTIONAL_UNITS: u64 = 1_000_000_000_000_000;

    pub fn parse(input: &str) -> Result<FixedPoint, LiteralError> {
        // IEC 61131 allows underscores in numbers so remove those before we try to parse.
        let value: String = input
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();

        match value.split_once('.') {
            Some((whole, decimal)) => {
                let whole = whole.parse::<u64>().map_err(|e| {
                    integer_error(e, ElementaryTypeName::TIME, "floating point whole not valid")
                })?;

                // Up to 15 digits after the decimal point fit without wrapping.
                if decimal.len() > 15 {
                    return Err(LiteralError::Invalid(
                        "floating point decimal excessive precision",
                    ));
                }

                let mut decimal = decimal.to_owned();
                decimal.push_str("0".repeat(15 - decimal.len()).as_str());

                let decimal = decimal
                    .parse::<u64>()
                    .map_err(|_e| "floating point decimal not valid")?;

                Ok(FixedPoint {
                    span: SourceSpan::default(),
                    whole,
                    femptos: decimal,
                })
            }
            None => Ok(FixedPoint {
                span: SourceSpan::default(),
                whole: value
                    .parse::<u64>()
                    .map_err(|e| integer_error(e, ElementaryTypeName::TIME, "u64"))?,
                femptos: 0,
            }),
        }
    }
}

/// See section 2.2.1.
#[derive(Debug, PartialEq, Clone)]
pub struct RealLiteral {
    pub value: f64,
    pub data_type: Option<ElementaryTypeName>,
}

impl RealLiteral {
    pub fn try_parse(a: &str, tn: Option<ElementaryTypeName>) -> Result<Self, &'static str> {
        let (r, remainder): (Vec<_>, Vec<_>) = a.chars().filter(|c| *c != '_').partition(|c| {
            c.is_ascii_digit() || matches!(c, '.' | 'E' | 'e' | '-' | '+')
        });
        if !remainder.is_empty() {
            return Err("Non-real characters");
        }
        let r: String = r.into_iter().collect();
        f64::from_str(r.as_str())
            .map(|value| RealLiteral {
                value,
                data_type: tn,
            })
            .map_err(|_e| "real")
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BooleanLiteral {
    pub value: Boolean,
}

impl BooleanLiteral {
    pub fn new(value: Boolean) -> Self {
        Self { value }
    }
}

// See section 2.2.2
#[derive(Debug, PartialEq, Clone)]
pub struct CharacterStringLiteral {
    pub value: Vec<char>,
}

impl CharacterStringLiteral {
    pub fn new(value: Vec<char>) -> Self {
        Self { value }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct BitStringLiteral {
    pub value: Integer,
    pub data_type: Option<ElementaryTypeName>,
}

/// Implements a type identifier.
///
/// Types are all identifiers but we use a separate structure
/// because it is convenient to treat types and other identifiers
/// separately.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeName {
    pub name: Id,
}

impl TypeName {
    /// Converts a `&str` into an `Identifier`.
    pub fn from(str: &str) -> Self {
        Self {
            name: Id::from(str),
        }
    }

    pub fn from_id(name: &Id) -> Self {
        Self { name: name.clone() }
    }
}

impl Eq for TypeName {}

impl Hash for TypeName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl Located for TypeName {
    fn span(&self) -> SourceSpan {
        self.name.span()
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{}", &self.name))
    }
}

/// Elementary type names that the typing core knows about.
///
/// See section 2.3.1.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum ElementaryTypeName {
    BOOL,
    SINT,
    INT,
    DINT,
    LINT,
    USINT,
    UINT,
    UDINT,
    ULINT,
    REAL,
    LREAL,
    TIME,
    DATE,
    STRING,
    BYTE,
    WORD,
    DWORD,
    LWORD,
}

impl ElementaryTypeName {
    pub const ALL: [ElementaryTypeName; 18] = [
        ElementaryTypeName::BOOL,
        ElementaryTypeName::SINT,
        ElementaryTypeName::INT,
        ElementaryTypeName::DINT,
        ElementaryTypeName::LINT,
        ElementaryTypeName::USINT,
        ElementaryTypeName::UINT,
        ElementaryTypeName::UDINT,
        ElementaryTypeName::ULINT,
        ElementaryTypeName::REAL,
        ElementaryTypeName::LREAL,
        ElementaryTypeName::TIME,
        ElementaryTypeName::DATE,
        ElementaryTypeName::STRING,
        ElementaryTypeName::BYTE,
        ElementaryTypeName::WORD,
        ElementaryTypeName::DWORD,
        ElementaryTypeName::LWORD,
    ];

    /// The canonical (upper case) name of the type.
    pub fn name(&self) -> &'static str {
        match self {
            ElementaryTypeName::BOOL => "BOOL",
            ElementaryTypeName::SINT => "SINT",
            ElementaryTypeName::INT => "INT",
            ElementaryTypeName::DINT => "DINT",
            ElementaryTypeName::LINT => "LINT",
            ElementaryTypeName::USINT => "USINT",
            ElementaryTypeName::UINT => "UINT",
            ElementaryTypeName::UDINT => "UDINT",
            ElementaryTypeName::ULINT => "ULINT",
            ElementaryTypeName::REAL => "REAL",
            ElementaryTypeName::LREAL => "LREAL",
            ElementaryTypeName::TIME => "TIME",
            ElementaryTypeName::DATE => "DATE",
            ElementaryTypeName::STRING => "STRING",
            ElementaryTypeName::BYTE => "BYTE",
            ElementaryTypeName::WORD => "WORD",
            ElementaryTypeName::DWORD => "DWORD",
            ElementaryTypeName::LWORD => "LWORD",
        }
    }

    pub fn as_id(&self) -> Id {
        Id::from(self.name())
    }

    /// Returns the elementary type with the name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        ElementaryTypeName::ALL
            .iter()
            .find(|candidate| candidate.name().eq_ignore_ascii_case(name))
            .copied()
    }

    pub fn is_signed_integer(&self) -> bool {
        matches!(
            self,
            ElementaryTypeName::SINT
                | ElementaryTypeName::INT
                | ElementaryTypeName::DINT
                | ElementaryTypeName::LINT
        )
    }

    pub fn is_unsigned_integer(&self) -> bool {
        matches!(
            self,
            ElementaryTypeName::USINT
                | ElementaryTypeName::UINT
                | ElementaryTypeName::UDINT
                | ElementaryTypeName::ULINT
        )
    }

    pub fn is_real(&self) -> bool {
        matches!(self, ElementaryTypeName::REAL | ElementaryTypeName::LREAL)
    }

    pub fn is_bit_string(&self) -> bool {
        matches!(
            self,
            ElementaryTypeName::BYTE
                | ElementaryTypeName::WORD
                | ElementaryTypeName::DWORD
                | ElementaryTypeName::LWORD
        )
    }
}

impl fmt::Display for ElementaryTypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<ElementaryTypeName> for Id {
    fn from(value: ElementaryTypeName) -> Id {
        value.as_id()
    }
}

impl From<ElementaryTypeName> for TypeName {
    fn from(value: ElementaryTypeName) -> TypeName {
        TypeName::from_id(&value.as_id())
    }
}

/// Data type declarations (the content of a `TYPE ... END_TYPE` block).
///
/// See section 2.3.3.
#[derive(Clone, Debug, PartialEq)]
pub enum DataTypeDeclarationKind {
    /// A new name for an existing type, e.g. `TYPE COUNTER : DINT; END_TYPE`.
    Simple(SimpleDeclaration),
    Enumeration(EnumerationDeclaration),
    Structure(StructureDeclaration),
}

impl DataTypeDeclarationKind {
    pub fn type_name(&self) -> &TypeName {
        match self {
            DataTypeDeclarationKind::Simple(decl) => &decl.type_name,
            DataTypeDeclarationKind::Enumeration(decl) => &decl.type_name,
            DataTypeDeclarationKind::Structure(decl) => &decl.type_name,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimpleDeclaration {
    pub type_name: TypeName,
    pub base_type_name: TypeName,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnumerationDeclaration {
    pub type_name: TypeName,
    pub values: Vec<Id>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StructureDeclaration {
    pub type_name: TypeName,
    pub elements: Vec<StructureElementDeclaration>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StructureElementDeclaration {
    pub name: Id,
    pub type_name: TypeName,
}

lazy_static! {
    static ref BOOLEAN: Regex = Regex::new(r"^(?i)(TRUE|FALSE)$").unwrap();
    static ref CHARACTER_STRING: Regex = Regex::new(r"^'(.*)'$").unwrap();
    static ref DURATION: Regex = Regex::new(r"^(?i)(?:T|TIME)#(-)?([0-9_.a-z]+)$").unwrap();
    static ref DURATION_PART: Regex =
        Regex::new(r"(?i)([0-9]+(?:\.[0-9]+)?)(ms|us|ns|d|h|m|s)_?").unwrap();
    static ref DATE: Regex =
        Regex::new(r"^(?i)(?:D|DATE)#([0-9]{4})-([0-9]{1,2})-([0-9]{1,2})$").unwrap();
    static ref TYPED: Regex = Regex::new(r"^([A-Za-z]+)#(.+)$").unwrap();
    static ref REAL: Regex =
        Regex::new(r"^[+-]?[0-9][0-9_]*(?:\.[0-9][0-9_]*(?:[eE][+-]?[0-9]+)?|[eE][+-]?[0-9]+)$")
            .unwrap();
    static ref DECIMAL: Regex = Regex::new(r"^[+-]?[0-9][0-9_]*$").unwrap();
}

/// Recognizes the text of a literal token as written in a source file.
///
/// This accepts the forms that the lexer produces for elementary constants:
/// decimal and based integers, reals, booleans, single-byte strings,
/// durations, dates and typed literals such as `UINT#5` or `BYTE#16#FF`.
impl TryFrom<&str> for ConstantKind {
    type Error = LiteralError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let value = value.trim();

        if BOOLEAN.is_match(value) {
            let literal = match value.eq_ignore_ascii_case("TRUE") {
                true => Boolean::True,
                false => Boolean::False,
            };
            return Ok(ConstantKind::Boolean(BooleanLiteral::new(literal)));
        }

        if let Some(cap) = CHARACTER_STRING.captures(value) {
            let text = cap[1].replace("$'", "'").replace("$$", "$");
            return Ok(ConstantKind::CharacterString(CharacterStringLiteral::new(
                text.chars().collect(),
            )));
        }

        if let Some(cap) = DURATION.captures(value) {
            let duration = parse_duration(&cap[2])?;
            return match cap.get(1) {
                Some(_) => Ok(ConstantKind::Duration(duration.negated())),
                None => Ok(ConstantKind::Duration(duration)),
            };
        }

        if let Some(cap) = DATE.captures(value) {
            let year = cap[1].parse::<i32>().map_err(|_e| "date year")?;
            let month = cap[2].parse::<u8>().map_err(|_e| "date month")?;
            let month = Month::try_from(month).map_err(|_e| "date month")?;
            let day = cap[3].parse::<u8>().map_err(|_e| "date day")?;
            let date = Date::from_calendar_date(year, month, day).map_err(|_e| "date")?;
            return Ok(ConstantKind::Date(DateLiteral::new(date)));
        }

        match Integer::try_based(value, SourceSpan::default()) {
            Ok(integer) => {
                return Ok(ConstantKind::IntegerLiteral(IntegerLiteral {
                    value: SignedInteger::from(integer),
                    data_type: None,
                }));
            }
            Err(err @ LiteralError::OutOfRange(_)) => return Err(err),
            Err(LiteralError::Invalid(_)) => {}
        }

        if let Some(cap) = TYPED.captures(value) {
            let type_name = ElementaryTypeName::from_name(&cap[1]).ok_or("type prefix")?;
            let inner = match ConstantKind::try_from(&cap[2]) {
                Err(LiteralError::OutOfRange(_))
                    if type_name.is_real() && DECIMAL.is_match(&cap[2]) =>
                {
                    ConstantKind::RealLiteral(RealLiteral::try_parse(&cap[2], None)?)
                }
                Err(LiteralError::OutOfRange(_)) => {
                    return Err(LiteralError::OutOfRange(type_name))
                }
                other => other?,
            };
            return with_type_prefix(type_name, inner);
        }

        if REAL.is_match(value) {
            return RealLiteral::try_parse(value, None)
                .map(ConstantKind::RealLiteral)
                .map_err(LiteralError::from);
        }

        if DECIMAL.is_match(value) {
            return ConstantKind::integer_literal(value);
        }

        Err(LiteralError::Invalid("Not a literal"))
    }
}

fn parse_duration(text: &str) -> Result<DurationLiteral, LiteralError> {
    let mut consumed = 0;
    let mut total: Option<DurationLiteral> = None;
    for cap in DURATION_PART.captures_iter(text) {
        let whole = cap.get(0).ok_or("duration")?;
        if whole.start() != consumed {
            return Err(LiteralError::Invalid("duration"));
        }
        consumed = whole.end();

        let amount = FixedPoint::parse(&cap[1])?;
        let part = match cap[2].to_ascii_lowercase().as_str() {
            "d" => DurationLiteral::days(amount)?,
            "h" => DurationLiteral::hours(amount)?,
            "m" => DurationLiteral::minutes(amount)?,
            "s" => DurationLiteral::seconds(amount)?,
            "ms" => DurationLiteral::milliseconds(amount)?,
            "us" => DurationLiteral::microseconds(amount)?,
            _ => DurationLiteral::nanoseconds(amount)?,
        };
        total = Some(match total {
            Some(sum) => sum.plus(part)?,
            None => part,
        });
    }

    if consumed != text.len() {
        return Err(LiteralError::Invalid("duration"));
    }
    total.ok_or(LiteralError::Invalid("duration"))
}

/// Attaches a type prefix to the literal that follows it. A prefix from a
/// different family than the literal is kept so that type inference can
/// report the mismatch.
fn with_type_prefix(
    type_name: ElementaryTypeName,
    inner: ConstantKind,
) -> Result<ConstantKind, LiteralError> {
    match inner {
        ConstantKind::IntegerLiteral(lit) if type_name.is_real() => {
            let magnitude = lit.value.value.value as f64;
            let value = if lit.value.is_neg {
                -magnitude
            } else {
                magnitude
            };
            Ok(ConstantKind::RealLiteral(RealLiteral {
                value,
                data_type: Some(type_name),
            }))
        }
        ConstantKind::IntegerLiteral(lit) if type_name.is_bit_string() && !lit.value.is_neg => {
            Ok(ConstantKind::BitStringLiteral(BitStringLiteral {
                value: lit.value.value,
                data_type: Some(type_name),
            }))
        }
        ConstantKind::IntegerLiteral(lit)
            if type_name == ElementaryTypeName::BOOL
                && !lit.value.is_neg
                && lit.value.value.value <= 1 =>
        {
            let value = match lit.value.value.value {
                0 => Boolean::False,
                _ => Boolean::True,
            };
            Ok(ConstantKind::Boolean(BooleanLiteral::new(value)))
        }
        ConstantKind::IntegerLiteral(lit) => Ok(ConstantKind::IntegerLiteral(IntegerLiteral {
            value: lit.value,
            data_type: Some(type_name),
        })),
        ConstantKind::RealLiteral(lit) => Ok(ConstantKind::RealLiteral(RealLiteral {
            value: lit.value,
            data_type: Some(type_name),
        })),
        ConstantKind::Boolean(lit) if type_name == ElementaryTypeName::BOOL => {
            Ok(ConstantKind::Boolean(lit))
        }
        _ => Err(LiteralError::Invalid("type prefix")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use time::Duration;

    fn integer_value(kind: &ConstantKind) -> Option<i128> {
        match kind {
            ConstantKind::IntegerLiteral(lit) => i128::try_from(&lit.value).ok(),
            _ => None,
        }
    }

    #[test]
    fn try_from_when_decimal_with_underscores_then_integer() {
        let kind = ConstantKind::try_from("1_000").unwrap();
        assert_eq!(Some(1000), integer_value(&kind));
    }

    #[test]
    fn try_from_when_negative_decimal_then_negative_integer() {
        let kind = ConstantKind::try_from("-7").unwrap();
        assert_eq!(Some(-7), integer_value(&kind));
    }

    #[test]
    fn try_from_when_hex_then_integer() {
        let kind = ConstantKind::try_from("16#FF").unwrap();
        assert_eq!(Some(255), integer_value(&kind));
    }

    #[test]
    fn try_from_when_binary_with_invalid_digit_then_err() {
        assert!(ConstantKind::try_from("2#1012").is_err());
    }

    #[test]
    fn try_from_when_real_with_exponent_then_real() {
        let kind = ConstantKind::try_from("1.5E3").unwrap();
        assert_eq!(
            ConstantKind::RealLiteral(RealLiteral {
                value: 1500.0,
                data_type: None
            }),
            kind
        );
    }

    #[test]
    fn try_from_when_boolean_any_case_then_boolean() {
        assert_eq!(
            ConstantKind::Boolean(BooleanLiteral::new(Boolean::True)),
            ConstantKind::try_from("true").unwrap()
        );
    }

    #[test]
    fn try_from_when_string_with_escape_then_unescaped() {
        assert_eq!(
            ConstantKind::CharacterString(CharacterStringLiteral::new("it's".chars().collect())),
            ConstantKind::try_from("'it$'s'").unwrap()
        );
    }

    #[test]
    fn try_from_when_duration_with_parts_then_sum() {
        let kind = ConstantKind::try_from("T#1h30m").unwrap();
        match kind {
            ConstantKind::Duration(lit) => assert_eq!(Duration::minutes(90), lit.interval),
            _ => panic!("expected duration"),
        }
    }

    #[test]
    fn try_from_when_duration_with_garbage_then_err() {
        assert!(ConstantKind::try_from("T#5x").is_err());
    }

    #[test]
    fn try_from_when_date_then_date() {
        let kind = ConstantKind::try_from("D#2024-01-31").unwrap();
        let expected = Date::from_calendar_date(2024, Month::January, 31).unwrap();
        assert_eq!(ConstantKind::Date(DateLiteral::new(expected)), kind);
    }

    #[test]
    fn try_from_when_typed_integer_then_has_data_type() {
        let kind = ConstantKind::try_from("UINT#5").unwrap();
        assert_eq!(Some(ElementaryTypeName::UINT), kind.data_type());
    }

    #[test]
    fn try_from_when_typed_bit_string_then_bit_string() {
        let kind = ConstantKind::try_from("byte#16#0F").unwrap();
        assert_eq!(
            ConstantKind::BitStringLiteral(BitStringLiteral {
                value: Integer {
                    span: SourceSpan::default(),
                    value: 15
                },
                data_type: Some(ElementaryTypeName::BYTE)
            }),
            kind
        );
    }

    #[test]
    fn try_from_when_unknown_prefix_then_err() {
        assert!(ConstantKind::try_from("FOO#5").is_err());
    }

    #[test]
    fn elementary_type_name_from_name_ignores_case() {
        assert_eq!(
            Some(ElementaryTypeName::LWORD),
            ElementaryTypeName::from_name("lword")
        );
        assert_eq!(None, ElementaryTypeName::from_name("WSTRING"));
    }

    #[test]
    fn try_from_when_decimal_above_u128_then_out_of_range() {
        assert_eq!(
            Err(LiteralError::OutOfRange(ElementaryTypeName::LINT)),
            ConstantKind::try_from("340282366920938463463374607431768211456")
        );
    }

    #[test]
    fn try_from_when_hex_longer_than_u128_then_out_of_range() {
        let text = format!("16#1{}", "0".repeat(32));
        assert_eq!(
            Err(LiteralError::OutOfRange(ElementaryTypeName::LINT)),
            ConstantKind::try_from(text.as_str())
        );
    }

    #[test]
    fn try_from_when_typed_hex_longer_than_u128_then_out_of_range_of_prefix() {
        let text = format!("LWORD#16#{}", "F".repeat(33));
        assert_eq!(
            Err(LiteralError::OutOfRange(ElementaryTypeName::LWORD)),
            ConstantKind::try_from(text.as_str())
        );
    }

    #[test]
    fn try_from_when_lreal_prefix_on_decimal_above_u128_then_real() {
        let text = format!("LREAL#1{}", "0".repeat(40));
        assert_eq!(
            ConstantKind::RealLiteral(RealLiteral {
                value: 1.0E40,
                data_type: Some(ElementaryTypeName::LREAL)
            }),
            ConstantKind::try_from(text.as_str()).unwrap()
        );
    }

    #[test]
    fn try_from_when_hex_with_leading_zeros_then_integer() {
        let text = format!("16#{}1", "0".repeat(40));
        assert_eq!(Some(1), integer_value(&ConstantKind::try_from(text.as_str()).unwrap()));
    }

    #[test]
    fn try_from_when_not_literal_then_invalid() {
        assert!(matches!(
            ConstantKind::try_from("abc"),
            Err(LiteralError::Invalid(_))
        ));
    }

    #[test]
    fn fixed_point_parse_when_whole_above_u64_then_out_of_range() {
        assert_eq!(
            Err(LiteralError::OutOfRange(ElementaryTypeName::TIME)),
            FixedPoint::parse("18446744073709551616")
        );
    }

    proptest! {
        #[test]
        fn try_from_when_any_decimal_then_same_value(value in any::<i64>()) {
            let kind = ConstantKind::try_from(value.to_string().as_str()).unwrap();
            prop_assert_eq!(Some(value as i128), integer_value(&kind));
        }

        #[test]
        fn try_from_when_any_hex_then_same_value(value in any::<u64>()) {
            let kind = ConstantKind::try_from(format!("16#{:X}", value).as_str()).unwrap();
            prop_assert_eq!(Some(value as i128), integer_value(&kind));
        }
    }
}
