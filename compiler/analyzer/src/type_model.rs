//! Representation of the types that the typing core reasons about.
//!
//! A `Type` is an immutable value. Types are owned by the `TypeRegistry`
//! and everything else refers to them through a `TypeId` handle that the
//! registry issues. Two handles denote the same type exactly when their
//! identifiers are equal; structurally identical types registered under
//! different names remain distinct types.

use std::fmt;

use plctype_dsl::common::ElementaryTypeName;
use plctype_dsl::core::Id;

/// Handle to a type owned by a `TypeRegistry`.
///
/// The identifier is only meaningful for the registry that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub(crate) u32);

impl TypeId {
    pub(crate) fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Represents the size of a data type in bits, aligned to common byte boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteSized {
    /// 8-bit (1 byte) size
    B8,
    /// 16-bit (2 bytes) size
    B16,
    /// 32-bit (4 bytes) size
    B32,
    /// 64-bit (8 bytes) size
    B64,
}

impl ByteSized {
    pub fn bits(&self) -> u32 {
        match self {
            ByteSized::B8 => 8,
            ByteSized::B16 => 16,
            ByteSized::B32 => 32,
            ByteSized::B64 => 64,
        }
    }

    pub fn as_bytes(&self) -> u8 {
        match self {
            ByteSized::B8 => 1,
            ByteSized::B16 => 2,
            ByteSized::B32 => 4,
            ByteSized::B64 => 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signedness {
    Signed,
    Unsigned,
}

/// A named member of a structure.
#[derive(Debug, Clone, PartialEq)]
pub struct StructField {
    pub name: Id,
    pub field_type: TypeId,
}

/// A type in an IEC 61131-3 program.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// Boolean type (true/false)
    Bool,
    /// Integer with the specified bit width
    Integer {
        size: ByteSized,
        signedness: Signedness,
    },
    /// Floating-point number, B32 (REAL) or B64 (LREAL)
    Real { size: ByteSized },
    /// Single byte character string
    String,
    /// Time duration type
    TimeDuration,
    /// Calendar date type
    Date,
    /// Bit string (BYTE, WORD, DWORD, LWORD)
    BitString { size: ByteSized },
    /// Structure type containing ordered, named fields
    Struct { fields: Vec<StructField> },
    /// User-defined enumeration with ordered values
    Enumeration { values: Vec<Id> },
}

impl Type {
    pub fn signed(size: ByteSized) -> Self {
        Type::Integer {
            size,
            signedness: Signedness::Signed,
        }
    }

    pub fn unsigned(size: ByteSized) -> Self {
        Type::Integer {
            size,
            signedness: Signedness::Unsigned,
        }
    }

    /// Returns if the type is an integer type (signed or unsigned).
    pub fn is_integer(&self) -> bool {
        matches!(self, Type::Integer { .. })
    }

    pub fn is_signed_integer(&self) -> bool {
        matches!(
            self,
            Type::Integer {
                signedness: Signedness::Signed,
                ..
            }
        )
    }

    pub fn is_unsigned_integer(&self) -> bool {
        matches!(
            self,
            Type::Integer {
                signedness: Signedness::Unsigned,
                ..
            }
        )
    }

    pub fn is_real(&self) -> bool {
        matches!(self, Type::Real { .. })
    }

    pub fn is_bit_string(&self) -> bool {
        matches!(self, Type::BitString { .. })
    }

    /// Returns if the type is numeric (integer or real).
    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_real()
    }

    pub fn is_struct(&self) -> bool {
        matches!(self, Type::Struct { .. })
    }

    pub fn is_enumeration(&self) -> bool {
        matches!(self, Type::Enumeration { .. })
    }

    /// Returns the inclusive range of values for integer and bit string
    /// types. Other types do not have an integer range.
    pub fn integer_range(&self) -> Option<(i128, i128)> {
        match self {
            Type::Integer {
                size,
                signedness: Signedness::Signed,
            } => {
                let half = 1i128 << (size.bits() - 1);
                Some((-half, half - 1))
            }
            Type::Integer {
                size,
                signedness: Signedness::Unsigned,
            }
            | Type::BitString { size } => Some((0, (1i128 << size.bits()) - 1)),
            _ => None,
        }
    }

    /// Returns true if the value is representable by this integer or bit
    /// string type.
    pub fn contains_integer(&self, value: i128) -> bool {
        self.integer_range()
            .is_some_and(|(min, max)| value >= min && value <= max)
    }

    /// Returns the largest finite magnitude of a real type.
    pub fn real_max(&self) -> Option<f64> {
        match self {
            Type::Real {
                size: ByteSized::B32,
            } => Some(f32::MAX as f64),
            Type::Real { .. } => Some(f64::MAX),
            _ => None,
        }
    }

    /// Gets the field of a structure by name (case-insensitive).
    pub fn field(&self, name: &Id) -> Option<&StructField> {
        match self {
            Type::Struct { fields } => fields.iter().find(|field| field.name == *name),
            _ => None,
        }
    }
}

impl From<ElementaryTypeName> for Type {
    fn from(value: ElementaryTypeName) -> Self {
        match value {
            ElementaryTypeName::BOOL => Type::Bool,
            ElementaryTypeName::SINT => Type::signed(ByteSized::B8),
            ElementaryTypeName::INT => Type::signed(ByteSized::B16),
            ElementaryTypeName::DINT => Type::signed(ByteSized::B32),
            ElementaryTypeName::LINT => Type::signed(ByteSized::B64),
            ElementaryTypeName::USINT => Type::unsigned(ByteSized::B8),
            ElementaryTypeName::UINT => Type::unsigned(ByteSized::B16),
            ElementaryTypeName::UDINT => Type::unsigned(ByteSized::B32),
            ElementaryTypeName::ULINT => Type::unsigned(ByteSized::B64),
            ElementaryTypeName::REAL => Type::Real {
                size: ByteSized::B32,
            },
            ElementaryTypeName::LREAL => Type::Real {
                size: ByteSized::B64,
            },
            ElementaryTypeName::TIME => Type::TimeDuration,
            ElementaryTypeName::DATE => Type::Date,
            ElementaryTypeName::STRING => Type::String,
            ElementaryTypeName::BYTE => Type::BitString {
                size: ByteSized::B8,
            },
            ElementaryTypeName::WORD => Type::BitString {
                size: ByteSized::B16,
            },
            ElementaryTypeName::DWORD => Type::BitString {
                size: ByteSized::B32,
            },
            ElementaryTypeName::LWORD => Type::BitString {
                size: ByteSized::B64,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ElementaryTypeName::SINT, -128, 127)]
    #[case(ElementaryTypeName::INT, -32768, 32767)]
    #[case(ElementaryTypeName::DINT, i32::MIN as i128, i32::MAX as i128)]
    #[case(ElementaryTypeName::LINT, i64::MIN as i128, i64::MAX as i128)]
    #[case(ElementaryTypeName::USINT, 0, 255)]
    #[case(ElementaryTypeName::ULINT, 0, u64::MAX as i128)]
    #[case(ElementaryTypeName::WORD, 0, 65535)]
    fn integer_range_when_elementary_then_matches_width(
        #[case] name: ElementaryTypeName,
        #[case] min: i128,
        #[case] max: i128,
    ) {
        assert_eq!(Some((min, max)), Type::from(name).integer_range());
    }

    #[test]
    fn integer_range_when_real_then_none() {
        assert_eq!(None, Type::from(ElementaryTypeName::REAL).integer_range());
    }

    #[test]
    fn contains_integer_when_one_past_max_then_false() {
        let int = Type::from(ElementaryTypeName::INT);
        assert!(int.contains_integer(32767));
        assert!(!int.contains_integer(32768));
    }

    #[test]
    fn field_when_different_case_then_found() {
        let ty = Type::Struct {
            fields: vec![StructField {
                name: Id::from("Speed"),
                field_type: TypeId(2),
            }],
        };
        assert_eq!(Some(TypeId(2)), ty.field(&Id::from("SPEED")).map(|f| f.field_type));
        assert!(ty.field(&Id::from("torque")).is_none());
    }
}
