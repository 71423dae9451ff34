//! The annotations that the legacy semantic pass attaches to symbols.
//!
//! The legacy pass identifies elementary types by static descriptors, one
//! per type name class. Descriptors are compared by their class name,
//! never by address.
use std::fmt;

use phf::phf_map;
use plctype_dsl::common::TypeName;
use plctype_dsl::core::Id;
use plctype_dsl::diagnostic::SourceLocation;

/// Static descriptor for one legacy elementary type name.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct LegacyTypeName {
    class_name: &'static str,
}

impl LegacyTypeName {
    pub const fn new(class_name: &'static str) -> Self {
        Self { class_name }
    }

    pub fn class_name(&self) -> &'static str {
        self.class_name
    }

    /// The canonical name of the corresponding type, if the legacy type
    /// has one.
    pub fn canonical_name(&self) -> Option<&'static str> {
        LEGACY_CANONICAL_NAMES.get(self.class_name).copied()
    }
}

impl fmt::Display for LegacyTypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name)
    }
}

pub static BOOL_TYPE_NAME: LegacyTypeName = LegacyTypeName::new("bool_type_name_c");
pub static SINT_TYPE_NAME: LegacyTypeName = LegacyTypeName::new("sint_type_name_c");
pub static INT_TYPE_NAME: LegacyTypeName = LegacyTypeName::new("int_type_name_c");
pub static DINT_TYPE_NAME: LegacyTypeName = LegacyTypeName::new("dint_type_name_c");
pub static LINT_TYPE_NAME: LegacyTypeName = LegacyTypeName::new("lint_type_name_c");
pub static USINT_TYPE_NAME: LegacyTypeName = LegacyTypeName::new("usint_type_name_c");
pub static UINT_TYPE_NAME: LegacyTypeName = LegacyTypeName::new("uint_type_name_c");
pub static UDINT_TYPE_NAME: LegacyTypeName = LegacyTypeName::new("udint_type_name_c");
pub static ULINT_TYPE_NAME: LegacyTypeName = LegacyTypeName::new("ulint_type_name_c");
pub static REAL_TYPE_NAME: LegacyTypeName = LegacyTypeName::new("real_type_name_c");
pub static LREAL_TYPE_NAME: LegacyTypeName = LegacyTypeName::new("lreal_type_name_c");
pub static TIME_TYPE_NAME: LegacyTypeName = LegacyTypeName::new("time_type_name_c");
pub static DATE_TYPE_NAME: LegacyTypeName = LegacyTypeName::new("date_type_name_c");
pub static STRING_TYPE_NAME: LegacyTypeName = LegacyTypeName::new("string_type_name_c");
pub static BYTE_TYPE_NAME: LegacyTypeName = LegacyTypeName::new("byte_type_name_c");
pub static WORD_TYPE_NAME: LegacyTypeName = LegacyTypeName::new("word_type_name_c");
pub static DWORD_TYPE_NAME: LegacyTypeName = LegacyTypeName::new("dword_type_name_c");
pub static LWORD_TYPE_NAME: LegacyTypeName = LegacyTypeName::new("lword_type_name_c");

// Legacy types without a counterpart in the typing core.
pub static TOD_TYPE_NAME: LegacyTypeName = LegacyTypeName::new("tod_type_name_c");
pub static DT_TYPE_NAME: LegacyTypeName = LegacyTypeName::new("dt_type_name_c");
pub static WSTRING_TYPE_NAME: LegacyTypeName = LegacyTypeName::new("wstring_type_name_c");
pub static SAFEINT_TYPE_NAME: LegacyTypeName = LegacyTypeName::new("safeint_type_name_c");
pub static INVALID_TYPE_NAME: LegacyTypeName = LegacyTypeName::new("invalid_type_name_c");

static LEGACY_CANONICAL_NAMES: phf::Map<&'static str, &'static str> = phf_map! {
    "bool_type_name_c" => "BOOL",
    "sint_type_name_c" => "SINT",
    "int_type_name_c" => "INT",
    "dint_type_name_c" => "DINT",
    "lint_type_name_c" => "LINT",
    "usint_type_name_c" => "USINT",
    "uint_type_name_c" => "UINT",
    "udint_type_name_c" => "UDINT",
    "ulint_type_name_c" => "ULINT",
    "real_type_name_c" => "REAL",
    "lreal_type_name_c" => "LREAL",
    "time_type_name_c" => "TIME",
    "date_type_name_c" => "DATE",
    "string_type_name_c" => "STRING",
    "byte_type_name_c" => "BYTE",
    "word_type_name_c" => "WORD",
    "dword_type_name_c" => "DWORD",
    "lword_type_name_c" => "LWORD",
};

/// The datatype that the legacy pass assigned.
#[derive(Debug, Clone, PartialEq)]
pub enum LegacyDatatype {
    Elementary(&'static LegacyTypeName),
    /// A user-defined type referenced by name.
    Derived(TypeName),
}

impl fmt::Display for LegacyDatatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LegacyDatatype::Elementary(name) => write!(f, "{}", name),
            LegacyDatatype::Derived(name) => write!(f, "{}", name),
        }
    }
}

/// One slot of the legacy constant holder.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LegacyConstSlot<T> {
    #[default]
    Undefined,
    Valid(T),
    Overflow,
}

impl<T: Copy> LegacyConstSlot<T> {
    pub fn is_overflow(&self) -> bool {
        matches!(self, LegacyConstSlot::Overflow)
    }

    pub fn valid(&self) -> Option<T> {
        match self {
            LegacyConstSlot::Valid(value) => Some(*value),
            _ => None,
        }
    }
}

/// The legacy constant holder. Each numeric interpretation of the constant
/// is folded independently.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LegacyConstValue {
    pub int64: LegacyConstSlot<i64>,
    pub uint64: LegacyConstSlot<u64>,
    pub real64: LegacyConstSlot<f64>,
    pub bool: LegacyConstSlot<bool>,
}

impl LegacyConstValue {
    pub fn is_overflow(&self) -> bool {
        self.int64.is_overflow()
            || self.uint64.is_overflow()
            || self.real64.is_overflow()
            || self.bool.is_overflow()
    }
}

/// The kind of node a legacy symbol annotates.
#[derive(Debug, Clone, PartialEq)]
pub enum LegacyNode {
    /// A literal with the token text as written.
    Literal(String),
    Identifier(Id),
    Expression,
}

/// A symbol with the annotations of the legacy pass.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacySymbol {
    pub node: LegacyNode,
    pub datatype: Option<LegacyDatatype>,
    pub candidate_datatypes: Vec<LegacyDatatype>,
    pub const_value: LegacyConstValue,
    pub location: Option<SourceLocation>,
}

impl LegacySymbol {
    pub fn new(node: LegacyNode) -> Self {
        Self {
            node,
            datatype: None,
            candidate_datatypes: vec![],
            const_value: LegacyConstValue::default(),
            location: None,
        }
    }

    pub fn literal(text: &str) -> Self {
        Self::new(LegacyNode::Literal(text.to_string()))
    }

    pub fn with_datatype(mut self, datatype: LegacyDatatype) -> Self {
        self.datatype = Some(datatype);
        self
    }

    pub fn with_candidate(mut self, candidate: LegacyDatatype) -> Self {
        self.candidate_datatypes.push(candidate);
        self
    }

    pub fn with_const_value(mut self, const_value: LegacyConstValue) -> Self {
        self.const_value = const_value;
        self
    }

    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plctype_dsl::common::ElementaryTypeName;

    #[test]
    fn canonical_name_when_mapped_then_elementary_name() {
        for (legacy, name) in [
            (&INT_TYPE_NAME, ElementaryTypeName::INT),
            (&ULINT_TYPE_NAME, ElementaryTypeName::ULINT),
            (&LREAL_TYPE_NAME, ElementaryTypeName::LREAL),
            (&LWORD_TYPE_NAME, ElementaryTypeName::LWORD),
        ] {
            assert_eq!(Some(name.name()), legacy.canonical_name());
        }
    }

    #[test]
    fn canonical_name_when_unmapped_then_none() {
        assert_eq!(None, TOD_TYPE_NAME.canonical_name());
        assert_eq!(None, INVALID_TYPE_NAME.canonical_name());
    }

    #[test]
    fn legacy_datatype_eq_when_same_class_then_equal() {
        static COPY_OF_INT: LegacyTypeName = LegacyTypeName::new("int_type_name_c");
        assert_eq!(
            LegacyDatatype::Elementary(&INT_TYPE_NAME),
            LegacyDatatype::Elementary(&COPY_OF_INT)
        );
    }

    #[test]
    fn is_overflow_when_any_slot_overflows_then_true() {
        let value = LegacyConstValue {
            uint64: LegacyConstSlot::Overflow,
            ..Default::default()
        };
        assert!(value.is_overflow());
        assert!(!LegacyConstValue::default().is_overflow());
    }
}
