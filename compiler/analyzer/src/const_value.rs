//! The result of evaluating a constant at compile time.
use std::fmt;

use plctype_dsl::common::{Boolean, ConstantKind};
use plctype_dsl::diagnostic::Diagnostic;
use time::Duration;

use crate::type_inferrer::TypeInferrer;
use crate::type_model::TypeId;

/// The value of a constant tagged by its kind.
#[derive(Debug, Clone)]
pub enum ConstPayload {
    Int(i64),
    UInt(u64),
    Real(f64),
    Bool(bool),
    String(String),
    Duration(Duration),
}

impl ConstPayload {
    /// The value as an integer, when the payload is an integer.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            ConstPayload::Int(value) => Some(*value as i128),
            ConstPayload::UInt(value) => Some(*value as i128),
            _ => None,
        }
    }

    /// The value as a float, when the payload is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConstPayload::Int(value) => Some(*value as f64),
            ConstPayload::UInt(value) => Some(*value as f64),
            ConstPayload::Real(value) => Some(*value),
            _ => None,
        }
    }
}

// Reals compare by bit pattern so that folding the same input twice
// always produces equal values, including for NaN.
impl PartialEq for ConstPayload {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ConstPayload::Int(a), ConstPayload::Int(b)) => a == b,
            (ConstPayload::UInt(a), ConstPayload::UInt(b)) => a == b,
            (ConstPayload::Real(a), ConstPayload::Real(b)) => a.to_bits() == b.to_bits(),
            (ConstPayload::Bool(a), ConstPayload::Bool(b)) => a == b,
            (ConstPayload::String(a), ConstPayload::String(b)) => a == b,
            (ConstPayload::Duration(a), ConstPayload::Duration(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for ConstPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstPayload::Int(value) => write!(f, "{}", value),
            ConstPayload::UInt(value) => write!(f, "{}", value),
            ConstPayload::Real(value) => write!(f, "{}", value),
            ConstPayload::Bool(value) => write!(f, "{}", value),
            ConstPayload::String(value) => write!(f, "'{}'", value),
            ConstPayload::Duration(value) => write!(f, "{}", value),
        }
    }
}

/// A folded constant.
///
/// An overflowed constant has no value; the shape of the enumeration
/// means there is nothing to extract from it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ConstValue {
    /// The value is not known at compile time.
    #[default]
    Unknown,
    Value {
        payload: ConstPayload,
        type_id: TypeId,
    },
    /// Evaluation left the range of the type.
    Overflow,
}

impl ConstValue {
    pub fn value(payload: ConstPayload, type_id: TypeId) -> Self {
        ConstValue::Value { payload, type_id }
    }

    /// Creates the constant for a literal typed with the inferrer.
    pub fn of_literal(
        literal: &ConstantKind,
        inferrer: &TypeInferrer<'_>,
    ) -> Result<Self, Diagnostic> {
        let ty = inferrer.infer_type(literal)?;
        let payload = match literal {
            ConstantKind::IntegerLiteral(lit) => {
                // Inference already checked the value fits the type.
                let value = i128::try_from(&lit.value).unwrap_or_default();
                match ty.ty().is_unsigned_integer() {
                    true => ConstPayload::UInt(value as u64),
                    false => ConstPayload::Int(value as i64),
                }
            }
            ConstantKind::RealLiteral(lit) => ConstPayload::Real(lit.value),
            ConstantKind::Boolean(lit) => ConstPayload::Bool(lit.value == Boolean::True),
            ConstantKind::CharacterString(lit) => {
                ConstPayload::String(lit.value.iter().collect())
            }
            ConstantKind::Duration(lit) => ConstPayload::Duration(lit.interval),
            ConstantKind::BitStringLiteral(lit) => ConstPayload::UInt(lit.value.value as u64),
            ConstantKind::Date(_) => return Ok(ConstValue::Unknown),
        };
        Ok(ConstValue::value(payload, ty.id()))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, ConstValue::Unknown)
    }

    pub fn is_value(&self) -> bool {
        matches!(self, ConstValue::Value { .. })
    }

    pub fn is_overflow(&self) -> bool {
        matches!(self, ConstValue::Overflow)
    }

    pub fn payload(&self) -> Option<&ConstPayload> {
        match self {
            ConstValue::Value { payload, .. } => Some(payload),
            _ => None,
        }
    }

    pub fn type_id(&self) -> Option<TypeId> {
        match self {
            ConstValue::Value { type_id, .. } => Some(*type_id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_registry::TypeRegistry;

    #[test]
    fn of_literal_when_integer_then_value_with_int() {
        let registry = TypeRegistry::new();
        let inferrer = TypeInferrer::new(&registry);
        let literal = ConstantKind::try_from("42").unwrap();

        let value = ConstValue::of_literal(&literal, &inferrer).unwrap();

        assert_eq!(
            ConstValue::value(ConstPayload::Int(42), registry.get_int().id()),
            value
        );
    }

    #[test]
    fn of_literal_when_unsigned_prefix_then_uint_payload() {
        let registry = TypeRegistry::new();
        let inferrer = TypeInferrer::new(&registry);
        let literal = ConstantKind::try_from("ULINT#18446744073709551615").unwrap();

        let value = ConstValue::of_literal(&literal, &inferrer).unwrap();

        assert_eq!(Some(&ConstPayload::UInt(u64::MAX)), value.payload());
        assert_eq!(Some(registry.get_ulint().id()), value.type_id());
    }

    #[test]
    fn of_literal_when_out_of_range_then_err() {
        let registry = TypeRegistry::new();
        let inferrer = TypeInferrer::new(&registry);
        let literal = ConstantKind::try_from("USINT#300").unwrap();
        assert!(ConstValue::of_literal(&literal, &inferrer).is_err());
    }

    #[test]
    fn overflow_then_no_payload() {
        assert!(ConstValue::Overflow.payload().is_none());
        assert!(ConstValue::Overflow.type_id().is_none());
    }

    #[test]
    fn payload_eq_when_nan_then_equal_to_itself() {
        assert_eq!(ConstPayload::Real(f64::NAN), ConstPayload::Real(f64::NAN));
        assert_ne!(ConstPayload::Real(0.0), ConstPayload::Real(-0.0));
    }
}
