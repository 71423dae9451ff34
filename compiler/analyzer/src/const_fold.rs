//! Folds unary and binary operations on constants.
//!
//! Operands are first brought to their common type: the type on the
//! widening chain that both operands are assignable to. Operands from
//! unrelated chains do not fold. The result of integer arithmetic is
//! checked against the range of the common type and becomes `Overflow`
//! when it leaves that range.
use log::trace;

use crate::const_value::{ConstPayload, ConstValue};
use crate::type_model::Type;
use crate::type_registry::{TypeRef, TypeRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    And,
    Or,
    Xor,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOp {
    fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }
}

pub fn fold_unary(op: UnaryOp, value: &ConstValue, registry: &TypeRegistry) -> ConstValue {
    let (payload, ty) = match operand(value, registry) {
        Ok(operand) => operand,
        Err(status) => return status,
    };

    match (op, payload) {
        (UnaryOp::Neg, ConstPayload::Int(v)) => integer_result(-(*v as i128), ty),
        (UnaryOp::Neg, ConstPayload::Real(v)) => real_result(-v, ty),
        (UnaryOp::Not, ConstPayload::Bool(v)) => ConstValue::value(ConstPayload::Bool(!v), ty.id()),
        (UnaryOp::Not, ConstPayload::UInt(v)) if ty.ty().is_bit_string() => {
            let (_, max) = ty.ty().integer_range().unwrap_or((0, u64::MAX as i128));
            integer_result(!(*v as i128) & max, ty)
        }
        _ => ConstValue::Unknown,
    }
}

pub fn fold_binary(
    op: BinaryOp,
    lhs: &ConstValue,
    rhs: &ConstValue,
    registry: &TypeRegistry,
) -> ConstValue {
    if lhs.is_overflow() || rhs.is_overflow() {
        return ConstValue::Overflow;
    }
    let ((left, left_ty), (right, right_ty)) =
        match (operand(lhs, registry), operand(rhs, registry)) {
            (Ok(left), Ok(right)) => (left, right),
            _ => return ConstValue::Unknown,
        };

    let common = if left_ty.is_assignable_to(&right_ty) {
        right_ty
    } else if right_ty.is_assignable_to(&left_ty) {
        left_ty
    } else {
        trace!("No common type for {:?} and {:?}", left_ty, right_ty);
        return ConstValue::Unknown;
    };

    let folded = match common.ty() {
        Type::Integer { .. } | Type::BitString { .. } => {
            match (left.as_i128(), right.as_i128()) {
                (Some(a), Some(b)) => fold_integer(op, a, b, common, registry),
                _ => ConstValue::Unknown,
            }
        }
        Type::Real { .. } => match (left.as_f64(), right.as_f64()) {
            (Some(a), Some(b)) => fold_real(op, a, b, common, registry),
            _ => ConstValue::Unknown,
        },
        Type::Bool => match (left, right) {
            (ConstPayload::Bool(a), ConstPayload::Bool(b)) => fold_bool(op, *a, *b, registry),
            _ => ConstValue::Unknown,
        },
        Type::String => match (left, right, op) {
            (ConstPayload::String(a), ConstPayload::String(b), BinaryOp::Eq) => {
                bool_result(a == b, registry)
            }
            (ConstPayload::String(a), ConstPayload::String(b), BinaryOp::Ne) => {
                bool_result(a != b, registry)
            }
            _ => ConstValue::Unknown,
        },
        Type::TimeDuration => match (left, right) {
            (ConstPayload::Duration(a), ConstPayload::Duration(b)) => {
                fold_duration(op, *a, *b, common, registry)
            }
            _ => ConstValue::Unknown,
        },
        _ => ConstValue::Unknown,
    };
    trace!("Folded {:?} {:?} {:?} to {:?}", lhs, op, rhs, folded);
    folded
}

/// Resolves a constant to its payload and type, or the status that the
/// fold produces when the constant has no value.
fn operand<'a, 'r>(
    value: &'a ConstValue,
    registry: &'r TypeRegistry,
) -> Result<(&'a ConstPayload, TypeRef<'r>), ConstValue> {
    match value {
        ConstValue::Value { payload, type_id } => registry
            .get(*type_id)
            .map(|ty| (payload, ty))
            .ok_or(ConstValue::Unknown),
        ConstValue::Overflow => Err(ConstValue::Overflow),
        ConstValue::Unknown => Err(ConstValue::Unknown),
    }
}

fn fold_integer(
    op: BinaryOp,
    a: i128,
    b: i128,
    ty: TypeRef<'_>,
    registry: &TypeRegistry,
) -> ConstValue {
    if op.is_comparison() {
        return bool_result(compare(op, a.partial_cmp(&b)), registry);
    }
    let result = match op {
        BinaryOp::Add => a.checked_add(b),
        BinaryOp::Sub => a.checked_sub(b),
        BinaryOp::Mul => a.checked_mul(b),
        BinaryOp::Div => a.checked_div(b),
        BinaryOp::Mod => a.checked_rem(b),
        BinaryOp::And if ty.ty().is_bit_string() => Some(a & b),
        BinaryOp::Or if ty.ty().is_bit_string() => Some(a | b),
        BinaryOp::Xor if ty.ty().is_bit_string() => Some(a ^ b),
        _ => return ConstValue::Unknown,
    };
    match result {
        Some(value) => integer_result(value, ty),
        // Division by zero or leaving i128.
        None => ConstValue::Overflow,
    }
}

fn fold_real(op: BinaryOp, a: f64, b: f64, ty: TypeRef<'_>, registry: &TypeRegistry) -> ConstValue {
    if op.is_comparison() {
        return bool_result(compare(op, a.partial_cmp(&b)), registry);
    }
    match op {
        BinaryOp::Add => real_result(a + b, ty),
        BinaryOp::Sub => real_result(a - b, ty),
        BinaryOp::Mul => real_result(a * b, ty),
        BinaryOp::Div if b == 0.0 => ConstValue::Overflow,
        BinaryOp::Div => real_result(a / b, ty),
        _ => ConstValue::Unknown,
    }
}

fn fold_bool(op: BinaryOp, a: bool, b: bool, registry: &TypeRegistry) -> ConstValue {
    match op {
        BinaryOp::And => bool_result(a && b, registry),
        BinaryOp::Or => bool_result(a || b, registry),
        BinaryOp::Xor | BinaryOp::Ne => bool_result(a != b, registry),
        BinaryOp::Eq => bool_result(a == b, registry),
        _ => ConstValue::Unknown,
    }
}

fn fold_duration(
    op: BinaryOp,
    a: time::Duration,
    b: time::Duration,
    ty: TypeRef<'_>,
    registry: &TypeRegistry,
) -> ConstValue {
    if op.is_comparison() {
        return bool_result(compare(op, a.partial_cmp(&b)), registry);
    }
    let result = match op {
        BinaryOp::Add => a.checked_add(b),
        BinaryOp::Sub => a.checked_sub(b),
        _ => return ConstValue::Unknown,
    };
    match result {
        Some(value) => ConstValue::value(ConstPayload::Duration(value), ty.id()),
        None => ConstValue::Overflow,
    }
}

fn compare(op: BinaryOp, ordering: Option<std::cmp::Ordering>) -> bool {
    use std::cmp::Ordering::*;
    match (op, ordering) {
        (_, None) => op == BinaryOp::Ne,
        (BinaryOp::Eq, Some(ord)) => ord == Equal,
        (BinaryOp::Ne, Some(ord)) => ord != Equal,
        (BinaryOp::Lt, Some(ord)) => ord == Less,
        (BinaryOp::Le, Some(ord)) => ord != Greater,
        (BinaryOp::Gt, Some(ord)) => ord == Greater,
        (BinaryOp::Ge, Some(ord)) => ord != Less,
        _ => false,
    }
}

fn integer_result(value: i128, ty: TypeRef<'_>) -> ConstValue {
    if !ty.ty().contains_integer(value) {
        trace!("{} overflows {}", value, ty);
        return ConstValue::Overflow;
    }
    let payload = match ty.ty().is_signed_integer() {
        true => ConstPayload::Int(value as i64),
        false => ConstPayload::UInt(value as u64),
    };
    ConstValue::value(payload, ty.id())
}

fn real_result(value: f64, ty: TypeRef<'_>) -> ConstValue {
    let max = ty.ty().real_max().unwrap_or(f64::MAX);
    if !value.is_finite() || value.abs() > max {
        return ConstValue::Overflow;
    }
    ConstValue::value(ConstPayload::Real(value), ty.id())
}

fn bool_result(value: bool, registry: &TypeRegistry) -> ConstValue {
    ConstValue::value(ConstPayload::Bool(value), registry.get_bool().id())
}
