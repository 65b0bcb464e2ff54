//! Conversions: implicit coercion, `cast<T>(e)`, truth tests, `alloca`.

use arc_ast::{Expr, Span, TypeExpr};
use arc_diagnostic::ErrorCode;

use crate::ir::{CastOp, FloatPredicate, IntPredicate, Type, Value};

use super::Lowerer;

impl Lowerer<'_> {
    /// Implicit conversion of `value` to `target`, applied where a typed
    /// destination receives a value: returns, initializers, stores, call
    /// arguments and struct literal fields.
    ///
    /// Covers integer resizing, integer to float, float resizing, pointer
    /// to pointer and a zero constant to a null pointer. Constants are
    /// re-typed in place. Any other pair is a mismatch (E2021) and yields
    /// the zero value of `target`.
    pub(super) fn coerce(&mut self, value: Value, target: &Type, span: Span) -> Value {
        match self.try_coerce(value, target) {
            Ok(value) => value,
            Err(value) => {
                self.ctx.error(
                    ErrorCode::E2021,
                    format!("mismatched types: expected {target}, found {}", value.ty),
                    span,
                );
                Value::zero(target.clone())
            }
        }
    }

    /// [`coerce`](Self::coerce) without the diagnostic: a pair with no
    /// implicit conversion hands the value back unchanged in `Err`.
    pub(super) fn try_coerce(&mut self, value: Value, target: &Type) -> Result<Value, Value> {
        if value.ty == *target || target.is_void() || value.ty.is_void() {
            return Ok(value);
        }
        if value.is_const() {
            if target.is_pointer() && value.as_const_int() == Some(0) {
                return Ok(Value::null(target.clone()));
            }
            let converted = Self::convert_constant(value, target);
            if converted.ty == *target {
                return Ok(converted);
            }
            return self.coerce_dynamic(converted, target);
        }
        self.coerce_dynamic(value, target)
    }

    fn coerce_dynamic(&mut self, value: Value, target: &Type) -> Result<Value, Value> {
        let op = match (&value.ty, target) {
            (from, to) if from.is_int() && to.is_int() => {
                let (from_bits, from_signed) = from.int_info().unwrap_or((64, true));
                let (to_bits, _) = to.int_info().unwrap_or((64, true));
                match from_bits.cmp(&to_bits) {
                    std::cmp::Ordering::Less if from_signed => CastOp::SExt,
                    std::cmp::Ordering::Less => CastOp::ZExt,
                    std::cmp::Ordering::Greater => CastOp::Trunc,
                    // Same width, other signedness: same IR type.
                    std::cmp::Ordering::Equal => return Ok(value.retyped(target.clone())),
                }
            }
            (from, Type::Float { .. }) if from.is_int() => int_to_float(from),
            (Type::Float { bits: from }, Type::Float { bits: to }) => {
                if from < to {
                    CastOp::FpExt
                } else {
                    CastOp::FpTrunc
                }
            }
            (Type::Ptr(_), Type::Ptr(_)) => CastOp::Bitcast,
            _ => return Err(value),
        };
        Ok(self.builder().emit_cast(op, value, target.clone()))
    }

    /// `cast<T>(e)`.
    pub(super) fn lower_cast(&mut self, ty: &TypeExpr, value: &Expr) -> Value {
        let target = self.resolve_type(ty);
        let value = self.lower_expr(value);
        self.cast_value(value, &target)
    }

    /// Explicit conversion. Unlike [`coerce`](Self::coerce) every pair of
    /// types converts; anything not numeric or pointer-integer becomes a
    /// bitcast.
    fn cast_value(&mut self, value: Value, target: &Type) -> Value {
        if value.ty == *target {
            return value;
        }
        let from = value.ty.clone();
        let op = match (&from, target) {
            (Type::Ptr(_), to) if to.is_int() => CastOp::PtrToInt,
            (from, Type::Ptr(_)) if from.is_int() => CastOp::IntToPtr,
            (from, to) if from.is_int() && to.is_int() => {
                let (from_bits, from_signed) = from.int_info().unwrap_or((64, true));
                let (to_bits, _) = to.int_info().unwrap_or((64, true));
                match from_bits.cmp(&to_bits) {
                    std::cmp::Ordering::Less if from_signed => CastOp::SExt,
                    std::cmp::Ordering::Less => CastOp::ZExt,
                    std::cmp::Ordering::Greater => CastOp::Trunc,
                    std::cmp::Ordering::Equal => CastOp::Bitcast,
                }
            }
            (from, Type::Float { .. }) if from.is_int() => int_to_float(from),
            (Type::Float { .. }, to) if to.is_int() => {
                let signed = to.int_info().is_some_and(|(_, signed)| signed);
                if signed {
                    CastOp::FpToSi
                } else {
                    CastOp::FpToUi
                }
            }
            (Type::Float { bits: from }, Type::Float { bits: to }) => {
                if from < to {
                    CastOp::FpExt
                } else {
                    CastOp::FpTrunc
                }
            }
            _ => CastOp::Bitcast,
        };
        self.builder().emit_cast(op, value, target.clone())
    }

    /// Branch condition from any scalar: integers and pointers compare
    /// against zero, floats use an ordered `!= 0.0`.
    pub(super) fn to_bool(&mut self, value: Value, span: Span) -> Value {
        match &value.ty {
            Type::Bool => value,
            Type::Int { .. } | Type::Ptr(_) => {
                let zero = Value::zero(value.ty.clone());
                self.builder().emit_icmp(IntPredicate::Ne, value, zero)
            }
            Type::Float { .. } => {
                let zero = Value::zero(value.ty.clone());
                self.builder().emit_fcmp(FloatPredicate::One, value, zero)
            }
            other => {
                self.ctx.error(
                    ErrorCode::E2021,
                    format!("cannot use a value of type {other} as a condition"),
                    span,
                );
                Value::const_bool(false)
            }
        }
    }

    /// `alloca(T)` / `alloca(T, n)`: stack memory at the current point.
    pub(super) fn lower_alloca(&mut self, ty: &TypeExpr, count: Option<&Expr>) -> Value {
        let ty = self.resolve_type(ty);
        let count = count.map(|expr| {
            let value = self.lower_expr(expr);
            self.coerce(value, &Type::I64, expr.span)
        });
        self.builder().emit_alloca(ty, count, "alloca")
    }
}

fn int_to_float(from: &Type) -> CastOp {
    if from.int_info().is_some_and(|(_, signed)| signed) {
        CastOp::SiToFp
    } else {
        CastOp::UiToFp
    }
}
