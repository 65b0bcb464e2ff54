//! Literals, constant folding of literal initializers, struct literals.

use arc_ast::{Expr, ExprKind, FieldInit, Span, UnaryOp};
use arc_diagnostic::ErrorCode;
use smallvec::smallvec;

use crate::ir::{sign_extend, Constant, StructDef, Type, Value, ValueKind};

use super::Lowerer;

impl Lowerer<'_> {
    /// A string literal: a private NUL-terminated global, decayed to `i8*`.
    pub(super) fn lower_string(&mut self, text: &str) -> Value {
        let global = self.ctx.module.add_string(text);
        let zero = Value::const_int(0, Type::I32);
        self.builder()
            .emit_gep(global, smallvec![zero.clone(), zero], Type::byte_ptr())
    }

    /// Value of a literal usable as a top-level initializer: a number,
    /// bool, char or `null`, optionally negated.
    pub(super) fn const_literal(expr: &Expr) -> Option<Value> {
        match &expr.kind {
            ExprKind::Int(n) => Some(Value::const_int(*n, Type::I64)),
            ExprKind::Float(x) => Some(Value::const_float(*x, Type::F64)),
            ExprKind::Bool(b) => Some(Value::const_bool(*b)),
            ExprKind::Char(c) => Some(Value::const_int(u64::from(u32::from(*c)), Type::U32)),
            ExprKind::Null => Some(Value::null(Type::byte_ptr())),
            ExprKind::Unary {
                op: UnaryOp::Neg,
                operand,
            } => match &operand.kind {
                ExprKind::Int(n) => Some(Value::const_int(n.wrapping_neg(), Type::I64)),
                ExprKind::Float(x) => Some(Value::const_float(-x, Type::F64)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Re-express a constant at type `ty` without emitting anything.
    ///
    /// Integer bits are truncated to the target width (and read back by
    /// the source signedness when moving to a float). Pairs that have no
    /// constant conversion come back unchanged.
    pub(super) fn convert_constant(value: Value, ty: &Type) -> Value {
        let ValueKind::Const(constant) = &value.kind else {
            return value;
        };
        match (constant, ty) {
            (Constant::Int(bits), _) if ty.is_int() => {
                let (width, _) = ty.int_info().unwrap_or((64, true));
                Value::const_int(mask(*bits, width), ty.clone())
            }
            (Constant::Int(bits), Type::Float { .. }) => {
                Value::const_float(int_to_f64(*bits, &value.ty), ty.clone())
            }
            (Constant::Float(_), Type::Float { .. }) | (Constant::Null, Type::Ptr(_)) => {
                value.retyped(ty.clone())
            }
            _ => value,
        }
    }

    /// `Name{field: value, ...}`.
    ///
    /// A class instance gets a zero-filled stack slot allocated at the
    /// cursor, so each evaluation is a distinct object, and the literal
    /// yields its address; a struct literal is an aggregate value built
    /// from `zeroinitializer` with one `insertvalue` per field.
    pub(super) fn lower_struct_literal(&mut self, name: &str, fields: &[FieldInit], span: Span) -> Value {
        let Some(def) = self.ctx.types.get(name).cloned() else {
            self.ctx.error(
                ErrorCode::E2015,
                format!("unknown struct/class type: {name}"),
                span,
            );
            for init in fields {
                self.lower_expr(&init.value);
            }
            return Value::placeholder();
        };
        let ty = Type::Struct(name.to_string());

        if def.is_class {
            let object = self
                .builder()
                .emit_alloca(ty, None, format!("{name}.instance"));
            for (index, (_, field_ty)) in (0u32..).zip(&def.fields) {
                let addr = self
                    .builder()
                    .emit_struct_gep(object.clone(), index, field_ty.clone());
                self.builder()
                    .emit_store(Value::zero(field_ty.clone()), addr);
            }
            for init in fields {
                let value = self.lower_expr(&init.value);
                let Some((index, field_ty)) = self.literal_field(&def, init) else {
                    continue;
                };
                let value = self.coerce(value, &field_ty, init.value.span);
                let addr = self.builder().emit_struct_gep(object.clone(), index, field_ty);
                self.builder().emit_store(value, addr);
            }
            return object;
        }

        let mut aggregate = Value::zero(ty);
        for init in fields {
            let value = self.lower_expr(&init.value);
            let Some((index, field_ty)) = self.literal_field(&def, init) else {
                continue;
            };
            let value = self.coerce(value, &field_ty, init.value.span);
            aggregate = self.builder().emit_insert_value(aggregate, value, index);
        }
        aggregate
    }

    fn literal_field(&mut self, def: &StructDef, init: &FieldInit) -> Option<(u32, Type)> {
        let found = def
            .field_index(&init.name)
            .and_then(|index| Some((index, def.field_type(index)?.clone())));
        if found.is_none() {
            self.ctx.error(
                ErrorCode::E2002,
                format!("type '{}' has no field '{}'", def.name, init.name),
                init.span,
            );
        }
        found
    }
}

/// Keep the low `width` bits.
fn mask(bits: u64, width: u32) -> u64 {
    if width >= 64 {
        bits
    } else {
        bits & ((1u64 << width) - 1)
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "integer to float conversion rounds like sitofp/uitofp"
)]
fn int_to_f64(bits: u64, ty: &Type) -> f64 {
    match ty.int_info() {
        Some((width, true)) => sign_extend(bits, width) as f64,
        _ => bits as f64,
    }
}
