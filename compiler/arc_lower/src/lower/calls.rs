//! Calls: direct calls, method calls with a bound receiver, variadic
//! argument promotion.

use arc_ast::{Expr, Span};
use arc_diagnostic::ErrorCode;
use smallvec::SmallVec;

use crate::ir::{Type, Value};

use super::{Lowerer, Operand};

impl Lowerer<'_> {
    pub(super) fn lower_call(&mut self, callee: &Expr, args: &[Expr], span: Span) -> Value {
        let (name, receiver) = match self.lower_operand(callee) {
            Operand::Function(name) => (name, None),
            Operand::BoundMethod { function, receiver } => (function, Some(receiver)),
            operand => {
                if !matches!(operand, Operand::Invalid) {
                    self.ctx
                        .error(ErrorCode::E2012, "cannot call non-function", span);
                }
                for arg in args {
                    self.lower_expr(arg);
                }
                return Value::placeholder();
            }
        };

        let Some(function) = self.ctx.module.function(&name) else {
            self.ctx
                .error(ErrorCode::E2001, format!("undefined: {name}"), span);
            return Value::placeholder();
        };
        let params: Vec<Type> = function.params.iter().map(|p| p.ty.clone()).collect();
        let ret = function.ret.clone();
        let variadic = function.variadic;

        let mut values: SmallVec<[Value; 4]> = SmallVec::new();
        let bound = usize::from(receiver.is_some());
        values.extend(receiver);
        for arg in args {
            values.push(self.lower_expr(arg));
        }

        let arity_ok = if variadic {
            values.len() >= params.len()
        } else {
            values.len() == params.len()
        };
        if !arity_ok {
            let expected = params.len().saturating_sub(bound);
            let at_least = if variadic { "at least " } else { "" };
            self.ctx.error(
                ErrorCode::E2004,
                format!(
                    "function '{name}' expects {at_least}{expected} arguments, got {}",
                    args.len()
                ),
                span,
            );
            return Value::zero(ret);
        }

        let values = values
            .into_iter()
            .enumerate()
            .map(|(index, value)| match params.get(index) {
                Some(param) => self.coerce(value, param, span),
                None => self.promote_variadic(value),
            })
            .collect();
        self.builder().emit_call(&name, values, ret)
    }

    /// C default argument promotions for arguments past the fixed
    /// parameters: small integers widen to `i32`, `f32` to `f64`.
    fn promote_variadic(&mut self, value: Value) -> Value {
        let promoted = match (value.ty.int_info(), value.ty.float_bits()) {
            (Some((bits, _)), _) if bits < 32 => self.try_coerce(value, &Type::I32),
            (_, Some(bits)) if bits < 64 => self.try_coerce(value, &Type::F64),
            _ => Ok(value),
        };
        match promoted {
            Ok(value) | Err(value) => value,
        }
    }
}
