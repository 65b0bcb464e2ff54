//! Compiler intrinsics.
//!
//! `sizeof`, `alignof` fold to constants from the registry layout;
//! `bit_cast` and `va_arg` are single instructions. The rest are calls to
//! C runtime symbols (or `llvm.va_*`), declared in the module the first
//! time they are used unless the program already declares a function of
//! that name.

use arc_ast::{Expr, Intrinsic, Span, TypeExpr};
use arc_diagnostic::ErrorCode;
use smallvec::SmallVec;

use crate::ir::{CastOp, Function, Param, Type, Value};

use super::Lowerer;

/// Runtime symbol behind an intrinsic: name, parameters, return type.
fn runtime_signature(kind: Intrinsic) -> Option<(&'static str, Vec<Type>, Type)> {
    let bytes = Type::byte_ptr;
    Some(match kind {
        Intrinsic::Memset => ("memset", vec![bytes(), Type::I32, Type::I64], bytes()),
        Intrinsic::Memcpy => ("memcpy", vec![bytes(), bytes(), Type::I64], bytes()),
        Intrinsic::Memmove => ("memmove", vec![bytes(), bytes(), Type::I64], bytes()),
        Intrinsic::Strlen => ("strlen", vec![bytes()], Type::I64),
        Intrinsic::Memchr => ("memchr", vec![bytes(), Type::I32, Type::I64], bytes()),
        Intrinsic::Memcmp => ("memcmp", vec![bytes(), bytes(), Type::I64], Type::I32),
        Intrinsic::VaStart => ("llvm.va_start", vec![bytes()], Type::Void),
        Intrinsic::VaEnd => ("llvm.va_end", vec![bytes()], Type::Void),
        Intrinsic::Raise => ("raise", vec![Type::I32], Type::I32),
        Intrinsic::SizeOf | Intrinsic::AlignOf | Intrinsic::BitCast | Intrinsic::VaArg => {
            return None
        }
    })
}

impl Lowerer<'_> {
    pub(super) fn lower_intrinsic(
        &mut self,
        kind: Intrinsic,
        ty: Option<&TypeExpr>,
        args: &[Expr],
        span: Span,
    ) -> Value {
        match kind {
            Intrinsic::SizeOf | Intrinsic::AlignOf => {
                let Some(ty) = ty.filter(|_| args.is_empty()) else {
                    return self.bad_intrinsic(kind, "expects a single type argument", args, span);
                };
                let ty = self.resolve_type(ty);
                let bytes = if kind == Intrinsic::SizeOf {
                    self.ctx.types.size_of(&ty)
                } else {
                    self.ctx.types.align_of(&ty)
                };
                let Some(bytes) = bytes else {
                    let message = format!("type '{ty}' is too large");
                    return self.bad_intrinsic(kind, &message, args, span);
                };
                Value::const_int(bytes, Type::I64)
            }
            Intrinsic::BitCast => {
                let (Some(ty), [value]) = (ty, args) else {
                    let message = format!("expects exactly 1 argument, got {}", args.len());
                    return self.bad_intrinsic(kind, &message, args, span);
                };
                let target = self.resolve_type(ty);
                let value = self.lower_expr(value);
                self.builder().emit_cast(CastOp::Bitcast, value, target)
            }
            Intrinsic::VaArg => {
                let (Some(ty), [list]) = (ty, args) else {
                    return self.bad_intrinsic(kind, "expects a va_list and a type", args, span);
                };
                let ty = self.resolve_type(ty);
                let list = self.lower_expr(list);
                self.builder().emit_va_arg(list, ty)
            }
            _ => self.lower_runtime_call(kind, args, span),
        }
    }

    fn lower_runtime_call(&mut self, kind: Intrinsic, args: &[Expr], span: Span) -> Value {
        let Some((symbol, params, ret)) = runtime_signature(kind) else {
            return Value::placeholder();
        };
        if args.len() != params.len() {
            let message = format!("expects {} arguments, got {}", params.len(), args.len());
            return self.bad_intrinsic(kind, &message, args, span);
        }

        // A user declaration of the same symbol wins.
        let (params, ret) = match self.ctx.module.function(symbol) {
            Some(existing) => (
                existing.params.iter().map(|p| p.ty.clone()).collect(),
                existing.ret.clone(),
            ),
            None => {
                let decl_params = params
                    .iter()
                    .map(|ty| Param {
                        name: String::new(),
                        ty: ty.clone(),
                    })
                    .collect();
                self.ctx.module.add_function(Function::declaration(
                    symbol,
                    decl_params,
                    ret.clone(),
                    false,
                ));
                tracing::trace!(symbol, "declared runtime function");
                (params, ret)
            }
        };

        let mut values: SmallVec<[Value; 4]> = SmallVec::new();
        for (index, arg) in args.iter().enumerate() {
            let value = self.lower_expr(arg);
            values.push(match params.get(index) {
                Some(param) => self.coerce(value, param, arg.span),
                None => value,
            });
        }
        let result = self.builder().emit_call(symbol, values, ret);
        if kind == Intrinsic::Raise {
            self.builder().terminate_unreachable();
        }
        result
    }

    fn bad_intrinsic(&mut self, kind: Intrinsic, problem: &str, args: &[Expr], span: Span) -> Value {
        self.ctx.error(
            ErrorCode::E2019,
            format!("{} {problem}", kind.name()),
            span,
        );
        for arg in args {
            self.lower_expr(arg);
        }
        Value::placeholder()
    }
}
