//! Expressions: names, member access, operators.

use arc_ast::{BinaryChain, BinaryOp, Expr, ExprKind, Span, UnaryOp};
use arc_diagnostic::ErrorCode;
use arc_stack::ensure_sufficient_stack;
use smallvec::smallvec;

use crate::ir::{BinOp, FloatPredicate, IntPredicate, Type, Value};
use crate::namespace::NamespaceId;
use crate::scope::{Binding, Symbol};

use super::{Lowerer, Operand};

/// Where a field lives after resolving `base.field`.
pub(super) enum FieldPlace {
    /// Address of the field inside addressable storage.
    Addr(Value),
    /// Field extracted from a struct value with no storage behind it.
    Value(Value),
    /// Resolution failed and was reported.
    Error,
}

impl Lowerer<'_> {
    /// Lower an expression to the value it produces.
    pub(super) fn lower_expr(&mut self, expr: &Expr) -> Value {
        ensure_sufficient_stack(|| match &expr.kind {
            ExprKind::Int(n) => Value::const_int(*n, Type::I64),
            ExprKind::Float(x) => Value::const_float(*x, Type::F64),
            ExprKind::Bool(b) => Value::const_bool(*b),
            ExprKind::Str(text) => self.lower_string(text),
            ExprKind::Char(c) => Value::const_int(u64::from(u32::from(*c)), Type::U32),
            ExprKind::Null => Value::null(Type::byte_ptr()),
            ExprKind::Ident(_) | ExprKind::Member { .. } => {
                let operand = self.lower_operand(expr);
                self.operand_value(operand, expr.span)
            }
            ExprKind::Binary(chain) => self.lower_binary_chain(chain),
            ExprKind::Range { start, .. } => {
                self.ctx.error(
                    ErrorCode::E2014,
                    "range expression is only allowed in a for-in loop",
                    expr.span,
                );
                self.lower_expr(start)
            }
            ExprKind::Unary { op, operand } => self.lower_unary(*op, operand, expr.span),
            ExprKind::Call { callee, args } => self.lower_call(callee, args, expr.span),
            ExprKind::StructLit { name, fields } => {
                self.lower_struct_literal(name, fields, expr.span)
            }
            ExprKind::Cast { ty, value } => self.lower_cast(ty, value),
            ExprKind::Alloca { ty, count } => self.lower_alloca(ty, count.as_deref()),
            ExprKind::Intrinsic { kind, ty, args } => {
                self.lower_intrinsic(*kind, ty.as_ref(), args, expr.span)
            }
        })
    }

    /// Lower an expression that may name something other than a value: a
    /// function, a namespace or a bound method.
    pub(super) fn lower_operand(&mut self, expr: &Expr) -> Operand {
        match &expr.kind {
            ExprKind::Ident(name) => self.lower_ident(name, expr.span),
            ExprKind::Member {
                base,
                name,
                name_span,
            } => self.lower_member(base, name, *name_span),
            _ => Operand::Value(self.lower_expr(expr)),
        }
    }

    fn operand_value(&mut self, operand: Operand, span: Span) -> Value {
        match operand {
            Operand::Value(value) => value,
            Operand::Invalid => Value::placeholder(),
            Operand::Function(name) | Operand::BoundMethod { function: name, .. } => {
                Value::function(name)
            }
            Operand::Namespace(ns) => {
                let name = self.ctx.namespaces.name(ns).to_string();
                self.ctx.error(
                    ErrorCode::E2003,
                    format!("namespace '{name}' used as value"),
                    span,
                );
                Value::placeholder()
            }
        }
    }

    // ── Names ───────────────────────────────────────────────────────

    fn lower_ident(&mut self, name: &str, span: Span) -> Operand {
        if let Some(symbol) = self.lookup_symbol(name) {
            return Operand::Value(self.read_binding(symbol.binding));
        }
        if let Some(function) = self.find_function(name) {
            return Operand::Function(function);
        }
        if self.ctx.types.contains(name) {
            self.ctx.error(
                ErrorCode::E2003,
                format!("type '{name}' used as value (did you mean '{name}{{}}'?)"),
                span,
            );
            return Operand::Invalid;
        }
        if let Some(ns) = self.ctx.namespaces.lookup(name) {
            return Operand::Namespace(ns);
        }
        self.ctx
            .error(ErrorCode::E2001, format!("undefined: {name}"), span);
        Operand::Invalid
    }

    fn read_binding(&mut self, binding: Binding) -> Value {
        let ty = binding.value_type().cloned().unwrap_or(Type::I64);
        match binding {
            Binding::Slot(slot) => self.builder().emit_load(ty, slot),
            Binding::Value(value) => value,
        }
    }

    /// The binding `name` refers to: locals innermost first, then the
    /// globals of the current namespace, then those of the root.
    pub(super) fn lookup_symbol(&self, name: &str) -> Option<Symbol> {
        if let Some(symbol) = self.ctx.scopes.lookup(name) {
            return Some(symbol.clone());
        }
        let namespaces = &self.ctx.namespaces;
        namespaces
            .get(self.ctx.current_namespace())
            .global(name)
            .or_else(|| namespaces.get(NamespaceId::ROOT).global(name))
            .cloned()
    }

    /// IR name of the function `name` refers to from the current
    /// namespace: its own functions, then the root's, then any module
    /// function by IR name.
    fn find_function(&self, name: &str) -> Option<String> {
        let namespaces = &self.ctx.namespaces;
        namespaces
            .function(self.ctx.current_namespace(), name)
            .or_else(|| namespaces.function(NamespaceId::ROOT, name))
            .map(str::to_string)
            .or_else(|| {
                self.ctx
                    .module
                    .function(name)
                    .map(|function| function.name.clone())
            })
    }

    /// The namespace a member base names, unless a variable shadows it.
    fn namespace_base(&self, base: &Expr) -> Option<NamespaceId> {
        let name = base.as_ident()?;
        if self.lookup_symbol(name).is_some() {
            return None;
        }
        self.ctx.namespaces.lookup(name)
    }

    // ── Member access ───────────────────────────────────────────────

    fn lower_member(&mut self, base: &Expr, name: &str, span: Span) -> Operand {
        if let Some(ns) = self.namespace_base(base) {
            if let Some(function) = self.ctx.namespaces.function(ns, name) {
                return Operand::Function(function.to_string());
            }
            if let Some(symbol) = self.ctx.namespaces.get(ns).global(name).cloned() {
                return Operand::Value(self.read_binding(symbol.binding));
            }
            let ns_name = self.ctx.namespaces.name(ns).to_string();
            self.ctx.error(
                ErrorCode::E2016,
                format!("function '{name}' not found in namespace '{ns_name}'"),
                span,
            );
            return Operand::Invalid;
        }

        let base_place = self.lower_address(base);
        let owner = match &base_place {
            Ok(addr) => addr.ty.pointee().and_then(Type::owner_struct),
            Err(value) => value.ty.owner_struct(),
        }
        .map(str::to_string);
        if let Some(owner) = owner {
            let method = format!("{owner}_{name}");
            if let Some(function) = self.ctx.module.function(&method) {
                let wants_pointer = function
                    .params
                    .first()
                    .is_some_and(|param| param.ty.is_pointer());
                let receiver = self.receiver(base_place, wants_pointer);
                return Operand::BoundMethod {
                    function: method,
                    receiver,
                };
            }
        }

        match self.field_place(base_place, name, span) {
            FieldPlace::Error => Operand::Invalid,
            place => Operand::Value(self.place_value(place)),
        }
    }

    /// The `self` argument for a method call on `base_place`. A struct in
    /// storage is passed by address when the method takes a pointer.
    fn receiver(&mut self, base_place: Result<Value, Value>, wants_pointer: bool) -> Value {
        match base_place {
            Ok(addr) => {
                let ty = addr.ty.pointee().cloned().unwrap_or(Type::I64);
                if wants_pointer && ty.struct_name().is_some() {
                    addr
                } else {
                    self.builder().emit_load(ty, addr)
                }
            }
            Err(value) => value,
        }
    }

    /// Resolve `base.field` for reading or writing.
    pub(super) fn member_place(&mut self, base: &Expr, field: &str, span: Span) -> FieldPlace {
        let base_place = self.lower_address(base);
        self.field_place(base_place, field, span)
    }

    /// Address of an expression if it has storage (`Ok`), otherwise the
    /// value it evaluates to (`Err`). Either way it is evaluated once.
    pub(super) fn lower_address(&mut self, expr: &Expr) -> Result<Value, Value> {
        match &expr.kind {
            ExprKind::Ident(name) => {
                match self.lookup_symbol(name).map(|symbol| symbol.binding) {
                    Some(Binding::Slot(slot)) => Ok(slot),
                    _ => Err(self.lower_expr(expr)),
                }
            }
            ExprKind::Unary {
                op: UnaryOp::Deref,
                operand,
            } => {
                let ptr = self.lower_expr(operand);
                if ptr.ty.is_pointer() {
                    Ok(ptr)
                } else {
                    self.ctx.error(
                        ErrorCode::E2008,
                        "cannot dereference non-pointer",
                        expr.span,
                    );
                    Err(ptr)
                }
            }
            ExprKind::Member {
                base,
                name,
                name_span,
            } => {
                if self.namespace_base(base).is_some() {
                    return Err(self.lower_expr(expr));
                }
                match self.member_place(base, name, *name_span) {
                    FieldPlace::Addr(addr) => Ok(addr),
                    FieldPlace::Value(value) => Err(value),
                    FieldPlace::Error => Err(Value::placeholder()),
                }
            }
            _ => Err(self.lower_expr(expr)),
        }
    }

    fn field_place(
        &mut self,
        base_place: Result<Value, Value>,
        field: &str,
        span: Span,
    ) -> FieldPlace {
        match base_place {
            Ok(addr) => match addr.ty.pointee().cloned() {
                Some(Type::Struct(name)) => self.field_address(addr, &name, field, span),
                Some(Type::Ptr(inner)) => match *inner {
                    Type::Struct(name) => {
                        let ptr_ty = Type::Struct(name.clone()).ptr_to();
                        let ptr = self.builder().emit_load(ptr_ty, addr);
                        self.field_address(ptr, &name, field, span)
                    }
                    _ => self.not_an_instance(span),
                },
                _ => self.not_an_instance(span),
            },
            Err(value) => match value.ty.clone() {
                Type::Ptr(inner) => match *inner {
                    Type::Struct(name) => self.field_address(value, &name, field, span),
                    _ => self.not_an_instance(span),
                },
                Type::Struct(name) if self.ctx.types.is_class(&name) => {
                    self.ctx.error(
                        ErrorCode::E2017,
                        "class instances must be accessed via pointer",
                        span,
                    );
                    FieldPlace::Error
                }
                Type::Struct(name) => {
                    let Some((index, ty)) = self.field_info(&name, field, span) else {
                        return FieldPlace::Error;
                    };
                    FieldPlace::Value(self.builder().emit_extract_value(value, index, ty))
                }
                _ => self.not_an_instance(span),
            },
        }
    }

    fn not_an_instance(&mut self, span: Span) -> FieldPlace {
        self.ctx.error(
            ErrorCode::E2017,
            "field access requires struct or class instance",
            span,
        );
        FieldPlace::Error
    }

    fn field_address(&mut self, ptr: Value, type_name: &str, field: &str, span: Span) -> FieldPlace {
        match self.field_info(type_name, field, span) {
            Some((index, ty)) => FieldPlace::Addr(self.builder().emit_struct_gep(ptr, index, ty)),
            None => FieldPlace::Error,
        }
    }

    /// Index and type of `field` in `type_name`, reporting E2002 if absent.
    fn field_info(&mut self, type_name: &str, field: &str, span: Span) -> Option<(u32, Type)> {
        let found = self.ctx.types.get(type_name).and_then(|def| {
            let index = def.field_index(field)?;
            Some((index, def.field_type(index)?.clone()))
        });
        if found.is_none() {
            self.ctx.error(
                ErrorCode::E2002,
                format!("type '{type_name}' has no field '{field}'"),
                span,
            );
        }
        found
    }

    fn place_value(&mut self, place: FieldPlace) -> Value {
        match place {
            FieldPlace::Addr(addr) => {
                let ty = addr.ty.pointee().cloned().unwrap_or(Type::I64);
                self.builder().emit_load(ty, addr)
            }
            FieldPlace::Value(value) => value,
            FieldPlace::Error => Value::placeholder(),
        }
    }

    // ── Unary operators ─────────────────────────────────────────────

    fn lower_unary(&mut self, op: UnaryOp, operand: &Expr, span: Span) -> Value {
        match op {
            UnaryOp::AddrOf => match self.lower_address(operand) {
                Ok(addr) => addr,
                Err(value) => {
                    self.ctx.error(
                        ErrorCode::E2013,
                        "cannot take the address of this expression",
                        span,
                    );
                    Value::null(value.ty.ptr_to())
                }
            },
            UnaryOp::Deref => {
                let value = self.lower_expr(operand);
                match value.ty.pointee().cloned() {
                    Some(pointee) => self.builder().emit_load(pointee, value),
                    None => {
                        self.ctx.error(
                            ErrorCode::E2008,
                            "cannot dereference non-pointer",
                            span,
                        );
                        value
                    }
                }
            }
            UnaryOp::Neg => {
                let value = self.lower_expr(operand);
                self.negate(value, span)
            }
            UnaryOp::Not => {
                let value = self.lower_expr(operand);
                self.logical_not(value, span)
            }
        }
    }

    fn negate(&mut self, value: Value, span: Span) -> Value {
        if let Some(bits) = value.as_const_int() {
            let ty = value.ty.clone();
            return Self::convert_constant(Value::const_int(bits.wrapping_neg(), Type::I64), &ty);
        }
        if value.ty.is_float() {
            let zero = Value::const_float(0.0, value.ty.clone());
            return self.builder().emit_binary(BinOp::FSub, zero, value);
        }
        if value.ty.is_int() {
            let zero = Value::const_int(0, value.ty.clone());
            return self.builder().emit_binary(BinOp::Sub, zero, value);
        }
        self.invalid_operands("-", &value.ty, None, span);
        value
    }

    fn logical_not(&mut self, value: Value, span: Span) -> Value {
        match value.ty {
            Type::Bool => self
                .builder()
                .emit_binary(BinOp::Xor, value, Value::const_bool(true)),
            Type::Int { .. } => {
                let zero = Value::const_int(0, value.ty.clone());
                let truth = self.builder().emit_icmp(IntPredicate::Ne, value, zero);
                self.builder()
                    .emit_binary(BinOp::Xor, truth, Value::const_bool(true))
            }
            _ => {
                self.invalid_operands("!", &value.ty, None, span);
                Value::const_bool(false)
            }
        }
    }

    // ── Binary operators ────────────────────────────────────────────

    /// Fold one precedence level left to right.
    fn lower_binary_chain(&mut self, chain: &BinaryChain) -> Value {
        let mut acc = self.lower_expr(&chain.head);
        for (op, rhs) in &chain.rest {
            let rhs_value = self.lower_expr(rhs);
            acc = self.lower_binary(*op, acc, rhs_value, rhs.span);
        }
        acc
    }

    fn lower_binary(&mut self, op: BinaryOp, lhs: Value, rhs: Value, span: Span) -> Value {
        if lhs.ty.is_pointer() && rhs.ty.is_int() && matches!(op, BinaryOp::Add | BinaryOp::Sub) {
            return self.pointer_offset(op, lhs, rhs);
        }

        let (lhs, rhs) = self.unify_operands(lhs, rhs);
        let ty = lhs.ty.clone();

        if op.is_logical() {
            let lhs = self.to_bool(lhs, span);
            let rhs = self.to_bool(rhs, span);
            let bin = if op == BinaryOp::And { BinOp::And } else { BinOp::Or };
            return self.builder().emit_binary(bin, lhs, rhs);
        }

        if op.is_comparison() {
            if ty.is_float() {
                return self
                    .builder()
                    .emit_fcmp(float_predicate(op), lhs, rhs);
            }
            if let Some(signed) = comparison_signedness(&ty) {
                return self
                    .builder()
                    .emit_icmp(int_predicate(op, signed), lhs, rhs);
            }
            self.invalid_operands(op.as_symbol(), &lhs.ty, Some(&rhs.ty), span);
            return Value::const_bool(false);
        }

        let bin = if ty.is_float() {
            match op {
                BinaryOp::Add => Some(BinOp::FAdd),
                BinaryOp::Sub => Some(BinOp::FSub),
                BinaryOp::Mul => Some(BinOp::FMul),
                BinaryOp::Div => Some(BinOp::FDiv),
                BinaryOp::Mod => Some(BinOp::FRem),
                _ => None,
            }
        } else if let Some((_, signed)) = ty.int_info() {
            match op {
                BinaryOp::Add => Some(BinOp::Add),
                BinaryOp::Sub => Some(BinOp::Sub),
                BinaryOp::Mul => Some(BinOp::Mul),
                BinaryOp::Div if signed => Some(BinOp::SDiv),
                BinaryOp::Div => Some(BinOp::UDiv),
                BinaryOp::Mod if signed => Some(BinOp::SRem),
                BinaryOp::Mod => Some(BinOp::URem),
                _ => None,
            }
        } else {
            None
        };
        match bin {
            Some(bin) => self.builder().emit_binary(bin, lhs, rhs),
            None => {
                self.invalid_operands(op.as_symbol(), &lhs.ty, Some(&rhs.ty), span);
                Value::placeholder()
            }
        }
    }

    /// `p + n` / `p - n`: element offset through a GEP.
    fn pointer_offset(&mut self, op: BinaryOp, ptr: Value, offset: Value) -> Value {
        let (Ok(mut index) | Err(mut index)) = self.try_coerce(offset, &Type::I64);
        if op == BinaryOp::Sub {
            index = self.negate(index, Span::DUMMY);
        }
        let ty = ptr.ty.clone();
        self.builder().emit_gep(ptr, smallvec![index], ty)
    }

    /// Bring both operands of a binary operator to one type: the wider
    /// integer or float, float over integer, and the left pointer type.
    pub(super) fn unify_operands(&mut self, lhs: Value, rhs: Value) -> (Value, Value) {
        if lhs.ty == rhs.ty {
            return (lhs, rhs);
        }
        let target = match (&lhs.ty, &rhs.ty) {
            (Type::Float { bits: l }, Type::Float { bits: r }) => {
                if l >= r {
                    lhs.ty.clone()
                } else {
                    rhs.ty.clone()
                }
            }
            (Type::Float { .. }, r) if r.is_int() => lhs.ty.clone(),
            (l, Type::Float { .. }) if l.is_int() => rhs.ty.clone(),
            (l, r) => match (l.int_info(), r.int_info()) {
                (Some((lbits, _)), Some((rbits, _))) => {
                    if lbits >= rbits {
                        lhs.ty.clone()
                    } else {
                        rhs.ty.clone()
                    }
                }
                _ if l.is_pointer() => lhs.ty.clone(),
                _ if r.is_pointer() => rhs.ty.clone(),
                _ => return (lhs, rhs),
            },
        };
        // A pair with no implicit conversion is left for the operator to
        // reject.
        let (Ok(lhs) | Err(lhs)) = self.try_coerce(lhs, &target);
        let (Ok(rhs) | Err(rhs)) = self.try_coerce(rhs, &target);
        (lhs, rhs)
    }

    fn invalid_operands(&mut self, op: &str, lhs: &Type, rhs: Option<&Type>, span: Span) {
        let operands = match rhs {
            Some(rhs) => format!("{lhs} and {rhs}"),
            None => lhs.to_string(),
        };
        self.ctx.error(
            ErrorCode::E2021,
            format!("invalid operand types for operator '{op}': {operands}"),
            span,
        );
    }
}

/// Signedness of an `icmp` over `ty`; pointers compare unsigned.
fn comparison_signedness(ty: &Type) -> Option<bool> {
    match ty {
        Type::Ptr(_) => Some(false),
        _ => ty.int_info().map(|(_, signed)| signed),
    }
}

fn int_predicate(op: BinaryOp, signed: bool) -> IntPredicate {
    match (op, signed) {
        (BinaryOp::NotEq, _) => IntPredicate::Ne,
        (BinaryOp::Lt, true) => IntPredicate::Slt,
        (BinaryOp::Lt, false) => IntPredicate::Ult,
        (BinaryOp::LtEq, true) => IntPredicate::Sle,
        (BinaryOp::LtEq, false) => IntPredicate::Ule,
        (BinaryOp::Gt, true) => IntPredicate::Sgt,
        (BinaryOp::Gt, false) => IntPredicate::Ugt,
        (BinaryOp::GtEq, true) => IntPredicate::Sge,
        (BinaryOp::GtEq, false) => IntPredicate::Uge,
        _ => IntPredicate::Eq,
    }
}

fn float_predicate(op: BinaryOp) -> FloatPredicate {
    match op {
        BinaryOp::NotEq => FloatPredicate::One,
        BinaryOp::Lt => FloatPredicate::Olt,
        BinaryOp::LtEq => FloatPredicate::Ole,
        BinaryOp::Gt => FloatPredicate::Ogt,
        BinaryOp::GtEq => FloatPredicate::Oge,
        _ => FloatPredicate::Oeq,
    }
}
