//! Statements other than `if` and `for`.

use arc_ast::{Assign, AssignTarget, Block, ConstDecl, Expr, Span, Stmt, VarDecl};
use arc_diagnostic::ErrorCode;
use arc_stack::ensure_sufficient_stack;

use crate::context::DeferMode;
use crate::ir::{Type, Value};
use crate::scope::{Binding, Symbol};

use super::expr::FieldPlace;
use super::Lowerer;

impl Lowerer<'_> {
    /// Lower a block in its own scope. Statements after a terminator are
    /// unreachable and skipped.
    pub(super) fn lower_block(&mut self, block: &Block) {
        ensure_sufficient_stack(|| {
            self.ctx.push_scope();
            for stmt in &block.stmts {
                if self.builder().is_terminated() {
                    tracing::trace!(span = %stmt.span(), "skipping unreachable statement");
                    break;
                }
                self.lower_stmt(stmt);
            }
            self.ctx.pop_scope();
        });
    }

    pub(super) fn lower_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Var(decl) => self.lower_var(decl),
            Stmt::Const(decl) => self.lower_const(decl),
            Stmt::Assign(assign) => self.lower_assign(assign),
            Stmt::Return { value, .. } => {
                let value = value
                    .as_ref()
                    .map(|expr| (self.lower_expr(expr), expr.span));
                self.emit_return(value);
            }
            Stmt::If(stmt) => self.lower_if(stmt),
            Stmt::For(stmt) => self.lower_for(stmt),
            Stmt::Break(span) => match self.ctx.current_loop() {
                Some(targets) => self.builder().terminate_br(targets.break_to),
                None => self.ctx.error(
                    ErrorCode::E2006,
                    "break statement outside of loop",
                    *span,
                ),
            },
            Stmt::Continue(span) => match self.ctx.current_loop() {
                Some(targets) => self.builder().terminate_br(targets.continue_to),
                None => self.ctx.error(
                    ErrorCode::E2007,
                    "continue statement outside of loop",
                    *span,
                ),
            },
            Stmt::Defer { expr, span } => self.lower_defer(expr, *span),
            Stmt::Expr(expr) => {
                self.lower_expr(expr);
            }
            Stmt::Block(block) => self.lower_block(block),
        }
    }

    // ── Bindings ────────────────────────────────────────────────────

    fn lower_var(&mut self, decl: &VarDecl) {
        let declared = decl.ty.as_ref().map(|ty| self.resolve_type(ty));
        let mut init = decl
            .init
            .as_ref()
            .map(|expr| (self.lower_expr(expr), expr.span));
        let void_init = init
            .as_ref()
            .filter(|(value, _)| value.ty.is_void())
            .map(|&(_, span)| span);
        if let Some(span) = void_init {
            self.ctx.error(
                ErrorCode::E2010,
                format!("cannot initialize '{}' from a void expression", decl.name),
                span,
            );
            init = None;
        }
        let ty = match (declared, &init) {
            (Some(ty), _) => ty,
            (None, Some((value, _))) => value.ty.clone(),
            (None, None) if decl.init.is_some() => Type::I64,
            (None, None) => {
                self.ctx.error(
                    ErrorCode::E2010,
                    format!(
                        "variable '{}' needs type annotation or initializer",
                        decl.name
                    ),
                    decl.span,
                );
                Type::I64
            }
        };

        let slot = self.builder().emit_entry_alloca(ty.clone(), &decl.name);
        let value = match init {
            Some((value, span)) => self.coerce(value, &ty, span),
            None => Value::zero(ty),
        };
        self.builder().emit_store(value, slot.clone());
        self.ctx
            .scopes
            .define(&decl.name, Binding::Slot(slot), false);
    }

    fn lower_const(&mut self, decl: &ConstDecl) {
        let Some(init) = &decl.init else {
            self.ctx.error(
                ErrorCode::E2011,
                format!("constant '{}' must have an initializer", decl.name),
                decl.span,
            );
            return;
        };
        let mut value = self.lower_expr(init);
        if let Some(ty) = &decl.ty {
            let ty = self.resolve_type(ty);
            value = self.coerce(value, &ty, init.span);
        }
        self.ctx
            .scopes
            .define(&decl.name, Binding::Value(value), true);
    }

    // ── Assignment ──────────────────────────────────────────────────

    fn lower_assign(&mut self, assign: &Assign) {
        let value = self.lower_expr(&assign.value);
        match &assign.target {
            AssignTarget::Name(name) => self.assign_name(name, value, assign.span),
            AssignTarget::Deref(target) => {
                let ptr = self.lower_expr(target);
                match ptr.ty.pointee().cloned() {
                    Some(pointee) => {
                        let value = self.coerce(value, &pointee, assign.span);
                        self.builder().emit_store(value, ptr);
                    }
                    None => self.ctx.error(
                        ErrorCode::E2008,
                        "cannot dereference non-pointer",
                        assign.span,
                    ),
                }
            }
            AssignTarget::Field { base, field } => {
                match self.member_place(base, field, assign.span) {
                    FieldPlace::Addr(addr) => self.store_to(addr, value, assign.span),
                    FieldPlace::Value(_) => self.ctx.error(
                        ErrorCode::E2013,
                        format!("cannot assign to field '{field}' of a struct value"),
                        assign.span,
                    ),
                    FieldPlace::Error => {}
                }
            }
        }
    }

    fn assign_name(&mut self, name: &str, value: Value, span: Span) {
        match self.lookup_symbol(name) {
            None => self
                .ctx
                .error(ErrorCode::E2001, format!("undefined: {name}"), span),
            Some(Symbol { is_const: true, .. }) => self.ctx.error(
                ErrorCode::E2005,
                format!("cannot assign to constant '{name}'"),
                span,
            ),
            Some(Symbol {
                binding: Binding::Slot(slot),
                ..
            }) => self.store_to(slot, value, span),
            // Value bindings have no storage: rebind the name instead.
            Some(Symbol {
                binding: Binding::Value(old),
                ..
            }) => {
                let value = self.coerce(value, &old.ty, span);
                self.ctx
                    .scopes
                    .define(name, Binding::Value(value), false);
            }
        }
    }

    fn store_to(&mut self, addr: Value, value: Value, span: Span) {
        let ty = addr.ty.pointee().cloned().unwrap_or(Type::I64);
        let value = self.coerce(value, &ty, span);
        self.builder().emit_store(value, addr);
    }

    // ── Returns and defer ───────────────────────────────────────────

    /// Terminate the current block with a return from the function.
    ///
    /// In [`DeferMode::RunAtExit`] pending deferred expressions run first,
    /// after the return operand was evaluated. A `void` function ignores
    /// the operand; any other function returns it coerced to the declared
    /// type, or the zero value when there is none.
    pub(super) fn emit_return(&mut self, value: Option<(Value, Span)>) {
        if self.ctx.config().defer_mode == DeferMode::RunAtExit {
            self.run_defers();
        }
        let ret = self.ctx.return_type();
        if ret.is_void() {
            self.builder().terminate_return(None);
            return;
        }
        let value = match value {
            Some((value, span)) => self.coerce(value, &ret, span),
            None => Value::zero(ret),
        };
        self.builder().terminate_return(Some(value));
    }

    fn lower_defer(&mut self, expr: &Expr, span: Span) {
        match self.ctx.config().defer_mode {
            DeferMode::EvaluateInPlace => {
                self.ctx.warning(
                    ErrorCode::W2001,
                    "defer statement is not fully implemented yet; expression evaluated in place",
                    span,
                );
                self.lower_expr(expr);
            }
            DeferMode::RunAtExit => self.ctx.push_defer(expr.clone()),
        }
    }

    /// Lower every pending deferred expression, newest first, each with
    /// the bindings visible where it was deferred.
    fn run_defers(&mut self) {
        for deferred in self.ctx.pending_defers() {
            let saved = std::mem::replace(&mut self.ctx.scopes, deferred.scopes);
            self.lower_expr(&deferred.expr);
            self.ctx.scopes = saved;
        }
    }
}
