//! `if` chains and the three `for` forms.
//!
//! Block labels carry the statement's `line_column` so the printed IR can
//! be traced back to the source (`if.then.12_4`, `loop.body.30_2`).
//! A merge or exit block is only made current when something branches to
//! it; otherwise the current block stays terminated and the statements
//! that follow are skipped as unreachable.

use arc_ast::{Block, Expr, ExprKind, ForKind, ForStmt, IfStmt, Span, Stmt};
use arc_diagnostic::ErrorCode;

use crate::context::LoopTargets;
use crate::ir::{BinOp, IntPredicate, Value};
use crate::scope::Binding;

use super::Lowerer;

impl Lowerer<'_> {
    pub(super) fn lower_if(&mut self, stmt: &IfStmt) {
        let suffix = stmt.span.label_suffix();
        let merge = self.builder().new_block(format!("if.end.{suffix}"));
        let last = stmt.branches.len().saturating_sub(1);

        for (index, (cond, body)) in stmt.branches.iter().enumerate() {
            let (then_label, next_label) = if index == 0 {
                (format!("if.then.{suffix}"), format!("if.next.{suffix}"))
            } else {
                (
                    format!("elseif.then.{suffix}.{index}"),
                    format!("elseif.next.{suffix}.{index}"),
                )
            };

            let cond_value = self.lower_expr(cond);
            let cond_value = self.to_bool(cond_value, cond.span);
            let then_block = self.builder().new_block(then_label);
            let next_block = if index == last && stmt.else_block.is_none() {
                merge
            } else {
                self.builder().new_block(next_label)
            };
            self.builder()
                .terminate_cond_br(cond_value, then_block, next_block);

            self.builder().position_at(then_block);
            self.lower_block(body);
            if !self.builder().is_terminated() {
                self.builder().terminate_br(merge);
            }
            self.builder().position_at(next_block);
        }

        // The last `next` block is where the else branch goes.
        if let Some(else_block) = &stmt.else_block {
            self.lower_block(else_block);
            if !self.builder().is_terminated() {
                self.builder().terminate_br(merge);
            }
        }

        if self.builder().has_predecessors(merge) {
            self.builder().position_at(merge);
        }
    }

    pub(super) fn lower_for(&mut self, stmt: &ForStmt) {
        let (init, cond, post) = match &stmt.kind {
            ForKind::Clause { init, cond, post } => {
                (init.as_deref(), cond.as_ref(), Some(post.as_deref()))
            }
            ForKind::Cond(cond) => (None, cond.as_ref(), None),
            ForKind::In {
                var,
                var_span,
                iterable,
            } => return self.lower_for_in(var, *var_span, iterable, &stmt.body, stmt.span),
        };
        self.lower_loop(init, cond, post, &stmt.body, stmt.span);
    }

    /// `for init; cond; post { }` and `for cond { }`.
    ///
    /// `post` is `Some` for the clause form, which always gets a
    /// `loop.post` block as its `continue` target (even with no post
    /// statement); the condition-only form continues at `loop.cond`.
    fn lower_loop(
        &mut self,
        init: Option<&Stmt>,
        cond: Option<&Expr>,
        post: Option<Option<&Stmt>>,
        body: &Block,
        span: Span,
    ) {
        let suffix = span.label_suffix();
        self.ctx.push_scope();
        if let Some(init) = init {
            self.lower_stmt(init);
        }

        let cond_block = self.builder().new_block(format!("loop.cond.{suffix}"));
        let body_block = self.builder().new_block(format!("loop.body.{suffix}"));
        let post_block = post.map(|_| self.builder().new_block(format!("loop.post.{suffix}")));
        let end_block = self.builder().new_block(format!("loop.end.{suffix}"));

        self.builder().terminate_br(cond_block);
        self.builder().position_at(cond_block);
        match cond {
            Some(cond) => {
                let value = self.lower_expr(cond);
                let value = self.to_bool(value, cond.span);
                self.builder()
                    .terminate_cond_br(value, body_block, end_block);
            }
            None => self.builder().terminate_br(body_block),
        }

        let continue_to = post_block.unwrap_or(cond_block);
        self.builder().position_at(body_block);
        self.ctx.push_loop(LoopTargets {
            continue_to,
            break_to: end_block,
        });
        self.lower_block(body);
        self.ctx.pop_loop();
        if !self.builder().is_terminated() {
            self.builder().terminate_br(continue_to);
        }

        if let Some(post_block) = post_block {
            self.builder().position_at(post_block);
            if let Some(Some(post)) = post {
                self.lower_stmt(post);
            }
            if !self.builder().is_terminated() {
                self.builder().terminate_br(cond_block);
            }
        }
        self.ctx.pop_scope();

        if self.builder().has_predecessors(end_block) {
            self.builder().position_at(end_block);
        }
    }

    /// `for i in a..b { }`: a counter slot from `a` up to, not including,
    /// `b`, stepping by one.
    fn lower_for_in(&mut self, var: &str, var_span: Span, iterable: &Expr, body: &Block, span: Span) {
        let ExprKind::Range { start, end } = &iterable.kind else {
            self.ctx.warning(
                ErrorCode::W2002,
                "for-in is only supported over ranges; loop body skipped",
                iterable.span,
            );
            self.lower_expr(iterable);
            return;
        };

        let start_value = self.lower_expr(start);
        let end_value = self.lower_expr(end);
        if start_value.ty != end_value.ty {
            self.ctx.warning(
                ErrorCode::W2005,
                format!(
                    "range bounds have different types ({} and {}); widening the narrower one",
                    start_value.ty, end_value.ty
                ),
                iterable.span,
            );
        }
        let (start_value, end_value) = self.unify_operands(start_value, end_value);
        let ty = start_value.ty.clone();
        let Some((_, signed)) = ty.int_info() else {
            self.ctx.error(
                ErrorCode::E2021,
                format!("range bounds must be integers, found {ty}"),
                iterable.span,
            );
            return;
        };

        let suffix = span.label_suffix();
        self.ctx.push_scope();
        let slot = self
            .builder()
            .emit_entry_alloca(ty.clone(), format!("{var}.addr"));
        self.builder().emit_store(start_value, slot.clone());
        self.ctx
            .scopes
            .define(var, Binding::Slot(slot.clone()), false);
        tracing::trace!(var, span = %var_span, "for-in counter");

        let cond_block = self.builder().new_block(format!("for.cond.{suffix}"));
        let body_block = self.builder().new_block(format!("for.body.{suffix}"));
        let step_block = self.builder().new_block(format!("for.step.{suffix}"));
        let end_block = self.builder().new_block(format!("for.end.{suffix}"));

        self.builder().terminate_br(cond_block);
        self.builder().position_at(cond_block);
        let current = self.builder().emit_load(ty.clone(), slot.clone());
        let pred = if signed {
            IntPredicate::Slt
        } else {
            IntPredicate::Ult
        };
        let in_range = self.builder().emit_icmp(pred, current, end_value);
        self.builder()
            .terminate_cond_br(in_range, body_block, end_block);

        self.builder().position_at(body_block);
        self.ctx.push_loop(LoopTargets {
            continue_to: step_block,
            break_to: end_block,
        });
        self.lower_block(body);
        self.ctx.pop_loop();
        if !self.builder().is_terminated() {
            self.builder().terminate_br(step_block);
        }

        self.builder().position_at(step_block);
        let current = self.builder().emit_load(ty.clone(), slot.clone());
        let next = self
            .builder()
            .emit_binary(BinOp::Add, current, Value::const_int(1, ty));
        self.builder().emit_store(next, slot);
        self.builder().terminate_br(cond_block);

        self.ctx.pop_scope();
        self.builder().position_at(end_block);
    }
}
