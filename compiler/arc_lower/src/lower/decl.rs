//! Declarations: the two passes over a file's items.

use arc_ast::{ConstDecl, ExternBlock, FunctionDecl, Item, TypeDecl, VarDecl};
use arc_diagnostic::ErrorCode;

use crate::context::FunctionFrame;
use crate::ir::{Function, Global, GlobalInit, Param, Type, Value, ValueKind};
use crate::namespace::NamespaceId;
use crate::scope::{Binding, Symbol};

use super::Lowerer;

impl Lowerer<'_> {
    // Pass 1

    /// Register every type, function signature and global of `items`.
    pub(super) fn declare_items(&mut self, items: &[Item]) {
        let ns = self.ctx.current_namespace();

        // Names first, so field types may refer to any struct in the file.
        for item in items {
            if let Item::Struct(decl) | Item::Class(decl) = item {
                let is_class = matches!(item, Item::Class(_));
                self.ctx.types.declare(&decl.name, is_class);
                self.ctx.namespaces.add_type(ns, &decl.name);
            }
        }
        for item in items {
            match item {
                Item::Struct(decl) => {
                    let fields = self.field_types(decl);
                    self.ctx.types.register_struct(&decl.name, fields);
                }
                Item::Class(decl) => {
                    let fields = self.field_types(decl);
                    self.ctx.types.register_class(&decl.name, fields);
                }
                _ => {}
            }
        }

        for item in items {
            match item {
                Item::Function(decl) => self.declare_function(decl, None),
                Item::Struct(decl) | Item::Class(decl) => {
                    for method in &decl.methods {
                        self.declare_function(method, Some(&decl.name));
                    }
                }
                Item::Extern(block) => self.declare_extern(block),
                Item::Const(decl) => self.declare_global_const(decl),
                Item::Var(decl) => self.declare_global_var(decl),
            }
        }
    }

    fn field_types(&mut self, decl: &TypeDecl) -> Vec<(String, Type)> {
        decl.fields
            .iter()
            .map(|field| (field.name.clone(), self.resolve_type(&field.ty)))
            .collect()
    }

    /// IR name of a function or method declared in the current namespace.
    fn function_ir_name(&self, name: &str, owner: Option<&str>) -> String {
        match owner {
            Some(owner) => format!("{owner}_{name}"),
            None => self
                .ctx
                .namespaces
                .mangle(self.ctx.current_namespace(), name),
        }
    }

    fn declare_function(&mut self, decl: &FunctionDecl, owner: Option<&str>) {
        let ir_name = self.function_ir_name(&decl.name, owner);
        let params = decl
            .params
            .iter()
            .map(|param| Param {
                name: param.name.clone(),
                ty: self.resolve_type(&param.ty),
            })
            .collect();
        let ret = decl
            .ret
            .as_ref()
            .map_or(Type::Void, |ty| self.resolve_type(ty));
        self.ctx
            .module
            .add_function(Function::declaration(&ir_name, params, ret, decl.variadic));
        if owner.is_none() {
            let ns = self.ctx.current_namespace();
            self.ctx.namespaces.add_function(ns, &decl.name, &ir_name);
        }
        tracing::trace!(function = %ir_name, "declared function");
    }

    /// Extern functions keep their bare name in the module so they link
    /// against the external symbol.
    fn declare_extern(&mut self, block: &ExternBlock) {
        let ns = match &block.namespace {
            Some(name) => self.ctx.namespaces.get_or_create(name),
            None => NamespaceId::ROOT,
        };
        for func in &block.functions {
            let params = func
                .params
                .iter()
                .map(|ty| Param {
                    name: String::new(),
                    ty: self.resolve_type(ty),
                })
                .collect();
            let ret = func
                .ret
                .as_ref()
                .map_or(Type::Void, |ty| self.resolve_type(ty));
            self.ctx.module.add_function(Function::declaration(
                &func.name,
                params,
                ret,
                func.variadic,
            ));
            self.ctx.namespaces.add_function(ns, &func.name, &func.name);
        }
    }

    /// Top-level `const`: a literal bound by value in the root scope.
    fn declare_global_const(&mut self, decl: &ConstDecl) {
        let Some(init) = &decl.init else {
            self.ctx.error(
                ErrorCode::E2011,
                format!("constant '{}' must have an initializer", decl.name),
                decl.span,
            );
            return;
        };
        let Some(mut value) = Self::const_literal(init) else {
            self.ctx.error(
                ErrorCode::E2020,
                format!(
                    "top-level constant '{}' must be initialized with a literal",
                    decl.name
                ),
                init.span,
            );
            return;
        };
        if let Some(ty) = &decl.ty {
            let ty = self.resolve_type(ty);
            value = Self::convert_constant(value, &ty);
        }
        let ns = self.ctx.current_namespace();
        self.ctx.namespaces.add_global(
            ns,
            &decl.name,
            Symbol {
                binding: Binding::Value(value),
                is_const: true,
            },
        );
    }

    /// Top-level `var`: a module global, bound as a slot in its namespace.
    fn declare_global_var(&mut self, decl: &VarDecl) {
        let declared = decl.ty.as_ref().map(|ty| self.resolve_type(ty));
        let init = match &decl.init {
            Some(expr) => {
                let literal = Self::const_literal(expr);
                if literal.is_none() {
                    self.ctx.error(
                        ErrorCode::E2020,
                        format!(
                            "top-level variable '{}' must be initialized with a literal",
                            decl.name
                        ),
                        expr.span,
                    );
                }
                literal
            }
            None => None,
        };
        let ty = match (declared, &init) {
            (Some(ty), _) => ty,
            (None, Some(value)) => value.ty.clone(),
            (None, None) => {
                if decl.init.is_none() {
                    self.ctx.error(
                        ErrorCode::E2010,
                        format!(
                            "variable '{}' needs type annotation or initializer",
                            decl.name
                        ),
                        decl.span,
                    );
                }
                Type::I64
            }
        };
        let init = match init.map(|value| Self::convert_constant(value, &ty)) {
            Some(Value {
                kind: ValueKind::Const(constant),
                ..
            }) => GlobalInit::Const(constant),
            _ => GlobalInit::Zero,
        };

        let ir_name = self
            .ctx
            .namespaces
            .mangle(self.ctx.current_namespace(), &decl.name);
        if self.ctx.module.global(&ir_name).is_none() {
            self.ctx.module.globals.push(Global {
                name: ir_name.clone(),
                ty: ty.clone(),
                init,
                constant: false,
            });
        }
        let ns = self.ctx.current_namespace();
        self.ctx.namespaces.add_global(
            ns,
            &decl.name,
            Symbol {
                binding: Binding::Slot(Value::global(ir_name, ty.ptr_to())),
                is_const: false,
            },
        );
    }

    // Pass 2

    /// Lower every function and method body in `items`.
    pub(super) fn lower_items(&mut self, items: &[Item]) {
        for item in items {
            match item {
                Item::Function(decl) => self.lower_function(decl, None),
                Item::Struct(decl) | Item::Class(decl) => {
                    for method in &decl.methods {
                        self.lower_function(method, Some(&decl.name));
                    }
                    if decl.deinit.is_some() {
                        self.ctx.warning(
                            ErrorCode::W2004,
                            format!("deinit is not yet implemented (in '{}')", decl.name),
                            decl.span,
                        );
                    }
                }
                Item::Extern(_) | Item::Const(_) | Item::Var(_) => {}
            }
        }
    }

    fn lower_function(&mut self, decl: &FunctionDecl, owner: Option<&str>) {
        let Some(body) = &decl.body else {
            return;
        };
        let ir_name = self.function_ir_name(&decl.name, owner);
        let Some(signature) = self.ctx.module.function(&ir_name) else {
            return;
        };
        if !signature.is_declaration() {
            self.ctx.error(
                ErrorCode::E2018,
                format!("function '{ir_name}' is already defined"),
                decl.span,
            );
            return;
        }
        let params = signature.params.clone();
        let ret = signature.ret.clone();

        self.ctx.enter_function(FunctionFrame {
            name: ir_name.clone(),
            ret,
        });

        // Parameters live in stack slots so they can be reassigned and
        // have their address taken like any local.
        for (index, param) in (0u32..).zip(&params) {
            let slot = self
                .builder()
                .emit_entry_alloca(param.ty.clone(), format!("{}.addr", param.name));
            self.builder()
                .emit_store(Value::param(index, param.ty.clone()), slot.clone());
            self.ctx
                .scopes
                .define(&param.name, Binding::Slot(slot), false);
        }

        self.lower_block(body);
        if !self.builder().is_terminated() {
            self.emit_return(None);
        }

        let blocks = self.ctx.exit_function().finish();
        if let Some(function) = self.ctx.module.function_mut(&ir_name) {
            function.blocks = blocks;
        }
    }
}
