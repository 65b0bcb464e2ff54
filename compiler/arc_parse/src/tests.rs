use arc_ast::{
    AssignTarget, BinaryOp, ExprKind, ForKind, Intrinsic, Item, Stmt, TypeExpr, UnaryOp,
};
use arc_diagnostic::ErrorCode;
use pretty_assertions::assert_eq;

use super::*;

fn parse_ok(source: &str) -> SourceFile {
    let output = parse(source);
    assert!(output.errors.is_empty(), "unexpected errors: {:?}", output.errors);
    output.file
}

/// Statements of the first function's body.
fn body(source: &str) -> Vec<Stmt> {
    let file = parse_ok(source);
    match file.items.into_iter().next() {
        Some(Item::Function(func)) => func.body.map(|b| b.stmts).unwrap_or_default(),
        other => panic!("expected a function, got {other:?}"),
    }
}

fn stmt_expr(source: &str) -> ExprKind {
    match body(&format!("func f() {{\n{source}\n}}")).into_iter().next() {
        Some(Stmt::Expr(expr)) => expr.kind,
        other => panic!("expected expression statement, got {other:?}"),
    }
}

#[test]
fn test_header_imports_and_items() {
    let file = parse_ok(
        "namespace app\nimport \"./util\"\nimport \"std/io\"\n\nfunc main() int32 { return 0 }",
    );
    assert_eq!(file.namespace.map(|n| n.name), Some("app".to_string()));
    let paths: Vec<_> = file.imports.into_iter().map(|i| i.path).collect();
    assert_eq!(paths, vec!["./util", "std/io"]);
    assert_eq!(file.items.len(), 1);
}

#[test]
fn test_function_signature() {
    let file = parse_ok("fn add(a: int32, b int32) -> int32 { return a + b }");
    let Some(Item::Function(func)) = file.items.first() else {
        panic!("expected function");
    };
    assert_eq!(func.name, "add");
    let params: Vec<_> = func.params.iter().map(|p| (p.name.as_str(), p.ty.to_string())).collect();
    assert_eq!(params, vec![("a", "int32".to_string()), ("b", "int32".to_string())]);
    assert_eq!(func.ret.as_ref().map(ToString::to_string), Some("int32".to_string()));
}

#[test]
fn test_extern_block_forms() {
    let file = parse_ok(
        "extern io {\n  func printf(*byte, ...) int32\n  func puts(s: *byte) int32\n}\nextern \"c\" { func abort() }\nextern { func exit(int32) }",
    );
    let blocks: Vec<_> = file
        .items
        .iter()
        .map(|item| match item {
            Item::Extern(block) => (block.namespace.clone(), block.functions.len()),
            other => panic!("expected extern, got {other:?}"),
        })
        .collect();
    assert_eq!(
        blocks,
        vec![(Some("io".to_string()), 2), (Some("c".to_string()), 1), (None, 1)]
    );
    let Some(Item::Extern(io)) = file.items.first() else {
        panic!("expected extern");
    };
    assert!(io.functions[0].variadic);
    let params: Vec<_> = io.functions[1].params.iter().map(ToString::to_string).collect();
    assert_eq!(params, vec!["*byte"]);
}

#[test]
fn test_class_with_methods_and_deinit() {
    let file = parse_ok(
        "class Counter {\n  count: int32\n  step: int32\n  func bump(self: *Counter) { self.count = self.count + self.step }\n  deinit { }\n}",
    );
    let Some(Item::Class(decl)) = file.items.first() else {
        panic!("expected class");
    };
    let fields: Vec<_> = decl.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(fields, vec!["count", "step"]);
    assert_eq!(decl.methods.len(), 1);
    assert!(decl.deinit.is_some());
}

#[test]
fn test_binary_chain_keeps_operator_pairs() {
    let ExprKind::Binary(chain) = stmt_expr("a < b") else {
        panic!("expected binary");
    };
    assert_eq!(chain.rest.len(), 1);
    assert_eq!(chain.rest[0].0, BinaryOp::Lt);

    let ExprKind::Binary(chain) = stmt_expr("a - b + c - d") else {
        panic!("expected binary");
    };
    let ops: Vec<_> = chain.rest.iter().map(|(op, _)| *op).collect();
    assert_eq!(ops, vec![BinaryOp::Sub, BinaryOp::Add, BinaryOp::Sub]);
}

#[test]
fn test_precedence_nests_tighter_levels() {
    let ExprKind::Binary(chain) = stmt_expr("a + b * c == d") else {
        panic!("expected binary");
    };
    assert_eq!(chain.rest[0].0, BinaryOp::Eq);
    let ExprKind::Binary(sum) = &chain.head.kind else {
        panic!("expected additive chain on the left");
    };
    assert_eq!(sum.rest[0].0, BinaryOp::Add);
    assert!(matches!(sum.rest[0].1.kind, ExprKind::Binary(_)));
}

#[test]
fn test_operator_on_next_line_starts_new_statement() {
    let stmts = body("func f() {\n  a\n  -b\n  g\n  (c)\n}");
    assert_eq!(stmts.len(), 4);
    assert!(matches!(
        &stmts[1],
        Stmt::Expr(e) if matches!(e.kind, ExprKind::Unary { op: UnaryOp::Neg, .. })
    ));
}

#[test]
fn test_assignment_targets() {
    let stmts = body("func f() {\n  x = 1\n  *p = 2\n  obj.field = 3\n}");
    let targets: Vec<_> = stmts
        .into_iter()
        .map(|s| match s {
            Stmt::Assign(a) => a.target,
            other => panic!("expected assignment, got {other:?}"),
        })
        .collect();
    assert!(matches!(&targets[0], AssignTarget::Name(n) if n == "x"));
    assert!(matches!(&targets[1], AssignTarget::Deref(e) if e.as_ident() == Some("p")));
    assert!(matches!(&targets[2], AssignTarget::Field { field, .. } if field == "field"));
}

#[test]
fn test_if_chain_shape() {
    let stmts = body("func f() {\n  if a { } else if b { } else if c { } else { }\n}");
    let Some(Stmt::If(stmt)) = stmts.first() else {
        panic!("expected if");
    };
    assert_eq!(stmt.branches.len(), 3);
    assert!(stmt.else_block.is_some());
}

#[test]
fn test_if_header_is_not_a_struct_literal() {
    let stmts = body("func f() {\n  if ready { go() }\n}");
    let Some(Stmt::If(stmt)) = stmts.first() else {
        panic!("expected if");
    };
    assert_eq!(stmt.branches[0].0.as_ident(), Some("ready"));
    assert_eq!(stmt.branches[0].1.stmts.len(), 1);
}

#[test]
fn test_for_header_forms() {
    let stmts = body(
        "func f() {\n  for { }\n  for x < 3 { }\n  for i in 0..10 { }\n  for var i = 0; i < 3; i = i + 1 { }\n  for (i = 0; i < 3; i = i + 1) { }\n  for ;; { }\n}",
    );
    let kinds: Vec<_> = stmts
        .into_iter()
        .map(|s| match s {
            Stmt::For(f) => f.kind,
            other => panic!("expected for, got {other:?}"),
        })
        .collect();
    assert!(matches!(kinds[0], ForKind::Cond(None)));
    assert!(matches!(kinds[1], ForKind::Cond(Some(_))));
    assert!(matches!(
        &kinds[2],
        ForKind::In { var, iterable, .. }
            if var == "i" && matches!(iterable.kind, ExprKind::Range { .. })
    ));
    assert!(matches!(
        &kinds[3],
        ForKind::Clause { init: Some(init), cond: Some(_), post: Some(_) }
            if matches!(**init, Stmt::Var(_))
    ));
    assert!(matches!(
        &kinds[4],
        ForKind::Clause { init: Some(_), cond: Some(_), post: Some(_) }
    ));
    assert!(matches!(
        &kinds[5],
        ForKind::Clause { init: None, cond: None, post: None }
    ));
}

#[test]
fn test_struct_literal_and_member_call() {
    let stmts = body("func f() {\n  var p = Point{x: 3, y: 4}\n  p.norm()\n}");
    let Some(Stmt::Var(decl)) = stmts.first() else {
        panic!("expected var");
    };
    let Some(ExprKind::StructLit { name, fields }) = decl.init.as_ref().map(|e| &e.kind) else {
        panic!("expected struct literal");
    };
    assert_eq!(name, "Point");
    assert_eq!(fields.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(), vec!["x", "y"]);
    assert!(matches!(
        &stmts[1],
        Stmt::Expr(e) if matches!(&e.kind, ExprKind::Call { callee, .. }
            if matches!(callee.kind, ExprKind::Member { .. }))
    ));
}

#[test]
fn test_cast_alloca_and_intrinsics() {
    assert!(matches!(
        stmt_expr("cast<*int8>(p)"),
        ExprKind::Cast { ty: TypeExpr::Pointer { .. }, .. }
    ));
    assert!(matches!(
        stmt_expr("alloca(int32, 4)"),
        ExprKind::Alloca { count: Some(_), .. }
    ));
    assert!(matches!(
        stmt_expr("sizeof(Point)"),
        ExprKind::Intrinsic { kind: Intrinsic::SizeOf, ty: Some(_), ref args } if args.is_empty()
    ));
    assert!(matches!(
        stmt_expr("va_arg(ap, int32)"),
        ExprKind::Intrinsic { kind: Intrinsic::VaArg, ty: Some(_), ref args } if args.len() == 1
    ));
    assert!(matches!(
        stmt_expr("memcpy(d, s, 8)"),
        ExprKind::Intrinsic { kind: Intrinsic::Memcpy, ty: None, ref args } if args.len() == 3
    ));
}

#[test]
fn test_types() {
    let stmts = body("func f() {\n  var a: [4]*int32\n  var m: map<string, vector<int>>\n}");
    let types: Vec<_> = stmts
        .into_iter()
        .filter_map(|s| match s {
            Stmt::Var(decl) => decl.ty.map(|t| t.to_string()),
            _ => None,
        })
        .collect();
    assert_eq!(types, vec!["[4]*int32", "map<string, vector<int>>"]);
}

#[test]
fn test_errors_recover_at_next_statement() {
    let output = parse("func f() {\n  var = 1\n  x = )\n  y = 2\n}\nfunc g() { }");
    let codes: Vec<_> = output.errors.iter().map(|e| e.code).collect();
    assert_eq!(codes, vec![ErrorCode::E1003, ErrorCode::E1002]);
    assert_eq!(output.file.items.len(), 2);
}

#[test]
fn test_bad_item_recovers_at_next_declaration() {
    let output = parse("42\nfunc ok() { }");
    assert_eq!(output.errors.len(), 1);
    assert_eq!(output.errors[0].code, ErrorCode::E1001);
    assert_eq!(output.file.items.len(), 1);
}

#[test]
fn test_lex_error_becomes_diagnostic() {
    let output = parse("func f() { var s = \"oops\n }");
    assert!(output.has_errors());
    let diag = output.errors[0].to_diagnostic(Some(std::path::Path::new("m.arc")));
    assert_eq!(diag.code, ErrorCode::E0001);
    assert!(diag.to_string().starts_with("m.arc:1:20: error[E0001]"));
}
