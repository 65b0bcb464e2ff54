use pretty_assertions::assert_eq;

use super::*;
use crate::Span;

#[test]
fn operators_report_their_level() {
    assert_eq!(BinaryOp::Or.precedence(), Precedence::LogicalOr);
    assert_eq!(BinaryOp::GtEq.precedence(), Precedence::Relational);
    assert_eq!(BinaryOp::Mod.precedence(), Precedence::Multiplicative);
    assert!(Precedence::Additive < Precedence::Multiplicative);
}

#[test]
fn comparisons_and_logical_ops_are_classified() {
    assert!(BinaryOp::Eq.is_comparison());
    assert!(BinaryOp::Lt.is_comparison());
    assert!(!BinaryOp::Add.is_comparison());
    assert!(BinaryOp::And.is_logical());
    assert!(!BinaryOp::Eq.is_logical());
}

#[test]
fn intrinsic_names_round_trip() {
    for name in [
        "sizeof", "alignof", "bit_cast", "memset", "memcpy", "memmove", "strlen", "memchr",
        "memcmp", "va_start", "va_arg", "va_end", "raise",
    ] {
        let intrinsic = Intrinsic::from_name(name);
        assert_eq!(intrinsic.map(Intrinsic::name), Some(name));
    }
    assert_eq!(Intrinsic::from_name("printf"), None);
}

#[test]
fn type_expr_display_matches_source_syntax() {
    let ty = TypeExpr::pointer(TypeExpr::named("int32"));
    assert_eq!(ty.to_string(), "*int32");

    let arr = TypeExpr::Array {
        elem: Box::new(TypeExpr::named("u8")),
        len: 16,
        span: Span::DUMMY,
    };
    assert_eq!(arr.to_string(), "[16]u8");

    let map = TypeExpr::Generic {
        name: "map".into(),
        args: vec![TypeExpr::named("string"), TypeExpr::named("int")],
        span: Span::DUMMY,
    };
    assert_eq!(map.to_string(), "map<string, int>");
}

#[test]
fn stmt_span_reaches_inner_node() {
    let span = Span::new(4, 2);
    let stmt = Stmt::Expr(Expr::new(ExprKind::Ident("x".into()), span));
    assert_eq!(stmt.span(), span);
    assert_eq!(Stmt::Break(span).span(), span);
}

#[test]
fn as_ident_only_matches_bare_names() {
    let ident = Expr::new(ExprKind::Ident("io".into()), Span::DUMMY);
    assert_eq!(ident.as_ident(), Some("io"));
    let lit = Expr::new(ExprKind::Int(1), Span::DUMMY);
    assert_eq!(lit.as_ident(), None);
}
