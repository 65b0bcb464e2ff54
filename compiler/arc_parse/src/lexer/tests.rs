use pretty_assertions::assert_eq;

use super::*;

fn kinds(source: &str) -> Vec<TokenKind> {
    let (tokens, errors) = lex(source);
    assert!(errors.is_empty(), "unexpected lex errors: {errors:?}");
    tokens.into_iter().map(|t| t.kind).collect()
}

#[test]
fn test_keywords_and_punctuation() {
    assert_eq!(
        kinds("func fn extern { } ... .. ."),
        vec![
            TokenKind::Func,
            TokenKind::Func,
            TokenKind::Extern,
            TokenKind::LBrace,
            TokenKind::RBrace,
            TokenKind::Ellipsis,
            TokenKind::DotDot,
            TokenKind::Dot,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_integer_radixes() {
    assert_eq!(
        kinds("42 0x2A 0b101010 0o52 1_000"),
        vec![
            TokenKind::Int(42),
            TokenKind::Int(42),
            TokenKind::Int(42),
            TokenKind::Int(42),
            TokenKind::Int(1000),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_range_is_not_a_float() {
    assert_eq!(
        kinds("0..10 1.5"),
        vec![
            TokenKind::Int(0),
            TokenKind::DotDot,
            TokenKind::Int(10),
            TokenKind::Float(1.5),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_string_escapes() {
    assert_eq!(
        kinds(r#""a\tb\n\x41""#),
        vec![TokenKind::Str("a\tb\nA".to_string()), TokenKind::Eof]
    );
    assert_eq!(
        kinds(r"'x' '\n'"),
        vec![TokenKind::Char('x'), TokenKind::Char('\n'), TokenKind::Eof]
    );
}

#[test]
fn test_comments_are_skipped() {
    assert_eq!(
        kinds("a // line\n/* block\n comment */ b"),
        vec![
            TokenKind::Ident("a".to_string()),
            TokenKind::Ident("b".to_string()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_positions_and_newline_flag() {
    let (tokens, _) = lex("var x\n  x = 1");
    let positions: Vec<_> = tokens
        .iter()
        .map(|t| (t.span.line, t.span.column, t.newline_before))
        .collect();
    assert_eq!(
        positions,
        vec![
            (1, 1, false),
            (1, 5, false),
            (2, 3, true),
            (2, 5, false),
            (2, 7, false),
            (2, 8, false),
        ]
    );
}

#[test]
fn test_unterminated_string_reports_e0001() {
    let (tokens, errors) = lex("\"abc\nx");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ErrorCode::E0001);
    assert_eq!(tokens[0].kind, TokenKind::Error);
}

#[test]
fn test_invalid_character_recovers() {
    let (tokens, errors) = lex("a $ b");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ErrorCode::E0002);
    assert_eq!(tokens.len(), 4);
}

#[test]
fn test_integer_overflow_reports_e0003() {
    let (_, errors) = lex("99999999999999999999999");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ErrorCode::E0003);
}
