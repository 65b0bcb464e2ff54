//! Lexer for Arc using logos.
//!
//! Produces a flat token list terminated by [`TokenKind::Eof`]. Whitespace,
//! newlines and comments are skipped, but each token remembers whether a
//! line break preceded it: statements end at a line break, so the parser
//! needs that bit to decide whether `-x` on the next line continues an
//! expression.

use std::fmt;

use arc_ast::Span;
use arc_diagnostic::ErrorCode;
use logos::Logos;

use crate::ParseError;

/// Raw token from logos (before cooking literals).
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum RawToken {
    // === Comments ===
    #[regex(r"//[^\n]*", logos::skip)]
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/", logos::skip)]
    Comment,

    // === Keywords ===
    #[token("namespace")]
    Namespace,
    #[token("import")]
    Import,
    #[token("extern")]
    Extern,
    #[token("func")]
    #[token("fn")]
    Func,
    #[token("struct")]
    Struct,
    #[token("class")]
    Class,
    #[token("var")]
    Var,
    #[token("const")]
    Const,
    #[token("return")]
    Return,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("for")]
    For,
    #[token("in")]
    In,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("defer")]
    Defer,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,

    // === Punctuation ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token("...")]
    Ellipsis,
    #[token("..")]
    DotDot,
    #[token(".")]
    Dot,
    #[token("->")]
    Arrow,

    // === Operators ===
    #[token("==")]
    EqEq,
    #[token("=")]
    Eq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    LtEq,
    #[token("<")]
    Lt,
    #[token(">=")]
    GtEq,
    #[token(">")]
    Gt,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("!")]
    Bang,
    #[token("&&")]
    AmpAmp,
    #[token("&")]
    Amp,
    #[token("||")]
    PipePipe,

    // === Literals ===
    #[regex(r"0x[0-9a-fA-F][0-9a-fA-F_]*", |lex| parse_radix(&lex.slice()[2..], 16))]
    #[regex(r"0b[01][01_]*", |lex| parse_radix(&lex.slice()[2..], 2))]
    #[regex(r"0o[0-7][0-7_]*", |lex| parse_radix(&lex.slice()[2..], 8))]
    #[regex(r"[0-9][0-9_]*", |lex| parse_radix(lex.slice(), 10))]
    Int(u64),

    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*([eE][+-]?[0-9]+)?", |lex| lex.slice().replace('_', "").parse::<f64>().ok())]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9]+", |lex| lex.slice().replace('_', "").parse::<f64>().ok())]
    Float(f64),

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    Str,

    #[regex(r#""([^"\\\n]|\\.)*"#)]
    UnterminatedStr,

    #[regex(r"'([^'\\\n]|\\.)'")]
    Char,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
}

fn parse_radix(digits: &str, radix: u32) -> Option<u64> {
    u64::from_str_radix(&digits.replace('_', ""), radix).ok()
}

/// Cooked token kind.
#[derive(Clone, PartialEq, Debug)]
pub enum TokenKind {
    // Literals
    Int(u64),
    Float(f64),
    Str(String),
    Char(char),
    Ident(String),

    // Keywords
    Namespace,
    Import,
    Extern,
    Func,
    Struct,
    Class,
    Var,
    Const,
    Return,
    If,
    Else,
    For,
    In,
    Break,
    Continue,
    Defer,
    True,
    False,
    Null,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Colon,
    Semicolon,
    Ellipsis,
    DotDot,
    Dot,
    Arrow,

    // Operators
    EqEq,
    Eq,
    NotEq,
    LtEq,
    Lt,
    GtEq,
    Gt,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    AmpAmp,
    Amp,
    PipePipe,

    /// Unlexable input; already reported.
    Error,
    Eof,
}

impl TokenKind {
    /// Human-readable description for error messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Int(n) => format!("integer `{n}`"),
            TokenKind::Float(f) => format!("float `{f}`"),
            TokenKind::Str(_) => "string literal".to_string(),
            TokenKind::Char(_) => "character literal".to_string(),
            TokenKind::Ident(name) => format!("identifier `{name}`"),
            TokenKind::Error => "invalid token".to_string(),
            TokenKind::Eof => "end of file".to_string(),
            other => format!("`{}`", other.symbol()),
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            TokenKind::Namespace => "namespace",
            TokenKind::Import => "import",
            TokenKind::Extern => "extern",
            TokenKind::Func => "func",
            TokenKind::Struct => "struct",
            TokenKind::Class => "class",
            TokenKind::Var => "var",
            TokenKind::Const => "const",
            TokenKind::Return => "return",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::For => "for",
            TokenKind::In => "in",
            TokenKind::Break => "break",
            TokenKind::Continue => "continue",
            TokenKind::Defer => "defer",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Null => "null",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Semicolon => ";",
            TokenKind::Ellipsis => "...",
            TokenKind::DotDot => "..",
            TokenKind::Dot => ".",
            TokenKind::Arrow => "->",
            TokenKind::EqEq => "==",
            TokenKind::Eq => "=",
            TokenKind::NotEq => "!=",
            TokenKind::LtEq => "<=",
            TokenKind::Lt => "<",
            TokenKind::GtEq => ">=",
            TokenKind::Gt => ">",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Bang => "!",
            TokenKind::AmpAmp => "&&",
            TokenKind::Amp => "&",
            TokenKind::PipePipe => "||",
            TokenKind::Int(_)
            | TokenKind::Float(_)
            | TokenKind::Str(_)
            | TokenKind::Char(_)
            | TokenKind::Ident(_)
            | TokenKind::Error
            | TokenKind::Eof => "",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// A token with its position.
#[derive(Clone, PartialEq, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// A line break separates this token from the previous one.
    pub newline_before: bool,
}

/// Maps byte offsets to 1-based line/column pairs.
struct LineIndex<'src> {
    source: &'src str,
    line_starts: Vec<usize>,
}

impl<'src> LineIndex<'src> {
    fn new(source: &'src str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        LineIndex {
            source,
            line_starts,
        }
    }

    fn span_at(&self, offset: usize) -> Span {
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let start = self.line_starts[line - 1];
        let column = self.source[start..offset].chars().count() + 1;
        Span::new(to_u32(line), to_u32(column))
    }
}

fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Lex all tokens from the source.
///
/// Lexing never stops at a bad character: it is reported, replaced by
/// [`TokenKind::Error`], and lexing continues.
pub fn lex(source: &str) -> (Vec<Token>, Vec<ParseError>) {
    let index = LineIndex::new(source);
    let mut tokens: Vec<Token> = Vec::new();
    let mut errors = Vec::new();
    let mut logos = RawToken::lexer(source);
    let mut last_line = 1;

    while let Some(result) = logos.next() {
        let span = index.span_at(logos.span().start);
        let slice = logos.slice();
        let kind = match result {
            Ok(raw) => cook(raw, slice).unwrap_or_else(|err| {
                errors.push(err.at(span));
                TokenKind::Error
            }),
            Err(()) => {
                errors.push(classify_error(slice).at(span));
                TokenKind::Error
            }
        };
        tokens.push(Token {
            kind,
            span,
            newline_before: !tokens.is_empty() && span.line > last_line,
        });
        last_line = span.line;
    }

    let eof = index.span_at(source.len());
    tokens.push(Token {
        kind: TokenKind::Eof,
        span: eof,
        newline_before: eof.line > last_line,
    });
    tracing::trace!(count = tokens.len(), errors = errors.len(), "lexed source");
    (tokens, errors)
}

/// An error found while cooking a token, before its position is attached.
struct LexError {
    code: ErrorCode,
    message: String,
}

impl LexError {
    fn at(self, span: Span) -> ParseError {
        ParseError::new(self.code, self.message, span)
    }
}

fn classify_error(slice: &str) -> LexError {
    let first = slice.chars().next().unwrap_or(' ');
    if first.is_ascii_digit() {
        LexError {
            code: ErrorCode::E0003,
            message: format!("invalid number literal `{slice}`"),
        }
    } else if first == '\'' {
        LexError {
            code: ErrorCode::E0004,
            message: "invalid character literal".to_string(),
        }
    } else {
        LexError {
            code: ErrorCode::E0002,
            message: format!("invalid character `{}`", first.escape_default()),
        }
    }
}

fn cook(raw: RawToken, slice: &str) -> Result<TokenKind, LexError> {
    Ok(match raw {
        RawToken::Int(n) => TokenKind::Int(n),
        RawToken::Float(f) => TokenKind::Float(f),
        RawToken::Str => TokenKind::Str(unescape(&slice[1..slice.len() - 1])?),
        RawToken::UnterminatedStr => {
            return Err(LexError {
                code: ErrorCode::E0001,
                message: "unterminated string literal".to_string(),
            })
        }
        RawToken::Char => {
            let text = unescape(&slice[1..slice.len() - 1])?;
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => TokenKind::Char(c),
                _ => {
                    return Err(LexError {
                        code: ErrorCode::E0004,
                        message: format!("invalid character literal {slice}"),
                    })
                }
            }
        }
        RawToken::Ident => TokenKind::Ident(slice.to_string()),
        RawToken::Comment => TokenKind::Error,

        RawToken::Namespace => TokenKind::Namespace,
        RawToken::Import => TokenKind::Import,
        RawToken::Extern => TokenKind::Extern,
        RawToken::Func => TokenKind::Func,
        RawToken::Struct => TokenKind::Struct,
        RawToken::Class => TokenKind::Class,
        RawToken::Var => TokenKind::Var,
        RawToken::Const => TokenKind::Const,
        RawToken::Return => TokenKind::Return,
        RawToken::If => TokenKind::If,
        RawToken::Else => TokenKind::Else,
        RawToken::For => TokenKind::For,
        RawToken::In => TokenKind::In,
        RawToken::Break => TokenKind::Break,
        RawToken::Continue => TokenKind::Continue,
        RawToken::Defer => TokenKind::Defer,
        RawToken::True => TokenKind::True,
        RawToken::False => TokenKind::False,
        RawToken::Null => TokenKind::Null,

        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Semicolon => TokenKind::Semicolon,
        RawToken::Ellipsis => TokenKind::Ellipsis,
        RawToken::DotDot => TokenKind::DotDot,
        RawToken::Dot => TokenKind::Dot,
        RawToken::Arrow => TokenKind::Arrow,

        RawToken::EqEq => TokenKind::EqEq,
        RawToken::Eq => TokenKind::Eq,
        RawToken::NotEq => TokenKind::NotEq,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::Lt => TokenKind::Lt,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::Gt => TokenKind::Gt,
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::Slash => TokenKind::Slash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::Bang => TokenKind::Bang,
        RawToken::AmpAmp => TokenKind::AmpAmp,
        RawToken::Amp => TokenKind::Amp,
        RawToken::PipePipe => TokenKind::PipePipe,
    })
}

/// Resolve escape sequences in string and character literal bodies.
fn unescape(body: &str) -> Result<String, LexError> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escaped = match chars.next() {
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some('0') => '\0',
            Some('\\') => '\\',
            Some('"') => '"',
            Some('\'') => '\'',
            Some('x') => {
                let hex: String = chars.by_ref().take(2).collect();
                u8::from_str_radix(&hex, 16)
                    .map(char::from)
                    .map_err(|_| LexError {
                        code: ErrorCode::E0004,
                        message: format!("invalid escape `\\x{hex}`"),
                    })?
            }
            other => {
                return Err(LexError {
                    code: ErrorCode::E0004,
                    message: format!(
                        "unknown escape sequence `\\{}`",
                        other.map(String::from).unwrap_or_default()
                    ),
                })
            }
        };
        out.push(escaped);
    }
    Ok(out)
}

#[cfg(test)]
mod tests;
