//! Binary and unary operators.
//!
//! Binary operators are grouped by precedence level. The parser emits one
//! [`BinaryChain`](super::BinaryChain) per level, so every operator in a
//! chain shares the same [`Precedence`].

/// Binary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    // Logical
    Or,
    And,

    // Equality
    Eq,
    NotEq,

    // Relational
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Additive
    Add,
    Sub,

    // Multiplicative
    Mul,
    Div,
    Mod,
}

/// Precedence levels, lowest binding first.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum Precedence {
    LogicalOr,
    LogicalAnd,
    Equality,
    Relational,
    Additive,
    Multiplicative,
}

impl BinaryOp {
    /// Returns the source-level symbol for this operator.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Or => "||",
            Self::And => "&&",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
        }
    }

    /// The precedence level this operator belongs to.
    pub const fn precedence(self) -> Precedence {
        match self {
            Self::Or => Precedence::LogicalOr,
            Self::And => Precedence::LogicalAnd,
            Self::Eq | Self::NotEq => Precedence::Equality,
            Self::Lt | Self::LtEq | Self::Gt | Self::GtEq => Precedence::Relational,
            Self::Add | Self::Sub => Precedence::Additive,
            Self::Mul | Self::Div | Self::Mod => Precedence::Multiplicative,
        }
    }

    /// Whether the result is a one-bit truth value.
    pub const fn is_comparison(self) -> bool {
        matches!(
            self.precedence(),
            Precedence::Equality | Precedence::Relational
        )
    }

    /// Whether this is `&&` or `||`.
    pub const fn is_logical(self) -> bool {
        matches!(self, Self::And | Self::Or)
    }
}

/// Unary prefix operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `!x`
    Not,
    /// `*x`
    Deref,
    /// `&x`
    AddrOf,
}

impl UnaryOp {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Not => "!",
            Self::Deref => "*",
            Self::AddrOf => "&",
        }
    }
}

/// Compiler intrinsics recognized by name in call position.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Intrinsic {
    SizeOf,
    AlignOf,
    BitCast,
    Memset,
    Memcpy,
    Memmove,
    Strlen,
    Memchr,
    Memcmp,
    VaStart,
    VaArg,
    VaEnd,
    Raise,
}

impl Intrinsic {
    /// Look up an intrinsic by its source name.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "sizeof" => Self::SizeOf,
            "alignof" => Self::AlignOf,
            "bit_cast" => Self::BitCast,
            "memset" => Self::Memset,
            "memcpy" => Self::Memcpy,
            "memmove" => Self::Memmove,
            "strlen" => Self::Strlen,
            "memchr" => Self::Memchr,
            "memcmp" => Self::Memcmp,
            "va_start" => Self::VaStart,
            "va_arg" => Self::VaArg,
            "va_end" => Self::VaEnd,
            "raise" => Self::Raise,
            _ => return None,
        })
    }

    /// Source name of the intrinsic.
    pub const fn name(self) -> &'static str {
        match self {
            Self::SizeOf => "sizeof",
            Self::AlignOf => "alignof",
            Self::BitCast => "bit_cast",
            Self::Memset => "memset",
            Self::Memcpy => "memcpy",
            Self::Memmove => "memmove",
            Self::Strlen => "strlen",
            Self::Memchr => "memchr",
            Self::Memcmp => "memcmp",
            Self::VaStart => "va_start",
            Self::VaArg => "va_arg",
            Self::VaEnd => "va_end",
            Self::Raise => "raise",
        }
    }

    /// Whether the first argument is a type rather than an expression.
    ///
    /// `va_arg(list, T)` takes its type second and is handled separately.
    pub const fn takes_leading_type(self) -> bool {
        matches!(self, Self::SizeOf | Self::AlignOf | Self::BitCast)
    }
}
