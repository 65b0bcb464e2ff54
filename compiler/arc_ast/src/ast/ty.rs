//! Type expressions as written in source.

use std::fmt;

use crate::Span;

/// A type as written in source.
///
/// Name resolution happens in the type registry; the parser never decides
/// whether `Point` is a struct, a class, or unknown.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeExpr {
    /// `int32`, `Point`, `string`
    Named { name: String, span: Span },
    /// `*T`
    Pointer { pointee: Box<TypeExpr>, span: Span },
    /// `[N]T`
    Array {
        elem: Box<TypeExpr>,
        len: u64,
        span: Span,
    },
    /// `vector<T>`, `map<K, V>`
    Generic {
        name: String,
        args: Vec<TypeExpr>,
        span: Span,
    },
}

impl TypeExpr {
    /// Shorthand for a named type at a dummy position.
    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Named {
            name: name.into(),
            span: Span::DUMMY,
        }
    }

    /// Shorthand for `*inner` at a dummy position.
    pub fn pointer(inner: TypeExpr) -> Self {
        TypeExpr::Pointer {
            pointee: Box::new(inner),
            span: Span::DUMMY,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            TypeExpr::Named { span, .. }
            | TypeExpr::Pointer { span, .. }
            | TypeExpr::Array { span, .. }
            | TypeExpr::Generic { span, .. } => *span,
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Named { name, .. } => write!(f, "{name}"),
            TypeExpr::Pointer { pointee, .. } => write!(f, "*{pointee}"),
            TypeExpr::Array { elem, len, .. } => write!(f, "[{len}]{elem}"),
            TypeExpr::Generic { name, args, .. } => {
                write!(f, "{name}<")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ">")
            }
        }
    }
}
