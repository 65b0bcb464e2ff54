//! IR type descriptors.

use std::fmt;

/// A type in the IR.
///
/// Struct and class types are referenced by name; their field layout lives
/// in the [`TypeRegistry`](crate::TypeRegistry) and is copied into
/// [`Module::named_types`](super::Module::named_types) when lowering
/// finishes. A class value is always reached through a `Ptr` to its struct.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Void,
    /// One-bit truth value (`i1`).
    Bool,
    Int { bits: u32, signed: bool },
    Float { bits: u32 },
    Ptr(Box<Type>),
    Struct(String),
    Array { elem: Box<Type>, len: u64 },
}

impl Type {
    pub const I8: Type = Type::Int { bits: 8, signed: true };
    pub const I32: Type = Type::Int { bits: 32, signed: true };
    pub const I64: Type = Type::Int { bits: 64, signed: true };
    pub const U8: Type = Type::Int { bits: 8, signed: false };
    pub const U32: Type = Type::Int { bits: 32, signed: false };
    pub const F32: Type = Type::Float { bits: 32 };
    pub const F64: Type = Type::Float { bits: 64 };

    #[inline]
    pub const fn int(bits: u32, signed: bool) -> Self {
        Type::Int { bits, signed }
    }

    /// `*self`
    pub fn ptr_to(self) -> Self {
        Type::Ptr(Box::new(self))
    }

    /// `*i8`, the type of C strings and untyped buffers.
    pub fn byte_ptr() -> Self {
        Type::I8.ptr_to()
    }

    /// Width and signedness of an integer type. `Bool` counts as an
    /// unsigned one-bit integer.
    pub fn int_info(&self) -> Option<(u32, bool)> {
        match self {
            Type::Int { bits, signed } => Some((*bits, *signed)),
            Type::Bool => Some((1, false)),
            _ => None,
        }
    }

    pub fn float_bits(&self) -> Option<u32> {
        match self {
            Type::Float { bits } => Some(*bits),
            _ => None,
        }
    }

    pub fn is_int(&self) -> bool {
        self.int_info().is_some()
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Type::Float { .. })
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, Type::Ptr(_))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    pub fn pointee(&self) -> Option<&Type> {
        match self {
            Type::Ptr(inner) => Some(inner),
            _ => None,
        }
    }

    /// Name of the struct or class this type names directly.
    pub fn struct_name(&self) -> Option<&str> {
        match self {
            Type::Struct(name) => Some(name),
            _ => None,
        }
    }

    /// Name of the struct reached by value or through one pointer.
    pub fn owner_struct(&self) -> Option<&str> {
        match self {
            Type::Struct(name) => Some(name),
            Type::Ptr(inner) => inner.struct_name(),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => f.write_str("void"),
            Type::Bool => f.write_str("i1"),
            Type::Int { bits, .. } => write!(f, "i{bits}"),
            Type::Float { bits: 16 } => f.write_str("half"),
            Type::Float { bits: 32 } => f.write_str("float"),
            Type::Float { bits: 64 } => f.write_str("double"),
            Type::Float { bits } => write!(f, "fp{bits}"),
            Type::Ptr(inner) => write!(f, "{inner}*"),
            Type::Struct(name) => write!(f, "%{name}"),
            Type::Array { elem, len } => write!(f, "[{len} x {elem}]"),
        }
    }
}
