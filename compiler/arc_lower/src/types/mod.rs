//! Type registry: builtin names, user structs and classes, layout.
//!
//! Struct and class registration happens in two steps so declaration order
//! never matters: [`declare`](TypeRegistry::declare) makes the name
//! resolvable, then [`register_struct`](TypeRegistry::register_struct) or
//! [`register_class`](TypeRegistry::register_class) fixes the field layout
//! once. Both steps are idempotent.

use arc_ast::{Span, TypeExpr};
use rustc_hash::FxHashMap;

use crate::ir::{StructDef, Type};

/// A type expression that could not be resolved exactly.
///
/// Resolution never fails: the caller gets a fallback type and reports
/// the problem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeProblem {
    /// Unknown name; resolved as `i64`.
    Unknown { name: String, span: Span },
    /// `vector<T>` / `map<K, V>`; resolved as an opaque `*i8`.
    Collection { name: String, span: Span },
}

#[derive(Clone, Debug)]
struct Entry {
    def: StructDef,
    /// `false` between `declare` and the first `register_*`.
    complete: bool,
}

/// Maps type names to IR types and owns every struct and class layout.
#[derive(Clone, Debug, Default)]
pub struct TypeRegistry {
    entries: FxHashMap<String, Entry>,
    order: Vec<String>,
}

/// Size and alignment of a type, in bytes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    pub size: u64,
    pub align: u64,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builtin scalar names.
    pub fn builtin(name: &str) -> Option<Type> {
        let ty = match name {
            "void" => Type::Void,
            "bool" | "i1" => Type::Bool,
            "i8" | "int8" => Type::int(8, true),
            "i16" | "int16" => Type::int(16, true),
            "i32" | "int32" | "rune" => Type::int(32, true),
            "i64" | "int64" | "int" | "isize" => Type::int(64, true),
            "i128" => Type::int(128, true),
            "u8" | "uint8" | "byte" => Type::int(8, false),
            "u16" | "uint16" => Type::int(16, false),
            "u32" | "uint32" | "char" => Type::int(32, false),
            "u64" | "uint64" | "uint" | "usize" => Type::int(64, false),
            "f16" => Type::Float { bits: 16 },
            "f32" | "float32" => Type::Float { bits: 32 },
            "f64" | "float64" | "float" => Type::Float { bits: 64 },
            "f128" => Type::Float { bits: 128 },
            "string" => Type::byte_ptr(),
            _ => return None,
        };
        Some(ty)
    }

    /// Resolve a bare name: builtins first, then declared structs/classes.
    pub fn resolve_name(&self, name: &str) -> Option<Type> {
        Self::builtin(name).or_else(|| {
            self.entries
                .contains_key(name)
                .then(|| Type::Struct(name.to_string()))
        })
    }

    /// Resolve a source type expression, pushing any problem found.
    pub fn resolve(&self, ty: &TypeExpr, problems: &mut Vec<TypeProblem>) -> Type {
        match ty {
            TypeExpr::Named { name, span } => self.resolve_name(name).unwrap_or_else(|| {
                problems.push(TypeProblem::Unknown {
                    name: name.clone(),
                    span: *span,
                });
                Type::I64
            }),
            TypeExpr::Pointer { pointee, .. } => self.resolve(pointee, problems).ptr_to(),
            TypeExpr::Array { elem, len, .. } => Type::Array {
                elem: Box::new(self.resolve(elem, problems)),
                len: *len,
            },
            TypeExpr::Generic { name, span, .. } => {
                problems.push(TypeProblem::Collection {
                    name: name.clone(),
                    span: *span,
                });
                Type::byte_ptr()
            }
        }
    }

    /// Make `name` resolvable before its fields are known.
    ///
    /// A later declaration of an existing name is ignored.
    pub fn declare(&mut self, name: &str, is_class: bool) {
        if self.entries.contains_key(name) {
            return;
        }
        self.entries.insert(
            name.to_string(),
            Entry {
                def: StructDef::new(name, Vec::new(), is_class),
                complete: false,
            },
        );
        self.order.push(name.to_string());
    }

    /// Fix the layout of a value-semantics struct.
    ///
    /// Returns `false` if `name` already has a layout; the existing one is
    /// kept unchanged.
    pub fn register_struct(&mut self, name: &str, fields: Vec<(String, Type)>) -> bool {
        self.register(name, fields, false)
    }

    /// Fix the layout of a reference-semantics class.
    pub fn register_class(&mut self, name: &str, fields: Vec<(String, Type)>) -> bool {
        self.register(name, fields, true)
    }

    fn register(&mut self, name: &str, fields: Vec<(String, Type)>, is_class: bool) -> bool {
        self.declare(name, is_class);
        match self.entries.get_mut(name) {
            Some(entry) if !entry.complete => {
                let is_class = entry.def.is_class;
                entry.def = StructDef::new(name, fields, is_class);
                entry.complete = true;
                tracing::trace!(name, is_class, "registered type layout");
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&StructDef> {
        self.entries.get(name).map(|entry| &entry.def)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn field_index(&self, type_name: &str, field: &str) -> Option<u32> {
        self.get(type_name)?.field_index(field)
    }

    pub fn is_class(&self, name: &str) -> bool {
        self.get(name).is_some_and(|def| def.is_class)
    }

    /// Every definition, in declaration order.
    pub fn definitions(&self) -> impl Iterator<Item = &StructDef> {
        self.order.iter().filter_map(|name| self.get(name))
    }

    // Layout

    /// Size of `ty` in bytes, or `None` when it does not fit in `u64`.
    pub fn size_of(&self, ty: &Type) -> Option<u64> {
        self.layout(ty).map(|layout| layout.size)
    }

    pub fn align_of(&self, ty: &Type) -> Option<u64> {
        self.layout(ty).map(|layout| layout.align)
    }

    pub fn layout(&self, ty: &Type) -> Option<Layout> {
        self.layout_in(ty, &mut Vec::new())
    }

    /// `visiting` holds the structs currently being laid out; a struct
    /// that contains itself by value counts as empty at the cycle.
    fn layout_in(&self, ty: &Type, visiting: &mut Vec<String>) -> Option<Layout> {
        let layout = match ty {
            Type::Void => Layout { size: 0, align: 1 },
            Type::Bool => Layout { size: 1, align: 1 },
            Type::Int { bits, .. } | Type::Float { bits } => {
                let bytes = u64::from(bits.div_ceil(8)).next_power_of_two();
                Layout {
                    size: bytes,
                    align: bytes,
                }
            }
            Type::Ptr(_) => Layout { size: 8, align: 8 },
            Type::Array { elem, len } => {
                let elem = self.layout_in(elem, visiting)?;
                Layout {
                    size: elem.size.checked_mul(*len)?,
                    align: elem.align,
                }
            }
            Type::Struct(name) => {
                if visiting.iter().any(|n| n == name) {
                    return Some(Layout { size: 0, align: 1 });
                }
                let Some(def) = self.get(name) else {
                    return Some(Layout { size: 0, align: 1 });
                };
                visiting.push(name.clone());
                let fields = def
                    .fields
                    .iter()
                    .map(|(_, field_ty)| self.layout_in(field_ty, visiting))
                    .collect::<Option<Vec<_>>>();
                visiting.pop();
                let mut size = 0u64;
                let mut align = 1;
                for field in fields? {
                    size = align_to(size, field.align)?.checked_add(field.size)?;
                    align = align.max(field.align);
                }
                Layout {
                    size: align_to(size, align)?,
                    align,
                }
            }
        };
        Some(layout)
    }
}

fn align_to(offset: u64, align: u64) -> Option<u64> {
    offset.div_ceil(align).checked_mul(align)
}
