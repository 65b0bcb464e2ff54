//! Block-structured IR produced by lowering.
//!
//! The shape follows LLVM: a [`Module`] owns functions, string globals and
//! named struct types; a [`Function`] owns basic blocks; every finished
//! [`Block`] is a list of [`Instr`]s closed by exactly one [`Terminator`].
//! Values are typed and either constants, parameters, globals, function
//! references or temporaries defined by an instruction.
//!
//! The textual form printed by [`Display`](std::fmt::Display) lives in
//! `print.rs`.

mod print;
mod ty;

use rustc_hash::FxHashMap;
use smallvec::{smallvec, SmallVec};

pub use ty::Type;

// ── ID newtypes ─────────────────────────────────────────────────────

/// Index of a basic block within its function.
///
/// Block IDs are assigned in creation order and survive dead-block
/// removal unchanged, so they may have gaps in a finished function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct BlockId(u32);

impl BlockId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A temporary defined by exactly one instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ValueId(u32);

impl ValueId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

// ── Values ──────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub enum Constant {
    /// Integer bits, interpreted through the value's type.
    Int(u64),
    Float(f64),
    Null,
    /// All-zero aggregate.
    Zero,
    /// Result of a `void` call; never printed as an operand.
    Undef,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ValueKind {
    Temp(ValueId),
    /// Incoming argument by position.
    Param(u32),
    Const(Constant),
    /// Address of a module global.
    Global(String),
    /// Address of a function.
    Function(String),
}

/// A typed operand.
#[derive(Clone, Debug, PartialEq)]
pub struct Value {
    pub kind: ValueKind,
    pub ty: Type,
}

impl Value {
    pub fn temp(id: ValueId, ty: Type) -> Self {
        Value {
            kind: ValueKind::Temp(id),
            ty,
        }
    }

    pub fn param(index: u32, ty: Type) -> Self {
        Value {
            kind: ValueKind::Param(index),
            ty,
        }
    }

    pub fn constant(constant: Constant, ty: Type) -> Self {
        Value {
            kind: ValueKind::Const(constant),
            ty,
        }
    }

    pub fn const_int(bits: u64, ty: Type) -> Self {
        Value::constant(Constant::Int(bits), ty)
    }

    /// The `i64 0` stand-in used after a reported error.
    pub fn placeholder() -> Self {
        Value::const_int(0, Type::I64)
    }

    pub fn const_bool(value: bool) -> Self {
        Value::constant(Constant::Int(u64::from(value)), Type::Bool)
    }

    pub fn const_float(value: f64, ty: Type) -> Self {
        Value::constant(Constant::Float(value), ty)
    }

    pub fn null(ty: Type) -> Self {
        Value::constant(Constant::Null, ty)
    }

    /// The zero value of `ty`: `0`, `0.0`, `null` or `zeroinitializer`.
    pub fn zero(ty: Type) -> Self {
        let constant = match &ty {
            Type::Bool | Type::Int { .. } => Constant::Int(0),
            Type::Float { .. } => Constant::Float(0.0),
            Type::Ptr(_) => Constant::Null,
            Type::Void => Constant::Undef,
            Type::Struct(_) | Type::Array { .. } => Constant::Zero,
        };
        Value::constant(constant, ty)
    }

    /// What a `void` call evaluates to.
    pub fn void() -> Self {
        Value::constant(Constant::Undef, Type::Void)
    }

    pub fn global(name: impl Into<String>, ty: Type) -> Self {
        Value {
            kind: ValueKind::Global(name.into()),
            ty,
        }
    }

    /// A function address, typed as an untyped code pointer.
    pub fn function(name: impl Into<String>) -> Self {
        Value {
            kind: ValueKind::Function(name.into()),
            ty: Type::byte_ptr(),
        }
    }

    pub fn as_const_int(&self) -> Option<u64> {
        match self.kind {
            ValueKind::Const(Constant::Int(bits)) => Some(bits),
            _ => None,
        }
    }

    pub fn as_temp(&self) -> Option<ValueId> {
        match self.kind {
            ValueKind::Temp(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_const(&self) -> bool {
        matches!(self.kind, ValueKind::Const(_))
    }

    /// The same operand viewed at another type. Only valid where the IR
    /// type does not change: constants, or a change of signedness.
    pub fn retyped(self, ty: Type) -> Self {
        Value { kind: self.kind, ty }
    }
}

/// Read the low `width` bits of a constant as a two's complement integer.
#[expect(
    clippy::cast_possible_wrap,
    reason = "signed constants are stored as their two's complement bits"
)]
pub(crate) fn sign_extend(bits: u64, width: u32) -> i64 {
    let shift = 64 - width.clamp(1, 64);
    ((bits << shift) as i64) >> shift
}

// ── Operators ───────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    SDiv,
    UDiv,
    SRem,
    URem,
    FAdd,
    FSub,
    FMul,
    FDiv,
    FRem,
    And,
    Or,
    Xor,
}

impl BinOp {
    pub const fn as_str(self) -> &'static str {
        match self {
            BinOp::Add => "add",
            BinOp::Sub => "sub",
            BinOp::Mul => "mul",
            BinOp::SDiv => "sdiv",
            BinOp::UDiv => "udiv",
            BinOp::SRem => "srem",
            BinOp::URem => "urem",
            BinOp::FAdd => "fadd",
            BinOp::FSub => "fsub",
            BinOp::FMul => "fmul",
            BinOp::FDiv => "fdiv",
            BinOp::FRem => "frem",
            BinOp::And => "and",
            BinOp::Or => "or",
            BinOp::Xor => "xor",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntPredicate {
    Eq,
    Ne,
    Slt,
    Sle,
    Sgt,
    Sge,
    Ult,
    Ule,
    Ugt,
    Uge,
}

impl IntPredicate {
    pub const fn as_str(self) -> &'static str {
        match self {
            IntPredicate::Eq => "eq",
            IntPredicate::Ne => "ne",
            IntPredicate::Slt => "slt",
            IntPredicate::Sle => "sle",
            IntPredicate::Sgt => "sgt",
            IntPredicate::Sge => "sge",
            IntPredicate::Ult => "ult",
            IntPredicate::Ule => "ule",
            IntPredicate::Ugt => "ugt",
            IntPredicate::Uge => "uge",
        }
    }
}

/// Ordered float comparisons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FloatPredicate {
    Oeq,
    One,
    Olt,
    Ole,
    Ogt,
    Oge,
}

impl FloatPredicate {
    pub const fn as_str(self) -> &'static str {
        match self {
            FloatPredicate::Oeq => "oeq",
            FloatPredicate::One => "one",
            FloatPredicate::Olt => "olt",
            FloatPredicate::Ole => "ole",
            FloatPredicate::Ogt => "ogt",
            FloatPredicate::Oge => "oge",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CastOp {
    Trunc,
    ZExt,
    SExt,
    FpTrunc,
    FpExt,
    FpToSi,
    FpToUi,
    SiToFp,
    UiToFp,
    PtrToInt,
    IntToPtr,
    Bitcast,
}

impl CastOp {
    pub const fn as_str(self) -> &'static str {
        match self {
            CastOp::Trunc => "trunc",
            CastOp::ZExt => "zext",
            CastOp::SExt => "sext",
            CastOp::FpTrunc => "fptrunc",
            CastOp::FpExt => "fpext",
            CastOp::FpToSi => "fptosi",
            CastOp::FpToUi => "fptoui",
            CastOp::SiToFp => "sitofp",
            CastOp::UiToFp => "uitofp",
            CastOp::PtrToInt => "ptrtoint",
            CastOp::IntToPtr => "inttoptr",
            CastOp::Bitcast => "bitcast",
        }
    }
}

// ── Instructions ────────────────────────────────────────────────────

/// A non-terminating instruction.
///
/// Every variant with a `dst` defines that temporary; its type is carried
/// by the [`Value`] handed back from the builder.
#[derive(Clone, Debug, PartialEq)]
pub enum Instr {
    /// Stack slot for `count` (default 1) values of `ty`. `name` is a
    /// readability hint only (`x.addr`, `Point.instance`).
    Alloca {
        dst: ValueId,
        ty: Type,
        count: Option<Value>,
        name: String,
    },
    Load {
        dst: ValueId,
        ty: Type,
        ptr: Value,
    },
    Store {
        value: Value,
        ptr: Value,
    },
    Binary {
        dst: ValueId,
        op: BinOp,
        lhs: Value,
        rhs: Value,
    },
    ICmp {
        dst: ValueId,
        pred: IntPredicate,
        lhs: Value,
        rhs: Value,
    },
    FCmp {
        dst: ValueId,
        pred: FloatPredicate,
        lhs: Value,
        rhs: Value,
    },
    Cast {
        dst: ValueId,
        op: CastOp,
        value: Value,
        to: Type,
    },
    /// Address of field `index` of the struct `ptr` points at.
    StructGep {
        dst: ValueId,
        ptr: Value,
        index: u32,
        field_ty: Type,
    },
    /// `getelementptr inbounds` over `ptr`'s pointee with explicit indices.
    Gep {
        dst: ValueId,
        ptr: Value,
        indices: SmallVec<[Value; 2]>,
        result_ty: Type,
    },
    ExtractValue {
        dst: ValueId,
        aggregate: Value,
        index: u32,
        ty: Type,
    },
    InsertValue {
        dst: ValueId,
        aggregate: Value,
        value: Value,
        index: u32,
    },
    /// Direct call by IR name. `dst` is `None` for `void` callees.
    Call {
        dst: Option<ValueId>,
        callee: String,
        args: SmallVec<[Value; 4]>,
        ret: Type,
    },
    VaArg {
        dst: ValueId,
        list: Value,
        ty: Type,
    },
}

impl Instr {
    /// The temporary this instruction defines, if any.
    pub fn result(&self) -> Option<ValueId> {
        match self {
            Instr::Alloca { dst, .. }
            | Instr::Load { dst, .. }
            | Instr::Binary { dst, .. }
            | Instr::ICmp { dst, .. }
            | Instr::FCmp { dst, .. }
            | Instr::Cast { dst, .. }
            | Instr::StructGep { dst, .. }
            | Instr::Gep { dst, .. }
            | Instr::ExtractValue { dst, .. }
            | Instr::InsertValue { dst, .. }
            | Instr::VaArg { dst, .. } => Some(*dst),
            Instr::Call { dst, .. } => *dst,
            Instr::Store { .. } => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Terminator {
    Ret(Option<Value>),
    Br(BlockId),
    CondBr {
        cond: Value,
        then_block: BlockId,
        else_block: BlockId,
    },
    Unreachable,
}

impl Terminator {
    pub fn successors(&self) -> SmallVec<[BlockId; 2]> {
        match self {
            Terminator::Ret(_) | Terminator::Unreachable => SmallVec::new(),
            Terminator::Br(target) => smallvec![*target],
            Terminator::CondBr {
                then_block,
                else_block,
                ..
            } => smallvec![*then_block, *else_block],
        }
    }
}

// ── Blocks and functions ────────────────────────────────────────────

/// A finished basic block.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub id: BlockId,
    pub label: String,
    pub instrs: Vec<Instr>,
    pub terminator: Terminator,
    /// Distinct predecessor blocks, in block order.
    pub predecessors: Vec<BlockId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    /// Empty for unnamed extern parameters.
    pub name: String,
    pub ty: Type,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    /// IR name, after namespace or owner mangling.
    pub name: String,
    pub params: Vec<Param>,
    pub ret: Type,
    pub variadic: bool,
    /// Empty for declarations. The first block is the entry.
    pub blocks: Vec<Block>,
}

impl Function {
    pub fn declaration(name: impl Into<String>, params: Vec<Param>, ret: Type, variadic: bool) -> Self {
        Function {
            name: name.into(),
            params,
            ret,
            variadic,
            blocks: Vec::new(),
        }
    }

    pub fn is_declaration(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn entry(&self) -> Option<&Block> {
        self.blocks.first()
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn block_by_label(&self, label: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.label == label)
    }

    /// All instructions in block order.
    pub fn instrs(&self) -> impl Iterator<Item = &Instr> {
        self.blocks.iter().flat_map(|b| b.instrs.iter())
    }
}

// ── Module ──────────────────────────────────────────────────────────

/// Field layout of a struct or class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructDef {
    pub name: String,
    pub fields: Vec<(String, Type)>,
    pub is_class: bool,
    field_index: FxHashMap<String, u32>,
}

impl StructDef {
    /// Build a definition, numbering fields from 0 in declaration order.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "field counts never exceed u32"
    )]
    pub fn new(name: impl Into<String>, fields: Vec<(String, Type)>, is_class: bool) -> Self {
        let field_index = fields
            .iter()
            .enumerate()
            .map(|(i, (field, _))| (field.clone(), i as u32))
            .collect();
        StructDef {
            name: name.into(),
            fields,
            is_class,
            field_index,
        }
    }

    pub fn field_index(&self, field: &str) -> Option<u32> {
        self.field_index.get(field).copied()
    }

    pub fn field_type(&self, index: u32) -> Option<&Type> {
        self.fields.get(index as usize).map(|(_, ty)| ty)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum GlobalInit {
    Zero,
    Const(Constant),
    /// Raw bytes of a `[N x i8]` string constant, NUL included.
    Bytes(Vec<u8>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Global {
    pub name: String,
    pub ty: Type,
    pub init: GlobalInit,
    pub constant: bool,
}

/// A finished compilation unit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Module {
    pub name: String,
    pub functions: Vec<Function>,
    pub globals: Vec<Global>,
    /// Every registered struct and class, in registration order.
    pub named_types: Vec<StructDef>,
    function_index: FxHashMap<String, usize>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Module {
            name: name.into(),
            ..Module::default()
        }
    }

    /// Add a function unless one with the same IR name exists.
    ///
    /// Returns `false` (and keeps the existing one) on a name clash.
    pub fn add_function(&mut self, function: Function) -> bool {
        if self.function_index.contains_key(&function.name) {
            return false;
        }
        self.function_index
            .insert(function.name.clone(), self.functions.len());
        self.functions.push(function);
        true
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.function_index.get(name).map(|&i| &self.functions[i])
    }

    pub fn function_mut(&mut self, name: &str) -> Option<&mut Function> {
        self.function_index
            .get(name)
            .copied()
            .map(move |i| &mut self.functions[i])
    }

    pub fn global(&self, name: &str) -> Option<&Global> {
        self.globals.iter().find(|g| g.name == name)
    }

    pub fn named_type(&self, name: &str) -> Option<&StructDef> {
        self.named_types.iter().find(|def| def.name == name)
    }

    /// Store `text` as a NUL-terminated private constant named `.str.N`.
    ///
    /// Returns the global's address, typed as a pointer to the byte array.
    pub fn add_string(&mut self, text: &str) -> Value {
        let name = format!(".str.{}", self.globals.len());
        let mut bytes = text.as_bytes().to_vec();
        bytes.push(0);
        let ty = Type::Array {
            elem: Box::new(Type::I8),
            len: bytes.len() as u64,
        };
        self.globals.push(Global {
            name: name.clone(),
            ty: ty.clone(),
            init: GlobalInit::Bytes(bytes),
            constant: true,
        });
        Value::global(name, ty.ptr_to())
    }
}

#[cfg(test)]
mod tests;
