//! A small interpreter for lowered IR.
//!
//! Lets tests check what a program computes instead of which instructions
//! it was lowered to. Memory is a list of allocations, each a list of
//! elements; a pointer names an allocation, an element and a path of
//! field indices into it. External functions and `va_arg` are not
//! supported.

#![allow(
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    reason = "the interpreter reinterprets integer bits the way the IR does"
)]

use rustc_hash::FxHashMap;

use crate::ir::{
    sign_extend, BinOp, CastOp, Constant, FloatPredicate, GlobalInit, Instr, IntPredicate, Module,
    Terminator, Type, Value, ValueId, ValueKind,
};

const FUEL: u32 = 1_000_000;

#[derive(Clone, Debug, PartialEq)]
pub enum Val {
    Int { bits: u64, width: u32 },
    Float(f64),
    Ptr(Option<Pointer>),
    Agg(Vec<Val>),
    Undef,
    Void,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Pointer {
    alloc: usize,
    elem: usize,
    path: Vec<u32>,
}

impl Val {
    pub fn int(value: i64, ty: &Type) -> Val {
        int_val(value as u64, ty)
    }

    pub fn as_i64(&self) -> i64 {
        match self {
            Val::Int { bits, width } => sign_extend(*bits, *width),
            other => panic!("expected an integer, got {other:?}"),
        }
    }

    pub fn as_u64(&self) -> u64 {
        match self {
            Val::Int { bits, .. } => *bits,
            other => panic!("expected an integer, got {other:?}"),
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            Val::Float(value) => *value,
            other => panic!("expected a float, got {other:?}"),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Val::Ptr(None))
    }

    fn as_bool(&self) -> bool {
        self.as_u64() != 0
    }

    fn as_pointer(&self) -> Pointer {
        match self {
            Val::Ptr(Some(pointer)) => pointer.clone(),
            other => panic!("expected a non-null pointer, got {other:?}"),
        }
    }
}

fn width(ty: &Type) -> u32 {
    ty.int_info()
        .map(|(bits, _)| bits)
        .unwrap_or_else(|| panic!("expected an integer type, got {ty}"))
}

fn mask(bits: u64, width: u32) -> u64 {
    if width >= 64 {
        bits
    } else {
        bits & ((1u64 << width) - 1)
    }
}

fn int_val(bits: u64, ty: &Type) -> Val {
    let width = width(ty);
    Val::Int {
        bits: mask(bits, width),
        width,
    }
}

/// Call `function` in a fresh machine and return its result.
pub fn run(module: &Module, function: &str, args: &[Val]) -> Val {
    Machine::new(module).call(function, args)
}

struct Machine<'m> {
    module: &'m Module,
    memory: Vec<Vec<Val>>,
    globals: FxHashMap<String, usize>,
    fuel: u32,
}

struct Frame<'a> {
    temps: FxHashMap<ValueId, Val>,
    args: &'a [Val],
}

impl<'m> Machine<'m> {
    fn new(module: &'m Module) -> Self {
        let mut machine = Machine {
            module,
            memory: Vec::new(),
            globals: FxHashMap::default(),
            fuel: FUEL,
        };
        for global in &module.globals {
            let value = match &global.init {
                GlobalInit::Zero => machine.zero(&global.ty),
                GlobalInit::Const(constant) => machine.constant(constant, &global.ty),
                GlobalInit::Bytes(bytes) => Val::Agg(
                    bytes
                        .iter()
                        .map(|&byte| int_val(u64::from(byte), &Type::I8))
                        .collect(),
                ),
            };
            machine.globals.insert(global.name.clone(), machine.memory.len());
            machine.memory.push(vec![value]);
        }
        machine
    }

    fn call(&mut self, name: &str, args: &[Val]) -> Val {
        let module = self.module;
        let function = module
            .function(name)
            .unwrap_or_else(|| panic!("no function '{name}'"));
        assert!(
            !function.is_declaration(),
            "cannot interpret external function '{name}'"
        );
        let mut frame = Frame {
            temps: FxHashMap::default(),
            args,
        };
        let mut block = &function.blocks[0];
        loop {
            for instr in &block.instrs {
                self.fuel = self
                    .fuel
                    .checked_sub(1)
                    .unwrap_or_else(|| panic!("out of fuel in '{name}'"));
                self.step(instr, &mut frame);
            }
            let next = match &block.terminator {
                Terminator::Ret(value) => {
                    return value
                        .as_ref()
                        .map_or(Val::Void, |value| self.eval(value, &frame));
                }
                Terminator::Br(target) => *target,
                Terminator::CondBr {
                    cond,
                    then_block,
                    else_block,
                } => {
                    if self.eval(cond, &frame).as_bool() {
                        *then_block
                    } else {
                        *else_block
                    }
                }
                Terminator::Unreachable => panic!("reached unreachable in '{name}'"),
            };
            block = function
                .block(next)
                .unwrap_or_else(|| panic!("missing block {}", next.raw()));
        }
    }

    fn step(&mut self, instr: &Instr, frame: &mut Frame<'_>) {
        let result = match instr {
            Instr::Alloca { ty, count, .. } => {
                let count = count
                    .as_ref()
                    .map_or(1, |count| self.eval(count, frame).as_u64() as usize);
                let shape = self.undef(ty);
                self.memory.push(vec![shape; count]);
                Val::Ptr(Some(Pointer {
                    alloc: self.memory.len() - 1,
                    elem: 0,
                    path: Vec::new(),
                }))
            }
            Instr::Load { ptr, .. } => {
                let pointer = self.eval(ptr, frame).as_pointer();
                self.read(&pointer)
            }
            Instr::Store { value, ptr } => {
                let value = self.eval(value, frame);
                let pointer = self.eval(ptr, frame).as_pointer();
                *self.place(&pointer) = value;
                return;
            }
            Instr::Binary { op, lhs, rhs, .. } => {
                let lhs = self.eval(lhs, frame);
                let rhs = self.eval(rhs, frame);
                binary(*op, &lhs, &rhs)
            }
            Instr::ICmp { pred, lhs, rhs, .. } => {
                let lhs = self.eval(lhs, frame);
                let rhs = self.eval(rhs, frame);
                bool_val(icmp(*pred, &lhs, &rhs))
            }
            Instr::FCmp { pred, lhs, rhs, .. } => {
                let lhs = self.eval(lhs, frame).as_f64();
                let rhs = self.eval(rhs, frame).as_f64();
                bool_val(fcmp(*pred, lhs, rhs))
            }
            Instr::Cast { op, value, to, .. } => {
                let from = value.ty.clone();
                let value = self.eval(value, frame);
                cast(*op, &value, &from, to)
            }
            Instr::StructGep { ptr, index, .. } => {
                let mut pointer = self.eval(ptr, frame).as_pointer();
                pointer.path.push(*index);
                Val::Ptr(Some(pointer))
            }
            Instr::Gep { ptr, indices, .. } => {
                let mut pointer = self.eval(ptr, frame).as_pointer();
                let mut indices = indices.iter().map(|index| self.eval(index, frame).as_i64());
                if let Some(first) = indices.next() {
                    let elem = pointer.elem as i64 + first;
                    pointer.elem = usize::try_from(elem)
                        .unwrap_or_else(|_| panic!("pointer offset {elem} out of bounds"));
                }
                pointer.path.extend(indices.map(|index| index as u32));
                Val::Ptr(Some(pointer))
            }
            Instr::ExtractValue {
                aggregate, index, ..
            } => match self.eval(aggregate, frame) {
                Val::Agg(fields) => fields[*index as usize].clone(),
                other => panic!("extractvalue from {other:?}"),
            },
            Instr::InsertValue {
                aggregate,
                value,
                index,
                ..
            } => {
                let value = self.eval(value, frame);
                match self.eval(aggregate, frame) {
                    Val::Agg(mut fields) => {
                        fields[*index as usize] = value;
                        Val::Agg(fields)
                    }
                    other => panic!("insertvalue into {other:?}"),
                }
            }
            Instr::Call { callee, args, .. } => {
                let args: Vec<Val> = args.iter().map(|arg| self.eval(arg, frame)).collect();
                self.call(callee, &args)
            }
            Instr::VaArg { .. } => panic!("va_arg is not supported by the test interpreter"),
        };
        if let Some(dst) = instr.result() {
            frame.temps.insert(dst, result);
        }
    }

    fn eval(&self, value: &Value, frame: &Frame<'_>) -> Val {
        match &value.kind {
            ValueKind::Temp(id) => frame
                .temps
                .get(id)
                .cloned()
                .unwrap_or_else(|| panic!("use of undefined %{}", id.raw())),
            ValueKind::Param(index) => frame.args[*index as usize].clone(),
            ValueKind::Const(constant) => self.constant(constant, &value.ty),
            ValueKind::Global(name) => Val::Ptr(Some(Pointer {
                alloc: self.globals[name],
                elem: 0,
                path: Vec::new(),
            })),
            ValueKind::Function(name) => panic!("function '{name}' used as a value"),
        }
    }

    fn constant(&self, constant: &Constant, ty: &Type) -> Val {
        match constant {
            Constant::Int(bits) => int_val(*bits, ty),
            Constant::Float(value) => Val::Float(*value),
            Constant::Null => Val::Ptr(None),
            Constant::Zero => self.zero(ty),
            Constant::Undef => Val::Undef,
        }
    }

    fn zero(&self, ty: &Type) -> Val {
        self.shaped(ty, &|ty| match ty {
            Type::Void => Val::Void,
            Type::Bool | Type::Int { .. } => int_val(0, ty),
            Type::Float { .. } => Val::Float(0.0),
            _ => Val::Ptr(None),
        })
    }

    /// Fresh stack memory: aggregates with undefined leaves.
    fn undef(&self, ty: &Type) -> Val {
        self.shaped(ty, &|_| Val::Undef)
    }

    fn shaped(&self, ty: &Type, leaf: &dyn Fn(&Type) -> Val) -> Val {
        match ty {
            Type::Struct(name) => {
                let def = self
                    .module
                    .named_type(name)
                    .unwrap_or_else(|| panic!("unknown struct {name}"));
                Val::Agg(
                    def.fields
                        .iter()
                        .map(|(_, field)| self.shaped(field, leaf))
                        .collect(),
                )
            }
            Type::Array { elem, len } => Val::Agg(vec![self.shaped(elem, leaf); *len as usize]),
            _ => leaf(ty),
        }
    }

    fn read(&self, pointer: &Pointer) -> Val {
        let mut value = &self.memory[pointer.alloc][pointer.elem];
        for &index in &pointer.path {
            value = match value {
                Val::Agg(fields) => &fields[index as usize],
                other => panic!("field {index} of {other:?}"),
            };
        }
        value.clone()
    }

    fn place(&mut self, pointer: &Pointer) -> &mut Val {
        let mut value = &mut self.memory[pointer.alloc][pointer.elem];
        for &index in &pointer.path {
            value = match value {
                Val::Agg(fields) => &mut fields[index as usize],
                other => panic!("field {index} of {other:?}"),
            };
        }
        value
    }
}

fn bool_val(value: bool) -> Val {
    int_val(u64::from(value), &Type::Bool)
}

fn binary(op: BinOp, lhs: &Val, rhs: &Val) -> Val {
    if let (Val::Float(a), Val::Float(b)) = (lhs, rhs) {
        return Val::Float(match op {
            BinOp::FAdd => a + b,
            BinOp::FSub => a - b,
            BinOp::FMul => a * b,
            BinOp::FDiv => a / b,
            BinOp::FRem => a % b,
            other => panic!("integer operator {} on floats", other.as_str()),
        });
    }
    let (Val::Int { bits: a, width }, Val::Int { bits: b, .. }) = (lhs, rhs) else {
        panic!("{} on {lhs:?} and {rhs:?}", op.as_str());
    };
    let (a, b, width) = (*a, *b, *width);
    let (sa, sb) = (sign_extend(a, width), sign_extend(b, width));
    let bits = match op {
        BinOp::Add => a.wrapping_add(b),
        BinOp::Sub => a.wrapping_sub(b),
        BinOp::Mul => a.wrapping_mul(b),
        BinOp::SDiv => sa.wrapping_div(sb) as u64,
        BinOp::UDiv => a / b,
        BinOp::SRem => sa.wrapping_rem(sb) as u64,
        BinOp::URem => a % b,
        BinOp::And => a & b,
        BinOp::Or => a | b,
        BinOp::Xor => a ^ b,
        other => panic!("float operator {} on integers", other.as_str()),
    };
    Val::Int {
        bits: mask(bits, width),
        width,
    }
}

fn icmp(pred: IntPredicate, lhs: &Val, rhs: &Val) -> bool {
    match pred {
        IntPredicate::Eq => return lhs == rhs,
        IntPredicate::Ne => return lhs != rhs,
        _ => {}
    }
    let (Val::Int { bits: a, width }, Val::Int { bits: b, .. }) = (lhs, rhs) else {
        panic!("{} on {lhs:?} and {rhs:?}", pred.as_str());
    };
    let (sa, sb) = (sign_extend(*a, *width), sign_extend(*b, *width));
    match pred {
        IntPredicate::Slt => sa < sb,
        IntPredicate::Sle => sa <= sb,
        IntPredicate::Sgt => sa > sb,
        IntPredicate::Sge => sa >= sb,
        IntPredicate::Ult => a < b,
        IntPredicate::Ule => a <= b,
        IntPredicate::Ugt => a > b,
        IntPredicate::Uge => a >= b,
        IntPredicate::Eq | IntPredicate::Ne => unreachable!(),
    }
}

fn fcmp(pred: FloatPredicate, a: f64, b: f64) -> bool {
    match pred {
        FloatPredicate::Oeq => a == b,
        FloatPredicate::One => a != b && !a.is_nan() && !b.is_nan(),
        FloatPredicate::Olt => a < b,
        FloatPredicate::Ole => a <= b,
        FloatPredicate::Ogt => a > b,
        FloatPredicate::Oge => a >= b,
    }
}

fn cast(op: CastOp, value: &Val, from: &Type, to: &Type) -> Val {
    let round = |value: f64| {
        if to.float_bits() == Some(32) {
            f64::from(value as f32)
        } else {
            value
        }
    };
    match op {
        CastOp::Trunc | CastOp::ZExt => int_val(value.as_u64(), to),
        CastOp::SExt => int_val(sign_extend(value.as_u64(), width(from)) as u64, to),
        CastOp::FpTrunc | CastOp::FpExt => Val::Float(round(value.as_f64())),
        CastOp::FpToSi => int_val(value.as_f64() as i64 as u64, to),
        CastOp::FpToUi => int_val(value.as_f64() as u64, to),
        CastOp::SiToFp => Val::Float(round(value.as_i64() as f64)),
        CastOp::UiToFp => Val::Float(round(value.as_u64() as f64)),
        CastOp::IntToPtr if value.as_u64() == 0 => Val::Ptr(None),
        CastOp::PtrToInt if value.is_null() => int_val(0, to),
        CastOp::PtrToInt | CastOp::IntToPtr => {
            panic!("pointer/integer casts of live pointers are not supported")
        }
        CastOp::Bitcast => match value {
            Val::Int { bits, .. } if to.int_info().is_some() => int_val(*bits, to),
            other => other.clone(),
        },
    }
}
