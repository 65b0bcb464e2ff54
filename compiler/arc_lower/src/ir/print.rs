//! LLVM-flavoured text form of the IR.
//!
//! Operands print with their type (`i32 %3`, `i8* @.str.0`) except where
//! LLVM syntax puts the type once for the whole instruction.

use std::fmt::{self, Write as _};

use super::{
    sign_extend, Block, Constant, Function, Global, GlobalInit, Instr, Module, Terminator, Type,
    Value, ValueKind,
};

/// The operand without its type.
struct Bare<'a>(&'a Value);

impl fmt::Display for Bare<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.kind {
            ValueKind::Temp(id) => write!(f, "%{}", id.raw()),
            ValueKind::Param(index) => write!(f, "%arg{index}"),
            ValueKind::Global(name) | ValueKind::Function(name) => write!(f, "@{name}"),
            ValueKind::Const(constant) => write_constant(f, constant, &self.0.ty),
        }
    }
}

fn write_constant(f: &mut fmt::Formatter<'_>, constant: &Constant, ty: &Type) -> fmt::Result {
    match constant {
        Constant::Int(bits) => match ty {
            Type::Bool => f.write_str(if *bits == 0 { "false" } else { "true" }),
            Type::Int {
                bits: width,
                signed: true,
            } => write!(f, "{}", sign_extend(*bits, *width)),
            _ => write!(f, "{bits}"),
        },
        Constant::Float(value) => write!(f, "{value:?}"),
        Constant::Null => f.write_str("null"),
        Constant::Zero => f.write_str("zeroinitializer"),
        Constant::Undef => f.write_str("undef"),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ty, Bare(self))
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(dst) = self.result() {
            write!(f, "%{} = ", dst.raw())?;
        }
        match self {
            Instr::Alloca {
                ty, count, name, ..
            } => {
                write!(f, "alloca {ty}")?;
                if let Some(count) = count {
                    write!(f, ", {count}")?;
                }
                write!(f, " ; {name}")
            }
            Instr::Load { ty, ptr, .. } => write!(f, "load {ty}, {ptr}"),
            Instr::Store { value, ptr } => write!(f, "store {value}, {ptr}"),
            Instr::Binary { op, lhs, rhs, .. } => {
                write!(f, "{} {lhs}, {}", op.as_str(), Bare(rhs))
            }
            Instr::ICmp { pred, lhs, rhs, .. } => {
                write!(f, "icmp {} {lhs}, {}", pred.as_str(), Bare(rhs))
            }
            Instr::FCmp { pred, lhs, rhs, .. } => {
                write!(f, "fcmp {} {lhs}, {}", pred.as_str(), Bare(rhs))
            }
            Instr::Cast { op, value, to, .. } => write!(f, "{} {value} to {to}", op.as_str()),
            Instr::StructGep { ptr, index, .. } => {
                let pointee = ptr.ty.pointee().map_or_else(String::new, ToString::to_string);
                write!(f, "getelementptr {pointee}, {ptr}, i32 0, i32 {index}")
            }
            Instr::Gep { ptr, indices, .. } => {
                let pointee = ptr.ty.pointee().map_or_else(String::new, ToString::to_string);
                write!(f, "getelementptr inbounds {pointee}, {ptr}")?;
                for index in indices {
                    write!(f, ", {index}")?;
                }
                Ok(())
            }
            Instr::ExtractValue {
                aggregate, index, ..
            } => write!(f, "extractvalue {aggregate}, {index}"),
            Instr::InsertValue {
                aggregate,
                value,
                index,
                ..
            } => write!(f, "insertvalue {aggregate}, {value}, {index}"),
            Instr::Call {
                callee, args, ret, ..
            } => {
                write!(f, "call {ret} @{callee}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
            Instr::VaArg { list, ty, .. } => write!(f, "va_arg {list}, {ty}"),
        }
    }
}

/// Terminators name their targets by block ID; the function printer
/// resolves labels, this form is for diagnostics and tests.
impl fmt::Display for Terminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Terminator::Ret(None) => f.write_str("ret void"),
            Terminator::Ret(Some(value)) => write!(f, "ret {value}"),
            Terminator::Br(target) => write!(f, "br label %bb{}", target.raw()),
            Terminator::CondBr {
                cond,
                then_block,
                else_block,
            } => write!(
                f,
                "br {cond}, label %bb{}, label %bb{}",
                then_block.raw(),
                else_block.raw()
            ),
            Terminator::Unreachable => f.write_str("unreachable"),
        }
    }
}

impl Function {
    fn label_of(&self, id: super::BlockId) -> String {
        self.block(id)
            .map_or_else(|| format!("bb{}", id.raw()), |b| b.label.clone())
    }

    fn write_block(&self, out: &mut String, block: &Block) -> fmt::Result {
        writeln!(out, "{}:", block.label)?;
        for instr in &block.instrs {
            writeln!(out, "  {instr}")?;
        }
        match &block.terminator {
            Terminator::Br(target) => writeln!(out, "  br label %{}", self.label_of(*target)),
            Terminator::CondBr {
                cond,
                then_block,
                else_block,
            } => writeln!(
                out,
                "  br {cond}, label %{}, label %{}",
                self.label_of(*then_block),
                self.label_of(*else_block)
            ),
            other => writeln!(out, "  {other}"),
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = if self.is_declaration() { "declare" } else { "define" };
        write!(f, "{keyword} {} @{}(", self.ret, self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            if self.is_declaration() || param.name.is_empty() {
                write!(f, "{}", param.ty)?;
            } else {
                write!(f, "{} %arg{i}", param.ty)?;
            }
        }
        if self.variadic {
            f.write_str(if self.params.is_empty() { "..." } else { ", ..." })?;
        }
        f.write_str(")")?;
        if self.is_declaration() {
            return Ok(());
        }
        f.write_str(" {\n")?;
        let mut body = String::new();
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                body.push('\n');
            }
            self.write_block(&mut body, block)?;
        }
        f.write_str(&body)?;
        f.write_str("}")
    }
}

impl fmt::Display for Global {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.constant {
            "private constant"
        } else {
            "global"
        };
        write!(f, "@{} = {kind} {} ", self.name, self.ty)?;
        match &self.init {
            GlobalInit::Zero => f.write_str("zeroinitializer"),
            GlobalInit::Const(constant) => write_constant(f, constant, &self.ty),
            GlobalInit::Bytes(bytes) => {
                f.write_str("c\"")?;
                for &byte in bytes {
                    if (byte.is_ascii_graphic() && byte != b'"' && byte != b'\\') || byte == b' ' {
                        f.write_char(char::from(byte))?;
                    } else {
                        write!(f, "\\{byte:02X}")?;
                    }
                }
                f.write_str("\"")
            }
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; ModuleID = '{}'", self.name)?;
        for def in &self.named_types {
            write!(f, "\n%{} = type {{ ", def.name)?;
            for (i, (_, ty)) in def.fields.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{ty}")?;
            }
            f.write_str(" }")?;
        }
        if !self.named_types.is_empty() {
            f.write_str("\n")?;
        }
        for global in &self.globals {
            write!(f, "\n{global}")?;
        }
        if !self.globals.is_empty() {
            f.write_str("\n")?;
        }
        for function in &self.functions {
            write!(f, "\n{function}\n")?;
        }
        Ok(())
    }
}
