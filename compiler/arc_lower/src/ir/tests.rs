use pretty_assertions::assert_eq;
use smallvec::smallvec;

use super::*;

fn block(id: u32, label: &str, instrs: Vec<Instr>, terminator: Terminator) -> Block {
    Block {
        id: BlockId::new(id),
        label: label.to_string(),
        instrs,
        terminator,
        predecessors: Vec::new(),
    }
}

#[test]
fn test_struct_def_numbers_fields_in_order() {
    let def = StructDef::new(
        "Point",
        vec![("x".into(), Type::I32), ("y".into(), Type::I32)],
        false,
    );
    assert_eq!(def.field_index("x"), Some(0));
    assert_eq!(def.field_index("y"), Some(1));
    assert_eq!(def.field_index("z"), None);
    assert_eq!(def.field_type(1), Some(&Type::I32));
    assert_eq!(def.field_type(2), None);
}

#[test]
fn test_add_function_keeps_first_definition() {
    let mut module = Module::new("m");
    assert!(module.add_function(Function::declaration("f", Vec::new(), Type::I32, false)));
    assert!(!module.add_function(Function::declaration("f", Vec::new(), Type::Void, false)));
    assert_eq!(module.function("f").map(|f| f.ret.clone()), Some(Type::I32));
    assert_eq!(module.functions.len(), 1);
}

#[test]
fn test_strings_become_nul_terminated_globals() {
    let mut module = Module::new("m");
    let first = module.add_string("hi");
    let second = module.add_string("");
    assert_eq!(first.kind, ValueKind::Global(".str.0".into()));
    assert_eq!(second.kind, ValueKind::Global(".str.1".into()));
    assert_eq!(
        module.global(".str.0").map(|g| g.init.clone()),
        Some(GlobalInit::Bytes(vec![b'h', b'i', 0]))
    );
    assert_eq!(first.ty.to_string(), "[3 x i8]*");
    assert_eq!(
        module.global(".str.0").map(ToString::to_string),
        Some("@.str.0 = private constant [3 x i8] c\"hi\\00\"".to_string())
    );
}

#[test]
fn test_zero_values_per_type() {
    assert_eq!(Value::zero(Type::I32).to_string(), "i32 0");
    assert_eq!(Value::zero(Type::Bool).to_string(), "i1 false");
    assert_eq!(Value::zero(Type::F64).to_string(), "double 0.0");
    assert_eq!(Value::zero(Type::I32.ptr_to()).to_string(), "i32* null");
    assert_eq!(
        Value::zero(Type::Struct("Point".into())).to_string(),
        "%Point zeroinitializer"
    );
}

#[test]
fn test_signed_constants_print_negative() {
    assert_eq!(Value::const_int(u64::MAX, Type::I64).to_string(), "i64 -1");
    assert_eq!(Value::const_int(u64::MAX, Type::int(64, false)).to_string(), format!("i64 {}", u64::MAX));
}

#[test]
fn test_terminator_successors() {
    assert!(Terminator::Ret(None).successors().is_empty());
    assert_eq!(
        Terminator::Br(BlockId::new(3)).successors().as_slice(),
        &[BlockId::new(3)]
    );
    let cond = Terminator::CondBr {
        cond: Value::const_bool(true),
        then_block: BlockId::new(1),
        else_block: BlockId::new(2),
    };
    assert_eq!(cond.successors().as_slice(), &[BlockId::new(1), BlockId::new(2)]);
}

#[test]
fn test_function_prints_with_labels() {
    let slot = Value::temp(ValueId::new(0), Type::I32.ptr_to());
    let loaded = Value::temp(ValueId::new(1), Type::I32);
    let func = Function {
        name: "id".into(),
        params: vec![Param {
            name: "x".into(),
            ty: Type::I32,
        }],
        ret: Type::I32,
        variadic: false,
        blocks: vec![
            block(
                0,
                "entry",
                vec![
                    Instr::Alloca {
                        dst: ValueId::new(0),
                        ty: Type::I32,
                        count: None,
                        name: "x.addr".into(),
                    },
                    Instr::Store {
                        value: Value::param(0, Type::I32),
                        ptr: slot.clone(),
                    },
                ],
                Terminator::Br(BlockId::new(1)),
            ),
            block(
                1,
                "exit",
                vec![Instr::Load {
                    dst: ValueId::new(1),
                    ty: Type::I32,
                    ptr: slot,
                }],
                Terminator::Ret(Some(loaded)),
            ),
        ],
    };
    let expected = "\
define i32 @id(i32 %arg0) {
entry:
  %0 = alloca i32 ; x.addr
  store i32 %arg0, i32* %0
  br label %exit

exit:
  %1 = load i32, i32* %0
  ret i32 %1
}";
    assert_eq!(func.to_string(), expected);
}

#[test]
fn test_declarations_print_types_only() {
    let printf = Function::declaration(
        "printf",
        vec![Param {
            name: String::new(),
            ty: Type::byte_ptr(),
        }],
        Type::I32,
        true,
    );
    assert_eq!(printf.to_string(), "declare i32 @printf(i8*, ...)");
}

#[test]
fn test_instruction_text() {
    let a = Value::temp(ValueId::new(1), Type::I64);
    let b = Value::const_int(2, Type::I64);
    let add = Instr::Binary {
        dst: ValueId::new(2),
        op: BinOp::Add,
        lhs: a.clone(),
        rhs: b,
    };
    assert_eq!(add.to_string(), "%2 = add i64 %1, 2");

    let gep = Instr::StructGep {
        dst: ValueId::new(3),
        ptr: Value::temp(ValueId::new(0), Type::Struct("Point".into()).ptr_to()),
        index: 1,
        field_ty: Type::I32,
    };
    assert_eq!(gep.to_string(), "%3 = getelementptr %Point, %Point* %0, i32 0, i32 1");

    let call = Instr::Call {
        dst: None,
        callee: "puts".into(),
        args: smallvec![a],
        ret: Type::Void,
    };
    assert_eq!(call.to_string(), "call void @puts(i64 %1)");
}
