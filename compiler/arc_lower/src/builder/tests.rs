use pretty_assertions::assert_eq;
use smallvec::smallvec;

use super::*;
use crate::ir::Terminator;

fn labels(blocks: &[Block]) -> Vec<&str> {
    blocks.iter().map(|b| b.label.as_str()).collect()
}

#[test]
fn test_new_builder_starts_at_entry() {
    let builder = FunctionBuilder::new();
    assert_eq!(builder.current_block(), builder.entry_block());
    assert_eq!(builder.label(builder.entry_block()), "entry");
    assert!(!builder.is_terminated());
}

#[test]
fn test_duplicate_labels_get_suffixes() {
    let mut builder = FunctionBuilder::new();
    let a = builder.new_block("loop.cond");
    let b = builder.new_block("loop.cond");
    let c = builder.new_block("loop.cond");
    assert_eq!(builder.label(a), "loop.cond");
    assert_eq!(builder.label(b), "loop.cond.1");
    assert_eq!(builder.label(c), "loop.cond.2");
}

#[test]
fn test_emitting_after_terminator_opens_dead_block() {
    let mut builder = FunctionBuilder::new();
    builder.terminate_return(None);
    let entry = builder.entry_block();
    builder.emit_store(Value::const_int(1, Type::I32), Value::null(Type::I32.ptr_to()));
    assert_ne!(builder.current_block(), entry);
    builder.terminate_return(None);

    let blocks = builder.finish();
    assert_eq!(labels(&blocks), vec!["entry"]);
    assert!(blocks[0].instrs.is_empty());
}

#[test]
fn test_entry_allocas_are_hoisted() {
    let mut builder = FunctionBuilder::new();
    let next = builder.new_block("next");
    builder.terminate_br(next);
    builder.position_at(next);
    let slot = builder.emit_entry_alloca(Type::I32, "x");
    builder.emit_store(Value::const_int(0, Type::I32), slot.clone());
    builder.terminate_return(None);

    assert_eq!(slot.ty, Type::I32.ptr_to());
    let blocks = builder.finish();
    assert!(matches!(blocks[0].instrs.as_slice(), [Instr::Alloca { name, .. }] if name == "x"));
    assert!(matches!(blocks[1].instrs.as_slice(), [Instr::Store { .. }]));
}

#[test]
fn test_finish_drops_unreachable_blocks_and_records_predecessors() {
    let mut builder = FunctionBuilder::new();
    let then_b = builder.new_block("then");
    let else_b = builder.new_block("else");
    let orphan = builder.new_block("orphan");
    let merge = builder.new_block("merge");

    builder.terminate_cond_br(Value::const_bool(true), then_b, else_b);
    builder.position_at(then_b);
    builder.terminate_br(merge);
    builder.position_at(else_b);
    builder.terminate_br(merge);
    builder.position_at(orphan);
    builder.terminate_br(merge);
    builder.position_at(merge);
    builder.terminate_return(None);

    assert_eq!(builder.predecessor_count(merge), 3);
    let blocks = builder.finish();
    assert_eq!(labels(&blocks), vec!["entry", "then", "else", "merge"]);
    let merge_block = blocks.iter().find(|b| b.label == "merge");
    assert_eq!(
        merge_block.map(|b| b.predecessors.clone()),
        Some(vec![then_b, else_b])
    );
}

#[test]
fn test_cond_br_to_same_block_counts_once() {
    let mut builder = FunctionBuilder::new();
    let target = builder.new_block("t");
    builder.terminate_cond_br(Value::const_bool(false), target, target);
    builder.position_at(target);
    builder.terminate_unreachable();
    let blocks = builder.finish();
    assert_eq!(blocks[1].predecessors, vec![builder_entry()]);
}

fn builder_entry() -> BlockId {
    BlockId::new(0)
}

#[test]
fn test_unterminated_reachable_block_gets_unreachable() {
    let mut builder = FunctionBuilder::new();
    let next = builder.new_block("next");
    builder.terminate_br(next);
    let blocks = builder.finish();
    assert_eq!(blocks[1].terminator, Terminator::Unreachable);
}

#[test]
fn test_value_numbering_and_types() {
    let mut builder = FunctionBuilder::new();
    let a = builder.emit_load(Type::I64, Value::null(Type::I64.ptr_to()));
    let sum = builder.emit_binary(BinOp::Add, a.clone(), Value::const_int(1, Type::I64));
    let cmp = builder.emit_icmp(IntPredicate::Slt, a, sum.clone());
    let call = builder.emit_call("f", smallvec![sum], Type::Void);
    assert_eq!(cmp.ty, Type::Bool);
    assert_eq!(call, Value::void());
    builder.terminate_return(None);

    let blocks = builder.finish();
    let results: Vec<_> = blocks[0]
        .instrs
        .iter()
        .map(|i| i.result().map(ValueId::raw))
        .collect();
    assert_eq!(results, vec![Some(0), Some(1), Some(2), None]);
}
