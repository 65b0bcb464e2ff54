//! Basic-block builder for one function.
//!
//! Follows the "position at a block, emit instructions, terminate" pattern
//! of LLVM's `IRBuilder`. A block accepts instructions until it gets its
//! terminator; emitting into a terminated block opens a fresh `dead.N`
//! block instead, which [`finish`](FunctionBuilder::finish) later drops
//! because nothing branches to it.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::ir::{
    BinOp, Block, BlockId, CastOp, FloatPredicate, Instr, IntPredicate, Terminator, Type, Value,
    ValueId,
};

// BlockBuilder

/// In-progress basic block.
struct BlockBuilder {
    id: BlockId,
    label: String,
    body: Vec<Instr>,
    terminator: Option<Terminator>,
}

impl BlockBuilder {
    fn new(id: BlockId, label: String) -> Self {
        Self {
            id,
            label,
            body: Vec::new(),
            terminator: None,
        }
    }
}

// FunctionBuilder

/// Builder for the body of one IR function.
pub struct FunctionBuilder {
    blocks: Vec<BlockBuilder>,
    current_block: BlockId,
    next_value: u32,
    /// Allocas hoisted to the top of the entry block so far.
    entry_allocas: usize,
    /// Labels in use, for uniquing.
    labels: FxHashMap<String, u32>,
}

impl Default for FunctionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionBuilder {
    /// Create a builder with an `entry` block already allocated.
    pub fn new() -> Self {
        let mut labels = FxHashMap::default();
        labels.insert("entry".to_string(), 0);
        Self {
            blocks: vec![BlockBuilder::new(BlockId::new(0), "entry".to_string())],
            current_block: BlockId::new(0),
            next_value: 0,
            entry_allocas: 0,
            labels,
        }
    }

    // Block management

    /// Allocate a new empty block and return its ID.
    ///
    /// A label already used in this function gets a `.N` suffix.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "block indices never exceed u32"
    )]
    pub fn new_block(&mut self, label: impl Into<String>) -> BlockId {
        let mut label = label.into();
        match self.labels.get_mut(&label) {
            Some(uses) => {
                *uses += 1;
                label = format!("{label}.{uses}");
            }
            None => {
                self.labels.insert(label.clone(), 0);
            }
        }
        let id = BlockId::new(self.blocks.len() as u32);
        self.blocks.push(BlockBuilder::new(id, label));
        id
    }

    /// Set the current insertion point to the given block.
    pub fn position_at(&mut self, block: BlockId) {
        debug_assert!(
            block.index() < self.blocks.len(),
            "BlockId {} out of bounds (have {} blocks)",
            block.raw(),
            self.blocks.len(),
        );
        self.current_block = block;
    }

    /// Get the current block being built.
    #[inline]
    pub fn current_block(&self) -> BlockId {
        self.current_block
    }

    /// Check whether the current block already has a terminator.
    #[inline]
    pub fn is_terminated(&self) -> bool {
        self.blocks[self.current_block.index()].terminator.is_some()
    }

    /// Get the entry block (always block 0).
    #[inline]
    pub fn entry_block(&self) -> BlockId {
        BlockId::new(0)
    }

    pub fn label(&self, block: BlockId) -> &str {
        &self.blocks[block.index()].label
    }

    /// Number of distinct blocks whose terminator targets `block`.
    pub fn predecessor_count(&self, block: BlockId) -> usize {
        self.blocks
            .iter()
            .filter(|bb| {
                bb.terminator
                    .as_ref()
                    .is_some_and(|term| term.successors().contains(&block))
            })
            .count()
    }

    /// Whether control can reach `block` from a branch.
    pub fn has_predecessors(&self, block: BlockId) -> bool {
        self.predecessor_count(block) > 0
    }

    /// Move to a fresh block if the current one is already terminated.
    fn ensure_open(&mut self) {
        if self.is_terminated() {
            let dead = self.new_block("dead");
            tracing::trace!(
                from = self.label(self.current_block),
                to = self.label(dead),
                "emitting after terminator, switching to dead block"
            );
            self.current_block = dead;
        }
    }

    // Instruction emission

    fn fresh_value(&mut self) -> ValueId {
        let id = ValueId::new(self.next_value);
        self.next_value += 1;
        id
    }

    fn push(&mut self, instr: Instr) {
        self.ensure_open();
        self.blocks[self.current_block.index()].body.push(instr);
    }

    /// Stack slot at the top of the entry block, wherever the cursor is.
    pub fn emit_entry_alloca(&mut self, ty: Type, name: impl Into<String>) -> Value {
        let dst = self.fresh_value();
        let entry = &mut self.blocks[0];
        entry.body.insert(
            self.entry_allocas,
            Instr::Alloca {
                dst,
                ty: ty.clone(),
                count: None,
                name: name.into(),
            },
        );
        self.entry_allocas += 1;
        Value::temp(dst, ty.ptr_to())
    }

    /// Stack allocation at the cursor (`alloca(T, n)` in source).
    pub fn emit_alloca(&mut self, ty: Type, count: Option<Value>, name: impl Into<String>) -> Value {
        let dst = self.fresh_value();
        self.push(Instr::Alloca {
            dst,
            ty: ty.clone(),
            count,
            name: name.into(),
        });
        Value::temp(dst, ty.ptr_to())
    }

    pub fn emit_load(&mut self, ty: Type, ptr: Value) -> Value {
        let dst = self.fresh_value();
        self.push(Instr::Load {
            dst,
            ty: ty.clone(),
            ptr,
        });
        Value::temp(dst, ty)
    }

    pub fn emit_store(&mut self, value: Value, ptr: Value) {
        self.push(Instr::Store { value, ptr });
    }

    /// Both operands must already have the same type.
    pub fn emit_binary(&mut self, op: BinOp, lhs: Value, rhs: Value) -> Value {
        let dst = self.fresh_value();
        let ty = lhs.ty.clone();
        self.push(Instr::Binary { dst, op, lhs, rhs });
        Value::temp(dst, ty)
    }

    pub fn emit_icmp(&mut self, pred: IntPredicate, lhs: Value, rhs: Value) -> Value {
        let dst = self.fresh_value();
        self.push(Instr::ICmp {
            dst,
            pred,
            lhs,
            rhs,
        });
        Value::temp(dst, Type::Bool)
    }

    pub fn emit_fcmp(&mut self, pred: FloatPredicate, lhs: Value, rhs: Value) -> Value {
        let dst = self.fresh_value();
        self.push(Instr::FCmp {
            dst,
            pred,
            lhs,
            rhs,
        });
        Value::temp(dst, Type::Bool)
    }

    pub fn emit_cast(&mut self, op: CastOp, value: Value, to: Type) -> Value {
        let dst = self.fresh_value();
        self.push(Instr::Cast {
            dst,
            op,
            value,
            to: to.clone(),
        });
        Value::temp(dst, to)
    }

    /// Address of field `index` of the struct behind `ptr`.
    pub fn emit_struct_gep(&mut self, ptr: Value, index: u32, field_ty: Type) -> Value {
        let dst = self.fresh_value();
        self.push(Instr::StructGep {
            dst,
            ptr,
            index,
            field_ty: field_ty.clone(),
        });
        Value::temp(dst, field_ty.ptr_to())
    }

    pub fn emit_gep(&mut self, ptr: Value, indices: SmallVec<[Value; 2]>, result_ty: Type) -> Value {
        let dst = self.fresh_value();
        self.push(Instr::Gep {
            dst,
            ptr,
            indices,
            result_ty: result_ty.clone(),
        });
        Value::temp(dst, result_ty)
    }

    pub fn emit_extract_value(&mut self, aggregate: Value, index: u32, ty: Type) -> Value {
        let dst = self.fresh_value();
        self.push(Instr::ExtractValue {
            dst,
            aggregate,
            index,
            ty: ty.clone(),
        });
        Value::temp(dst, ty)
    }

    pub fn emit_insert_value(&mut self, aggregate: Value, value: Value, index: u32) -> Value {
        let dst = self.fresh_value();
        let ty = aggregate.ty.clone();
        self.push(Instr::InsertValue {
            dst,
            aggregate,
            value,
            index,
        });
        Value::temp(dst, ty)
    }

    /// Direct call. A `void` callee yields [`Value::void`].
    pub fn emit_call(&mut self, callee: &str, args: SmallVec<[Value; 4]>, ret: Type) -> Value {
        let dst = (!ret.is_void()).then(|| self.fresh_value());
        self.push(Instr::Call {
            dst,
            callee: callee.to_string(),
            args,
            ret: ret.clone(),
        });
        dst.map_or_else(Value::void, |id| Value::temp(id, ret))
    }

    pub fn emit_va_arg(&mut self, list: Value, ty: Type) -> Value {
        let dst = self.fresh_value();
        self.push(Instr::VaArg {
            dst,
            list,
            ty: ty.clone(),
        });
        Value::temp(dst, ty)
    }

    // Terminators

    fn terminate(&mut self, terminator: Terminator) {
        self.ensure_open();
        self.blocks[self.current_block.index()].terminator = Some(terminator);
    }

    /// Terminate with `ret` / `ret void`.
    pub fn terminate_return(&mut self, value: Option<Value>) {
        self.terminate(Terminator::Ret(value));
    }

    /// Terminate with an unconditional branch.
    pub fn terminate_br(&mut self, target: BlockId) {
        self.terminate(Terminator::Br(target));
    }

    pub fn terminate_cond_br(&mut self, cond: Value, then_block: BlockId, else_block: BlockId) {
        self.terminate(Terminator::CondBr {
            cond,
            then_block,
            else_block,
        });
    }

    pub fn terminate_unreachable(&mut self) {
        self.terminate(Terminator::Unreachable);
    }

    // Finalization

    /// Consume the builder and produce the finished blocks.
    ///
    /// Only blocks reachable from the entry are kept, in creation order,
    /// with their predecessor lists filled in. A kept block without a
    /// terminator gets `Unreachable` (with a tracing warning).
    pub fn finish(self) -> Vec<Block> {
        let mut reachable = FxHashSet::default();
        let mut stack = vec![self.entry_block()];
        while let Some(id) = stack.pop() {
            if !reachable.insert(id) {
                continue;
            }
            if let Some(term) = &self.blocks[id.index()].terminator {
                stack.extend(term.successors());
            }
        }

        let mut predecessors: FxHashMap<BlockId, Vec<BlockId>> = FxHashMap::default();
        for bb in self.blocks.iter().filter(|bb| reachable.contains(&bb.id)) {
            if let Some(term) = &bb.terminator {
                let mut targets = term.successors();
                targets.dedup();
                for target in targets {
                    predecessors.entry(target).or_default().push(bb.id);
                }
            }
        }

        let dropped = self.blocks.len() - reachable.len();
        if dropped > 0 {
            tracing::trace!(dropped, "removed unreachable blocks");
        }

        self.blocks
            .into_iter()
            .filter(|bb| reachable.contains(&bb.id))
            .map(|bb| {
                let terminator = bb.terminator.unwrap_or_else(|| {
                    tracing::warn!(
                        block = bb.id.raw(),
                        label = %bb.label,
                        "unterminated block, adding Unreachable"
                    );
                    Terminator::Unreachable
                });
                Block {
                    predecessors: predecessors.remove(&bb.id).unwrap_or_default(),
                    id: bb.id,
                    label: bb.label,
                    instrs: bb.body,
                    terminator,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests;
