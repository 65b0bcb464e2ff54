//! Structural checks over finished IR.
//!
//! Lowering maintains these properties by construction; the verifier
//! catches regressions. The driver runs it in debug builds and the tests
//! run it on everything they lower.

use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::ir::{BlockId, Function, Module, Terminator};

/// One broken invariant in one function.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("in function '{function}': {problem}")]
pub struct VerifyError {
    pub function: String,
    pub problem: Problem,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Problem {
    /// A function with a body whose first block is missing.
    MissingEntry,
    DuplicateLabel(String),
    /// A branch names a block that is not in the function.
    UnknownTarget { block: String, target: BlockId },
    /// A non-entry block nothing branches to.
    NoPredecessors(String),
    /// Stored predecessor list disagrees with the branches.
    PredecessorMismatch(String),
    /// `ret` with a value in a `void` function, or without one elsewhere.
    ReturnMismatch(String),
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Problem::MissingEntry => write!(f, "function body has no entry block"),
            Problem::DuplicateLabel(label) => write!(f, "duplicate block label '{label}'"),
            Problem::UnknownTarget { block, target } => {
                write!(f, "block '{block}' branches to unknown block {}", target.raw())
            }
            Problem::NoPredecessors(label) => {
                write!(f, "block '{label}' is unreachable (no predecessors)")
            }
            Problem::PredecessorMismatch(label) => {
                write!(f, "block '{label}' has an inconsistent predecessor list")
            }
            Problem::ReturnMismatch(label) => {
                write!(f, "return in block '{label}' does not match the function type")
            }
        }
    }
}

/// Check every defined function of `module`.
pub fn verify_module(module: &Module) -> Result<(), Vec<VerifyError>> {
    let errors: Vec<VerifyError> = module
        .functions
        .iter()
        .filter(|function| !function.is_declaration())
        .flat_map(|function| verify_function(function).err().unwrap_or_default())
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub fn verify_function(function: &Function) -> Result<(), Vec<VerifyError>> {
    let mut problems = Vec::new();
    let Some(entry) = function.blocks.first() else {
        return Ok(());
    };
    if entry.label != "entry" {
        problems.push(Problem::MissingEntry);
    }

    let ids: FxHashSet<BlockId> = function.blocks.iter().map(|b| b.id).collect();
    let mut labels = FxHashSet::default();
    let mut incoming: FxHashMap<BlockId, Vec<BlockId>> = FxHashMap::default();

    for block in &function.blocks {
        if !labels.insert(block.label.as_str()) {
            problems.push(Problem::DuplicateLabel(block.label.clone()));
        }
        let mut targets = block.terminator.successors();
        targets.dedup();
        for target in targets {
            if ids.contains(&target) {
                incoming.entry(target).or_default().push(block.id);
            } else {
                problems.push(Problem::UnknownTarget {
                    block: block.label.clone(),
                    target,
                });
            }
        }
        if let Terminator::Ret(value) = &block.terminator {
            if value.is_some() == function.ret.is_void() {
                problems.push(Problem::ReturnMismatch(block.label.clone()));
            }
        }
    }

    for block in function.blocks.iter().skip(1) {
        let actual = incoming.remove(&block.id).unwrap_or_default();
        if actual.is_empty() {
            problems.push(Problem::NoPredecessors(block.label.clone()));
        } else if actual != block.predecessors {
            problems.push(Problem::PredecessorMismatch(block.label.clone()));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems
            .into_iter()
            .map(|problem| VerifyError {
                function: function.name.clone(),
                problem,
            })
            .collect())
    }
}
