//! End-to-end lowering tests: Arc source in, IR (and what it computes) out.
//!
//! Every program lowered here must also pass the IR verifier.

use arc_diagnostic::ErrorCode;
use arc_parse::parse;

use crate::context::LowerConfig;
use crate::ir::{Block, Function, Instr, Module, Terminator};
use crate::verify::verify_module;

use super::{lower_source_file, LowerOutput};

mod eval;

mod control_flow_tests;

/// Parse and lower `source`, checking that the IR verifies.
fn lower_with(source: &str, config: LowerConfig) -> LowerOutput {
    let parsed = parse(source);
    assert!(
        parsed.errors.is_empty(),
        "parse errors: {:?}",
        parsed.errors
    );
    let output = lower_source_file(&parsed.file, config);
    if let Err(errors) = verify_module(&output.module) {
        panic!("invalid IR: {errors:?}\n{}", output.module);
    }
    output
}

fn lower(source: &str) -> LowerOutput {
    lower_with(source, LowerConfig::default())
}

/// Lower `source`, which must produce no errors.
fn lower_ok(source: &str) -> Module {
    let output = lower(source);
    assert!(
        !output.has_errors(),
        "unexpected errors: {:?}",
        output.diagnostics.diagnostics()
    );
    output.module
}

/// Every diagnostic code, in report order.
fn codes(output: &LowerOutput) -> Vec<ErrorCode> {
    output
        .diagnostics
        .diagnostics()
        .iter()
        .map(|diag| diag.code)
        .collect()
}

/// The only message reported under `code`.
fn message(output: &LowerOutput, code: ErrorCode) -> String {
    let messages: Vec<&str> = output.diagnostics.messages_with_code(code).collect();
    assert_eq!(messages.len(), 1, "expected one {code:?}, got {messages:?}");
    messages[0].to_string()
}

fn function<'m>(module: &'m Module, name: &str) -> &'m Function {
    module
        .function(name)
        .unwrap_or_else(|| panic!("no function '{name}' in\n{module}"))
}

fn labels(function: &Function) -> Vec<&str> {
    function
        .blocks
        .iter()
        .map(|block| block.label.as_str())
        .collect()
}

/// The block whose label starts with `prefix`.
fn block<'f>(function: &'f Function, prefix: &str) -> &'f Block {
    function
        .blocks
        .iter()
        .find(|block| block.label.starts_with(prefix))
        .unwrap_or_else(|| panic!("no block '{prefix}*' in {:?}", labels(function)))
}

/// Label of the single target of `block`'s unconditional branch.
fn branch_target<'f>(function: &'f Function, block: &Block) -> &'f str {
    match &block.terminator {
        Terminator::Br(target) => function
            .block(*target)
            .map_or("<missing>", |target| target.label.as_str()),
        other => panic!("expected br in '{}', got {other:?}", block.label),
    }
}

/// Names of every function `function` calls.
fn callees(function: &Function) -> Vec<&str> {
    function
        .instrs()
        .filter_map(|instr| match instr {
            Instr::Call { callee, .. } => Some(callee.as_str()),
            _ => None,
        })
        .collect()
}

/// Lower an error-free program and run `main`.
fn run_main(source: &str) -> eval::Val {
    let module = lower_ok(source);
    eval::run(&module, "main", &[])
}
