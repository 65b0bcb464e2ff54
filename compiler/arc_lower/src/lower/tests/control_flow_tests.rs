use arc_ast::{Item, Span, Stmt};
use arc_diagnostic::ErrorCode;
use arc_parse::parse;
use pretty_assertions::assert_eq;

use super::eval::{run, Val};
use super::{block, branch_target, codes, function, labels, lower, lower_ok, run_main};
use crate::ir::{Instr, Terminator, Type};

/// Span of statement `index` in the body of the first function.
fn stmt_span(source: &str, index: usize) -> Span {
    let file = parse(source).file;
    let Some(Item::Function(func)) = file.items.first() else {
        panic!("expected a function");
    };
    match func.body.as_ref().map(|body| &body.stmts[index]) {
        Some(Stmt::If(stmt)) => stmt.span,
        Some(Stmt::For(stmt)) => stmt.span,
        other => panic!("expected if or for, got {other:?}"),
    }
}

// ── if ──────────────────────────────────────────────────────────────

const PICK: &str = "
func pick(a: bool) int32 {
    var r: int32 = 0
    if a {
        r = 1
    }
    return r
}
";

#[test]
fn if_without_else_branches_to_merge() {
    let module = lower_ok(PICK);
    let pick = function(&module, "pick");
    let suffix = stmt_span(PICK, 1).label_suffix();

    let labels = labels(pick);
    assert!(labels.contains(&format!("if.then.{suffix}").as_str()), "{labels:?}");
    assert!(labels.contains(&format!("if.end.{suffix}").as_str()), "{labels:?}");
    assert_eq!(branch_target(pick, block(pick, "if.then")), format!("if.end.{suffix}"));

    assert_eq!(run(&module, "pick", &[Val::int(1, &Type::Bool)]).as_i64(), 1);
    assert_eq!(run(&module, "pick", &[Val::int(0, &Type::Bool)]).as_i64(), 0);
}

#[test]
fn if_where_every_branch_returns_has_no_merge_block() {
    let source = "
func main() int32 {
    if false {
        return 1
    } else {
        return 2
    }
}
";
    let module = lower_ok(source);
    let main = function(&module, "main");
    assert!(
        labels(main).iter().all(|label| !label.starts_with("if.end")),
        "{:?}",
        labels(main)
    );
    assert_eq!(run_main(source).as_i64(), 2);
}

#[test]
fn else_if_chain_takes_first_true_branch() {
    let source = "
func classify(n: int32) int32 {
    if n < 0 {
        return -1
    } else if n == 0 {
        return 0
    } else if n < 10 {
        return 1
    } else {
        return 2
    }
}
";
    let module = lower_ok(source);
    let suffix = stmt_span(source, 0).label_suffix();
    let classify = function(&module, "classify");
    let labels = labels(classify);
    for label in [
        format!("if.then.{suffix}"),
        format!("elseif.then.{suffix}.1"),
        format!("elseif.then.{suffix}.2"),
    ] {
        assert!(labels.contains(&label.as_str()), "missing {label} in {labels:?}");
    }

    let results: Vec<i64> = [-5, 0, 7, 99]
        .iter()
        .map(|&n| run(&module, "classify", &[Val::int(n, &Type::I32)]).as_i64())
        .collect();
    assert_eq!(results, vec![-1, 0, 1, 2]);
}

#[test]
fn statements_after_return_are_skipped() {
    let source = "
func main() int32 {
    return 1
    var x = 2
    return x
}
";
    let module = lower_ok(source);
    let main = function(&module, "main");
    assert_eq!(labels(main), vec!["entry"]);
    assert!(!main
        .instrs()
        .any(|instr| matches!(instr, Instr::Alloca { .. })));
    assert_eq!(run(&module, "main", &[]).as_i64(), 1);
}

#[test]
fn void_function_falls_through_to_ret_void() {
    let module = lower_ok("func f() {\n    var x = 1\n}");
    let f = function(&module, "f");
    assert_eq!(f.blocks.len(), 1);
    assert_eq!(f.blocks[0].terminator, Terminator::Ret(None));
}

#[test]
fn missing_return_in_value_function_returns_zero() {
    let source = "func main() int32 {\n    var x = 5\n}";
    assert_eq!(run_main(source).as_i64(), 0);
}

// ── for ─────────────────────────────────────────────────────────────

#[test]
fn clause_loop_continue_goes_to_post_and_break_to_end() {
    let source = "
func main() int32 {
    var total: int32 = 0
    for var i = 0; i < 10; i = i + 1 {
        if i == 3 {
            continue
        }
        if i == 7 {
            break
        }
        total = total + i
    }
    return total
}
";
    let module = lower_ok(source);
    let main = function(&module, "main");
    let then_blocks: Vec<_> = main
        .blocks
        .iter()
        .filter(|block| block.label.starts_with("if.then"))
        .collect();
    assert_eq!(then_blocks.len(), 2);
    assert!(branch_target(main, then_blocks[0]).starts_with("loop.post"));
    assert!(branch_target(main, then_blocks[1]).starts_with("loop.end"));
    assert!(branch_target(main, block(main, "loop.post")).starts_with("loop.cond"));

    assert_eq!(run(&module, "main", &[]).as_i64(), 1 + 2 + 4 + 5 + 6);
}

#[test]
fn condition_loop_continues_at_condition() {
    let source = "
func main() int {
    var n = 0
    for n < 5 {
        n = n + 1
        continue
    }
    return n
}
";
    let module = lower_ok(source);
    let main = function(&module, "main");
    assert!(branch_target(main, block(main, "loop.body")).starts_with("loop.cond"));
    assert!(labels(main).iter().all(|label| !label.starts_with("loop.post")));
    assert_eq!(run(&module, "main", &[]).as_i64(), 5);
}

#[test]
fn infinite_loop_exits_through_break() {
    let source = "
func main() int {
    var n = 0
    for {
        if n == 3 {
            break
        }
        n = n + 1
    }
    return n
}
";
    assert_eq!(run_main(source).as_i64(), 3);
}

#[test]
fn break_leaves_only_the_innermost_loop() {
    let source = "
func main() int {
    var count = 0
    for var i = 0; i < 3; i = i + 1 {
        for var j = 0; j < 3; j = j + 1 {
            if j == 1 {
                break
            }
            count = count + 1
        }
    }
    return count
}
";
    assert_eq!(run_main(source).as_i64(), 3);
}

#[test]
fn loop_whose_body_always_returns_keeps_valid_blocks() {
    let source = "
func main() int {
    for var i = 0; i < 3; i = i + 1 {
        return 7
    }
    return 0
}
";
    let module = lower_ok(source);
    let main = function(&module, "main");
    assert!(labels(main).iter().all(|label| !label.starts_with("loop.post")));
    assert_eq!(run(&module, "main", &[]).as_i64(), 7);
}

#[test]
fn for_in_range_counts_up_to_end() {
    let source = "
func main() int {
    var sum = 0
    for i in 0..5 {
        sum = sum + i
    }
    return sum
}
";
    let module = lower_ok(source);
    let suffix = stmt_span(source, 1).label_suffix();
    let main = function(&module, "main");
    let labels = labels(main);
    for stage in ["cond", "body", "step", "end"] {
        let label = format!("for.{stage}.{suffix}");
        assert!(labels.contains(&label.as_str()), "missing {label} in {labels:?}");
    }
    assert!(main.instrs().any(|instr| matches!(
        instr,
        Instr::Alloca { name, .. } if name == "i.addr"
    )));
    assert_eq!(run(&module, "main", &[]).as_i64(), 10);
}

#[test]
fn for_in_continue_steps_the_counter() {
    let source = "
func main() int {
    var sum = 0
    for i in 0..6 {
        if i == 2 {
            continue
        }
        sum = sum + i
    }
    return sum
}
";
    let module = lower_ok(source);
    let main = function(&module, "main");
    assert!(branch_target(main, block(main, "if.then")).starts_with("for.step"));
    assert_eq!(run(&module, "main", &[]).as_i64(), 1 + 3 + 4 + 5);
}

#[test]
fn for_in_widens_mismatched_bounds_with_a_warning() {
    let source = "
func main() int {
    var n: int32 = 3
    var sum = 0
    for i in 0..n {
        sum = sum + i
    }
    return sum
}
";
    let output = lower(source);
    assert_eq!(codes(&output), vec![ErrorCode::W2005]);
    assert_eq!(run(&output.module, "main", &[]).as_i64(), 3);
}

#[test]
fn for_in_over_non_range_is_skipped_with_a_warning() {
    let source = "
func main() int {
    var xs = 3
    for x in xs {
        return 1
    }
    return 0
}
";
    let output = lower(source);
    assert_eq!(codes(&output), vec![ErrorCode::W2002]);
    assert_eq!(run(&output.module, "main", &[]).as_i64(), 0);
}

#[test]
fn break_and_continue_outside_a_loop_are_errors() {
    let output = lower("func main() {\n    break\n    continue\n}");
    assert_eq!(codes(&output), vec![ErrorCode::E2006, ErrorCode::E2007]);
}
