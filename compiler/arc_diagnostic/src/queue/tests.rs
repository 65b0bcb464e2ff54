use std::path::Path;

use arc_ast::Span;
use pretty_assertions::assert_eq;

use super::*;

fn at(line: u32, column: u32) -> Option<SourceLocation> {
    Some(SourceLocation::at(Span::new(line, column)))
}

#[test]
fn test_counts_errors_and_warnings_separately() {
    let mut queue = DiagnosticQueue::new();
    queue.report_error(ErrorCode::E2001, "undefined: x".into(), at(1, 1));
    queue.report_warning(ErrorCode::W2001, "defer".into(), at(2, 1));
    queue.report_error(ErrorCode::E2006, "break outside loop".into(), None);

    assert_eq!(queue.error_count(), 2);
    assert_eq!(queue.warning_count(), 1);
    assert!(queue.has_errors().is_some());
}

#[test]
fn test_warnings_alone_are_not_errors() {
    let mut queue = DiagnosticQueue::new();
    queue.report_warning(ErrorCode::W2002, "for-in over non-range".into(), None);
    assert!(queue.has_errors().is_none());
}

#[test]
fn test_error_limit_drops_but_still_counts() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig { error_limit: 2 });
    for i in 0..4 {
        queue.report_error(ErrorCode::E2001, format!("error {i}"), at(i + 1, 1));
    }
    assert!(queue.limit_reached());
    assert_eq!(queue.error_count(), 4);
    assert_eq!(queue.suppressed_count(), 2);
    assert_eq!(queue.diagnostics().len(), 2);
}

#[test]
fn test_unlimited_config_keeps_everything() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig::unlimited());
    for i in 0..250 {
        queue.report_error(ErrorCode::E2001, format!("error {i}"), None);
    }
    assert!(!queue.limit_reached());
    assert_eq!(queue.diagnostics().len(), 250);
}

#[test]
fn test_flush_sorts_by_file_then_position() {
    let mut queue = DiagnosticQueue::new();
    let b = Some(SourceLocation::new(Some(Path::new("b.arc")), Span::new(1, 1)));
    let a_late = Some(SourceLocation::new(Some(Path::new("a.arc")), Span::new(9, 2)));
    let a_early = Some(SourceLocation::new(Some(Path::new("a.arc")), Span::new(2, 5)));
    queue.report_error(ErrorCode::E2001, "b".into(), b);
    queue.report_error(ErrorCode::E2001, "a late".into(), a_late);
    queue.report_error(ErrorCode::E2001, "a early".into(), a_early);

    let messages: Vec<_> = queue.flush().into_iter().map(|d| d.message).collect();
    assert_eq!(messages, vec!["a early", "a late", "b"]);
    assert_eq!(queue.error_count(), 0);
}

#[test]
fn test_messages_with_code_filters() {
    let mut queue = DiagnosticQueue::new();
    queue.report_error(ErrorCode::E2005, "cannot assign to constant 'x'".into(), None);
    queue.report_error(ErrorCode::E2001, "undefined: y".into(), None);
    let found: Vec<_> = queue.messages_with_code(ErrorCode::E2005).collect();
    assert_eq!(found, vec!["cannot assign to constant 'x'"]);
}
