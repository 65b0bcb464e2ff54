use std::path::Path;

use pretty_assertions::assert_eq;

use super::*;

#[test]
fn test_builder_sets_fields() {
    let diag = Diagnostic::error(ErrorCode::E2001)
        .with_message("undefined: x")
        .with_location(SourceLocation::at(Span::new(3, 7)))
        .with_note("declare it with `var`");

    assert_eq!(diag.code, ErrorCode::E2001);
    assert_eq!(diag.severity, Severity::Error);
    assert_eq!(diag.message, "undefined: x");
    assert_eq!(diag.notes, vec!["declare it with `var`".to_string()]);
    assert!(diag.is_error());
}

#[test]
fn test_warning_is_not_error() {
    let diag = Diagnostic::warning(ErrorCode::W2001).with_message("defer evaluated in place");
    assert!(!diag.is_error());
    assert_eq!(diag.severity.to_string(), "warning");
}

#[test]
fn test_display_with_file_location() {
    let diag = Diagnostic::error(ErrorCode::E2005)
        .with_message("cannot assign to constant 'x'")
        .with_location(SourceLocation::new(
            Some(Path::new("src/main.arc")),
            Span::new(4, 5),
        ));
    assert_eq!(
        diag.to_string(),
        "src/main.arc:4:5: error[E2005]: cannot assign to constant 'x'"
    );
}

#[test]
fn test_display_without_location() {
    let diag = Diagnostic::error(ErrorCode::E3001).with_message("circular import");
    assert_eq!(diag.to_string(), "error[E3001]: circular import");
}

#[test]
fn test_optional_location_none_clears() {
    let diag = Diagnostic::error(ErrorCode::E2001)
        .with_location(SourceLocation::at(Span::new(1, 1)))
        .with_optional_location(None);
    assert_eq!(diag.location, None);
    assert_eq!(diag.sort_key(), (0, 0));
}
