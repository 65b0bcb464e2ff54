use std::path::PathBuf;

use arc_diagnostic::DiagnosticConfig;
use arc_lower::DeferMode;
use pretty_assertions::assert_eq;

use super::{parse_build_options, BuildOptions, OptionsError};

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(ToString::to_string).collect()
}

#[test]
fn input_alone_uses_defaults() {
    let options = parse_build_options(&args(&["app/main.arc"])).unwrap();
    assert_eq!(options, BuildOptions::new("app/main.arc"));
    assert_eq!(options.output_path(), PathBuf::from("main.ir"));
    assert_eq!(options.module_name(), "main");
    assert_eq!(options.diagnostic_config(), DiagnosticConfig::default());
}

#[test]
fn every_option_in_any_order() {
    let options = parse_build_options(&args(&[
        "-v",
        "--defer=exit",
        "app",
        "-o",
        "out/app.ll",
        "--error-limit=5",
    ]))
    .unwrap();
    assert_eq!(
        options,
        BuildOptions {
            input: PathBuf::from("app"),
            output: Some(PathBuf::from("out/app.ll")),
            defer_mode: DeferMode::RunAtExit,
            error_limit: Some(5),
            verbose: true,
        }
    );
    assert_eq!(options.output_path(), PathBuf::from("out/app.ll"));
    assert_eq!(options.diagnostic_config().error_limit, 5);

    let config = options.lower_config();
    assert_eq!(config.module_name, "app");
    assert_eq!(config.defer_mode, DeferMode::RunAtExit);
}

#[test]
fn output_flag_forms() {
    let options = parse_build_options(&args(&["--output=x.ir", "a.arc"])).unwrap();
    assert_eq!(options.output, Some(PathBuf::from("x.ir")));

    let options = parse_build_options(&args(&["a.arc", "--defer=inline"])).unwrap();
    assert_eq!(options.defer_mode, DeferMode::EvaluateInPlace);
}

#[test]
fn malformed_arguments_are_rejected() {
    assert_eq!(
        parse_build_options(&args(&[])),
        Err(OptionsError::MissingInput)
    );
    assert_eq!(
        parse_build_options(&args(&["a.arc", "-o"])),
        Err(OptionsError::MissingValue("-o"))
    );
    assert_eq!(
        parse_build_options(&args(&["a.arc", "b.arc"])),
        Err(OptionsError::ExtraInput("b.arc".into(), "a.arc".into()))
    );
    assert_eq!(
        parse_build_options(&args(&["a.arc", "--release"])),
        Err(OptionsError::UnknownOption("--release".into()))
    );

    let error = parse_build_options(&args(&["a.arc", "--defer=later"])).unwrap_err();
    assert_eq!(
        error.to_string(),
        "invalid value 'later' for '--defer' (expected 'inline' or 'exit')"
    );
    let error = parse_build_options(&args(&["a.arc", "--error-limit=-1"])).unwrap_err();
    assert!(matches!(
        error,
        OptionsError::InvalidValue {
            flag: "--error-limit",
            ..
        }
    ));
}
