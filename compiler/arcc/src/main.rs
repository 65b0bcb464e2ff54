//! Arc Compiler CLI

use arcc::commands::{build_file, check_file};
use arcc::{init_tracing, parse_build_options, BuildOptions};

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    match command.as_str() {
        "build" => {
            let options = options_or_exit(&args[2..], "build <file.arc|dir> [options]");
            exit_on_failure(build_file(&options));
        }
        "check" => {
            let options = options_or_exit(&args[2..], "check <file.arc|dir> [options]");
            exit_on_failure(check_file(&options));
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" => {
            println!("Arc Compiler {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn options_or_exit(args: &[String], usage: &str) -> BuildOptions {
    match parse_build_options(args) {
        Ok(options) => options,
        Err(error) => {
            eprintln!("error: {error}");
            eprintln!("Usage: arc {usage}");
            eprintln!("Run `arc help` for the list of options.");
            std::process::exit(1);
        }
    }
}

fn exit_on_failure(succeeded: bool) {
    if !succeeded {
        std::process::exit(1);
    }
}

fn print_usage() {
    println!("Arc Compiler");
    println!();
    println!("Usage: arc <command> [options]");
    println!();
    println!("Commands:");
    println!("  build <file.arc|dir>   Compile to textual IR");
    println!("  check <file.arc|dir>   Compile and report diagnostics only");
    println!("  help                   Show this help message");
    println!("  version                Show version information");
    println!();
    println!("Build options:");
    println!("  -o <path>              Output file (default: <name>.ir)");
    println!("  --defer=<mode>         defer: inline (evaluate in place, default), exit (run at function exit)");
    println!("  --error-limit=<n>      Stop printing after n errors (0 = unlimited, default 100)");
    println!("  -v, --verbose          Verbose output");
    println!();
    println!("Environment:");
    println!("  RUST_LOG=<filter>      Enable tracing, e.g. RUST_LOG=arc_lower=debug");
    println!("  ARC_LOG_TREE=1         Indented span-tree tracing output");
    println!();
    println!("Examples:");
    println!("  arc build main.arc");
    println!("  arc build app/ -o app.ir --defer=exit");
    println!("  arc check lib/util");
}
