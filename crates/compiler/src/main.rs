use std::path::PathBuf;

use anyhow::{Context, Error, Result};
use clap::{Parser, ValueHint};
use fixbuf_compiler::{compile_scenario, load_scenario};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Inline array checker: validates element accesses, lowers them to span
/// operations and optionally runs the result
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario file to compile
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Enable verbose output (shows MIR)
    #[arg(short, long)]
    verbose: bool,

    /// Interpret the entry method after lowering
    #[arg(long)]
    run: bool,

    /// Method to interpret
    #[arg(long)]
    entry: Option<String>,

    /// Treat a well-known member as unavailable (repeatable)
    #[arg(long = "missing-member", value_name = "MEMBER")]
    missing_members: Vec<String>,

    /// Print a JSON report instead of rendered diagnostics
    #[arg(long)]
    json: bool,

    /// Disable colors in rendered diagnostics
    #[arg(long)]
    no_color: bool,

    /// Compare the outcome against the scenario's [expect] table
    #[arg(long)]
    check: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Error> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let scenario = load_scenario(&args.input)
        .with_context(|| format!("Error loading scenario '{}'", args.input.display()))?;

    let mut options = scenario.options.clone();
    options.add_missing_members(args.missing_members);
    options.run |= args.run;
    if args.entry.is_some() {
        options.entry = args.entry;
    }

    let output = compile_scenario(&scenario, &options).context("Compilation failed")?;

    if args.json {
        let report = output.report(args.verbose);
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let diagnostics = output.format_diagnostics(!args.no_color);
        if !diagnostics.is_empty() {
            println!("{diagnostics}");
        }
        for (method, error) in &output.failures {
            eprintln!("Failed to lower '{method}': {error}");
        }
        if args.verbose && !output.functions.is_empty() {
            println!("\n=== Generated MIR ===");
            println!("{}", output.pretty_mir());
            println!("=====================\n");
        }
        if let Some(run) = &output.execution {
            match &run.outcome {
                Ok(execution) => {
                    for line in &execution.output {
                        println!("{line}");
                    }
                    match &execution.result {
                        Some(result) => println!("Run of '{}' returned: {result}", run.entry),
                        None => println!("Run of '{}' succeeded", run.entry),
                    }
                }
                Err(error) => eprintln!("Run of '{}' failed: {error}", run.entry),
            }
        }
        println!("{}", output.summary());
    }

    let mut failed = output.has_errors();
    if args.check {
        match &scenario.expect {
            Some(expect) => {
                let mismatches = output.check(expect);
                for mismatch in &mismatches {
                    eprintln!("expectation not met: {mismatch}");
                }
                failed = !mismatches.is_empty();
            }
            None => eprintln!("'{}' has no [expect] table", args.input.display()),
        }
    }
    if failed {
        std::process::exit(1);
    }
    Ok(())
}
