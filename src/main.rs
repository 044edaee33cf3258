use clap::Parser;
use colored::Colorize;
use flow_regress::report::summarize;
use flow_regress::{run_regression, FlowRegressError};
use std::process;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

/// Regression testing of message-based integration flows: inject configured
/// payload files, wait for asynchronous processing, extract the terminal
/// payloads and compare them against their expected counterparts.
#[derive(Debug, Parser)]
#[command(name = "flow-regress", version, about)]
struct Cli {
    /// Flow overview file (run settings and flow descriptors)
    #[arg(long, default_value = "flows.toml")]
    flows: String,

    /// Comparison overview file (case definitions)
    #[arg(long, default_value = "cases.toml")]
    cases: String,

    /// Verbose logging (debug level)
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if let Err(err) = execute(&cli) {
        eprintln!("{} {}", "Error:".bold().red(), err);
        process::exit(1);
    }
}

fn execute(cli: &Cli) -> Result<(), FlowRegressError> {
    let rt = Runtime::new()?;
    let (cases, report_path) = rt.block_on(run_regression(&cli.flows, &cli.cases))?;

    println!();
    for case in &cases {
        let line = summarize(case);
        if case.is_passed() {
            println!("  {} {}", "PASS".bold().green(), line);
        } else {
            println!("  {} {}", "FAIL".bold().red(), line);
        }
    }

    let passed = cases.iter().filter(|c| c.is_passed()).count();
    println!();
    println!(
        "{} {} of {} case(s) passed",
        "Summary:".bold(),
        passed,
        cases.len()
    );
    println!("Compare report is stored here: {}", report_path.display());

    if passed < cases.len() {
        process::exit(1);
    }
    Ok(())
}
