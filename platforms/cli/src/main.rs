use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use statemachines::{
    convert_mealy_file, convert_moore_file, Executor, MachineKind, MachineLoader, OnUnmatched,
};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[clap(author, version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a Mealy machine table into an equivalent Moore machine table
    MealyToMoore {
        /// The Mealy machine table to read
        input: PathBuf,
        /// Where to write the Moore machine table
        output: PathBuf,
    },
    /// Convert a Moore machine table into an equivalent Mealy machine table
    MooreToMealy {
        /// The Moore machine table to read
        input: PathBuf,
        /// Where to write the Mealy machine table
        output: PathBuf,
    },
    /// Run an input sequence through a machine and print the output signals
    Run {
        /// The machine model: mealy or moore
        kind: MachineKind,
        /// The machine table to run
        machine: PathBuf,
        /// The state to start in
        start: String,
        /// Input symbols; an argument may hold several comma separated symbols
        #[clap(required = true)]
        input: Vec<String>,
        /// Skip symbols without a transition instead of failing
        #[clap(long)]
        use_warnings: bool,
        /// Print the whole run as JSON
        #[clap(long)]
        json: bool,
    },
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // Logs go to stderr so stdout only carries results.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

/// Splits every argument on commas and drops empty pieces.
fn split_symbols(input: &[String]) -> Vec<&str> {
    input
        .iter()
        .flat_map(|arg| arg.split(','))
        .map(str::trim)
        .filter(|symbol| !symbol.is_empty())
        .collect()
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Command::MealyToMoore { input, output } => {
            convert_mealy_file(&input, &output)
                .with_context(|| format!("Failed to convert {}", input.display()))?;
            tracing::info!(output = %output.display(), "wrote moore machine");
        }
        Command::MooreToMealy { input, output } => {
            convert_moore_file(&input, &output)
                .with_context(|| format!("Failed to convert {}", input.display()))?;
            tracing::info!(output = %output.display(), "wrote mealy machine");
        }
        Command::Run {
            kind,
            machine,
            start,
            input,
            use_warnings,
            json,
        } => {
            let state_machine = MachineLoader::load(kind, &machine)
                .with_context(|| format!("Failed to load {}", machine.display()))?;

            let on_unmatched = if use_warnings {
                OnUnmatched::SkipAndWarn
            } else {
                OnUnmatched::Abort
            };
            let symbols = split_symbols(&input);
            let trace = Executor::new(on_unmatched).run_from(&state_machine, &start, &symbols)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&trace)?);
            } else {
                println!("{}", trace.signals.join(","));
            }
        }
    }

    Ok(())
}
