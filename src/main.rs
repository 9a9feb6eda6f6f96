use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use slotwise::{demo, plan, render_text, Config, PlanRequest};

#[derive(Parser)]
#[command(name = "slotwise")]
#[command(version)]
#[command(about = "Plans task hours onto resource working calendars", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Logging verbosity (0 = silent .. 3 = trace)
    #[arg(short, long, global = true, default_value_t = 0)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan the tasks in a JSON request document
    Solve {
        /// Request file; reads stdin when omitted
        input: Option<PathBuf>,

        /// Write the solution document here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print the solution document
        #[arg(long)]
        pretty: bool,

        /// Also print a human-readable schedule listing
        #[arg(long)]
        text: bool,

        /// Override the planning start date (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<NaiveDate>,

        /// Override the initial horizon, in days
        #[arg(long)]
        horizon: Option<u32>,
    },
    /// Generate a sample data set and plan it
    Demo {
        #[arg(long, default_value_t = 12)]
        tasks: usize,

        #[arg(long, default_value_t = 4)]
        users: usize,

        #[arg(long, default_value_t = 7)]
        seed: u64,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut config = Config::from_env();
    config.verbosity = config.verbosity.max(cli.verbose);

    match cli.command {
        Commands::Solve {
            input,
            output,
            pretty,
            text,
            start_date,
            horizon,
        } => run_solve(&config, input, output, pretty, text, start_date, horizon),
        Commands::Demo { tasks, users, seed } => run_demo(&config, tasks, users, seed),
    }
}

fn run_solve(
    config: &Config,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    pretty: bool,
    text: bool,
    start_date: Option<NaiveDate>,
    horizon: Option<u32>,
) -> ExitCode {
    let raw = match read_input(input) {
        Ok(raw) => raw,
        Err(err) => {
            eprintln!("error: cannot read input: {err}");
            return ExitCode::from(3);
        }
    };

    let mut request = match PlanRequest::from_json(&raw) {
        Ok(request) => request,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(3);
        }
    };
    if start_date.is_some() {
        request.params.start_date = start_date;
    }
    if horizon.is_some() {
        request.params.initial_horizon_days = horizon;
    }

    let document = match plan(&request, config) {
        Ok(document) => document,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(3);
        }
    };

    let rendered = if pretty {
        serde_json::to_string_pretty(&document)
    } else {
        serde_json::to_string(&document)
    };
    let rendered = match rendered {
        Ok(rendered) => rendered,
        Err(err) => {
            eprintln!("error: cannot serialize solution: {err}");
            return ExitCode::from(3);
        }
    };

    let destination = output.or_else(|| config.output_file.clone().map(PathBuf::from));
    match destination {
        Some(path) => {
            if let Err(err) = fs::write(&path, &rendered) {
                eprintln!("error: cannot write {}: {err}", path.display());
                return ExitCode::from(3);
            }
            eprintln!("solution written to {}", path.display());
        }
        None => println!("{rendered}"),
    }

    if text {
        println!("{}", render_text(&document, &request.tasks));
    }

    if document.status.is_solution() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    }
}

fn run_demo(config: &Config, tasks: usize, users: usize, seed: u64) -> ExitCode {
    let start_date = chrono::Local::now().date_naive();
    let request = demo::generate(tasks, users, seed, start_date);

    let document = match plan(&request, config) {
        Ok(document) => document,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(3);
        }
    };

    println!("{}", render_text(&document, &request.tasks));
    println!(
        "status={:?} algorithm={} horizon={}d solve_time={:.3}s completeness={:.0}%",
        document.status,
        document.algorithm_used,
        document.horizon_days,
        document.solve_time,
        document.completeness * 100.0
    );

    if document.status.is_solution() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    }
}

fn read_input(input: Option<PathBuf>) -> std::io::Result<String> {
    match input {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut raw = String::new();
            std::io::stdin().read_to_string(&mut raw)?;
            Ok(raw)
        }
    }
}
