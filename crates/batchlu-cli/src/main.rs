//! batchlu command-line tool.
//!
//! `batchlu plan` answers workspace size queries; `batchlu solve` runs a
//! batched solve described by a JSON problem file.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use batchlu::{Handle, HandleConfig, WorkRole};
use batchlu_cli::{PlanArgs, Problem, SolveReport, solve_problem};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "batchlu")]
#[command(about = "Batched LU factorization, solve and inversion")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query the workspace an operation needs
    Plan(PlanArgs),

    /// Solve a batch of systems from a JSON problem file
    ///
    /// Exits with status 2 when any system is singular.
    Solve {
        /// Path to the problem file
        problem: PathBuf,

        /// Minimum batch size before systems are solved in parallel
        #[arg(long, default_value_t = 16)]
        parallel_min_batch: usize,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Plan(args) => cmd_plan(&args),
        Commands::Solve {
            problem,
            parallel_min_batch,
            json,
        } => cmd_solve(problem, parallel_min_batch, json),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn cmd_plan(args: &PlanArgs) -> Result<ExitCode> {
    let plan = batchlu_cli::plan(args)?;

    let routine = format!("{}{}", args.precision.prefix(), args.op.name());
    if args.json {
        let sizes: serde_json::Map<String, serde_json::Value> = WorkRole::ALL
            .iter()
            .map(|&role| (role.name().to_string(), plan.sizes.get(role).into()))
            .collect();
        let report = serde_json::json!({
            "routine": routine,
            "n": args.n,
            "nrhs": args.nrhs,
            "batch": args.batch,
            "index_bits": args.index.bits(),
            "sizes": sizes,
            "total": plan.sizes.total(),
            "optim_mem": plan.optim_mem,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{routine} n={} nrhs={} batch={} ({}-bit indices)",
            args.n,
            args.nrhs,
            args.batch,
            args.index.bits()
        );
        for role in WorkRole::ALL {
            println!("  {:<10} {:>12} bytes", role.name(), plan.sizes.get(role));
        }
        println!("  {:<10} {:>12} bytes", "total", plan.sizes.total());
        println!("  optim_mem  {}", plan.optim_mem);
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_solve(path: PathBuf, parallel_min_batch: usize, json: bool) -> Result<ExitCode> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("reading problem file {}", path.display()))?;
    let problem: Problem = serde_json::from_str(&content)
        .with_context(|| format!("parsing problem file {}", path.display()))?;

    let handle =
        Handle::with_config(HandleConfig::default().with_parallel_min_batch(parallel_min_batch));

    let report = solve_problem(&handle, &problem)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.singular.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(2))
    }
}

fn print_report(report: &SolveReport) {
    println!(
        "{}gesv_outofplace: {} systems, n={}, nrhs={}",
        report.precision, report.batch_size, report.n, report.nrhs
    );
    let block = report.n * report.nrhs;
    for (i, &info) in report.info.iter().enumerate() {
        if info != 0 {
            println!("  system {i}: singular (U({info},{info}) = 0)");
            continue;
        }
        let start = i * block;
        let values: Vec<String> = (start..start + block)
            .map(|k| match &report.solutions_im {
                Some(im) => format!("{:.6e}{:+.6e}i", report.solutions[k], im[k]),
                None => format!("{:.6e}", report.solutions[k]),
            })
            .collect();
        println!("  system {i}: [{}]", values.join(", "));
    }
    if !report.singular.is_empty() {
        println!(
            "{} of {} systems singular",
            report.singular.len(),
            report.batch_size
        );
    }
}
