use blandlp_solver::{LpProblem, Phase, PivotEvent, Solution, SolutionStatus, Solver};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "blandlp")]
#[command(about = "Solve standard-form linear programs with the two-phase simplex method", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve an LP stored as JSON ({"costs": [..], "coefficients": [[..]], "rhs": [..]})
    Solve {
        /// The file containing the problem
        file: PathBuf,
        /// Output format (json, pretty)
        #[arg(short, long, default_value = "pretty")]
        format: String,
        /// Print each pivot as it happens
        #[arg(long)]
        trace: bool,
        /// Print the terminal dictionary
        #[arg(long)]
        dictionary: bool,
        /// Tolerance for floating point comparisons
        #[arg(long, default_value_t = 1e-9)]
        tolerance: f64,
        /// Give up after this many pivots
        #[arg(long)]
        max_iterations: Option<usize>,
    },
    /// Check an LP file for errors
    Check {
        /// The file to check
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match cli.command {
        Commands::Solve {
            file,
            format,
            trace,
            dictionary,
            tolerance,
            max_iterations,
        } => {
            let problem = load(&file);

            let mut solver = Solver::new().with_tolerance(tolerance);
            if let Some(max) = max_iterations {
                solver = solver.with_max_iterations(max);
            }

            let result = if trace {
                let mut observer = |event: PivotEvent| print_pivot(&event);
                solver.solve_with_observer(&problem, &mut observer)
            } else {
                solver.solve(&problem)
            };

            let solution = match result {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Solver error: {}", e);
                    std::process::exit(1);
                }
            };

            if format == "json" {
                match serde_json::to_string_pretty(&solution) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error serializing solution: {}", e);
                        std::process::exit(1);
                    }
                }
            } else {
                print_solution(&solution, dictionary);
            }

            if !solution.is_optimal() {
                std::process::exit(1);
            }
        }
        Commands::Check { file } => {
            let problem = load(&file);
            println!("✓ {} is valid", file.display());
            println!("  {} variables", problem.num_variables());
            println!("  {} constraints", problem.num_constraints());
            if !problem.is_origin_feasible() {
                println!("  origin is infeasible, phase one will run");
            }
        }
    }
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Read and validate a problem, exiting on failure.
fn load(file: &Path) -> LpProblem {
    let source = match std::fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            std::process::exit(1);
        }
    };

    let problem: LpProblem = match serde_json::from_str(&source) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Parse error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = problem.validate() {
        eprintln!("✗ {} has errors:", file.display());
        eprintln!("  {}", e);
        std::process::exit(1);
    }
    problem
}

fn print_pivot(event: &PivotEvent) {
    // Phase one shows the auxiliary variable as x0; phase two numbers the
    // problem's own columns from 1.
    let offset = match event.phase {
        Phase::One => 0,
        Phase::Two => 1,
    };
    println!("x{} entering, x{} leaving", event.entering + offset, event.leaving + offset);
}

fn print_solution(solution: &Solution, show_dictionary: bool) {
    match solution.status {
        SolutionStatus::Optimal => {
            println!("Status: OPTIMAL");
            println!("Objective: {}", solution.objective_value);
            println!("Pivots: {}", solution.pivots);
            println!();
            println!("Variables:");
            for (i, value) in solution.values.iter().enumerate() {
                println!("  x{:<6} {:12.6}", i + 1, value);
            }
            println!();
            println!("Constraints:");
            for (i, (slack, price)) in solution.slacks.iter().zip(&solution.analysis.shadow_prices).enumerate() {
                let binding = if solution.analysis.binding_constraints.contains(&i) { "binding" } else { "" };
                println!("  row {:<4} slack {:12.6}  shadow price {:12.6}  {}", i, slack, price, binding);
            }

            if show_dictionary {
                if let Some(ref dictionary) = solution.dictionary {
                    println!();
                    println!("Basic: {:?}", solution.basic);
                    println!("Nonbasic: {:?}", solution.nonbasic);
                    println!("A = {}", dictionary.constraints());
                    println!("b = {}", dictionary.rhs());
                    println!("c = {}", dictionary.reduced_costs());
                }
            }
        }
        SolutionStatus::Infeasible => {
            println!("Status: INFEASIBLE");
            println!("No solution exists that satisfies all constraints.");
        }
        SolutionStatus::Unbounded => {
            println!("Status: UNBOUNDED");
            println!("The problem has no finite optimal solution.");
        }
    }
}
