use bigm_model::LinearProgram;
use bigm_solver::{Simplex, SolveStatus};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bigm")]
#[command(about = "Big-M simplex solver for linear programs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a model file and print the solution
    Solve {
        /// The model file in interchange format
        file: PathBuf,
        /// Minimize, overriding the file's direction line
        #[arg(long, conflicts_with = "maximize")]
        minimize: bool,
        /// Maximize, overriding the file's direction line
        #[arg(long)]
        maximize: bool,
        /// Print tableau snapshots after setup and after each pivot
        #[arg(short, long)]
        verbose: bool,
        /// Emit the solution as JSON
        #[arg(long)]
        json: bool,
    },
    /// Parse a model file and report its shape
    Check {
        /// The file to check
        file: PathBuf,
    },
    /// Parse a model file and echo it back in interchange format
    Show {
        /// The file to echo
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            file,
            minimize,
            maximize,
            verbose,
            json,
        } => {
            let mut lp = load(&file);
            let direction = if minimize {
                true
            } else if maximize {
                false
            } else {
                lp.minimize
            };

            let mut simplex = Simplex::new().with_trace(verbose);
            let status = simplex.optimize(&mut lp, direction);

            if json {
                let values: serde_json::Map<String, serde_json::Value> = lp
                    .col_labels
                    .iter()
                    .zip(&simplex.x)
                    .map(|(label, &value)| (label.clone(), value.into()))
                    .collect();
                let report = serde_json::json!({
                    "status": status,
                    "minimize": direction,
                    "objective_value": simplex.objective_value,
                    "values": values,
                });
                println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
            } else {
                match status {
                    SolveStatus::Optimal => {
                        println!("Status: OPTIMAL");
                        println!("{} = {:.4}", lp.objective_label, simplex.objective_value);
                        for (label, value) in lp.col_labels.iter().zip(&simplex.x) {
                            println!("  {label:20} {value:12.4}");
                        }
                    }
                    SolveStatus::Infeasible => {
                        println!("Status: INFEASIBLE");
                        println!("No solution satisfies all constraints.");
                    }
                    SolveStatus::Unbounded => {
                        println!("Status: UNBOUNDED");
                        println!("The problem has no finite optimal solution.");
                    }
                    SolveStatus::IterationLimit => {
                        println!("Status: ITERATION LIMIT");
                        println!("The pivot loop did not converge.");
                    }
                }
            }

            if status != SolveStatus::Optimal {
                std::process::exit(1);
            }
        }
        Commands::Check { file } => {
            let lp = load(&file);
            let (mut le, mut eq, mut ge) = (0, 0, 0);
            for relation in &lp.relations {
                match relation {
                    bigm_model::Relation::Le => le += 1,
                    bigm_model::Relation::Eq => eq += 1,
                    bigm_model::Relation::Ge => ge += 1,
                }
            }

            println!("✓ {} is valid", file.display());
            println!("  direction:   {}", if lp.minimize { "minimize" } else { "maximize" });
            println!("  rows:        {}", lp.rows);
            println!("  cols:        {}", lp.cols);
            println!("  relations:   {le} <=, {eq} ==, {ge} >=");
        }
        Commands::Show { file } => {
            let lp = load(&file);
            print!("{}", bigm_model::write(&lp));
        }
    }
}

fn load(file: &PathBuf) -> LinearProgram {
    let source = match std::fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            std::process::exit(1);
        }
    };

    match bigm_model::parse(&source) {
        Ok(lp) => lp,
        Err(e) => {
            eprintln!("✗ {} has errors:", file.display());
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}
