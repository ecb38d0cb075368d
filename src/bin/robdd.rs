//! ROBDD command-line interface
//!
//! Loads a DIMACS CNF file, builds the formula, and reports on it.

use clap::{Parser, ValueEnum};
use robdd::{Bdd, CnfProblem};
use std::path::PathBuf;
use std::process;

#[derive(Debug, Clone, PartialEq, ValueEnum)]
enum Command {
    /// Count the satisfying assignments (default)
    Count,
    /// Print satisfying assignments as bit strings
    Solutions,
    /// Print statistics about the formula and the node table
    Stats,
}

#[derive(Parser, Debug)]
#[command(name = "robdd")]
#[command(about = "Build a BDD from a DIMACS CNF file and query it", long_about = None)]
#[command(version)]
struct Args {
    /// Input DIMACS CNF file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Subcommand to execute
    #[arg(short = 'D', long = "do", value_enum, default_value = "count")]
    command: Command,

    /// Maximum number of solutions to print
    #[arg(short = 'l', long = "limit", default_value_t = 64)]
    limit: usize,

    /// Initial node-table capacity
    #[arg(long = "capacity", default_value_t = 1 << 16)]
    capacity: usize,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let problem = match CnfProblem::from_file(&args.input) {
        Ok(problem) => problem,
        Err(err) => {
            eprintln!("Error reading '{}': {}", args.input.display(), err);
            process::exit(1);
        }
    };

    let mut bdd = Bdd::with_capacity(args.capacity);
    let formula = problem.build(&mut bdd);

    match args.command {
        Command::Count => {
            println!("{}", bdd.count_satisfying_assignments(formula));
        }
        Command::Solutions => {
            let variables = bdd.number_of_variables();
            for assignment in bdd.solutions(formula).take(args.limit) {
                let row: String = (0..variables)
                    .map(|var| if assignment.contains(var) { '1' } else { '0' })
                    .collect();
                println!("{row}");
            }
        }
        Command::Stats => {
            println!("Formula statistics:");
            println!("  Variables:     {}", problem.num_variables());
            println!("  Clauses:       {}", problem.num_clauses());
            println!("  BDD nodes:     {}", bdd.node_count(formula));
            println!("  Table size:    {}", bdd.capacity());
            println!("  Nodes in use:  {}", bdd.active_node_count());
            println!("  Models:        {}", bdd.count_satisfying_assignments(formula));
        }
    }
}
