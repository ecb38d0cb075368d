//! Parse an embedded DIMACS formula and enumerate its models.

use robdd::{Bdd, CnfProblem};

const FORMULA: &str = "\
c (x1 or not x2) and (x2 or x3)
p cnf 3 2
1 -2 0
2 3 0
";

fn main() {
    let problem = CnfProblem::from_dimacs(FORMULA).expect("embedded formula is well-formed");
    let mut bdd = Bdd::with_capacity(1 << 10);
    let formula = problem.build(&mut bdd);

    println!(
        "{} variables, {} clauses, {} models",
        problem.num_variables(),
        problem.num_clauses(),
        bdd.count_satisfying_assignments(formula)
    );
    for assignment in bdd.solutions(formula) {
        let row: String = (0..problem.num_variables())
            .map(|var| if assignment.contains(var) { '1' } else { '0' })
            .collect();
        println!("  {row}");
    }
}
