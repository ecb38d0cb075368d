//! Build a 16-variable odd-parity function and report on it.

use robdd::{Bdd, FALSE_NODE};

fn main() {
    let mut bdd = Bdd::with_capacity(1 << 12);
    let vars = bdd.create_variables(16);

    let mut parity = FALSE_NODE;
    for &var in &vars {
        let next = bdd.xor(parity, var);
        parity = bdd.update_with(next, parity);
    }

    println!("odd parity over {} variables", bdd.number_of_variables());
    println!("  nodes in the diagram: {}", bdd.node_count(parity));
    println!("  satisfying assignments: {}", bdd.count_satisfying_assignments(parity));

    let witness = bdd.satisfying_assignment(parity).unwrap();
    let row: String = (0..16)
        .map(|var| if witness.contains(var) { '1' } else { '0' })
        .collect();
    println!("  one witness: {row}");
}
