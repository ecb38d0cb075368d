//! Tests for the engine and the apply algorithms

use super::*;

fn engine_with_vars(count: usize) -> (Bdd, Vec<NodeId>) {
    let mut bdd = Bdd::with_capacity(1 << 10);
    let vars = bdd.create_variables(count);
    (bdd, vars)
}

fn bits(values: &[usize], len: usize) -> FixedBitSet {
    let mut set = FixedBitSet::with_capacity(len);
    for &value in values {
        set.insert(value);
    }
    set
}

#[test]
fn terminals_are_fixed() {
    let bdd = Bdd::default();
    assert_eq!(bdd.false_node(), FALSE_NODE);
    assert_eq!(bdd.true_node(), TRUE_NODE);
    assert!(bdd.is_terminal(FALSE_NODE));
    assert!(bdd.is_terminal(TRUE_NODE));
}

#[test]
fn variable_literals_have_the_expected_shape() {
    let (bdd, vars) = engine_with_vars(3);
    assert_eq!(bdd.number_of_variables(), 3);
    for (index, &literal) in vars.iter().enumerate() {
        assert_eq!(bdd.variable_node(index as VarId), literal);
        assert_eq!(bdd.variable(literal), index as VarId);
        assert_eq!(bdd.low(literal), FALSE_NODE);
        assert_eq!(bdd.high(literal), TRUE_NODE);
        assert!(bdd.is_variable(literal));
        assert!(!bdd.is_variable_negated(literal));
        assert_eq!(bdd.reference_count(literal), None);
    }
}

#[test]
fn negated_literals_are_recognised() {
    let (mut bdd, vars) = engine_with_vars(1);
    let negated = bdd.not(vars[0]);
    assert!(bdd.is_variable_negated(negated));
    assert!(bdd.is_variable_or_negated(negated));
    assert!(!bdd.is_variable(negated));
    assert_eq!(bdd.reference_count(negated), None);
}

#[test]
fn and_terminal_cases() {
    let (mut bdd, vars) = engine_with_vars(1);
    let x = vars[0];
    assert_eq!(bdd.and(FALSE_NODE, x), FALSE_NODE);
    assert_eq!(bdd.and(x, FALSE_NODE), FALSE_NODE);
    assert_eq!(bdd.and(TRUE_NODE, x), x);
    assert_eq!(bdd.and(x, TRUE_NODE), x);
    assert_eq!(bdd.and(x, x), x);
}

#[test]
fn or_terminal_cases() {
    let (mut bdd, vars) = engine_with_vars(1);
    let x = vars[0];
    assert_eq!(bdd.or(TRUE_NODE, x), TRUE_NODE);
    assert_eq!(bdd.or(x, TRUE_NODE), TRUE_NODE);
    assert_eq!(bdd.or(FALSE_NODE, x), x);
    assert_eq!(bdd.or(x, FALSE_NODE), x);
    assert_eq!(bdd.or(x, x), x);
}

#[test]
fn xor_terminal_cases() {
    let (mut bdd, vars) = engine_with_vars(1);
    let x = vars[0];
    let not_x = bdd.not(x);
    assert_eq!(bdd.xor(FALSE_NODE, x), x);
    assert_eq!(bdd.xor(x, FALSE_NODE), x);
    assert_eq!(bdd.xor(x, x), FALSE_NODE);
    assert_eq!(bdd.xor(x, not_x), TRUE_NODE);
    assert_eq!(bdd.xor(TRUE_NODE, x), not_x);
}

#[test]
fn nand_terminal_cases() {
    let (mut bdd, vars) = engine_with_vars(1);
    let x = vars[0];
    let not_x = bdd.not(x);
    assert_eq!(bdd.nand(FALSE_NODE, x), TRUE_NODE);
    assert_eq!(bdd.nand(x, TRUE_NODE), not_x);
    assert_eq!(bdd.nand(x, x), not_x);
}

#[test]
fn equivalence_terminal_cases() {
    let (mut bdd, vars) = engine_with_vars(1);
    let x = vars[0];
    let not_x = bdd.not(x);
    assert_eq!(bdd.equivalence(x, x), TRUE_NODE);
    assert_eq!(bdd.equivalence(x, TRUE_NODE), x);
    assert_eq!(bdd.equivalence(TRUE_NODE, x), x);
    assert_eq!(bdd.equivalence(x, FALSE_NODE), not_x);
    assert_eq!(bdd.equivalence(x, not_x), FALSE_NODE);
}

#[test]
fn implication_terminal_cases() {
    let (mut bdd, vars) = engine_with_vars(1);
    let x = vars[0];
    let not_x = bdd.not(x);
    assert_eq!(bdd.implication(FALSE_NODE, x), TRUE_NODE);
    assert_eq!(bdd.implication(x, TRUE_NODE), TRUE_NODE);
    assert_eq!(bdd.implication(TRUE_NODE, x), x);
    assert_eq!(bdd.implication(x, FALSE_NODE), not_x);
    assert_eq!(bdd.implication(x, x), TRUE_NODE);
}

#[test]
fn commutativity_is_index_equality() {
    let (mut bdd, vars) = engine_with_vars(2);
    let (x, y) = (vars[0], vars[1]);
    assert_eq!(bdd.and(x, y), bdd.and(y, x));
    assert_eq!(bdd.or(x, y), bdd.or(y, x));
    assert_eq!(bdd.xor(x, y), bdd.xor(y, x));
    assert_eq!(bdd.equivalence(x, y), bdd.equivalence(y, x));
    assert_eq!(bdd.nand(x, y), bdd.nand(y, x));
}

#[test]
fn associativity_is_index_equality() {
    let (mut bdd, vars) = engine_with_vars(3);
    let (x, y, z) = (vars[0], vars[1], vars[2]);
    let yz = bdd.and(y, z);
    let left = bdd.and(x, yz);
    let xy = bdd.and(x, y);
    let right = bdd.and(xy, z);
    assert_eq!(left, right);

    let yz = bdd.or(y, z);
    let left = bdd.or(x, yz);
    let xy = bdd.or(x, y);
    let right = bdd.or(xy, z);
    assert_eq!(left, right);
}

#[test]
fn de_morgan() {
    let (mut bdd, vars) = engine_with_vars(2);
    let (x, y) = (vars[0], vars[1]);
    let xy = bdd.and(x, y);
    let left = bdd.not(xy);
    let not_x = bdd.not(x);
    let not_y = bdd.not(y);
    let right = bdd.or(not_x, not_y);
    assert_eq!(left, right);
}

#[test]
fn double_negation_restores_the_index() {
    let (mut bdd, vars) = engine_with_vars(3);
    let (x, y, z) = (vars[0], vars[1], vars[2]);
    let xy = bdd.and(x, y);
    let f = bdd.or(xy, z);
    let negated = bdd.not(f);
    assert_eq!(bdd.not(negated), f);
}

#[test]
fn ite_matches_its_decomposition() {
    let (mut bdd, vars) = engine_with_vars(3);
    let (c, t, e) = (vars[0], vars[1], vars[2]);
    let ite = bdd.if_then_else(c, t, e);

    let ct = bdd.and(c, t);
    let not_c = bdd.not(c);
    let not_c_e = bdd.and(not_c, e);
    let decomposed = bdd.or(ct, not_c_e);
    assert_eq!(ite, decomposed);
}

#[test]
fn ite_collapse_rules() {
    let (mut bdd, vars) = engine_with_vars(2);
    let (c, t) = (vars[0], vars[1]);
    let not_c = bdd.not(c);
    assert_eq!(bdd.if_then_else(TRUE_NODE, t, c), t);
    assert_eq!(bdd.if_then_else(FALSE_NODE, t, c), c);
    assert_eq!(bdd.if_then_else(c, TRUE_NODE, FALSE_NODE), c);
    assert_eq!(bdd.if_then_else(c, FALSE_NODE, TRUE_NODE), not_c);
    assert_eq!(bdd.if_then_else(c, t, t), t);
}

#[test]
fn implies_matches_the_implication_node() {
    let (mut bdd, vars) = engine_with_vars(2);
    let (x, y) = (vars[0], vars[1]);
    let xy = bdd.and(x, y);
    assert!(bdd.implies(xy, x));
    assert!(bdd.implies(xy, y));
    assert!(!bdd.implies(x, xy));
    assert!(bdd.implies(FALSE_NODE, x));
    assert!(bdd.implies(x, TRUE_NODE));

    let node = bdd.implication(xy, x);
    assert_eq!(node, TRUE_NODE);
    let node = bdd.implication(x, xy);
    assert_ne!(node, TRUE_NODE);
}

#[test]
fn evaluate_walks_the_assignment() {
    let (mut bdd, vars) = engine_with_vars(3);
    let (x0, x1, x2) = (vars[0], vars[1], vars[2]);
    let high = bdd.and(x0, x1);
    let not_x0 = bdd.not(x0);
    let low = bdd.and(not_x0, x2);
    let f = bdd.or(high, low);

    assert!(bdd.evaluate(f, &bits(&[0, 1], 3)));
    assert!(bdd.evaluate(f, &bits(&[2], 3)));
    assert!(!bdd.evaluate(f, &bits(&[1], 3)));
    assert!(!bdd.evaluate(f, &bits(&[0], 3)));
}

#[test]
fn support_collects_the_cone() {
    let (mut bdd, vars) = engine_with_vars(4);
    let (x0, x1, x2) = (vars[0], vars[1], vars[2]);
    let high = bdd.and(x0, x1);
    let not_x0 = bdd.not(x0);
    let low = bdd.and(not_x0, x2);
    let f = bdd.or(high, low);

    let support = bdd.support(f);
    assert_eq!(support.ones().collect::<Vec<_>>(), vec![0, 1, 2]);
    assert!(bdd.support(TRUE_NODE).is_clear());

    let bounded = bdd.support_within(f, 1);
    assert_eq!(bounded.ones().collect::<Vec<_>>(), vec![0]);
}

#[test]
fn node_count_includes_terminals() {
    let (mut bdd, vars) = engine_with_vars(2);
    assert_eq!(bdd.node_count(TRUE_NODE), 1);
    assert_eq!(bdd.node_count(vars[0]), 3);
    let xy = bdd.and(vars[0], vars[1]);
    assert_eq!(bdd.node_count(xy), 4);
}

#[test]
fn exists_and_forall_follow_the_recurrence() {
    let (mut bdd, vars) = engine_with_vars(2);
    let (x, y) = (vars[0], vars[1]);
    let xy = bdd.and(x, y);

    let quantified = bdd.exists(xy, &bits(&[0], 2));
    assert_eq!(quantified, y);
    let quantified = bdd.forall(xy, &bits(&[0], 2));
    assert_eq!(quantified, FALSE_NODE);

    let x_or_y = bdd.or(x, y);
    let quantified = bdd.forall(x_or_y, &bits(&[0], 2));
    assert_eq!(quantified, y);
    let quantified = bdd.exists(x_or_y, &bits(&[0, 1], 2));
    assert_eq!(quantified, TRUE_NODE);

    // Quantifying over an empty or disjoint set is the identity.
    assert_eq!(bdd.exists(xy, &bits(&[], 2)), xy);
}

#[test]
fn exists_agrees_with_restrict() {
    let (mut bdd, vars) = engine_with_vars(3);
    let (x0, x1, x2) = (vars[0], vars[1], vars[2]);
    let a = bdd.and(x0, x1);
    let b = bdd.and(x1, x2);
    let f = bdd.or(a, b);

    let mask = bits(&[1], 3);
    let positive = bdd.restrict(f, &mask, &bits(&[1], 3));
    let negative = bdd.restrict(f, &mask, &bits(&[], 3));
    let union = bdd.or(positive, negative);
    assert_eq!(bdd.exists(f, &mask), union);

    let intersection = bdd.and(positive, negative);
    assert_eq!(bdd.forall(f, &mask), intersection);
}

#[test]
fn compose_substitutes_variables() {
    let (mut bdd, vars) = engine_with_vars(3);
    let (x0, x1, x2) = (vars[0], vars[1], vars[2]);

    // Literal composition follows the substitution directly.
    let substitution = vec![None, Some(x2), None];
    assert_eq!(bdd.compose(x1, &substitution), x2);
    assert_eq!(bdd.compose(x0, &substitution), x0);

    // (x0 AND x1)[x1 := x2] = x0 AND x2
    let f = bdd.and(x0, x1);
    let expected = bdd.and(x0, x2);
    assert_eq!(bdd.compose(f, &substitution), expected);

    // Substituting outside the support changes nothing.
    let substitution = vec![None, None, Some(x0)];
    assert_eq!(bdd.compose(f, &substitution), f);
}

#[test]
fn compose_with_an_ordering_reversal() {
    let (mut bdd, vars) = engine_with_vars(3);
    let (x0, x1, x2) = (vars[0], vars[1], vars[2]);
    // Substitute the deepest variable by the shallowest.
    let f = bdd.and(x1, x2);
    let substitution = vec![None, None, Some(x0)];
    let expected = bdd.and(x1, x0);
    assert_eq!(bdd.compose(f, &substitution), expected);
}

#[test]
fn restrict_is_cofactor_selection() {
    let (mut bdd, vars) = engine_with_vars(2);
    let (x, y) = (vars[0], vars[1]);
    let f = bdd.xor(x, y);

    let mask = bits(&[0], 2);
    let not_y = bdd.not(y);
    assert_eq!(bdd.restrict(f, &mask, &bits(&[0], 2)), not_y);
    assert_eq!(bdd.restrict(f, &mask, &bits(&[], 2)), y);
    assert_eq!(bdd.restrict(f, &bits(&[], 2), &bits(&[], 2)), f);
}

#[test]
fn cube_builds_the_conjunction_of_literals() {
    let (mut bdd, vars) = engine_with_vars(3);
    let (x0, x1, x2) = (vars[0], vars[1], vars[2]);

    let cube = bdd.cube(&bits(&[0, 2], 3), &bits(&[0], 3));
    let not_x2 = bdd.not(x2);
    let expected = bdd.and(x0, not_x2);
    assert_eq!(cube, expected);

    assert_eq!(bdd.cube(&bits(&[], 3), &bits(&[], 3)), TRUE_NODE);
    let single = bdd.cube(&bits(&[1], 3), &bits(&[1], 3));
    assert_eq!(single, x1);
}

#[test]
fn truth_table_roundtrip_produces_identical_indices() {
    // Build a function from its truth table top-down (ITE over variables)
    // and bottom-up (OR of minterm cubes); canonicity forces one index.
    let (mut bdd, vars) = engine_with_vars(3);
    let truth_table: [bool; 8] = [false, true, true, false, true, false, false, true];

    // Bottom-up: OR together one cube per true row.
    let all = bits(&[0, 1, 2], 3);
    let mut bottom_up = FALSE_NODE;
    for (row, &value) in truth_table.iter().enumerate() {
        if !value {
            continue;
        }
        let values = bits(
            &(0..3).filter(|&v| row & (1 << v) != 0).collect::<Vec<_>>(),
            3,
        );
        let minterm = bdd.cube(&all, &values);
        bdd.reference(minterm);
        let union = bdd.or(bottom_up, minterm);
        bottom_up = bdd.consume(union, bottom_up, minterm);
    }

    // Top-down: Shannon expansion on variable 0, selecting rows by bit.
    fn from_rows(bdd: &mut Bdd, vars: &[NodeId], rows: &[bool], var: usize, row: usize) -> NodeId {
        if var == vars.len() {
            return if rows[row] { TRUE_NODE } else { FALSE_NODE };
        }
        let low = from_rows(bdd, vars, rows, var + 1, row);
        let high = from_rows(bdd, vars, rows, var + 1, row | (1 << var));
        bdd.if_then_else(vars[var], high, low)
    }
    let top_down = from_rows(&mut bdd, &vars, &truth_table, 0, 0);

    assert_eq!(bottom_up, top_down);
    bdd.dereference(bottom_up);
    bdd.check_invariants();
}

#[test]
fn garbage_collection_frees_unreferenced_results() {
    let (mut bdd, vars) = engine_with_vars(4);
    let (x, y) = (vars[0], vars[1]);
    let keep = bdd.and(x, y);
    bdd.reference(keep);
    let drop_me = bdd.xor(vars[2], vars[3]);

    let before = bdd.active_node_count();
    let freed = bdd.collect_garbage();
    assert!(freed > 0);
    assert!(bdd.active_node_count() < before);
    assert!(bdd.is_valid(keep));
    assert!(!bdd.is_valid(drop_me));
    bdd.check_invariants();

    // The collected structure is rebuilt on demand.
    let rebuilt = bdd.xor(vars[2], vars[3]);
    let mut assignment = FixedBitSet::with_capacity(4);
    assignment.insert(2);
    assert!(bdd.evaluate(rebuilt, &assignment));
}

#[test]
fn operations_survive_collections_mid_recursion() {
    // A tiny table forces collections inside the apply recursion; the work
    // stack must keep every in-flight intermediate alive.
    let mut bdd = Bdd::new(
        7,
        BddConfig { min_free_node_ratio: 0.0, ..BddConfig::default() },
    );
    let vars = bdd.create_variables(8);

    let mut parity = FALSE_NODE;
    for &var in &vars {
        let next = bdd.xor(parity, var);
        parity = bdd.update_with(next, parity);
    }
    bdd.check_invariants();

    // Parity of 8 variables has 128 models.
    assert_eq!(bdd.count_satisfying_assignments(parity), 128u8.into());
    bdd.dereference(parity);
}

#[test]
fn consume_chain_keeps_the_final_result_alive() {
    let (mut bdd, vars) = engine_with_vars(6);
    let mut accumulated = bdd.reference(TRUE_NODE);
    for step in 0..200 {
        let a = vars[step % 6];
        let b = vars[(step + 1) % 6];
        let pair = bdd.or(a, b);
        bdd.reference(pair);
        let next = bdd.and(accumulated, pair);
        accumulated = bdd.consume(next, accumulated, pair);
    }
    bdd.collect_garbage();
    assert!(bdd.is_valid(accumulated));
    bdd.check_invariants();

    // accumulated = AND over all (v_i OR v_i+1) pairs; the all-ones
    // assignment satisfies it.
    let mut all = FixedBitSet::with_capacity(6);
    for var in 0..6 {
        all.insert(var);
    }
    assert!(bdd.evaluate(accumulated, &all));
}

#[test]
fn variable_creation_preserves_existing_counts() {
    let (mut bdd, vars) = engine_with_vars(2);
    let f = bdd.and(vars[0], vars[1]);
    assert_eq!(bdd.count_satisfying_assignments(f), 1u8.into());

    // A new variable doubles every count.
    bdd.create_variable();
    assert_eq!(bdd.count_satisfying_assignments(f), 2u8.into());
}

#[test]
fn count_over_explicit_support() {
    let (mut bdd, vars) = engine_with_vars(4);
    let f = bdd.and(vars[0], vars[2]);

    assert_eq!(bdd.count_satisfying_assignments(f), 4u8.into());
    let support = bits(&[0, 2], 4);
    assert_eq!(bdd.count_satisfying_assignments_over(f, &support), 1u8.into());
    let support = bits(&[0, 1, 2], 4);
    assert_eq!(bdd.count_satisfying_assignments_over(f, &support), 2u8.into());
}

#[test]
#[should_panic(expected = "missing variable")]
fn count_over_rejects_a_support_that_misses_the_cone() {
    let (mut bdd, vars) = engine_with_vars(2);
    let f = bdd.and(vars[0], vars[1]);
    bdd.count_satisfying_assignments_over(f, &bits(&[0], 2));
}

#[test]
fn counts_of_terminals() {
    let (mut bdd, _) = engine_with_vars(10);
    assert_eq!(bdd.count_satisfying_assignments(FALSE_NODE), 0u32.into());
    assert_eq!(bdd.count_satisfying_assignments(TRUE_NODE), 1024u32.into());
}

#[test]
fn exactly_three_of_twenty() {
    let mut bdd = Bdd::with_capacity(1 << 12);
    let vars = bdd.create_variables(20);

    // DP over prefixes: states track "exactly j ones so far".
    let mut states = vec![TRUE_NODE, FALSE_NODE, FALSE_NODE, FALSE_NODE];
    for state in &states {
        bdd.reference(*state);
    }
    for &var in &vars {
        let mut next_states = Vec::with_capacity(4);
        for j in 0..4 {
            let carried = if j == 0 { FALSE_NODE } else { states[j - 1] };
            let next = bdd.if_then_else(var, carried, states[j]);
            next_states.push(bdd.reference(next));
        }
        for state in states {
            bdd.dereference(state);
        }
        states = next_states;
    }

    // C(20, 3) = 1140
    assert_eq!(bdd.count_satisfying_assignments(states[3]), 1140u32.into());
    bdd.check_invariants();
}
