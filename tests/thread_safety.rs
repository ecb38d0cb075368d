//! Concurrency tests for the shared engine wrapper

use fixedbitset::FixedBitSet;
use robdd::SharedBdd;
use std::thread;

#[test]
fn concurrent_reads_see_a_consistent_engine() {
    let shared = SharedBdd::default();
    let vars = shared.create_variables(4);
    let conjunction = shared.and(vars[0], vars[1]);
    shared.reference(conjunction);

    let handles: Vec<_> = (0..4)
        .map(|thread_id| {
            let worker = shared.clone();
            thread::spawn(move || {
                let mut assignment = FixedBitSet::with_capacity(4);
                assignment.insert(0);
                assignment.insert(1);
                assignment.insert(thread_id % 4);
                assert!(worker.evaluate(conjunction, &assignment));
                worker.support(conjunction).ones().collect::<Vec<_>>()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), vec![0, 1]);
    }
}

#[test]
fn concurrent_writers_share_the_unique_table() {
    let shared = SharedBdd::default();
    let vars = shared.create_variables(6);

    // Every thread builds the same function; hash consing must give every
    // one of them the same node index.
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let worker = shared.clone();
            let vars = vars.clone();
            thread::spawn(move || {
                let ab = worker.and(vars[0], vars[1]);
                worker.reference(ab);
                let cd = worker.and(vars[2], vars[3]);
                worker.reference(cd);
                let f = worker.or(ab, cd);
                worker.reference(f);
                worker.dereference(ab);
                worker.dereference(cd);
                f
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for window in results.windows(2) {
        assert_eq!(window[0], window[1]);
    }

    let f = results[0];
    assert_eq!(shared.count_satisfying_assignments(f), 28u8.into());
    shared.read(|bdd| bdd.check_invariants());
}

#[test]
fn enumeration_runs_under_the_read_lock() {
    let shared = SharedBdd::default();
    let vars = shared.create_variables(3);
    let f = shared.xor(vars[0], vars[1]);
    shared.reference(f);

    let counting = {
        let worker = shared.clone();
        thread::spawn(move || worker.solutions(f).len())
    };
    let extracting = {
        let worker = shared.clone();
        thread::spawn(move || worker.satisfying_assignment(f).unwrap())
    };

    // xor over 2 of 3 variables: 2 paths times the free variable.
    assert_eq!(counting.join().unwrap(), 4);
    let assignment = extracting.join().unwrap();
    assert!(shared.evaluate(f, &assignment));
}
