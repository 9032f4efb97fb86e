//! Cross-cutting scenarios exercising the full `randomize` pipeline end to end, rather than a
//! single strategy or module in isolation.

use fnv::FnvHashMap;

use crate::domain::WeightedEntry;
use crate::predicate::MultiConstraint;
use crate::problem::MultiVarProblem;
use crate::problem::RandomizeOptions;
use crate::problem::SolverFlags;
use crate::problem::VarSpec;
use crate::value::Value;

#[test]
fn sum_constraint_rejection_solvable() {
    let mut problem = MultiVarProblem::new(0);
    problem.add_var("a", VarSpec::enumerated((0..=9).collect())).unwrap();
    problem.add_var("b", VarSpec::enumerated((0..=9).collect())).unwrap();
    problem
        .add_constraint(
            Some("sum_over_5"),
            &["a", "b"],
            Box::new(|values| values[0].as_int().unwrap() + values[1].as_int().unwrap() > 5),
        )
        .unwrap();

    let assignment = problem
        .randomize(RandomizeOptions::default())
        .expect("a loose sum constraint over 0..9 must be solvable");
    let sum = assignment.get("a").unwrap().as_int().unwrap()
        + assignment.get("b").unwrap().as_int().unwrap();
    assert!(sum > 5);
}

#[test]
fn plus_one_order_dependent_succeeds_with_default_orders() {
    let mut problem = MultiVarProblem::new(1);
    problem.add_var("x", VarSpec::enumerated((0..=99).collect())).unwrap();
    problem.add_var("y", VarSpec::enumerated((0..=99).collect())).unwrap();
    problem
        .add_constraint(
            Some("plus_one"),
            &["x", "y"],
            Box::new(|values| values[1].as_int().unwrap() == values[0].as_int().unwrap() + 1),
        )
        .unwrap();

    let assignment = problem.randomize(RandomizeOptions::default()).unwrap();
    let x = assignment.get("x").unwrap().as_int().unwrap();
    let y = assignment.get("y").unwrap().as_int().unwrap();
    assert_eq!(y, x + 1);
}

#[test]
fn plus_one_with_naive_disabled_and_explicit_orders_succeeds_quickly() {
    let mut problem = MultiVarProblem::new(1);
    problem
        .add_var("x", VarSpec::enumerated((0..=99).collect()).with_order(0))
        .unwrap();
    problem
        .add_var("y", VarSpec::enumerated((0..=99).collect()).with_order(1))
        .unwrap();
    problem
        .add_constraint(
            Some("plus_one"),
            &["x", "y"],
            Box::new(|values| values[1].as_int().unwrap() == values[0].as_int().unwrap() + 1),
        )
        .unwrap();
    problem.set_solver_mode(SolverFlags {
        naive: false,
        sparse: true,
        thorough: true,
    });
    problem.set_tuning(Some(200), None).unwrap();

    let assignment = problem.randomize(RandomizeOptions::default()).unwrap();
    let x = assignment.get("x").unwrap().as_int().unwrap();
    let y = assignment.get("y").unwrap().as_int().unwrap();
    assert_eq!(y, x + 1);
}

#[test]
fn load_opcode_problem_holds_across_five_randomizations() {
    let mut problem = MultiVarProblem::new(0);
    problem.add_var("src0", VarSpec::bits(5)).unwrap();
    problem
        .add_var(
            "src0_value",
            VarSpec::function(Box::new(|_, _| Value::Int(0xffff_fbcd_u32 as i64)), vec![]),
        )
        .unwrap();
    problem.add_var("wb", VarSpec::bits(1)).unwrap();
    problem
        .add_var("dst0", VarSpec::bits(5).with_order(1))
        .unwrap();
    problem
        .add_var("imm0", VarSpec::bits(11).with_order(2))
        .unwrap();

    problem
        .add_constraint(
            Some("wb_implies_dst0_ne_src0"),
            &["wb", "dst0", "src0"],
            Box::new(|values| {
                let wb = values[0].as_int().unwrap();
                let dst0 = values[1].as_int().unwrap();
                let src0 = values[2].as_int().unwrap();
                wb == 0 || dst0 != src0
            }),
        )
        .unwrap();
    problem
        .add_constraint(
            Some("aligned_address_in_range"),
            &["src0_value", "imm0"],
            Box::new(|values| {
                let src0_value = values[0].as_int().unwrap();
                let imm0 = values[1].as_int().unwrap();
                let address = src0_value.wrapping_add(imm0);
                address & 3 == 0 && (address as u32 as u64) < 0xffff_ffff
            }),
        )
        .unwrap();

    for _ in 0..5 {
        let assignment = problem
            .randomize(RandomizeOptions::default())
            .expect("load-opcode problem must be solvable every time");

        let wb = assignment.get("wb").unwrap().as_int().unwrap();
        let dst0 = assignment.get("dst0").unwrap().as_int().unwrap();
        let src0 = assignment.get("src0").unwrap().as_int().unwrap();
        assert!(wb == 0 || dst0 != src0);

        let src0_value = assignment.get("src0_value").unwrap().as_int().unwrap();
        let imm0 = assignment.get("imm0").unwrap().as_int().unwrap();
        let address = src0_value.wrapping_add(imm0);
        assert_eq!(address & 3, 0);
        assert!((address as u32 as u64) < 0xffff_ffff);
    }
}

#[test]
fn list_unique_and_sum_constraints_are_both_honored() {
    let mut problem = MultiVarProblem::new(7);
    problem
        .add_var(
            "xs",
            VarSpec::enumerated((0..=99).collect())
                .with_length(10)
                .with_list_constraint(
                    Some("unique"),
                    Box::new(|values| {
                        let mut sorted = values.to_vec();
                        sorted.sort_unstable();
                        sorted.dedup();
                        sorted.len() == values.len()
                    }),
                )
                .with_list_constraint(
                    Some("sum_at_least_50"),
                    Box::new(|values| values.iter().sum::<i64>() >= 50),
                ),
        )
        .unwrap();

    let assignment = problem.randomize(RandomizeOptions::default()).unwrap();
    let xs = assignment.get("xs").unwrap().as_list().unwrap();
    assert_eq!(xs.len(), 10);
    let mut sorted = xs.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(sorted.len(), 10, "list elements must be unique");
    assert!(xs.iter().sum::<i64>() >= 50);
}

#[test]
fn unsolvable_problem_reports_debug_info_with_failing_predicate() {
    let mut problem = MultiVarProblem::new(0);
    problem.add_var("x", VarSpec::enumerated((0..=9).collect())).unwrap();
    problem
        .add_constraint(
            Some("impossible"),
            &["x"],
            Box::new(|values| values[0].as_int().unwrap() > 100),
        )
        .unwrap();
    problem.set_tuning(Some(200), None).unwrap();

    let options = RandomizeOptions {
        with_constraints: Vec::new(),
        with_values: FnvHashMap::default(),
        debug: true,
    };
    let err = problem
        .randomize(options)
        .expect_err("x > 100 is unsatisfiable over 0..9");
    assert!(!err.debug_info.strategies_attempted.is_empty());
    assert!(
        err.debug_info.naive.last_violating_assignment.is_some()
            || err.debug_info.thorough.refusal_reason.is_some()
            || err.debug_info.thorough.solutions_found == 0
    );
}

#[test]
fn weighted_domain_converges_to_declared_distribution() {
    let mut problem = MultiVarProblem::new(99);
    problem
        .add_var(
            "w",
            VarSpec::weighted(vec![
                WeightedEntry::value(0, 50),
                WeightedEntry::value(1, 25),
                WeightedEntry::range(2, 10, 25),
            ]),
        )
        .unwrap();

    const TRIALS: usize = 10_000;
    let mut zeros = 0usize;
    let mut ones = 0usize;
    let mut in_range = 0usize;
    for _ in 0..TRIALS {
        let assignment = problem.randomize(RandomizeOptions::default()).unwrap();
        match assignment.get("w").unwrap().as_int().unwrap() {
            0 => zeros += 1,
            1 => ones += 1,
            v if (2..10).contains(&v) => in_range += 1,
            other => panic!("value {other} outside declared weighted domain"),
        }
    }

    let freq = |count: usize| count as f64 / TRIALS as f64;
    assert!((freq(zeros) - 0.50).abs() < 0.02, "zeros frequency {}", freq(zeros));
    assert!((freq(ones) - 0.25).abs() < 0.02, "ones frequency {}", freq(ones));
    assert!((freq(in_range) - 0.25).abs() < 0.02, "in-range frequency {}", freq(in_range));
}

#[test]
fn fixed_value_is_honored_and_other_constraints_see_it() {
    let mut problem = MultiVarProblem::new(4);
    problem.add_var("a", VarSpec::enumerated((0..=9).collect())).unwrap();
    problem.add_var("b", VarSpec::enumerated((0..=9).collect())).unwrap();
    problem
        .add_constraint(
            Some("sum_over_5"),
            &["a", "b"],
            Box::new(|values| values[0].as_int().unwrap() + values[1].as_int().unwrap() > 5),
        )
        .unwrap();

    let mut with_values = FnvHashMap::default();
    with_values.insert("a".to_string(), Value::Int(1));
    let options = RandomizeOptions {
        with_constraints: Vec::new(),
        with_values,
        debug: false,
    };
    let assignment = problem.randomize(options).unwrap();
    assert_eq!(assignment.get("a").unwrap().as_int().unwrap(), 1);
    let b = assignment.get("b").unwrap().as_int().unwrap();
    assert!(1 + b > 5);
}

#[test]
fn temporary_constraint_does_not_persist_across_calls() {
    let mut problem = MultiVarProblem::new(5);
    problem.add_var("a", VarSpec::enumerated((0..=9).collect())).unwrap();

    let extra = MultiConstraint {
        name: Some("a_is_zero".to_string()),
        variables: vec!["a".to_string()],
        predicate: Box::new(|values| values[0].as_int().unwrap() == 0),
    };
    let options = RandomizeOptions {
        with_constraints: vec![extra],
        with_values: FnvHashMap::default(),
        debug: false,
    };
    let assignment = problem.randomize(options).unwrap();
    assert_eq!(assignment.get("a").unwrap().as_int().unwrap(), 0);

    let mut saw_nonzero = false;
    for _ in 0..50 {
        let assignment = problem.randomize(RandomizeOptions::default()).unwrap();
        if assignment.get("a").unwrap().as_int().unwrap() != 0 {
            saw_nonzero = true;
            break;
        }
    }
    assert!(
        saw_nonzero,
        "a temporary constraint from a previous call must not persist into later calls"
    );
}

#[test]
fn identically_seeded_instances_are_repeatable() {
    fn run(seed: u64) -> Vec<i64> {
        let mut problem = MultiVarProblem::new(seed);
        problem.add_var("a", VarSpec::bits(6)).unwrap();
        problem.add_var("b", VarSpec::bits(6)).unwrap();
        problem
            .add_constraint(
                Some("a_lt_b"),
                &["a", "b"],
                Box::new(|values| values[0].as_int().unwrap() < values[1].as_int().unwrap()),
            )
            .unwrap();

        (0..5)
            .map(|_| {
                let assignment = problem.randomize(RandomizeOptions::default()).unwrap();
                let a = assignment.get("a").unwrap().as_int().unwrap();
                let b = assignment.get("b").unwrap().as_int().unwrap();
                a * 1000 + b
            })
            .collect()
    }

    assert_eq!(run(2024), run(2024));
}
