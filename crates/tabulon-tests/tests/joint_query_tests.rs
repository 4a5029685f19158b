//! Joint-query tests: correlations, normalization, and the ordering
//! contract between requested variables and result tuple positions.

use std::sync::Arc;

use tabulon_core::{
    InferenceError, JointDistribution, JointEngine, Outcome, QueryTarget, Solution, VariableId,
    WeightTable,
};

fn assert_close(actual: f64, expected: f64, tol: f64, label: &str) {
    assert!(
        (actual - expected).abs() <= tol,
        "{} mismatch: expected {:.15}, got {:.15}, diff={:.3e}",
        label,
        expected,
        actual,
        (actual - expected).abs()
    );
}

fn binary_target(name: &str, id: u32) -> QueryTarget<u32> {
    QueryTarget::new(name, VariableId(id), vec![Outcome::Value(0), Outcome::Value(1)]).unwrap()
}

/// Reads a joint result back into named assignments via the ordering list.
fn named_assignments(result: &JointDistribution<u32>) -> Vec<(Vec<(String, u32)>, f64)> {
    result
        .entries()
        .iter()
        .map(|(probability, tuple)| {
            let mut assignment: Vec<(String, u32)> = result
                .ordering()
                .iter()
                .map(|column| {
                    let value = match &tuple[column.position] {
                        Outcome::Value(v) => *v,
                        Outcome::Unresolved => panic!("unexpected unresolved member"),
                    };
                    (column.name.to_string(), value)
                })
                .collect();
            assignment.sort();
            (assignment, *probability)
        })
        .collect()
}

#[test]
fn joint_over_one_factor_matches_the_normalized_table() {
    let a = binary_target("a", 1);
    let b = binary_target("b", 2);
    let factor = WeightTable::from_weights(
        vec![a.variable(), b.variable()],
        vec![1.0, 3.0, 2.0, 4.0],
    )
    .unwrap();
    let engine = JointEngine::new(Arc::new(Solution::new(vec![factor])));

    let result = engine.joint(&[&a, &b]).unwrap();
    let probabilities: Vec<f64> = result.entries().iter().map(|(p, _)| *p).collect();
    let expected = [0.1, 0.3, 0.2, 0.4];
    assert_eq!(probabilities.len(), expected.len());
    for (i, (&actual, &want)) in probabilities.iter().zip(expected.iter()).enumerate() {
        assert_close(actual, want, 1e-12, &format!("entry {i}"));
    }

    assert_eq!(result.position_of("a"), Some(0));
    assert_eq!(result.position_of("b"), Some(1));
}

#[test]
fn joint_over_multiple_factors_combines_them() {
    // f(a) = [0.5, 0.5], g(a, b) = [[0.9, 0.1], [0.2, 0.8]]
    // joint: (0,0)=0.45 (0,1)=0.05 (1,0)=0.10 (1,1)=0.40
    let a = binary_target("a", 1);
    let b = binary_target("b", 2);
    let f = WeightTable::from_weights(vec![a.variable()], vec![0.5, 0.5]).unwrap();
    let g = WeightTable::from_weights(
        vec![a.variable(), b.variable()],
        vec![0.9, 0.1, 0.2, 0.8],
    )
    .unwrap();
    let engine = JointEngine::new(Arc::new(Solution::new(vec![f, g])));

    let result = engine.joint(&[&a, &b]).unwrap();
    let probabilities: Vec<f64> = result.entries().iter().map(|(p, _)| *p).collect();
    for (actual, want) in probabilities.iter().zip([0.45, 0.05, 0.10, 0.40]) {
        assert_close(*actual, want, 1e-12, "combined joint entry");
    }
}

#[test]
fn request_order_does_not_change_the_named_assignments() {
    let a = binary_target("a", 1);
    let b = binary_target("b", 2);
    let c = binary_target("c", 3);
    let factor = WeightTable::from_weights(
        vec![a.variable(), b.variable(), c.variable()],
        vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0],
    )
    .unwrap();
    let engine = JointEngine::new(Arc::new(Solution::new(vec![factor])));

    let forward = engine.joint(&[&a, &b, &c]).unwrap();
    let permuted = engine.joint(&[&c, &a, &b]).unwrap();

    // The underlying tuples and probabilities are identical; only the
    // reconciliation list makes the positions interpretable.
    assert_eq!(named_assignments(&forward), named_assignments(&permuted));

    // The table's native ordering wins over the request order.
    let names: Vec<&str> = permuted
        .ordering()
        .iter()
        .map(|column| column.name.as_ref())
        .collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[test]
fn correlations_are_preserved_in_the_joint() {
    // Perfectly correlated pair: mass only on (0,0) and (1,1).
    let a = binary_target("a", 1);
    let b = binary_target("b", 2);
    let factor = WeightTable::from_weights(
        vec![a.variable(), b.variable()],
        vec![0.5, 0.0, 0.0, 0.5],
    )
    .unwrap();
    let engine = JointEngine::new(Arc::new(Solution::new(vec![factor])));

    let result = engine.joint(&[&a, &b]).unwrap();
    // Zero-probability combinations are still enumerated.
    assert_eq!(result.entries().len(), 4);

    let assignments = named_assignments(&result);
    for (assignment, probability) in assignments {
        let equal = assignment[0].1 == assignment[1].1;
        let expected = if equal { 0.5 } else { 0.0 };
        assert_close(probability, expected, 1e-12, "correlated entry");
    }
}

#[test]
fn duplicate_requested_variable_is_rejected() {
    let a = binary_target("a", 1);
    let factor = WeightTable::from_weights(vec![a.variable()], vec![1.0, 2.0]).unwrap();
    let engine = JointEngine::new(Arc::new(Solution::new(vec![factor])));

    let err = engine.joint(&[&a, &a]).unwrap_err();
    assert!(matches!(err, InferenceError::Validation(_)), "{err}");
}

#[test]
fn variable_missing_from_the_factor_set_is_rejected() {
    let a = binary_target("a", 1);
    let c = binary_target("c", 3);
    let factor = WeightTable::from_weights(vec![a.variable()], vec![1.0, 2.0]).unwrap();
    let engine = JointEngine::new(Arc::new(Solution::new(vec![factor])));

    let err = engine.joint(&[&a, &c]).unwrap_err();
    assert!(matches!(err, InferenceError::UnknownTarget(_)), "{err}");
}

#[test]
fn zero_mass_joint_is_fatal() {
    let a = binary_target("a", 1);
    let factor = WeightTable::from_weights(vec![a.variable()], vec![0.0, 0.0]).unwrap();
    let engine = JointEngine::new(Arc::new(Solution::new(vec![factor])));

    let err = engine.joint(&[&a]).unwrap_err();
    assert!(matches!(err, InferenceError::ZeroMass(_)), "{err}");
}

#[test]
fn joint_probabilities_sum_to_one() {
    let a = binary_target("a", 1);
    let b = binary_target("b", 2);
    let factor = WeightTable::from_weights(
        vec![a.variable(), b.variable()],
        vec![1.0, 3.0, 2.0, 4.0],
    )
    .unwrap();
    let engine = JointEngine::new(Arc::new(Solution::new(vec![factor])));

    let result = engine.joint(&[&b, &a]).unwrap();
    let total: f64 = result.entries().iter().map(|(p, _)| p).sum();
    assert_close(total, 1.0, 1e-9, "joint probability total");
}
