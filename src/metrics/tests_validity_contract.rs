// =========================================================================
// FALSIFY-CV: cluster-validity contract (incidence, similarity, WSS/BSS)
//
// Each test tries to break one invariant of the validity metrics on a
// small hand-built dataset.
// =========================================================================

use super::*;

fn dataset() -> Matrix<f64> {
    Matrix::from_rows(&[
        vec![0.0, 1.0],
        vec![0.5, 0.2],
        vec![4.0, 4.0],
        vec![4.5, 3.0],
        vec![9.0, 0.0],
        vec![8.0, 1.0],
        vec![0.0, 1.0],
    ])
    .expect("rows have equal length")
}

const LABELS: [usize; 7] = [0, 0, 1, 1, 2, 2, 0];

/// FALSIFY-CV-001: incidence is symmetric with a unit diagonal
#[test]
fn falsify_cv_001_incidence_symmetric_unit_diagonal() {
    let inc = incidence_mat(&LABELS);
    assert!(inc.is_symmetric(0.0), "FALSIFIED CV-001: incidence not symmetric");
    for i in 0..LABELS.len() {
        assert_eq!(
            inc.get(i, i),
            1.0,
            "FALSIFIED CV-001: diagonal entry {i} is not 1"
        );
    }
}

/// FALSIFY-CV-002: incidence(i, j) = 1 iff labels[i] == labels[j]
#[test]
fn falsify_cv_002_incidence_iff_same_label() {
    let inc = incidence_mat(&LABELS);
    for i in 0..LABELS.len() {
        for j in 0..LABELS.len() {
            let expected = if LABELS[i] == LABELS[j] { 1.0 } else { 0.0 };
            assert_eq!(
                inc.get(i, j),
                expected,
                "FALSIFIED CV-002: incidence({i},{j})={}, expected {expected}",
                inc.get(i, j)
            );
        }
    }
}

/// FALSIFY-CV-003: similarity lies in [0, 1], 1 for zero distance, 0 for the max pair
#[test]
fn falsify_cv_003_similarity_bounds() {
    let x = dataset();
    let sim = similarity_mat(&x, DistanceMetric::Euclidean);
    assert!(
        sim.as_slice().iter().all(|&s| (0.0..=1.0).contains(&s)),
        "FALSIFIED CV-003: similarity outside [0, 1]"
    );
    // Rows 0 and 6 are the same point.
    assert_eq!(sim.get(0, 6), 1.0, "FALSIFIED CV-003: duplicate pair not 1");

    let dist = pairwise_distances(&x, DistanceMetric::Euclidean);
    let max = dist.max().expect("non-empty");
    let (mut far_i, mut far_j) = (0, 0);
    for i in 0..x.n_rows() {
        for j in 0..x.n_rows() {
            if dist.get(i, j) == max {
                far_i = i;
                far_j = j;
            }
        }
    }
    assert_eq!(
        sim.get(far_i, far_j),
        0.0,
        "FALSIFIED CV-003: farthest pair ({far_i},{far_j}) not 0"
    );
}

/// FALSIFY-CV-004: wss + bss equals the total squared pairwise distance
#[test]
fn falsify_cv_004_wss_plus_bss_is_total() {
    let x = dataset();
    for metric in [
        DistanceMetric::Euclidean,
        DistanceMetric::Manhattan,
        DistanceMetric::Chebyshev,
        DistanceMetric::Cosine,
    ] {
        let within = wss(&x, &LABELS, metric).expect("labels match samples");
        let between = bss(&x, &LABELS, metric).expect("labels match samples");
        let total: f64 = pdist(&x, metric).iter().map(|d| d * d).sum();
        assert!(
            (within + between - total).abs() < 1e-9 * total.max(1.0),
            "FALSIFIED CV-004 ({metric}): wss+bss={}, total={total}",
            within + between
        );
    }
}

/// FALSIFY-CV-005: correlation is invariant to a consistent permutation
#[test]
fn falsify_cv_005_correlation_permutation_invariant() {
    let x = dataset();
    let perm = [4, 0, 6, 2, 5, 1, 3];
    let rows: Vec<Vec<f64>> = perm.iter().map(|&p| x.row(p).to_vec()).collect();
    let x_perm = Matrix::from_rows(&rows).expect("rows have equal length");
    let labels_perm: Vec<usize> = perm.iter().map(|&p| LABELS[p]).collect();

    let original = correlation(&x, &LABELS, DistanceMetric::Euclidean).expect("valid input");
    let permuted =
        correlation(&x_perm, &labels_perm, DistanceMetric::Euclidean).expect("valid input");
    assert!(
        (original - permuted).abs() < 1e-12,
        "FALSIFIED CV-005: {original} != {permuted}"
    );
}

/// FALSIFY-CV-006: correlation is deterministic and stays in [0, 1]
#[test]
fn falsify_cv_006_correlation_bounded_deterministic() {
    let x = dataset();
    let a = correlation(&x, &LABELS, DistanceMetric::Manhattan).expect("valid input");
    let b = correlation(&x, &LABELS, DistanceMetric::Manhattan).expect("valid input");
    assert_eq!(a.to_bits(), b.to_bits(), "FALSIFIED CV-006: not deterministic");
    assert!(
        (0.0..=1.0 + 1e-12).contains(&a),
        "FALSIFIED CV-006: correlation={a}"
    );
}

/// FALSIFY-CV-007: worked example X=[[0],[0],[10],[10]]
#[test]
fn falsify_cv_007_worked_example() {
    let x = Matrix::from_rows(&[vec![0.0], vec![0.0], vec![10.0], vec![10.0]])
        .expect("rows have equal length");
    let labels = [0, 0, 1, 1];
    let within = wss(&x, &labels, DistanceMetric::Euclidean).expect("valid input");
    let between = bss(&x, &labels, DistanceMetric::Euclidean).expect("valid input");
    assert_eq!(within, 0.0, "FALSIFIED CV-007: wss={within}");
    assert!(
        (between - 400.0).abs() < 1e-9,
        "FALSIFIED CV-007: bss={between}, expected 400"
    );
}
