// =========================================================================
// FALSIFY-NL: node-leaves contract (backtracking a linkage matrix)
//
// node_leaves(i) must return exactly the samples under merge i: one index
// per sample, no duplicates, nothing outside 0..n.
// =========================================================================

use super::*;
use crate::traits::UnsupervisedEstimator;

fn row(left: usize, right: usize, distance: f64, count: usize) -> LinkageRow {
    LinkageRow {
        left,
        right,
        distance,
        count,
    }
}

fn four_leaf_trees() -> Vec<LinkageMatrix> {
    vec![
        // ((0 1) (2 3))
        LinkageMatrix::from_rows(
            vec![row(0, 1, 1.0, 2), row(2, 3, 2.0, 2), row(4, 5, 3.0, 4)],
            4,
        )
        .expect("balanced tree"),
        // (((0 1) 2) 3)
        LinkageMatrix::from_rows(
            vec![row(0, 1, 1.0, 2), row(4, 2, 2.0, 3), row(5, 3, 3.0, 4)],
            4,
        )
        .expect("chained tree"),
        // ((3 (1 2)) 0), children listed right-heavy
        LinkageMatrix::from_rows(
            vec![row(1, 2, 1.0, 2), row(3, 4, 2.0, 3), row(5, 0, 3.0, 4)],
            4,
        )
        .expect("mixed tree"),
    ]
}

/// FALSIFY-NL-001: every row yields `count` distinct sample indices
#[test]
fn falsify_nl_001_rows_yield_distinct_samples() {
    for z in four_leaf_trees() {
        for node in 0..z.n_merges() {
            let leaves = z.node_leaves(node).expect("row in range");
            let mut unique = leaves.clone();
            unique.sort_unstable();
            unique.dedup();
            assert_eq!(
                unique.len(),
                leaves.len(),
                "FALSIFIED NL-001: duplicate leaves {leaves:?} under row {node}"
            );
            assert_eq!(
                leaves.len(),
                z.rows()[node].count,
                "FALSIFIED NL-001: row {node} counts {} samples, found {leaves:?}",
                z.rows()[node].count
            );
            assert!(
                leaves.iter().all(|&l| l < 4),
                "FALSIFIED NL-001: non-sample index in {leaves:?}"
            );
        }
    }
}

/// FALSIFY-NL-002: the root covers all four samples exactly once
#[test]
fn falsify_nl_002_root_covers_all_samples() {
    for z in four_leaf_trees() {
        let mut leaves = z.node_leaves(2).expect("root row");
        leaves.sort_unstable();
        assert_eq!(leaves, vec![0, 1, 2, 3], "FALSIFIED NL-002: root leaves");
    }
}

/// FALSIFY-NL-003: leaves come out left subtree first
#[test]
fn falsify_nl_003_left_first_order() {
    let trees = four_leaf_trees();
    assert_eq!(trees[1].node_leaves(2).expect("root row"), vec![0, 1, 2, 3]);
    assert_eq!(trees[2].node_leaves(2).expect("root row"), vec![3, 1, 2, 0]);
    assert_eq!(trees[2].node_leaves(1).expect("row 1"), vec![3, 1, 2]);
}

/// FALSIFY-NL-004: deep chains resolve without losing samples
#[test]
fn falsify_nl_004_deep_chain() {
    let n = 500;
    let mut rows = vec![row(0, 1, 1.0, 2)];
    for i in 2..n {
        rows.push(row(n + i - 2, i, i as f64, i + 1));
    }
    let z = LinkageMatrix::from_rows(rows, n).expect("chain tree");
    let leaves = z.node_leaves(n - 2).expect("root row");
    assert_eq!(leaves, (0..n).collect::<Vec<_>>(), "FALSIFIED NL-004");
}

/// FALSIFY-NL-005: the two subtrees under the root match a 2-cluster cut
#[test]
fn falsify_nl_005_root_children_match_labels() {
    let x = Matrix::from_rows(&[
        vec![0.0, 0.0],
        vec![10.0, 10.0],
        vec![0.3, 0.1],
        vec![10.2, 9.9],
        vec![0.1, 0.4],
    ])
    .expect("rows have equal length");
    let mut model = AgglomerativeClustering::new(2, Linkage::Average).with_compute_distances(true);
    model.fit(&x).expect("fit succeeds");
    let z = LinkageMatrix::from_model(&model, &x).expect("valid tree");

    let root = z.rows()[z.n_merges() - 1];
    let labels = model.labels();
    for child in [root.left, root.right] {
        let members = if child < z.n_samples() {
            vec![child]
        } else {
            z.node_leaves(child - z.n_samples()).expect("row in range")
        };
        let label = labels[members[0]];
        assert!(
            members.iter().all(|&m| labels[m] == label),
            "FALSIFIED NL-005: subtree {members:?} mixes labels {labels:?}"
        );
    }
}
