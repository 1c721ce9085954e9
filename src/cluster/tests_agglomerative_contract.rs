// =========================================================================
// FALSIFY-HC: Agglomerative (hierarchical) clustering contract
//
// References:
//   - Ward (1963) "Hierarchical grouping to optimize an objective function"
//   - Müllner (2011) "Modern hierarchical, agglomerative clustering algorithms"
// =========================================================================

use super::*;
use crate::primitives::Matrix;
use crate::traits::UnsupervisedEstimator;

fn six_points() -> Matrix<f64> {
    Matrix::from_vec(
        6,
        2,
        vec![
            0.0, 0.0, 0.1, 0.1, 0.2, 0.0, 10.0, 10.0, 10.1, 10.1, 10.0, 10.2,
        ],
    )
    .expect("valid matrix")
}

/// FALSIFY-HC-001: Labels length matches sample count
#[test]
fn falsify_hc_001_labels_length() {
    let mut hc = AgglomerativeClustering::new(2, Linkage::Average);
    hc.fit(&six_points()).expect("fit succeeds");

    let labels = hc.labels();
    assert_eq!(
        labels.len(),
        6,
        "FALSIFIED HC-001: labels len={}, expected 6",
        labels.len()
    );
}

/// FALSIFY-HC-002: Labels are exactly the dense range 0..n_clusters
#[test]
fn falsify_hc_002_n_clusters_correct() {
    for n_clusters in 1..=6 {
        let mut hc = AgglomerativeClustering::new(n_clusters, Linkage::Ward);
        hc.fit(&six_points()).expect("fit succeeds");

        let mut unique: Vec<usize> = hc.labels().to_vec();
        unique.sort_unstable();
        unique.dedup();

        assert_eq!(
            unique,
            (0..n_clusters).collect::<Vec<_>>(),
            "FALSIFIED HC-002: labels not dense for n_clusters={n_clusters}"
        );
    }
}

/// FALSIFY-HC-003: Two well-separated clusters get distinct labels
#[test]
fn falsify_hc_003_distinct_clusters() {
    let data = Matrix::from_vec(
        6,
        2,
        vec![
            0.0, 0.0, 0.1, 0.0, 0.0, 0.1, 100.0, 100.0, 100.1, 100.0, 100.0, 100.1,
        ],
    )
    .expect("valid matrix");

    let mut hc = AgglomerativeClustering::new(2, Linkage::Single);
    hc.fit(&data).expect("fit succeeds");

    let labels = hc.labels();
    assert_eq!(
        labels[0], labels[1],
        "FALSIFIED HC-003: cluster A inconsistent"
    );
    assert_eq!(
        labels[1], labels[2],
        "FALSIFIED HC-003: cluster A inconsistent"
    );
    assert_ne!(
        labels[0], labels[3],
        "FALSIFIED HC-003: clusters have same label={}",
        labels[0]
    );
}

/// FALSIFY-HC-004: The merge tree is complete and references earlier nodes only
#[test]
fn falsify_hc_004_full_tree() {
    let mut hc = AgglomerativeClustering::new(3, Linkage::Complete);
    hc.fit(&six_points()).expect("fit succeeds");

    let children = hc.children();
    assert_eq!(children.len(), 5, "FALSIFIED HC-004: expected n-1 merges");
    for (step, pair) in children.iter().enumerate() {
        for &child in pair {
            assert!(
                child < 6 + step,
                "FALSIFIED HC-004: merge {step} references future node {child}"
            );
        }
    }
}

/// FALSIFY-HC-005: Merge heights are non-decreasing for monotone linkages
#[test]
fn falsify_hc_005_monotone_heights() {
    for linkage in [
        Linkage::Single,
        Linkage::Complete,
        Linkage::Average,
        Linkage::Weighted,
        Linkage::Ward,
    ] {
        let mut hc = AgglomerativeClustering::new(2, linkage).with_compute_distances(true);
        hc.fit(&six_points()).expect("fit succeeds");
        let heights = hc.distances().expect("distances requested");
        assert!(
            heights.windows(2).all(|w| w[0] <= w[1] + 1e-12),
            "FALSIFIED HC-005: {linkage} heights not monotone: {heights:?}"
        );
    }
}
