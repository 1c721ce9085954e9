pub(crate) use super::*;

#[test]
fn test_from_vec() {
    let m = Matrix::from_vec(2, 3, vec![1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0])
        .expect("test data has correct dimensions: 2*3=6 elements");
    assert_eq!(m.shape(), (2, 3));
    assert!((m.get(0, 0) - 1.0).abs() < 1e-12);
    assert!((m.get(1, 2) - 6.0).abs() < 1e-12);
}

#[test]
fn test_from_vec_error() {
    let result = Matrix::from_vec(2, 3, vec![1.0_f64, 2.0, 3.0]);
    assert!(result.is_err());
}

#[test]
fn test_zeros() {
    let m = Matrix::zeros(2, 3);
    assert_eq!(m.shape(), (2, 3));
    assert!(m.as_slice().iter().all(|&x| x == 0.0));
}

#[test]
fn test_set_and_row() {
    let mut m = Matrix::zeros(2, 2);
    m.set(1, 0, 3.5);
    assert_eq!(m.row(0), &[0.0, 0.0]);
    assert_eq!(m.row(1), &[3.5, 0.0]);
}

#[test]
fn test_from_rows() {
    let m = Matrix::from_rows(&[vec![0.0], vec![10.0], vec![4.0]])
        .expect("rows have equal length");
    assert_eq!(m.shape(), (3, 1));
    assert!((m.get(2, 0) - 4.0).abs() < 1e-12);
}

#[test]
fn test_from_rows_ragged() {
    assert!(Matrix::from_rows(&[vec![0.0, 1.0], vec![2.0]]).is_err());
}

#[test]
fn test_from_rows_empty() {
    let m = Matrix::from_rows(&[]).expect("empty input is a 0x0 matrix");
    assert_eq!(m.shape(), (0, 0));
    assert_eq!(m.max(), None);
}

#[test]
fn test_min_max() {
    let m = Matrix::from_vec(2, 2, vec![3.0, -1.0, 7.0, 2.0]).expect("2x2 data");
    assert_eq!(m.min(), Some(-1.0));
    assert_eq!(m.max(), Some(7.0));
}

#[test]
fn test_map() {
    let m = Matrix::from_vec(1, 3, vec![1.0, 2.0, 3.0]).expect("1x3 data");
    let squared = m.map(|x| x * x);
    assert_eq!(squared.as_slice(), &[1.0, 4.0, 9.0]);
}

#[test]
fn test_is_symmetric() {
    let sym = Matrix::from_vec(2, 2, vec![0.0, 2.0, 2.0, 0.0]).expect("2x2 data");
    let asym = Matrix::from_vec(2, 2, vec![0.0, 2.0, 1.0, 0.0]).expect("2x2 data");
    let rect = Matrix::zeros(2, 3);
    assert!(sym.is_symmetric(0.0));
    assert!(!asym.is_symmetric(1e-9));
    assert!(!rect.is_symmetric(1e-9));
}

#[test]
fn test_serde_round_trip_shape() {
    let m = Matrix::from_vec(2, 1, vec![1.0, 2.0]).expect("2x1 data");
    let json = serde_json::to_string(&m).expect("matrix serialises");
    let back: Matrix<f64> = serde_json::from_str(&json).expect("matrix deserialises");
    assert_eq!(back, m);
}
