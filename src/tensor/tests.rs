use super::*;

#[test]
fn test_tensor_creation() {
    let t = Tensor::new(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
    assert_eq!(t.shape(), &[2, 2]);
    assert_eq!(t.numel(), 4);
    assert_eq!(t.ndim(), 2);
}

#[test]
fn test_tensor_from_slice() {
    let t = Tensor::from_slice(&[1.0, 2.0, 3.0]);
    assert_eq!(t.shape(), &[3]);
    assert_eq!(t.numel(), 3);
}

#[test]
fn test_tensor_zeros_ones() {
    let z = Tensor::zeros(&[2, 3]);
    assert!(z.data().iter().all(|&x| x == 0.0));

    let o = Tensor::ones(&[2, 3]);
    assert!(o.data().iter().all(|&x| x == 1.0));
}

#[test]
#[should_panic(expected = "doesn't match shape")]
fn test_new_rejects_bad_length() {
    let _ = Tensor::new(&[1.0, 2.0, 3.0], &[2, 2]);
}

#[test]
fn test_get_row_major() {
    let t = Tensor::new(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
    assert_eq!(t.get(&[0, 2]), 3.0);
    assert_eq!(t.get(&[1, 0]), 4.0);
}

// ==================== Ops ====================

#[test]
fn test_elementwise_ops() {
    let a = Tensor::new(&[1.0, 2.0], &[2]);
    let b = Tensor::new(&[3.0, 5.0], &[2]);

    assert_eq!(a.add(&b).data(), &[4.0, 7.0]);
    assert_eq!(a.mul(&b).data(), &[3.0, 10.0]);
    assert_eq!(a.mul_scalar(2.0).data(), &[2.0, 4.0]);
    assert_eq!(a.one_minus().data(), &[0.0, -1.0]);
}

#[test]
#[should_panic(expected = "add shape mismatch")]
fn test_add_shape_mismatch_panics() {
    let a = Tensor::zeros(&[2]);
    let b = Tensor::zeros(&[3]);
    let _ = a.add(&b);
}

#[test]
fn test_sigmoid_tanh() {
    let x = Tensor::new(&[0.0, 10.0, -10.0], &[3]);

    let s = x.sigmoid();
    assert!((s.data()[0] - 0.5).abs() < 1e-5);
    assert!(s.data()[1] > 0.99);
    assert!(s.data()[2] < 0.01);

    let t = x.tanh();
    assert!(t.data()[0].abs() < 1e-5);
    assert!((t.data()[1] - 1.0).abs() < 1e-5);
    assert!((t.data()[2] + 1.0).abs() < 1e-5);
}

#[test]
fn test_relu_leaky_relu() {
    let x = Tensor::new(&[-2.0, 0.0, 3.0], &[3]);
    assert_eq!(x.relu().data(), &[0.0, 0.0, 3.0]);
    assert_eq!(x.leaky_relu(0.5).data(), &[-1.0, 0.0, 3.0]);
}

#[test]
fn test_matmul() {
    // [[1, 2], [3, 4]] @ [[5, 6], [7, 8]] = [[19, 22], [43, 50]]
    let a = Tensor::new(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
    let b = Tensor::new(&[5.0, 6.0, 7.0, 8.0], &[2, 2]);
    let c = a.matmul(&b);
    assert_eq!(c.shape(), &[2, 2]);
    assert_eq!(c.data(), &[19.0, 22.0, 43.0, 50.0]);
}

#[test]
fn test_matmul_rectangular() {
    let a = Tensor::new(&[1.0, 2.0, 3.0], &[1, 3]);
    let b = Tensor::new(&[1.0, 0.0, 0.0, 1.0, 1.0, 1.0], &[3, 2]);
    let c = a.matmul(&b);
    assert_eq!(c.shape(), &[1, 2]);
    assert_eq!(c.data(), &[4.0, 5.0]);
}

#[test]
fn test_transpose() {
    let a = Tensor::new(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
    let t = a.transpose();
    assert_eq!(t.shape(), &[3, 2]);
    assert_eq!(t.data(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
}

#[test]
fn test_broadcast_add() {
    let m = Tensor::new(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
    let bias = Tensor::new(&[10.0, 20.0], &[2]);
    assert_eq!(m.broadcast_add(&bias).data(), &[11.0, 22.0, 13.0, 24.0]);
}

#[test]
fn test_cat_features() {
    let a = Tensor::new(&[1.0, 2.0], &[2, 1]);
    let b = Tensor::new(&[3.0, 4.0, 5.0, 6.0], &[2, 2]);
    let c = Tensor::cat_features(&[&a, &b]);
    assert_eq!(c.shape(), &[2, 3]);
    assert_eq!(c.data(), &[1.0, 3.0, 4.0, 2.0, 5.0, 6.0]);
}

#[test]
fn test_select_time_inverts_stack_time() {
    let t0 = Tensor::new(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
    let t1 = Tensor::new(&[5.0, 6.0, 7.0, 8.0], &[2, 2]);
    let t2 = Tensor::new(&[9.0, 10.0, 11.0, 12.0], &[2, 2]);

    let seq = stack_time(&[t0.clone(), t1.clone(), t2.clone()]).expect("same shapes");
    assert_eq!(seq.shape(), &[2, 2, 3]);
    assert_eq!(seq.get(&[1, 0, 2]), 11.0);

    assert_eq!(seq.select_time(0), t0);
    assert_eq!(seq.select_time(1), t1);
    assert_eq!(seq.select_time(2), t2);
}

#[test]
fn test_stack_time_rejects_mixed_shapes() {
    let a = Tensor::zeros(&[2, 2]);
    let b = Tensor::zeros(&[2, 3]);
    assert!(stack_time(&[a, b]).is_none());
    assert!(stack_time(&[]).is_none());
}

#[test]
fn test_max_abs_diff() {
    let a = Tensor::new(&[1.0, 2.0], &[2]);
    let b = Tensor::new(&[1.5, 1.0], &[2]);
    assert!((a.max_abs_diff(&b) - 1.0).abs() < 1e-6);
    assert_eq!(a.max_abs_diff(&Tensor::zeros(&[3])), f32::INFINITY);
}
