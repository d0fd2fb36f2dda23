//! Dense `f32` tensor used for node features, hidden states and parameters.
//!
//! The tensor is forward-only: operations return fresh tensors and never
//! record a computation tape, so unrolling a recurrence over time keeps only
//! the current step's buffers alive.
//!
//! # Layout
//!
//! Data is stored row-major. A sequence of node features `[N, F, T]` keeps
//! the time axis innermost, so `x[n, f, t]` lives at `(n * F + f) * T + t`.
//! Use [`Tensor::select_time`] and [`stack_time`] to move between a sequence
//! and its per-step snapshots `[N, F]`.

mod ops;

use std::fmt;

/// A dense, row-major `f32` tensor with shape metadata.
#[derive(Clone, PartialEq)]
pub struct Tensor {
    /// Underlying data storage
    data: Vec<f32>,

    /// Shape of the tensor
    shape: Vec<usize>,
}

impl Tensor {
    /// Create a new tensor from a slice with the given shape.
    ///
    /// # Panics
    ///
    /// Panics if the data length doesn't match the product of shape dimensions.
    #[must_use]
    pub fn new(data: &[f32], shape: &[usize]) -> Self {
        Self::from_vec(data.to_vec(), shape)
    }

    /// Create a tensor taking ownership of `data`.
    ///
    /// # Panics
    ///
    /// Panics if the data length doesn't match the product of shape dimensions.
    #[must_use]
    pub fn from_vec(data: Vec<f32>, shape: &[usize]) -> Self {
        let expected_len: usize = shape.iter().product();
        assert_eq!(
            data.len(),
            expected_len,
            "Data length {} doesn't match shape {:?} (expected {})",
            data.len(),
            shape,
            expected_len
        );

        Self {
            data,
            shape: shape.to_vec(),
        }
    }

    /// Create a tensor from a 1D slice (vector).
    #[must_use]
    pub fn from_slice(data: &[f32]) -> Self {
        Self::new(data, &[data.len()])
    }

    /// Create a tensor filled with zeros.
    #[must_use]
    pub fn zeros(shape: &[usize]) -> Self {
        Self::full(shape, 0.0)
    }

    /// Create a tensor filled with ones.
    #[must_use]
    pub fn ones(shape: &[usize]) -> Self {
        Self::full(shape, 1.0)
    }

    /// Create a tensor filled with `value`.
    #[must_use]
    pub fn full(shape: &[usize], value: f32) -> Self {
        let len: usize = shape.iter().product();
        Self::from_vec(vec![value; len], shape)
    }

    /// Get the shape of the tensor.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Get the total number of elements.
    #[must_use]
    pub fn numel(&self) -> usize {
        self.data.len()
    }

    /// Get the number of dimensions.
    #[must_use]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Get a reference to the underlying data.
    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Get a mutable reference to the underlying data.
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Element at a multi-dimensional index.
    ///
    /// # Panics
    ///
    /// Panics if the index rank or any coordinate is out of range.
    #[must_use]
    pub fn get(&self, index: &[usize]) -> f32 {
        assert_eq!(
            index.len(),
            self.ndim(),
            "index rank {} doesn't match tensor rank {}",
            index.len(),
            self.ndim()
        );
        let mut offset = 0;
        for (&i, &dim) in index.iter().zip(self.shape.iter()) {
            assert!(i < dim, "index {index:?} out of range for shape {:?}", self.shape);
            offset = offset * dim + i;
        }
        self.data[offset]
    }

    /// Largest absolute element-wise difference to `other`.
    ///
    /// Returns `f32::INFINITY` when the shapes differ.
    #[must_use]
    pub fn max_abs_diff(&self, other: &Tensor) -> f32 {
        if self.shape != other.shape {
            return f32::INFINITY;
        }
        self.data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f32::max)
    }
}

/// Stack per-step snapshots `[N, F]` into a sequence `[N, F, T]`.
///
/// Returns `None` when `snapshots` is empty or the snapshots don't all share
/// the same 2D shape.
///
/// # Example
///
/// ```
/// use tgcn::tensor::{stack_time, Tensor};
///
/// let t0 = Tensor::new(&[1.0, 2.0], &[2, 1]);
/// let t1 = Tensor::new(&[3.0, 4.0], &[2, 1]);
/// let seq = stack_time(&[t0, t1]).unwrap();
/// assert_eq!(seq.shape(), &[2, 1, 2]);
/// assert_eq!(seq.data(), &[1.0, 3.0, 2.0, 4.0]);
/// ```
#[must_use]
pub fn stack_time(snapshots: &[Tensor]) -> Option<Tensor> {
    let first = snapshots.first()?;
    if first.ndim() != 2 || snapshots.iter().any(|s| s.shape() != first.shape()) {
        return None;
    }

    let (rows, cols) = (first.shape()[0], first.shape()[1]);
    let steps = snapshots.len();
    let mut data = vec![0.0f32; rows * cols * steps];

    for (t, snapshot) in snapshots.iter().enumerate() {
        for (i, &v) in snapshot.data().iter().enumerate() {
            data[i * steps + t] = v;
        }
    }

    Some(Tensor::from_vec(data, &[rows, cols, steps]))
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape)
            .field("numel", &self.numel())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
