//! Forward operations on tensors.
//!
//! Shape agreement between operands is an internal invariant of the model
//! code (boundaries validate user input first), so violations panic.

use super::Tensor;

// ============================================================================
// Element-wise Operations
// ============================================================================

impl Tensor {
    /// Apply `f` to every element.
    #[must_use]
    pub fn map(&self, f: impl Fn(f32) -> f32) -> Tensor {
        let data: Vec<f32> = self.data().iter().map(|&v| f(v)).collect();
        Tensor::from_vec(data, self.shape())
    }

    /// Combine two same-shaped tensors element by element.
    fn zip_with(&self, other: &Tensor, op: &str, f: impl Fn(f32, f32) -> f32) -> Tensor {
        assert_eq!(
            self.shape(),
            other.shape(),
            "{op} shape mismatch: {:?} vs {:?}",
            self.shape(),
            other.shape()
        );
        let data: Vec<f32> = self
            .data()
            .iter()
            .zip(other.data().iter())
            .map(|(&a, &b)| f(a, b))
            .collect();
        Tensor::from_vec(data, self.shape())
    }

    /// Element-wise addition: z = self + other
    #[must_use]
    pub fn add(&self, other: &Tensor) -> Tensor {
        self.zip_with(other, "add", |a, b| a + b)
    }

    /// Element-wise (Hadamard) product: z = self ⊙ other
    #[must_use]
    pub fn mul(&self, other: &Tensor) -> Tensor {
        self.zip_with(other, "mul", |a, b| a * b)
    }

    /// Scalar multiplication: z = self * scalar
    #[must_use]
    pub fn mul_scalar(&self, scalar: f32) -> Tensor {
        self.map(|v| v * scalar)
    }

    /// Complement: z = 1 - self
    #[must_use]
    pub fn one_minus(&self) -> Tensor {
        self.map(|v| 1.0 - v)
    }

    /// Sum of all elements.
    #[must_use]
    pub fn sum(&self) -> f32 {
        self.data().iter().sum()
    }

    // ========================================================================
    // Activations
    // ========================================================================

    /// Logistic sigmoid: σ(x) = 1 / (1 + exp(-x))
    #[must_use]
    pub fn sigmoid(&self) -> Tensor {
        self.map(|v| 1.0 / (1.0 + (-v).exp()))
    }

    /// Hyperbolic tangent.
    #[must_use]
    pub fn tanh(&self) -> Tensor {
        self.map(f32::tanh)
    }

    /// ReLU(x) = max(0, x)
    #[must_use]
    pub fn relu(&self) -> Tensor {
        self.map(|v| v.max(0.0))
    }

    /// LeakyReLU(x) = x if x > 0 else `negative_slope` * x
    #[must_use]
    pub fn leaky_relu(&self, negative_slope: f32) -> Tensor {
        self.map(|v| if v > 0.0 { v } else { negative_slope * v })
    }

    // ========================================================================
    // Linear algebra
    // ========================================================================

    /// Matrix multiplication: `[m, k] @ [k, n] -> [m, n]`.
    #[must_use]
    pub fn matmul(&self, other: &Tensor) -> Tensor {
        assert_eq!(self.ndim(), 2, "matmul requires 2D tensors");
        assert_eq!(other.ndim(), 2, "matmul requires 2D tensors");

        let (m, k1) = (self.shape()[0], self.shape()[1]);
        let (k2, n) = (other.shape()[0], other.shape()[1]);
        assert_eq!(k1, k2, "matmul dimension mismatch: {k1} vs {k2}");

        let a = self.data();
        let b = other.data();
        let mut data = vec![0.0f32; m * n];

        // i-k-j ordering keeps the inner loop on contiguous rows of `b`
        for i in 0..m {
            let row = &mut data[i * n..(i + 1) * n];
            for k in 0..k1 {
                let a_ik = a[i * k1 + k];
                if a_ik == 0.0 {
                    continue;
                }
                for (out, &b_kj) in row.iter_mut().zip(&b[k * n..(k + 1) * n]) {
                    *out += a_ik * b_kj;
                }
            }
        }

        Tensor::from_vec(data, &[m, n])
    }

    /// Transpose a 2D tensor.
    #[must_use]
    pub fn transpose(&self) -> Tensor {
        assert_eq!(self.ndim(), 2, "transpose requires 2D tensor");

        let (rows, cols) = (self.shape()[0], self.shape()[1]);
        let mut data = vec![0.0; rows * cols];

        for i in 0..rows {
            for j in 0..cols {
                data[j * rows + i] = self.data()[i * cols + j];
            }
        }

        Tensor::from_vec(data, &[cols, rows])
    }

    /// Broadcast addition of a row vector: `[N, M] + [M] -> [N, M]`.
    #[must_use]
    pub fn broadcast_add(&self, other: &Tensor) -> Tensor {
        assert_eq!(self.ndim(), 2, "broadcast_add requires 2D matrix");
        assert_eq!(other.ndim(), 1, "broadcast_add requires 1D vector");
        let cols = self.shape()[1];
        assert_eq!(
            other.shape()[0],
            cols,
            "broadcast_add width mismatch: {} vs {}",
            other.shape()[0],
            cols
        );

        let mut data = self.data().to_vec();
        for row in data.chunks_mut(cols.max(1)) {
            for (v, &b) in row.iter_mut().zip(other.data()) {
                *v += b;
            }
        }
        Tensor::from_vec(data, self.shape())
    }

    /// Reinterpret the data with a new shape of equal element count.
    #[must_use]
    pub fn view(&self, new_shape: &[usize]) -> Tensor {
        Tensor::new(self.data(), new_shape)
    }

    // ========================================================================
    // Structural
    // ========================================================================

    /// Concatenate 2D tensors along the feature (last) axis.
    ///
    /// All parts must share the same row count.
    #[must_use]
    pub fn cat_features(parts: &[&Tensor]) -> Tensor {
        assert!(!parts.is_empty(), "cat_features requires at least one tensor");
        let rows = parts[0].shape()[0];
        for p in parts {
            assert_eq!(p.ndim(), 2, "cat_features requires 2D tensors");
            assert_eq!(
                p.shape()[0],
                rows,
                "cat_features row mismatch: {} vs {}",
                p.shape()[0],
                rows
            );
        }

        let width: usize = parts.iter().map(|p| p.shape()[1]).sum();
        let mut data = Vec::with_capacity(rows * width);
        for r in 0..rows {
            for p in parts {
                let cols = p.shape()[1];
                data.extend_from_slice(&p.data()[r * cols..(r + 1) * cols]);
            }
        }

        Tensor::from_vec(data, &[rows, width])
    }

    /// Extract time step `t` of a sequence: `[N, F, T] -> [N, F]`.
    #[must_use]
    pub fn select_time(&self, t: usize) -> Tensor {
        assert_eq!(self.ndim(), 3, "select_time requires a [N, F, T] tensor");
        let (rows, cols, steps) = (self.shape()[0], self.shape()[1], self.shape()[2]);
        assert!(t < steps, "time step {t} out of range for {steps} steps");

        let data: Vec<f32> = (0..rows * cols).map(|i| self.data()[i * steps + t]).collect();
        Tensor::from_vec(data, &[rows, cols])
    }
}
