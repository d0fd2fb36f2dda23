//! Weight initialization functions.
//!
//! - Xavier/Glorot (Glorot & Bengio, 2010): suited to the sigmoid and tanh
//!   gates of the recurrent cell.
//!
//! Every initializer takes an optional seed; `Some(seed)` gives bit-identical
//! parameters across runs, `None` draws from OS entropy.
//!
//! # References
//!
//! - Glorot, X., & Bengio, Y. (2010). Understanding the difficulty of training
//!   deep feedforward neural networks. AISTATS.

use crate::tensor::Tensor;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Xavier uniform initialization (Glorot & Bengio, 2010).
///
/// Samples from U(-a, a) where a = sqrt(6 / (`fan_in` + `fan_out`)).
///
/// # Example
///
/// ```
/// use tgcn::nn::xavier_uniform;
///
/// let weight = xavier_uniform(&[4, 8], 8, 4, Some(42));
/// assert_eq!(weight.shape(), &[4, 8]);
/// ```
#[must_use]
pub fn xavier_uniform(shape: &[usize], fan_in: usize, fan_out: usize, seed: Option<u64>) -> Tensor {
    let a = (6.0 / (fan_in + fan_out).max(1) as f32).sqrt();
    uniform(shape, -a, a, seed)
}

/// Uniform distribution initialization.
///
/// Samples from U(low, high).
pub(crate) fn uniform(shape: &[usize], low: f32, high: f32, seed: Option<u64>) -> Tensor {
    let numel: usize = shape.iter().product();
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    let data: Vec<f32> = (0..numel).map(|_| rng.gen_range(low..high)).collect();

    Tensor::from_vec(data, shape)
}

/// Zeros initialization.
pub(crate) fn zeros(shape: &[usize]) -> Tensor {
    Tensor::zeros(shape)
}

/// Derive the seed of a sub-module from its parent's seed.
///
/// Keeps sibling parameters decorrelated while the whole model stays
/// reproducible from one seed.
pub(crate) fn derive_seed(seed: Option<u64>, index: u64) -> Option<u64> {
    seed.map(|s| {
        s.wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(index.wrapping_mul(1_442_695_040_888_963_407).wrapping_add(1))
    })
}
