//! Activation function modules.
//!
//! These wrap the tensor activations so they can be stored as a
//! `Box<dyn Module>`, e.g. as the output activation of [`crate::TGCN`].

use serde::{Deserialize, Serialize};

use super::module::Module;
use crate::tensor::Tensor;

/// Rectified Linear Unit activation: ReLU(x) = max(0, x)
///
/// # Example
///
/// ```
/// use tgcn::nn::{Module, ReLU};
/// use tgcn::tensor::Tensor;
///
/// let relu = ReLU::new();
/// let x = Tensor::from_slice(&[-1.0, 0.0, 1.0, 2.0]);
/// assert_eq!(relu.forward(&x).data(), &[0.0, 0.0, 1.0, 2.0]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ReLU;

impl ReLU {
    /// Create a new ReLU activation.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Module for ReLU {
    fn forward(&self, input: &Tensor) -> Tensor {
        input.relu()
    }
}

/// Leaky ReLU activation: LeakyReLU(x) = max(negative_slope * x, x)
#[derive(Debug, Clone, Copy)]
pub struct LeakyReLU {
    negative_slope: f32,
}

impl LeakyReLU {
    /// Create a new LeakyReLU with default negative slope (0.01).
    #[must_use]
    pub fn new() -> Self {
        Self {
            negative_slope: 0.01,
        }
    }

    /// Create a new LeakyReLU with specified negative slope.
    #[must_use]
    pub fn with_slope(negative_slope: f32) -> Self {
        Self { negative_slope }
    }
}

impl Default for LeakyReLU {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for LeakyReLU {
    fn forward(&self, input: &Tensor) -> Tensor {
        input.leaky_relu(self.negative_slope)
    }
}

/// Sigmoid activation: σ(x) = 1 / (1 + exp(-x))
#[derive(Debug, Clone, Copy, Default)]
pub struct Sigmoid;

impl Sigmoid {
    /// Create a new Sigmoid activation.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Module for Sigmoid {
    fn forward(&self, input: &Tensor) -> Tensor {
        input.sigmoid()
    }
}

/// Tanh activation, maps inputs to (-1, 1).
#[derive(Debug, Clone, Copy, Default)]
pub struct Tanh;

impl Tanh {
    /// Create a new Tanh activation.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Module for Tanh {
    fn forward(&self, input: &Tensor) -> Tensor {
        input.tanh()
    }
}

/// Serializable choice of output activation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputActivation {
    /// ReLU
    Relu,
    /// LeakyReLU with the given negative slope
    LeakyRelu(f32),
    /// Logistic sigmoid
    Sigmoid,
    /// Hyperbolic tangent
    Tanh,
}

impl OutputActivation {
    /// Parse from string name (`leaky_relu` uses the default slope 0.01).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "relu" => Some(OutputActivation::Relu),
            "leaky_relu" | "leakyrelu" => Some(OutputActivation::LeakyRelu(0.01)),
            "sigmoid" => Some(OutputActivation::Sigmoid),
            "tanh" => Some(OutputActivation::Tanh),
            _ => None,
        }
    }

    /// Get the name of this activation.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            OutputActivation::Relu => "relu",
            OutputActivation::LeakyRelu(_) => "leaky_relu",
            OutputActivation::Sigmoid => "sigmoid",
            OutputActivation::Tanh => "tanh",
        }
    }

    /// Build the activation module.
    #[must_use]
    pub fn build(&self) -> Box<dyn Module + Send + Sync> {
        match *self {
            OutputActivation::Relu => Box::new(ReLU::new()),
            OutputActivation::LeakyRelu(slope) => Box::new(LeakyReLU::with_slope(slope)),
            OutputActivation::Sigmoid => Box::new(Sigmoid::new()),
            OutputActivation::Tanh => Box::new(Tanh::new()),
        }
    }
}
