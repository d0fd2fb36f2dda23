//! Module traits shared by every layer.
//!
//! [`Module`] covers plain tensor-to-tensor layers (linear projections,
//! activations). [`GraphModule`] covers layers that also need the graph
//! structure: the convolutions, the recurrent cell and the temporal model.

use crate::error::Result;
use crate::nn::gnn::Graph;
use crate::tensor::Tensor;

/// A layer mapping one tensor to another.
pub trait Module {
    /// Forward pass.
    fn forward(&self, input: &Tensor) -> Tensor;

    /// Learnable parameters, in a stable order.
    fn parameters(&self) -> Vec<&Tensor> {
        Vec::new()
    }

    /// Mutable access to the learnable parameters, same order as
    /// [`Module::parameters`].
    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        Vec::new()
    }

    /// Recompute derived caches after parameters were modified in place.
    fn refresh_caches(&mut self) {}

    /// Total number of learnable scalars.
    fn num_parameters(&self) -> usize {
        self.parameters().iter().map(|p| p.numel()).sum()
    }
}

/// A layer operating on node features together with the graph structure.
///
/// Unlike [`Module`], the forward pass validates its inputs and can fail.
pub trait GraphModule {
    /// Forward pass with graph structure.
    ///
    /// # Arguments
    ///
    /// * `x` - Node features
    /// * `graph` - Edge list and weights
    ///
    /// # Errors
    ///
    /// Returns a shape or edge-index error when `x` or `graph` disagree with
    /// the layer's configuration.
    fn forward_graph(&self, x: &Tensor, graph: &Graph) -> Result<Tensor>;

    /// Learnable parameters, in a stable order.
    fn parameters(&self) -> Vec<&Tensor>;

    /// Mutable access to the learnable parameters.
    fn parameters_mut(&mut self) -> Vec<&mut Tensor>;

    /// Recompute derived caches after parameters were modified in place.
    fn refresh_caches(&mut self) {}

    /// Total number of learnable scalars.
    fn num_parameters(&self) -> usize {
        self.parameters().iter().map(|p| p.numel()).sum()
    }
}
