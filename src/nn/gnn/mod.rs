//! Graph convolution layers used as the spatial operator of the T-GCN cell.
//!
//! ```text
//! Node Features    Graph Structure
//!      │                 │
//!      ▼                 ▼
//! ┌────────────────────────────┐
//! │   GCN / GAT stack          │
//! │  (aggregate + transform)   │
//! └────────────────────────────┘
//!            │
//!            ▼
//!    Node context [N, hidden]
//! ```
//!
//! # Layers
//!
//! - [`GCNConv`] - Graph Convolutional Network (Kipf & Welling, 2017)
//! - [`GATConv`] - Graph Attention Network (Veličković et al., 2018)
//! - [`GCN`], [`GAT`] - multi-layer stacks of the above
//! - [`GraphAggregator`] - either stack, chosen by [`Aggregation`]
//!
//! # References
//!
//! - Kipf, T. N., & Welling, M. (2017). Semi-Supervised Classification with
//!   Graph Convolutional Networks. ICLR.
//! - Veličković, P., et al. (2018). Graph Attention Networks. ICLR.

mod gat;
mod graph;
mod stack;

pub use gat::GATConv;
pub use graph::Graph;
pub use stack::{Aggregation, GraphAggregator, GAT, GCN};

use crate::error::{Result, TgcnError};
use crate::nn::init::zeros;
use crate::nn::{GraphModule, Linear, Module};
use crate::tensor::Tensor;

/// Convolution over features already checked against the graph.
///
/// Stacks validate once at their boundary and then run every layer through
/// this path.
pub(crate) trait Convolve {
    /// Apply the layer to `x` `[N, in]`, which fits `graph`.
    fn convolve(&self, x: &Tensor, graph: &Graph) -> Tensor;
}

/// Check that `x` is `[N, in_features]`, and that `graph` fits N nodes.
pub(crate) fn check_node_features(x: &Tensor, in_features: usize, graph: &Graph) -> Result<()> {
    if x.ndim() != 2 || x.shape()[1] != in_features {
        return Err(TgcnError::shape(
            "x",
            format!("[num_nodes, {in_features}]"),
            x.shape(),
        ));
    }
    graph.validate(x.shape()[0])
}

/// Graph Convolutional Network layer (Kipf & Welling, 2017).
///
/// Implements the propagation rule:
/// X' = D̂^(-1/2) Â D̂^(-1/2) X W + b
///
/// Where:
/// - Â = A + I (edge weights as entries, unit self-loops for nodes without one)
/// - D̂ = weighted in-degree of Â at each target node
/// - W = learnable weight matrix
///
/// No activation is applied; stacks apply it between layers.
///
/// # Example
/// ```
/// use tgcn::nn::gnn::{GCNConv, Graph};
/// use tgcn::nn::GraphModule;
/// use tgcn::tensor::Tensor;
///
/// let gcn = GCNConv::with_seed(8, 4, Some(1));
/// let x = Tensor::new(&vec![0.1; 3 * 8], &[3, 8]);
/// let graph = Graph::from_edge_index(&[[0, 1], [1, 2]], 3);
/// let out = gcn.forward_graph(&x, &graph).unwrap();
/// assert_eq!(out.shape(), &[3, 4]);
/// ```
#[derive(Debug, Clone)]
pub struct GCNConv {
    /// Feature transform (no bias, bias is added after propagation)
    linear: Linear,
    /// Bias vector [`out_features`]
    bias: Option<Tensor>,
    /// Whether to add self-loops automatically
    add_self_loops: bool,
    /// Whether to apply symmetric degree normalization
    normalize: bool,
}

impl GCNConv {
    /// Create a new GCN layer.
    ///
    /// # Arguments
    /// * `in_features` - Input feature dimension per node
    /// * `out_features` - Output feature dimension per node
    #[must_use]
    pub fn new(in_features: usize, out_features: usize) -> Self {
        Self::with_seed(in_features, out_features, None)
    }

    /// Create a new GCN layer with a specific random seed.
    #[must_use]
    pub fn with_seed(in_features: usize, out_features: usize, seed: Option<u64>) -> Self {
        Self {
            linear: Linear::without_bias(in_features, out_features, seed),
            bias: Some(zeros(&[out_features])),
            add_self_loops: true,
            normalize: true,
        }
    }

    /// Disable bias.
    #[must_use]
    pub fn without_bias(mut self) -> Self {
        self.bias = None;
        self
    }

    /// Disable automatic self-loop addition.
    #[must_use]
    pub fn without_self_loops(mut self) -> Self {
        self.add_self_loops = false;
        self
    }

    /// Disable normalization (plain weighted sum over incoming edges).
    #[must_use]
    pub fn without_normalize(mut self) -> Self {
        self.normalize = false;
        self
    }

    /// Get input feature dimension.
    #[must_use]
    pub fn in_features(&self) -> usize {
        self.linear.in_features()
    }

    /// Get output feature dimension.
    #[must_use]
    pub fn out_features(&self) -> usize {
        self.linear.out_features()
    }

    /// Get the feature transform.
    #[must_use]
    pub fn linear(&self) -> &Linear {
        &self.linear
    }

    /// Get mutable access to the feature transform.
    pub fn linear_mut(&mut self) -> &mut Linear {
        &mut self.linear
    }

    /// Get bias tensor.
    #[must_use]
    pub fn bias(&self) -> Option<&Tensor> {
        self.bias.as_ref()
    }

    /// Propagate already-transformed features `h` over the graph.
    fn propagate(&self, h: &Tensor, graph: &Graph, num_nodes: usize) -> Vec<f32> {
        let out_features = self.out_features();
        let h_data = h.data();

        let edges = if self.add_self_loops {
            graph.edges_with_self_loops(num_nodes)
        } else {
            graph.weighted_edges(num_nodes)
        };

        let norm_coeffs: Vec<f32> = if self.normalize {
            let mut degrees = vec![0.0f32; num_nodes];
            for &(_, tgt, w) in &edges {
                degrees[tgt] += w;
            }
            degrees
                .iter()
                .map(|&d| if d > 0.0 { 1.0 / d.sqrt() } else { 0.0 })
                .collect()
        } else {
            vec![1.0; num_nodes]
        };

        let mut output = vec![0.0f32; num_nodes * out_features];
        for &(src, tgt, w) in &edges {
            let norm = norm_coeffs[src] * w * norm_coeffs[tgt];
            if norm == 0.0 {
                continue;
            }
            let src_row = &h_data[src * out_features..(src + 1) * out_features];
            let tgt_row = &mut output[tgt * out_features..(tgt + 1) * out_features];
            for (o, &v) in tgt_row.iter_mut().zip(src_row) {
                *o += norm * v;
            }
        }
        output
    }
}

impl Convolve for GCNConv {
    fn convolve(&self, x: &Tensor, graph: &Graph) -> Tensor {
        let num_nodes = x.shape()[0];

        // Step 1: transform features, H = X W
        let h = self.linear.forward(x);

        // Step 2: message passing over Â with normalization
        let output = self.propagate(&h, graph, num_nodes);
        let output = Tensor::from_vec(output, &[num_nodes, self.out_features()]);

        // Step 3: bias
        match &self.bias {
            Some(b) => output.broadcast_add(b),
            None => output,
        }
    }
}

impl GraphModule for GCNConv {
    fn forward_graph(&self, x: &Tensor, graph: &Graph) -> Result<Tensor> {
        check_node_features(x, self.in_features(), graph)?;
        Ok(self.convolve(x, graph))
    }

    fn parameters(&self) -> Vec<&Tensor> {
        let mut params = self.linear.parameters();
        params.extend(self.bias.as_ref());
        params
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        let mut params = self.linear.parameters_mut();
        params.extend(self.bias.as_mut());
        params
    }

    fn refresh_caches(&mut self) {
        self.linear.refresh_caches();
    }
}
