//! Multi-layer graph convolution stacks and the aggregation strategy switch.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{check_node_features, Convolve, GATConv, GCNConv, Graph};
use crate::error::{Result, TgcnError};
use crate::nn::init::derive_seed;
use crate::nn::GraphModule;
use crate::tensor::Tensor;

/// Neighbourhood aggregation strategy of a recurrent cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Degree-normalised spectral convolution ([`GCN`]).
    DegreeNormalized,
    /// Learned attention over incoming edges ([`GAT`]).
    #[default]
    AttentionWeighted,
}

impl Aggregation {
    /// Parse from a short name (`gcn`, `gat`, or the snake-case variant name).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "gcn" | "degree_normalized" => Some(Self::DegreeNormalized),
            "gat" | "attention_weighted" => Some(Self::AttentionWeighted),
            _ => None,
        }
    }

    /// Short name of the strategy.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::DegreeNormalized => "gcn",
            Self::AttentionWeighted => "gat",
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Aggregation {
    type Err = TgcnError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s).ok_or_else(|| TgcnError::config("aggregation", s, "gcn or gat"))
    }
}

/// Run `x` through `layers`, with ReLU between consecutive layers.
fn forward_stack<L: Convolve>(layers: &[L], x: &Tensor, graph: &Graph) -> Tensor {
    let mut h = x.clone();
    for (i, layer) in layers.iter().enumerate() {
        h = layer.convolve(&h, graph);
        if i + 1 < layers.len() {
            h = h.relu();
        }
    }
    h
}

/// Stack of [`GCNConv`] layers with the given output widths.
///
/// # Example
/// ```
/// use tgcn::nn::gnn::{Graph, GCN};
/// use tgcn::tensor::Tensor;
///
/// let gcn = GCN::with_seed(3, &[8, 8], Some(0));
/// let x = Tensor::ones(&[4, 3]);
/// let graph = Graph::from_edge_index(&[[0, 1], [2, 3]], 4);
/// assert_eq!(gcn.aggregate(&x, &graph).unwrap().shape(), &[4, 8]);
/// ```
#[derive(Debug, Clone)]
pub struct GCN {
    layers: Vec<GCNConv>,
}

impl GCN {
    /// Create a stack mapping `in_features` through each width of `hidden`.
    ///
    /// # Panics
    ///
    /// Panics if `hidden` is empty.
    #[must_use]
    pub fn new(in_features: usize, hidden: &[usize]) -> Self {
        Self::with_seed(in_features, hidden, None)
    }

    /// Create a seeded stack. Layer `i` is initialised from a seed derived
    /// from `seed` and `i`.
    ///
    /// # Panics
    ///
    /// Panics if `hidden` is empty.
    #[must_use]
    pub fn with_seed(in_features: usize, hidden: &[usize], seed: Option<u64>) -> Self {
        assert!(!hidden.is_empty(), "GCN needs at least one layer");
        let mut layers = Vec::with_capacity(hidden.len());
        let mut width = in_features;
        for (i, &out) in hidden.iter().enumerate() {
            layers.push(GCNConv::with_seed(width, out, derive_seed(seed, i as u64)));
            width = out;
        }
        Self { layers }
    }

    /// Aggregate node features `[N, in]` into `[N, last width]`.
    ///
    /// # Errors
    ///
    /// Returns a shape or edge-index error if `x` or `graph` is invalid.
    pub fn aggregate(&self, x: &Tensor, graph: &Graph) -> Result<Tensor> {
        check_node_features(x, self.in_features(), graph)?;
        Ok(self.aggregate_checked(x, graph))
    }

    /// Aggregate features already checked against `graph`.
    pub(crate) fn aggregate_checked(&self, x: &Tensor, graph: &Graph) -> Tensor {
        forward_stack(&self.layers, x, graph)
    }

    /// Get the layers.
    #[must_use]
    pub fn layers(&self) -> &[GCNConv] {
        &self.layers
    }

    /// Get mutable access to the layers.
    pub fn layers_mut(&mut self) -> &mut [GCNConv] {
        &mut self.layers
    }

    /// Input feature dimension.
    #[must_use]
    pub fn in_features(&self) -> usize {
        self.layers[0].in_features()
    }

    /// Output feature dimension.
    #[must_use]
    pub fn out_features(&self) -> usize {
        self.layers[self.layers.len() - 1].out_features()
    }
}

impl GraphModule for GCN {
    fn forward_graph(&self, x: &Tensor, graph: &Graph) -> Result<Tensor> {
        self.aggregate(x, graph)
    }

    fn parameters(&self) -> Vec<&Tensor> {
        self.layers.iter().flat_map(GraphModule::parameters).collect()
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        self.layers
            .iter_mut()
            .flat_map(GraphModule::parameters_mut)
            .collect()
    }

    fn refresh_caches(&mut self) {
        self.layers.iter_mut().for_each(GraphModule::refresh_caches);
    }
}

/// Stack of [`GATConv`] layers with the given output widths.
#[derive(Debug, Clone)]
pub struct GAT {
    layers: Vec<GATConv>,
}

impl GAT {
    /// Create a single-head stack mapping `in_features` through each width of
    /// `hidden`.
    ///
    /// # Panics
    ///
    /// Panics if `hidden` is empty.
    #[must_use]
    pub fn new(in_features: usize, hidden: &[usize]) -> Self {
        Self::with_seed(in_features, hidden, None)
    }

    /// Create a seeded single-head stack.
    ///
    /// # Panics
    ///
    /// Panics if `hidden` is empty.
    #[must_use]
    pub fn with_seed(in_features: usize, hidden: &[usize], seed: Option<u64>) -> Self {
        assert!(!hidden.is_empty(), "GAT needs at least one layer");
        let mut layers = Vec::with_capacity(hidden.len());
        let mut width = in_features;
        for (i, &out) in hidden.iter().enumerate() {
            layers.push(GATConv::with_seed(width, out, derive_seed(seed, i as u64)));
            width = out;
        }
        Self { layers }
    }

    /// Use `num_heads` attention heads in every layer.
    #[must_use]
    pub fn with_heads(self, num_heads: usize) -> Self {
        Self {
            layers: self
                .layers
                .into_iter()
                .map(|layer| layer.with_heads(num_heads))
                .collect(),
        }
    }

    /// Aggregate node features `[N, in]` into `[N, last width]`.
    ///
    /// # Errors
    ///
    /// Returns a shape or edge-index error if `x` or `graph` is invalid.
    pub fn aggregate(&self, x: &Tensor, graph: &Graph) -> Result<Tensor> {
        check_node_features(x, self.in_features(), graph)?;
        Ok(self.aggregate_checked(x, graph))
    }

    /// Aggregate features already checked against `graph`.
    pub(crate) fn aggregate_checked(&self, x: &Tensor, graph: &Graph) -> Tensor {
        forward_stack(&self.layers, x, graph)
    }

    /// Get the layers.
    #[must_use]
    pub fn layers(&self) -> &[GATConv] {
        &self.layers
    }

    /// Get mutable access to the layers.
    pub fn layers_mut(&mut self) -> &mut [GATConv] {
        &mut self.layers
    }

    /// Input feature dimension.
    #[must_use]
    pub fn in_features(&self) -> usize {
        self.layers[0].in_features()
    }

    /// Output feature dimension.
    #[must_use]
    pub fn out_features(&self) -> usize {
        self.layers[self.layers.len() - 1].out_features()
    }
}

impl GraphModule for GAT {
    fn forward_graph(&self, x: &Tensor, graph: &Graph) -> Result<Tensor> {
        self.aggregate(x, graph)
    }

    fn parameters(&self) -> Vec<&Tensor> {
        self.layers.iter().flat_map(GraphModule::parameters).collect()
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        self.layers
            .iter_mut()
            .flat_map(GraphModule::parameters_mut)
            .collect()
    }

    fn refresh_caches(&mut self) {
        self.layers.iter_mut().for_each(GraphModule::refresh_caches);
    }
}

/// Spatial aggregator of a recurrent cell, one of the two stacks.
#[derive(Debug, Clone)]
pub enum GraphAggregator {
    /// Degree-normalised convolution stack
    Gcn(GCN),
    /// Attention convolution stack
    Gat(GAT),
}

impl GraphAggregator {
    /// Build the stack for `strategy` with the given widths.
    ///
    /// `heads` only applies to attention; it is clamped to at least one.
    #[must_use]
    pub fn build(
        strategy: Aggregation,
        in_features: usize,
        hidden: &[usize],
        heads: usize,
        seed: Option<u64>,
    ) -> Self {
        match strategy {
            Aggregation::DegreeNormalized => Self::Gcn(GCN::with_seed(in_features, hidden, seed)),
            Aggregation::AttentionWeighted => {
                let gat = GAT::with_seed(in_features, hidden, seed);
                Self::Gat(if heads > 1 { gat.with_heads(heads) } else { gat })
            }
        }
    }

    /// Strategy of this aggregator.
    #[must_use]
    pub fn strategy(&self) -> Aggregation {
        match self {
            Self::Gcn(_) => Aggregation::DegreeNormalized,
            Self::Gat(_) => Aggregation::AttentionWeighted,
        }
    }

    /// Aggregate node features `[N, in]` into `[N, out]`.
    ///
    /// # Errors
    ///
    /// Returns a shape or edge-index error if `x` or `graph` is invalid.
    pub fn aggregate(&self, x: &Tensor, graph: &Graph) -> Result<Tensor> {
        check_node_features(x, self.in_features(), graph)?;
        Ok(self.aggregate_checked(x, graph))
    }

    /// Aggregate features already checked against `graph`.
    pub(crate) fn aggregate_checked(&self, x: &Tensor, graph: &Graph) -> Tensor {
        match self {
            Self::Gcn(gcn) => gcn.aggregate_checked(x, graph),
            Self::Gat(gat) => gat.aggregate_checked(x, graph),
        }
    }

    /// Input feature dimension.
    #[must_use]
    pub fn in_features(&self) -> usize {
        match self {
            Self::Gcn(gcn) => gcn.in_features(),
            Self::Gat(gat) => gat.in_features(),
        }
    }

    /// Output feature dimension.
    #[must_use]
    pub fn out_features(&self) -> usize {
        match self {
            Self::Gcn(gcn) => gcn.out_features(),
            Self::Gat(gat) => gat.out_features(),
        }
    }
}

impl GraphModule for GraphAggregator {
    fn forward_graph(&self, x: &Tensor, graph: &Graph) -> Result<Tensor> {
        self.aggregate(x, graph)
    }

    fn parameters(&self) -> Vec<&Tensor> {
        match self {
            Self::Gcn(gcn) => gcn.parameters(),
            Self::Gat(gat) => gat.parameters(),
        }
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        match self {
            Self::Gcn(gcn) => gcn.parameters_mut(),
            Self::Gat(gat) => gat.parameters_mut(),
        }
    }

    fn refresh_caches(&mut self) {
        match self {
            Self::Gcn(gcn) => gcn.refresh_caches(),
            Self::Gat(gat) => gat.refresh_caches(),
        }
    }
}
