//! Single-timestep recurrent cell.

use tracing::debug;

use crate::error::{Result, TgcnError};
use crate::nn::gnn::{Aggregation, Graph, GraphAggregator};
use crate::nn::init::derive_seed;
use crate::nn::{GraphModule, Linear, Module};
use crate::tensor::Tensor;

/// T-GCN cell: graph aggregation followed by a GRU-style gated update.
///
/// ```text
/// g_t = σ(Agg(x_t, A))                       // graph context
/// u_t = σ(W_u [x_t, g_t, h_{t-1}] + b_u)     // update gate
/// r_t = σ(W_r [x_t, g_t, h_{t-1}] + b_r)     // reset gate
/// c_t = tanh(W_c [x_t, g_t, r_t * h_{t-1}] + b_c)  // candidate
/// h_t = u_t * h_{t-1} + (1 - u_t) * c_t
/// ```
///
/// `Agg` is a two-layer [`GraphAggregator`] with widths `[H, H]`; the three
/// gate projections map `in_channels + 2H` to `H`.
///
/// # Example
///
/// ```
/// use tgcn::nn::{Aggregation, TGCNCell};
/// use tgcn::tensor::Tensor;
/// use tgcn::Graph;
///
/// let cell = TGCNCell::with_seed(2, 4, Aggregation::AttentionWeighted, Some(1)).unwrap();
/// let x = Tensor::ones(&[3, 2]);
/// let h = Tensor::zeros(&[3, 4]);
/// let graph = Graph::from_edge_index(&[[0, 1], [1, 2]], 3);
///
/// let h_new = cell.step(&x, &graph, &h).unwrap();
/// assert_eq!(h_new.shape(), &[3, 4]);
/// ```
#[derive(Clone)]
pub struct TGCNCell {
    in_channels: usize,
    hidden_size: usize,
    aggregator: GraphAggregator,
    lin_u: Linear,
    lin_r: Linear,
    lin_c: Linear,
}

impl TGCNCell {
    /// Create a cell with entropy-seeded parameters.
    ///
    /// # Errors
    ///
    /// Returns [`TgcnError::InvalidConfiguration`] if `in_channels` or
    /// `hidden_size` is zero.
    pub fn new(in_channels: usize, hidden_size: usize, aggregation: Aggregation) -> Result<Self> {
        Self::with_seed(in_channels, hidden_size, aggregation, None)
    }

    /// Create a cell with a specific random seed.
    ///
    /// # Errors
    ///
    /// Same as [`TGCNCell::new`].
    pub fn with_seed(
        in_channels: usize,
        hidden_size: usize,
        aggregation: Aggregation,
        seed: Option<u64>,
    ) -> Result<Self> {
        for (param, value) in [("in_channels", in_channels), ("hidden_size", hidden_size)] {
            if value == 0 {
                return Err(TgcnError::config(param, value, "> 0"));
            }
        }
        Ok(Self::build(in_channels, hidden_size, aggregation, 1, seed))
    }

    pub(crate) fn build(
        in_channels: usize,
        hidden_size: usize,
        aggregation: Aggregation,
        heads: usize,
        seed: Option<u64>,
    ) -> Self {
        let gate_in = in_channels + 2 * hidden_size;
        Self {
            in_channels,
            hidden_size,
            aggregator: GraphAggregator::build(
                aggregation,
                in_channels,
                &[hidden_size, hidden_size],
                heads,
                derive_seed(seed, 0),
            ),
            lin_u: Linear::with_seed(gate_in, hidden_size, derive_seed(seed, 1)),
            lin_r: Linear::with_seed(gate_in, hidden_size, derive_seed(seed, 2)),
            lin_c: Linear::with_seed(gate_in, hidden_size, derive_seed(seed, 3)),
        }
    }

    /// Advance one time step.
    ///
    /// # Arguments
    ///
    /// * `x` - Node features `[N, in_channels]`
    /// * `graph` - Graph structure, valid for N nodes
    /// * `h_prev` - Previous hidden state `[N, hidden_size]`
    ///
    /// # Errors
    ///
    /// Returns [`TgcnError::ShapeMismatch`] if `x` or `h_prev` has the wrong
    /// shape, and [`TgcnError::OutOfBoundsEdgeIndex`] if an edge endpoint is
    /// not a valid node. Nothing is computed on error.
    pub fn step(&self, x: &Tensor, graph: &Graph, h_prev: &Tensor) -> Result<Tensor> {
        if let Err(err) = self.check_inputs(x, graph, h_prev) {
            debug!(
                in_channels = self.in_channels,
                hidden_size = self.hidden_size,
                %err,
                "cell rejected input"
            );
            return Err(err);
        }

        Ok(self.advance(x, graph, h_prev))
    }

    /// [`TGCNCell::step`] on inputs already checked against this cell and
    /// `graph`.
    pub(crate) fn advance(&self, x: &Tensor, graph: &Graph, h_prev: &Tensor) -> Tensor {
        let gcn_out = self.aggregator.aggregate_checked(x, graph).sigmoid();

        let cat = Tensor::cat_features(&[x, &gcn_out, h_prev]);
        let u = self.lin_u.forward(&cat).sigmoid();
        let r = self.lin_r.forward(&cat).sigmoid();

        let cat_c = Tensor::cat_features(&[x, &gcn_out, &r.mul(h_prev)]);
        let c = self.lin_c.forward(&cat_c).tanh();

        u.mul(h_prev).add(&u.one_minus().mul(&c))
    }

    fn check_inputs(&self, x: &Tensor, graph: &Graph, h_prev: &Tensor) -> Result<()> {
        if x.ndim() != 2 || x.shape()[1] != self.in_channels {
            return Err(TgcnError::shape(
                "x",
                format!("[num_nodes, {}]", self.in_channels),
                x.shape(),
            ));
        }
        let num_nodes = x.shape()[0];
        if h_prev.shape() != &[num_nodes, self.hidden_size] {
            return Err(TgcnError::shape(
                "h_prev",
                format!("[{num_nodes}, {}]", self.hidden_size),
                h_prev.shape(),
            ));
        }
        graph.validate(num_nodes)
    }

    /// Input feature width.
    #[must_use]
    pub fn in_channels(&self) -> usize {
        self.in_channels
    }

    /// Hidden state width.
    #[must_use]
    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// Aggregation strategy of the spatial stack.
    #[must_use]
    pub fn aggregation(&self) -> Aggregation {
        self.aggregator.strategy()
    }

    /// Spatial aggregator.
    #[must_use]
    pub fn aggregator(&self) -> &GraphAggregator {
        &self.aggregator
    }

    /// Mutable spatial aggregator.
    pub fn aggregator_mut(&mut self) -> &mut GraphAggregator {
        &mut self.aggregator
    }

    /// Update gate projection.
    #[must_use]
    pub fn update_gate(&self) -> &Linear {
        &self.lin_u
    }

    /// Mutable update gate projection.
    pub fn update_gate_mut(&mut self) -> &mut Linear {
        &mut self.lin_u
    }

    /// Reset gate projection.
    #[must_use]
    pub fn reset_gate(&self) -> &Linear {
        &self.lin_r
    }

    /// Mutable reset gate projection.
    pub fn reset_gate_mut(&mut self) -> &mut Linear {
        &mut self.lin_r
    }

    /// Candidate projection.
    #[must_use]
    pub fn candidate(&self) -> &Linear {
        &self.lin_c
    }

    /// Mutable candidate projection.
    pub fn candidate_mut(&mut self) -> &mut Linear {
        &mut self.lin_c
    }
}

/// One step from a zero hidden state.
impl GraphModule for TGCNCell {
    fn forward_graph(&self, x: &Tensor, graph: &Graph) -> Result<Tensor> {
        let num_nodes = x.shape().first().copied().unwrap_or(0);
        self.step(x, graph, &Tensor::zeros(&[num_nodes, self.hidden_size]))
    }

    fn parameters(&self) -> Vec<&Tensor> {
        let mut params = self.aggregator.parameters();
        params.extend(self.lin_u.parameters());
        params.extend(self.lin_r.parameters());
        params.extend(self.lin_c.parameters());
        params
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        let mut params = self.aggregator.parameters_mut();
        params.extend(self.lin_u.parameters_mut());
        params.extend(self.lin_r.parameters_mut());
        params.extend(self.lin_c.parameters_mut());
        params
    }

    fn refresh_caches(&mut self) {
        self.aggregator.refresh_caches();
        self.lin_u.refresh_caches();
        self.lin_r.refresh_caches();
        self.lin_c.refresh_caches();
    }
}

impl std::fmt::Debug for TGCNCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TGCNCell")
            .field("in_channels", &self.in_channels)
            .field("hidden_size", &self.hidden_size)
            .field("aggregation", &self.aggregation())
            .finish_non_exhaustive()
    }
}
