//! Layered temporal unroller.

use tracing::{debug, trace};

use super::{TGCNCell, TGCNConfig};
use crate::error::{Result, TgcnError};
use crate::nn::gnn::{Aggregation, Graph};
use crate::nn::init::derive_seed;
use crate::nn::{GraphModule, Linear, Module};
use crate::tensor::{stack_time, Tensor};

/// Temporal Graph Convolutional Network (Zhao et al., 2019).
///
/// Stacks `layers_nb` [`TGCNCell`]s and unrolls them over the time axis of
/// a `[N, in_channels, T]` sequence. Hidden states start at zero on every
/// call. Only the top layer's final hidden state is projected to the output
/// (sequence-to-one):
///
/// ```text
/// for t in 0..T:
///     h_0 = cell_0(x[:, :, t], h_0)
///     h_i = cell_i(h_{i-1}, h_i)        for i in 1..L
/// y = act(W_out h_{L-1} + b_out)
/// ```
pub struct TGCN {
    cells: Vec<TGCNCell>,
    output: Linear,
    output_activation: Option<Box<dyn Module + Send + Sync>>,
    in_channels: usize,
    out_channels: usize,
    hidden_size: usize,
    aggregation: Aggregation,
}

impl TGCN {
    /// Create a model with entropy-seeded parameters.
    ///
    /// `layers_nb` below one builds a single layer.
    ///
    /// # Errors
    ///
    /// Returns [`TgcnError::InvalidConfiguration`] if `in_channels`,
    /// `out_channels` or `hidden_size` is zero.
    pub fn new(
        in_channels: usize,
        out_channels: usize,
        hidden_size: usize,
        layers_nb: i64,
        aggregation: Aggregation,
    ) -> Result<Self> {
        Self::with_seed(in_channels, out_channels, hidden_size, layers_nb, aggregation, None)
    }

    /// Create a model with a specific random seed.
    ///
    /// # Errors
    ///
    /// Same as [`TGCN::new`].
    pub fn with_seed(
        in_channels: usize,
        out_channels: usize,
        hidden_size: usize,
        layers_nb: i64,
        aggregation: Aggregation,
        seed: Option<u64>,
    ) -> Result<Self> {
        let config = TGCNConfig {
            layers_nb,
            aggregation,
            seed,
            ..TGCNConfig::new(in_channels, out_channels, hidden_size)
        };
        Self::from_config(&config)
    }

    /// Create a model from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TgcnError::InvalidConfiguration`] if the configuration fails
    /// [`TGCNConfig::validate`].
    pub fn from_config(config: &TGCNConfig) -> Result<Self> {
        config.validate()?;
        let mut model = Self::build(config);
        model.output_activation = config.output_activation.map(|act| act.build());
        Ok(model)
    }

    fn build(config: &TGCNConfig) -> Self {
        let layers = config.effective_layers();
        let hidden = config.hidden_size;

        let cells: Vec<TGCNCell> = (0..layers)
            .map(|i| {
                let width = if i == 0 { config.in_channels } else { hidden };
                TGCNCell::build(
                    width,
                    hidden,
                    config.aggregation,
                    config.attention_heads,
                    derive_seed(config.seed, i as u64),
                )
            })
            .collect();

        debug!(
            layers,
            in_channels = config.in_channels,
            hidden_size = hidden,
            out_channels = config.out_channels,
            aggregation = %config.aggregation,
            attention_heads = config.attention_heads,
            "built T-GCN"
        );

        Self {
            cells,
            output: Linear::with_seed(
                hidden,
                config.out_channels,
                derive_seed(config.seed, layers as u64),
            ),
            output_activation: None,
            in_channels: config.in_channels,
            out_channels: config.out_channels,
            hidden_size: hidden,
            aggregation: config.aggregation,
        }
    }

    /// Apply `activation` after the output projection.
    #[must_use]
    pub fn with_output_activation(
        mut self,
        activation: impl Module + Send + Sync + 'static,
    ) -> Self {
        self.output_activation = Some(Box::new(activation));
        self
    }

    /// Predict `[N, out_channels]` from a sequence `[N, in_channels, T]`.
    ///
    /// # Errors
    ///
    /// Returns [`TgcnError::ShapeMismatch`] if `x` is not 3-D, has the wrong
    /// feature width or an empty time axis, and
    /// [`TgcnError::OutOfBoundsEdgeIndex`] if `graph` references a node
    /// outside `[0, N)`.
    pub fn forward(&self, x: &Tensor, graph: &Graph) -> Result<Tensor> {
        let hidden = self.forward_hidden(x, graph)?;
        Ok(self.project(&hidden[hidden.len() - 1]))
    }

    /// Unroll over time and return every layer's final hidden state
    /// `[N, hidden_size]`, bottom layer first.
    ///
    /// # Errors
    ///
    /// Same as [`TGCN::forward`].
    pub fn forward_hidden(&self, x: &Tensor, graph: &Graph) -> Result<Vec<Tensor>> {
        if let Err(err) = self.check_sequence(x, graph) {
            debug!(x_shape = ?x.shape(), %err, "rejected T-GCN input");
            return Err(err);
        }

        let num_nodes = x.shape()[0];
        let steps = x.shape()[2];
        let mut h_prev: Vec<Tensor> = (0..self.cells.len())
            .map(|_| Tensor::zeros(&[num_nodes, self.hidden_size]))
            .collect();

        // Shapes and edges were checked once above; each layer's input
        // width matches its cell by construction.
        for t in 0..steps {
            let x_t = x.select_time(t);
            for (i, cell) in self.cells.iter().enumerate() {
                let h = {
                    let input = if i == 0 { &x_t } else { &h_prev[i - 1] };
                    cell.advance(input, graph, &h_prev[i])
                };
                h_prev[i] = h;
                trace!(step = t, layer = i, "cell advanced");
            }
        }

        Ok(h_prev)
    }

    /// Predict from `T` snapshots `[N, in_channels]`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`TgcnError::ShapeMismatch`] if `snapshots` is empty or the
    /// snapshots disagree in shape, plus every error of [`TGCN::forward`].
    pub fn forward_snapshots(&self, snapshots: &[Tensor], graph: &Graph) -> Result<Tensor> {
        let x = stack_time(snapshots).ok_or_else(|| TgcnError::ShapeMismatch {
            tensor: "snapshots".to_string(),
            expected: format!("at least one [num_nodes, {}] snapshot, all equal", self.in_channels),
            actual: format!(
                "{:?}",
                snapshots.iter().map(Tensor::shape).collect::<Vec<_>>()
            ),
        })?;
        self.forward(&x, graph)
    }

    fn check_sequence(&self, x: &Tensor, graph: &Graph) -> Result<()> {
        if x.ndim() != 3 || x.shape()[1] != self.in_channels {
            return Err(TgcnError::shape(
                "x",
                format!("[num_nodes, {}, seq_len]", self.in_channels),
                x.shape(),
            ));
        }
        if x.shape()[2] == 0 {
            return Err(TgcnError::shape(
                "x",
                format!("[num_nodes, {}, seq_len >= 1]", self.in_channels),
                x.shape(),
            ));
        }
        graph.validate(x.shape()[0])
    }

    fn project(&self, h: &Tensor) -> Tensor {
        let y = self.output.forward(h);
        match &self.output_activation {
            Some(act) => act.forward(&y),
            None => y,
        }
    }

    /// Recurrent cells, bottom layer first.
    #[must_use]
    pub fn cells(&self) -> &[TGCNCell] {
        &self.cells
    }

    /// Mutable recurrent cells.
    pub fn cells_mut(&mut self) -> &mut [TGCNCell] {
        &mut self.cells
    }

    /// Output projection `hidden_size -> out_channels`.
    #[must_use]
    pub fn output(&self) -> &Linear {
        &self.output
    }

    /// Mutable output projection.
    pub fn output_mut(&mut self) -> &mut Linear {
        &mut self.output
    }

    /// Whether an output activation is applied.
    #[must_use]
    pub fn has_output_activation(&self) -> bool {
        self.output_activation.is_some()
    }

    /// Number of stacked layers (always at least one).
    #[must_use]
    pub fn layers_nb(&self) -> usize {
        self.cells.len()
    }

    /// Input feature width.
    #[must_use]
    pub fn in_channels(&self) -> usize {
        self.in_channels
    }

    /// Output feature width.
    #[must_use]
    pub fn out_channels(&self) -> usize {
        self.out_channels
    }

    /// Hidden state width.
    #[must_use]
    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// Aggregation strategy shared by every cell.
    #[must_use]
    pub fn aggregation(&self) -> Aggregation {
        self.aggregation
    }
}

impl GraphModule for TGCN {
    fn forward_graph(&self, x: &Tensor, graph: &Graph) -> Result<Tensor> {
        self.forward(x, graph)
    }

    fn parameters(&self) -> Vec<&Tensor> {
        let mut params: Vec<&Tensor> =
            self.cells.iter().flat_map(GraphModule::parameters).collect();
        params.extend(self.output.parameters());
        params
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        let mut params: Vec<&mut Tensor> = self
            .cells
            .iter_mut()
            .flat_map(GraphModule::parameters_mut)
            .collect();
        params.extend(self.output.parameters_mut());
        params
    }

    fn refresh_caches(&mut self) {
        self.cells.iter_mut().for_each(GraphModule::refresh_caches);
        self.output.refresh_caches();
    }
}

impl std::fmt::Debug for TGCN {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TGCN")
            .field("layers_nb", &self.cells.len())
            .field("in_channels", &self.in_channels)
            .field("out_channels", &self.out_channels)
            .field("hidden_size", &self.hidden_size)
            .field("aggregation", &self.aggregation)
            .field("output_activation", &self.output_activation.is_some())
            .finish_non_exhaustive()
    }
}
