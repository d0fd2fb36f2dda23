use super::{check_node_features, Convolve, Graph};
use crate::error::Result;
use crate::nn::init::{derive_seed, xavier_uniform, zeros};
use crate::nn::{GraphModule, Linear, Module};
use crate::tensor::Tensor;

/// Graph Attention Network layer (Veličković et al., 2018).
///
/// Multi-head attention over incoming edges, heads averaged:
///
/// ```text
/// e_ij = LeakyReLU(a_src · W h_j + a_tgt · W h_i)     for each edge j -> i
/// α_ij = softmax_j(e_ij)
/// h'_i = mean_heads(Σ_j α_ij W h_j) + b
/// ```
///
/// Attention computes its own neighbour weighting, so edge weights are not
/// used. A unit self-loop is added to every node lacking one (unless
/// disabled), which keeps isolated nodes defined.
///
/// # Example
/// ```
/// use tgcn::nn::gnn::{GATConv, Graph};
/// use tgcn::nn::GraphModule;
/// use tgcn::tensor::Tensor;
///
/// let gat = GATConv::with_seed(8, 4, Some(3)).with_heads(2);
/// let x = Tensor::new(&vec![0.1; 5 * 8], &[5, 8]);
/// let graph = Graph::from_edge_index(&[[0, 1], [1, 2], [2, 3]], 5);
/// let out = gat.forward_graph(&x, &graph).unwrap();
/// assert_eq!(out.shape(), &[5, 4]);
/// ```
#[derive(Debug, Clone)]
pub struct GATConv {
    /// Linear transformation [`in_features`] -> [`out_features` * `num_heads`]
    linear: Linear,
    /// Attention weight for source nodes [`num_heads`, `out_features`]
    att_src: Tensor,
    /// Attention weight for target nodes [`num_heads`, `out_features`]
    att_tgt: Tensor,
    /// Bias [`out_features`]
    bias: Option<Tensor>,
    /// Output feature dimension (per head)
    out_features: usize,
    /// Number of attention heads
    num_heads: usize,
    /// Negative slope for `LeakyReLU`
    negative_slope: f32,
    /// Add self-loops
    add_self_loops: bool,
    /// Seed the layer was built from, reused when heads change
    seed: Option<u64>,
}

impl GATConv {
    /// Create a new single-head GAT layer.
    #[must_use]
    pub fn new(in_features: usize, out_features: usize) -> Self {
        Self::with_seed(in_features, out_features, None)
    }

    /// Create a new single-head GAT layer with a specific random seed.
    #[must_use]
    pub fn with_seed(in_features: usize, out_features: usize, seed: Option<u64>) -> Self {
        Self::build(in_features, out_features, 1, seed)
    }

    fn build(in_features: usize, out_features: usize, num_heads: usize, seed: Option<u64>) -> Self {
        let num_heads = num_heads.max(1);
        let total_out = out_features * num_heads;

        Self {
            linear: Linear::without_bias(in_features, total_out, derive_seed(seed, 0)),
            att_src: xavier_uniform(
                &[num_heads, out_features],
                out_features,
                1,
                derive_seed(seed, 1),
            ),
            att_tgt: xavier_uniform(
                &[num_heads, out_features],
                out_features,
                1,
                derive_seed(seed, 2),
            ),
            bias: Some(zeros(&[out_features])),
            out_features,
            num_heads,
            negative_slope: 0.2,
            add_self_loops: true,
            seed,
        }
    }

    /// Use `num_heads` attention heads (at least one); re-initializes the
    /// parameters.
    #[must_use]
    pub fn with_heads(self, num_heads: usize) -> Self {
        let rebuilt = Self::build(self.in_features(), self.out_features, num_heads, self.seed);
        Self {
            negative_slope: self.negative_slope,
            add_self_loops: self.add_self_loops,
            bias: self.bias.and(rebuilt.bias.clone()),
            ..rebuilt
        }
    }

    /// Set the `LeakyReLU` negative slope of the attention scores.
    #[must_use]
    pub fn with_negative_slope(mut self, negative_slope: f32) -> Self {
        self.negative_slope = negative_slope;
        self
    }

    /// Disable automatic self-loop addition.
    #[must_use]
    pub fn without_self_loops(mut self) -> Self {
        self.add_self_loops = false;
        self
    }

    /// Disable bias.
    #[must_use]
    pub fn without_bias(mut self) -> Self {
        self.bias = None;
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
        self.out_features
    }

    /// Get number of attention heads.
    #[must_use]
    pub fn num_heads(&self) -> usize {
        self.num_heads
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

    /// Get the source attention vectors `[num_heads, out_features]`.
    #[must_use]
    pub fn att_src(&self) -> &Tensor {
        &self.att_src
    }

    /// Get the target attention vectors `[num_heads, out_features]`.
    #[must_use]
    pub fn att_tgt(&self) -> &Tensor {
        &self.att_tgt
    }

    /// Set both attention vectors from external data.
    ///
    /// # Panics
    ///
    /// Panics if either shape differs from `[num_heads, out_features]`.
    pub fn set_attention(&mut self, att_src: Tensor, att_tgt: Tensor) {
        let expected = [self.num_heads, self.out_features];
        assert_eq!(att_src.shape(), &expected, "GAT att_src shape mismatch");
        assert_eq!(att_tgt.shape(), &expected, "GAT att_tgt shape mismatch");
        self.att_src = att_src;
        self.att_tgt = att_tgt;
    }

    /// Get bias tensor.
    #[must_use]
    pub fn bias(&self) -> Option<&Tensor> {
        self.bias.as_ref()
    }

    /// Get the `LeakyReLU` negative slope.
    #[must_use]
    pub fn negative_slope(&self) -> f32 {
        self.negative_slope
    }

    /// Per-node attention logits `[num_nodes, num_heads]` for one attention vector.
    fn node_scores(&self, h_data: &[f32], att: &Tensor, num_nodes: usize) -> Vec<f32> {
        let total_out = self.num_heads * self.out_features;
        let att_data = att.data();
        let mut scores = vec![0.0f32; num_nodes * self.num_heads];

        for node in 0..num_nodes {
            for head in 0..self.num_heads {
                let offset = node * total_out + head * self.out_features;
                let a = &att_data[head * self.out_features..(head + 1) * self.out_features];
                scores[node * self.num_heads + head] = h_data[offset..offset + self.out_features]
                    .iter()
                    .zip(a)
                    .map(|(h, w)| h * w)
                    .sum();
            }
        }
        scores
    }
}

impl Convolve for GATConv {
    fn convolve(&self, x: &Tensor, graph: &Graph) -> Tensor {
        let num_nodes = x.shape()[0];

        // Transform features: [num_nodes, in] -> [num_nodes, num_heads * out]
        let h = self.linear.forward(x);
        let h_data = h.data();
        let total_out = self.num_heads * self.out_features;

        let edges = if self.add_self_loops {
            graph.edges_with_self_loops(num_nodes)
        } else {
            graph.weighted_edges(num_nodes)
        };

        // Group sources by target node
        let mut incoming: Vec<Vec<usize>> = vec![Vec::new(); num_nodes];
        for &(src, tgt, _) in &edges {
            incoming[tgt].push(src);
        }

        let score_src = self.node_scores(h_data, &self.att_src, num_nodes);
        let score_tgt = self.node_scores(h_data, &self.att_tgt, num_nodes);

        let mut output = vec![0.0f32; num_nodes * self.out_features];
        let head_scale = 1.0 / self.num_heads as f32;

        for (tgt, sources) in incoming.iter().enumerate() {
            if sources.is_empty() {
                continue;
            }

            for head in 0..self.num_heads {
                let head_offset = head * self.out_features;

                // e_ij = LeakyReLU(a_src · Wh_j + a_tgt · Wh_i)
                let mut scores: Vec<f32> = sources
                    .iter()
                    .map(|&src| {
                        let e = score_src[src * self.num_heads + head]
                            + score_tgt[tgt * self.num_heads + head];
                        if e < 0.0 {
                            e * self.negative_slope
                        } else {
                            e
                        }
                    })
                    .collect();

                // Softmax normalization (numerically stable)
                let max_score = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
                let mut exp_sum = 0.0;
                for s in &mut scores {
                    *s = (*s - max_score).exp();
                    exp_sum += *s;
                }

                let out_row =
                    &mut output[tgt * self.out_features..(tgt + 1) * self.out_features];
                for (&src, &s) in sources.iter().zip(&scores) {
                    let alpha = s / exp_sum.max(1e-8) * head_scale;
                    let start = src * total_out + head_offset;
                    for (o, &v) in out_row.iter_mut().zip(&h_data[start..start + self.out_features])
                    {
                        *o += alpha * v;
                    }
                }
            }
        }

        let output = Tensor::from_vec(output, &[num_nodes, self.out_features]);
        match &self.bias {
            Some(b) => output.broadcast_add(b),
            None => output,
        }
    }
}

impl GraphModule for GATConv {
    fn forward_graph(&self, x: &Tensor, graph: &Graph) -> Result<Tensor> {
        check_node_features(x, self.in_features(), graph)?;
        Ok(self.convolve(x, graph))
    }

    fn parameters(&self) -> Vec<&Tensor> {
        let mut params = self.linear.parameters();
        params.push(&self.att_src);
        params.push(&self.att_tgt);
        params.extend(self.bias.as_ref());
        params
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        let mut params = self.linear.parameters_mut();
        params.push(&mut self.att_src);
        params.push(&mut self.att_tgt);
        params.extend(self.bias.as_mut());
        params
    }

    fn refresh_caches(&mut self) {
        self.linear.refresh_caches();
    }
}
