//! Immutable graph structure shared by every time step of a forward pass.

use crate::error::{Result, TgcnError};

/// Edge list (COO format) with optional per-edge weights.
///
/// The node count is either supplied or inferred as `max index + 1`. The
/// feature tensor passed alongside the graph is authoritative for N; use
/// [`Graph::validate`] to check every endpoint against it.
///
/// # Example
///
/// ```
/// use tgcn::Graph;
///
/// let graph = Graph::from_edge_index(&[[0, 1], [1, 2]], 3).with_weights(vec![1.0, 0.5]);
/// assert_eq!(graph.num_nodes(), 3);
/// assert_eq!(graph.num_edges(), 2);
/// assert!(graph.validate(3).is_ok());
/// assert!(graph.validate(2).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    /// Number of nodes
    num_nodes: usize,
    /// Edge sources (COO format)
    edge_src: Vec<usize>,
    /// Edge targets (COO format)
    edge_tgt: Vec<usize>,
    /// Edge weights (optional, defaults to 1.0)
    edge_weights: Option<Vec<f32>>,
}

impl Graph {
    /// Create a graph from `[source, target]` pairs.
    #[must_use]
    pub fn from_edge_index(edges: &[[usize; 2]], num_nodes: usize) -> Self {
        let edge_src: Vec<usize> = edges.iter().map(|e| e[0]).collect();
        let edge_tgt: Vec<usize> = edges.iter().map(|e| e[1]).collect();
        Self::from_coo(edge_src, edge_tgt, num_nodes)
    }

    /// Create a graph from separate source and target vectors.
    ///
    /// # Panics
    ///
    /// Panics if `src` and `tgt` differ in length.
    #[must_use]
    pub fn from_coo(src: Vec<usize>, tgt: Vec<usize>, num_nodes: usize) -> Self {
        assert_eq!(
            src.len(),
            tgt.len(),
            "edge index rows differ in length: {} vs {}",
            src.len(),
            tgt.len()
        );
        Self {
            num_nodes,
            edge_src: src,
            edge_tgt: tgt,
            edge_weights: None,
        }
    }

    /// Create a graph from source and target vectors, inferring the node
    /// count as the largest endpoint plus one.
    #[must_use]
    pub fn from_edges(src: Vec<usize>, tgt: Vec<usize>) -> Self {
        let num_nodes = src
            .iter()
            .chain(tgt.iter())
            .max()
            .map_or(0, |&m| m + 1);
        Self::from_coo(src, tgt, num_nodes)
    }

    /// Create a graph from a signed `[2, E]` edge index.
    ///
    /// # Errors
    ///
    /// Returns [`TgcnError::ShapeMismatch`] if the rows differ in length and
    /// [`TgcnError::OutOfBoundsEdgeIndex`] for any endpoint outside
    /// `[0, num_nodes)`, negative ones included.
    pub fn from_signed_coo(src: &[i64], tgt: &[i64], num_nodes: usize) -> Result<Self> {
        if src.len() != tgt.len() {
            return Err(TgcnError::shape(
                "edge_index",
                format!("[2, {}]", src.len()),
                &[src.len(), tgt.len()],
            ));
        }

        let convert = |edge: usize, index: i64| -> Result<usize> {
            usize::try_from(index)
                .ok()
                .filter(|&i| i < num_nodes)
                .ok_or(TgcnError::OutOfBoundsEdgeIndex {
                    edge,
                    index,
                    num_nodes,
                })
        };

        let mut edge_src = Vec::with_capacity(src.len());
        let mut edge_tgt = Vec::with_capacity(tgt.len());
        for (edge, (&s, &t)) in src.iter().zip(tgt.iter()).enumerate() {
            edge_src.push(convert(edge, s)?);
            edge_tgt.push(convert(edge, t)?);
        }

        Ok(Self::from_coo(edge_src, edge_tgt, num_nodes))
    }

    /// Set edge weights (one per edge, same order as the edge list).
    #[must_use]
    pub fn with_weights(mut self, weights: Vec<f32>) -> Self {
        self.edge_weights = Some(weights);
        self
    }

    /// Get number of nodes.
    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Get number of edges.
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.edge_src.len()
    }

    /// Get edge sources.
    #[must_use]
    pub fn edge_src(&self) -> &[usize] {
        &self.edge_src
    }

    /// Get edge targets.
    #[must_use]
    pub fn edge_tgt(&self) -> &[usize] {
        &self.edge_tgt
    }

    /// Get edge weights, if set.
    #[must_use]
    pub fn edge_weights(&self) -> Option<&[f32]> {
        self.edge_weights.as_deref()
    }

    /// Weight of edge `i` (1.0 when the graph is unweighted).
    #[must_use]
    pub fn weight(&self, i: usize) -> f32 {
        self.edge_weights
            .as_ref()
            .map_or(1.0, |w| w.get(i).copied().unwrap_or(1.0))
    }

    /// Check the graph against a feature tensor with `num_nodes` rows.
    ///
    /// # Errors
    ///
    /// Returns [`TgcnError::OutOfBoundsEdgeIndex`] for the first endpoint
    /// `>= num_nodes`, and [`TgcnError::ShapeMismatch`] if the weight vector
    /// length differs from the edge count.
    pub fn validate(&self, num_nodes: usize) -> Result<()> {
        if let Some(weights) = &self.edge_weights {
            if weights.len() != self.num_edges() {
                return Err(TgcnError::shape(
                    "edge_weight",
                    format!("[{}]", self.num_edges()),
                    &[weights.len()],
                ));
            }
        }

        for (edge, (&src, &tgt)) in self.edge_src.iter().zip(self.edge_tgt.iter()).enumerate() {
            for index in [src, tgt] {
                if index >= num_nodes {
                    return Err(TgcnError::OutOfBoundsEdgeIndex {
                        edge,
                        index: i64::try_from(index).unwrap_or(i64::MAX),
                        num_nodes,
                    });
                }
            }
        }

        Ok(())
    }

    /// Weighted edges `(src, tgt, weight)` over `num_nodes` nodes, with a
    /// unit self-loop added for every node that has none.
    ///
    /// Edges with an endpoint `>= num_nodes` are skipped; callers validate
    /// beforehand.
    pub(crate) fn edges_with_self_loops(&self, num_nodes: usize) -> Vec<(usize, usize, f32)> {
        let mut edges = self.weighted_edges(num_nodes);
        let mut has_loop = vec![false; num_nodes];
        for &(src, tgt, _) in &edges {
            if src == tgt {
                has_loop[src] = true;
            }
        }
        edges.extend(
            has_loop
                .iter()
                .enumerate()
                .filter(|(_, &looped)| !looped)
                .map(|(i, _)| (i, i, 1.0)),
        );
        edges
    }

    /// Weighted edges `(src, tgt, weight)` with both endpoints `< num_nodes`.
    pub(crate) fn weighted_edges(&self, num_nodes: usize) -> Vec<(usize, usize, f32)> {
        self.edge_src
            .iter()
            .zip(self.edge_tgt.iter())
            .enumerate()
            .filter(|(_, (&src, &tgt))| src < num_nodes && tgt < num_nodes)
            .map(|(i, (&src, &tgt))| (src, tgt, self.weight(i)))
            .collect()
    }
}
