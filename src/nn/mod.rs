//! Neural network building blocks for the T-GCN.
//!
//! # Architecture
//!
//! The nn module is organized around two traits:
//!
//! - [`Module`]: tensor-to-tensor layers, [`Linear`] and the activations
//!   ([`ReLU`], [`LeakyReLU`], [`Sigmoid`], [`Tanh`])
//! - [`GraphModule`]: layers that also consume a [`gnn::Graph`], the
//!   convolutions in [`gnn`] and the recurrent model in [`tgcn`]
//!
//! # Example
//!
//! ```
//! use tgcn::nn::{Aggregation, TGCN};
//! use tgcn::tensor::Tensor;
//! use tgcn::Graph;
//!
//! let model = TGCN::with_seed(2, 1, 8, 2, Aggregation::DegreeNormalized, Some(7)).unwrap();
//! let x = Tensor::ones(&[3, 2, 5]); // 3 nodes, 2 features, 5 steps
//! let graph = Graph::from_edge_index(&[[0, 1], [1, 2]], 3);
//!
//! let y = model.forward(&x, &graph).unwrap();
//! assert_eq!(y.shape(), &[3, 1]);
//! ```
//!
//! # References
//!
//! - Zhao, L., et al. (2019). T-GCN: A Temporal Graph Convolutional Network
//!   for Traffic Prediction. IEEE T-ITS.
//! - Cho, K., et al. (2014). Learning Phrase Representations using RNN
//!   Encoder-Decoder for Statistical Machine Translation. EMNLP.
//! - Glorot, X., & Bengio, Y. (2010). Understanding the difficulty of training
//!   deep feedforward neural networks. AISTATS.

mod activation;
pub mod gnn;
mod init;
mod linear;
mod module;
pub mod tgcn;

pub use activation::{LeakyReLU, OutputActivation, ReLU, Sigmoid, Tanh};
pub use gnn::{Aggregation, GATConv, GCNConv, GraphAggregator, GAT, GCN};
pub use init::xavier_uniform;
pub use linear::Linear;
pub use module::{GraphModule, Module};
pub use tgcn::{TGCNCell, TGCNConfig, TGCN};
