//! T-GCN: Temporal Graph Convolutional Network in pure Rust.
//!
//! Predicts node-level outputs on a fixed graph from a sequence of node
//! feature snapshots. Each time step is processed by a recurrent cell that
//! aggregates neighbourhood information with a graph convolution (GCN or GAT)
//! and blends it into a per-node hidden state through GRU-style gates.
//!
//! # Quick Start
//!
//! ```
//! use tgcn::prelude::*;
//!
//! // 3 sensors on a line, 2 features each, 4 time steps
//! let graph = Graph::from_edge_index(&[[0, 1], [1, 2]], 3);
//! let x = Tensor::ones(&[3, 2, 4]);
//!
//! let config = TGCNConfig::new(2, 1, 8)
//!     .with_aggregation(Aggregation::DegreeNormalized)
//!     .with_seed(42);
//! let model = TGCN::from_config(&config).unwrap();
//!
//! let y = model.forward(&x, &graph).unwrap();
//! assert_eq!(y.shape(), &[3, 1]);
//! ```
//!
//! # Modules
//!
//! - [`tensor`]: Dense `f32` tensor and the forward operations the model uses
//! - [`nn`]: Layers, graph convolutions, the recurrent cell and the model
//! - [`error`]: Error type shared by every fallible operation
//!
//! # Logging
//!
//! The crate emits [`tracing`] events (`debug` at construction and on
//! rejected input, `trace` per time step and layer) and never installs a
//! subscriber.

pub mod error;
pub mod nn;
pub mod prelude;
pub mod tensor;

pub use error::{Result, TgcnError};
pub use nn::gnn::Graph;
pub use nn::{Aggregation, OutputActivation, TGCNCell, TGCNConfig, TGCN};
pub use tensor::Tensor;
