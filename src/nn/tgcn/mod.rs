//! Temporal Graph Convolutional Network.
//!
//! - [`TGCNCell`]: one time step, graph aggregation fused with a GRU update
//! - [`TGCN`]: `layers_nb` stacked cells unrolled over a sequence,
//!   sequence-to-one output projection
//! - [`TGCNConfig`]: serializable model configuration
//!
//! # References
//!
//! - Zhao, L., et al. (2019). T-GCN: A Temporal Graph Convolutional Network
//!   for Traffic Prediction. IEEE T-ITS.

mod cell;
mod config;
mod model;

pub use cell::TGCNCell;
pub use config::TGCNConfig;
pub use model::TGCN;
