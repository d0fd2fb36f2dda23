//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use tgcn::prelude::*;
//! ```

pub use crate::error::{Result, TgcnError};
pub use crate::nn::gnn::Graph;
pub use crate::nn::{
    Aggregation, GraphModule, Module, OutputActivation, TGCNCell, TGCNConfig, TGCN,
};
pub use crate::tensor::{stack_time, Tensor};
