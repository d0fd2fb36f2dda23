//! T-GCN model configuration and validation

use serde::{Deserialize, Serialize};

use crate::error::{Result, TgcnError};
use crate::nn::{Aggregation, OutputActivation};

fn default_layers() -> i64 {
    2
}

fn default_heads() -> usize {
    1
}

/// Configuration for a [`super::TGCN`] model.
///
/// # Example
///
/// ```
/// use tgcn::nn::{Aggregation, OutputActivation, TGCNConfig};
///
/// let config = TGCNConfig::new(2, 1, 16)
///     .with_layers(3)
///     .with_aggregation(Aggregation::DegreeNormalized)
///     .with_output_activation(OutputActivation::Relu)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.effective_layers(), 3);
///
/// let json = config.to_json().unwrap();
/// assert_eq!(TGCNConfig::from_json(&json).unwrap(), config);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TGCNConfig {
    /// Input features per node per time step
    pub in_channels: usize,

    /// Output features per node
    pub out_channels: usize,

    /// Hidden state width of every layer
    pub hidden_size: usize,

    /// Number of stacked recurrent layers; values below 1 mean 1
    #[serde(default = "default_layers")]
    pub layers_nb: i64,

    /// Activation applied after the output projection (identity if None)
    #[serde(default)]
    pub output_activation: Option<OutputActivation>,

    /// Spatial aggregation strategy shared by every cell
    #[serde(default)]
    pub aggregation: Aggregation,

    /// Attention heads per convolution (attention aggregation only)
    #[serde(default = "default_heads")]
    pub attention_heads: usize,

    /// Seed for parameter initialization (None draws from OS entropy)
    #[serde(default)]
    pub seed: Option<u64>,
}

impl TGCNConfig {
    /// Create a configuration with two layers, attention aggregation and no
    /// output activation.
    #[must_use]
    pub fn new(in_channels: usize, out_channels: usize, hidden_size: usize) -> Self {
        Self {
            in_channels,
            out_channels,
            hidden_size,
            layers_nb: default_layers(),
            output_activation: None,
            aggregation: Aggregation::default(),
            attention_heads: default_heads(),
            seed: None,
        }
    }

    /// Number of layers actually built: `max(1, layers_nb)`.
    #[must_use]
    pub fn effective_layers(&self) -> usize {
        usize::try_from(self.layers_nb.max(1)).unwrap_or(usize::MAX)
    }

    /// Validate configuration parameters
    ///
    /// # Errors
    ///
    /// Returns [`TgcnError::InvalidConfiguration`] for a zero channel count,
    /// hidden size or head count. `layers_nb` is never rejected.
    pub fn validate(&self) -> Result<()> {
        for (param, value) in [
            ("in_channels", self.in_channels),
            ("out_channels", self.out_channels),
            ("hidden_size", self.hidden_size),
            ("attention_heads", self.attention_heads),
        ] {
            if value == 0 {
                return Err(TgcnError::config(param, value, "> 0"));
            }
        }
        Ok(())
    }

    /// Set the number of layers (clamped to at least one when built).
    #[must_use]
    pub fn with_layers(mut self, layers_nb: i64) -> Self {
        self.layers_nb = layers_nb;
        self
    }

    /// Set the output activation.
    #[must_use]
    pub fn with_output_activation(mut self, activation: OutputActivation) -> Self {
        self.output_activation = Some(activation);
        self
    }

    /// Set the aggregation strategy.
    #[must_use]
    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = aggregation;
        self
    }

    /// Set the number of attention heads with validation
    ///
    /// # Errors
    ///
    /// Returns [`TgcnError::InvalidConfiguration`] if `heads` is zero.
    pub fn with_attention_heads(mut self, heads: usize) -> Result<Self> {
        if heads == 0 {
            return Err(TgcnError::config("attention_heads", heads, "> 0"));
        }
        self.attention_heads = heads;
        Ok(self)
    }

    /// Set the initialization seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parse and validate a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`TgcnError::InvalidConfiguration`] if the document is
    /// malformed or fails [`TGCNConfig::validate`].
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| TgcnError::config("config", e, "a valid T-GCN configuration document"))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`TgcnError::InvalidConfiguration`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| TgcnError::config("config", e, "a serializable configuration"))
    }
}
