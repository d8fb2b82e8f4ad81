//! YAML schema for a SWATS run

use crate::train::EarlyStoppingConfig;
use serde::{Deserialize, Serialize};

/// Complete SWATS run specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwatsSpec {
    /// Adam phase optimizer
    pub optimizer: AdamSpec,

    /// SGD phase optimizer
    #[serde(default)]
    pub sgd: SgdSpec,

    /// Early-stopping options passed through to the switching callback
    #[serde(default)]
    pub early_stopping: EarlyStoppingConfig,

    /// Training hyperparameters
    #[serde(default)]
    pub training: TrainingParams,
}

/// Adam hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdamSpec {
    /// Learning rate
    pub lr: f32,

    #[serde(default = "default_beta1")]
    pub beta1: f32,

    /// Second-moment decay inspected by the switching rule
    #[serde(default = "default_beta2")]
    pub beta2: f32,

    #[serde(default = "default_epsilon")]
    pub epsilon: f32,
}

/// SGD hyperparameters; the learning rate comes from the switch point
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SgdSpec {
    #[serde(default)]
    pub momentum: f32,
}

/// Training hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingParams {
    /// Epoch budget for the Adam phase
    #[serde(default = "default_epochs")]
    pub epochs: usize,

    /// Epoch budget for the SGD phase
    #[serde(default = "default_epochs")]
    pub sgd_epochs: usize,

    /// Gradient clipping threshold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grad_clip: Option<f32>,

    /// Log every N steps
    #[serde(default = "default_log_interval")]
    pub log_interval: usize,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            epochs: default_epochs(),
            sgd_epochs: default_epochs(),
            grad_clip: None,
            log_interval: default_log_interval(),
        }
    }
}

fn default_beta1() -> f32 {
    0.9
}

fn default_beta2() -> f32 {
    0.999
}

fn default_epsilon() -> f32 {
    1e-8
}

fn default_epochs() -> usize {
    10
}

fn default_log_interval() -> usize {
    10
}
