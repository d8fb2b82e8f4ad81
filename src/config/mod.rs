//! Declarative YAML configuration
//!
//! # Example
//!
//! ```yaml
//! optimizer:
//!   lr: 0.001
//!   beta2: 0.999
//!
//! sgd:
//!   momentum: 0.9
//!
//! early_stopping:
//!   restore_best_weights: true
//!   verbose: 1
//!
//! training:
//!   epochs: 20
//!   sgd_epochs: 20
//! ```

mod builder;
mod load;
mod schema;
mod validate;


pub use builder::{build_adam, build_sgd, build_train_config};
pub use load::{load_config, parse_config};
pub use schema::{AdamSpec, SgdSpec, SwatsSpec, TrainingParams};
pub use validate::{validate_config, ValidationError};
