//! # SWATS: Switching from Adam to SGD
//!
//! Trains with Adam until its bias-corrected learning-rate estimate departs
//! from the raw learning rate (Keskar & Socher, arXiv:1712.07628), then hands
//! the model to SGD at the learning rate observed at the switch.
//!
//! ## Architecture
//!
//! - **train**: Trainer loop, callbacks, early stopping and the [`AdamToSgd`](train::AdamToSgd) switch
//! - **optim**: Optimizers (Adam, SGD) and gradient clipping
//! - **config**: Declarative YAML configuration
//! - **run**: Two-phase Adam-then-SGD driver

pub mod config;
pub mod optim;
pub mod run;
pub mod train;

pub mod error;
mod tensor;

// Re-export commonly used types
pub use error::{Error, Result};
pub use run::{run_swats, SwatsReport};
pub use tensor::Tensor;
