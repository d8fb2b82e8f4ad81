//! Optimizers for the two SWATS phases
//!
//! Adam drives the first phase; its second-moment decay (`beta2`) is what the
//! switching callback inspects. SGD takes over once the switch fires.

mod adam;
mod clip;
mod optimizer;
mod sgd;

pub use adam::Adam;
pub use clip::clip_grad_norm;
pub use optimizer::Optimizer;
pub use sgd::SGD;
