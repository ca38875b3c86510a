//! Quality-control policy attached to a plan and its resolution against the
//! global configuration.

mod config;
mod resolve;

pub use config::{QcAgentConfig, QcAgentMode, QualityControlConfig};
pub use resolve::resolve_quality_control;
