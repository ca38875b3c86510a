pub mod codes;
#[allow(clippy::module_inception)]
pub mod error;
pub mod plan;

pub use codes::ErrorCode;
pub use error::CliError;
pub use plan::{CrossFileError, PlanError};
