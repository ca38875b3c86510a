use thiserror::Error;

use super::plan::PlanError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("plan error: {0}")]
    Plan(#[from] PlanError),
    #[error("config error: {0}")]
    Config(String),
    #[error("command failed: {0}")]
    Command(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

impl CliError {
    /// Process exit code for this error.
    ///
    /// 11: config, 12: plan validation, 20: io, 50: internal/uncategorized.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 11,
            Self::Plan(PlanError::Io { .. }) => 20,
            Self::Plan(_) => 12,
            Self::Io(_) => 20,
            Self::Command(_) => 20,
            Self::Anyhow(_) => 50,
        }
    }
}
