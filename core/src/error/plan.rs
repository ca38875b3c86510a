use thiserror::Error;

use super::codes::ErrorCode;

/// Errors raised while decoding a canonical `file:<name>:task:<id>` key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CrossFileError {
    #[error("'{0}' is not a cross-file dependency key")]
    NotCrossFile(String),

    #[error("cross-file dependency '{0}' has an empty file name")]
    EmptyFile(String),

    #[error("cross-file dependency '{0}' has an empty task id")]
    EmptyTask(String),

    #[error("file name '{0}' cannot be encoded unambiguously (it contains or ends with ':task')")]
    ReservedSeparator(String),
}

/// Structural defects found while compiling, merging or validating a plan.
///
/// None of these are recoverable: a plan that produces any of them must not
/// be handed to the wave executor.
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("unsupported dependency format: {value}")]
    UnsupportedDependency { value: String },

    #[error("malformed cross-file dependency: {0}")]
    MalformedDependency(String),

    #[error("invalid cross-file dependency: {0}")]
    CrossFileFormat(#[from] CrossFileError),

    #[error("circular dependency detected: {}", path.join(" -> "))]
    CycleDetected { path: Vec<String> },

    #[error("unresolved dependency: task '{task}' depends on '{dependency}'")]
    UnresolvedReference { task: String, dependency: String },

    #[error(
        "ambiguous dependency: task '{task}' depends on '{dependency}', which matches {}",
        candidates.join(", ")
    )]
    AmbiguousReference {
        task: String,
        dependency: String,
        candidates: Vec<String>,
    },

    #[error("task '{task}' is missing required field '{field}'")]
    MissingField { task: String, field: &'static str },

    #[error("duplicate task number '{number}' in {source_file}")]
    DuplicateTaskNumber { number: String, source_file: String },

    #[error("invalid task number: {0}")]
    InvalidTaskNumber(String),

    #[error("task '{task}' depends on '{dependency}', which is not scheduled before wave '{wave}'")]
    WaveOrderViolation {
        task: String,
        dependency: String,
        wave: String,
    },

    #[error("wave '{wave}' references unknown task '{task}'")]
    UnknownWaveTask { wave: String, task: String },

    #[error(
        "wave '{wave}' lists task '{task}', which matches {}",
        candidates.join(", ")
    )]
    AmbiguousWaveTask {
        wave: String,
        task: String,
        candidates: Vec<String>,
    },

    #[error("task '{0}' appears in more than one wave")]
    DuplicateWaveTask(String),

    #[error("task '{0}' is not scheduled in any wave")]
    TaskNotScheduled(String),

    #[error("invalid quality control config: {0}")]
    InvalidQualityControl(String),

    #[error("no plan fragments to compile")]
    NoFragments,

    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },
}

impl PlanError {
    /// Map plan error to protocol error code
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::UnsupportedDependency { .. } => ErrorCode::DependencyFormat,
            Self::MalformedDependency(_) => ErrorCode::DependencyFormat,
            Self::CrossFileFormat(_) => ErrorCode::DependencyFormat,
            Self::CycleDetected { .. } => ErrorCode::CircularDependency,
            Self::UnresolvedReference { .. } => ErrorCode::DependencyError,
            Self::AmbiguousReference { .. } => ErrorCode::DependencyError,
            Self::MissingField { .. } => ErrorCode::ValidationError,
            Self::DuplicateTaskNumber { .. } => ErrorCode::ValidationError,
            Self::InvalidTaskNumber(_) => ErrorCode::ValidationError,
            Self::WaveOrderViolation { .. } => ErrorCode::WaveError,
            Self::UnknownWaveTask { .. } => ErrorCode::TaskNotFound,
            Self::AmbiguousWaveTask { .. } => ErrorCode::WaveError,
            Self::DuplicateWaveTask(_) => ErrorCode::WaveError,
            Self::TaskNotScheduled(_) => ErrorCode::WaveError,
            Self::InvalidQualityControl(_) => ErrorCode::QualityControlError,
            Self::NoFragments => ErrorCode::ValidationError,
            Self::Io { source, .. } => match source.kind() {
                std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
                std::io::ErrorKind::PermissionDenied => ErrorCode::FileAccessDenied,
                _ => ErrorCode::GeneralError,
            },
            Self::Parse { .. } => ErrorCode::ParseError,
        }
    }
}
