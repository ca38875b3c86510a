//! Stable re-exports for consumers (`cli` and external crates).
//!
//! Prefer importing from `planwave_core::api` instead of reaching into internal modules.

pub use crate::config::{
    apply_env_overrides, load_default, load_from_path, AppConfig, ConfigSource,
    LoggingConfig,
};
pub use crate::error::{CliError, CrossFileError, ErrorCode, PlanError};
pub use crate::executor::{
    aggregate_results, calculate_waves, find_cycle, has_cycle, validate_waves, ExecutionResult,
    ResultStatus, TaskGraph, TaskLike, TaskResult,
};
pub use crate::plan::{
    compile_fragment, decode_cross_file_key, encode_cross_file_key, is_cross_file_key,
    merge_plans, normalize_dependencies, normalize_dependency, plan_to_pretty_json,
    read_fragment_file, read_task_results_file, resolve_plan_graph, CrossFileDependency, Plan,
    PlanCompiler, RawDependency, RawPlanFragment, Task, TaskStatus, Wave, WorktreeGroup,
};
pub use crate::quality::{
    resolve_quality_control, QcAgentConfig, QcAgentMode, QualityControlConfig,
};
