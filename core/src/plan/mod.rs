//! Plan model and compilation: dependency normalization, cross-file keys,
//! fragment compilation and merging.

pub mod compile;
pub mod cross_file;
pub mod dependency;
pub mod merge;
pub mod resolve;
pub mod serde_utils;
pub mod types;
pub mod validate;

pub use compile::{compile_fragment, PlanCompiler};
pub use cross_file::{
    decode_cross_file_key, encode_cross_file_key, is_cross_file_key, CrossFileDependency,
};
pub use dependency::{normalize_dependencies, normalize_dependency, normalize_scalar, RawDependency};
pub use merge::merge_plans;
pub use resolve::resolve_plan_graph;
pub use serde_utils::{
    fragment_from_json_str, fragment_from_yaml_str, plan_to_pretty_json, read_fragment_file,
    read_task_results_file, task_results_from_json,
};
pub use types::{
    DataFlowEntry, DataFlowRegistry, Plan, PlannerCompliance, RawPlanFragment, RawTask, Task,
    TaskStatus, Wave, WorktreeGroup,
};
pub use validate::{validate_fragment_tasks, validate_task};
