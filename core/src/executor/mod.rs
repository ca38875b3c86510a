//! Dependency graph, wave scheduling and run metrics for compiled plans.
//!
//! It provides:
//! - Task dependency graph construction and cycle detection
//! - Topological staging into waves
//! - Aggregation of per-task results into run metrics
//!
//! # Architecture
//!
//! ```text
//! Plan (merged)
//!   ↓
//! resolve_plan_graph() → TaskGraph { labels, edges, reverse_edges }
//!   ↓
//! TaskGraph::validate() → find_cycle()
//!   ↓
//! calculate_waves() / validate_waves() → Vec<Wave>
//!   ↓
//! (execution) → Vec<TaskResult>
//!   ↓
//! ExecutionResult::from_results() → ExecutionResult
//! ```

mod graph;
mod metrics;
mod waves;
pub mod types;

pub use graph::{find_cycle, has_cycle, TaskGraph};
pub use metrics::aggregate_results;
pub use types::{ExecutionResult, ResultStatus, TaskLike, TaskResult};
pub use waves::{calculate_waves, validate_waves};
