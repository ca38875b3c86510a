use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::quality::QualityControlConfig;

use super::cross_file::encode_cross_file_key;
use super::dependency::RawDependency;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Skipped,
}

/// One unit of agent work with canonical dependency keys.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Task {
    pub number: String,
    pub name: String,
    pub prompt: String,

    #[serde(default)]
    pub files: Vec<String>,

    /// Canonical keys: a local task number or `file:<name>:task:<id>`.
    #[serde(default)]
    pub depends_on: Vec<String>,

    /// Empty when no agent was requested.
    #[serde(default)]
    pub agent: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worktree_group: Option<String>,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub files_modified: u32,

    #[serde(default)]
    pub files_created: u32,

    #[serde(default)]
    pub files_deleted: u32,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub success_criteria: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub test_commands: Vec<String>,

    /// Plan file this task was loaded from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
}

impl Task {
    pub fn new(
        number: impl Into<String>,
        name: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            number: number.into(),
            name: name.into(),
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = deps.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_source_file(mut self, source_file: impl Into<String>) -> Self {
        self.source_file = Some(source_file.into());
        self
    }

    /// Globally unambiguous name used in diagnostics.
    pub fn label(&self) -> String {
        match self.source_file.as_deref() {
            Some(file) if !file.is_empty() => encode_cross_file_key(file, &self.number),
            _ => self.number.clone(),
        }
    }
}

/// Tasks intended to run concurrently once every earlier wave has finished.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Wave {
    pub name: String,

    /// Task numbers, or canonical cross-file keys for numbers shared by several files.
    #[serde(default)]
    pub task_numbers: Vec<String>,

    #[serde(default)]
    pub max_concurrency: usize,

    /// Worktree group id -> tasks of this wave in that group.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub group_info: BTreeMap<String, Vec<String>>,

    /// Plan file that declared this wave; bare task numbers resolve there first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorktreeGroup {
    pub group_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub execution_model: String,
    #[serde(default)]
    pub isolation: String,
    #[serde(default)]
    pub rationale: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlannerCompliance {
    #[serde(default)]
    pub planner_version: String,
    #[serde(default)]
    pub strict_enforcement: bool,
    #[serde(default)]
    pub required_features: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DataFlowEntry {
    pub task_number: String,
    #[serde(default)]
    pub description: String,
}

/// Which tasks produce and consume named symbols or artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DataFlowRegistry {
    #[serde(default)]
    pub producers: BTreeMap<String, Vec<DataFlowEntry>>,
    #[serde(default)]
    pub consumers: BTreeMap<String, Vec<DataFlowEntry>>,
}

/// The unit handed to the wave executor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub tasks: Vec<Task>,

    #[serde(default)]
    pub waves: Vec<Wave>,

    #[serde(default)]
    pub worktree_groups: Vec<WorktreeGroup>,

    /// Source file -> task numbers defined in it.
    #[serde(default)]
    pub file_to_task_map: BTreeMap<String, Vec<String>>,

    #[serde(default)]
    pub quality_control: QualityControlConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planner_compliance: Option<PlannerCompliance>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_flow_registry: Option<DataFlowRegistry>,
}

/// A task as written in a plan file, before normalization.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTask {
    #[serde(default)]
    pub number: Option<RawDependency>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub depends_on: Vec<RawDependency>,
    #[serde(default)]
    pub agent: String,
    #[serde(default)]
    pub worktree_group: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub success_criteria: Vec<String>,
    #[serde(default)]
    pub test_commands: Vec<String>,
}

/// The Parser's output for a single plan file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPlanFragment {
    #[serde(default)]
    pub name: String,

    /// File name used for cross-file references; set by the loader when absent.
    #[serde(default)]
    pub source_file: Option<String>,

    #[serde(default)]
    pub tasks: Vec<RawTask>,

    #[serde(default)]
    pub waves: Vec<Wave>,

    #[serde(default)]
    pub worktree_groups: Vec<WorktreeGroup>,

    #[serde(default)]
    pub quality_control: QualityControlConfig,

    #[serde(default)]
    pub planner_compliance: Option<PlannerCompliance>,

    #[serde(default)]
    pub data_flow_registry: Option<DataFlowRegistry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_prefers_cross_file_form() {
        let task = Task::new("2", "Build", "do it");
        assert_eq!(task.label(), "2");
        assert_eq!(task.with_source_file("a.yaml").label(), "file:a.yaml:task:2");
    }

    #[test]
    fn task_status_uses_snake_case() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }
}
