use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::plan::Task;

/// Outcome of one task after execution and review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResultStatus {
    /// Review passed
    Green,
    /// Review passed with warnings
    Yellow,
    /// Review failed
    Red,
    /// The agent run itself failed
    Failed,
}

impl ResultStatus {
    /// Quality-control verdicts, always present in a status breakdown.
    pub const QC_VERDICTS: [ResultStatus; 3] = [Self::Green, Self::Yellow, Self::Red];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Green => "GREEN",
            Self::Yellow => "YELLOW",
            Self::Red => "RED",
            Self::Failed => "FAILED",
        }
    }

    pub fn is_failure(self) -> bool {
        matches!(self, Self::Failed | Self::Red)
    }
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of executing a single task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub task: Task,

    pub status: ResultStatus,

    /// Captured output (may be truncated)
    #[serde(default)]
    pub output: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, rename = "duration_ms", with = "duration_millis")]
    pub duration: Duration,

    #[serde(default)]
    pub retry_count: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_feedback: Option<String>,

    #[serde(default)]
    pub lines_added: u64,

    #[serde(default)]
    pub lines_deleted: u64,
}

impl TaskResult {
    pub fn new(task: Task, status: ResultStatus, duration: Duration) -> Self {
        Self {
            task,
            status,
            output: String::new(),
            error: None,
            duration,
            retry_count: 0,
            review_feedback: None,
            lines_added: 0,
            lines_deleted: 0,
        }
    }
}

/// Aggregate view of a run, derived entirely from its `TaskResult`s.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ExecutionResult {
    pub total_tasks: usize,

    pub completed: usize,

    pub failed: usize,

    /// Wall-clock duration of the whole run
    #[serde(rename = "duration_ms", with = "duration_millis")]
    pub duration: Duration,

    pub failed_tasks: Vec<TaskResult>,

    pub status_breakdown: BTreeMap<ResultStatus, usize>,

    /// Agent name -> tasks run by it; `""` only when some task had no agent.
    pub agent_usage: BTreeMap<String, usize>,

    /// Distinct files touched across all tasks
    pub total_files: usize,

    pub total_lines_added: u64,

    pub total_lines_deleted: u64,

    #[serde(rename = "avg_task_duration_ms", with = "duration_millis")]
    pub avg_task_duration: Duration,
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
