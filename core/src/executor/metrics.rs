use std::collections::BTreeSet;
use std::time::Duration;

use super::types::{ExecutionResult, ResultStatus, TaskResult};

impl ExecutionResult {
    /// Aggregate a batch of task results.
    pub fn from_results(results: &[TaskResult], duration: Duration) -> Self {
        let mut out = Self::default();
        out.recompute(results, duration);
        out
    }

    /// Recompute every field from `results`, discarding whatever was there.
    ///
    /// Produces exactly what [`ExecutionResult::from_results`] produces for the
    /// same input, so progress reporting can refresh one value in place.
    pub fn recompute(&mut self, results: &[TaskResult], duration: Duration) {
        self.total_tasks = results.len();
        self.duration = duration;
        self.completed = 0;
        self.failed = 0;
        self.failed_tasks.clear();
        self.total_lines_added = 0;
        self.total_lines_deleted = 0;

        self.status_breakdown.clear();
        for status in ResultStatus::QC_VERDICTS {
            self.status_breakdown.insert(status, 0);
        }

        self.agent_usage.clear();
        self.agent_usage.insert(String::new(), 0);

        let mut files: BTreeSet<&str> = BTreeSet::new();
        let mut total_duration = Duration::ZERO;

        for result in results {
            *self.status_breakdown.entry(result.status).or_insert(0) += 1;
            *self
                .agent_usage
                .entry(result.task.agent.clone())
                .or_insert(0) += 1;

            files.extend(result.task.files.iter().map(String::as_str));
            self.total_lines_added += result.lines_added;
            self.total_lines_deleted += result.lines_deleted;
            total_duration = total_duration.saturating_add(result.duration);

            if result.status.is_failure() {
                self.failed += 1;
                self.failed_tasks.push(result.clone());
            } else {
                self.completed += 1;
            }
        }

        if self.agent_usage.get("") == Some(&0) {
            self.agent_usage.remove("");
        }

        self.total_files = files.len();
        self.avg_task_duration = average(total_duration, results.len());

        tracing::debug!(
            total = self.total_tasks,
            completed = self.completed,
            failed = self.failed,
            "execution metrics recomputed"
        );
    }
}

/// Free-function form of [`ExecutionResult::from_results`].
pub fn aggregate_results(results: &[TaskResult], duration: Duration) -> ExecutionResult {
    ExecutionResult::from_results(results, duration)
}

fn average(total: Duration, count: usize) -> Duration {
    if count == 0 {
        return Duration::ZERO;
    }
    let nanos = total.as_nanos() / count as u128;
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}
