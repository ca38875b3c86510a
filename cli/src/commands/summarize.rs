use std::time::Duration;

use planwave_core::api as core_api;

use crate::commands::cli::{OutputFormat, SummarizeArgs};

/// Handle summarize command
pub fn handle_summarize(args: SummarizeArgs) -> Result<i32, core_api::CliError> {
    let results = core_api::read_task_results_file(&args.results)?;
    let duration = match args.duration_ms {
        Some(ms) => Duration::from_millis(ms),
        None => results.iter().map(|r| r.duration).sum(),
    };
    let summary = core_api::aggregate_results(&results, duration);

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&summary)
                .map_err(|e| core_api::CliError::Command(format!("serialize summary: {e}")))?;
            println!("{json}");
        }
        OutputFormat::Text => print!("{}", render_summary(&summary)),
    }

    Ok(if summary.failed > 0 { 1 } else { 0 })
}

fn render_summary(summary: &core_api::ExecutionResult) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "tasks: {} total, {} completed, {} failed\n",
        summary.total_tasks, summary.completed, summary.failed
    ));
    out.push_str(&format!(
        "duration: {:.1}s (avg {:.1}s per task)\n",
        summary.duration.as_secs_f64(),
        summary.avg_task_duration.as_secs_f64()
    ));
    let breakdown: Vec<String> = summary
        .status_breakdown
        .iter()
        .map(|(status, count)| format!("{status}={count}"))
        .collect();
    out.push_str(&format!("status: {}\n", breakdown.join(" ")));
    for (agent, count) in &summary.agent_usage {
        let agent = if agent.is_empty() { "(none)" } else { agent };
        out.push_str(&format!("agent {agent}: {count}\n"));
    }
    out.push_str(&format!(
        "files: {}, lines +{} -{}\n",
        summary.total_files, summary.total_lines_added, summary.total_lines_deleted
    ));
    for failed in &summary.failed_tasks {
        out.push_str(&format!(
            "failed: {} {} ({})\n",
            failed.task.label(),
            failed.task.name,
            failed.status
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_breakdown_and_failures() {
        let mut task = core_api::Task::new("2", "Build", "p");
        task.agent = "rust-pro".to_string();
        let results = vec![core_api::TaskResult::new(
            task,
            core_api::ResultStatus::Red,
            Duration::from_secs(3),
        )];
        let text = render_summary(&core_api::aggregate_results(&results, Duration::from_secs(3)));

        assert!(text.contains("tasks: 1 total, 0 completed, 1 failed"));
        assert!(text.contains("status: GREEN=0 YELLOW=0 RED=1"));
        assert!(text.contains("agent rust-pro: 1"));
        assert!(text.contains("failed: 2 Build (RED)"));
    }
}
