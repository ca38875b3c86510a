//! `check` and `waves`: compile plan files and report on the result.
use std::path::PathBuf;

use planwave_core::api as core_api;
use planwave_core::plan::read_fragment_file;

use crate::commands::cli::{OutputFormat, PlanFilesArgs, WavesArgs};

fn compile_files(
    files: &[PathBuf],
    cfg: &core_api::AppConfig,
) -> Result<core_api::Plan, core_api::CliError> {
    let fragments = files
        .iter()
        .map(read_fragment_file)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(core_api::PlanCompiler::new(cfg).compile(fragments)?)
}

/// Handle check command
pub fn handle_check(
    args: PlanFilesArgs,
    cfg: &core_api::AppConfig,
) -> Result<i32, core_api::CliError> {
    let plan = compile_files(&args.files, cfg)?;

    println!("Plan \"{}\" is valid", plan.name);
    println!("  files:  {}", plan.file_to_task_map.len());
    println!("  tasks:  {}", plan.tasks.len());
    println!("  waves:  {}", plan.waves.len());
    println!(
        "  quality control: {}",
        if plan.quality_control.enabled {
            format!("enabled (reviewer {})", plan.quality_control.review_agent)
        } else {
            "disabled".to_string()
        }
    );
    Ok(0)
}

/// Handle waves command
pub fn handle_waves(args: WavesArgs, cfg: &core_api::AppConfig) -> Result<i32, core_api::CliError> {
    let plan = compile_files(&args.plan.files, cfg)?;

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&plan.waves)
                .map_err(|e| core_api::CliError::Command(format!("serialize waves: {e}")))?;
            println!("{json}");
        }
        OutputFormat::Text => {
            for wave in &plan.waves {
                println!(
                    "{} (max concurrency {}): {}",
                    wave.name,
                    wave.max_concurrency,
                    wave.task_numbers.join(", ")
                );
                for (group, tasks) in &wave.group_info {
                    println!("  {group}: {}", tasks.join(", "));
                }
            }
        }
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.yaml");
        let b = dir.path().join("b.yaml");
        std::fs::write(&a, "name: A\ntasks:\n  - {number: 1, name: x, prompt: p}\n").unwrap();
        std::fs::write(
            &b,
            "tasks:\n  - {number: 2, name: y, prompt: p, depends_on: [\"file:a.yaml:task:1\"]}\n",
        )
        .unwrap();

        let plan = compile_files(&[a, b], &core_api::AppConfig::default()).unwrap();
        assert_eq!(plan.name, "A");
        assert_eq!(plan.waves.len(), 2);
    }

    #[test]
    fn missing_file_maps_to_io_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let err = compile_files(&[dir.path().join("gone.yaml")], &core_api::AppConfig::default())
            .unwrap_err();
        assert_eq!(err.exit_code(), 20);
    }
}
