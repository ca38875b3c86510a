use std::collections::BTreeMap;

use crate::config::AppConfig;
use crate::error::PlanError;
use crate::executor::{self, calculate_waves, validate_waves};
use crate::quality::QualityControlConfig;

use super::dependency::{normalize_dependencies, normalize_scalar};
use super::merge::merge_with_graph;
use super::types::{Plan, RawPlanFragment, RawTask, Task};
use super::validate::validate_fragment_tasks;

/// Turn one parsed plan file into a [`Plan`] with canonical dependency keys.
///
/// The fragment is checked on its own: required fields, repeated numbers and
/// cycles among its local dependencies. Cross-file keys are left for the merge.
pub fn compile_fragment(fragment: RawPlanFragment) -> Result<Plan, PlanError> {
    let RawPlanFragment {
        name,
        source_file,
        tasks,
        waves,
        worktree_groups,
        quality_control,
        planner_compliance,
        data_flow_registry,
    } = fragment;

    let source_file = source_file.filter(|f| !f.is_empty());

    let tasks = tasks
        .into_iter()
        .map(|raw| compile_task(raw, source_file.as_deref()))
        .collect::<Result<Vec<_>, _>>()?;

    validate_fragment_tasks(&tasks, source_file.as_deref())?;

    if let Some(path) = executor::find_cycle(&tasks) {
        return Err(PlanError::CycleDetected { path });
    }

    let mut waves = waves;
    if let Some(file) = &source_file {
        for wave in waves.iter_mut().filter(|w| w.source_file.is_none()) {
            wave.source_file = Some(file.clone());
        }
    }

    let mut file_to_task_map = BTreeMap::new();
    if let Some(file) = &source_file {
        file_to_task_map.insert(
            file.clone(),
            tasks.iter().map(|t| t.number.clone()).collect(),
        );
    }

    tracing::debug!(
        fragment = %name,
        source_file = source_file.as_deref().unwrap_or("<inline>"),
        tasks = tasks.len(),
        "plan fragment compiled"
    );

    Ok(Plan {
        name,
        tasks,
        waves,
        worktree_groups,
        file_to_task_map,
        quality_control,
        planner_compliance,
        data_flow_registry,
    })
}

fn compile_task(raw: RawTask, source_file: Option<&str>) -> Result<Task, PlanError> {
    let number = match &raw.number {
        Some(number) => {
            normalize_scalar(number).map_err(|e| PlanError::InvalidTaskNumber(e.to_string()))?
        }
        None => String::new(),
    };
    let depends_on = normalize_dependencies(&raw.depends_on)?;

    Ok(Task {
        number,
        name: raw.name,
        prompt: raw.prompt,
        files: raw.files,
        depends_on,
        agent: raw.agent,
        worktree_group: raw.worktree_group,
        status: raw.status,
        success_criteria: raw.success_criteria,
        test_commands: raw.test_commands,
        source_file: source_file.map(str::to_string),
        ..Task::default()
    })
}

/// Compiles parsed plan files into one executable plan.
///
/// Stages run in order and the first error aborts the whole compilation:
/// fragments, merge with global dependency resolution, waves, quality control.
#[derive(Debug, Clone)]
pub struct PlanCompiler {
    max_concurrency: usize,
    quality_control: QualityControlConfig,
}

impl PlanCompiler {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            max_concurrency: config.max_concurrency,
            quality_control: config.quality_control.clone(),
        }
    }

    pub fn compile(&self, fragments: Vec<RawPlanFragment>) -> Result<Plan, PlanError> {
        if fragments.is_empty() {
            return Err(PlanError::NoFragments);
        }

        let plans = fragments
            .into_iter()
            .map(compile_fragment)
            .collect::<Result<Vec<_>, _>>()?;
        let fragment_count = plans.len();

        let (mut plan, graph) = merge_with_graph(plans)?;

        if plan.waves.is_empty() {
            plan.waves = calculate_waves(&plan, &graph, self.max_concurrency)?;
        } else {
            validate_waves(&plan, &graph)?;
            for wave in plan.waves.iter_mut().filter(|w| w.max_concurrency == 0) {
                wave.max_concurrency = self.max_concurrency;
            }
        }

        plan.apply_global_quality_control(&self.quality_control);
        plan.quality_control.validate()?;

        tracing::info!(
            plan = %plan.name,
            fragments = fragment_count,
            tasks = plan.tasks.len(),
            waves = plan.waves.len(),
            qc_enabled = plan.quality_control.enabled,
            "plan compiled"
        );

        Ok(plan)
    }
}
