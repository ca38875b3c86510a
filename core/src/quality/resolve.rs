use crate::plan::Plan;

use super::config::QualityControlConfig;

/// Pick the quality-control policy a plan runs with.
///
/// A plan that has not enabled QC adopts an enabled global policy wholesale.
/// In every other case the plan's own policy stands, field for field, even
/// where it left values at their defaults.
pub fn resolve_quality_control(
    plan_qc: &QualityControlConfig,
    global_qc: &QualityControlConfig,
) -> QualityControlConfig {
    if !plan_qc.enabled && global_qc.enabled {
        global_qc.clone()
    } else {
        plan_qc.clone()
    }
}

impl Plan {
    /// Apply the global policy once for the whole plan. Returns true when it was adopted.
    pub fn apply_global_quality_control(&mut self, global_qc: &QualityControlConfig) -> bool {
        let adopt = !self.quality_control.enabled && global_qc.enabled;
        if adopt {
            tracing::debug!(
                plan = %self.name,
                review_agent = %global_qc.review_agent,
                "plan quality control disabled, adopting global config"
            );
            self.quality_control = global_qc.clone();
        }
        adopt
    }
}
