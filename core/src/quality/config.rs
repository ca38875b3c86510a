use serde::{Deserialize, Serialize};

use crate::error::PlanError;

/// How reviewer agents are chosen for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QcAgentMode {
    /// Pick reviewers from the task's files and agent.
    #[default]
    Auto,
    /// Use `explicit_list` only.
    Explicit,
    /// Automatic selection plus `additional`.
    Mixed,
    /// Let a selector agent decide.
    Intelligent,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QcAgentConfig {
    #[serde(default)]
    pub mode: QcAgentMode,
    #[serde(default)]
    pub explicit_list: Vec<String>,
    #[serde(default)]
    pub additional: Vec<String>,
    #[serde(default)]
    pub blocked: Vec<String>,
}

/// Post-task review policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityControlConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_review_agent")]
    pub review_agent: String,

    #[serde(default)]
    pub agents: QcAgentConfig,

    /// Retries granted to a task whose review comes back RED.
    #[serde(default = "default_retry_on_red")]
    pub retry_on_red: u32,
}

fn default_review_agent() -> String {
    "quality-control".to_string()
}

fn default_retry_on_red() -> u32 {
    2
}

impl Default for QualityControlConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            review_agent: default_review_agent(),
            agents: QcAgentConfig::default(),
            retry_on_red: default_retry_on_red(),
        }
    }
}

impl QualityControlConfig {
    /// Reject agent selections that cannot be satisfied.
    ///
    /// A disabled config is never checked.
    pub fn validate(&self) -> Result<(), PlanError> {
        if !self.enabled {
            return Ok(());
        }

        let agents = &self.agents;
        if agents.mode == QcAgentMode::Explicit && agents.explicit_list.is_empty() {
            return Err(PlanError::InvalidQualityControl(
                "explicit mode requires a non-empty explicit_list".to_string(),
            ));
        }

        if let Some(agent) = agents
            .explicit_list
            .iter()
            .chain(agents.additional.iter())
            .find(|a| agents.blocked.contains(*a))
        {
            return Err(PlanError::InvalidQualityControl(format!(
                "agent '{agent}' is both requested and blocked"
            )));
        }

        Ok(())
    }
}
