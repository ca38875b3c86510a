use std::path::{Path, PathBuf};

use anyhow::Context;

use super::types::AppConfig;

pub const CONFIG_DIR: &str = ".planwave";
pub const CONFIG_FILE: &str = "config.toml";

/// Where configuration is looked up. Passed in explicitly so callers and tests
/// decide which directories count.
#[derive(Debug, Clone, Default)]
pub struct ConfigSource {
    pub repo_root: Option<PathBuf>,
    pub home_dir: Option<PathBuf>,
}

impl ConfigSource {
    pub fn new(repo_root: Option<PathBuf>, home_dir: Option<PathBuf>) -> Self {
        Self {
            repo_root,
            home_dir,
        }
    }

    /// Config files in priority order, highest first.
    pub fn candidates(&self) -> Vec<PathBuf> {
        [self.home_dir.as_ref(), self.repo_root.as_ref()]
            .into_iter()
            .flatten()
            .map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
            .collect()
    }
}

pub fn load_from_path(path: &Path) -> anyhow::Result<AppConfig> {
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let cfg = toml::from_str::<AppConfig>(&s)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    Ok(cfg)
}

pub fn load_default(source: &ConfigSource) -> anyhow::Result<AppConfig> {
    // Priority 1: <home>/.planwave/config.toml (highest)
    // Priority 2: <repo_root>/.planwave/config.toml
    let cfg = match source.candidates().into_iter().find(|p| p.exists()) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            load_from_path(&path)?
        }
        None => AppConfig::default(),
    };
    Ok(cfg)
}

/// Apply `PLANWAVE_*` overrides read through `lookup`.
///
/// Blank values are ignored; unparsable ones are errors.
pub fn apply_env_overrides<F>(cfg: &mut AppConfig, lookup: F) -> anyhow::Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = get("PLANWAVE_MAX_CONCURRENCY") {
        cfg.max_concurrency = v
            .trim()
            .parse()
            .with_context(|| format!("PLANWAVE_MAX_CONCURRENCY: invalid value '{v}'"))?;
    }
    if let Some(v) = get("PLANWAVE_LOG_LEVEL") {
        cfg.logging.level = v.trim().to_string();
    }
    if let Some(v) = get("PLANWAVE_QC_ENABLED") {
        cfg.quality_control.enabled = parse_bool(&v)
            .with_context(|| format!("PLANWAVE_QC_ENABLED: invalid value '{v}'"))?;
    }
    Ok(())
}

fn parse_bool(v: &str) -> anyhow::Result<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("expected a boolean, got '{other}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn write_config(root: &Path, body: &str) {
        let dir = root.join(CONFIG_DIR);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(CONFIG_FILE), body).unwrap();
    }

    #[test]
    fn defaults_when_nothing_exists() {
        let tmp = tempfile::tempdir().unwrap();
        let source = ConfigSource::new(Some(tmp.path().join("repo")), Some(tmp.path().join("home")));
        let cfg = load_default(&source).unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.max_concurrency, 3);
        assert!(!cfg.logging.file);
    }

    #[test]
    fn home_config_wins_over_repo_config() {
        let home = tempfile::tempdir().unwrap();
        let repo = tempfile::tempdir().unwrap();
        write_config(home.path(), "max_concurrency = 8\n");
        write_config(repo.path(), "max_concurrency = 2\n");

        let both = ConfigSource::new(Some(repo.path().into()), Some(home.path().into()));
        assert_eq!(load_default(&both).unwrap().max_concurrency, 8);

        let repo_only = ConfigSource::new(Some(repo.path().into()), None);
        assert_eq!(load_default(&repo_only).unwrap().max_concurrency, 2);
    }

    #[test]
    fn parses_quality_control_section() {
        let repo = tempfile::tempdir().unwrap();
        write_config(
            repo.path(),
            r#"
[quality_control]
enabled = true
review_agent = "code-reviewer"
retry_on_red = 1

[quality_control.agents]
mode = "explicit"
explicit_list = ["rust-pro"]
"#,
        );
        let cfg = load_default(&ConfigSource::new(Some(repo.path().into()), None)).unwrap();
        assert!(cfg.quality_control.enabled);
        assert_eq!(cfg.quality_control.review_agent, "code-reviewer");
        assert_eq!(cfg.quality_control.agents.explicit_list, vec!["rust-pro"]);
        cfg.validate().unwrap();
    }

    #[test]
    fn env_overrides_apply_through_lookup() {
        let env: HashMap<&str, &str> = [
            ("PLANWAVE_MAX_CONCURRENCY", "6"),
            ("PLANWAVE_LOG_LEVEL", "debug"),
            ("PLANWAVE_QC_ENABLED", "yes"),
        ]
        .into_iter()
        .collect();

        let mut cfg = AppConfig::default();
        apply_env_overrides(&mut cfg, |k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(cfg.max_concurrency, 6);
        assert_eq!(cfg.logging.level, "debug");
        assert!(cfg.quality_control.enabled);
    }

    #[test]
    fn bad_env_values_are_errors() {
        let mut cfg = AppConfig::default();
        let err = apply_env_overrides(&mut cfg, |k| {
            (k == "PLANWAVE_MAX_CONCURRENCY").then(|| "lots".to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains("PLANWAVE_MAX_CONCURRENCY"));

        let blank = apply_env_overrides(&mut cfg, |_| Some("  ".to_string()));
        assert!(blank.is_ok());
        assert_eq!(cfg.max_concurrency, 3);
    }

    #[test]
    fn zero_concurrency_is_invalid() {
        let cfg = AppConfig {
            max_concurrency: 0,
            ..AppConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
