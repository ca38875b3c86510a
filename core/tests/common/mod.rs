#![allow(dead_code)]

use std::path::{Path, PathBuf};

use planwave_core::plan::{fragment_from_yaml_str, RawPlanFragment};

pub fn fragment(source_file: &str, yaml: &str) -> RawPlanFragment {
    fragment_from_yaml_str(source_file, yaml)
        .unwrap_or_else(|e| panic!("fixture {source_file} failed to parse: {e}"))
}

pub fn write_plan(dir: &Path, name: &str, yaml: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, yaml).expect("write plan fixture");
    path
}

pub fn task_numbers(plan: &planwave_core::plan::Plan) -> Vec<&str> {
    plan.tasks.iter().map(|t| t.number.as_str()).collect()
}

pub const PLAN_A: &str = r#"
name: Foundation
tasks:
  - number: 1
    name: Scaffold
    prompt: Create the workspace
    files: [Cargo.toml]
  - number: 2
    name: Models
    prompt: Define the data model
    depends_on: [1]
    files: [src/model.rs]
"#;

pub const PLAN_B: &str = r#"
name: Features
tasks:
  - number: 3
    name: Api
    prompt: Expose the model over HTTP
    depends_on:
      - file: A.yaml
        task: 2
"#;
