use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "planwave", version, about = "Compile and check multi-file agent plans")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file to use instead of ~/.planwave/config.toml or ./.planwave/config.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile plan files and report whether they form a valid plan.
    Check(PlanFilesArgs),
    /// Print the waves a set of plan files compiles to.
    Waves(WavesArgs),
    /// Aggregate a JSON list of task results.
    Summarize(SummarizeArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct PlanFilesArgs {
    /// Plan files (YAML, or JSON by extension), merged in the order given.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct WavesArgs {
    #[command(flatten)]
    pub plan: PlanFilesArgs,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct SummarizeArgs {
    pub results: PathBuf,

    /// Wall-clock duration of the run in milliseconds; defaults to the sum of task durations.
    #[arg(long)]
    pub duration_ms: Option<u64>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}
