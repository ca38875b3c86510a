use clap::Parser;
mod commands;
use commands::cli;
use planwave_core::config::{self, ConfigSource};
use planwave_core::error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
    std::sync::OnceLock::new();

fn main() {
    let exit = match real_main() {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, code = ?error_code(&e), "command failed");
            eprintln!("{e}");
            e.exit_code()
        }
    };

    std::process::exit(exit);
}

fn real_main() -> Result<i32, error::CliError> {
    let args = cli::Args::parse();
    let cfg = load_config(&args).map_err(|e| error::CliError::Config(format!("{e:#}")))?;
    init_tracing(&cfg.logging).map_err(error::CliError::Command)?;

    tracing::debug!(
        max_concurrency = cfg.max_concurrency,
        qc_enabled = cfg.quality_control.enabled,
        "configuration loaded"
    );

    dispatch(args.command, &cfg)
}

fn load_config(args: &cli::Args) -> anyhow::Result<config::AppConfig> {
    let mut cfg = match args.config.as_deref() {
        Some(path) => config::load_from_path(path)?,
        None => {
            let source = ConfigSource::new(std::env::current_dir().ok(), dirs::home_dir());
            config::load_default(&source)?
        }
    };
    config::apply_env_overrides(&mut cfg, |key| std::env::var(key).ok())?;
    cfg.validate()?;
    Ok(cfg)
}

fn error_code(e: &error::CliError) -> Option<u16> {
    match e {
        error::CliError::Plan(pe) => Some(pe.error_code().as_u16()),
        _ => None,
    }
}

fn dispatch(cmd: cli::Commands, cfg: &config::AppConfig) -> Result<i32, error::CliError> {
    match cmd {
        cli::Commands::Check(check_args) => commands::plan::handle_check(check_args, cfg),
        cli::Commands::Waves(waves_args) => commands::plan::handle_waves(waves_args, cfg),
        cli::Commands::Summarize(summarize_args) => {
            commands::summarize::handle_summarize(summarize_args)
        }
    }
}

fn init_tracing(logging: &config::LoggingConfig) -> Result<(), String> {
    if !logging.enabled {
        return Ok(());
    }

    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(logging.level.clone()).map_err(|e| e.to_string())?,
    };

    let mut maybe_writer = None;

    if logging.file {
        let dir = match logging
            .directory
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(d) => std::path::PathBuf::from(d),
            None => std::env::temp_dir().join("planwave"),
        };

        std::fs::create_dir_all(&dir).map_err(|e| format!("create log dir failed: {e}"))?;
        let file_name = format!("planwave.{}.log", std::process::id());
        let appender = tracing_appender::rolling::never(dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let _ = LOG_GUARD.set(guard);
        maybe_writer = Some(non_blocking);
    }

    if !logging.console && maybe_writer.is_none() {
        return Err("logging disabled for both console and file".to_string());
    }

    let console_layer = logging.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(atty::is(atty::Stream::Stderr))
    });

    let file_layer = maybe_writer.map(|w| {
        tracing_subscriber::fmt::layer()
            .with_writer(w)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}
