//! Scenario runner entry point.
//!
//! Usage: `runesim <scenario.ron>`
//!
//! Runtime parameters come from the environment (see
//! [`RuntimeConfig::from_env`]); a `.env` file in the working directory is
//! loaded first. The report is printed to stdout as JSON, logs go to stderr
//! and, when `RUNESIM_LOG_DIR` is set, to `runesim.log` in that directory.
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use rune_runtime::{RuntimeConfig, Scenario, Simulation};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _guard = setup_logging()?;

    let path = scenario_path()?;
    let scenario = Scenario::load_from_file(&path)
        .with_context(|| format!("loading scenario {}", path.display()))?;

    let config = RuntimeConfig::from_env();
    let report = Simulation::new(config, scenario)
        .context("invalid simulation setup")?
        .run()
        .context("simulation failed")?;

    let json = serde_json::to_string_pretty(&report).context("serializing report")?;
    println!("{json}");
    Ok(())
}

fn scenario_path() -> Result<PathBuf> {
    let mut args = std::env::args_os().skip(1);
    let Some(path) = args.next() else {
        bail!("usage: runesim <scenario.ron>");
    };
    if args.next().is_some() {
        bail!("usage: runesim <scenario.ron>");
    }
    Ok(PathBuf::from(path))
}

/// Setup logging to stderr, plus a log file when `RUNESIM_LOG_DIR` is set.
///
/// The returned guard must stay alive for the file writer to flush.
fn setup_logging() -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let Some(log_dir) = std::env::var_os("RUNESIM_LOG_DIR").map(PathBuf::from) else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
        return Ok(None);
    };

    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;
    let file_appender = tracing_appender::rolling::never(&log_dir, "runesim.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    tracing::info!("Log file: {}/runesim.log", log_dir.display());
    Ok(Some(guard))
}
