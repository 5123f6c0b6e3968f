mod cli;
mod error_fmt;
mod machine;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::{Result, WrapErr};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(e) = run(cli) {
        tracing::error!(error = ?e, "command failed");
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        std::process::exit(exit_code_for_error(&e));
    }
}

fn load_config(path: &Path) -> Result<boules_config::Config> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))?;
    let cfg: boules_config::Config =
        toml::from_str(&text).wrap_err_with(|| format!("parse config {}", path.display()))?;
    cfg.validate()
        .wrap_err_with(|| format!("invalid configuration in {}", path.display()))?;
    Ok(cfg)
}

fn init_tracing(cli: &Cli, logging: &boules_config::Logging) -> Result<()> {
    // RUST_LOG wins; otherwise --log-level, then [logging].level when --log-level is the default
    let level = match (&logging.level, cli.log_level.as_str()) {
        (Some(cfg_level), "info") => cfg_level.as_str(),
        (_, flag) => flag,
    };
    let filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::try_new(level).wrap_err_with(|| format!("invalid log level '{level}'"))?,
    };

    let pretty = (!cli.json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    let json = cli
        .json
        .then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr));

    let file = match &logging.file {
        Some(file) => {
            let path = Path::new(file);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| eyre::eyre!("logging.file '{file}' has no file name"))?;
            let appender = match logging.rotation.as_deref() {
                Some("daily") => tracing_appender::rolling::daily(dir, name),
                Some("hourly") => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(writer),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(pretty)
        .with(json)
        .with(file)
        .try_init()
        .wrap_err("install tracing subscriber")
}

fn run(cli: Cli) -> Result<()> {
    color_eyre::install()?;

    let cfg = load_config(&cli.config)?;
    init_tracing(&cli, &cfg.logging)?;
    tracing::debug!(config = %cli.config.display(), command = ?cli.cmd, "starting");

    // Only the operator loops poll the flag; everything else keeps default SIGINT
    let shutdown = Arc::new(AtomicBool::new(false));
    if matches!(cli.cmd, Commands::Play | Commands::Calibrate) {
        let flag = Arc::clone(&shutdown);
        ctrlc::set_handler(move || {
            flag.store(true, Ordering::Relaxed);
        })
        .wrap_err("install Ctrl-C handler")?;
    }

    match &cli.cmd {
        Commands::SelfCheck => machine::run_self_check(&cli, &cfg),
        Commands::Fit { out } => {
            let (map, source) = machine::build_map(&cli, &cfg)?;
            tracing::info!(%source, start = map.start(), end = map.end(), "mapping table ready");
            machine::run_fit(&map, out.as_deref())
        }
        cmd => {
            let (map, source) = machine::build_map(&cli, &cfg)?;
            tracing::info!(%source, start = map.start(), end = map.end(), "mapping table ready");
            let mut seq = machine::build_sequencer(map, &cfg)?;
            match cmd {
                Commands::Play => machine::run_play(&mut seq, &cfg, &shutdown),
                Commands::Throw { distance } => machine::run_throw(&mut seq, *distance),
                Commands::Prime => machine::run_prime(&mut seq),
                Commands::Calibrate => machine::run_calibrate(&mut seq, &shutdown),
                Commands::SelfCheck | Commands::Fit { .. } => Ok(()),
            }
        }
    }
}
