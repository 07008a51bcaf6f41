#![warn(clippy::pedantic)]

use std::{env, io, path::PathBuf, sync::Arc};

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use liftlog_cli::{
    cli::Cli,
    command, log,
    settings::{self, Settings},
};
use liftlog_domain::Service;
use liftlog_storage::JsonFileStore;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = match cli.config.clone().or_else(Settings::default_path) {
        Some(path) => Settings::load(&path)?,
        None => Settings::default(),
    }
    .with_overrides(
        env::var_os(settings::STORE_VAR).map(PathBuf::from),
        cli.store.clone(),
        cli.verbose,
    );

    let buffer = Arc::new(log::Buffer::default());
    log::init(buffer.clone(), settings.log_level).context("failed to initialize logger")?;
    ::log::debug!("using store {}", settings.store.display());

    if let Some(dir) = settings.store.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }

    let service =
        Service::new(JsonFileStore::open(&settings.store)).with_day_anchor(settings.day_anchor);

    let result = command::run(&service, cli.command, Utc::now(), &mut io::stdout()).await;
    if result.is_err() {
        for entry in log::suppressed(buffer.as_ref(), settings.log_level).unwrap_or_default() {
            eprintln!("{entry}");
        }
    }
    result
}
