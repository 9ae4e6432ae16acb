mod cli;
mod commands;
mod http;
mod render;

use std::ffi::OsString;

use anyhow::Context;
use clap::Parser;
use studybuddy_core::{
  Config,
  MutationError
};
use tracing::{
  debug,
  info
};

fn main() {
  let args: Vec<OsString> =
    std::env::args_os().collect();
  if let Err(err) = run(args) {
    // Mutation failures were already
    // shown by the notifier.
    if err
      .downcast_ref::<MutationError>()
      .is_none()
    {
      eprintln!("error: {err:#}");
    }
    std::process::exit(1);
  }
}

#[tracing::instrument(skip_all)]
fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let cli =
    cli::GlobalCli::parse_from(raw_args);

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting studybuddy CLI"
  );

  let mut cfg =
    Config::load(cli.config.as_deref())?;
  if let Some(api) = cli.api.clone() {
    cfg.api_base_url = api;
  }
  cfg.apply_overrides(
    cli
      .rc_overrides
      .iter()
      .map(cli::ConfigOverride::pair)
  )?;
  debug!(api = %cfg.api_base_url, "resolved api base");

  let runtime =
    tokio::runtime::Builder::new_current_thread()
      .enable_all()
      .build()
      .context(
        "failed to start async runtime"
      )?;

  runtime.block_on(commands::dispatch(
    &cfg,
    cli.command
  ))?;

  info!("done");
  Ok(())
}
