pub mod api;
#[cfg(feature = "cli")]
pub mod cli;
pub mod collection;
#[cfg(feature = "cli")]
pub mod commands;
pub mod config;
pub mod datetime;
pub mod notify;
#[cfg(feature = "cli")]
pub mod render;
pub mod row;

#[cfg(feature = "cli")]
pub use cli_entry::run;

#[cfg(feature = "cli")]
mod cli_entry {
  use std::ffi::OsString;
  use std::process::ExitCode;

  use anyhow::Context;
  use clap::Parser;
  use tracing::{
    debug,
    info
  };

  use crate::api::HttpTaskApi;
  use crate::config::ClientConfig;
  use crate::render::{
    Renderer,
    TerminalNotifier
  };
  use crate::{
    cli,
    commands
  };

  #[tracing::instrument(skip_all)]
  pub fn run(
    raw_args: Vec<OsString>
  ) -> anyhow::Result<ExitCode> {
    let cli =
      cli::GlobalCli::parse_from(raw_args);

    cli::init_tracing(
      cli.verbose,
      cli.quiet
    )?;

    info!(
      verbose = cli.verbose,
      quiet = cli.quiet,
      "starting todo CLI"
    );

    let mut cfg = ClientConfig::load(
      cli.config.as_deref()
    )?;
    cfg.apply_overrides(
      cli
        .rc_overrides
        .into_iter()
        .map(|kv| (kv.key, kv.value))
    )?;
    debug!(api = %cfg.api_base_url, "resolved config");

    let api = HttpTaskApi::new(&cfg)
      .context(
        "failed to build HTTP client"
      )?;
    let renderer = Renderer::new();
    let notifier =
      TerminalNotifier::new(renderer.clone());

    let runtime =
      tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context(
          "failed to start async runtime"
        )?;

    let succeeded = runtime.block_on(
      commands::dispatch(
        api,
        &cfg,
        &renderer,
        notifier,
        cli.command
      )
    )?;

    info!(succeeded, "done");
    Ok(if succeeded {
      ExitCode::SUCCESS
    } else {
      ExitCode::FAILURE
    })
  }
}
