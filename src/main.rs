//! ffox-remote
//!
//! Issues remote commands to a running Firefox through X window properties,
//! for Firefox versions that transmit the nominal command line in
//! `_MOZILLA_COMMANDLINE` rather than the old `-remote` `_MOZILLA_COMMAND`.

mod cli;
mod config;
mod error;
mod remote;
mod x11;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Args;
use crate::config::{Config, PropertyNames};
use crate::remote::matcher;
use crate::remote::session::Session;
use crate::x11::X11Server;

fn main() {
    let args = Args::parse_args();
    init_logging(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("ffox-remote: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "ffox_remote=debug" } else { "ffox_remote=warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default.into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time()
                .with_target(false),
        )
        .init();
}

fn run(args: &Args) -> Result<()> {
    // Usage errors come before any X traffic
    let extra_args = args.pass_through()?;

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().context("Failed to load configuration")?,
    };
    let prefix = args.prefix.as_deref().unwrap_or(&config.protocol.prefix);
    let names = PropertyNames::with_prefix(prefix);
    let criteria = args.criteria(&config.target);
    debug!("Matching {:?} with {:?}", criteria, names);

    let server = X11Server::connect(&names)?;
    let window = matcher::find_target(&server, &criteria, config.protocol.profile_suffix)?;
    info!("Found Firefox window 0x{:x}", window);

    if args.find || args.verbose {
        println!("firefox window: 0x{:x}", window);
        if args.find {
            return Ok(());
        }
    }

    let working_dir = match std::env::current_dir() {
        Ok(dir) => dir.to_string_lossy().into_owned(),
        Err(e) => {
            warn!("cannot get current directory: {}", e);
            "/".to_string()
        }
    };

    let response = Session::new(&server, window).submit(&working_dir, &extra_args, args.force)?;
    if args.verbose {
        println!("response: {}", response);
    }
    Ok(())
}
