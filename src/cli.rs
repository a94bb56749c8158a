//! Command-line argument parsing for ffox-remote
//!
//! Uses clap for argument parsing with derive macros.

use clap::Parser;
use std::path::PathBuf;

use crate::config::TargetConfig;
use crate::error::RemoteError;
use crate::remote::matcher::MatchCriteria;

/// ffox-remote - issue remote commands to a running Firefox through X
/// window properties
#[derive(Parser, Debug)]
#[command(name = "ffox-remote", author, version, about, long_about = None)]
pub struct Args {
    /// Firefox user to match against (empty matches any)
    #[arg(short = 'U', long)]
    pub user: Option<String>,

    /// Firefox profile to match against, a name or a profile path
    #[arg(short = 'P', long)]
    pub profile: Option<String>,

    /// Firefox program name to match against
    #[arg(short = 'G', long)]
    pub program: Option<String>,

    /// Go on even without the window lock, and clear the lock afterwards
    #[arg(long)]
    pub force: bool,

    /// Only find the Firefox window and report its ID
    #[arg(long)]
    pub find: bool,

    /// Report the window ID and Firefox's response
    #[arg(short, long)]
    pub verbose: bool,

    /// Pass -new-window to Firefox
    #[arg(long)]
    pub new_window: bool,

    /// Pass -new-tab to Firefox
    #[arg(long)]
    pub new_tab: bool,

    /// Pass the arguments to Firefox as a -search query
    #[arg(long)]
    pub search: bool,

    /// X property prefix (overrides the config file)
    #[arg(long)]
    pub prefix: Option<String>,

    /// Config file to use instead of ~/.config/ffox-remote/config.toml
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// URLs, or search terms with --search
    pub urls: Vec<String>,
}

impl Args {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Arguments passed to Firefox after the program name
    pub fn pass_through(&self) -> Result<Vec<String>, RemoteError> {
        if self.search {
            if self.new_window || self.new_tab {
                return Err(RemoteError::MalformedUsage(
                    "--search cannot be combined with --new-window or --new-tab".into(),
                ));
            }
            if self.urls.is_empty() {
                return Err(RemoteError::MalformedUsage("--search needs search terms".into()));
            }
            return Ok(vec!["-search".to_string(), self.urls.join(" ")]);
        }

        let mut args = Vec::new();
        if self.new_window {
            args.push("-new-window".to_string());
        }
        if self.new_tab {
            args.push("-new-tab".to_string());
        }
        args.extend(self.urls.iter().cloned());
        Ok(args)
    }

    /// Match criteria, falling back to the configured defaults
    pub fn criteria(&self, defaults: &TargetConfig) -> MatchCriteria {
        let pick = |flag: &Option<String>, default: &String| {
            flag.clone().unwrap_or_else(|| default.clone())
        };
        MatchCriteria {
            user: pick(&self.user, &defaults.user),
            profile: pick(&self.profile, &defaults.profile),
            program: pick(&self.program, &defaults.program),
        }
    }
}
