//! CLI surface (spec.md §6): `netlogd [-h|--help] [-V|--version] [-d|--daemon]
//! [-c|--configfile PATH] [-u|--uid USER]`.

use clap::Parser;

use crate::kernel::constants::{APP_NAME, DEFAULT_CONFIGFILE};

#[derive(Debug, Parser)]
#[command(name = APP_NAME, version, about = "Unified network-event logging daemon")]
pub struct Cli {
    /// Run as a background daemon after startup completes.
    #[arg(short = 'd', long = "daemon")]
    pub daemon: bool,

    /// Path to the configuration file.
    #[arg(short = 'c', long = "configfile", default_value = DEFAULT_CONFIGFILE)]
    pub configfile: String,

    /// Drop privileges to this user (and its primary group) after binding
    /// any privileged resources, before entering the reactor loop.
    #[arg(short = 'u', long = "uid")]
    pub uid: Option<String>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
