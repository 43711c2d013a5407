//! Command-line surface (§6): a single optional config-path argument.
//! Anything beyond that is out of scope, so `clap`'s own usage-error exit
//! covers a second positional argument without any handling of ours.

use clap::Parser;

const DEFAULT_CONFIG_PATH: &str = "configs/default.conf";

#[derive(Parser, Debug)]
#[command(name = "webserv", about = "An HTTP/1.1 origin server")]
pub struct Cli {
    /// Path to the server configuration file.
    #[arg(default_value = DEFAULT_CONFIG_PATH)]
    pub config_path: String,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
