use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

use ytx_api::error::FailurePolicy;

#[derive(Parser)]
#[command(name = "ytx-api", about = "YouTube transcript HTTP service", version)]
pub struct Cli {
    /// Address to listen on [default: 0.0.0.0:3000]
    #[arg(short, long)]
    pub listen: Option<SocketAddr>,

    /// Config file (defaults to ~/.config/ytx-api/config.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Caption language used when a request has no `lang` [default: zh]
    #[arg(long)]
    pub lang: Option<String>,

    /// Don't send cross-origin (CORS) headers
    #[arg(long)]
    pub no_cors: bool,

    /// Status code policy for provider failures
    #[arg(long, value_enum)]
    pub failure_policy: Option<FailurePolicy>,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long)]
    pub verbose: bool,
}
