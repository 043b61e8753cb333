use std::path::PathBuf;

use clap::Parser;

/// Invocation takes no positional arguments; everything is driven by the
/// configuration document. The only override is the config file location.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    #[clap(
        short,
        long,
        help = "Path to the YAML configuration file (default: config.yml)"
    )]
    pub config: Option<PathBuf>,
}
