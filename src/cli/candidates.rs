//! Candidates command implementation

use anyhow::Result;
use clap::Args;
use merge_conf::discovery::{AppEnvironment, DEFAULT_CONFIG_EXT, DEFAULT_CONFIG_NAME};

#[derive(Args)]
pub struct CandidatesArgs {
    /// Application name the files are named after
    #[arg(long, value_name = "APP")]
    pub app: String,

    /// Configuration file extension, including the dot
    #[arg(long, value_name = "EXT", default_value = DEFAULT_CONFIG_EXT)]
    pub ext: String,

    /// Generic configuration file name without extension
    #[arg(long, value_name = "NAME", default_value = DEFAULT_CONFIG_NAME)]
    pub name: String,

    /// Only list candidates that exist
    #[arg(long)]
    pub existing: bool,
}

pub fn run(args: CandidatesArgs) -> Result<()> {
    // The application is assumed to live in the working directory.
    let environment = AppEnvironment::new(std::env::current_dir()?.join(&args.app));
    let paths = if args.existing {
        environment.existing_config_files(&args.ext, &args.name)
    } else {
        environment.config_file_candidates(&args.ext, &args.name)
    };

    for path in paths {
        println!("{}", path.display());
    }
    Ok(())
}
