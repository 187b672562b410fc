//! merge-conf: merge configuration files, dotenv files, environment variables
//! and command-line overrides into one tree and print it.

use anyhow::Result;

mod cli;

fn main() -> Result<()> {
    cli::run()
}
