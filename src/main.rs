//! daoforge CLI entry point.
//!
//! Handles argument parsing, command execution, and user-facing error
//! display. The commands themselves live in [`daoforge::cli`]:
//! - `plan` - Compute the deployment order for a set of templates
//! - `generate` - Render templates and run the deploy pipeline offline
//! - `list` - List catalog templates and their registry stage
//! - `validate` - Check that every requirement resolves

use anyhow::Result;
use clap::Parser;
use daoforge::cli;
use daoforge::core::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
