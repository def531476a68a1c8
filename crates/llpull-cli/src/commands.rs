//! Subcommands.

use clap::Subcommand;

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download a model by running it once through the llama.cpp runner
    Pull {
        /// Model to pull (e.g. "gemma3:1b" or a Hugging Face reference)
        #[arg(short = 'm', long)]
        model: Option<String>,
    },
}
