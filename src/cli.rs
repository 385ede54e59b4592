use std::path::PathBuf;

use clap::Parser;

use crate::generator::DEFAULT_MAX_DEPTH;

/// Check a grammar file for undefined, conflicting and unproductive symbols
#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// File containing the grammar
    pub file: PathBuf,

    /// Sentences to generate once the grammar is valid (default: 0)
    #[arg(short = 'n', long, value_name = "AMOUNT", default_value_t = 0)]
    pub samples: u32,

    /// Symbol to generate from (default: the `%start` symbol)
    #[arg(short, long, value_name = "SYMBOL")]
    pub start: Option<String>,

    /// Depth after which generation heads for the shortest way out
    #[arg(short = 'd', long, value_name = "DEPTH", default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Do not print anything when the grammar is valid
    #[arg(short, long)]
    pub quiet: bool,
}
