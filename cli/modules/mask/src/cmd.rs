//! CLI command definitions

use affinity::DEFAULT_WIDTH;
use clap::{ArgAction, Parser};
use tmc::domains::DomainList;

use crate::output::OutputFormat;

////////////////////////////////////////////////////////////////////////////////
// Main Command
////////////////////////////////////////////////////////////////////////////////

/// Affinity domain mask inspection.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
#[command(flatten_help = true)]
pub struct Cmd {
    #[clap(subcommand)]
    pub mode: Mode,

    /// Mask width, the number of representable domains.
    #[clap(long, default_value_t = DEFAULT_WIDTH, global = true)]
    pub width: usize,

    /// Output format.
    #[clap(long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,

    /// Log verbosity level
    #[clap(short, action = ArgAction::Count, global = true)]
    pub verbosity: u8,
}

////////////////////////////////////////////////////////////////////////////////
// Commands
////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Parser)]
pub enum Mode {
    /// Show the mask built from a domain list
    Show(ShowCmd),
    /// Intersect several masks
    And(CombineCmd),
    /// Unite several masks
    Or(CombineCmd),
    /// Enumerate every non-empty combination of the given domains
    Iterate(IterateCmd),
    /// Merge affinity hints loaded from a YAML file
    Hints(HintsCmd),
}

#[derive(Debug, Clone, Parser)]
pub struct ShowCmd {
    /// Domains to set, e.g. "0,2-4".
    #[arg(long, short)]
    pub domains: DomainList,
}

#[derive(Debug, Clone, Parser)]
pub struct CombineCmd {
    /// Operand mask as a domain list; repeat for each operand.
    #[arg(long = "mask", short, required = true)]
    pub masks: Vec<DomainList>,
}

#[derive(Debug, Clone, Parser)]
pub struct IterateCmd {
    /// Domains to combine, in iteration order.
    #[arg(long, short)]
    pub domains: DomainList,

    /// Stop after this many masks.
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Parser)]
pub struct HintsCmd {
    /// Path to the YAML hints file.
    #[arg(long, short)]
    pub file: String,
}
