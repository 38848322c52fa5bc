use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Andreas Luttens",
    version,
    about = "posefilter - Triage docking poses by reference RMSD, interaction constraints and energy.",
    help_template = HELP_TEMPLATE,
    after_help = "https://github.com/carlssonlab/frag2lead",
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Optional configuration file in TOML format ([container] and [selection] tables).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S selection.rmsd-threshold=1.5
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", global = true)]
    pub set_values: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Keep the lowest-energy pose per compound that lies within an RMSD threshold of the reference.
    Select(SelectArgs),
    /// Keep the poses whose perceived interactions satisfy a residue constraint string.
    Interactions(InteractionsArgs),
    /// Retrieve the best-scoring header block of each requested compound.
    Headers(HeadersArgs),
    /// Move each pose's free-form header block in front of its fixed-format content.
    Reorder(ReorderArgs),
}

/// Arguments for the `select` subcommand.
#[derive(Args, Debug)]
pub struct SelectArgs {
    /// Pose container to select from (plain or gzip-compressed).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub container: PathBuf,

    /// CSV table of per-record RMSD values (columns: index,rmsd).
    #[arg(short, long = "rmsd-table", required = true, value_name = "PATH")]
    pub rmsd_table: PathBuf,

    /// Output container for the selected records; compressed when it ends in `.gz`.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Override the RMSD acceptance threshold in Angstrom.
    #[arg(short, long, value_name = "FLOAT")]
    pub threshold: Option<f64>,

    /// Also write the selected compound names, one per line.
    #[arg(long, value_name = "PATH")]
    pub names: Option<PathBuf>,
}

/// Arguments for the `interactions` subcommand.
#[derive(Args, Debug)]
pub struct InteractionsArgs {
    /// CSV table of perceived interactions (columns: index,pose,residue,interaction).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Residue constraint string, e.g. '45B-67H:68S'.
    #[arg(short = 's', long = "constraint", required = true, value_name = "STRING")]
    pub constraint: String,

    /// File receiving the accepted pose names, one per line.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,
}

/// Arguments for the `headers` subcommand.
#[derive(Args, Debug)]
pub struct HeadersArgs {
    /// Pose container to scan (plain or gzip-compressed).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// File with one requested compound name per line.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub names: PathBuf,

    /// File receiving the header blocks.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,
}

/// Arguments for the `reorder` subcommand.
#[derive(Args, Debug)]
pub struct ReorderArgs {
    /// Container to rewrite (plain or gzip-compressed).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Rewritten container; compressed when it ends in `.gz`.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,
}
