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
    author = "Ruiqi Chen, Lucas Zhou",
    version,
    about = "XLattice CLI - Build periodic strut lattices from a unit cell: detect periodic boundaries, tessellate, mirror and grade strut diameters.",
    help_template = HELP_TEMPLATE,
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
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the operations of a job file on its unit cell and summarize the result.
    Build(BuildArgs),
    /// Analyze the unit cell of a job file without applying any operation.
    Inspect(InspectArgs),
}

/// Options shared by every command that loads a job file.
#[derive(Args, Debug, Clone)]
pub struct JobArgs {
    /// Path to the job file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Override `lattice.tolerance` from the job file.
    #[arg(short = 't', long, value_name = "FLOAT")]
    pub tolerance: Option<f64>,

    /// Override `lattice.default-diameter` from the job file.
    #[arg(short = 'd', long, value_name = "FLOAT")]
    pub default_diameter: Option<f64>,

    /// Set a specific configuration value, overriding the job file.
    /// Can be used multiple times. Example: -S lattice.tolerance=1e-4
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `build` subcommand.
#[derive(Args, Debug)]
pub struct BuildArgs {
    #[command(flatten)]
    pub job: JobArgs,

    /// Append a final tessellation step with the given counts.
    #[arg(short = 'n', long, value_name = "NX,NY,NZ")]
    pub tessellate: Option<String>,

    /// Skip every operation listed in the job file.
    #[arg(long)]
    pub no_operations: bool,

    /// Hide the progress bar.
    #[arg(long)]
    pub no_progress: bool,
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    #[command(flatten)]
    pub job: JobArgs,

    /// Also list the members of every boundary face.
    #[arg(long)]
    pub faces: bool,

    /// Also list every matched min/max node pair.
    #[arg(long)]
    pub pairs: bool,
}
