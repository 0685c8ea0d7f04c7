use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Jinyuan Sun, Yifan Deng",
    version,
    about = "PymolFold CLI - Predict protein structures with ESMFold, PymolFold and Boltz2, fetch AlphaFold models and color them by pLDDT.",
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
    /// Predict the structure of a single sequence.
    Fold(FoldArgs),
    /// Predict a multi-entity complex with Boltz2 from a job file.
    Complex(ComplexArgs),
    /// Fold every sequence of a FASTA file and write a CSV summary.
    Batch(BatchArgs),
    /// Download precomputed models from AlphaFold DB or AlphaMissense.
    Fetch(FetchArgs),
    /// Report pLDDT confidence of a structure file and emit a coloring script.
    Plddt(PlddtArgs),
    /// Design new sequences for a backbone with ProteinMPNN.
    Design(DesignArgs),
    /// Score a single point mutation of a structure with ProteinMPNN.
    Mutate(MutateArgs),
    /// Score every single-point mutation of a structure (deep mutational scan).
    Dms(DmsArgs),
    /// Manage the directory predictions are written to.
    Workdir(WorkdirArgs),
}

/// Settings shared by every command that talks to a prediction service.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Path to a configuration file in TOML format.
    /// Defaults to `config.toml` in the user configuration directory if present.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory results are written to, overriding the configured one.
    #[arg(short, long, value_name = "PATH")]
    pub workdir: Option<PathBuf>,

    /// Base URL of the PymolFold server.
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Value of the NVCF-POLL-SECONDS header sent to NVIDIA Cloud Functions.
    #[arg(long, value_name = "SECONDS")]
    pub poll_seconds: Option<u64>,

    /// Timeout applied to every single HTTP call.
    #[arg(long, value_name = "SECONDS")]
    pub timeout_seconds: Option<u64>,

    /// Give up on an accepted job after this many seconds of polling.
    #[arg(long, value_name = "SECONDS")]
    pub max_wait_seconds: Option<u64>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S nvcf.poll-seconds=120
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictorKind {
    Esmfold,
    Pymolfold,
    Boltz2,
}

/// Arguments for the `fold` subcommand.
#[derive(Args, Debug)]
pub struct FoldArgs {
    /// Amino acid sequence; separate chains with ':' or '/'.
    #[arg(required = true, value_name = "SEQUENCE")]
    pub sequence: String,

    /// Prediction service to use.
    #[arg(short, long, value_enum, default_value_t = PredictorKind::Esmfold)]
    pub predictor: PredictorKind,

    /// Name for the output files. Defaults to the first and last three residues.
    #[arg(short, long, value_name = "NAME")]
    pub name: Option<String>,

    /// Do not retry on the other ESMFold service when one reports an internal error.
    #[arg(long)]
    pub no_fallback: bool,

    /// Write a PyMOL coloring script next to each saved structure.
    #[arg(long)]
    pub pml: bool,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments for the `complex` subcommand.
#[derive(Args, Debug)]
pub struct ComplexArgs {
    /// Path to the job description (entities and affinity settings) in JSON format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Also save the raw service answer as pretty-printed JSON.
    #[arg(long, value_name = "PATH")]
    pub json_output: Option<PathBuf>,

    /// Write a PyMOL coloring script next to each saved structure.
    #[arg(long)]
    pub pml: bool,

    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchMethodArg {
    Esmfold,
    Pymolfold,
}

/// Arguments for the `batch` subcommand.
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// FASTA file with the sequences to fold.
    #[arg(required = true, value_name = "FASTA")]
    pub fasta: PathBuf,

    /// Preferred service; long sequences always go to PymolFold.
    #[arg(short, long, value_enum, default_value_t = BatchMethodArg::Esmfold)]
    pub method: BatchMethodArg,

    /// Seconds to wait between ESMFold requests.
    #[arg(long, value_name = "SECONDS")]
    pub delay: Option<u64>,

    /// Sequences at least this long are sent to PymolFold.
    #[arg(long, value_name = "INT")]
    pub max_esmfold_length: Option<usize>,

    /// Where to write the CSV summary. Defaults to `batch_summary.csv` in the working directory.
    #[arg(long, value_name = "PATH")]
    pub summary: Option<PathBuf>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments for the `fetch` subcommand.
#[derive(Args, Debug)]
pub struct FetchArgs {
    #[command(subcommand)]
    pub source: FetchSource,

    /// Write a PyMOL coloring script next to the downloaded structure.
    #[arg(long, global = true)]
    pub pml: bool,

    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(Subcommand, Debug)]
pub enum FetchSource {
    /// Fetch the AlphaFold DB model of a UniProt accession.
    Af {
        #[arg(required = true, value_name = "UNIPROT")]
        uniprot_id: String,
    },
    /// Fetch an AlphaMissense structure from the hegelab server.
    Am {
        #[arg(required = true, value_name = "NAME")]
        name: String,
    },
}

/// Arguments for the `plddt` subcommand.
#[derive(Args, Debug)]
pub struct PlddtArgs {
    /// PDB file whose B-factor column holds pLDDT values.
    #[arg(required = true, value_name = "PATH")]
    pub file: PathBuf,

    /// PyMOL selection the coloring script applies to.
    #[arg(short, long, default_value = "all")]
    pub selection: String,

    /// Write the coloring script to this path.
    #[arg(long, value_name = "PATH")]
    pub pml: Option<PathBuf>,
}

/// Arguments for the `design` subcommand.
#[derive(Args, Debug)]
pub struct DesignArgs {
    /// PDB file with the backbone to design on.
    #[arg(required = true, value_name = "PDB")]
    pub structure: PathBuf,

    /// Residues to keep fixed, e.g. "A12,A13".
    #[arg(long, value_name = "POSITIONS")]
    pub fix_pos: Option<String>,

    /// Chains to redesign.
    #[arg(long, value_name = "CHAINS")]
    pub chain: Option<String>,

    /// Amino acids to exclude from the designs, e.g. "C".
    #[arg(long, value_name = "AA")]
    pub rm_aa: Option<String>,

    /// Redesign the fixed positions instead of the free ones.
    #[arg(long)]
    pub inverse: bool,

    /// Design all chains as copies of one sequence.
    #[arg(long)]
    pub homooligomeric: bool,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments for the `mutate` subcommand.
#[derive(Args, Debug)]
pub struct MutateArgs {
    /// PDB file of the wild-type structure.
    #[arg(required = true, value_name = "PDB")]
    pub structure: PathBuf,

    /// Mutation as <wild><position><mutant>, e.g. K12E.
    #[arg(required = true, value_name = "MUTATION")]
    pub mutation: String,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments for the `dms` subcommand.
#[derive(Args, Debug)]
pub struct DmsArgs {
    /// PDB file of the wild-type structure.
    #[arg(required = true, value_name = "PDB")]
    pub structure: PathBuf,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments for the `workdir` subcommand.
#[derive(Args, Debug)]
pub struct WorkdirArgs {
    #[command(subcommand)]
    pub command: WorkdirCommands,
}

/// Available commands for working directory management.
#[derive(Subcommand, Debug)]
pub enum WorkdirCommands {
    /// Show the absolute path of the working directory.
    Show,
    /// Set a custom path for the working directory. `~` is expanded.
    Set {
        /// The new path to write predictions to.
        #[arg(required = true)]
        path: PathBuf,
    },
    /// Reset the working directory to its default location.
    Reset,
}
