//! # CLI Argument Definitions
//!
//! Source options describe where settings come from and apply to every subcommand.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use strata_kernel::domain::Settings;
use strata_kernel::{RemoteFormat, SourceOrder};

#[derive(Debug, Parser)]
#[command(name = "strata")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Resolve and inspect layered application settings")]
pub struct Cli {
    #[command(flatten)]
    pub sources: SourceArgs,

    #[command(flatten)]
    pub logging: LogArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the resolved settings (secrets masked)
    Show {
        /// Print secrets and URL credentials in clear text
        #[arg(long)]
        reveal: bool,

        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Print a single resolved value
    Get {
        /// Setting name, case-insensitive (e.g. 'MONGO_URL')
        key: String,
    },
    /// Show which source supplied each setting
    Explain {
        /// Only explain this setting
        key: Option<String>,
    },
    /// Resolve and validate the settings, failing on any problem
    Check {},
}

impl Commands {
    /// Inspection commands still work on settings that fail validation.
    pub const fn validates(&self) -> bool {
        matches!(self, Self::Check {})
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Toml,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RemoteFormatArg {
    /// `{"KEY": value}`
    Flat,
    /// `[{"name": "KEY", "value": value}]`
    List,
}

impl From<RemoteFormatArg> for RemoteFormat {
    fn from(format: RemoteFormatArg) -> Self {
        match format {
            RemoteFormatArg::Flat => Self::FlatObject,
            RemoteFormatArg::List => Self::NamedList,
        }
    }
}

#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Settings endpoint queried with a single GET
    #[arg(long, value_name = "URL")]
    pub remote_url: Option<String>,

    #[arg(long, value_name = "SECS", default_value_t = 5)]
    pub remote_timeout: u64,

    #[arg(long, value_enum, default_value_t = RemoteFormatArg::Flat)]
    pub remote_format: RemoteFormatArg,

    /// Fail instead of falling back when the endpoint is unusable
    #[arg(long, requires = "remote_url")]
    pub remote_required: bool,

    /// Dotenv file read by the environment source [default: .env]
    #[arg(long, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    #[arg(long, conflicts_with = "env_file")]
    pub no_env_file: bool,

    /// Only environment variables with this prefix are considered
    #[arg(long, value_name = "PREFIX")]
    pub env_prefix: Option<String>,

    /// Directory with one file per setting
    #[arg(long, value_name = "PATH")]
    pub secrets_dir: Option<PathBuf>,

    /// Init argument, repeatable (e.g. '--set DEBUG=true')
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
    pub assignments: Vec<(String, String)>,

    /// Source precedence, highest first (e.g. 'env,remote,init,secrets')
    #[arg(long, value_name = "LIST")]
    pub order: Option<SourceOrder>,
}

#[derive(Debug, Args)]
pub struct LogArgs {
    /// Log level; defaults to the level derived from the resolved settings
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Also write rolling log files into this directory
    #[arg(long, value_name = "PATH")]
    pub log_dir: Option<PathBuf>,

    /// Emit console logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (key, value) =
        raw.split_once('=').ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if !Settings::is_field(key) {
        return Err(format!("unknown setting '{key}'"));
    }
    Ok((key.to_ascii_lowercase(), value.to_owned()))
}
