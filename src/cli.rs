use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};
use microzoo::Target;

/// microzoo - compile component diagrams into container stacks
#[derive(Parser, Debug)]
#[command(name = "microzoo")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Directory searched for diagram identifiers
    #[arg(long, global = true, default_value = "diagrams")]
    pub source_dir: PathBuf,

    /// Component manifest root
    #[arg(long, global = true, default_value = "components")]
    pub components: PathBuf,

    /// Output directory for stack artifacts
    #[arg(long, global = true, default_value = ".microzoo/stacks")]
    pub out: PathBuf,

    /// Deployment target: compose (docker-compose) or kubernetes (k8s)
    #[arg(long, global = true, value_parser = Target::from_str, default_value = "compose")]
    pub target: Target,

    /// Config file (defaults to ./microzoo.toml, then the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Machine-readable output (one JSON object per line)
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile a diagram and write the stack artifact
    Compile {
        /// Diagram path or identifier
        source: String,
    },

    /// Compile and deploy; on kubernetes keep tunnels open until Ctrl-C
    Deploy {
        /// Diagram path or identifier
        source: String,
    },

    /// Compile, deploy and probe every published port
    Test {
        /// Diagram path or identifier
        source: String,
    },

    /// Tear down a previously compiled stack
    Drop {
        /// Diagram path or identifier
        source: String,
    },

    /// Show the tool's view of a previously compiled stack
    Status {
        /// Diagram path or identifier
        source: String,
    },
}
