//! microzoo CLI - component diagrams to running container stacks
//!
//! Usage: microzoo [OPTIONS] <COMMAND> <SOURCE>
//!
//! Commands:
//!   compile  Compile a diagram and write the stack artifact
//!   deploy   Compile and deploy; keep tunnels open on kubernetes
//!   test     Compile, deploy and probe published ports
//!   drop     Tear down a previously compiled stack
//!   status   Show the tool's view of a previously compiled stack

mod cli;
mod commands;
mod ui;

use clap::Parser;

use cli::{Cli, Commands};
use commands::Context;

fn main() {
    let cli = Cli::parse();
    let json = cli.global.json;
    microzoo::logging::init_cli_logger(cli.global.verbose);

    if let Err(err) = run(cli) {
        ui::error::print_error(&err, json);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = Context::load(cli.global)?;
    match &cli.command {
        Commands::Compile { source } => commands::compile::run(&ctx, source),
        Commands::Deploy { source } => commands::deploy::run(&ctx, source),
        Commands::Test { source } => commands::test::run(&ctx, source),
        Commands::Drop { source } => commands::drop::run(&ctx, source),
        Commands::Status { source } => commands::status::run(&ctx, source),
    }
}
