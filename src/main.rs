#[macro_use]
extern crate rocket;
use anyhow::Result;

mod bootstrap;
mod cli;
mod common;
mod config;
mod server;
mod utils;
mod workflow;

use clap::Parser;

use crate::cli::{Cli, Command};
use crate::common::errors::handle_error;
use crate::config::BuildConfig;
use crate::workflow::flows::{self, development_plan, production_plan};
use crate::workflow::{BuildContext, BuildMode, Plan, Stage, Task};

fn run_single(task: Task, config: BuildConfig) -> Result<()> {
    let ctx = BuildContext::new(config, BuildMode::Production);
    Plan {
        name: task.name,
        stages: vec![Stage::single(task)],
    }
    .execute(&ctx)
}

fn dispatch(command: Command, config: BuildConfig) -> Result<()> {
    match command {
        Command::Build => {
            let ctx = BuildContext::new(config, BuildMode::Production);
            production_plan().execute(&ctx)
        }
        Command::Development => {
            let ctx = BuildContext::new(config, BuildMode::Development);
            development_plan().execute(&ctx)
        }
        Command::Serve => {
            let ctx = BuildContext::new(config, BuildMode::Development);
            development_plan().execute(&ctx)?;
            server::serve(ctx)
        }
        Command::Clean => run_single(flows::CLEAN, config),
        Command::Lint => run_single(flows::LINT, config),
        Command::Styles => run_single(flows::STYLES, config),
        Command::Scripts => run_single(flows::SCRIPTS, config),
        Command::Images => run_single(flows::IMAGES, config),
        Command::Html => run_single(flows::HTML, config),
        Command::Copy => run_single(flows::COPY, config),
        Command::Favicon => run_single(flows::FAVICON, config),
        Command::GenerateSw => run_single(flows::GENERATE_SW, config),
        Command::Pagespeed => run_single(flows::PAGESPEED, config),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    bootstrap::setup::initialize_logger();

    let config = BuildConfig::load()?;
    bootstrap::setup::initialize_folder(&config)?;

    let command = cli.command.unwrap_or(Command::Build);
    if let Err(err) = dispatch(command, config) {
        let _ = handle_error(err);
        std::process::exit(1);
    }

    Ok(())
}
