use clap::Parser;

mod commands;
mod logging;

use commands::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();
    let exit = dispatch(args.command).await?;
    std::process::exit(exit);
}

async fn dispatch(cmd: cli::Commands) -> anyhow::Result<i32> {
    match cmd {
        cli::Commands::Run(run_args) => commands::run::run(run_args).await,
    }
}
