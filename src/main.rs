use clap::Parser;
use profhmm::{
    cli::{init_verbose, Cli, Command, FULL_VERSION},
    commands::{align, build, genseq},
    utils::{handle_error_and_exit, Result},
};

fn runner() -> Result<()> {
    let cli = Cli::parse();
    init_verbose(&cli);
    let subcommand_name = match cli.command {
        Command::Build(_) => "build",
        Command::Align(_) => "align",
        Command::Genseq(_) => "genseq",
    };

    log::info!(
        "Running {}-{} [{}]",
        env!("CARGO_PKG_NAME"),
        *FULL_VERSION,
        subcommand_name
    );
    match cli.command {
        Command::Build(args) => build::build(args)?,
        Command::Align(args) => align::align(args)?,
        Command::Genseq(args) => genseq::genseq(args)?,
    }
    log::info!("{} end", env!("CARGO_PKG_NAME"));
    Ok(())
}

fn main() {
    if let Err(e) = runner() {
        handle_error_and_exit(e);
    }
}
