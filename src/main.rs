use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;
use tree_squeeze::cli::Args;
use tree_squeeze::{
    error, load_env_files, logger, verbose, Config, Runner, Terminal, TinifyClient,
    TinifyOptions,
};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    // env files have to be in place before clap reads the environment
    let cwd = std::env::current_dir().context("Cannot determine the working directory")?;
    let loaded = load_env_files(&cwd).context("Failed to load environment files")?;

    let args = Args::parse();
    logger::init(args.quiet, args.verbose);
    for file in &loaded {
        verbose!("Loaded settings from {}", file.display());
    }

    let config = Config::from_args(&args).context("Invalid configuration")?;

    let client = TinifyClient::new(TinifyOptions::new(
        config.api_key.clone(),
        Some(config.timeout),
    ))?;
    let reporter = Terminal;

    Runner::new(&config, &client, &reporter)
        .run()
        .context("Run aborted before processing any directory")?;

    Ok(())
}
