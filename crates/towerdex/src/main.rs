use anyhow::{Context, Result};
use clap::Parser;
use towerdex::{logging, App, Cli, Config, OutputDestination};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    let output = cli.output.unwrap_or(config.output);
    let destination = OutputDestination::from_option(cli.out_file);

    let app = App::start(config, output).await?;
    app.run(cli.command, &destination).await
}
