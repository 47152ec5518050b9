//! Entry point wiring CLI dispatch to pipeline modules.

use anyhow::Result;
use ppaxe::{cli::Cli, config::Settings, logging, nlp::lexicon};
use tracing::{info, instrument};

#[tokio::main]
#[instrument]
async fn main() -> Result<()> {
    logging::init_tracing("info")?;
    lexicon::init();
    let settings = Settings::load()?;
    let cli = Cli::parse();

    info!(?cli, "starting command");
    cli.dispatch(settings).await
}
