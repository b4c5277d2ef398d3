use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hatebu::app::AppContext;
use hatebu::cli::{commands, Cli, Commands};
use hatebu::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let ctx = AppContext::new(config, cli.credentials.into())?;

    match cli.command {
        Commands::Bookmark { action } => {
            commands::bookmark(&ctx, action).await?;
        }
        Commands::Entry { url } => {
            commands::entry(&ctx, &url).await?;
        }
        Commands::Tags => {
            commands::tags(&ctx).await?;
        }
        Commands::User => {
            commands::user(&ctx).await?;
        }
        Commands::Count { urls } => {
            commands::count(&ctx, &urls).await?;
        }
        Commands::Search(args) => {
            commands::search(&ctx, args).await?;
        }
    }

    Ok(())
}
