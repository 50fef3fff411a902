//! Serves the say-hello API.

use say_hello::{
    app,
    infra::{config, logging},
};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let _guard = logging::init_logging();
    let config = config::load_config()?;
    tracing::info!(?config, "http server starting");
    app::serve(config).await?;
    Ok(())
}
