use std::net::TcpListener;

use cer_parser::{
    configuration::get_configuration,
    services::{ExtractionClient, SheetWriter},
    startup::run,
};
use env_logger::Env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration()?;

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;
    log::info!("CER Parser listening on {}", address);

    let extraction_client = ExtractionClient::new(&configuration.extraction);
    let sheet_writer = SheetWriter::new(&configuration.google);

    run(listener, extraction_client, sheet_writer)?.await?;

    Ok(())
}
