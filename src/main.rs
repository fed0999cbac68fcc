use std::{net::TcpListener, sync::Arc};

use env_logger::Env;
use pangram_widget::{
    configuration::get_configuration,
    services::{HyperbrowserClient, PangramClient, UrlProcessor},
    startup::run,
};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration().expect("Failed to read configuration.");

    if configuration.hyperbrowser.api_key.is_none() {
        log::warn!("HYPERBROWSER_API_KEY is not set; /process-url will answer 500");
    }
    if configuration.pangram.api_key.is_none() {
        log::warn!("PANGRAM_API_KEY is not set; /process-url will answer 500");
    }

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(address)?;
    log::info!("Listening on {}", listener.local_addr()?);

    let hyperbrowser_client = HyperbrowserClient::new(
        configuration.hyperbrowser.base_url.clone(),
        configuration.hyperbrowser.poll_interval(),
    );
    let pangram_client = PangramClient::new(configuration.pangram.base_url.clone());
    let url_processor = UrlProcessor::new(Arc::new(hyperbrowser_client), Arc::new(pangram_client));

    run(listener, configuration, url_processor)?.await
}
