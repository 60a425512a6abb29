use env_logger::Env;
use std::env;

use recipe_relay::config::RelayConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    // With a URL argument, scrape that one page and print it instead of serving
    if let Some(url) = env::args().nth(1) {
        let recipe = recipe_relay::fetch_recipe(&url).await?;
        println!("{}", serde_json::to_string_pretty(&recipe)?);
        return Ok(());
    }

    let config = RelayConfig::load()?;
    recipe_relay::server::serve(&config).await
}
