use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use sketchgen::{Config, GenerationRequest, ImageSource, SketchClient};
use std::{env, fs};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    match dotenv::dotenv() {
        Ok(_) => log::info!(".env file loaded"),
        Err(_) => log::warn!("No .env file found"),
    }
    sketchgen::logger::init()?;

    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| "screenshot.png".to_string());
    let bytes = fs::read(&path)?;
    let data_url = format!("data:image/png;base64,{}", BASE64.encode(&bytes));

    let client = SketchClient::new(Config::from_env()).await?;

    let request = GenerationRequest::new(ImageSource::from_url(&data_url))
        .with_component_library(true);

    let response = client.generate_component(request).await?;

    log::info!(
        "generated {} bytes with {} (repair attempted: {})",
        response.code.len(),
        response.model,
        response.repair_attempted
    );
    println!("{}", response.code);

    Ok(())
}
