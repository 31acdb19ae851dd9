use sketchgen::config::Config;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    match dotenv::dotenv() {
        Ok(_) => log::info!(".env file loaded"),
        Err(_) => log::warn!("No .env file found, using system environment variables"),
    }

    sketchgen::logger::init_with_config(sketchgen::logger::LoggerConfig::development())
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    let config = Config::from_env();
    log::info!(
        "starting sketchgen (model: {}, repair attempts: {})",
        config.generation.default_model_id,
        config.generation.repair_attempts
    );

    sketchgen::server::run(config).await
}
