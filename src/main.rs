use restaurante::config::configuration;
use restaurante::db::establish_connection;
use restaurante::startup::Application;
use restaurante::telemetry::{get_subscriber, init_subscriber};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    let subscriber = get_subscriber("restaurante".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let config = configuration::Settings::new().expect("Failed to load configurations");
    let pool = establish_connection(&config.database.url).await;

    let application = Application::build(
        config.application.port,
        pool,
        PathBuf::from(config.uploads.dir),
    )
    .await?;
    application.run_until_stopped().await?;
    Ok(())
}
