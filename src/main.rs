use std::net::TcpListener;
use storefront::configuration::get_configuration;
use storefront::startup::run;
use storefront::store::Stores;
use storefront::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    tracing::info!("Starting application");

    let configuration = match get_configuration() {
        Ok(config) => {
            tracing::info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    // The signing secret is loaded once here and never changes while serving.
    if let Err(e) = configuration.jwt.validate() {
        tracing::error!("Invalid JWT configuration: {}", e);
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "JWT configuration error",
        ));
    }

    let stores = Stores::connect(&configuration.database).await.map_err(|e| {
        tracing::error!("Failed to open document store: {}", e);
        std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "Database connection error")
    })?;

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    let server = run(listener, stores, &configuration)?;
    server.await
}
