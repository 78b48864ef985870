use api::{
    AppState,
    config::Config,
    messaging::{handler::MessageHandler, receiver::MqttReceiver},
    repository::file_sink::FileSink,
    router,
    services::{
        device_registry::DeviceRegistry, firmware_service::FirmwareStore,
        telemetry_service::TelemetryService,
    },
};
use log::{error, info, warn};
use std::sync::Arc;
use tokio::{net::TcpListener, sync::oneshot};

#[tokio::main]
async fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::load().unwrap_or_else(|err| {
        error!("Failed to load configuration: {}", err);
        error!("Provide a config.toml or VIBRATION__SECTION__KEY environment overrides.");
        std::process::exit(1);
    });

    info!("Loaded configuration:");
    info!("  MQTT: {}:{}", config.mqtt.host, config.mqtt.port);
    info!("  Data directory: {}", config.storage.data_dir.display());
    info!("  Buffer capacity: {}", config.buffer.capacity);
    info!("  API: {}", config.server_address());

    let sink = FileSink::create(&config.storage).await.unwrap_or_else(|err| {
        error!("Cannot prepare data directory: {}", err);
        std::process::exit(1);
    });

    let telemetry = Arc::new(TelemetryService::new(
        Arc::new(sink),
        config.buffer.capacity,
        config.mqtt.feed_buffer,
    ));
    let devices = Arc::new(DeviceRegistry::new(config.devices.capacity));
    let firmware = Arc::new(FirmwareStore::from_config(&config.storage));

    let handler = MessageHandler::new(&config.mqtt, telemetry.clone(), devices.clone());
    let mut receiver = MqttReceiver::new(&config.mqtt, handler);

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let mqtt_task = tokio::spawn(async move { receiver.run(shutdown_rx).await });

    let state = AppState::new(telemetry, devices, firmware, config.query.default_n);

    let api_addr = config.server_address();
    let listener = match TcpListener::bind(&api_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Cannot bind {}: {}", api_addr, err);
            std::process::exit(1);
        }
    };

    info!("Swagger UI available at http://{}/docs", api_addr);

    if let Err(err) = axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("HTTP server failed: {}", err);
    }

    let _ = shutdown_tx.send(());
    if let Err(err) = mqtt_task.await {
        warn!("MQTT receiver task ended abnormally: {}", err);
    }

    info!("Shut down");
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl-C: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
