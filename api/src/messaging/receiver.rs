use super::{
    backoff::Backoff,
    handler::{Handled, MessageHandler},
};
use crate::config::MqttConfig;
use chrono::Utc;
use log::{debug, error, info, warn};
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS};
use std::time::Duration;
use tokio::sync::oneshot;
use uuid::Uuid;

/// How long shutdown waits for the Disconnect packet to reach the broker.
const DISCONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Background broker listener.
///
/// Runs its own event loop, independent of the HTTP server: each inbound
/// publish is handed to the [`MessageHandler`]; connection errors are logged
/// and retried with exponential backoff until shutdown.
pub struct MqttReceiver {
    client: AsyncClient,
    eventloop: EventLoop,
    handler: MessageHandler,
    backoff: Backoff,
}

impl MqttReceiver {
    pub fn new(config: &MqttConfig, handler: MessageHandler) -> Self {
        let client_id = format!("{}-{}", config.client_id_prefix, Uuid::new_v4());
        let mut options = MqttOptions::new(client_id, &config.host, config.port);
        options.set_keep_alive(config.keep_alive());

        let (client, eventloop) = AsyncClient::new(options, 10);

        Self {
            client,
            eventloop,
            handler,
            backoff: Backoff::new(&config.reconnect),
        }
    }

    pub async fn run(&mut self, mut shutdown: oneshot::Receiver<()>) {
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("MQTT receiver: shutdown signal received");
                    break;
                }
                event = self.eventloop.poll() => {
                    match event {
                        Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                            info!("Connected to MQTT broker ({:?})", ack.code);
                            self.backoff.reset();
                            self.subscribe();
                        }
                        Ok(Event::Incoming(Packet::Publish(publish))) => {
                            Self::dispatch(&self.handler, &publish.topic, &publish.payload).await;
                        }
                        Ok(event) => debug!("MQTT event: {:?}", event),
                        Err(e) => {
                            let delay = self.backoff.next_delay();
                            warn!(
                                "MQTT connection error: {}. Reconnecting in {:?} (attempt {})",
                                e,
                                delay,
                                self.backoff.attempts()
                            );
                            tokio::select! {
                                _ = &mut shutdown => {
                                    info!("MQTT receiver: shutdown signal received");
                                    break;
                                }
                                _ = tokio::time::sleep(delay) => {}
                            }
                        }
                    }
                }
            }
        }

        self.disconnect().await;
    }

    /// Queues a Disconnect and drives the event loop until it is written out.
    async fn disconnect(&mut self) {
        if let Err(e) = self.client.try_disconnect() {
            debug!("Error disconnecting MQTT client: {:?}", e);
            return;
        }

        let eventloop = &mut self.eventloop;
        let flush = async {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                        info!("Disconnected from MQTT broker");
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        debug!("MQTT connection closed during disconnect: {}", e);
                        break;
                    }
                }
            }
        };

        if tokio::time::timeout(DISCONNECT_TIMEOUT, flush).await.is_err() {
            warn!("Timed out waiting for MQTT disconnect");
        }
    }

    /// Subscriptions are re-issued on every connection so they survive
    /// broker restarts and clean sessions.
    fn subscribe(&self) {
        for filter in self.handler.subscriptions() {
            // `try_` keeps the request off the event loop we are driving.
            match self.client.try_subscribe(filter, QoS::AtLeastOnce) {
                Ok(()) => info!("Subscribed to topic: {}", filter),
                Err(e) => error!("Error subscribing to topic {}: {:?}", filter, e),
            }
        }
    }

    // Borrows only the handler so the `run` future stays `Send`.
    async fn dispatch(handler: &MessageHandler, topic: &str, payload: &[u8]) {
        match handler.handle(topic, payload, Utc::now()).await {
            Ok(Handled::Telemetry(sample)) => {
                debug!("Telemetry from {} on {}", sample.device_id, topic)
            }
            Ok(Handled::Status { device_id, status }) => {
                info!("Device {} is {}", device_id, status)
            }
            Ok(Handled::Ignored) => {}
            Err(e) => error!("Dropping message on {}: {}", topic, e),
        }
    }
}
