//! GATT connection to a remote chat peripheral
//!
//! The remote side exposes one service with a write characteristic for
//! outgoing chunks and a notify characteristic for incoming ones.

use std::pin::Pin;

use btleplug::api::{Characteristic, Peripheral as _, ValueNotification, WriteType};
use btleplug::platform::Peripheral;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, info};
use uuid::Uuid;

use super::config::BluetoothConfig;
use crate::error::{ChatError, ChatResult};
use crate::protocol::GattLink;

pub type NotificationStream = Pin<Box<dyn Stream<Item = Vec<u8>> + Send>>;

/// An open GATT connection with the chat characteristics resolved
#[derive(Debug, Clone)]
pub struct GattConnection {
    pub address: String,
    peripheral: Peripheral,
    write_characteristic: Characteristic,
}

impl GattConnection {
    /// Connect, discover services, resolve both characteristics and
    /// subscribe to notifications.
    ///
    /// The returned stream is attached before the subscription is enabled,
    /// so chunks notified right after subscribing are not lost.
    pub async fn open(
        peripheral: Peripheral,
        address: String,
        config: &BluetoothConfig,
    ) -> ChatResult<(Self, NotificationStream)> {
        let failed = |reason: String| ChatError::ConnectFailed {
            address: address.clone(),
            reason,
        };

        debug!("Connecting to {}", address);
        peripheral
            .connect()
            .await
            .map_err(|e| failed(format!("connect: {}", e)))?;

        peripheral
            .discover_services()
            .await
            .map_err(|e| failed(format!("service discovery: {}", e)))?;

        let characteristics = peripheral.characteristics();
        let find = |uuid: Uuid| {
            characteristics
                .iter()
                .find(|c| c.uuid == uuid && c.service_uuid == config.service_uuid)
                .cloned()
                .ok_or(ChatError::CharacteristicMissing(uuid))
        };
        let write_characteristic = find(config.write_characteristic)?;
        let notify_characteristic = find(config.notify_characteristic)?;

        let raw = peripheral
            .notifications()
            .await
            .map_err(|e| failed(format!("notification stream: {}", e)))?;
        let notifications = filter_notifications(raw, notify_characteristic.uuid);

        peripheral
            .subscribe(&notify_characteristic)
            .await
            .map_err(|e| failed(format!("subscribe: {}", e)))?;

        info!("GATT connection open to {}", address);
        let connection = Self {
            address,
            peripheral,
            write_characteristic,
        };
        Ok((connection, notifications))
    }

    pub async fn is_connected(&self) -> bool {
        self.peripheral.is_connected().await.unwrap_or(false)
    }

    pub async fn close(&self) -> ChatResult<()> {
        self.peripheral
            .disconnect()
            .await
            .map_err(|e| ChatError::AdapterUnavailable(e.to_string()))
    }
}

/// Payloads notified on `uuid`, in arrival order
pub fn filter_notifications<S>(stream: S, uuid: Uuid) -> NotificationStream
where
    S: Stream<Item = ValueNotification> + Send + 'static,
{
    Box::pin(stream.filter_map(move |n: ValueNotification| (n.uuid == uuid).then_some(n.value)))
}

impl GattLink for GattConnection {
    async fn request_mtu(&self, mtu: u16) -> ChatResult<u16> {
        // The host stack negotiates the ATT MTU on connect; btleplug exposes no request call.
        debug!("MTU {} requested for {}", mtu, self.address);
        Ok(mtu)
    }

    async fn write_chunk(&self, chunk: &[u8]) -> ChatResult<()> {
        self.peripheral
            .write(&self.write_characteristic, chunk, WriteType::WithResponse)
            .await
            .map_err(|e| ChatError::WriteFailed(e.to_string()))
    }
}
