//! Bluetooth Connection Manager - scan, connect, chunked send

use super::config::BluetoothConfig;
use super::events::BluetoothEvent;
use super::gatt::{GattConnection, NotificationStream};
use super::registry::DeviceRegistry;
use super::tasks::TaskGroup;
use crate::error::{ChatError, ChatResult};
use crate::protocol::send_chunked;
use btleplug::api::{Central, CentralEvent, Manager as _, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Manager, Peripheral};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, error, info, warn};

/// How often an idle connection is checked for a silent drop
const LINK_CHECK_INTERVAL: Duration = Duration::from_secs(10);

/// Main Bluetooth connection manager
pub struct BluetoothConnectionManager {
    config: BluetoothConfig,
    adapter: Option<Adapter>,

    // Scan and connection state
    devices: Arc<RwLock<DeviceRegistry<Peripheral>>>,
    connection: Arc<RwLock<Option<Arc<GattConnection>>>>,
    connecting: Arc<RwLock<Option<String>>>,
    scanning: Arc<RwLock<bool>>,

    // Event handling
    event_sender: mpsc::UnboundedSender<BluetoothEvent>,
    event_receiver: Arc<Mutex<Option<mpsc::UnboundedReceiver<BluetoothEvent>>>>,

    // Background tasks
    scan_task: Arc<Mutex<Option<JoinHandle<()>>>>,
    connection_tasks: Arc<Mutex<TaskGroup>>,
}

impl BluetoothConnectionManager {
    /// Create a new BluetoothConnectionManager with custom config
    pub async fn with_config(config: BluetoothConfig) -> ChatResult<Self> {
        let (event_sender, event_receiver) = mpsc::unbounded_channel();

        let mut manager = Self {
            config,
            adapter: None,
            devices: Arc::new(RwLock::new(DeviceRegistry::new())),
            connection: Arc::new(RwLock::new(None)),
            connecting: Arc::new(RwLock::new(None)),
            scanning: Arc::new(RwLock::new(false)),
            event_sender,
            event_receiver: Arc::new(Mutex::new(Some(event_receiver))),
            scan_task: Arc::new(Mutex::new(None)),
            connection_tasks: Arc::new(Mutex::new(TaskGroup::new())),
        };

        // Try to initialize, but don't fail if Bluetooth unavailable
        if let Err(e) = manager.initialize().await {
            warn!("Bluetooth initialization failed: {}. Running in offline mode.", e);
        }

        Ok(manager)
    }

    async fn initialize(&mut self) -> ChatResult<()> {
        info!("Initializing Bluetooth manager");

        let manager = Manager::new().await.map_err(|e| {
            ChatError::AdapterUnavailable(format!("{}. Is Bluetooth enabled?", e))
        })?;

        let adapter = manager
            .adapters()
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ChatError::AdapterUnavailable("No Bluetooth adapters found".to_string()))?;

        if self.config.verbose_logging {
            info!("Using Bluetooth adapter: {:?}", adapter.adapter_info().await);
        }

        self.adapter = Some(adapter);
        Ok(())
    }

    fn adapter(&self) -> ChatResult<&Adapter> {
        self.adapter
            .as_ref()
            .ok_or_else(|| ChatError::AdapterUnavailable("Bluetooth not initialized".to_string()))
    }

    /// Clear previous results and start a continuous, unfiltered scan.
    ///
    /// Runs until `stop_scan` or `stop`; every new address is reported once.
    pub async fn start_scan(&self) -> ChatResult<()> {
        let adapter = self.adapter()?.clone();

        if let Some(task) = self.scan_task.lock().await.take() {
            task.abort();
        }
        self.devices.write().await.clear();

        info!("Starting BLE scan");

        let mut events = adapter
            .events()
            .await
            .map_err(|e| ChatError::ScanFailed(e.to_string()))?;

        adapter
            .start_scan(ScanFilter::default())
            .await
            .map_err(|e| ChatError::ScanFailed(e.to_string()))?;

        *self.scanning.write().await = true;
        self.emit_event(BluetoothEvent::ScanningStateChanged { scanning: true });

        let devices = Arc::clone(&self.devices);
        let scanning = Arc::clone(&self.scanning);
        let event_sender = self.event_sender.clone();
        let verbose = self.config.verbose_logging;

        let task = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                let id = match event {
                    CentralEvent::DeviceDiscovered(id) | CentralEvent::DeviceUpdated(id) => id,
                    _ => continue,
                };

                let peripheral = match adapter.peripheral(&id).await {
                    Ok(p) => p,
                    Err(e) => {
                        debug!("Peripheral {:?} vanished: {}", id, e);
                        continue;
                    }
                };
                let name = peripheral
                    .properties()
                    .await
                    .ok()
                    .flatten()
                    .and_then(|p| p.local_name);
                let address = peripheral.address().to_string();

                let is_new = devices.write().await.insert(address.clone(), name.clone(), peripheral);
                if is_new {
                    if verbose {
                        debug!("Discovered {} ({})", name.as_deref().unwrap_or("Unknown"), address);
                    }
                    let _ = event_sender.send(BluetoothEvent::DeviceDiscovered { address, name });
                }
            }

            warn!("BLE event stream ended");
            *scanning.write().await = false;
            let _ = event_sender.send(BluetoothEvent::ScanFailed {
                error: "event stream ended".to_string(),
            });
        });

        *self.scan_task.lock().await = Some(task);
        Ok(())
    }

    /// Stop scanning
    pub async fn stop_scan(&self) -> ChatResult<()> {
        if let Some(adapter) = &self.adapter {
            if let Err(e) = adapter.stop_scan().await {
                warn!("Error stopping scan: {}", e);
            }
        }

        if let Some(task) = self.scan_task.lock().await.take() {
            task.abort();
        }

        *self.scanning.write().await = false;
        self.emit_event(BluetoothEvent::ScanningStateChanged { scanning: false });

        info!("Stopped BLE scanning");
        Ok(())
    }

    /// Open a GATT connection to a device found by the current scan.
    ///
    /// The attempt runs in the background and reports `Connected` or
    /// `ConnectFailed`. An existing connection is not closed first.
    pub async fn connect(&self, address: &str) -> ChatResult<()> {
        let peripheral = self
            .devices
            .read()
            .await
            .get(address)
            .map(|d| d.handle.clone())
            .ok_or_else(|| ChatError::UnknownDevice(address.to_string()))?;

        let address = address.to_string();
        let config = self.config.clone();
        let connection = Arc::clone(&self.connection);
        let connecting = Arc::clone(&self.connecting);
        let event_sender = self.event_sender.clone();

        *self.connecting.write().await = Some(address.clone());

        let task = tokio::spawn(async move {
            let result = GattConnection::open(peripheral, address.clone(), &config).await;
            {
                let mut pending = connecting.write().await;
                if pending.as_deref() == Some(address.as_str()) {
                    *pending = None;
                }
            }

            match result {
                Ok((gatt, notifications)) => {
                    let gatt = Arc::new(gatt);
                    *connection.write().await = Some(Arc::clone(&gatt));
                    let _ = event_sender.send(BluetoothEvent::Connected {
                        address: address.clone(),
                    });

                    Self::monitor_connection(gatt, notifications, connection, event_sender).await;
                }
                Err(e) => {
                    error!("Failed to connect to {}: {}", address, e);
                    let _ = event_sender.send(BluetoothEvent::ConnectFailed {
                        address,
                        error: e.to_string(),
                    });
                }
            }
        });

        self.connection_tasks.lock().await.push(task);
        Ok(())
    }

    /// Forward notifications until the link drops
    async fn monitor_connection(
        gatt: Arc<GattConnection>,
        notifications: NotificationStream,
        connection: Arc<RwLock<Option<Arc<GattConnection>>>>,
        event_sender: mpsc::UnboundedSender<BluetoothEvent>,
    ) {
        let link = Arc::clone(&gatt);
        forward_notifications(notifications, &gatt.address, &event_sender, || {
            let link = Arc::clone(&link);
            async move { link.is_connected().await }
        })
        .await;

        info!("Peer disconnected: {}", gatt.address);
        let mut current = connection.write().await;
        if current.as_ref().is_some_and(|c| Arc::ptr_eq(c, &gatt)) {
            *current = None;
        }
        let _ = event_sender.send(BluetoothEvent::Disconnected {
            address: gatt.address.clone(),
        });
    }

    /// Chunk and write `payload` on the current connection in the background.
    ///
    /// Reports `MessageSent` or `SendFailed` when the transfer ends.
    pub async fn send_message(&self, payload: String) -> ChatResult<()> {
        let gatt = self
            .connection
            .read()
            .await
            .clone()
            .ok_or(ChatError::NotConnected)?;

        let requested_mtu = self.config.requested_mtu;
        let chunk_size = self.config.chunk_size;
        let event_sender = self.event_sender.clone();

        let task = tokio::spawn(async move {
            match send_chunked(gatt.as_ref(), &payload, requested_mtu, chunk_size).await {
                Ok(chunks) => {
                    debug!("Sent {} bytes in {} chunk(s) to {}", payload.len(), chunks, gatt.address);
                    let _ = event_sender.send(BluetoothEvent::MessageSent { chunks });
                }
                Err(e) => {
                    error!("send failed: {}", e);
                    let _ = event_sender.send(BluetoothEvent::SendFailed { error: e.to_string() });
                }
            }
        });

        self.connection_tasks.lock().await.push(task);
        Ok(())
    }

    /// Cancel connection tasks and close the current link.
    ///
    /// Reports `Disconnected` for the open link, or for a connect attempt
    /// that was still in flight.
    pub async fn disconnect(&self) -> ChatResult<()> {
        let aborted = self.connection_tasks.lock().await.abort_all();
        let pending = self.connecting.write().await.take();

        let current = self.connection.write().await.take();
        let address = match current {
            Some(gatt) => {
                if let Err(e) = gatt.close().await {
                    warn!("Error disconnecting from {}: {}", gatt.address, e);
                }
                Some(gatt.address.clone())
            }
            None if aborted > 0 => pending,
            None => None,
        };

        if let Some(address) = address {
            self.emit_event(BluetoothEvent::Disconnected { address });
        }
        Ok(())
    }

    /// Devices found by the current scan, in discovery order
    pub async fn discovered_devices(&self) -> Vec<(String, Option<String>)> {
        self.devices
            .read()
            .await
            .iter()
            .map(|d| (d.address.clone(), d.name.clone()))
            .collect()
    }

    pub async fn is_scanning(&self) -> bool {
        *self.scanning.read().await
    }

    /// Check if Bluetooth is available
    pub fn is_available(&self) -> bool {
        self.adapter.is_some()
    }

    /// Get the event receiver (should be called once)
    pub async fn take_event_receiver(&self) -> Option<mpsc::UnboundedReceiver<BluetoothEvent>> {
        self.event_receiver.lock().await.take()
    }

    /// Stop all operations
    pub async fn stop(&self) -> ChatResult<()> {
        info!("Shutting down Bluetooth connection manager");

        self.stop_scan().await.ok();
        self.disconnect().await.ok();

        info!("Bluetooth connection manager shutdown complete");
        Ok(())
    }

    fn emit_event(&self, event: BluetoothEvent) {
        // Channel closed - this is fine during shutdown
        let _ = self.event_sender.send(event);
    }
}

/// Send each notification as `NotificationReceived` until the stream ends
/// or a periodic `link_alive` check fails
async fn forward_notifications<S, F, Fut>(
    mut notifications: S,
    address: &str,
    event_sender: &mpsc::UnboundedSender<BluetoothEvent>,
    mut link_alive: F,
) where
    S: Stream<Item = Vec<u8>> + Unpin,
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    loop {
        tokio::select! {
            notification = notifications.next() => {
                match notification {
                    Some(data) => {
                        let _ = event_sender.send(BluetoothEvent::NotificationReceived {
                            address: address.to_string(),
                            data,
                        });
                    }
                    None => break,
                }
            }

            _ = time::sleep(LINK_CHECK_INTERVAL) => {
                if !link_alive().await {
                    break;
                }
            }
        }
    }
}

impl Drop for BluetoothConnectionManager {
    fn drop(&mut self) {
        debug!("BluetoothConnectionManager dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "AA:BB:CC:DD:EE:01";

    fn drain(receiver: &mut mpsc::UnboundedReceiver<BluetoothEvent>) -> Vec<BluetoothEvent> {
        let mut events = Vec::new();
        while let Ok(event) = receiver.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_notifications_queued_before_monitoring_are_forwarded() {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        // Chunks that arrived between subscribing and starting the monitor
        let queued = tokio_stream::iter(vec![b"{\"msg\":".to_vec(), b"\"hi\"}".to_vec()]);

        forward_notifications(queued, ADDR, &sender, || async { true }).await;

        assert_eq!(
            drain(&mut receiver),
            vec![
                BluetoothEvent::NotificationReceived {
                    address: ADDR.to_string(),
                    data: b"{\"msg\":".to_vec(),
                },
                BluetoothEvent::NotificationReceived {
                    address: ADDR.to_string(),
                    data: b"\"hi\"}".to_vec(),
                },
            ]
        );
    }
}
