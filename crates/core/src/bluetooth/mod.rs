//! Bluetooth Low Energy chat transport

pub mod config;
pub mod events;
pub mod gatt;
pub mod manager;
pub mod registry;
pub mod tasks;

pub use config::BluetoothConfig;
pub use events::BluetoothEvent;
pub use gatt::GattConnection;
pub use manager::BluetoothConnectionManager;
pub use registry::{DeviceRegistry, DiscoveredDevice};
